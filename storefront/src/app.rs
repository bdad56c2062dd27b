use anyhow::Result;
use mart_axum::{axum, AxumApp};
use mart_core::MartApp;
use serde_json::Value;

use crate::config::{apply_defaults, ENV_PREFIX};
use crate::services::StoreParams;

/// The bare app: configuration layers and global hooks, no services yet.
pub fn storefront_app(overrides: &[(String, String)]) -> Result<AxumApp<Value, StoreParams>> {
    let mart_app: MartApp<Value, StoreParams> = MartApp::new();

    apply_defaults(&mart_app);
    let from_env = mart_app.load_env(ENV_PREFIX);
    for (key, value) in overrides {
        mart_app.set(key.as_str(), value.as_str());
    }
    tracing::debug!(from_env, overrides = overrides.len(), "configuration loaded");

    crate::hooks::global_hooks(&mart_app);

    Ok(axum(mart_app))
}
