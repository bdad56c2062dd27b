//! Typed view over the app's key/value configuration.
//!
//! Values come from defaults, then `STOREFRONT__*` environment variables
//! (`STOREFRONT__HTTP__PORT` → `http.port`), then explicit overrides.

use std::path::PathBuf;

use mart_blob::BlobConfig;
use mart_core::{MartApp, MartConfigSnapshot};

use crate::services::purchase_requests::reply_template::{DEFAULT_CONTACT, DEFAULT_SIGNATURE};

pub const ENV_PREFIX: &str = "STOREFRONT";

const DEFAULTS: &[(&str, &str)] = &[
    ("http.host", "127.0.0.1"),
    ("http.port", "3030"),
    ("blob.public_base_url", "/media"),
    ("blob.max_bytes", "10485760"),
    ("blob.chunk_size", "65536"),
    ("upload.max_request_bytes", "52428800"),
    ("seed.on_start", "false"),
    ("contact.phone", DEFAULT_CONTACT),
    ("contact.whatsapp", DEFAULT_CONTACT),
    ("sales.signature", DEFAULT_SIGNATURE),
];

pub fn apply_defaults<R, P>(app: &MartApp<R, P>)
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    for (key, value) in DEFAULTS {
        app.set_default(*key, *value);
    }
}

#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    pub host: String,
    pub port: u16,
    /// Filesystem blob root; `None` keeps images in memory.
    pub blob_root_dir: Option<PathBuf>,
    pub blob: BlobConfig,
    pub max_request_bytes: usize,
    pub seed_on_start: bool,
}

impl StorefrontConfig {
    pub fn from_snapshot(config: &MartConfigSnapshot) -> Self {
        let defaults = BlobConfig::default();
        let blob = BlobConfig::new()
            .with_max_blob_bytes(config.get_u64("blob.max_bytes").unwrap_or(defaults.max_blob_bytes))
            .with_chunk_size(config.get_usize("blob.chunk_size").unwrap_or(defaults.chunk_size))
            .with_public_base_url(config.get_string_or("blob.public_base_url", &defaults.public_base_url));

        Self {
            host: config.get_string_or("http.host", "127.0.0.1"),
            port: config.get_u16("http.port").unwrap_or(3030),
            blob_root_dir: config
                .get("blob.root_dir")
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(PathBuf::from),
            blob,
            max_request_bytes: config
                .get_usize("upload.max_request_bytes")
                .unwrap_or(50 * 1024 * 1024),
            seed_on_start: config.get_bool("seed.on_start").unwrap_or(false),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mart_core::MartApp;

    #[test]
    fn defaults_then_env_style_overrides() {
        let app: MartApp<(), ()> = MartApp::new();
        apply_defaults(&app);
        let applied = app.load_vars(
            ENV_PREFIX,
            vec![
                ("STOREFRONT__HTTP__PORT".to_string(), "8080".to_string()),
                ("STOREFRONT__BLOB__ROOT_DIR".to_string(), "/var/lib/mart".to_string()),
                ("OTHER__HTTP__PORT".to_string(), "1".to_string()),
            ],
        );
        assert_eq!(applied, 2);

        let config = StorefrontConfig::from_snapshot(&app.config_snapshot());
        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(config.blob_root_dir, Some(PathBuf::from("/var/lib/mart")));
        assert_eq!(config.blob.public_base_url, "/media");
        assert_eq!(config.blob.chunk_size, 65536);
        assert!(!config.seed_on_start);
    }
}
