use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use mart_core::{AfterHook, BeforeHook, ErrorHook, HookContext, MartApp, MartError};
use serde_json::Value;

use crate::services::StoreParams;

pub struct LogBefore;

#[async_trait]
impl BeforeHook<Value, StoreParams> for LogBefore {
    async fn run(&self, ctx: &mut HookContext<Value, StoreParams>) -> Result<()> {
        tracing::debug!(
            service = %ctx.service,
            method = ctx.method.as_str(),
            tenant = ctx.tenant.tenant_id.as_str(),
            provider = %ctx.params.provider,
            id = ctx.id.as_deref(),
            "-> service call"
        );
        Ok(())
    }
}

pub struct LogAfter;

#[async_trait]
impl AfterHook<Value, StoreParams> for LogAfter {
    async fn run(&self, ctx: &mut HookContext<Value, StoreParams>) -> Result<()> {
        let records = ctx.result.as_ref().map(|r| r.len()).unwrap_or(0);
        tracing::debug!(
            service = %ctx.service,
            method = ctx.method.as_str(),
            records,
            "<- ok"
        );
        Ok(())
    }
}

pub struct LogError;

#[async_trait]
impl ErrorHook<Value, StoreParams> for LogError {
    async fn run(&self, ctx: &mut HookContext<Value, StoreParams>) -> Result<()> {
        let Some(err) = ctx.error.as_ref() else {
            return Ok(());
        };

        let server_side = MartError::find_in(err).map_or(true, |e| e.kind.is_server_error());
        if server_side {
            tracing::error!(service = %ctx.service, method = ctx.method.as_str(), error = %err, "<- failed");
        } else {
            tracing::info!(service = %ctx.service, method = ctx.method.as_str(), error = %err, "<- rejected");
        }
        Ok(())
    }
}

pub fn global_hooks(app: &MartApp<Value, StoreParams>) {
    app.hooks(|h| {
        h.before_all(Arc::new(LogBefore));
        h.after_all(Arc::new(LogAfter));
        h.error_all(Arc::new(LogError));
    });
}
