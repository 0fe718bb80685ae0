use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use crm_core::{CrmApp, CrmAroundHook, CrmError, CrmErrorHook, HookContext, Next};
use serde_json::Value;

use crate::services::LeadsParams;

pub struct LogAround;

#[async_trait]
impl CrmAroundHook<Value, LeadsParams> for LogAround {
    async fn run(&self, ctx: &mut HookContext<Value, LeadsParams>, next: Next<Value, LeadsParams>) -> Result<()> {
        let started = Instant::now();
        tracing::debug!(
            service = %ctx.service,
            method = ctx.method.as_str(),
            http_method = %ctx.params.method,
            path = %ctx.params.path,
            provider = %ctx.params.provider,
            request_id = ctx.params.request_id().unwrap_or("-"),
            "-> call"
        );

        let out = next.run(ctx).await;

        tracing::info!(
            service = %ctx.service,
            method = ctx.method.as_str(),
            ok = out.is_ok(),
            elapsed_ms = elapsed_ms(started),
            "<- call"
        );
        out
    }
}

/// Saturates at `u64::MAX`.
fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

pub struct LogError;

#[async_trait]
impl CrmErrorHook<Value, LeadsParams> for LogError {
    async fn run(&self, ctx: &mut HookContext<Value, LeadsParams>) -> Result<()> {
        let Some(err) = &ctx.error else {
            return Ok(());
        };

        match CrmError::from_anyhow(err) {
            Some(crm) if crm.code() < 500 => tracing::info!(
                service = %ctx.service,
                method = ctx.method.as_str(),
                code = crm.code(),
                error = %crm.message,
                "call rejected"
            ),
            _ => tracing::error!(
                service = %ctx.service,
                method = ctx.method.as_str(),
                error = %format!("{err:#}"),
                "call failed"
            ),
        }
        Ok(())
    }
}

pub fn global_hooks(app: &CrmApp<Value, LeadsParams>) {
    app.hooks(|h| {
        h.around_all(Arc::new(LogAround));
        h.error_all(Arc::new(LogError));
    });
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn elapsed_ms_counts_whole_milliseconds() {
        let started = Instant::now() - Duration::from_millis(25);
        let ms = elapsed_ms(started);
        assert!((25..60_000).contains(&ms), "{ms}");
    }
}
