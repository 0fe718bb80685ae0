mod app;
pub mod config;
mod dashboard;
mod hooks;
pub mod ingest;
pub mod services;
pub mod store;

use anyhow::Result;
use crm_axum::AxumApp;
use crm_core::CrmApp;
use serde_json::Value;

use crate::services::LeadsParams;

/// The app configured from the environment.
pub fn build() -> Result<AxumApp<Value, LeadsParams>> {
    build_with(config::from_env)
}

/// The app with defaults overridden by `configure` instead of the environment.
pub fn build_with<F>(configure: F) -> Result<AxumApp<Value, LeadsParams>>
where
    F: FnOnce(&CrmApp<Value, LeadsParams>),
{
    let ax = app::leads_app(configure)?;

    let store = store::from_config(&ax.app.config_snapshot())?;
    let svcs = services::configure(store);

    let ax = ax
        .use_service("/api/leads", svcs.leads)
        .use_get("/health", || async { "ok" })
        .use_get("/", dashboard::index);

    services::register_hooks(ax.app.as_ref())?;
    ingest::configure(ax.app.as_ref())?;

    Ok(ax)
}
