use anyhow::Result;
use crm_axum::{axum, AxumApp};
use crm_core::CrmApp;
use serde_json::Value;

use crate::services::LeadsParams;

/// Defaults, then `configure`, then the app-wide hooks.
pub fn leads_app<F>(configure: F) -> Result<AxumApp<Value, LeadsParams>>
where
    F: FnOnce(&CrmApp<Value, LeadsParams>),
{
    let crm_app: CrmApp<Value, LeadsParams> = CrmApp::new();
    crate::config::defaults(&crm_app);
    configure(&crm_app);
    crate::hooks::global_hooks(&crm_app);

    Ok(axum(crm_app))
}
