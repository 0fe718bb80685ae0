use crm_core::{CrmApp, ServiceCapabilities, ServiceMethodKind};
use serde_json::Value;

use crate::services::LeadsParams;

/// List, read, create and status change. Leads are never deleted.
pub fn capabilities() -> ServiceCapabilities {
    ServiceCapabilities::from_methods(vec![
        ServiceMethodKind::Find,
        ServiceMethodKind::Get,
        ServiceMethodKind::Create,
        ServiceMethodKind::Update,
    ])
}

pub fn register_hooks(app: &CrmApp<Value, LeadsParams>) -> anyhow::Result<()> {
    super::leads_schema::register(app)
}
