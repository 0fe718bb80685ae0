use std::sync::Arc;

use crm_core::{CrmApp, CrmService};
use serde_json::Value;

use crate::store::LeadStore;

pub mod leads;
pub mod types;

pub use types::LeadsParams;

pub struct LeadsServices {
    pub leads: Arc<dyn CrmService<Value, LeadsParams>>,
}

/// Builds the services. Each one is registered when the router mounts it.
pub fn configure(store: Arc<dyn LeadStore>) -> LeadsServices {
    LeadsServices {
        leads: Arc::new(leads::LeadsService::new(store)),
    }
}

/// Service-level hooks. The services must already be mounted.
pub fn register_hooks(app: &CrmApp<Value, LeadsParams>) -> anyhow::Result<()> {
    leads::leads_shared::register_hooks(app)
}
