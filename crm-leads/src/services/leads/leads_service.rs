use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use crm_core::{CrmError, CrmService, ServiceCapabilities};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::{leads_shared, Lead, NewLead, StatusUpdate};
use crate::services::LeadsParams;
use crate::store::{error::into_anyhow, LeadStore};

/// The `leads` service. Payloads arrive as JSON already checked by the
/// schema hooks and are decoded into typed leads here.
pub struct LeadsService {
    store: Arc<dyn LeadStore>,
}

impl LeadsService {
    pub fn new(store: Arc<dyn LeadStore>) -> Self {
        Self { store }
    }
}

fn decode<T: DeserializeOwned>(data: Value) -> Result<T> {
    serde_json::from_value(data).map_err(|e| CrmError::bad_request(e.to_string()).into_anyhow())
}

fn encode<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

#[async_trait]
impl CrmService<Value, LeadsParams> for LeadsService {
    fn capabilities(&self) -> ServiceCapabilities {
        leads_shared::capabilities()
    }

    async fn find(&self, _params: LeadsParams) -> Result<Vec<Value>> {
        let leads = self.store.list().await.map_err(into_anyhow)?;
        leads.iter().map(encode).collect()
    }

    async fn get(&self, id: &str, _params: LeadsParams) -> Result<Value> {
        let lead = self.store.find_by_id(id).await.map_err(into_anyhow)?;
        encode(&lead)
    }

    async fn create(&self, data: Value, _params: LeadsParams) -> Result<Value> {
        let new: NewLead = decode(data)?;
        let lead = self.store.append(Lead::create(new)).await.map_err(into_anyhow)?;

        tracing::info!(lead_id = %lead.id, status = %lead.status, "lead created");
        encode(&lead)
    }

    async fn update(&self, id: &str, data: Value, _params: LeadsParams) -> Result<Value> {
        let StatusUpdate { status } = decode(data)?;
        let lead = self.store.update_status(id, status).await.map_err(into_anyhow)?;

        tracing::info!(lead_id = %lead.id, status = %lead.status, "lead status changed");
        encode(&lead)
    }
}
