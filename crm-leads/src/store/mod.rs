//! Lead persistence.
//!
//! One [`LeadStore`] trait, two backends picked once at startup by
//! `leads.store`:
//! - `memory`: process-local, lost on restart
//! - `file`: a single pretty-printed JSON array on disk

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use crm_core::CrmConfigSnapshot;

use crate::services::leads::{Lead, LeadStatus};

pub mod error;
pub mod file;
pub mod memory;

pub use error::StoreError;
pub use file::JsonFileLeadStore;
pub use memory::MemoryLeadStore;

pub const DEFAULT_FILE: &str = "data/leads.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    File,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Memory => "memory",
            StoreKind::File => "file",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "memory" => Ok(StoreKind::Memory),
            "file" => Ok(StoreKind::File),
            other => bail!("unknown lead store {other:?} (expected \"memory\" or \"file\")"),
        }
    }
}

/// The authoritative, insertion-ordered collection of leads.
#[async_trait]
pub trait LeadStore: Send + Sync {
    fn kind(&self) -> StoreKind;

    async fn list(&self) -> Result<Vec<Lead>, StoreError>;

    /// Adds `lead` at the end. An id already present is a `Conflict`.
    async fn append(&self, lead: Lead) -> Result<Lead, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Lead, StoreError>;

    /// Changes only `status`; every other field is left as stored.
    async fn update_status(&self, id: &str, status: LeadStatus) -> Result<Lead, StoreError>;
}

pub fn from_config(config: &CrmConfigSnapshot) -> Result<Arc<dyn LeadStore>> {
    let kind: StoreKind = config.get("leads.store").unwrap_or("memory").parse()?;

    let store: Arc<dyn LeadStore> = match kind {
        StoreKind::Memory => Arc::new(MemoryLeadStore::new()),
        StoreKind::File => {
            let path = config.get("leads.file").unwrap_or(DEFAULT_FILE);
            tracing::info!(path, "leads persisted to JSON file");
            Arc::new(JsonFileLeadStore::new(path))
        }
    };

    tracing::info!(store = %kind, "lead store ready");
    Ok(store)
}
