use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;

use super::{LeadStore, StoreError, StoreKind};
use crate::services::leads::{Lead, LeadStatus};

/// Leads kept as one pretty-printed JSON array.
///
/// Every call re-reads the file; a missing file reads as no leads. Writes
/// serialize the whole list to a sibling temp file and rename it over the
/// target. Writers in this process are serialized by `write_lock`.
#[derive(Debug)]
pub struct JsonFileLeadStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileLeadStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "leads.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn load(&self) -> Result<Vec<Lead>, StoreError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        serde_json::from_slice(&bytes).map_err(|e| StoreError::serialization(&self.path, e))
    }

    async fn save(&self, leads: &[Lead]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        let body = serde_json::to_vec_pretty(leads)
            .map_err(|e| StoreError::serialization(&self.path, e))?;

        let tmp = self.temp_path();
        fs::write(&tmp, body).await.map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;

        tracing::debug!(path = %self.path.display(), count = leads.len(), "lead file written");
        Ok(())
    }
}

#[async_trait]
impl LeadStore for JsonFileLeadStore {
    fn kind(&self) -> StoreKind {
        StoreKind::File
    }

    async fn list(&self) -> Result<Vec<Lead>, StoreError> {
        self.load().await
    }

    async fn append(&self, lead: Lead) -> Result<Lead, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut leads = self.load().await?;
        if leads.iter().any(|l| l.id == lead.id) {
            return Err(StoreError::Conflict(lead.id));
        }
        leads.push(lead.clone());
        self.save(&leads).await?;

        Ok(lead)
    }

    async fn find_by_id(&self, id: &str) -> Result<Lead, StoreError> {
        self.load()
            .await?
            .into_iter()
            .find(|l| l.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update_status(&self, id: &str, status: LeadStatus) -> Result<Lead, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut leads = self.load().await?;
        let lead = leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        lead.status = status;
        let updated = lead.clone();

        self.save(&leads).await?;
        Ok(updated)
    }
}
