use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{LeadStore, StoreError, StoreKind};
use crate::services::leads::{Lead, LeadStatus};

/// Leads held in process memory, shared by every request.
#[derive(Debug, Default)]
pub struct MemoryLeadStore {
    leads: RwLock<Vec<Lead>>,
}

impl MemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_leads(leads: Vec<Lead>) -> Self {
        Self {
            leads: RwLock::new(leads),
        }
    }
}

#[async_trait]
impl LeadStore for MemoryLeadStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Memory
    }

    async fn list(&self) -> Result<Vec<Lead>, StoreError> {
        Ok(self.leads.read().await.clone())
    }

    async fn append(&self, lead: Lead) -> Result<Lead, StoreError> {
        let mut leads = self.leads.write().await;
        if leads.iter().any(|l| l.id == lead.id) {
            return Err(StoreError::Conflict(lead.id));
        }
        leads.push(lead.clone());
        Ok(lead)
    }

    async fn find_by_id(&self, id: &str) -> Result<Lead, StoreError> {
        self.leads
            .read()
            .await
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update_status(&self, id: &str, status: LeadStatus) -> Result<Lead, StoreError> {
        let mut leads = self.leads.write().await;
        let lead = leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        lead.status = status;
        Ok(lead.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::leads::NewLead;

    fn lead(name: &str) -> Lead {
        Lead::create(NewLead {
            name: name.into(),
            email: format!("{name}@x.com"),
            company: None,
            source: "manual".into(),
            status: LeadStatus::New,
        })
    }

    #[tokio::test]
    async fn append_keeps_insertion_order() {
        let store = MemoryLeadStore::new();
        let a = store.append(lead("ann")).await.unwrap();
        let b = store.append(lead("bo")).await.unwrap();

        let all = store.list().await.unwrap();
        assert_eq!(all, vec![a, b]);
    }

    #[tokio::test]
    async fn duplicate_ids_conflict() {
        let store = MemoryLeadStore::new();
        let a = store.append(lead("ann")).await.unwrap();

        let err = store.append(a.clone()).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(id) if id == a.id));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_status_touches_only_the_target() {
        let a = lead("ann");
        let b = lead("bo");
        let store = MemoryLeadStore::with_leads(vec![a.clone(), b.clone()]);

        let updated = store.update_status(&a.id, LeadStatus::Contacted).await.unwrap();

        assert_eq!(updated, Lead { status: LeadStatus::Contacted, ..a });
        assert_eq!(store.find_by_id(&b.id).await.unwrap(), b);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let store = MemoryLeadStore::with_leads(vec![lead("ann")]);

        assert!(matches!(store.find_by_id("nope").await, Err(StoreError::NotFound(_))));
        assert!(matches!(
            store.update_status("nope", LeadStatus::Converted).await,
            Err(StoreError::NotFound(_))
        ));
        assert_eq!(store.list().await.unwrap()[0].status, LeadStatus::New);
    }
}
