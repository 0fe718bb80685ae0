//! Forwards every newly created lead to the context-ingestion service.
//!
//! A listener on the `leads` service's `created` event spawns one POST per
//! lead and returns immediately, so the HTTP response never waits on the
//! remote call. Outcomes are logged with the lead id; nothing is retried.

use std::time::Duration;

use anyhow::{Context, Result};
use crm_core::events::listener;
use crm_core::{CrmApp, CrmConfigSnapshot, EventListener, ServiceEventKind};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::config::DEFAULT_INGEST_URL;
use crate::services::leads::Lead;
use crate::services::LeadsParams;

pub const INGEST_SOURCE: &str = "platform/crm/leads";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Serialize)]
pub struct IngestDocument {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct IngestRequest {
    pub documents: Vec<IngestDocument>,
    pub source: &'static str,
    pub context_type: &'static str,
    pub scope: &'static str,
}

impl IngestRequest {
    pub fn for_lead(lead: &Lead) -> Self {
        Self {
            documents: vec![IngestDocument {
                content: summary(lead),
            }],
            source: INGEST_SOURCE,
            context_type: "resource",
            scope: "internal",
        }
    }
}

/// Plain-text summary indexed by the context service.
pub fn summary(lead: &Lead) -> String {
    let company = if lead.company.is_empty() { "N/A" } else { &lead.company };
    format!(
        "Lead Name: {}\nEmail: {}\nCompany: {}\nSource: {}\nStatus: {}\nCreated At: {}",
        lead.name, lead.email, company, lead.source, lead.status, lead.created_at
    )
}

#[derive(Debug, Clone)]
pub struct ContextIngestClient {
    client: Client,
    url: String,
    token: String,
}

impl ContextIngestClient {
    pub fn new(url: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building context-ingest HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
            token: token.into(),
        })
    }

    /// `None` when no `ingest.token` is configured.
    pub fn from_config(config: &CrmConfigSnapshot) -> Result<Option<Self>> {
        let Some(token) = config
            .get("ingest.token")
            .map(str::trim)
            .filter(|t| !t.is_empty())
        else {
            return Ok(None);
        };

        let url = config.get("ingest.url").unwrap_or(DEFAULT_INGEST_URL);
        let timeout = config.get_u64("ingest.timeoutSecs").unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self::new(url, token, Duration::from_secs(timeout)).map(Some)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn forward(&self, lead: &Lead) -> Result<()> {
        let res = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&IngestRequest::for_lead(lead))
            .send()
            .await
            .context("context-ingest request failed")?;

        res.error_for_status()
            .context("context-ingest service rejected the lead")?;
        Ok(())
    }
}

/// Listener for `leads` `created` events.
pub fn forward_created(client: ContextIngestClient) -> EventListener<Value, LeadsParams> {
    listener(move |result, _ctx| {
        let created = result.as_one().cloned();
        Box::pin(spawn_forward(client.clone(), created))
    })
}

async fn spawn_forward(client: ContextIngestClient, created: Option<Value>) -> Result<()> {
    let Some(value) = created else {
        return Ok(());
    };
    let lead: Lead = serde_json::from_value(value).context("created lead has an unexpected shape")?;

    tokio::spawn(async move {
        match client.forward(&lead).await {
            Ok(()) => tracing::info!(lead_id = %lead.id, "lead forwarded to context service"),
            Err(e) => tracing::warn!(
                lead_id = %lead.id,
                error = %format!("{e:#}"),
                "lead forward to context service failed"
            ),
        }
    });

    Ok(())
}

pub fn configure(app: &CrmApp<Value, LeadsParams>) -> Result<()> {
    match ContextIngestClient::from_config(&app.config_snapshot())? {
        Some(client) => {
            tracing::info!(url = client.url(), "forwarding new leads to context service");
            app.on("leads", ServiceEventKind::Created, forward_created(client));
        }
        None => {
            tracing::warn!("CONTEXT_INGEST_TOKEN is not set; new leads will not be forwarded");
        }
    }
    Ok(())
}
