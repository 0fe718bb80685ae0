use std::fmt;
use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pipeline stage of a lead: new → contacted → qualified → converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Converted,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 4] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::Converted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Converted => "converted",
        }
    }

    /// Wire names, in pipeline order.
    pub fn names() -> [&'static str; 4] {
        Self::ALL.map(|s| s.as_str())
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown lead status: {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for LeadStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company: String,
    pub source: String,
    pub status: LeadStatus,
    pub created_at: String,
}

/// A validated creation payload.
#[derive(Debug, Clone, Deserialize)]
pub struct NewLead {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    pub source: String,
    pub status: LeadStatus,
}

/// Body of a status change. Any other field is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub status: LeadStatus,
}

impl Lead {
    /// Stamps a fresh UUID v4 id and the current UTC time.
    pub fn create(new: NewLead) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            email: new.email,
            company: new.company.unwrap_or_default(),
            source: new.source,
            status: new.status,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn ann() -> NewLead {
        NewLead {
            name: "Ann".into(),
            email: "a@x.com".into(),
            company: None,
            source: "manual".into(),
            status: LeadStatus::New,
        }
    }

    #[test]
    fn status_round_trips_through_its_wire_name() {
        for status in LeadStatus::ALL {
            assert_eq!(status.as_str().parse::<LeadStatus>().unwrap(), status);
            assert_eq!(serde_json::to_value(status).unwrap(), json!(status.as_str()));
        }
        assert_eq!(LeadStatus::names(), ["new", "contacted", "qualified", "converted"]);
    }

    #[test]
    fn unknown_statuses_are_rejected() {
        assert_eq!("lost".parse::<LeadStatus>(), Err(UnknownStatus("lost".into())));
        assert_eq!("New".parse::<LeadStatus>(), Err(UnknownStatus("New".into())));
        assert!(serde_json::from_value::<LeadStatus>(json!("won")).is_err());
    }

    #[test]
    fn create_stamps_id_timestamp_and_empty_company() {
        let a = Lead::create(ann());
        let b = Lead::create(ann());

        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
        assert!(chrono::DateTime::parse_from_rfc3339(&a.created_at).is_ok());
        assert_eq!(a.company, "");
    }

    #[test]
    fn serializes_with_created_at_key_and_defaults_company_on_read() {
        let lead = Lead::create(ann());
        let value = serde_json::to_value(&lead).unwrap();
        assert_eq!(value["createdAt"], json!(lead.created_at));
        assert!(value.get("created_at").is_none());

        let read: Lead = serde_json::from_value(json!({
            "id": "1",
            "name": "Bo",
            "email": "b@x.com",
            "source": "manual",
            "status": "qualified",
            "createdAt": "2024-01-01T00:00:00.000Z"
        }))
        .unwrap();
        assert_eq!(read.company, "");
        assert_eq!(read.status, LeadStatus::Qualified);
    }
}
