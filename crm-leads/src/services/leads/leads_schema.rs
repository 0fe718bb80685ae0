use anyhow::Result;
use crm_core::{CrmApp, Rules, SchemaHooksExt};
use serde_json::Value;

use super::LeadStatus;
use crate::services::LeadsParams;

pub const MISSING_FIELDS: &str = "Missing required fields";
pub const INVALID_STATUS: &str = "Invalid lead status";
pub const INVALID_FIELDS: &str = "Invalid lead fields";

pub fn register(app: &CrmApp<Value, LeadsParams>) -> Result<()> {
    app.service("leads")?.hooks(|h| {
        h.schema(|s| {
            s.on_create().validate(|data, _meta| validate_create(data));
            s.on_update().validate(|data, _meta| validate_status_update(data));
        });
    });
    Ok(())
}

/// `name`, `email`, `source` and `status` must be non-empty strings,
/// `status` one of the four stages and `company`, if given, a string.
pub fn validate_create(data: &Value) -> Result<()> {
    Rules::new()
        .required_str(data, "name")
        .required_str(data, "email")
        .required_str(data, "source")
        .required_str(data, "status")
        .check(MISSING_FIELDS)?;

    Rules::new()
        .one_of(data, "status", &LeadStatus::names())
        .check(INVALID_STATUS)?;

    Rules::new().optional_str(data, "company").check(INVALID_FIELDS)
}

pub fn validate_status_update(data: &Value) -> Result<()> {
    Rules::new().required_str(data, "status").check(MISSING_FIELDS)?;

    Rules::new()
        .one_of(data, "status", &LeadStatus::names())
        .check(INVALID_STATUS)
}

#[cfg(test)]
mod tests {
    use crm_core::{CrmError, ErrorKind};
    use serde_json::json;

    use super::*;

    fn rejection(res: Result<()>) -> (String, Value) {
        let err = res.unwrap_err();
        let crm = CrmError::from_anyhow(&err).unwrap();
        assert_eq!(crm.kind, ErrorKind::BadRequest);
        (crm.message.clone(), crm.errors.clone().unwrap())
    }

    #[test]
    fn complete_payload_passes() {
        let data = json!({"name": "Ann", "email": "a@x.com", "source": "manual", "status": "new"});
        assert!(validate_create(&data).is_ok());
    }

    #[test]
    fn each_missing_field_is_reported() {
        for field in ["name", "email", "source", "status"] {
            let mut data = json!({"name": "Ann", "email": "a@x.com", "source": "manual", "status": "new"});
            data[field] = json!("");

            let (message, errors) = rejection(validate_create(&data));
            assert_eq!(message, MISSING_FIELDS);
            assert_eq!(errors, json!({ field: ["is required"] }));
        }
    }

    #[test]
    fn whitespace_counts_as_a_value() {
        let data = json!({"name": " ", "email": "a@x.com", "source": "manual", "status": "new"});
        assert!(validate_create(&data).is_ok());
    }

    #[test]
    fn unknown_status_is_invalid_not_missing() {
        let data = json!({"name": "Ann", "email": "a@x.com", "source": "manual", "status": "won"});

        let (message, errors) = rejection(validate_create(&data));
        assert_eq!(message, INVALID_STATUS);
        assert_eq!(errors["status"], json!(["must be one of new, contacted, qualified, converted"]));
    }

    #[test]
    fn company_must_be_a_string_when_present() {
        let data = json!({"name": "Ann", "email": "a@x.com", "company": 7, "source": "manual", "status": "new"});

        let (message, _) = rejection(validate_create(&data));
        assert_eq!(message, INVALID_FIELDS);
    }

    #[test]
    fn status_update_needs_a_known_status() {
        assert!(validate_status_update(&json!({"status": "converted"})).is_ok());
        assert_eq!(rejection(validate_status_update(&json!({}))).0, MISSING_FIELDS);
        assert_eq!(rejection(validate_status_update(&json!({"status": "lost"}))).0, INVALID_STATUS);
    }
}
