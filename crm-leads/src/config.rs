//! Settings, read into the app's key/value config at startup.
//!
//! | key                  | env var                       | default |
//! |----------------------|-------------------------------|---------|
//! | `http.host`          | `HTTP_HOST`                   | `127.0.0.1` |
//! | `http.port`          | `HTTP_PORT`                   | `3000` |
//! | `leads.store`        | `LEADS_STORE`                 | `memory` |
//! | `leads.file`         | `LEADS_FILE`                  | `data/leads.json` |
//! | `ingest.url`         | `CONTEXT_INGEST_URL`          | the Alchemyst context endpoint |
//! | `ingest.token`       | `CONTEXT_INGEST_TOKEN`        | unset: forwarding disabled |
//! | `ingest.timeoutSecs` | `CONTEXT_INGEST_TIMEOUT_SECS` | `10` |

use std::env;

use crm_core::CrmApp;
use serde_json::Value;

use crate::services::LeadsParams;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: &str = "3000";
pub const DEFAULT_INGEST_URL: &str = "https://platform-backend.getalchemystai.com/api/v1/context/add";

const SETTINGS: &[(&str, &str, Option<&str>)] = &[
    ("http.host", "HTTP_HOST", Some(DEFAULT_HOST)),
    ("http.port", "HTTP_PORT", Some(DEFAULT_PORT)),
    ("leads.store", "LEADS_STORE", Some("memory")),
    ("leads.file", "LEADS_FILE", Some(crate::store::DEFAULT_FILE)),
    ("ingest.url", "CONTEXT_INGEST_URL", Some(DEFAULT_INGEST_URL)),
    ("ingest.token", "CONTEXT_INGEST_TOKEN", None),
    ("ingest.timeoutSecs", "CONTEXT_INGEST_TIMEOUT_SECS", Some("10")),
];

pub fn defaults(app: &CrmApp<Value, LeadsParams>) {
    for (key, _, default) in SETTINGS {
        if let Some(value) = default {
            app.set(*key, *value);
        }
    }
}

/// Overrides defaults with every non-blank env var from the table above.
pub fn from_env(app: &CrmApp<Value, LeadsParams>) {
    apply(app, |var| env::var(var).ok());
}

pub fn apply<F>(app: &CrmApp<Value, LeadsParams>, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    for (key, var, _) in SETTINGS {
        if let Some(value) = lookup(*var).filter(|v| !v.trim().is_empty()) {
            app.set(*key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_leave_the_token_unset() {
        let app: CrmApp<Value, LeadsParams> = CrmApp::new();
        defaults(&app);

        assert_eq!(app.get("http.port").as_deref(), Some("3000"));
        assert_eq!(app.get("leads.store").as_deref(), Some("memory"));
        assert_eq!(app.get("leads.file").as_deref(), Some("data/leads.json"));
        assert_eq!(app.get("ingest.url").as_deref(), Some(DEFAULT_INGEST_URL));
        assert!(app.get("ingest.token").is_none());
    }

    #[test]
    fn env_values_override_and_blanks_are_ignored() {
        let app: CrmApp<Value, LeadsParams> = CrmApp::new();
        defaults(&app);

        let vars: HashMap<&str, &str> = HashMap::from([
            ("HTTP_PORT", "8080"),
            ("LEADS_STORE", "file"),
            ("CONTEXT_INGEST_TOKEN", "t0k"),
            ("HTTP_HOST", "  "),
        ]);
        apply(&app, |var| vars.get(var).map(|v| v.to_string()));

        assert_eq!(app.get("http.port").as_deref(), Some("8080"));
        assert_eq!(app.get("leads.store").as_deref(), Some("file"));
        assert_eq!(app.get("ingest.token").as_deref(), Some("t0k"));
        assert_eq!(app.get("http.host").as_deref(), Some(DEFAULT_HOST));
    }
}
