//! # Configuration
//!
//! A minimal string key/value store with `app.set()` / `app.get()`.
//! Applications decide where values come from (environment, files,
//! test fixtures); hooks and services read an immutable snapshot.
//!
//! ```rust
//! use crm_core::CrmApp;
//! let app = CrmApp::<(), ()>::new();
//!
//! app.set("http.port", "3000");
//! assert_eq!(app.get("http.port"), Some("3000".to_string()));
//! ```

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct CrmConfig {
    values: HashMap<String, String>,
}

impl CrmConfig {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn snapshot(&self) -> CrmConfigSnapshot {
        CrmConfigSnapshot::new(self.values.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CrmConfigSnapshot {
    map: HashMap<String, String>,
}

impl CrmConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }
}
