use std::path::PathBuf;

use crm_core::CrmError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("lead not found: {0}")]
    NotFound(String),

    #[error("lead already exists: {0}")]
    Conflict(String),

    #[error("lead file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("lead file {path:?} is not a JSON array of leads: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn serialization(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Serialization {
            path: path.into(),
            source,
        }
    }
}

impl From<StoreError> for CrmError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => CrmError::not_found("Lead not found"),
            StoreError::Conflict(id) => CrmError::conflict(format!("Lead already exists: {id}")),
            other => CrmError::general_error("Lead store failure").with_source(other.into()),
        }
    }
}

/// `StoreError` → `CrmError` → `anyhow::Error`, for use with `map_err`.
pub fn into_anyhow(err: StoreError) -> anyhow::Error {
    CrmError::from(err).into_anyhow()
}

#[cfg(test)]
mod tests {
    use crm_core::ErrorKind;

    use super::*;

    #[test]
    fn maps_to_client_errors() {
        assert_eq!(CrmError::from(StoreError::NotFound("x".into())).kind, ErrorKind::NotFound);
        assert_eq!(
            CrmError::from(StoreError::NotFound("x".into())).message,
            "Lead not found"
        );
        assert_eq!(CrmError::from(StoreError::Conflict("x".into())).kind, ErrorKind::Conflict);
    }

    #[test]
    fn io_failures_are_general_errors_that_keep_their_source() {
        let err = StoreError::io("data/leads.json", std::io::Error::other("disk gone"));
        let crm = CrmError::from(err);

        assert_eq!(crm.kind, ErrorKind::GeneralError);
        assert_eq!(crm.message, "Lead store failure");
        assert!(crm.source.is_some());
        assert!(crm.sanitize_for_client().source.is_none());
    }
}
