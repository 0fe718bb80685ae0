//! # Errors
//!
//! Structured errors with a stable HTTP status and class name.
//! - carried through `anyhow::Error` so hooks and services can use `?`
//! - transport-agnostic: the adapter decides how to serialize
//! - `to_json()` renders the client payload

use std::fmt;

use anyhow::Error as AnyError;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,     // 400
    NotFound,       // 404
    Conflict,       // 409
    GeneralError,   // 500
    NotImplemented, // 501
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::GeneralError => 500,
            ErrorKind::NotImplemented => 501,
        }
    }

    /// Error `name` (e.g. "NotFound")
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::GeneralError => "GeneralError",
            ErrorKind::NotImplemented => "NotImplemented",
        }
    }

    /// Kebab-cased `className`
    pub fn class_name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad-request",
            ErrorKind::NotFound => "not-found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::GeneralError => "general-error",
            ErrorKind::NotImplemented => "not-implemented",
        }
    }
}

/// A structured error that can live inside `anyhow::Error`.
///
/// `errors` holds per-field details (e.g. `{"name": ["is required"]}`).
/// `source` never leaves the process.
#[derive(Debug)]
pub struct CrmError {
    pub kind: ErrorKind,
    pub message: String,
    pub errors: Option<Value>,
    pub source: Option<AnyError>,
}

impl CrmError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            errors: None,
            source: None,
        }
    }

    pub fn with_errors(mut self, errors: Value) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn with_source(mut self, source: AnyError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    /// Convert into `anyhow::Error` so it flows through the hook pipeline.
    pub fn into_anyhow(self) -> AnyError {
        AnyError::new(self)
    }

    /// Find a `CrmError` anywhere in an `anyhow` chain (contexts included).
    pub fn from_anyhow(err: &AnyError) -> Option<&CrmError> {
        err.chain().find_map(|e| e.downcast_ref::<CrmError>())
    }

    /// Copy suitable for clients: the inner `source` is dropped.
    pub fn sanitize_for_client(&self) -> CrmError {
        CrmError {
            kind: self.kind,
            message: self.message.clone(),
            errors: self.errors.clone(),
            source: None,
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, msg)
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, msg)
    }
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, msg)
    }
    pub fn general_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::GeneralError, msg)
    }
    pub fn not_implemented(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotImplemented, msg)
    }

    /// Client payload. `error` mirrors `message` for clients that only
    /// look for a single `error` string.
    pub fn to_json(&self) -> Value {
        let mut base = json!({
            "error": self.message,
            "name": self.name(),
            "message": self.message,
            "code": self.code(),
            "className": self.class_name(),
        });

        if let Some(e) = &self.errors {
            base["errors"] = e.clone();
        }
        base
    }
}

impl fmt::Display for CrmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.code(), self.message)
    }
}

impl std::error::Error for CrmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_json_carries_error_and_structured_fields() {
        let err = CrmError::bad_request("Missing required fields")
            .with_errors(json!({"name": ["is required"]}));

        let body = err.to_json();
        assert_eq!(body["error"], "Missing required fields");
        assert_eq!(body["message"], "Missing required fields");
        assert_eq!(body["name"], "BadRequest");
        assert_eq!(body["code"], 400);
        assert_eq!(body["className"], "bad-request");
        assert_eq!(body["errors"]["name"][0], "is required");
    }

    #[test]
    fn from_anyhow_sees_through_context() {
        let err = CrmError::not_found("Lead not found")
            .into_anyhow()
            .context("while updating status");

        let found = CrmError::from_anyhow(&err).expect("crm error in chain");
        assert_eq!(found.kind, ErrorKind::NotFound);
    }

    #[test]
    fn sanitize_keeps_fields_and_drops_source() {
        let crm = CrmError::general_error("Lead store failure")
            .with_source(anyhow::anyhow!("disk on fire"));
        assert!(std::error::Error::source(&crm).is_some());

        let safe = crm.sanitize_for_client();
        assert!(safe.source.is_none());
        assert_eq!(safe.kind, ErrorKind::GeneralError);
        assert_eq!(safe.message, "Lead store failure");
    }
}
