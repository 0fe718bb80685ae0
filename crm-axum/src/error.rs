use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use crm_core::CrmError;

const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Debug)]
pub struct CrmAxumError(pub anyhow::Error);

impl From<anyhow::Error> for CrmAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for CrmAxumError {
    fn into_response(self) -> Response {
        // A CrmError anywhere in the chain keeps its status and fields;
        // anything else becomes an opaque GeneralError.
        let safe = match CrmError::from_anyhow(&self.0) {
            Some(crm) => crm.sanitize_for_client(),
            None => CrmError::general_error(INTERNAL_ERROR),
        };

        let status = StatusCode::from_u16(safe.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!("request failed: {:#}", self.0);
        }

        (status, Json(safe.to_json())).into_response()
    }
}
