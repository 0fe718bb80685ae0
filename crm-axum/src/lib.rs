//! crm-axum: Axum adapter for crm-core.
//!
//! Builds Axum routers from a [`crm_core::CrmApp`] and its services.

pub mod app;
mod error;
pub mod params;
pub mod rest;
pub mod state;

pub use app::{axum, AxumApp};
pub use error::CrmAxumError;
pub use state::ServiceState;
