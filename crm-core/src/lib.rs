//! crm-core: transport-agnostic core for the lead tracker.
//!
//! Services are registered by name on a [`CrmApp`], called through a hook
//! pipeline, and report failures as structured [`CrmError`]s that any
//! transport (HTTP, CLI, jobs) can render.

pub mod app;
pub mod config;
pub mod errors;
pub mod events;
pub mod hooks;
pub mod registry;
pub mod schema;
pub mod service;

pub use app::{CrmApp, ServiceHandle};
pub use config::{CrmConfig, CrmConfigSnapshot};
pub use errors::{CrmError, ErrorKind};
pub use events::{CrmEventHub, EventListener, ServiceEventKind};
pub use hooks::{
    CrmAfterHook, CrmAroundHook, CrmBeforeHook, CrmErrorHook, HookContext, HookFut, HookResult,
    Next, ServiceHooks,
};
pub use registry::CrmServiceRegistry;
pub use schema::{HookMeta, Rules, SchemaHooksExt, ValidateData, WriteMethods};
pub use service::{CrmService, ServiceCapabilities, ServiceMethodKind};
