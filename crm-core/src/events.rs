//! Service events.
//!
//! After a successful write the app emits `created`, `updated`, `patched`
//! or `removed` for the service that handled it. Listeners run after the
//! after-hooks; a failing listener is logged and never fails the call.

use std::collections::HashMap;
use std::sync::Arc;

use crate::hooks::HookFut;
use crate::{HookContext, HookResult, ServiceMethodKind};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceEventKind {
    Created,
    Updated,
    Patched,
    Removed,
}

impl ServiceEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceEventKind::Created => "created",
            ServiceEventKind::Updated => "updated",
            ServiceEventKind::Patched => "patched",
            ServiceEventKind::Removed => "removed",
        }
    }
}

pub fn method_to_standard_event(method: &ServiceMethodKind) -> Option<ServiceEventKind> {
    match method {
        ServiceMethodKind::Create => Some(ServiceEventKind::Created),
        ServiceMethodKind::Update => Some(ServiceEventKind::Updated),
        ServiceMethodKind::Patch => Some(ServiceEventKind::Patched),
        ServiceMethodKind::Remove => Some(ServiceEventKind::Removed),
        ServiceMethodKind::Find | ServiceMethodKind::Get => None,
    }
}

/// Listener signature (async).
pub type EventListener<R, P> = Arc<
    dyn for<'a> Fn(&'a HookResult<R>, &'a HookContext<R, P>) -> HookFut<'a> + Send + Sync,
>;

/// Box a closure as an [`EventListener`]. Going through this function lets
/// the compiler infer the higher-ranked closure signature.
pub fn listener<R, P, F>(f: F) -> EventListener<R, P>
where
    F: for<'a> Fn(&'a HookResult<R>, &'a HookContext<R, P>) -> HookFut<'a> + Send + Sync + 'static,
{
    Arc::new(f)
}

pub struct CrmEventHub<R, P> {
    listeners: HashMap<(String, ServiceEventKind), Vec<EventListener<R, P>>>,
}

impl<R, P> Default for CrmEventHub<R, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, P> CrmEventHub<R, P> {
    pub fn new() -> Self {
        Self {
            listeners: HashMap::new(),
        }
    }

    pub fn on(
        &mut self,
        service: impl Into<String>,
        event: ServiceEventKind,
        listener: EventListener<R, P>,
    ) {
        self.listeners
            .entry((service.into(), event))
            .or_default()
            .push(listener);
    }

    /// Cloned so the caller can drop the hub lock before awaiting.
    pub fn snapshot(&self, service: &str, event: &ServiceEventKind) -> Vec<EventListener<R, P>> {
        self.listeners
            .get(&(service.to_string(), event.clone()))
            .cloned()
            .unwrap_or_default()
    }
}
