use std::sync::Arc;

use crm_core::{CrmApp, ServiceHandle};

/// Router state for one mounted service.
pub struct ServiceState<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    pub app: Arc<CrmApp<R, P>>,
    pub service: Arc<str>,
}

impl<R, P> Clone for ServiceState<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            app: Arc::clone(&self.app),
            service: Arc::clone(&self.service),
        }
    }
}

impl<R, P> ServiceState<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    pub fn new(app: Arc<CrmApp<R, P>>, service: &str) -> Self {
        Self {
            app,
            service: Arc::from(service),
        }
    }

    pub fn handle(&self) -> anyhow::Result<ServiceHandle<R, P>> {
        self.app.service(&self.service)
    }
}
