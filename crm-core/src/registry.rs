use std::collections::HashMap;
use std::sync::Arc;

use crate::CrmService;

/// Maps service names to service instances so any transport can call them.
pub struct CrmServiceRegistry<R, P = ()>
where
    R: Send + 'static,
    P: Send + 'static,
{
    services: HashMap<String, Arc<dyn CrmService<R, P>>>,
}

impl<R, P> CrmServiceRegistry<R, P>
where
    R: Send + 'static,
    P: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
        }
    }

    /// Register a service under a given name. Returns the service it
    /// replaced, if the name was taken.
    pub fn register<S>(
        &mut self,
        name: S,
        service: Arc<dyn CrmService<R, P>>,
    ) -> Option<Arc<dyn CrmService<R, P>>>
    where
        S: Into<String>,
    {
        self.services.insert(name.into(), service)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn CrmService<R, P>>> {
        self.services.get(name)
    }
}

impl<R, P> Default for CrmServiceRegistry<R, P>
where
    R: Send + 'static,
    P: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nop;

    #[async_trait::async_trait]
    impl CrmService<(), ()> for Nop {}

    #[test]
    fn registering_a_taken_name_hands_back_the_old_service() {
        let mut registry: CrmServiceRegistry<(), ()> = CrmServiceRegistry::new();
        let first: Arc<dyn CrmService<(), ()>> = Arc::new(Nop);

        assert!(registry.register("leads", Arc::clone(&first)).is_none());
        let replaced = registry.register("leads", Arc::new(Nop)).unwrap();

        assert!(Arc::ptr_eq(&replaced, &first));
        assert!(registry.get("leads").is_some());
        assert!(registry.get("other").is_none());
    }
}
