use anyhow::Result;
use async_trait::async_trait;

use crate::errors::CrmError;

/// Standard service methods: find, get, create, update, patch, remove.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceMethodKind {
    Find,
    Get,
    Create,
    Update,
    Patch,
    Remove,
}

impl ServiceMethodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceMethodKind::Find => "find",
            ServiceMethodKind::Get => "get",
            ServiceMethodKind::Create => "create",
            ServiceMethodKind::Update => "update",
            ServiceMethodKind::Patch => "patch",
            ServiceMethodKind::Remove => "remove",
        }
    }
}

/// Capabilities describe which methods a service exposes to the outside
/// world. Adapters mount only the allowed routes.
#[derive(Debug, Clone)]
pub struct ServiceCapabilities {
    pub allowed_methods: Vec<ServiceMethodKind>,
}

impl ServiceCapabilities {
    pub fn standard_crud() -> Self {
        use ServiceMethodKind::*;
        Self {
            allowed_methods: vec![Find, Get, Create, Update, Patch, Remove],
        }
    }

    pub fn from_methods(methods: Vec<ServiceMethodKind>) -> Self {
        Self {
            allowed_methods: methods,
        }
    }

    pub fn allows(&self, method: &ServiceMethodKind) -> bool {
        self.allowed_methods.contains(method)
    }
}

fn not_implemented<T>(method: &str) -> Result<T> {
    Err(CrmError::not_implemented(format!("Method not implemented: {method}")).into_anyhow())
}

/// Core service trait:
///
/// - `find`   → list many
/// - `get`    → fetch one by id
/// - `create` → create one
/// - `update` → replace (or, for narrow services, the one mutable aspect) by id
/// - `patch`  → partial update
/// - `remove` → delete by id
///
/// Every method defaults to "not implemented" so a service overrides only
/// what it supports.
#[async_trait]
pub trait CrmService<R, P = ()>: Send + Sync
where
    R: Send + 'static,
    P: Send + 'static,
{
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::standard_crud()
    }

    async fn find(&self, _params: P) -> Result<Vec<R>> {
        not_implemented("find")
    }

    async fn get(&self, _id: &str, _params: P) -> Result<R> {
        not_implemented("get")
    }

    async fn create(&self, _data: R, _params: P) -> Result<R> {
        not_implemented("create")
    }

    async fn update(&self, _id: &str, _data: R, _params: P) -> Result<R> {
        not_implemented("update")
    }

    async fn patch(&self, _id: Option<&str>, _data: R, _params: P) -> Result<R> {
        not_implemented("patch")
    }

    async fn remove(&self, _id: Option<&str>, _params: P) -> Result<R> {
        not_implemented("remove")
    }
}
