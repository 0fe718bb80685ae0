//! # Hooks
//!
//! Every service call runs through the same pipeline:
//!
//! ```text
//! around → before → service → after
//!                ↘ error (on any failure)
//! ```
//!
//! App-level hooks run before service-level hooks. Around hooks wrap
//! everything inside them; the first registered is the outermost.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::ServiceMethodKind;

pub type HookFut<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// What a service call produced.
#[derive(Debug, Clone, PartialEq)]
pub enum HookResult<R> {
    One(R),
    Many(Vec<R>),
}

impl<R> HookResult<R> {
    pub fn as_one(&self) -> Option<&R> {
        match self {
            HookResult::One(r) => Some(r),
            HookResult::Many(_) => None,
        }
    }
}

/// State shared by all hooks of one service call.
#[derive(Debug)]
pub struct HookContext<R, P> {
    pub service: String,
    pub method: ServiceMethodKind,
    pub id: Option<String>,
    pub params: P,
    /// Input payload for create/update/patch.
    pub data: Option<R>,
    pub result: Option<HookResult<R>>,
    pub error: Option<anyhow::Error>,
}

impl<R, P> HookContext<R, P> {
    pub fn new(service: impl Into<String>, method: ServiceMethodKind, params: P) -> Self {
        Self {
            service: service.into(),
            method,
            id: None,
            params,
            data: None,
            result: None,
            error: None,
        }
    }
}

/// The rest of the pipeline, handed to an around hook.
pub struct Next<R, P> {
    call: Box<dyn for<'a> FnOnce(&'a mut HookContext<R, P>) -> HookFut<'a> + Send>,
}

impl<R, P> Next<R, P> {
    pub fn new<F>(f: F) -> Self
    where
        F: for<'a> FnOnce(&'a mut HookContext<R, P>) -> HookFut<'a> + Send + 'static,
    {
        Self { call: Box::new(f) }
    }

    pub async fn run(self, ctx: &mut HookContext<R, P>) -> Result<()> {
        (self.call)(ctx).await
    }
}

#[async_trait]
pub trait CrmBeforeHook<R, P>: Send + Sync {
    async fn run(&self, ctx: &mut HookContext<R, P>) -> Result<()>;
}

#[async_trait]
pub trait CrmAfterHook<R, P>: Send + Sync {
    async fn run(&self, ctx: &mut HookContext<R, P>) -> Result<()>;
}

/// Runs with `ctx.error` set. Clearing it (and setting `ctx.result`)
/// recovers the call.
#[async_trait]
pub trait CrmErrorHook<R, P>: Send + Sync {
    async fn run(&self, ctx: &mut HookContext<R, P>) -> Result<()>;
}

#[async_trait]
pub trait CrmAroundHook<R, P>: Send + Sync {
    async fn run(&self, ctx: &mut HookContext<R, P>, next: Next<R, P>) -> Result<()>;
}

type ByMethod<H> = HashMap<ServiceMethodKind, Vec<Arc<H>>>;

/// Hooks registered for the whole app or for one service.
///
/// Around and error hooks wrap every method; before and after hooks may
/// also be bound to a single method.
pub struct ServiceHooks<R, P> {
    pub(crate) around_all: Vec<Arc<dyn CrmAroundHook<R, P>>>,
    pub(crate) before_all: Vec<Arc<dyn CrmBeforeHook<R, P>>>,
    pub(crate) after_all: Vec<Arc<dyn CrmAfterHook<R, P>>>,
    pub(crate) error_all: Vec<Arc<dyn CrmErrorHook<R, P>>>,

    pub(crate) before_by_method: ByMethod<dyn CrmBeforeHook<R, P>>,
    pub(crate) after_by_method: ByMethod<dyn CrmAfterHook<R, P>>,
}

impl<R, P> Default for ServiceHooks<R, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, P> ServiceHooks<R, P> {
    pub fn new() -> Self {
        Self {
            around_all: Vec::new(),
            before_all: Vec::new(),
            after_all: Vec::new(),
            error_all: Vec::new(),
            before_by_method: HashMap::new(),
            after_by_method: HashMap::new(),
        }
    }

    pub fn around_all(&mut self, hook: Arc<dyn CrmAroundHook<R, P>>) -> &mut Self {
        self.around_all.push(hook);
        self
    }

    pub fn before_all(&mut self, hook: Arc<dyn CrmBeforeHook<R, P>>) -> &mut Self {
        self.before_all.push(hook);
        self
    }

    pub fn after_all(&mut self, hook: Arc<dyn CrmAfterHook<R, P>>) -> &mut Self {
        self.after_all.push(hook);
        self
    }

    pub fn error_all(&mut self, hook: Arc<dyn CrmErrorHook<R, P>>) -> &mut Self {
        self.error_all.push(hook);
        self
    }

    pub fn before(
        &mut self,
        method: ServiceMethodKind,
        hook: Arc<dyn CrmBeforeHook<R, P>>,
    ) -> &mut Self {
        self.before_by_method.entry(method).or_default().push(hook);
        self
    }

    pub fn after(&mut self, method: ServiceMethodKind, hook: Arc<dyn CrmAfterHook<R, P>>) -> &mut Self {
        self.after_by_method.entry(method).or_default().push(hook);
        self
    }

    pub fn before_create(&mut self, hook: Arc<dyn CrmBeforeHook<R, P>>) -> &mut Self {
        self.before(ServiceMethodKind::Create, hook)
    }

    pub fn after_create(&mut self, hook: Arc<dyn CrmAfterHook<R, P>>) -> &mut Self {
        self.after(ServiceMethodKind::Create, hook)
    }
}

/// `*_all` hooks first, then the ones registered for `method`.
pub(crate) fn collect_method_hooks<H: ?Sized>(
    all: &[Arc<H>],
    by_method: &ByMethod<H>,
    method: &ServiceMethodKind,
) -> Vec<Arc<H>> {
    let mut out: Vec<Arc<H>> = all.to_vec();
    if let Some(v) = by_method.get(method) {
        out.extend(v.iter().cloned());
    }
    out
}
