use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, Result};

use crate::events::{method_to_standard_event, CrmEventHub, EventListener, ServiceEventKind};
use crate::hooks::collect_method_hooks;
use crate::{
    CrmAfterHook, CrmAroundHook, CrmBeforeHook, CrmConfig, CrmConfigSnapshot, CrmError,
    CrmErrorHook, CrmService, CrmServiceRegistry, HookContext, HookResult, Next,
    ServiceCapabilities, ServiceHooks, ServiceMethodKind,
};

struct CrmAppInner<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    registry: RwLock<CrmServiceRegistry<R, P>>,
    global_hooks: RwLock<ServiceHooks<R, P>>,
    service_hooks: RwLock<HashMap<String, ServiceHooks<R, P>>>,
    config: RwLock<CrmConfig>,
    events: RwLock<CrmEventHub<R, P>>,
}

// Lock poisoning is recovered, not propagated.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// The application container.
///
/// Framework-agnostic. Holds:
/// - service registry
/// - app hooks
/// - per-service hooks
/// - config
/// - event listeners
pub struct CrmApp<R, P = ()>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    inner: Arc<CrmAppInner<R, P>>,
}

type HooksForMethod<R, P> = (
    Vec<Arc<dyn CrmAroundHook<R, P>>>,
    Vec<Arc<dyn CrmBeforeHook<R, P>>>,
    Vec<Arc<dyn CrmAfterHook<R, P>>>,
    Vec<Arc<dyn CrmErrorHook<R, P>>>,
);

impl<R, P> Default for CrmApp<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R, P> Clone for CrmApp<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, P> CrmApp<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CrmAppInner {
                registry: RwLock::new(CrmServiceRegistry::new()),
                global_hooks: RwLock::new(ServiceHooks::new()),
                service_hooks: RwLock::new(HashMap::new()),
                config: RwLock::new(CrmConfig::new()),
                events: RwLock::new(CrmEventHub::new()),
            }),
        }
    }

    /// Each name should be registered once; a second registration replaces
    /// the first and is logged.
    pub fn register_service<S>(&self, name: S, service: Arc<dyn CrmService<R, P>>)
    where
        S: Into<String>,
    {
        let name = name.into();
        if write(&self.inner.registry).register(name.clone(), service).is_some() {
            tracing::warn!(service = %name, "service registered twice; replacing the earlier one");
        }
    }

    /// App-wide hooks, run before any service-level hooks.
    pub fn hooks<F>(&self, f: F)
    where
        F: FnOnce(&mut ServiceHooks<R, P>),
    {
        let mut g = write(&self.inner.global_hooks);
        f(&mut g);
    }

    pub(crate) fn configure_service_hooks<F>(&self, service_name: &str, f: F)
    where
        F: FnOnce(&mut ServiceHooks<R, P>),
    {
        let mut map = write(&self.inner.service_hooks);
        let hooks = map.entry(service_name.to_string()).or_default();
        f(hooks);
    }

    pub fn service(&self, name: &str) -> Result<ServiceHandle<R, P>> {
        let svc = read(&self.inner.registry)
            .get(name)
            .cloned()
            .ok_or_else(|| CrmError::not_found(format!("Service not found: {name}")).into_anyhow())?;

        Ok(ServiceHandle {
            app: self.clone(),
            name: name.to_string(),
            service: svc,
        })
    }

    pub fn set<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        write(&self.inner.config).set(key, value);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        read(&self.inner.config).get(key).map(|v| v.to_string())
    }

    pub fn config_snapshot(&self) -> CrmConfigSnapshot {
        read(&self.inner.config).snapshot()
    }

    /// `app.on("leads", ServiceEventKind::Created, listener(|result, ctx| { ... }))`
    pub fn on(&self, service: impl Into<String>, event: ServiceEventKind, listener: EventListener<R, P>) {
        write(&self.inner.events).on(service, event, listener);
    }
}

pub struct ServiceHandle<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    app: CrmApp<R, P>,
    name: String,
    service: Arc<dyn CrmService<R, P>>,
}

impl<R, P> ServiceHandle<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    pub fn hooks<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut ServiceHooks<R, P>),
    {
        self.app.configure_service_hooks(&self.name, f);
        self
    }

    pub fn on(&self, event: ServiceEventKind, listener: EventListener<R, P>) {
        self.app.on(self.name.clone(), event, listener);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capabilities(&self) -> ServiceCapabilities {
        self.service.capabilities()
    }

    /// Global hooks first, then the service's own.
    fn collect_hooks_for_method(&self, method: &ServiceMethodKind) -> HooksForMethod<R, P> {
        let g = read(&self.app.inner.global_hooks);
        let map = read(&self.app.inner.service_hooks);

        let mut around = g.around_all.clone();
        let mut before = collect_method_hooks(&g.before_all, &g.before_by_method, method);
        let mut after = collect_method_hooks(&g.after_all, &g.after_by_method, method);
        let mut error = g.error_all.clone();

        if let Some(h) = map.get(&self.name) {
            around.extend(h.around_all.iter().cloned());
            before.extend(collect_method_hooks(&h.before_all, &h.before_by_method, method));
            after.extend(collect_method_hooks(&h.after_all, &h.after_by_method, method));
            error.extend(h.error_all.iter().cloned());
        }

        (around, before, after, error)
    }

    async fn run_pipeline(&self, mut ctx: HookContext<R, P>) -> Result<HookContext<R, P>> {
        let (around, before, after, error) = self.collect_hooks_for_method(&ctx.method);
        let svc = Arc::clone(&self.service);

        let mut next: Next<R, P> = Next::new(move |ctx| {
            Box::pin(async move {
                for h in &before {
                    h.run(ctx).await?;
                }

                dispatch(svc, ctx).await?;

                for h in &after {
                    h.run(ctx).await?;
                }

                Ok(())
            })
        });

        for hook in around.into_iter().rev() {
            let prev = next;
            next = Next::new(move |ctx| Box::pin(async move { hook.run(ctx, prev).await }));
        }

        if let Err(e) = next.run(&mut ctx).await {
            ctx.error = Some(e);

            for h in &error {
                if let Err(replaced) = h.run(&mut ctx).await {
                    ctx.error = Some(replaced);
                }
            }

            if let Some(err) = ctx.error.take() {
                return Err(err);
            }
        }

        if let Some(event) = method_to_standard_event(&ctx.method) {
            let listeners = read(&self.app.inner.events).snapshot(&self.name, &event);

            if let Some(result) = ctx.result.as_ref() {
                for listener in &listeners {
                    if let Err(e) = listener(result, &ctx).await {
                        tracing::warn!(
                            service = %self.name,
                            event = event.as_str(),
                            error = %e,
                            "event listener failed"
                        );
                    }
                }
            }
        }

        Ok(ctx)
    }

    fn context(&self, method: ServiceMethodKind, params: P) -> HookContext<R, P> {
        HookContext::new(self.name.clone(), method, params)
    }

    pub async fn find(&self, params: P) -> Result<Vec<R>> {
        let ctx = self.context(ServiceMethodKind::Find, params);
        let ctx = self.run_pipeline(ctx).await?;

        match ctx.result {
            Some(HookResult::Many(v)) => Ok(v),
            Some(HookResult::One(_)) => Err(anyhow!("find() produced HookResult::One unexpectedly")),
            None => Ok(vec![]),
        }
    }

    pub async fn get(&self, id: &str, params: P) -> Result<R> {
        let mut ctx = self.context(ServiceMethodKind::Get, params);
        ctx.id = Some(id.to_string());

        let ctx = self.run_pipeline(ctx).await?;
        expect_one(ctx, "get")
    }

    pub async fn create(&self, data: R, params: P) -> Result<R> {
        let mut ctx = self.context(ServiceMethodKind::Create, params);
        ctx.data = Some(data);

        let ctx = self.run_pipeline(ctx).await?;
        expect_one(ctx, "create")
    }

    pub async fn update(&self, id: &str, data: R, params: P) -> Result<R> {
        let mut ctx = self.context(ServiceMethodKind::Update, params);
        ctx.id = Some(id.to_string());
        ctx.data = Some(data);

        let ctx = self.run_pipeline(ctx).await?;
        expect_one(ctx, "update")
    }

    pub async fn patch(&self, id: Option<&str>, data: R, params: P) -> Result<R> {
        let mut ctx = self.context(ServiceMethodKind::Patch, params);
        ctx.id = id.map(str::to_string);
        ctx.data = Some(data);

        let ctx = self.run_pipeline(ctx).await?;
        expect_one(ctx, "patch")
    }

    pub async fn remove(&self, id: Option<&str>, params: P) -> Result<R> {
        let mut ctx = self.context(ServiceMethodKind::Remove, params);
        ctx.id = id.map(str::to_string);

        let ctx = self.run_pipeline(ctx).await?;
        expect_one(ctx, "remove")
    }
}

fn expect_one<R, P>(ctx: HookContext<R, P>, method: &str) -> Result<R> {
    match ctx.result {
        Some(HookResult::One(v)) => Ok(v),
        Some(HookResult::Many(_)) => Err(anyhow!("{method}() produced HookResult::Many unexpectedly")),
        None => Err(anyhow!("{method}() produced no result")),
    }
}

fn require_id<R, P>(ctx: &HookContext<R, P>) -> Result<String> {
    ctx.id.clone().ok_or_else(|| {
        CrmError::bad_request(format!("{}() requires an id", ctx.method.as_str())).into_anyhow()
    })
}

fn take_data<R, P>(ctx: &mut HookContext<R, P>) -> Result<R> {
    let method = ctx.method.as_str();
    ctx.data
        .take()
        .ok_or_else(|| CrmError::bad_request(format!("{method}() requires data")).into_anyhow())
}

/// The innermost step of the pipeline: call the service and store its
/// output in `ctx.result`.
async fn dispatch<R, P>(svc: Arc<dyn CrmService<R, P>>, ctx: &mut HookContext<R, P>) -> Result<()>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    let params = ctx.params.clone();

    let result = match ctx.method.clone() {
        ServiceMethodKind::Find => HookResult::Many(svc.find(params).await?),
        ServiceMethodKind::Get => {
            let id = require_id(ctx)?;
            HookResult::One(svc.get(&id, params).await?)
        }
        ServiceMethodKind::Create => {
            let data = take_data(ctx)?;
            HookResult::One(svc.create(data, params).await?)
        }
        ServiceMethodKind::Update => {
            let id = require_id(ctx)?;
            let data = take_data(ctx)?;
            HookResult::One(svc.update(&id, data, params).await?)
        }
        ServiceMethodKind::Patch => {
            let id = ctx.id.clone();
            let data = take_data(ctx)?;
            HookResult::One(svc.patch(id.as_deref(), data, params).await?)
        }
        ServiceMethodKind::Remove => {
            let id = ctx.id.clone();
            HookResult::One(svc.remove(id.as_deref(), params).await?)
        }
    };

    ctx.result = Some(result);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::ErrorKind;

    type Log = Arc<Mutex<Vec<String>>>;

    struct Notes {
        log: Log,
    }

    #[async_trait]
    impl CrmService<String, ()> for Notes {
        async fn find(&self, _params: ()) -> Result<Vec<String>> {
            self.log.lock().unwrap().push("service".into());
            Ok(vec!["a".into(), "b".into()])
        }

        async fn get(&self, id: &str, _params: ()) -> Result<String> {
            Err(CrmError::not_found(format!("no note {id}")).into_anyhow())
        }

        async fn create(&self, data: String, _params: ()) -> Result<String> {
            self.log.lock().unwrap().push("service".into());
            Ok(data.to_uppercase())
        }
    }

    struct Mark(Log, &'static str);

    #[async_trait]
    impl CrmBeforeHook<String, ()> for Mark {
        async fn run(&self, _ctx: &mut HookContext<String, ()>) -> Result<()> {
            self.0.lock().unwrap().push(self.1.into());
            Ok(())
        }
    }

    struct MarkAfter(Log);

    #[async_trait]
    impl CrmAfterHook<String, ()> for MarkAfter {
        async fn run(&self, _ctx: &mut HookContext<String, ()>) -> Result<()> {
            self.0.lock().unwrap().push("after".into());
            Ok(())
        }
    }

    struct Wrap(Log);

    #[async_trait]
    impl CrmAroundHook<String, ()> for Wrap {
        async fn run(&self, ctx: &mut HookContext<String, ()>, next: Next<String, ()>) -> Result<()> {
            self.0.lock().unwrap().push("around:in".into());
            next.run(ctx).await?;
            self.0.lock().unwrap().push("around:out".into());
            Ok(())
        }
    }

    struct Fallback;

    #[async_trait]
    impl CrmErrorHook<String, ()> for Fallback {
        async fn run(&self, ctx: &mut HookContext<String, ()>) -> Result<()> {
            ctx.error = None;
            ctx.result = Some(HookResult::One("fallback".into()));
            Ok(())
        }
    }

    fn app_with_log() -> (CrmApp<String, ()>, Log) {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let app = CrmApp::new();
        app.register_service("notes", Arc::new(Notes { log: Arc::clone(&log) }));
        (app, log)
    }

    #[tokio::test]
    async fn pipeline_runs_global_then_service_hooks_around_the_call() {
        let (app, log) = app_with_log();

        app.hooks(|h| {
            h.around_all(Arc::new(Wrap(Arc::clone(&log))));
            h.before_all(Arc::new(Mark(Arc::clone(&log), "before:global")));
        });
        app.service("notes").unwrap().hooks(|h| {
            h.before_create(Arc::new(Mark(Arc::clone(&log), "before:create")));
            h.after_create(Arc::new(MarkAfter(Arc::clone(&log))));
        });

        let out = app.service("notes").unwrap().create("hi".into(), ()).await.unwrap();

        assert_eq!(out, "HI");
        assert_eq!(
            *log.lock().unwrap(),
            vec!["around:in", "before:global", "before:create", "service", "after", "around:out"]
        );
    }

    #[tokio::test]
    async fn method_hooks_do_not_leak_into_other_methods() {
        let (app, log) = app_with_log();
        app.service("notes").unwrap().hooks(|h| {
            h.before_create(Arc::new(Mark(Arc::clone(&log), "before:create")));
        });

        let all = app.service("notes").unwrap().find(()).await.unwrap();

        assert_eq!(all, vec!["a", "b"]);
        assert_eq!(*log.lock().unwrap(), vec!["service"]);
    }

    #[tokio::test]
    async fn error_hook_can_recover_a_failed_call() {
        let (app, _log) = app_with_log();
        let notes = app.service("notes").unwrap();

        let err = notes.get("x", ()).await.unwrap_err();
        assert_eq!(CrmError::from_anyhow(&err).unwrap().kind, ErrorKind::NotFound);

        let notes = notes.hooks(|h| {
            h.error_all(Arc::new(Fallback));
        });
        assert_eq!(notes.get("x", ()).await.unwrap(), "fallback");
    }

    #[tokio::test]
    async fn unimplemented_methods_report_not_implemented() {
        let (app, _log) = app_with_log();

        let err = app.service("notes").unwrap().remove(Some("a"), ()).await.unwrap_err();

        assert_eq!(CrmError::from_anyhow(&err).unwrap().kind, ErrorKind::NotImplemented);
    }

    #[tokio::test]
    async fn created_listeners_see_the_result_and_reads_emit_nothing() {
        let (app, _log) = app_with_log();
        let seen: Log = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        app.on(
            "notes",
            ServiceEventKind::Created,
            crate::events::listener(move |result, ctx| {
                let sink = Arc::clone(&sink);
                let line = format!("{}:{}", ctx.service, result.as_one().cloned().unwrap_or_default());
                Box::pin(async move {
                    sink.lock().unwrap().push(line);
                    Ok::<(), anyhow::Error>(())
                })
            }),
        );

        let notes = app.service("notes").unwrap();
        notes.find(()).await.unwrap();
        notes.create("x".into(), ()).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["notes:X"]);
    }

    #[test]
    fn unknown_service_is_not_found() {
        let app: CrmApp<String, ()> = CrmApp::new();
        let err = app.service("missing").err().unwrap();
        assert_eq!(CrmError::from_anyhow(&err).unwrap().kind, ErrorKind::NotFound);
    }
}
