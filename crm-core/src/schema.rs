//! # Schema hooks
//!
//! - `ValidateData`: validate `ctx.data` for write methods
//! - `Rules`: collect per-field problems into one `BadRequest`
//!
//! Validators get a `&HookMeta`, an immutable view of the call's method,
//! id and params.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::{CrmBeforeHook, CrmError, HookContext, ServiceHooks, ServiceMethodKind};

/// Which write methods a schema hook applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMethods {
    Create,
    Update,
    AllWrites,
}

impl WriteMethods {
    #[inline]
    pub fn matches(&self, method: &ServiceMethodKind) -> bool {
        match self {
            WriteMethods::AllWrites => matches!(
                method,
                ServiceMethodKind::Create | ServiceMethodKind::Patch | ServiceMethodKind::Update
            ),
            WriteMethods::Create => matches!(method, ServiceMethodKind::Create),
            WriteMethods::Update => matches!(method, ServiceMethodKind::Update),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HookMeta<P> {
    pub service: String,
    pub method: ServiceMethodKind,
    pub id: Option<String>,
    pub params: P,
}

impl<P: Clone> HookMeta<P> {
    pub fn from_ctx<R>(ctx: &HookContext<R, P>) -> Self {
        Self {
            service: ctx.service.clone(),
            method: ctx.method.clone(),
            id: ctx.id.clone(),
            params: ctx.params.clone(),
        }
    }
}

pub type ValidateFn<R, P> = Arc<dyn Fn(&R, &HookMeta<P>) -> Result<()> + Send + Sync + 'static>;

fn missing_data(hook: &str) -> anyhow::Error {
    CrmError::bad_request(format!("{hook} requires data on write methods")).into_anyhow()
}

pub struct ValidateData<R, P> {
    methods: WriteMethods,
    validator: ValidateFn<R, P>,
}

impl<R, P> ValidateData<R, P> {
    pub fn new(validator: impl Fn(&R, &HookMeta<P>) -> Result<()> + Send + Sync + 'static) -> Self {
        Self {
            methods: WriteMethods::AllWrites,
            validator: Arc::new(validator),
        }
    }

    pub fn with_methods(mut self, methods: WriteMethods) -> Self {
        self.methods = methods;
        self
    }
}

#[async_trait]
impl<R, P> CrmBeforeHook<R, P> for ValidateData<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    async fn run(&self, ctx: &mut HookContext<R, P>) -> Result<()> {
        if !self.methods.matches(&ctx.method) {
            return Ok(());
        }

        let meta = HookMeta::from_ctx(ctx);
        let data = ctx.data.as_ref().ok_or_else(|| missing_data("ValidateData"))?;

        (self.validator)(data, &meta)
    }
}

/// Per-field validation of JSON payloads.
///
/// Problems accumulate as `{"field": ["message", ...]}` and [`Rules::check`]
/// turns them into a single `BadRequest` carrying that object as `errors`.
#[derive(Debug, Default)]
pub struct Rules {
    errors: Map<String, Value>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, field: &str, msg: &str) {
        let entry = self
            .errors
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(list) = entry {
            list.push(Value::String(msg.to_string()));
        }
    }

    /// `field` must be a non-empty string. Whitespace counts as content.
    pub fn required_str(mut self, data: &Value, field: &str) -> Self {
        match data.get(field) {
            Some(Value::String(s)) if !s.is_empty() => {}
            Some(Value::String(_)) | Some(Value::Null) | None => self.push(field, "is required"),
            Some(_) => self.push(field, "must be a string"),
        }
        self
    }

    /// `field` may be absent or null, otherwise it must be a string.
    pub fn optional_str(mut self, data: &Value, field: &str) -> Self {
        match data.get(field) {
            None | Some(Value::Null) | Some(Value::String(_)) => {}
            Some(_) => self.push(field, "must be a string"),
        }
        self
    }

    /// When `field` is a string it must be one of `allowed`.
    pub fn one_of(mut self, data: &Value, field: &str, allowed: &[&str]) -> Self {
        if let Some(Value::String(s)) = data.get(field) {
            if !allowed.contains(&s.as_str()) {
                let msg = format!("must be one of {}", allowed.join(", "));
                self.push(field, &msg);
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn check(self, message: &str) -> Result<()> {
        if self.errors.is_empty() {
            return Ok(());
        }
        Err(CrmError::bad_request(message)
            .with_errors(Value::Object(self.errors))
            .into_anyhow())
    }
}

/// Fluent builder used by `ServiceHooks::schema(...)`.
pub struct SchemaBuilder<'a, R, P> {
    hooks: &'a mut ServiceHooks<R, P>,
    current_methods: WriteMethods,
}

impl<'a, R, P> SchemaBuilder<'a, R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    fn new(hooks: &'a mut ServiceHooks<R, P>) -> Self {
        Self {
            hooks,
            current_methods: WriteMethods::AllWrites,
        }
    }

    pub fn on_create(&mut self) -> &mut Self {
        self.current_methods = WriteMethods::Create;
        self
    }

    pub fn on_update(&mut self) -> &mut Self {
        self.current_methods = WriteMethods::Update;
        self
    }

    pub fn validate(
        &mut self,
        f: impl Fn(&R, &HookMeta<P>) -> Result<()> + Send + Sync + 'static,
    ) -> &mut Self {
        let hook = ValidateData::<R, P>::new(f).with_methods(self.current_methods);
        self.hooks.before_all(Arc::new(hook));
        self
    }
}

/// Extension method: `hooks.schema(|s| ...)`
pub trait SchemaHooksExt<R, P> {
    fn schema<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut SchemaBuilder<'_, R, P>);
}

impl<R, P> SchemaHooksExt<R, P> for ServiceHooks<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    fn schema<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut SchemaBuilder<'_, R, P>),
    {
        let mut b = SchemaBuilder::new(self);
        f(&mut b);
        self
    }
}
