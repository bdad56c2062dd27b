use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;

use crate::hooks::collect_method_hooks;
use crate::{
    AfterHook, BeforeHook, ErrorHook, HookContext, HookResult, MartConfig, MartConfigSnapshot,
    MartError, MartService, ServiceCapabilities, ServiceHooks, ServiceMethodKind,
    ServiceRegistry, TenantContext,
};

struct MartAppInner<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    registry: RwLock<ServiceRegistry<R, P>>,
    global_hooks: RwLock<ServiceHooks<R, P>>,
    service_hooks: RwLock<HashMap<String, ServiceHooks<R, P>>>,
    config: RwLock<MartConfig>,
}

/// Central application container.
///
/// Holds the service registry, app-wide and per-service hooks, and config.
/// Cloning is cheap and shares the same state.
pub struct MartApp<R, P = ()>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    inner: Arc<MartAppInner<R, P>>,
}

type HooksForMethod<R, P> = (
    Vec<Arc<dyn BeforeHook<R, P>>>,
    Vec<Arc<dyn AfterHook<R, P>>>,
    Vec<Arc<dyn ErrorHook<R, P>>>,
);

impl<R, P> Default for MartApp<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R, P> Clone for MartApp<R, P>
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

impl<R, P> MartApp<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MartAppInner {
                registry: RwLock::new(ServiceRegistry::new()),
                global_hooks: RwLock::new(ServiceHooks::new()),
                service_hooks: RwLock::new(HashMap::new()),
                config: RwLock::new(MartConfig::new()),
            }),
        }
    }

    pub fn register_service<S>(&self, name: S, service: Arc<dyn MartService<R, P>>)
    where
        S: Into<String>,
    {
        self.inner.registry.write().register(name, service);
    }

    /// App-wide hooks, applied to every service before its own hooks.
    pub fn hooks<F>(&self, f: F)
    where
        F: FnOnce(&mut ServiceHooks<R, P>),
    {
        let mut hooks = self.inner.global_hooks.write();
        f(&mut hooks);
    }

    fn configure_service_hooks<F>(&self, service_name: &str, f: F)
    where
        F: FnOnce(&mut ServiceHooks<R, P>),
    {
        let mut map = self.inner.service_hooks.write();
        let hooks = map.entry(service_name.to_string()).or_default();
        f(hooks);
    }

    pub fn service(&self, name: &str) -> Result<ServiceHandle<R, P>> {
        let service = self
            .inner
            .registry
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| MartError::not_found(format!("Service not found: {name}")).into_anyhow())?;

        Ok(ServiceHandle {
            app: self.clone(),
            name: name.to_string(),
            service,
        })
    }

    pub fn set<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.inner.config.write().set(key, value);
    }

    pub fn set_default<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.inner.config.write().set_default(key, value);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.config.read().get(key).map(str::to_string)
    }

    /// Overlay `PREFIX__A__B` environment variables onto the config.
    pub fn load_env(&self, prefix: &str) -> usize {
        self.inner.config.write().load_env(prefix)
    }

    pub fn load_vars<I>(&self, prefix: &str, vars: I) -> usize
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.inner.config.write().load_vars(prefix, vars)
    }

    pub fn config_snapshot(&self) -> MartConfigSnapshot {
        self.inner.config.read().snapshot()
    }
}

/// A registered service bound to its app; every call runs the hook pipeline.
pub struct ServiceHandle<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    app: MartApp<R, P>,
    name: String,
    service: Arc<dyn MartService<R, P>>,
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

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capabilities(&self) -> ServiceCapabilities {
        self.service.capabilities()
    }

    pub fn inner(&self) -> &Arc<dyn MartService<R, P>> {
        &self.service
    }

    fn collect_hooks_for_method(&self, method: &ServiceMethodKind) -> HooksForMethod<R, P> {
        let global = self.app.inner.global_hooks.read();
        let map = self.app.inner.service_hooks.read();

        let mut before = collect_method_hooks(&global.before_all, &global.before_by_method, method);
        let mut after = collect_method_hooks(&global.after_all, &global.after_by_method, method);
        let mut error = collect_method_hooks(&global.error_all, &global.error_by_method, method);

        if let Some(own) = map.get(&self.name) {
            before.extend(collect_method_hooks(&own.before_all, &own.before_by_method, method));
            after.extend(collect_method_hooks(&own.after_all, &own.after_by_method, method));
            error.extend(collect_method_hooks(&own.error_all, &own.error_by_method, method));
        }

        (before, after, error)
    }

    fn context(&self, tenant: TenantContext, method: ServiceMethodKind, params: P) -> HookContext<R, P> {
        HookContext::new(tenant, self.name.clone(), method, params, self.app.config_snapshot())
    }

    async fn invoke(&self, ctx: &mut HookContext<R, P>) -> Result<()> {
        let svc = &self.service;
        let result = match ctx.method {
            ServiceMethodKind::Find => {
                HookResult::Many(svc.find(&ctx.tenant, ctx.params.clone()).await?)
            }
            ServiceMethodKind::Get => {
                let id = required_id(ctx)?;
                HookResult::One(svc.get(&ctx.tenant, &id, ctx.params.clone()).await?)
            }
            ServiceMethodKind::Create => {
                let data = required_data(ctx)?;
                HookResult::One(svc.create(&ctx.tenant, data, ctx.params.clone()).await?)
            }
            ServiceMethodKind::Patch => {
                let id = required_id(ctx)?;
                let data = required_data(ctx)?;
                HookResult::One(svc.patch(&ctx.tenant, &id, data, ctx.params.clone()).await?)
            }
            ServiceMethodKind::Remove => {
                let id = required_id(ctx)?;
                HookResult::One(svc.remove(&ctx.tenant, &id, ctx.params.clone()).await?)
            }
            ServiceMethodKind::Custom(name) => {
                let data = ctx.data.take();
                HookResult::One(svc.custom(&ctx.tenant, name, data, ctx.params.clone()).await?)
            }
        };
        ctx.result = Some(result);
        Ok(())
    }

    async fn run_stages(
        &self,
        ctx: &mut HookContext<R, P>,
        before: &[Arc<dyn BeforeHook<R, P>>],
        after: &[Arc<dyn AfterHook<R, P>>],
    ) -> Result<()> {
        for hook in before {
            hook.run(ctx).await?;
        }

        // a before hook may have answered the call already
        if ctx.result.is_none() {
            self.invoke(ctx).await?;
        }

        for hook in after {
            hook.run(ctx).await?;
        }
        Ok(())
    }

    async fn run_pipeline(&self, mut ctx: HookContext<R, P>) -> Result<HookContext<R, P>> {
        let (before, after, error) = self.collect_hooks_for_method(&ctx.method);

        if let Err(err) = self.run_stages(&mut ctx, &before, &after).await {
            ctx.error = Some(err);

            for hook in &error {
                // a failing error hook must not mask the original error
                let _ = hook.run(&mut ctx).await;
            }

            if let Some(err) = ctx.error.take() {
                return Err(err);
            }
        }

        Ok(ctx)
    }

    pub async fn find(&self, tenant: TenantContext, params: P) -> Result<Vec<R>> {
        let ctx = self.context(tenant, ServiceMethodKind::Find, params);
        let ctx = self.run_pipeline(ctx).await?;

        match ctx.result {
            Some(HookResult::Many(v)) => Ok(v),
            Some(HookResult::One(v)) => Ok(vec![v]),
            None => Ok(vec![]),
        }
    }

    pub async fn get(&self, tenant: TenantContext, id: &str, params: P) -> Result<R> {
        let mut ctx = self.context(tenant, ServiceMethodKind::Get, params);
        ctx.id = Some(id.to_string());
        one(self.run_pipeline(ctx).await?, "get")
    }

    pub async fn create(&self, tenant: TenantContext, data: R, params: P) -> Result<R> {
        let mut ctx = self.context(tenant, ServiceMethodKind::Create, params);
        ctx.data = Some(data);
        one(self.run_pipeline(ctx).await?, "create")
    }

    pub async fn patch(&self, tenant: TenantContext, id: &str, data: R, params: P) -> Result<R> {
        let mut ctx = self.context(tenant, ServiceMethodKind::Patch, params);
        ctx.id = Some(id.to_string());
        ctx.data = Some(data);
        one(self.run_pipeline(ctx).await?, "patch")
    }

    pub async fn remove(&self, tenant: TenantContext, id: &str, params: P) -> Result<R> {
        let mut ctx = self.context(tenant, ServiceMethodKind::Remove, params);
        ctx.id = Some(id.to_string());
        one(self.run_pipeline(ctx).await?, "remove")
    }

    pub async fn custom(
        &self,
        tenant: TenantContext,
        method: &'static str,
        data: Option<R>,
        params: P,
    ) -> Result<R> {
        let mut ctx = self.context(tenant, ServiceMethodKind::Custom(method), params);
        ctx.data = data;
        one(self.run_pipeline(ctx).await?, method)
    }
}

fn required_id<R, P>(ctx: &HookContext<R, P>) -> Result<String> {
    ctx.id
        .clone()
        .ok_or_else(|| MartError::bad_request(format!("{}() requires an id", ctx.method.as_str())).into_anyhow())
}

fn required_data<R, P>(ctx: &mut HookContext<R, P>) -> Result<R> {
    let method = ctx.method.as_str();
    ctx.data
        .take()
        .ok_or_else(|| MartError::bad_request(format!("{method}() requires data")).into_anyhow())
}

fn one<R, P>(ctx: HookContext<R, P>, method: &str) -> Result<R> {
    match ctx.result {
        Some(HookResult::One(v)) => Ok(v),
        Some(HookResult::Many(_)) => Err(anyhow::anyhow!("{method}() produced many results unexpectedly")),
        None => Err(anyhow::anyhow!("{method}() produced no result")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct Echo;

    #[async_trait]
    impl MartService<String, ()> for Echo {
        async fn find(&self, _ctx: &TenantContext, _params: ()) -> Result<Vec<String>> {
            Ok(vec!["a".into(), "b".into()])
        }

        async fn create(&self, ctx: &TenantContext, data: String, _params: ()) -> Result<String> {
            if data == "boom" {
                return Err(MartError::conflict("boom").into_anyhow());
            }
            Ok(format!("{}:{data}", ctx.tenant_id.as_str()))
        }
    }

    struct Record(Arc<Mutex<Vec<String>>>, &'static str);

    #[async_trait]
    impl BeforeHook<String, ()> for Record {
        async fn run(&self, ctx: &mut HookContext<String, ()>) -> Result<()> {
            self.0.lock().push(format!("{}:{}", self.1, ctx.method.as_str()));
            Ok(())
        }
    }

    struct Upper;

    #[async_trait]
    impl AfterHook<String, ()> for Upper {
        async fn run(&self, ctx: &mut HookContext<String, ()>) -> Result<()> {
            if let Some(res) = ctx.result.take() {
                ctx.result = Some(res.map(|s| s.to_uppercase()));
            }
            Ok(())
        }
    }

    struct Recover;

    #[async_trait]
    impl ErrorHook<String, ()> for Recover {
        async fn run(&self, ctx: &mut HookContext<String, ()>) -> Result<()> {
            ctx.error = None;
            ctx.result = Some(HookResult::One("recovered".into()));
            Ok(())
        }
    }

    fn app() -> MartApp<String, ()> {
        let app = MartApp::new();
        app.register_service("echo", Arc::new(Echo));
        app
    }

    #[tokio::test]
    async fn global_hooks_run_before_service_hooks() {
        let app = app();
        let log = Arc::new(Mutex::new(Vec::new()));

        app.hooks(|h| {
            h.before_all(Arc::new(Record(Arc::clone(&log), "global")));
        });
        let svc = app.service("echo").unwrap().hooks(|h| {
            h.before_create(Arc::new(Record(Arc::clone(&log), "echo")));
            h.after_all(Arc::new(Upper));
        });

        let out = svc.create(TenantContext::new("t1"), "hi".into(), ()).await.unwrap();
        assert_eq!(out, "T1:HI");
        assert_eq!(*log.lock(), vec!["global:create", "echo:create"]);

        let many = svc.find(TenantContext::default(), ()).await.unwrap();
        assert_eq!(many, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn errors_propagate_unless_an_error_hook_recovers() {
        let app = app();
        let svc = app.service("echo").unwrap();

        let err = svc.create(TenantContext::default(), "boom".into(), ()).await.unwrap_err();
        assert_eq!(MartError::find_in(&err).map(|e| e.code()), Some(409));

        let svc = svc.hooks(|h| {
            h.error(ServiceMethodKind::Create, Arc::new(Recover));
        });
        let out = svc.create(TenantContext::default(), "boom".into(), ()).await.unwrap();
        assert_eq!(out, "recovered");
    }

    #[tokio::test]
    async fn unimplemented_methods_and_unknown_services() {
        let app = app();
        let err = app
            .service("echo")
            .unwrap()
            .remove(TenantContext::default(), "x", ())
            .await
            .unwrap_err();
        assert_eq!(MartError::find_in(&err).map(|e| e.code()), Some(501));

        let missing = app.service("nope").err().unwrap();
        assert_eq!(MartError::find_in(&missing).map(|e| e.code()), Some(404));
    }

    #[test]
    fn config_round_trip_through_app() {
        let app = app();
        app.set("http.port", "3036");
        app.set_default("http.port", "9999");
        app.load_vars("STOREFRONT", vec![("STOREFRONT__HTTP__HOST".into(), "0.0.0.0".into())]);

        let snap = app.config_snapshot();
        assert_eq!(snap.get_u16("http.port"), Some(3036));
        assert_eq!(app.get("http.host").as_deref(), Some("0.0.0.0"));
    }
}
