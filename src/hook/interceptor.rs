// Method interceptor. Wraps a driver collection handle so each call runs
// pre hooks, reaches the driver exactly once, and runs post hooks inside
// the driver's completion before the caller's own continuation fires.

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::config::config as settings;
use crate::hook::args::{CallArg, Completion};
use crate::hook::context::OperationContext;
use crate::hook::kind::OperationKind;
use crate::hook::pipeline::{run_stage, HookStage, PipelineComplete};
use crate::hook::registry::{HookRegistry, TargetHooks};
use crate::store::{RawCollection, StoreHandle};

/// Interceptor-wrapped collection handle. Call shape and completion
/// contract are identical to the raw handle's; a call only gets pipeline
/// treatment when its target has registered plugins.
pub struct HookedCollection {
    raw: Arc<dyn RawCollection>,
    registry: Arc<HookRegistry>,
}

impl HookedCollection {
    pub fn new(raw: Arc<dyn RawCollection>, registry: Arc<HookRegistry>) -> Self {
        Self { raw, registry }
    }

    pub fn name(&self) -> &str {
        self.raw.name()
    }

    /// The unwrapped driver handle.
    pub fn raw(&self) -> &Arc<dyn RawCollection> {
        &self.raw
    }

    /// Route one call. Skipped entirely (straight to the driver, no
    /// context) when the target has no plugins, or when the first
    /// argument is a callback - that shape signals a manual low-level
    /// invocation that bypasses hooking.
    pub async fn dispatch(&self, kind: OperationKind, args: Vec<CallArg>) {
        let manual_style = args.first().map(CallArg::is_callback).unwrap_or(false);

        match self.registry.hooks_for(self.raw.name()) {
            Some(config) if !manual_style && !config.is_empty() => {
                self.intercept(kind, args, config).await
            }
            _ => {
                if settings().trace.operations {
                    trace!(
                        "{}.{} passes through unhooked",
                        self.raw.name(),
                        kind.method_name()
                    );
                }
                self.raw.call(kind, args).await
            }
        }
    }

    async fn intercept(&self, kind: OperationKind, args: Vec<CallArg>, config: Arc<TargetHooks>) {
        let plugins = config.snapshot();

        if settings().trace.operations {
            debug!(
                "Intercepting {}.{} with {} plugins",
                self.raw.name(),
                kind.method_name(),
                plugins.len()
            );
        }

        let mut ctx = OperationContext::new(self.raw.clone(), kind, args, config);
        let PipelineComplete = run_stage(&plugins, HookStage::Pre, &mut ctx).await;

        // Pre handlers may have rewritten the arguments; the driver gets
        // the rewritten list.
        let mut call_args = ctx.request.clone();

        match call_args.last().and_then(CallArg::as_callback).cloned() {
            Some(upstream) => {
                // Splice the post stage in place of the caller's
                // completion. The cell hands the same context to the
                // completion path once the driver resolves.
                let cell = Arc::new(Mutex::new(ctx));
                let spliced = {
                    let plugins = plugins.clone();
                    Completion::new(move |scope, response| {
                        let cell = cell.clone();
                        let plugins = plugins.clone();
                        let upstream = upstream.clone();
                        Box::pin(async move {
                            let mut ctx = cell.lock().await;
                            ctx.absorb_response(scope.clone(), response);
                            run_stage(&plugins, HookStage::Post, &mut ctx).await;
                            let forwarded = ctx.response.clone();
                            drop(ctx);
                            upstream.invoke(scope, forwarded).await;
                        })
                    })
                };

                let last = call_args.len() - 1;
                call_args[last] = CallArg::Callback(spliced);
                self.raw.call(kind, call_args).await;
            }
            None => {
                // No completion argument to splice: pre ran, the driver
                // still gets called, post never fires.
                self.raw.call(kind, call_args).await;
            }
        }
    }

    pub async fn insert(&self, docs: Value, options: Value, callback: Completion) {
        self.dispatch(
            OperationKind::Insert,
            vec![docs.into(), options.into(), callback.into()],
        )
        .await
    }

    pub async fn find(&self, query: Value, options: Value, callback: Completion) {
        self.dispatch(
            OperationKind::Find,
            vec![query.into(), options.into(), callback.into()],
        )
        .await
    }

    pub async fn find_one(&self, query: Value, options: Value, callback: Completion) {
        self.dispatch(
            OperationKind::FindOne,
            vec![query.into(), options.into(), callback.into()],
        )
        .await
    }

    pub async fn remove(&self, query: Value, options: Value, callback: Completion) {
        self.dispatch(
            OperationKind::Remove,
            vec![query.into(), options.into(), callback.into()],
        )
        .await
    }

    pub async fn aggregate(&self, pipeline: Value, options: Value, callback: Completion) {
        self.dispatch(
            OperationKind::Aggregate,
            vec![pipeline.into(), options.into(), callback.into()],
        )
        .await
    }

    pub async fn map_reduce(&self, map: Value, reduce: Value, options: Value, callback: Completion) {
        self.dispatch(
            OperationKind::MapReduce,
            vec![map.into(), reduce.into(), options.into(), callback.into()],
        )
        .await
    }

    pub async fn update(&self, query: Value, update: Value, options: Value, callback: Completion) {
        self.dispatch(
            OperationKind::Update,
            vec![query.into(), update.into(), options.into(), callback.into()],
        )
        .await
    }

    pub async fn find_and_modify(
        &self,
        query: Value,
        sort: Value,
        update: Value,
        options: Value,
        callback: Completion,
    ) {
        self.dispatch(
            OperationKind::FindAndModify,
            vec![
                query.into(),
                sort.into(),
                update.into(),
                options.into(),
                callback.into(),
            ],
        )
        .await
    }

    pub async fn find_and_remove(
        &self,
        query: Value,
        sort: Value,
        options: Value,
        callback: Completion,
    ) {
        self.dispatch(
            OperationKind::FindAndRemove,
            vec![query.into(), sort.into(), options.into(), callback.into()],
        )
        .await
    }
}

/// Interceptor-wrapped store host; the bootstrap surface.
pub struct HookedStore {
    raw: Arc<dyn StoreHandle>,
    registry: Arc<HookRegistry>,
}

impl HookedStore {
    /// Wrap a host and mark it patched. The boolean reports whether this
    /// call performed the patch; re-attaching an already-patched host is
    /// a no-op that still yields a usable wrapper.
    pub fn attach(raw: Arc<dyn StoreHandle>, registry: Arc<HookRegistry>) -> (Self, bool) {
        let fresh = registry.patch_host(raw.id());
        if fresh {
            debug!("Patched store host '{}'", raw.id());
        }
        (Self { raw, registry }, fresh)
    }

    pub fn id(&self) -> &str {
        self.raw.id()
    }

    pub fn raw(&self) -> &Arc<dyn StoreHandle> {
        &self.raw
    }

    /// Hooked view of a collection; `None` when the driver has no such
    /// collection.
    pub fn collection(&self, name: &str) -> Option<HookedCollection> {
        self.raw
            .collection(name)
            .map(|raw| HookedCollection::new(raw, self.registry.clone()))
    }
}
