use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::hook::context::OperationContext;
use crate::store::StoreHandle;

/// A stage handler. Pre handlers may rewrite the request through the
/// context views; post handlers may rewrite the response. Handlers have
/// no failure channel: anything they want the caller to see goes through
/// the context.
#[async_trait]
pub trait HookHandler: Send + Sync {
    async fn handle(&self, ctx: &mut OperationContext);
}

struct FnHandler<F>(F);

#[async_trait]
impl<F> HookHandler for FnHandler<F>
where
    F: Fn(&mut OperationContext) + Send + Sync,
{
    async fn handle(&self, ctx: &mut OperationContext) {
        (self.0)(ctx)
    }
}

/// Wrap a synchronous closure as a stage handler. Handlers that need to
/// await something implement [`HookHandler`] directly.
///
/// ```ignore
/// let pre = handler_fn(|ctx| {
///     if let Some(query) = ctx.query_mut() {
///         query["tenant"] = "t1".into();
///     }
/// });
/// ```
pub fn handler_fn<F>(f: F) -> Arc<dyn HookHandler>
where
    F: Fn(&mut OperationContext) + Send + Sync + 'static,
{
    Arc::new(FnHandler(f))
}

/// Caller-supplied registration options.
#[derive(Clone, Default)]
pub struct HookConfig {
    /// The host to patch; required at registration time.
    pub target: Option<Arc<dyn StoreHandle>>,
    /// Identity for dedup.
    pub name: Option<String>,
    /// With `name`: suppress a duplicate registration.
    pub once: bool,
    /// With `once`: replace the prior same-named registration instead.
    pub replace: bool,
    /// Insert at the head of the list (runs first in both stages).
    pub top: bool,
    pub pre: Option<Arc<dyn HookHandler>>,
    pub post: Option<Arc<dyn HookHandler>>,
}

impl HookConfig {
    pub fn new(target: Arc<dyn StoreHandle>) -> Self {
        Self {
            target: Some(target),
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }

    pub fn replace(mut self) -> Self {
        self.replace = true;
        self
    }

    pub fn top(mut self) -> Self {
        self.top = true;
        self
    }

    pub fn pre(mut self, handler: Arc<dyn HookHandler>) -> Self {
        self.pre = Some(handler);
        self
    }

    pub fn post(mut self, handler: Arc<dyn HookHandler>) -> Self {
        self.post = Some(handler);
        self
    }
}

impl fmt::Debug for HookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookConfig")
            .field("name", &self.name)
            .field("once", &self.once)
            .field("replace", &self.replace)
            .field("top", &self.top)
            .field("pre", &self.pre.is_some())
            .field("post", &self.post.is_some())
            .finish()
    }
}

/// An accepted registration. Never mutated after insertion; `replace`
/// swaps the whole entry.
pub struct HookRegistration {
    pub name: Option<String>,
    pub once: bool,
    pub replace: bool,
    pub top: bool,
    pub pre: Option<Arc<dyn HookHandler>>,
    pub post: Option<Arc<dyn HookHandler>>,
}

impl HookRegistration {
    pub(crate) fn from_config(config: &HookConfig) -> Self {
        Self {
            name: config.name.clone(),
            once: config.once,
            replace: config.replace,
            top: config.top,
            pre: config.pre.clone(),
            post: config.post.clone(),
        }
    }
}

impl fmt::Debug for HookRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistration")
            .field("name", &self.name)
            .field("once", &self.once)
            .field("top", &self.top)
            .field("pre", &self.pre.is_some())
            .field("post", &self.post.is_some())
            .finish()
    }
}
