use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::hook::args::{CallArg, CompletionArgs, ResponseScope};
use crate::hook::kind::OperationKind;
use crate::hook::registry::TargetHooks;
use crate::hook::table::{self, Field};
use crate::store::RawCollection;

/// Per-call record threaded through the hook pipeline.
///
/// Created fresh for every intercepted call and owned by that call's
/// pipeline run. The named request views (`query`, `update`, `insert`,
/// `options`, `pipeline`, `map_fn`, `reduce_fn`) resolve through the
/// argument table at access time, so a mutation through a `_mut` view is
/// a mutation of the positional argument the driver will receive.
pub struct OperationContext {
    target: Arc<dyn RawCollection>,
    pub kind: OperationKind,
    /// Original ordered argument list; contents mutable by pre handlers.
    pub request: Vec<CallArg>,
    config: Arc<TargetHooks>,
    response_scope: Option<ResponseScope>,
    /// Raw completion arguments, `[error, data, stats]`; empty until the
    /// driver completes, contents mutable by post handlers.
    pub response: CompletionArgs,
}

impl OperationContext {
    pub(crate) fn new(
        target: Arc<dyn RawCollection>,
        kind: OperationKind,
        request: Vec<CallArg>,
        config: Arc<TargetHooks>,
    ) -> Self {
        Self {
            target,
            kind,
            request,
            config,
            response_scope: None,
            response: Vec::new(),
        }
    }

    /// The physical handle the call was made against.
    pub fn target(&self) -> &Arc<dyn RawCollection> {
        &self.target
    }

    pub fn target_name(&self) -> &str {
        self.target.name()
    }

    /// The resolved target configuration handed to this pipeline run.
    pub fn config(&self) -> &Arc<TargetHooks> {
        &self.config
    }

    /// Per-target setting, if one was stored under `key`.
    pub fn setting(&self, key: &str) -> Option<Value> {
        self.config.setting(key)
    }

    fn view(&self, field: Field) -> Option<&Value> {
        table::path_for(self.kind, field).and_then(|path| table::resolve(&self.request, path))
    }

    fn view_mut(&mut self, field: Field) -> Option<&mut Value> {
        table::path_for(self.kind, field)
            .and_then(|path| table::resolve_mut(&mut self.request, path))
    }

    pub fn query(&self) -> Option<&Value> {
        self.view(Field::Query)
    }

    pub fn query_mut(&mut self) -> Option<&mut Value> {
        self.view_mut(Field::Query)
    }

    pub fn update(&self) -> Option<&Value> {
        self.view(Field::Update)
    }

    pub fn update_mut(&mut self) -> Option<&mut Value> {
        self.view_mut(Field::Update)
    }

    /// Insert document: the literal docs for `insert`, or the
    /// `$setOnInsert` document of an upsert.
    pub fn insert(&self) -> Option<&Value> {
        self.view(Field::Insert)
    }

    pub fn insert_mut(&mut self) -> Option<&mut Value> {
        self.view_mut(Field::Insert)
    }

    pub fn options(&self) -> Option<&Value> {
        self.view(Field::Options)
    }

    pub fn options_mut(&mut self) -> Option<&mut Value> {
        self.view_mut(Field::Options)
    }

    pub fn pipeline(&self) -> Option<&Value> {
        self.view(Field::Pipeline)
    }

    pub fn pipeline_mut(&mut self) -> Option<&mut Value> {
        self.view_mut(Field::Pipeline)
    }

    pub fn map_fn(&self) -> Option<&Value> {
        self.view(Field::MapFn)
    }

    pub fn reduce_fn(&self) -> Option<&Value> {
        self.view(Field::ReduceFn)
    }

    pub(crate) fn absorb_response(&mut self, scope: ResponseScope, args: CompletionArgs) {
        self.response_scope = Some(scope);
        self.response = args;
    }

    /// The receiver the driver completed on; set once the post stage runs.
    pub fn response_scope(&self) -> Option<&ResponseScope> {
        self.response_scope.as_ref()
    }

    pub fn error(&self) -> Option<&Value> {
        self.response.first()
    }

    pub fn error_mut(&mut self) -> Option<&mut Value> {
        self.response.get_mut(0)
    }

    pub fn data(&self) -> Option<&Value> {
        self.response.get(1)
    }

    pub fn data_mut(&mut self) -> Option<&mut Value> {
        self.response.get_mut(1)
    }

    pub fn stats(&self) -> Option<&Value> {
        self.response.get(2)
    }

    pub fn stats_mut(&mut self) -> Option<&mut Value> {
        self.response.get_mut(2)
    }

    /// True when the completed operation reported an error.
    pub fn failed(&self) -> bool {
        self.error().map(table::truthy).unwrap_or(false)
    }
}

impl fmt::Debug for OperationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationContext")
            .field("target", &self.target.name())
            .field("kind", &self.kind)
            .field("request", &self.request)
            .field("response", &self.response)
            .finish()
    }
}
