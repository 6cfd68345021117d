// Shared fixtures: an in-memory driver that records every call and
// completes through the trailing callback, plus completion capture
// helpers. No real storage is involved anywhere in these tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use collection_hooks::{
    CallArg, Completion, CompletionArgs, OperationKind, RawCollection, ResponseScope, StoreHandle,
};

/// One recorded driver call: the operation kind plus a JSON rendering of
/// the positional arguments (callbacks render as `"<callback>"`).
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub kind: OperationKind,
    pub args: Vec<Value>,
}

/// In-memory collection. Completes the trailing callback with a canned
/// response, or with an echo of the first argument when `echo_first_arg`
/// is set (so tests can prove the driver executed the rewritten request).
pub struct MemCollection {
    name: String,
    response: Mutex<CompletionArgs>,
    echo_first_arg: Mutex<bool>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MemCollection {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            response: Mutex::new(vec![json!(null), json!([]), json!({})]),
            echo_first_arg: Mutex::new(false),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Set the completion arguments the driver reports: `[error, data, stats]`.
    pub fn respond_with(&self, response: CompletionArgs) {
        *self.response.lock().unwrap() = response;
    }

    /// Complete with `[null, {"echo": <first argument>}, {"n": 1}]`.
    pub fn echo_first_arg(&self) {
        *self.echo_first_arg.lock().unwrap() = true;
    }

    pub fn recorded(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl RawCollection for MemCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn call(&self, kind: OperationKind, args: Vec<CallArg>) {
        let rendered: Vec<Value> = args
            .iter()
            .map(|arg| match arg {
                CallArg::Value(value) => value.clone(),
                CallArg::Callback(_) => json!("<callback>"),
            })
            .collect();
        self.calls
            .lock()
            .unwrap()
            .push(RecordedCall { kind, args: rendered.clone() });

        if let Some(callback) = args.last().and_then(CallArg::as_callback) {
            let response = if *self.echo_first_arg.lock().unwrap() {
                vec![
                    json!(null),
                    json!({ "echo": rendered.first().cloned().unwrap_or(Value::Null) }),
                    json!({"n": 1}),
                ]
            } else {
                self.response.lock().unwrap().clone()
            };
            let scope: ResponseScope = Arc::new(self.name.clone());
            callback.invoke(scope, response).await;
        }
    }
}

/// In-memory store host owning a set of collections.
pub struct MemStore {
    id: String,
    collections: Mutex<HashMap<String, Arc<MemCollection>>>,
}

impl MemStore {
    pub fn new(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            collections: Mutex::new(HashMap::new()),
        })
    }

    pub fn add(&self, collection: Arc<MemCollection>) {
        self.collections
            .lock()
            .unwrap()
            .insert(collection.name.clone(), collection);
    }
}

impl StoreHandle for MemStore {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection(&self, name: &str) -> Option<Arc<dyn RawCollection>> {
        self.collections
            .lock()
            .unwrap()
            .get(name)
            .map(|collection| collection.clone() as Arc<dyn RawCollection>)
    }
}

/// A completion that forwards every invocation's arguments to a channel.
pub fn capturing_completion() -> (Completion, mpsc::UnboundedReceiver<CompletionArgs>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let completion = Completion::sync(move |_scope, args| {
        let _ = tx.send(args);
    });
    (completion, rx)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}
