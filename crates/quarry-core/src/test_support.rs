use crate::{
    adapter::Adapter,
    error::BoxError,
    model::Param,
    path::PathRef,
    query::Query,
    value::Value,
};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

///
/// SpyAdapter
///
/// Records every dispatched query and answers with canned records.
///

pub(crate) struct SpyAdapter {
    name: String,
    records: Vec<Value>,
    params: HashMap<String, Param>,
    fail_with: Option<String>,
    calls: AtomicUsize,
    seen: Mutex<Vec<serde_json::Value>>,
}

impl SpyAdapter {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            records: Vec::new(),
            params: HashMap::new(),
            fail_with: None,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn returning(mut self, records: Vec<Value>) -> Self {
        self.records = records;
        self
    }

    pub(crate) fn with_param(mut self, path: &str, param: Param) -> Self {
        self.params.insert(path.to_string(), param);
        self
    }

    pub(crate) fn failing(mut self, message: &str) -> Self {
        self.fail_with = Some(message.to_string());
        self
    }

    pub(crate) fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Criteria JSON of the most recent dispatch.
    pub(crate) fn last_criteria(&self) -> Option<serde_json::Value> {
        self.seen.lock().expect("spy lock should not be poisoned").last().cloned()
    }
}

#[async_trait]
impl Adapter for SpyAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exec(&self, query: &Query) -> Result<Vec<Value>, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .expect("spy lock should not be poisoned")
            .push(query.criteria().to_json());

        match &self.fail_with {
            Some(message) => Err(message.clone().into()),
            None => Ok(self.records.clone()),
        }
    }

    fn param(&self, path: &PathRef) -> Option<Param> {
        self.params.get(&path.path).cloned()
    }
}
