//! Store and upstream doubles shared by the unit tests.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::errors::{StoreError, StoreResult, UpstreamError};
use crate::store::{KeyValueStore, MemoryStore};
use crate::upstream::Upstream;

/// Every operation fails as if the store were unreachable.
#[derive(Default)]
pub struct FailingStore {
    pub calls: AtomicUsize,
}

impl FailingStore {
    fn fail<T>(&self) -> StoreResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        self.fail()
    }

    async fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
        self.fail()
    }

    async fn expire(&self, _key: &str, _ttl: Duration) -> StoreResult<()> {
        self.fail()
    }

    async fn ttl(&self, _key: &str) -> StoreResult<Option<Duration>> {
        self.fail()
    }

    async fn incr(&self, _key: &str) -> StoreResult<i64> {
        self.fail()
    }
}

/// A `MemoryStore` that counts how often it is touched.
#[derive(Default)]
pub struct CountingStore {
    pub inner: MemoryStore,
    pub calls: AtomicUsize,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyValueStore for CountingStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.touch();
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.touch();
        self.inner.set(key, value).await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<()> {
        self.touch();
        self.inner.expire(key, ttl).await
    }

    async fn ttl(&self, key: &str) -> StoreResult<Option<Duration>> {
        self.touch();
        self.inner.ttl(key).await
    }

    async fn incr(&self, key: &str) -> StoreResult<i64> {
        self.touch();
        self.inner.incr(key).await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        self.touch();
        self.inner.set_ex(key, value, ttl).await
    }
}

enum Script {
    Respond(Value),
    Fail { status: u16, message: String },
}

/// Answers every request the same way and remembers what was asked.
pub struct ScriptedUpstream {
    script: Script,
    requested: Mutex<Vec<String>>,
}

impl ScriptedUpstream {
    pub fn responding(body: Value) -> Self {
        Self {
            script: Script::Respond(body),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16, message: &str) -> Self {
        Self {
            script: Script::Fail {
                status,
                message: message.to_string(),
            },
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requested.lock().unwrap().len()
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl Upstream for ScriptedUpstream {
    async fn get_json(&self, url: &str) -> Result<Value, UpstreamError> {
        self.requested.lock().unwrap().push(url.to_string());
        match &self.script {
            Script::Respond(body) => Ok(body.clone()),
            Script::Fail { status, message } => Err(UpstreamError::Status {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}
