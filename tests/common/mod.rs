//! Shared utilities for integration tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use backend_router::client::{BackendClient, BackendError, Completion, CompletionRequest};
use backend_router::registry::{BackendConfig, BackendKind, Registry};
use backend_router::{Router, RouterConfig};

/// What a mock backend does on one call.
#[derive(Debug, Clone)]
pub enum Step {
    Reply(String),
    Fail(BackendError),
    /// Sleep, then reply.
    Slow(Duration, String),
    /// Never answer.
    Hang,
}

/// A programmable backend. Steps are consumed in order; the last one repeats.
pub struct MockBackend {
    steps: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<CompletionRequest>>,
}

#[allow(dead_code)]
impl MockBackend {
    pub fn script(steps: Vec<Step>) -> Arc<Self> {
        assert!(!steps.is_empty());
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn ok(reply: &str) -> Arc<Self> {
        Self::script(vec![Step::Reply(reply.to_string())])
    }

    pub fn failing(error: &str) -> Arc<Self> {
        Self::script(vec![Step::Fail(BackendError::Transport(error.to_string()))])
    }

    pub fn slow(delay: Duration, reply: &str) -> Arc<Self> {
        Self::script(vec![Step::Slow(delay, reply.to_string())])
    }

    pub fn hanging() -> Arc<Self> {
        Self::script(vec![Step::Hang])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.prompts.lock().unwrap().last().cloned()
    }

    fn next_step(&self) -> Step {
        let mut steps = self.steps.lock().unwrap();
        if steps.len() > 1 {
            steps.pop_front().unwrap()
        } else {
            steps.front().cloned().unwrap()
        }
    }
}

#[async_trait]
impl BackendClient for MockBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.clone());
        match self.next_step() {
            Step::Reply(text) => Ok(Completion::new(text)),
            Step::Fail(e) => Err(e),
            Step::Slow(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(Completion::new(text))
            }
            Step::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}

/// Config for a backend named `name` with the given tier and per-minute limit.
#[allow(dead_code)]
pub fn backend(name: &str, kind: BackendKind, tier: u8, limit: u32) -> BackendConfig {
    BackendConfig::for_kind(kind)
        .with_name(name)
        .with_tier(tier)
        .with_rate_limit(limit)
}

/// Build a router over mock backends with default thresholds.
#[allow(dead_code)]
pub fn router(backends: Vec<(BackendConfig, Arc<MockBackend>)>) -> Router {
    router_with_config(backends, &RouterConfig::default())
}

#[allow(dead_code)]
pub fn router_with_config(backends: Vec<(BackendConfig, Arc<MockBackend>)>, config: &RouterConfig) -> Router {
    let mut builder = Registry::builder();
    for (config, client) in backends {
        builder = builder.backend(config, client);
    }
    Router::new(builder.build().expect("registry"), config)
}
