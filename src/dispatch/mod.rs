pub mod http;

use std::future::Future;
use std::time::Duration;

use serde_json::Value;

use crate::error::FanoutError;

/// Where a batch is sent and how each call authenticates.
#[derive(Clone)]
pub struct Target {
    pub endpoint: String,
    pub api_key: String,
    /// Per-call timeout. `None` lets each call run until the network settles it.
    pub timeout: Option<Duration>,
}

impl Target {
    /// The key is stored trimmed.
    pub fn new(endpoint: impl Into<String>, api_key: impl AsRef<str>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.as_ref().trim().to_string(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Target")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// One attempt of call `index` in a batch.
///
/// `HttpDispatch` is the production implementation; the dispatcher only
/// depends on this trait so scripted callers can stand in for the network.
pub trait Call: Send + Sync + 'static {
    fn call(&self, index: usize) -> impl Future<Output = Result<Value, FanoutError>> + Send;

    /// Endpoint the calls go to, for logging.
    fn endpoint(&self) -> Option<&str> {
        None
    }
}
