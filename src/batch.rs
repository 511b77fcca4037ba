use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tokio::task::{Id as TaskId, JoinSet};

use crate::dispatch::http::HttpDispatch;
use crate::dispatch::{Call, Target};
use crate::error::FanoutError;
use crate::outcome::{BatchResult, Outcome};

/// Launches `n` independent calls at once and settles every one of them.
///
/// A failed call never cancels its siblings: the join loop drains the whole
/// set, so a batch of `n` always yields exactly `n` outcomes.
pub struct Dispatcher<C> {
    caller: Arc<C>,
}

impl Dispatcher<HttpDispatch> {
    /// Dispatcher posting `payload` to `target`. Rejects an empty credential
    /// before any client is built.
    pub fn http(target: Target, payload: Value) -> Result<Self, FanoutError> {
        if target.api_key.is_empty() {
            return Err(FanoutError::Config("API key is empty".to_string()));
        }
        let http = HttpDispatch::new(target, Arc::new(payload))?;
        Ok(Self::new(http))
    }
}

impl<C: Call> Dispatcher<C> {
    pub fn new(caller: C) -> Self {
        Self {
            caller: Arc::new(caller),
        }
    }

    pub async fn run(&self, n: usize) -> Result<BatchResult, FanoutError> {
        if n == 0 {
            return Err(FanoutError::Config("batch size must be greater than 0".to_string()));
        }

        tracing::info!(
            n,
            endpoint = self.caller.endpoint().unwrap_or("-"),
            "dispatching batch"
        );
        let start = Instant::now();

        let mut set = JoinSet::new();
        // Task id → call index, so a panicked task still reports under its index.
        let mut task_index: HashMap<TaskId, usize> = HashMap::with_capacity(n);

        for index in 0..n {
            let caller = Arc::clone(&self.caller);
            let handle = set.spawn(async move { (index, caller.call(index).await) });
            task_index.insert(handle.id(), index);
        }

        let mut outcomes = Vec::with_capacity(n);
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, Ok(result))) => outcomes.push(Outcome::Success { index, result }),
                Ok((index, Err(e))) => {
                    let message = e.call_message(index);
                    tracing::debug!(index, status = ?e.status(), "{message}");
                    outcomes.push(Outcome::Failure { index, message });
                }
                Err(join_err) => {
                    let Some(&index) = task_index.get(&join_err.id()) else {
                        tracing::error!("unattributed task failure: {join_err}");
                        continue;
                    };
                    tracing::error!(index, "call task failed: {join_err}");
                    let e = if join_err.is_panic() {
                        FanoutError::TaskPanicked(join_err.to_string())
                    } else {
                        FanoutError::Other(format!("task cancelled: {join_err}"))
                    };
                    outcomes.push(Outcome::Failure {
                        index,
                        message: e.call_message(index),
                    });
                }
            }
        }

        outcomes.sort_by_key(Outcome::index);
        let result = BatchResult {
            outcomes,
            elapsed: start.elapsed(),
        };

        tracing::info!(
            ok = result.ok(),
            fail = result.fail(),
            elapsed_ms = result.elapsed_ms() as u64,
            "batch settled"
        );
        Ok(result)
    }
}

/// POST `payload` to `endpoint` `n` times concurrently and collect every outcome.
pub async fn run_batch(
    n: usize,
    payload: Value,
    endpoint: &str,
    api_key: &str,
) -> Result<BatchResult, FanoutError> {
    Dispatcher::http(Target::new(endpoint, api_key), payload)?
        .run(n)
        .await
}
