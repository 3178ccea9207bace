//! Bounded retry around the upstream trade fetch

use anyhow::anyhow;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::FetchError;
use crate::provider::TradeProvider;
use crate::trade::Trade;

/// Attempt budget and fixed delay between attempts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first call
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay between attempts in milliseconds
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    1000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

impl RetryPolicy {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

pub struct ResilientFetcher {
    provider: Arc<dyn TradeProvider>,
    policy: RetryPolicy,
}

impl ResilientFetcher {
    pub fn new(provider: Arc<dyn TradeProvider>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetch trades, retrying failed calls until the attempt budget is spent.
    ///
    /// Cancellation aborts both an in-flight call and the backoff wait; the
    /// result is then a `FetchError` like any other failure.
    pub async fn fetch(
        &self,
        reference: NaiveDateTime,
        cancel: &CancellationToken,
    ) -> Result<Vec<Trade>, FetchError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let result = tokio::select! {
                result = self.provider.get_trades(reference) => result,
                () = cancel.cancelled() => {
                    return Err(FetchError {
                        attempts: attempt,
                        source: anyhow!("fetch cancelled"),
                    });
                }
            };

            let err = match result {
                Ok(trades) => {
                    if attempt > 1 {
                        info!("Trade fetch succeeded on attempt {}/{}", attempt, max_attempts);
                    }
                    return Ok(trades);
                }
                Err(e) => e,
            };

            if attempt >= max_attempts {
                return Err(FetchError {
                    attempts: attempt,
                    source: err,
                });
            }

            warn!(
                "Trade fetch attempt {}/{} failed: {:#}, retrying in {:?}",
                attempt,
                max_attempts,
                err,
                self.policy.backoff()
            );

            tokio::select! {
                () = tokio::time::sleep(self.policy.backoff()) => {}
                () = cancel.cancelled() => {
                    return Err(FetchError {
                        attempts: attempt,
                        source: err.context("fetch cancelled during backoff"),
                    });
                }
            }
        }
    }
}
