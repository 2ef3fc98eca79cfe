use crate::config::PollConfig;
use crate::domain::projection::OrderProjection;
use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Result of waiting for an order to reach a predicted state.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The predicate held on this projection.
    Observed(OrderProjection),
    /// Attempts or time ran out first. `last_seen` is the final read, if
    /// the order was visible at all.
    Inconclusive {
        attempts: u32,
        last_seen: Option<OrderProjection>,
    },
}

impl PollOutcome {
    pub fn is_observed(&self) -> bool {
        matches!(self, PollOutcome::Observed(_))
    }

    pub fn into_observed(self) -> Option<OrderProjection> {
        match self {
            PollOutcome::Observed(projection) => Some(projection),
            PollOutcome::Inconclusive { .. } => None,
        }
    }
}

/// Re-reads with exponential backoff until `predicate` holds.
///
/// A `NotFound` read means the order is not visible yet and is polled again;
/// any other error ends polling and is returned. Never sleeps past the
/// configured timeout.
pub async fn poll_until<P, F, Fut>(config: PollConfig, predicate: P, mut fetch: F) -> Result<PollOutcome>
where
    P: Fn(&OrderProjection) -> bool,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<OrderProjection>>,
{
    let deadline = Instant::now() + config.timeout;
    let mut delay = config.initial_delay;
    let mut attempt = 0;
    let mut last_seen = None;

    loop {
        attempt += 1;

        match fetch().await {
            Ok(projection) if predicate(&projection) => {
                if attempt > 1 {
                    tracing::debug!(attempt, "predicted state observed after polling");
                }
                return Ok(PollOutcome::Observed(projection));
            }
            Ok(projection) => last_seen = Some(projection),
            Err(e) if e.is_not_found() => {
                tracing::debug!(attempt, "order not visible yet");
            }
            Err(e) => return Err(e),
        }

        let now = Instant::now();
        if attempt >= config.max_attempts || now >= deadline {
            tracing::warn!(
                attempt,
                max_attempts = config.max_attempts,
                "polling gave up before the predicted state was observed"
            );
            return Ok(PollOutcome::Inconclusive {
                attempts: attempt,
                last_seen,
            });
        }

        sleep(delay.min(deadline - now)).await;

        delay = Duration::from_millis(((delay.as_millis() as f64) * config.multiplier) as u64);
        delay = delay.min(config.max_delay);
    }
}
