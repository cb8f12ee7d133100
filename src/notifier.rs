//! Evaluator callback delivery with a bounded retry loop.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{info, warn};

use crate::types::NotifyPayload;

/// Attempt budget for the completion callback.
pub const MAX_ATTEMPTS: u32 = 3;

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause between failed attempts.
const RETRY_PAUSE: Duration = Duration::from_secs(2);

/// Deliver `payload` to the evaluator at `url`.
///
/// Returns true once the evaluator answers 200. Any other status and any
/// transport error consume one attempt and are followed by a fixed pause;
/// there is no backoff and no distinction between retryable and permanent
/// failures. Exhausting the budget is not an error: the run that scheduled
/// the callback has nobody left to report to.
pub async fn notify_evaluator(client: &Client, url: &str, payload: &NotifyPayload) -> bool {
    for attempt in 1..=MAX_ATTEMPTS {
        match client
            .post(url)
            .timeout(REQUEST_TIMEOUT)
            .json(payload)
            .send()
            .await
        {
            Ok(resp) if resp.status() == StatusCode::OK => {
                info!("evaluator notified for task {}", payload.task);
                return true;
            }
            Ok(resp) => {
                warn!(
                    "notify attempt {} for task {} returned status {}",
                    attempt,
                    payload.task,
                    resp.status()
                );
            }
            Err(e) => {
                warn!("notify attempt {} for task {} failed: {}", attempt, payload.task, e);
            }
        }
        if attempt < MAX_ATTEMPTS {
            tokio::time::sleep(RETRY_PAUSE).await;
        }
    }
    warn!(
        "evaluator never acknowledged task {} after {} attempts",
        payload.task, MAX_ATTEMPTS
    );
    false
}
