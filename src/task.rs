//! Generic polling for server-side asynchronous tasks.
//!
//! Several endpoint families follow the same pattern: a request starts a
//! job (search execution, dependent-object discovery, bulk deletion,
//! vulnerability-instance extraction), the response carries a task
//! identifier, and the caller polls a status endpoint until the job reaches
//! a terminal state. [`wait_for_completion`] hides that loop behind a
//! single bounded wait.
//!
//! Status vocabularies differ per family — searches report
//! `WAIT`/`EXECUTE`/`SORTING`, background tasks report
//! `QUEUED`/`PROCESSING` — but every family partitions the same three
//! ways: still running, completed, or anything else. The caller supplies a
//! classifier closure over the raw status string; [`classify_search_status`]
//! and [`classify_background_task`] cover the two vocabularies the server
//! uses today.
//!
//! Polling is a fixed-interval loop, not exponential backoff: job durations
//! are server-controlled and typically run seconds to low minutes, so the
//! added machinery would buy nothing.

use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::client::ApiClient;
use crate::error::{ApiError, Result};

/// How a raw status string is to be treated by the polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// The task is still running; poll again after the interval.
    Retry,
    /// The task completed successfully; stop and return.
    Success,
    /// Terminal failure — including status strings outside the known
    /// vocabulary, which are never silently retried.
    Failure,
}

/// Controls the polling loop: how often to check, and for how long in
/// total.
///
/// Defaults match the server's task behavior: a 3 second tick and a
/// 10 minute budget. The timeout is a ceiling on the total wait, measured
/// from the first status check and enforced before each poll.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Time to wait between consecutive status checks.
    pub interval: Duration,
    /// Maximum total time to spend polling before giving up.
    pub timeout: Duration,
}

impl PollConfig {
    /// Creates a `PollConfig` with the given interval and timeout.
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        PollConfig { interval, timeout }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig {
            interval: Duration::from_secs(3),
            timeout: Duration::from_secs(600),
        }
    }
}

/// Classifier for the search family: `WAIT`, `EXECUTE`, `SORTING` (and
/// `QUEUED` on busy systems) mean still running; `COMPLETED` is success;
/// anything else — `ERROR`, `CANCELED`, or an unknown string — is a
/// terminal failure.
pub fn classify_search_status(raw: &str) -> StatusClass {
    match raw {
        "WAIT" | "EXECUTE" | "SORTING" | "QUEUED" => StatusClass::Retry,
        "COMPLETED" => StatusClass::Success,
        _ => StatusClass::Failure,
    }
}

/// Classifier for background tasks (dependent-object discovery, bulk
/// deletion, vulnerability-instance extraction, extension installs):
/// `QUEUED`/`PROCESSING` mean still running; `COMPLETED` is success;
/// anything else is a terminal failure.
pub fn classify_background_task(raw: &str) -> StatusClass {
    match raw {
        "QUEUED" | "PROCESSING" => StatusClass::Retry,
        "COMPLETED" => StatusClass::Success,
        _ => StatusClass::Failure,
    }
}

/// The shape every status endpoint shares: a JSON object with a `status`
/// string. Additional fields vary per family and are ignored here.
#[derive(Debug, Deserialize)]
struct StatusPayload {
    status: String,
}

/// Polls `status_endpoint` until the task reaches a terminal state or the
/// timeout elapses, and returns the raw terminal status on success.
///
/// Loop behavior:
/// - The first check happens immediately; the timeout is enforced strictly
///   *before* each check, so it bounds the total wait rather than any
///   individual request.
/// - A 2xx response is parsed as `{"status": "..."}` and classified.
/// - A non-2xx response is indistinguishable from "not finished yet" — the
///   status API offers no side channel — so the loop keeps polling and
///   records `HTTP <code>` as the last observation.
/// - Transport errors likewise keep the loop alive; TLS verification
///   failures abort immediately (they are fatal everywhere).
///
/// # Errors
///
/// - [`ApiError::TaskFailed`] — the task reported a failure status or one
///   outside the classifier's vocabulary.
/// - [`ApiError::TaskTimeout`] — the budget elapsed; carries the last
///   observed status or status-check outcome.
/// - [`ApiError::Parse`] — a 2xx status response was not valid status
///   JSON.
/// - [`ApiError::TlsVerification`] — certificate trust broke mid-polling.
pub async fn wait_for_completion<C>(
    client: &ApiClient,
    status_endpoint: &str,
    classify: C,
    config: &PollConfig,
) -> Result<String>
where
    C: Fn(&str) -> StatusClass,
{
    let started = Instant::now();
    let mut last_observed: Option<String> = None;

    loop {
        if started.elapsed() > config.timeout {
            return Err(ApiError::TaskTimeout {
                elapsed: started.elapsed(),
                last_status: last_observed,
            });
        }

        match client.get(status_endpoint).await {
            Ok(response) if response.is_success() => {
                let payload: StatusPayload = response.json()?;
                debug!(endpoint = status_endpoint, status = %payload.status, "task status");
                match classify(&payload.status) {
                    StatusClass::Success => return Ok(payload.status),
                    StatusClass::Failure => {
                        return Err(ApiError::TaskFailed {
                            status: payload.status,
                        })
                    }
                    StatusClass::Retry => last_observed = Some(payload.status),
                }
            }
            Ok(response) => {
                debug!(
                    endpoint = status_endpoint,
                    status = %response.status(),
                    "status check returned an error response; still waiting"
                );
                last_observed = Some(format!("HTTP {}", response.status().as_u16()));
            }
            Err(err @ ApiError::TlsVerification { .. }) => return Err(err),
            Err(err) => {
                debug!(endpoint = status_endpoint, error = %err, "status check failed; still waiting");
                last_observed = Some(err.to_string());
            }
        }

        tokio::time::sleep(config.interval).await;
    }
}
