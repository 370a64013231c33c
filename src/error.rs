//! Typed error hierarchy for the qradar-client crate.
//!
//! `ApiError` maps variants to real failure boundaries rather than internal
//! implementation details:
//! - `Configuration` covers client setup (missing credentials, malformed
//!   header material). Fatal until the caller fixes the configuration.
//! - `TlsVerification` covers certificate chain and hostname failures.
//!   Fatal, never retried automatically.
//! - `Transport` covers network-level faults (DNS, TCP, request timeout)
//!   where no HTTP status code exists. Retry policy belongs to the caller.
//! - `Parse` covers JSON deserialization of response bodies.
//! - `TaskTimeout` / `TaskFailed` cover the polling loop.
//!
//! HTTP-level errors are deliberately *not* represented here. A 4xx/5xx
//! response is data: the client returns the full `ApiResponse` (status plus
//! body) so callers can print the server's diagnostic payload and apply
//! their own interpretation (401 → check credentials, 422 → removed version
//! or bad range syntax, and so on).

/// Unified error type for all qradar-client library operations.
///
/// The `#[from]` attributes enable `Error::source()` chaining so callers and
/// logging frameworks can traverse the full cause chain.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The client could not be constructed from the supplied configuration.
    ///
    /// Covers missing credentials and header values that cannot be encoded.
    /// The caller must fix the setup before retrying; re-issuing the same
    /// construction call will fail the same way.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// TLS trust could not be established: the server certificate failed
    /// chain validation or hostname verification, or the supplied trust
    /// anchor could not be parsed.
    ///
    /// This is fatal and must never be retried automatically. The caller
    /// can supply a custom trust anchor (see `ClientConfig::trust_anchor`)
    /// when the deployment uses a self-signed certificate.
    #[error("TLS verification failed: {message}")]
    TlsVerification {
        /// Human-readable description of the verification failure.
        message: String,
    },

    /// A network-level failure occurred (DNS resolution, TCP connection,
    /// request timeout, connection reset).
    ///
    /// No HTTP status code is available because no response was received.
    /// These faults are potentially transient; whether to retry is the
    /// caller's decision.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON deserialization of a response body failed.
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The polling loop exceeded its timeout without the server-side task
    /// reaching a terminal state.
    ///
    /// `last_status` carries the most recent observation — either a raw
    /// status string from the task, or an `HTTP <code>` marker when the
    /// final status checks themselves failed. The caller decides whether to
    /// keep waiting with a fresh budget or abandon the task.
    #[error("task timed out after {elapsed:?} (last status: {last_status:?})")]
    TaskTimeout {
        /// Total elapsed time when the timeout was detected.
        elapsed: std::time::Duration,
        /// The last observed task status or status-check outcome, if any.
        last_status: Option<String>,
    },

    /// The server-side task reached a terminal status other than success.
    ///
    /// This includes status strings outside the known vocabulary: an
    /// unrecognized status is never silently retried, it is reported to the
    /// caller verbatim.
    #[error("task reached terminal status: {status}")]
    TaskFailed {
        /// The raw terminal status string reported by the server.
        status: String,
    },
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, ApiError>;
