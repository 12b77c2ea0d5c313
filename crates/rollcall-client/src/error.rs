//! Error types for attendance service calls.

use thiserror::Error;

/// Failures surfaced by [`AttendanceClient`](crate::AttendanceClient).
///
/// A server verdict of `ok = false` is NOT an error: it arrives as a
/// well-formed [`CheckInResult`](crate::CheckInResult) and is relayed to
/// the caller. These variants cover everything before that point.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed local input, rejected before any network call.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Transport-level failure. Distinct from a server verdict — the
    /// request may or may not have reached the service.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status from the service.
    #[error("server error ({status}): {body}")]
    Server { status: u16, body: String },

    /// Response body did not match the expected shape.
    #[error("malformed response from {endpoint}: {detail}")]
    MalformedResponse { endpoint: &'static str, detail: String },

    /// Could not read the image artifact from disk.
    #[error("image read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience Result alias that defaults to [`ApiError`].
pub type Result<T> = std::result::Result<T, ApiError>;
