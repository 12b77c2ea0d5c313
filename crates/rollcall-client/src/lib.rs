//! rollcall-client — Typed HTTP client for the attendance service.
//!
//! Wire shapes follow the service contract exactly: JSON for session
//! operations, multipart for image submissions. No call is ever retried
//! automatically — a resubmitted selfie is a duplicate verification
//! attempt, not a harmless replay.

pub mod api;
pub mod error;
pub mod models;

pub use api::AttendanceClient;
pub use error::ApiError;
pub use models::{CheckInResult, StartSessionRequest};
