//! rollcall-core — Attendance session model, geodesic distance, and the
//! client-side check-in gate.
//!
//! Pure logic, no I/O. The gate is advisory: the attendance service
//! re-validates radius and expiry authoritatively.

pub mod gate;
pub mod geo;
pub mod types;

pub use gate::{BlockReason, GateDecision};
pub use types::{GeoPoint, LocationFix, Session};
