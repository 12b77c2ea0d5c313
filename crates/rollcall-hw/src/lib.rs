//! rollcall-hw — Hardware abstraction for selfie capture and location.
//!
//! Provides V4L2-based still capture and a GeoClue2 (D-Bus) location
//! provider, plus a manual-override locator for machines without a
//! location service.

pub mod camera;
pub mod frame;
pub mod location;

pub use camera::{Camera, CameraError};
pub use location::{GeoclueLocator, Locator, ManualLocator};
