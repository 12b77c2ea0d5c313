use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// An open attendance window for one class.
///
/// Owned authoritatively by the server; the client holds it only as a
/// read-through snapshot. Immutable once created, expires naturally at
/// `expires_at_epoch_ms` — there is no explicit close.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub class_id: String,
    /// Instructor's position when the window was opened.
    pub center: GeoPoint,
    /// Acceptance radius around `center`, in meters.
    pub radius_meters: u32,
    /// Window end, milliseconds since the Unix epoch.
    pub expires_at_epoch_ms: i64,
}

impl Session {
    /// Whether the window has passed at `now_epoch_ms`.
    /// The last millisecond of the window is still inside it.
    pub fn expired_at(&self, now_epoch_ms: i64) -> bool {
        now_epoch_ms > self.expires_at_epoch_ms
    }
}

/// One position fix from a location provider.
#[derive(Debug, Clone, Copy)]
pub struct LocationFix {
    pub point: GeoPoint,
    /// Estimated horizontal accuracy in meters, if the provider reports one.
    pub accuracy_meters: Option<f64>,
    /// Set when the fix did not come from a trusted platform source
    /// (mock provider, manually supplied coordinates). Advisory
    /// anti-spoofing signal only.
    pub simulated: bool,
}

impl LocationFix {
    /// A trusted provider fix with no accuracy estimate.
    pub fn trusted(point: GeoPoint) -> Self {
        Self {
            point,
            accuracy_meters: None,
            simulated: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(expires_at_epoch_ms: i64) -> Session {
        Session {
            class_id: "cs101".into(),
            center: GeoPoint::new(12.9716, 77.5946),
            radius_meters: 10,
            expires_at_epoch_ms,
        }
    }

    #[test]
    fn session_not_expired_before_deadline() {
        assert!(!session(600_000).expired_at(1_000));
    }

    #[test]
    fn session_not_expired_at_exact_deadline() {
        assert!(!session(600_000).expired_at(600_000));
    }

    #[test]
    fn session_expired_after_deadline() {
        assert!(session(600_000).expired_at(600_001));
    }
}
