//! Client-side pre-check for a check-in attempt.
//!
//! Blocks obviously doomed submissions (window passed, outside the
//! geofence, untrusted fix) before any upload, so the user gets fast
//! feedback and no selfie leaves the device for nothing. Advisory only:
//! the server re-validates radius and expiry and must not trust this
//! result, and a `Proceed` here is never an attendance decision.

use crate::geo;
use crate::types::{LocationFix, Session};

/// Why a check-in attempt was blocked locally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlockReason {
    /// The attendance window has passed.
    Expired,
    /// The fix is farther from the session center than the acceptance
    /// radius.
    OutOfRange { distance_meters: f64 },
    /// The fix came from a simulated or manually supplied source.
    SuspectLocation,
}

impl BlockReason {
    /// Stable machine-readable tag, also shown to the user.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockReason::Expired => "expired",
            BlockReason::OutOfRange { .. } => "out_of_range",
            BlockReason::SuspectLocation => "suspect_location",
        }
    }
}

/// Outcome of the local gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateDecision {
    /// Worth submitting. Carries the computed distance for display.
    Proceed { distance_meters: f64 },
    Blocked(BlockReason),
}

impl GateDecision {
    pub fn is_proceed(&self) -> bool {
        matches!(self, GateDecision::Proceed { .. })
    }
}

/// Decide whether a check-in attempt is worth sending.
///
/// A simulated fix blocks regardless of time and distance; an expired
/// window blocks regardless of distance. Distance exactly equal to the
/// radius is in range — the comparison is strict `>`.
pub fn evaluate(session: &Session, fix: &LocationFix, now_epoch_ms: i64) -> GateDecision {
    if fix.simulated {
        return GateDecision::Blocked(BlockReason::SuspectLocation);
    }
    if session.expired_at(now_epoch_ms) {
        return GateDecision::Blocked(BlockReason::Expired);
    }

    let distance_meters = geo::distance_meters(fix.point, session.center);
    tracing::debug!(
        distance_meters,
        radius = session.radius_meters,
        "gate distance computed"
    );

    if distance_meters > session.radius_meters as f64 {
        return GateDecision::Blocked(BlockReason::OutOfRange { distance_meters });
    }
    GateDecision::Proceed { distance_meters }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeoPoint;

    const CENTER: GeoPoint = GeoPoint {
        lat: 12.9716,
        lon: 77.5946,
    };

    /// Latitude offsets from `CENTER` with known haversine distances:
    /// +0.0000899° ≈ 9.996 m, +0.0000909° ≈ 10.108 m.
    const IN_RANGE_LAT: f64 = 12.9716 + 0.0000899;
    const OUT_OF_RANGE_LAT: f64 = 12.9716 + 0.0000909;

    fn session() -> Session {
        Session {
            class_id: "cs101".into(),
            center: CENTER,
            radius_meters: 10,
            expires_at_epoch_ms: 600_000,
        }
    }

    #[test]
    fn test_proceeds_at_boundary_distance() {
        // ~10.0 m away from a 10 m radius, 1 s into a 600 s window.
        let fix = LocationFix::trusted(GeoPoint::new(IN_RANGE_LAT, CENTER.lon));
        let decision = evaluate(&session(), &fix, 1_000);
        match decision {
            GateDecision::Proceed { distance_meters } => {
                assert!((distance_meters - 10.0).abs() < 0.01, "d={distance_meters}");
            }
            other => panic!("expected Proceed, got {other:?}"),
        }
    }

    #[test]
    fn test_blocks_just_outside_radius() {
        let fix = LocationFix::trusted(GeoPoint::new(OUT_OF_RANGE_LAT, CENTER.lon));
        let decision = evaluate(&session(), &fix, 1_000);
        match decision {
            GateDecision::Blocked(BlockReason::OutOfRange { distance_meters }) => {
                assert!(distance_meters > 10.0 && distance_meters < 10.2);
            }
            other => panic!("expected OutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_boundary_is_inclusive() {
        // distance == radius exactly: a zero-radius session with the fix
        // on the center. Strict `>` means this is still in range.
        let mut s = session();
        s.radius_meters = 0;
        let fix = LocationFix::trusted(CENTER);
        assert!(evaluate(&s, &fix, 1_000).is_proceed());
    }

    #[test]
    fn test_expired_blocks_regardless_of_distance() {
        let fix = LocationFix::trusted(CENTER);
        let decision = evaluate(&session(), &fix, 600_001);
        assert_eq!(decision, GateDecision::Blocked(BlockReason::Expired));
    }

    #[test]
    fn test_last_millisecond_still_inside_window() {
        let fix = LocationFix::trusted(CENTER);
        assert!(evaluate(&session(), &fix, 600_000).is_proceed());
    }

    #[test]
    fn test_simulated_blocks_regardless_of_time_and_distance() {
        let fix = LocationFix {
            point: CENTER,
            accuracy_meters: Some(5.0),
            simulated: true,
        };
        let decision = evaluate(&session(), &fix, 1_000);
        assert_eq!(decision, GateDecision::Blocked(BlockReason::SuspectLocation));
    }

    #[test]
    fn test_simulated_takes_precedence_over_expired() {
        let fix = LocationFix {
            point: GeoPoint::new(OUT_OF_RANGE_LAT, CENTER.lon),
            accuracy_meters: None,
            simulated: true,
        };
        // Expired AND out of range AND simulated: suspect wins.
        let decision = evaluate(&session(), &fix, 600_001);
        assert_eq!(decision, GateDecision::Blocked(BlockReason::SuspectLocation));
    }

    #[test]
    fn test_expired_takes_precedence_over_out_of_range() {
        let fix = LocationFix::trusted(GeoPoint::new(OUT_OF_RANGE_LAT, CENTER.lon));
        let decision = evaluate(&session(), &fix, 600_001);
        assert_eq!(decision, GateDecision::Blocked(BlockReason::Expired));
    }

    #[test]
    fn test_block_reason_tags() {
        assert_eq!(BlockReason::Expired.as_str(), "expired");
        assert_eq!(
            BlockReason::OutOfRange {
                distance_meters: 12.0
            }
            .as_str(),
            "out_of_range"
        );
        assert_eq!(BlockReason::SuspectLocation.as_str(), "suspect_location");
    }
}
