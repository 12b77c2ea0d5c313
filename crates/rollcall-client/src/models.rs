//! Wire models for the attendance service (camelCase JSON).

use rollcall_core::{GeoPoint, Session};
use serde::{Deserialize, Serialize};

/// `GET /session/current` response body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub class_id: String,
    pub center_lat: f64,
    pub center_lon: f64,
    pub radius_meters: u32,
    pub expires_at_epoch_ms: i64,
}

impl From<SessionInfo> for Session {
    fn from(info: SessionInfo) -> Self {
        Session {
            class_id: info.class_id,
            center: GeoPoint::new(info.center_lat, info.center_lon),
            radius_meters: info.radius_meters,
            expires_at_epoch_ms: info.expires_at_epoch_ms,
        }
    }
}

/// `POST /session/start` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    pub class_id: String,
    pub center_lat: f64,
    pub center_lon: f64,
    pub radius_meters: u32,
    pub duration_minutes: u32,
}

/// `POST /session/start` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct StartSessionResponse {
    pub ok: bool,
}

/// `POST /attendance/checkin` response body.
///
/// Produced exclusively by the server; the client relays the verdict
/// and infers nothing beyond the `ok` flag. Absent fields stay absent —
/// a missing confidence is not zero.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResult {
    pub ok: bool,
    /// Face-match certainty, 0–100. Opaque beyond display.
    #[serde(default)]
    pub match_confidence: Option<f64>,
    /// Human-readable failure reason.
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /enroll` response body. The service may attach extra fields;
/// only `ok` is contractual.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrollResponse {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_info_maps_to_session() {
        let info: SessionInfo = serde_json::from_str(
            r#"{"classId":"cs101","centerLat":12.9716,"centerLon":77.5946,
                "radiusMeters":10,"expiresAtEpochMs":1700000600000}"#,
        )
        .unwrap();
        let session: Session = info.into();
        assert_eq!(session.class_id, "cs101");
        assert_eq!(session.center, GeoPoint::new(12.9716, 77.5946));
        assert_eq!(session.radius_meters, 10);
        assert_eq!(session.expires_at_epoch_ms, 1_700_000_600_000);
    }

    #[test]
    fn start_request_serializes_camel_case() {
        let req = StartSessionRequest {
            class_id: "cs101".into(),
            center_lat: 12.9716,
            center_lon: 77.5946,
            radius_meters: 10,
            duration_minutes: 10,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["classId"], "cs101");
        assert_eq!(json["radiusMeters"], 10);
        assert_eq!(json["durationMinutes"], 10);
    }

    #[test]
    fn check_in_result_missing_optionals() {
        let result: CheckInResult = serde_json::from_str(r#"{"ok":true}"#).unwrap();
        assert!(result.ok);
        assert_eq!(result.match_confidence, None);
        assert_eq!(result.message, None);
    }

    #[test]
    fn check_in_result_with_confidence() {
        let result: CheckInResult =
            serde_json::from_str(r#"{"ok":true,"matchConfidence":87.5}"#).unwrap();
        assert_eq!(result.match_confidence, Some(87.5));
    }

    #[test]
    fn enroll_response_tolerates_extra_fields() {
        let resp: EnrollResponse =
            serde_json::from_str(r#"{"ok":true,"faceId":"abc-123"}"#).unwrap();
        assert!(resp.ok);
    }
}
