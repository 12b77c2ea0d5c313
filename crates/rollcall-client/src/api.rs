//! Typed reqwest wrapper for the attendance service.

use crate::error::{ApiError, Result};
use crate::models::{
    CheckInResult, EnrollResponse, SessionInfo, StartSessionRequest, StartSessionResponse,
};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use rollcall_core::{GeoPoint, Session};
use std::path::Path;
use std::time::Duration;

/// HTTP client for attendance service operations.
///
/// Explicitly constructed and passed by the caller, with its lifetime
/// bound to whatever owns it — never a process-wide singleton.
pub struct AttendanceClient {
    http: reqwest::Client,
    base_url: String,
}

impl AttendanceClient {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Fetch the active attendance window for a class.
    ///
    /// `Ok(None)` means "no open window" (404 or empty body) — distinct
    /// from a transport failure, which surfaces as [`ApiError::Network`]
    /// so the caller can tell "nothing to show" from "couldn't check".
    pub async fn current_session(&self, class_id: &str) -> Result<Option<Session>> {
        tracing::debug!(class_id, "fetching current session");
        let resp = self
            .http
            .get(self.url("/session/current"))
            .query(&[("classId", class_id)])
            .send()
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = check_status(resp).await?;

        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        let info: SessionInfo = serde_json::from_str(&body).map_err(|e| {
            ApiError::MalformedResponse {
                endpoint: "/session/current",
                detail: e.to_string(),
            }
        })?;
        Ok(Some(info.into()))
    }

    /// Open a new attendance window (instructor role). The server
    /// computes the expiry from `duration_minutes`.
    ///
    /// Rejects locally with [`ApiError::InvalidArgument`] before any
    /// network call when the radius or duration is non-positive.
    pub async fn start_session(&self, req: &StartSessionRequest) -> Result<bool> {
        if req.radius_meters == 0 {
            return Err(ApiError::InvalidArgument(
                "radiusMeters must be positive".into(),
            ));
        }
        if req.duration_minutes == 0 {
            return Err(ApiError::InvalidArgument(
                "durationMinutes must be positive".into(),
            ));
        }

        tracing::debug!(
            class_id = %req.class_id,
            radius = req.radius_meters,
            duration = req.duration_minutes,
            "starting session"
        );
        let resp = self
            .http
            .post(self.url("/session/start"))
            .json(req)
            .send()
            .await?;
        let resp = check_status(resp).await?;

        let body = resp.text().await?;
        let out: StartSessionResponse =
            serde_json::from_str(&body).map_err(|e| ApiError::MalformedResponse {
                endpoint: "/session/start",
                detail: e.to_string(),
            })?;
        Ok(out.ok)
    }

    /// Register a reference image for later face-match comparison.
    /// Never retried automatically.
    pub async fn enroll(&self, image_path: &Path, student_id: &str) -> Result<bool> {
        if student_id.trim().is_empty() {
            return Err(ApiError::InvalidArgument("studentId must not be empty".into()));
        }

        let form = Form::new()
            .part("image", image_part(image_path).await?)
            .text("studentId", student_id.to_string());

        tracing::debug!(student_id, "enrolling reference image");
        let resp = self
            .http
            .post(self.url("/enroll"))
            .multipart(form)
            .send()
            .await?;
        let resp = check_status(resp).await?;

        let body = resp.text().await?;
        let out: EnrollResponse =
            serde_json::from_str(&body).map_err(|e| ApiError::MalformedResponse {
                endpoint: "/enroll",
                detail: e.to_string(),
            })?;
        Ok(out.ok)
    }

    /// Submit one check-in attempt: selfie, position, identity claim.
    /// All fields are mandatory. Never retried automatically — a
    /// resubmission is a duplicate verification attempt on the server.
    pub async fn check_in(
        &self,
        image_path: &Path,
        class_id: &str,
        point: GeoPoint,
        student_id: &str,
    ) -> Result<CheckInResult> {
        let form = Form::new()
            .part("image", image_part(image_path).await?)
            .text("classId", class_id.to_string())
            .text("lat", point.lat.to_string())
            .text("lon", point.lon.to_string())
            .text("studentId", student_id.to_string());

        tracing::info!(class_id, student_id, "submitting check-in");
        let resp = self
            .http
            .post(self.url("/attendance/checkin"))
            .multipart(form)
            .send()
            .await?;
        let resp = check_status(resp).await?;

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::MalformedResponse {
            endpoint: "/attendance/checkin",
            detail: e.to_string(),
        })
    }
}

/// Map a non-success status to [`ApiError::Server`]; pass success
/// through unchanged.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(ApiError::Server { status, body });
    }
    Ok(resp)
}

/// Build the `image` multipart part from a captured artifact.
async fn image_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "selfie.jpg".to_string());
    Ok(Part::bytes(bytes).file_name(file_name).mime_str("image/jpeg")?)
}
