//! Check-in orchestration.
//!
//! Session and location are independent fetches and run concurrently;
//! they are joined only because the gate needs both. Nothing in here
//! retries: every failure is terminal for the attempt and the user
//! re-triggers explicitly.

use anyhow::{Context, Result};
use rollcall_client::models::StartSessionRequest;
use rollcall_client::{AttendanceClient, CheckInResult};
use rollcall_core::{gate, BlockReason, GateDecision};
use rollcall_hw::{Camera, Locator};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Epoch milliseconds now, as the gate consumes it.
pub fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Outcome of one check-in attempt.
#[derive(Debug)]
pub enum CheckInOutcome {
    /// No open attendance window for the class.
    NoSession,
    /// Location fix unavailable (timeout, denial, provider error).
    NoFix,
    /// Blocked by the local gate; nothing was uploaded.
    Blocked(BlockReason),
    /// Submitted; carries the server verdict.
    Submitted(CheckInResult),
}

/// Run one gated check-in attempt with an already-captured selfie.
///
/// Fetches the open window and a fresh fix concurrently, evaluates the
/// gate, and submits only on `Proceed`. A blocked attempt never touches
/// the check-in endpoint.
pub async fn run_check_in<L: Locator>(
    client: &AttendanceClient,
    locator: &L,
    selfie: &Path,
    class_id: &str,
    student_id: &str,
) -> Result<CheckInOutcome> {
    let attempt_id = Uuid::new_v4();
    tracing::info!(%attempt_id, class_id, "check-in attempt started");

    let (session, fix) = tokio::join!(client.current_session(class_id), locator.current_fix());
    let Some(session) = session.context("could not check for an active session")? else {
        return Ok(CheckInOutcome::NoSession);
    };
    let Some(fix) = fix else {
        return Ok(CheckInOutcome::NoFix);
    };

    match gate::evaluate(&session, &fix, now_epoch_ms()) {
        GateDecision::Blocked(reason) => {
            tracing::info!(
                %attempt_id,
                reason = reason.as_str(),
                "blocked locally; nothing uploaded"
            );
            return Ok(CheckInOutcome::Blocked(reason));
        }
        GateDecision::Proceed { distance_meters } => {
            tracing::debug!(%attempt_id, distance_meters, "gate passed");
        }
    }

    let result = client
        .check_in(selfie, &session.class_id, fix.point, student_id)
        .await
        .context("check-in submission failed")?;
    tracing::info!(%attempt_id, ok = result.ok, "server verdict received");
    Ok(CheckInOutcome::Submitted(result))
}

/// Capture a selfie and register it as the reference image.
pub async fn run_enroll(
    client: &AttendanceClient,
    camera_device: &str,
    capture_dir: &Path,
    student_id: &str,
) -> Result<bool> {
    let selfie = capture_selfie(camera_device, capture_dir).await?;
    client
        .enroll(&selfie, student_id)
        .await
        .context("enrollment failed")
}

/// Open an attendance window at the instructor's current position.
pub async fn run_start_session<L: Locator>(
    client: &AttendanceClient,
    locator: &L,
    class_id: &str,
    radius_meters: u32,
    duration_minutes: u32,
) -> Result<bool> {
    let Some(fix) = locator.current_fix().await else {
        anyhow::bail!("location unavailable — cannot open a window without the instructor position");
    };
    let req = StartSessionRequest {
        class_id: class_id.to_string(),
        center_lat: fix.point.lat,
        center_lon: fix.point.lon,
        radius_meters,
        duration_minutes,
    };
    client
        .start_session(&req)
        .await
        .context("could not open attendance window")
}

/// Capture one still on the blocking V4L2 path without stalling the
/// runtime.
pub async fn capture_selfie(device: &str, dir: &Path) -> Result<PathBuf> {
    let device = device.to_string();
    let dir = dir.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<PathBuf, rollcall_hw::CameraError> {
        std::fs::create_dir_all(&dir)?;
        let camera = Camera::open(&device)?;
        camera.capture_still(&dir)
    })
    .await
    .context("capture task cancelled")?
    .context("selfie capture failed")
}
