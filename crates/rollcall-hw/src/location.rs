//! Location providers — GeoClue2 over D-Bus, plus a manual override.
//!
//! Every provider fails soft: a timeout, a denied authorization, or a
//! provider error yields `None`, never a hard error. Callers surface
//! "location unavailable" and let the user retry explicitly.

use rollcall_core::{GeoPoint, LocationFix};
use std::time::Duration;
use zbus::zvariant::OwnedObjectPath;

/// GeoClue2 desktop id presented to the authorization agent.
const DESKTOP_ID: &str = "rollcall";

/// GClueAccuracyLevel::Exact — the high-accuracy one-shot fix the
/// check-in gate needs.
const ACCURACY_LEVEL_EXACT: u32 = 8;

/// How often to poll the client's Location property while waiting for
/// the service to publish a fix.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// One-shot source of position fixes.
pub trait Locator {
    /// Request one fix. `None` means unavailable — timed out, denied,
    /// or provider error — and is already logged.
    fn current_fix(&self) -> impl std::future::Future<Output = Option<LocationFix>>;
}

#[zbus::proxy(
    interface = "org.freedesktop.GeoClue2.Manager",
    default_service = "org.freedesktop.GeoClue2",
    default_path = "/org/freedesktop/GeoClue2/Manager"
)]
trait Manager {
    fn get_client(&self) -> zbus::Result<OwnedObjectPath>;
}

#[zbus::proxy(
    interface = "org.freedesktop.GeoClue2.Client",
    default_service = "org.freedesktop.GeoClue2"
)]
trait Client {
    fn start(&self) -> zbus::Result<()>;
    fn stop(&self) -> zbus::Result<()>;

    /// Object path of the current fix; "/" until one is available.
    /// GeoClue signals changes via LocationUpdated, not
    /// PropertiesChanged, so the cached getter would never refresh.
    #[zbus(property(emits_changed_signal = "false"))]
    fn location(&self) -> zbus::Result<OwnedObjectPath>;

    #[zbus(property)]
    fn desktop_id(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn set_desktop_id(&self, value: &str) -> zbus::Result<()>;

    #[zbus(property)]
    fn requested_accuracy_level(&self) -> zbus::Result<u32>;

    #[zbus(property)]
    fn set_requested_accuracy_level(&self, value: u32) -> zbus::Result<()>;
}

#[zbus::proxy(
    interface = "org.freedesktop.GeoClue2.Location",
    default_service = "org.freedesktop.GeoClue2"
)]
trait Location {
    #[zbus(property)]
    fn latitude(&self) -> zbus::Result<f64>;

    #[zbus(property)]
    fn longitude(&self) -> zbus::Result<f64>;

    #[zbus(property)]
    fn accuracy(&self) -> zbus::Result<f64>;
}

/// One-shot high-accuracy fix from the GeoClue2 system service.
///
/// Fixes delivered by GeoClue are treated as trusted platform fixes
/// (`simulated = false`).
pub struct GeoclueLocator {
    timeout: Duration,
}

impl GeoclueLocator {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn fetch(&self) -> zbus::Result<LocationFix> {
        let conn = zbus::Connection::system().await?;
        let manager = ManagerProxy::new(&conn).await?;
        let client_path = manager.get_client().await?;

        let client = ClientProxy::builder(&conn)
            .path(client_path)?
            .build()
            .await?;
        client.set_desktop_id(DESKTOP_ID).await?;
        client
            .set_requested_accuracy_level(ACCURACY_LEVEL_EXACT)
            .await?;
        client.start().await?;

        // Poll until the service publishes a fix; the overall deadline
        // is enforced by the caller.
        let fix = loop {
            let path = client.location().await?;
            if path.as_str() != "/" {
                let location = LocationProxy::builder(&conn).path(path)?.build().await?;
                break LocationFix {
                    point: GeoPoint::new(
                        location.latitude().await?,
                        location.longitude().await?,
                    ),
                    accuracy_meters: location.accuracy().await.ok(),
                    simulated: false,
                };
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        };

        // Best effort: the service drops the client on disconnect anyway.
        let _ = client.stop().await;
        Ok(fix)
    }
}

impl Locator for GeoclueLocator {
    async fn current_fix(&self) -> Option<LocationFix> {
        match tokio::time::timeout(self.timeout, self.fetch()).await {
            Ok(Ok(fix)) => {
                tracing::debug!(
                    lat = fix.point.lat,
                    lon = fix.point.lon,
                    accuracy = ?fix.accuracy_meters,
                    "geoclue fix"
                );
                Some(fix)
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "location provider error");
                None
            }
            Err(_) => {
                tracing::warn!(timeout_secs = self.timeout.as_secs(), "location fix timed out");
                None
            }
        }
    }
}

/// Fixed coordinates supplied by the operator.
///
/// Always flagged simulated: a typed-in position is not a trusted
/// platform fix, and the check-in gate treats it accordingly. Intended
/// for instructors opening a window on machines without a location
/// service, and for development.
pub struct ManualLocator {
    point: GeoPoint,
}

impl ManualLocator {
    pub fn new(point: GeoPoint) -> Self {
        Self { point }
    }
}

impl Locator for ManualLocator {
    async fn current_fix(&self) -> Option<LocationFix> {
        tracing::debug!(
            lat = self.point.lat,
            lon = self.point.lon,
            "manual fix (flagged simulated)"
        );
        Some(LocationFix {
            point: self.point,
            accuracy_meters: None,
            simulated: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_manual_fix_is_simulated() {
        let locator = ManualLocator::new(GeoPoint::new(12.9716, 77.5946));
        let fix = locator.current_fix().await.expect("manual fix is always present");
        assert!(fix.simulated);
        assert_eq!(fix.point, GeoPoint::new(12.9716, 77.5946));
        assert_eq!(fix.accuracy_meters, None);
    }

    #[tokio::test]
    async fn test_geoclue_fails_soft_without_service() {
        // With no GeoClue2 on the bus (or no system bus at all, as in
        // most CI containers) the locator must return None, not error.
        let locator = GeoclueLocator::new(Duration::from_millis(250));
        let _ = locator.current_fix().await;
    }
}
