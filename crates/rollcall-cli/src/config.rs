use std::path::PathBuf;
use std::time::Duration;

/// CLI configuration, loaded from environment variables.
pub struct Config {
    /// Base URL of the attendance service.
    pub server_url: String,
    /// V4L2 device path for the selfie camera.
    pub camera_device: String,
    /// Directory for captured selfie artifacts.
    pub capture_dir: PathBuf,
    /// Deadline for a one-shot location fix.
    pub location_timeout: Duration,
}

impl Config {
    /// Load configuration from `ROLLCALL_*` environment variables with
    /// defaults.
    pub fn from_env() -> Self {
        let capture_dir = std::env::var("ROLLCALL_CAPTURE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir().join("rollcall"));

        Self {
            server_url: std::env::var("ROLLCALL_SERVER_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string()),
            camera_device: std::env::var("ROLLCALL_CAMERA_DEVICE")
                .unwrap_or_else(|_| "/dev/video0".to_string()),
            capture_dir,
            location_timeout: Duration::from_secs(env_u64(
                "ROLLCALL_LOCATION_TIMEOUT_SECS",
                15,
            )),
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
