use anyhow::{Context, Result};
use chrono::TimeZone;
use clap::{Parser, Subcommand};
use rollcall_client::AttendanceClient;
use rollcall_core::{GeoPoint, LocationFix};
use rollcall_hw::{Camera, GeoclueLocator, Locator, ManualLocator};

mod config;
mod flow;

use config::Config;
use flow::CheckInOutcome;

#[derive(Parser)]
#[command(name = "rollcall", about = "Geofenced selfie attendance CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the active attendance window for a class
    Session { class_id: String },
    /// Open an attendance window at your current position (instructor)
    Start {
        class_id: String,
        /// Acceptance radius in meters
        #[arg(short, long, default_value_t = 10)]
        radius: u32,
        /// Window length in minutes
        #[arg(short, long, default_value_t = 10)]
        duration: u32,
        /// Manual position as "lat,lon" (skips the location service)
        #[arg(long, value_parser = parse_lat_lon)]
        at: Option<GeoPoint>,
    },
    /// Capture a selfie and register it as your reference image
    Enroll { student_id: String },
    /// Capture a selfie and submit a check-in for a class
    Checkin {
        class_id: String,
        student_id: String,
        /// Manual position as "lat,lon" — flagged as simulated, so the
        /// local gate will block it; useful to preview gate behavior
        #[arg(long, value_parser = parse_lat_lon)]
        at: Option<GeoPoint>,
    },
    /// List available cameras
    Devices,
}

/// Parse "lat,lon" into a coordinate pair.
fn parse_lat_lon(s: &str) -> Result<GeoPoint, String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"lat,lon\", got {s:?}"))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("bad latitude: {e}"))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("bad longitude: {e}"))?;
    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("latitude out of range: {lat}"));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(format!("longitude out of range: {lon}"));
    }
    Ok(GeoPoint::new(lat, lon))
}

/// GeoClue2 by default, manual override when `--at` is given.
enum AnyLocator {
    Geoclue(GeoclueLocator),
    Manual(ManualLocator),
}

impl AnyLocator {
    fn from_override(at: Option<GeoPoint>, cfg: &Config) -> Self {
        match at {
            Some(point) => AnyLocator::Manual(ManualLocator::new(point)),
            None => AnyLocator::Geoclue(GeoclueLocator::new(cfg.location_timeout)),
        }
    }
}

impl Locator for AnyLocator {
    async fn current_fix(&self) -> Option<LocationFix> {
        match self {
            AnyLocator::Geoclue(l) => l.current_fix().await,
            AnyLocator::Manual(l) => l.current_fix().await,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = Config::from_env();

    // Ctrl-C drops the in-flight command future: pending location,
    // capture, and network operations are cancelled and their results
    // discarded.
    tokio::select! {
        res = run(cli, &cfg) => res,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted; pending operation cancelled");
            println!("Cancelled.");
            Ok(())
        }
    }
}

async fn run(cli: Cli, cfg: &Config) -> Result<()> {
    let client = AttendanceClient::new(&cfg.server_url)?;

    match cli.command {
        Commands::Session { class_id } => {
            let session = client
                .current_session(&class_id)
                .await
                .context("could not check for an active session")?;
            match session {
                Some(s) => {
                    println!("Class:  {}", s.class_id);
                    println!("Center: {:.6}, {:.6}", s.center.lat, s.center.lon);
                    println!("Radius: {} m", s.radius_meters);
                    println!("Window ends: {}", format_expiry(s.expires_at_epoch_ms));
                }
                None => println!("No active session for {class_id}."),
            }
        }

        Commands::Start {
            class_id,
            radius,
            duration,
            at,
        } => {
            let locator = AnyLocator::from_override(at, cfg);
            let ok = flow::run_start_session(&client, &locator, &class_id, radius, duration)
                .await?;
            if ok {
                println!("Session opened: {class_id}, {radius} m radius, {duration} min.");
            } else {
                println!("Server declined to open the session.");
            }
        }

        Commands::Enroll { student_id } => {
            let ok =
                flow::run_enroll(&client, &cfg.camera_device, &cfg.capture_dir, &student_id)
                    .await?;
            if ok {
                println!("Reference image enrolled for {student_id}.");
            } else {
                println!("Enrollment declined by the server.");
            }
        }

        Commands::Checkin {
            class_id,
            student_id,
            at,
        } => {
            let locator = AnyLocator::from_override(at, cfg);
            let selfie = flow::capture_selfie(&cfg.camera_device, &cfg.capture_dir).await?;
            let outcome =
                flow::run_check_in(&client, &locator, &selfie, &class_id, &student_id).await?;
            report_outcome(outcome);
        }

        Commands::Devices => {
            let devices = Camera::list_devices();
            if devices.is_empty() {
                println!("No capture devices found.");
            }
            for d in devices {
                println!("{}  {} ({})", d.path, d.name, d.driver);
            }
        }
    }

    Ok(())
}

fn report_outcome(outcome: CheckInOutcome) {
    match outcome {
        CheckInOutcome::NoSession => println!("No active session — nothing to check in to."),
        CheckInOutcome::NoFix => {
            println!("Location unavailable — check permissions and try again.")
        }
        CheckInOutcome::Blocked(reason) => {
            use rollcall_core::BlockReason;
            let detail = match reason {
                BlockReason::Expired => "the attendance window has closed".to_string(),
                BlockReason::OutOfRange { distance_meters } => {
                    format!("you are {distance_meters:.0} m from the session center")
                }
                BlockReason::SuspectLocation => {
                    "the location fix is not from a trusted source".to_string()
                }
            };
            println!("Check-in blocked ({}): {detail}.", reason.as_str());
        }
        CheckInOutcome::Submitted(result) => {
            if result.ok {
                match result.match_confidence {
                    Some(confidence) => {
                        println!("Attendance marked ({}% match).", confidence.trunc() as i64)
                    }
                    None => println!("Attendance marked."),
                }
            } else {
                println!(
                    "Check-in rejected: {}",
                    result.message.as_deref().unwrap_or("no reason given")
                );
            }
        }
    }
}

/// Window end as local wall-clock time.
fn format_expiry(epoch_ms: i64) -> String {
    match chrono::Local.timestamp_millis_opt(epoch_ms).single() {
        Some(t) => t.format("%H:%M:%S").to_string(),
        None => format!("{epoch_ms} (epoch ms)"),
    }
}
