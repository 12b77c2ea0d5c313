//! V4L2 still capture via the `v4l` crate.
//!
//! One call, one uniquely named JPEG artifact. The stream uses the
//! minimum buffer count and takes the first dequeued frame, trading
//! exposure convergence for latency — a check-in selfie needs to be
//! fast more than it needs to be pretty.

use crate::frame;
use chrono::Local;
use std::path::{Path, PathBuf};
use thiserror::Error;
use v4l::buffer::Type as BufType;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::FourCC;

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),
    #[error("camera access denied: {0}")]
    PermissionDenied(String),
    #[error("device busy")]
    DeviceBusy,
    #[error("format negotiation failed: {0}")]
    FormatNegotiationFailed(String),
    #[error("capture failed: {0}")]
    CaptureFailed(String),
    #[error("failed to write still: {0}")]
    Io(#[from] std::io::Error),
}

/// Info about a discovered V4L2 device.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub path: String,
    pub name: String,
    pub driver: String,
}

/// Negotiated pixel format for the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PixelFormat {
    /// Motion-JPEG: each frame is already a JPEG, written through as-is.
    Mjpg,
    /// YUYV 4:2:2 packed, converted to RGB and encoded.
    Yuyv,
}

/// V4L2 camera device handle.
pub struct Camera {
    device: Device,
    pub width: u32,
    pub height: u32,
    pub device_path: String,
    pixel_format: PixelFormat,
}

impl Camera {
    /// Open a V4L2 camera device by path (e.g., "/dev/video0").
    pub fn open(device_path: &str) -> Result<Self, CameraError> {
        if !Path::new(device_path).exists() {
            return Err(CameraError::DeviceNotFound(device_path.to_string()));
        }

        let device = Device::with_path(device_path).map_err(|e| {
            let msg = e.to_string();
            if msg.contains("denied") || msg.contains("EACCES") {
                CameraError::PermissionDenied(format!("{device_path}: {e}"))
            } else if msg.contains("busy") || msg.contains("EBUSY") {
                CameraError::DeviceBusy
            } else {
                CameraError::DeviceNotFound(format!("{device_path}: {e}"))
            }
        })?;

        let caps = device.query_caps().map_err(|e| {
            CameraError::CaptureFailed(format!("failed to query capabilities: {e}"))
        })?;

        tracing::info!(
            device = device_path,
            driver = %caps.driver,
            card = %caps.card,
            "opened camera"
        );

        if !caps
            .capabilities
            .contains(v4l::capability::Flags::VIDEO_CAPTURE)
        {
            return Err(CameraError::FormatNegotiationFailed(
                "device does not support video capture".into(),
            ));
        }

        // Request 640x480 MJPG; if the driver negotiates YUYV instead,
        // accept it and convert at capture time.
        let mut fmt = device.format().map_err(|e| {
            CameraError::FormatNegotiationFailed(format!("failed to get format: {e}"))
        })?;

        fmt.fourcc = FourCC::new(b"MJPG");
        fmt.width = 640;
        fmt.height = 480;

        let negotiated = device.set_format(&fmt).map_err(|e| {
            CameraError::FormatNegotiationFailed(format!("failed to set format: {e}"))
        })?;

        let pixel_format = if negotiated.fourcc == FourCC::new(b"MJPG") {
            PixelFormat::Mjpg
        } else if negotiated.fourcc == FourCC::new(b"YUYV") {
            PixelFormat::Yuyv
        } else {
            return Err(CameraError::FormatNegotiationFailed(format!(
                "unsupported pixel format: {:?} (need MJPG or YUYV)",
                negotiated.fourcc
            )));
        };

        tracing::info!(
            width = negotiated.width,
            height = negotiated.height,
            fourcc = ?negotiated.fourcc,
            "negotiated format"
        );

        Ok(Self {
            device,
            width: negotiated.width,
            height: negotiated.height,
            device_path: device_path.to_string(),
            pixel_format,
        })
    }

    /// Capture one still and write it as a JPEG under `dir`.
    ///
    /// Every call produces a new artifact named
    /// `selfie_<YYYYmmdd_HHMMSS_mmm>.jpg` — no reuse across attempts.
    pub fn capture_still(&self, dir: &Path) -> Result<PathBuf, CameraError> {
        let mut stream = MmapStream::with_buffers(&self.device, BufType::VideoCapture, 2)
            .map_err(|e| CameraError::CaptureFailed(format!("failed to create mmap stream: {e}")))?;

        let (buf, meta) = stream
            .next()
            .map_err(|e| CameraError::CaptureFailed(format!("failed to dequeue buffer: {e}")))?;

        let used = meta.bytesused as usize;
        let path = dir.join(format!(
            "selfie_{}.jpg",
            Local::now().format("%Y%m%d_%H%M%S_%3f")
        ));

        match self.pixel_format {
            PixelFormat::Mjpg => {
                if used == 0 || used > buf.len() {
                    return Err(CameraError::CaptureFailed(format!(
                        "bad MJPG buffer length: used={used}, buffer={}",
                        buf.len()
                    )));
                }
                std::fs::write(&path, &buf[..used])?;
            }
            PixelFormat::Yuyv => {
                let rgb = frame::yuyv_to_rgb(buf, self.width, self.height)
                    .map_err(|e| CameraError::CaptureFailed(format!("YUYV conversion: {e}")))?;
                let img = image::RgbImage::from_raw(self.width, self.height, rgb).ok_or_else(
                    || CameraError::CaptureFailed("RGB buffer size mismatch".to_string()),
                )?;
                img.save(&path)
                    .map_err(|e| CameraError::CaptureFailed(format!("JPEG encode: {e}")))?;
            }
        }

        tracing::info!(
            path = %path.display(),
            sequence = meta.sequence,
            "selfie captured"
        );
        Ok(path)
    }

    /// List available V4L2 video capture devices.
    pub fn list_devices() -> Vec<DeviceInfo> {
        let mut devices = Vec::new();

        for i in 0..16 {
            let path = format!("/dev/video{i}");
            if !Path::new(&path).exists() {
                continue;
            }
            let Ok(dev) = Device::with_path(&path) else {
                continue;
            };
            let Ok(caps) = dev.query_caps() else {
                continue;
            };
            if !caps
                .capabilities
                .contains(v4l::capability::Flags::VIDEO_CAPTURE)
            {
                continue;
            }
            devices.push(DeviceInfo {
                path,
                name: caps.card.clone(),
                driver: caps.driver.clone(),
            });
        }

        devices
    }
}
