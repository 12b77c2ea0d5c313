//! Raw frame conversion — YUYV 4:2:2 to RGB24 for JPEG encoding.

/// Convert packed YUYV (4:2:2) to interleaved RGB24.
///
/// YUYV packs two pixels per 4 bytes: [Y0, U, Y1, V]; the U and V
/// samples are shared by the pixel pair. BT.601 full-range conversion.
pub fn yuyv_to_rgb(yuyv: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FrameError> {
    let expected = (width * height * 2) as usize;
    if yuyv.len() < expected {
        return Err(FrameError::InvalidLength {
            expected,
            actual: yuyv.len(),
        });
    }

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for pair in yuyv[..expected].chunks_exact(4) {
        let u = pair[1] as f32 - 128.0;
        let v = pair[3] as f32 - 128.0;
        for y in [pair[0] as f32, pair[2] as f32] {
            let r = y + 1.402 * v;
            let g = y - 0.344_136 * u - 0.714_136 * v;
            let b = y + 1.772 * u;
            rgb.push(r.round().clamp(0.0, 255.0) as u8);
            rgb.push(g.round().clamp(0.0, 255.0) as u8);
            rgb.push(b.round().clamp(0.0, 255.0) as u8);
        }
    }
    Ok(rgb)
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("invalid YUYV length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yuyv_neutral_chroma_is_gray() {
        // 2x1 image: [Y0=100, U=128, Y1=200, V=128] — zero chroma.
        let yuyv = vec![100, 128, 200, 128];
        let rgb = yuyv_to_rgb(&yuyv, 2, 1).unwrap();
        assert_eq!(rgb, vec![100, 100, 100, 200, 200, 200]);
    }

    #[test]
    fn test_yuyv_red_chroma() {
        // High V pushes red up and green down; blue stays at luma.
        let yuyv = vec![128, 128, 128, 228];
        let rgb = yuyv_to_rgb(&yuyv, 2, 1).unwrap();
        let (r, g, b) = (rgb[0], rgb[1], rgb[2]);
        assert!(r > 200, "r={r}");
        assert!(g < 80, "g={g}");
        assert_eq!(b, 128);
    }

    #[test]
    fn test_yuyv_output_size() {
        let yuyv = vec![0u8; 4 * 2 * 2]; // 4x2 = 8 pixels, 16 bytes
        let rgb = yuyv_to_rgb(&yuyv, 4, 2).unwrap();
        assert_eq!(rgb.len(), 4 * 2 * 3);
    }

    #[test]
    fn test_yuyv_invalid_length() {
        let yuyv = vec![100, 128]; // too short for 2x1
        assert!(yuyv_to_rgb(&yuyv, 2, 1).is_err());
    }

    #[test]
    fn test_yuyv_clamps_out_of_gamut() {
        // Max luma with max V would exceed 255 without clamping.
        let yuyv = vec![255, 128, 255, 255];
        let rgb = yuyv_to_rgb(&yuyv, 2, 1).unwrap();
        assert_eq!(rgb[0], 255);
    }
}
