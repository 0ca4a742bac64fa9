use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("invalid source dimensions {width}x{height}: both must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Frame resolution an animation is rescaled to for one specific display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TargetResolution {
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Display for TargetResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Derive the target resolution for a source animation on a given display.
///
/// Device metrics are normalized to portrait first: animations are authored
/// portrait, so the display's short edge becomes the target width even when
/// the device is currently in landscape. Square sources stay square at the
/// normalized device width. Any other source keeps its aspect ratio, with the
/// height floored and clamped to the physical display height.
pub fn plan(
    source_width: u32,
    source_height: u32,
    device_width_px: u32,
    device_height_px: u32,
) -> Result<TargetResolution, ResolutionError> {
    if source_width == 0 || source_height == 0 {
        return Err(ResolutionError::InvalidDimensions {
            width: source_width,
            height: source_height,
        });
    }

    let (device_width, device_height) = if device_width_px > device_height_px {
        (device_height_px, device_width_px)
    } else {
        (device_width_px, device_height_px)
    };

    if source_width == source_height {
        return Ok(TargetResolution {
            width: device_width,
            height: device_width,
        });
    }

    let scale = f64::from(device_width) / f64::from(source_width);
    let candidate = (f64::from(source_height) * scale).floor() as u32;

    Ok(TargetResolution {
        width: device_width,
        height: candidate.min(device_height),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_source_stays_square() {
        let target = plan(100, 100, 1080, 1920).unwrap();
        assert_eq!(target.width, target.height);
        assert_eq!(target.width, 1080);
    }

    #[test]
    fn landscape_device_metrics_are_normalized() {
        // Same display reported in landscape orientation.
        let portrait = plan(720, 1280, 1080, 1920).unwrap();
        let landscape = plan(720, 1280, 1920, 1080).unwrap();
        assert_eq!(portrait, landscape);
    }

    #[test]
    fn aspect_ratio_is_preserved_within_rounding() {
        let target = plan(720, 1280, 1080, 1920).unwrap();
        assert_eq!(target.width, 1080);
        assert!(target.height <= 1920);

        let source_ratio = 1280.0 / 720.0;
        let target_ratio = f64::from(target.height) / f64::from(target.width);
        assert!((source_ratio - target_ratio).abs() < 0.01);
    }

    #[test]
    fn taller_than_display_sources_clamp_to_device_height() {
        // 1:4 source would scale to 4320 tall on a 1080-wide display.
        let target = plan(500, 2000, 1080, 1920).unwrap();
        assert_eq!(target.width, 1080);
        assert_eq!(target.height, 1920);
    }

    #[test]
    fn shorter_sources_keep_their_scaled_height() {
        // 16:9 landscape-ish source on a portrait display.
        let target = plan(1280, 720, 1080, 1920).unwrap();
        assert_eq!(target.width, 1080);
        assert_eq!(target.height, 607); // floor(720 * 1080/1280)
    }

    #[test]
    fn replanning_own_output_never_exceeds_device_bounds() {
        let cases = [
            (500, 500),
            (720, 1280),
            (1280, 720),
            (500, 2000),
            (1080, 1920),
            (2160, 3840),
        ];
        for (w, h) in cases {
            let first = plan(w, h, 1080, 1920).unwrap();
            let second = plan(first.width, first.height, 1080, 1920).unwrap();
            assert!(second.width <= 1080, "width grew for source {w}x{h}");
            assert!(second.height <= 1920, "height grew for source {w}x{h}");
        }
    }

    #[test]
    fn zero_source_dimensions_are_rejected() {
        assert!(matches!(
            plan(0, 500, 1080, 1920).unwrap_err(),
            ResolutionError::InvalidDimensions { .. }
        ));
        assert!(plan(500, 0, 1080, 1920).is_err());
    }

    #[test]
    fn exact_device_match_is_identity() {
        let target = plan(1080, 1920, 1080, 1920).unwrap();
        assert_eq!(
            target,
            TargetResolution {
                width: 1080,
                height: 1920
            }
        );
    }
}
