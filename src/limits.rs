use crate::error::ProbeError;
use crate::info::ImageInfo;

/// Prefix length a caller should read before the first probe attempt.
pub const DEFAULT_PROBE_BYTES: usize = 64 * 1024;

/// Larger prefixes to retry with, in order, when a re-readable source fails
/// to probe at [`DEFAULT_PROBE_BYTES`] (metadata pushed past the first
/// 64 KiB, typically by a large EXIF thumbnail or ICC profile).
pub const RETRY_PROBE_BYTES: [usize; 3] = [128 * 1024, 256 * 1024, 1024 * 1024];

/// Bounds applied by [`crate::ParseRequest`].
///
/// All fields default to `None` (no limit).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Limits {
    pub max_width: Option<u64>,
    pub max_height: Option<u64>,
    /// Maximum pixel count (width * height).
    pub max_pixels: Option<u64>,
    /// Only the first `max_input_bytes` of the input are examined.
    pub max_input_bytes: Option<usize>,
}

impl Limits {
    /// Check probed dimensions against limits.
    pub(crate) fn check(&self, info: &ImageInfo) -> Result<(), ProbeError> {
        let (width, height) = (info.width, info.height);
        if let Some(max_w) = self.max_width {
            if u64::from(width) > max_w {
                return Err(ProbeError::LimitExceeded(format!(
                    "width {width} exceeds limit {max_w}"
                )));
            }
        }
        if let Some(max_h) = self.max_height {
            if u64::from(height) > max_h {
                return Err(ProbeError::LimitExceeded(format!(
                    "height {height} exceeds limit {max_h}"
                )));
            }
        }
        if let Some(max_px) = self.max_pixels {
            let pixels = u64::from(width) * u64::from(height);
            if pixels > max_px {
                return Err(ProbeError::LimitExceeded(format!(
                    "pixel count {pixels} exceeds limit {max_px}"
                )));
            }
        }
        Ok(())
    }

    /// The prefix of `data` the decoders are allowed to see.
    pub(crate) fn clamp_input<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        match self.max_input_bytes {
            Some(max) if data.len() > max => &data[..max],
            _ => data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::ImageFormat;

    fn info(width: i64, height: i64) -> ImageInfo {
        ImageInfo::new(ImageFormat::Png, width, height).unwrap()
    }

    #[test]
    fn default_is_unlimited() {
        let limits = Limits::default();
        assert!(limits.check(&info(u32::MAX.into(), u32::MAX.into())).is_ok());
        assert_eq!(limits.clamp_input(&[1, 2, 3]), &[1, 2, 3]);
    }

    #[test]
    fn dimension_bounds() {
        let limits = Limits {
            max_width: Some(100),
            max_height: Some(50),
            max_pixels: Some(2000),
            ..Limits::default()
        };
        assert!(limits.check(&info(100, 20)).is_ok());
        assert!(matches!(
            limits.check(&info(101, 1)),
            Err(ProbeError::LimitExceeded(_))
        ));
        assert!(limits.check(&info(1, 51)).is_err());
        assert!(limits.check(&info(100, 21)).is_err());
    }

    #[test]
    fn input_prefix() {
        let limits = Limits {
            max_input_bytes: Some(2),
            ..Limits::default()
        };
        assert_eq!(limits.clamp_input(&[1, 2, 3]), &[1, 2]);
        assert_eq!(limits.clamp_input(&[1]), &[1]);
    }

    #[test]
    fn retry_budgets_grow() {
        let mut previous = DEFAULT_PROBE_BYTES;
        for size in RETRY_PROBE_BYTES {
            assert!(size > previous);
            previous = size;
        }
    }
}
