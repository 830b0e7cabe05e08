//! Parse dispatcher: detection fast path, then every decoder in table order.

use std::panic::{self, AssertUnwindSafe};

use crate::detect::detect;
use crate::error::ProbeError;
use crate::info::{ImageFormat, ImageInfo};
use crate::limits::Limits;
use crate::{avif, bmp, gif, ico, jpeg, png, svg, webp};

type Decoder = fn(&[u8]) -> Result<ImageInfo, ProbeError>;

impl ImageFormat {
    fn decoder(self) -> Decoder {
        match self {
            Self::Jpeg => jpeg::parse,
            Self::Png => png::parse,
            Self::Gif => gif::parse,
            Self::WebP => webp::parse,
            Self::Avif => avif::parse,
            Self::Bmp => bmp::parse,
            Self::Ico => ico::parse,
            Self::Svg => svg::parse,
        }
    }

    /// Run this format's decoder alone, with no detection and no fallback.
    pub fn decode(self, data: &[u8]) -> Option<ImageInfo> {
        run_isolated(self, data).ok()
    }
}

/// Run one decoder, converting a panic into an error.
fn run_isolated(format: ImageFormat, data: &[u8]) -> Result<ImageInfo, ProbeError> {
    let decoder = format.decoder();
    let result = match panic::catch_unwind(AssertUnwindSafe(|| decoder(data))) {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(%format, len = data.len(), "decoder panicked; treating as no match");
            return Err(ProbeError::InvalidHeader(format!("{format} decoder panicked")));
        }
    };
    if let Err(e) = &result {
        tracing::trace!(%format, error = %e, "decoder rejected input");
    }
    result
}

/// Probe `data` and return its header metadata, or `None` if no decoder
/// accepts it.
///
/// The detected format's decoder runs first. If detection fails or that
/// decoder rejects the input, every decoder is tried in signature-table order.
pub fn parse(data: &[u8]) -> Option<ImageInfo> {
    ParseRequest::new(data).parse().ok()
}

/// Builder for a probe with limits or a known format.
///
/// ```
/// use zenprobe::{ImageFormat, Limits, ParseRequest, ProbeError};
///
/// let data = b"GIF89a\x0a\x00\x05\x00";
/// let limits = Limits { max_pixels: Some(1_000_000), ..Limits::default() };
/// let info = ParseRequest::new(data).with_limits(&limits).parse()?;
/// assert_eq!((info.width, info.height), (10, 5));
///
/// let forced = ParseRequest::new(data).with_format(ImageFormat::Png).parse();
/// assert!(forced.is_err());
/// # Ok::<(), ProbeError>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ParseRequest<'a> {
    data: &'a [u8],
    limits: Option<&'a Limits>,
    format: Option<ImageFormat>,
}

impl<'a> ParseRequest<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            limits: None,
            format: None,
        }
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Skip detection and fallback; only this format's decoder runs.
    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Probe the input.
    ///
    /// Errors are [`ProbeError::Unsupported`] when no signature matched and no
    /// decoder accepted the input, [`ProbeError::Corrupt`] when a signature
    /// matched but no decoder accepted it, the decoder's own error for a forced
    /// format, or [`ProbeError::LimitExceeded`].
    pub fn parse(self) -> Result<ImageInfo, ProbeError> {
        let data = match self.limits {
            Some(limits) => limits.clamp_input(self.data),
            None => self.data,
        };
        let info = match self.format {
            Some(format) => run_isolated(format, data)?,
            None => dispatch(data)?,
        };
        if let Some(limits) = self.limits {
            limits.check(&info)?;
        }
        Ok(info)
    }
}

fn dispatch(data: &[u8]) -> Result<ImageInfo, ProbeError> {
    let detected = detect(data);
    if let Some(format) = detected {
        if let Ok(info) = run_isolated(format, data) {
            return Ok(info);
        }
        tracing::debug!(%format, "detected decoder failed; trying every decoder");
    } else {
        tracing::debug!(len = data.len(), "no signature matched; trying every decoder");
    }

    for format in ImageFormat::ALL {
        if Some(format) == detected {
            continue;
        }
        if let Ok(info) = run_isolated(format, data) {
            tracing::debug!(%format, "fallback decoder accepted input");
            return Ok(info);
        }
    }

    Err(match detected {
        Some(format) => ProbeError::Corrupt { format },
        None => ProbeError::Unsupported,
    })
}

/// Decode a JPEG header. `None` if `data` is not a readable JPEG.
pub fn decode_jpeg(data: &[u8]) -> Option<ImageInfo> {
    ImageFormat::Jpeg.decode(data)
}

/// Decode a PNG header. `None` if `data` is not a readable PNG.
pub fn decode_png(data: &[u8]) -> Option<ImageInfo> {
    ImageFormat::Png.decode(data)
}

pub fn decode_gif(data: &[u8]) -> Option<ImageInfo> {
    ImageFormat::Gif.decode(data)
}

pub fn decode_webp(data: &[u8]) -> Option<ImageInfo> {
    ImageFormat::WebP.decode(data)
}

pub fn decode_avif(data: &[u8]) -> Option<ImageInfo> {
    ImageFormat::Avif.decode(data)
}

pub fn decode_bmp(data: &[u8]) -> Option<ImageInfo> {
    ImageFormat::Bmp.decode(data)
}

pub fn decode_ico(data: &[u8]) -> Option<ImageInfo> {
    ImageFormat::Ico.decode(data)
}

/// Decode the root element of an SVG document.
pub fn decode_svg(data: &[u8]) -> Option<ImageInfo> {
    ImageFormat::Svg.decode(data)
}
