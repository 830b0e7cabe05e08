use core::fmt;

use crate::color::ColorSpace;
use crate::error::ProbeError;

/// Image format recognized by the probe.
///
/// The declaration order is the signature-table order used by
/// [`crate::detect`] and by the dispatcher's fallback pass.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
    Avif,
    Bmp,
    Ico,
    /// Text-based, matched last.
    Svg,
}

impl ImageFormat {
    /// Every format in signature-table order.
    pub const ALL: [ImageFormat; 8] = [
        Self::Jpeg,
        Self::Png,
        Self::Gif,
        Self::WebP,
        Self::Avif,
        Self::Bmp,
        Self::Ico,
        Self::Svg,
    ];

    /// Short format tag (`jpg`, `png`, ...).
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::WebP => "webp",
            Self::Avif => "avif",
            Self::Bmp => "bmp",
            Self::Ico => "ico",
            Self::Svg => "svg",
        }
    }

    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
            Self::Avif => "image/avif",
            Self::Bmp => "image/bmp",
            Self::Ico => "image/vnd.microsoft.icon",
            Self::Svg => "image/svg+xml",
        }
    }

    /// Common file extensions, preferred one first.
    pub const fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Jpeg => &["jpg", "jpeg", "jpe", "jfif"],
            Self::Png => &["png"],
            Self::Gif => &["gif"],
            Self::WebP => &["webp"],
            Self::Avif => &["avif"],
            Self::Bmp => &["bmp", "dib"],
            Self::Ico => &["ico"],
            Self::Svg => &["svg"],
        }
    }

    /// Reverse lookup from a format tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.tag() == tag)
    }

    /// Lookup by file extension (case-insensitive, without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.extensions().contains(&ext.as_str()))
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ImageFormat {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

/// Metadata probed from an image header.
///
/// Width and height are always positive. Everything else is optional and only
/// present when the header carried it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[non_exhaustive]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub format: ImageFormat,
    #[cfg_attr(feature = "serde", serde(rename = "mime"))]
    pub mime_type: &'static str,
    /// Unit the width was declared in (SVG only). `None` means pixels.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "wUnits", skip_serializing_if = "Option::is_none")
    )]
    pub width_units: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "hUnits", skip_serializing_if = "Option::is_none")
    )]
    pub height_units: Option<String>,
    /// Horizontal density in dots per inch.
    ///
    /// PNG `pHYs` with an unknown unit stores the raw pixels-per-unit values
    /// here, which only describe an aspect ratio.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "wResolution", skip_serializing_if = "Option::is_none")
    )]
    pub x_resolution: Option<u32>,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "hResolution", skip_serializing_if = "Option::is_none")
    )]
    pub y_resolution: Option<u32>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub color_space: Option<ColorSpace>,
    /// Embedded ICC profile description, when one could be read.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub icc_profile: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub gamma: Option<f64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub bit_depth: Option<u8>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub channels: Option<u8>,
    /// Raw `nclx` colour primaries code (AVIF).
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub color_primaries: Option<u16>,
    /// Raw `nclx` transfer characteristics code (AVIF).
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub transfer_characteristics: Option<u16>,
}

impl ImageInfo {
    /// Start a result for `format`. Fails unless both dimensions are positive
    /// and fit in `u32`.
    pub(crate) fn new(format: ImageFormat, width: i64, height: i64) -> Result<Self, ProbeError> {
        let (Ok(w), Ok(h)) = (u32::try_from(width), u32::try_from(height)) else {
            return Err(ProbeError::InvalidDimensions { width, height });
        };
        if w == 0 || h == 0 {
            return Err(ProbeError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width: w,
            height: h,
            format,
            mime_type: format.mime_type(),
            width_units: None,
            height_units: None,
            x_resolution: None,
            y_resolution: None,
            color_space: None,
            icc_profile: None,
            gamma: None,
            bit_depth: None,
            channels: None,
            color_primaries: None,
            transfer_characteristics: None,
        })
    }

    /// Unit of `width`; pixels unless the source declared otherwise.
    pub fn width_units(&self) -> &str {
        self.width_units.as_deref().unwrap_or("px")
    }

    /// Unit of `height`; pixels unless the source declared otherwise.
    pub fn height_units(&self) -> &str {
        self.height_units.as_deref().unwrap_or("px")
    }

    /// `(x, y)` resolution when both axes are known.
    pub fn resolution(&self) -> Option<(u32, u32)> {
        Some((self.x_resolution?, self.y_resolution?))
    }

    pub(crate) fn with_resolution(mut self, resolution: Option<(u32, u32)>) -> Self {
        if let Some((x, y)) = resolution {
            self.x_resolution = Some(x);
            self.y_resolution = Some(y);
        }
        self
    }
}
