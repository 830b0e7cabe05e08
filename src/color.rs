//! Color-space labels and the lookups shared by the JPEG, PNG, WebP and AVIF
//! decoders.

use core::fmt;

use memchr::memmem;

/// Color space reported for an image.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    Srgb,
    AdobeRgb,
    DisplayP3,
    DciP3,
    Rec2020,
    ProPhotoRgb,
    /// Device RGB with no further characterization.
    Rgb,
    YCbCr,
    Ycck,
    Cmyk,
    Grayscale,
    Lab,
    /// An ICC profile is embedded but could not be identified.
    IccProfile,
}

impl ColorSpace {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Srgb => "sRGB",
            Self::AdobeRgb => "Adobe RGB",
            Self::DisplayP3 => "Display P3",
            Self::DciP3 => "DCI-P3",
            Self::Rec2020 => "Rec. 2020",
            Self::ProPhotoRgb => "ProPhoto RGB",
            Self::Rgb => "RGB",
            Self::YCbCr => "YCbCr",
            Self::Ycck => "YCCK",
            Self::Cmyk => "CMYK",
            Self::Grayscale => "Grayscale",
            Self::Lab => "Lab",
            Self::IccProfile => "ICC Profile",
        }
    }
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ColorSpace {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Guess a color space from profile names or raw profile bytes read as latin1.
///
/// Case-insensitive substring checks in a fixed priority order; the first hit wins.
pub fn color_space_from_text(text: &[u8]) -> Option<ColorSpace> {
    let lower = text.to_ascii_lowercase();
    let has = |needle: &str| memmem::find(&lower, needle.as_bytes()).is_some();

    if has("srgb") || has("s_rgb") {
        Some(ColorSpace::Srgb)
    } else if has("adobe") && has("rgb") {
        Some(ColorSpace::AdobeRgb)
    } else if has("display") && has("p3") {
        Some(ColorSpace::DisplayP3)
    } else if has("prophoto") {
        Some(ColorSpace::ProPhotoRgb)
    } else if has("rec2020") || has("rec.2020") || has("rec_2020") {
        Some(ColorSpace::Rec2020)
    } else {
        None
    }
}

/// Map a 4-character ICC data color space signature (header bytes 16..20).
pub fn color_space_from_signature(signature: &[u8]) -> Option<ColorSpace> {
    let trimmed = signature
        .iter()
        .rposition(|&b| b != b' ' && b != 0)
        .map_or(&[][..], |end| &signature[..=end]);
    match trimmed {
        b"RGB" => Some(ColorSpace::Rgb),
        b"GRAY" => Some(ColorSpace::Grayscale),
        b"CMYK" => Some(ColorSpace::Cmyk),
        b"Lab" => Some(ColorSpace::Lab),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_priority() {
        assert_eq!(color_space_from_text(b"sRGB IEC61966-2.1"), Some(ColorSpace::Srgb));
        assert_eq!(color_space_from_text(b"Adobe RGB (1998)"), Some(ColorSpace::AdobeRgb));
        assert_eq!(color_space_from_text(b"Display P3"), Some(ColorSpace::DisplayP3));
        assert_eq!(color_space_from_text(b"ROMM ProPhoto"), Some(ColorSpace::ProPhotoRgb));
        assert_eq!(color_space_from_text(b"ITU-R Rec.2020"), Some(ColorSpace::Rec2020));
        assert_eq!(color_space_from_text(b"rec_2020 PQ"), Some(ColorSpace::Rec2020));
        // sRGB is checked before Adobe.
        assert_eq!(color_space_from_text(b"adobe srgb"), Some(ColorSpace::Srgb));
        assert_eq!(color_space_from_text(b"Generic Gray"), None);
        assert_eq!(color_space_from_text(b""), None);
    }

    #[test]
    fn latin1_bytes_do_not_confuse_matching() {
        let mut bytes = vec![0xFFu8, 0xE9, 0x00];
        bytes.extend_from_slice(b"DISPLAY p3");
        assert_eq!(color_space_from_text(&bytes), Some(ColorSpace::DisplayP3));
    }

    #[test]
    fn signatures() {
        assert_eq!(color_space_from_signature(b"RGB "), Some(ColorSpace::Rgb));
        assert_eq!(color_space_from_signature(b"GRAY"), Some(ColorSpace::Grayscale));
        assert_eq!(color_space_from_signature(b"CMYK"), Some(ColorSpace::Cmyk));
        assert_eq!(color_space_from_signature(b"Lab "), Some(ColorSpace::Lab));
        assert_eq!(color_space_from_signature(b"XYZ "), None);
        assert_eq!(color_space_from_signature(b"    "), None);
    }

    #[test]
    fn labels() {
        assert_eq!(ColorSpace::AdobeRgb.to_string(), "Adobe RGB");
        assert_eq!(ColorSpace::Rec2020.as_str(), "Rec. 2020");
    }
}
