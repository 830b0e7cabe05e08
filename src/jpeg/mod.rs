//! JPEG: walk marker segments up to the first Start-of-Frame.
//!
//! APP0 (JFIF), APP1 (Exif), APP2 (ICC) and APP14 (Adobe) contribute
//! resolution and color information on the way; the SOF segment supplies
//! dimensions, precision and component count and ends the scan.

mod exif;

use crate::color::{ColorSpace, color_space_from_signature, color_space_from_text};
use crate::cursor::{ByteCursor, TextEncoding};
use crate::error::ProbeError;
use crate::icc;
use crate::info::{ImageFormat, ImageInfo};

const SOI: [u8; 2] = [0xFF, 0xD8];

const APP0: u8 = 0xE0;
const APP1: u8 = 0xE1;
const APP2: u8 = 0xE2;
const APP14: u8 = 0xEE;

const JFIF_ID: &[u8] = b"JFIF\0";
const EXIF_ID: &[u8] = b"Exif\0\0";
const ICC_ID: &[u8] = b"ICC_PROFILE\0";
const ADOBE_ID: &[u8] = b"Adobe";

/// Start-of-Frame markers: C0..CF except DHT (C4), JPG (C8) and DAC (CC).
fn is_sof_marker(marker: u8) -> bool {
    matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC)
}

/// Markers with no length field.
fn is_standalone_marker(marker: u8) -> bool {
    matches!(marker, 0x01 | 0xD0..=0xD9)
}

/// Metadata collected from segments seen before the frame header.
#[derive(Default)]
struct Segments {
    resolution: Option<(u32, u32)>,
    color_space: Option<ColorSpace>,
    icc_found: bool,
    icc_profile: Option<String>,
}

pub(crate) fn parse(data: &[u8]) -> Result<ImageInfo, ProbeError> {
    if !data.starts_with(&SOI) {
        return Err(ProbeError::UnrecognizedFormat);
    }
    let mut c = ByteCursor::big_endian(data);
    c.skip(SOI.len());
    let mut seen = Segments::default();

    while c.remaining() >= 2 {
        if c.read_u8()? != 0xFF {
            continue;
        }
        let mut marker = c.read_u8()?;
        while marker == 0xFF {
            marker = c.read_u8()?;
        }
        if marker == 0x00 || is_standalone_marker(marker) {
            continue;
        }

        let length = c.read_u16()? as usize;
        if length < 2 || length - 2 > c.remaining() {
            return Err(ProbeError::InvalidHeader(format!(
                "JPEG segment {marker:#04X} declares length {length}"
            )));
        }
        let start = c.position();
        let payload = length - 2;

        if is_sof_marker(marker) {
            return frame(&mut c, seen);
        }

        let handled = match marker {
            APP0 if payload >= 12 => jfif(&mut c, &mut seen),
            APP1 => exif_segment(&mut c, payload, &mut seen),
            APP2 if payload > 14 => icc_segment(&mut c, start, payload, &mut seen),
            APP14 if payload >= 12 => adobe(&mut c, &mut seen),
            _ => Ok(()),
        };
        if let Err(e) = handled {
            tracing::trace!(marker, error = %e, "skipping unreadable JPEG segment");
        }
        // Realign on the declared boundary no matter what the handler consumed.
        c.seek(start + payload)?;
    }

    Err(ProbeError::MissingDimensions("JPEG ended before a frame header"))
}

fn frame(c: &mut ByteCursor<'_>, seen: Segments) -> Result<ImageInfo, ProbeError> {
    let precision = c.read_u8()?;
    let height = c.read_u16()?;
    let width = c.read_u16()?;
    let components = c.read_u8()?;

    let mut info = ImageInfo::new(ImageFormat::Jpeg, width.into(), height.into())?
        .with_resolution(seen.resolution);
    info.bit_depth = (precision != 0).then_some(precision);
    info.channels = Some(components);
    info.icc_profile = seen.icc_profile;
    info.color_space = seen.color_space.or(match components {
        1 => Some(ColorSpace::Grayscale),
        3 => Some(ColorSpace::Rgb),
        4 => Some(ColorSpace::Cmyk),
        _ => None,
    });
    Ok(info)
}

fn jfif(c: &mut ByteCursor<'_>, seen: &mut Segments) -> Result<(), ProbeError> {
    if !c.starts_with(JFIF_ID) {
        return Ok(());
    }
    c.skip(JFIF_ID.len() + 2); // identifier + version
    let unit = c.read_u8()?;
    let x = c.read_u16()?;
    let y = c.read_u16()?;
    if seen.resolution.is_some() {
        return Ok(());
    }
    seen.resolution = match unit {
        1 => Some((x.into(), y.into())),
        2 => Some((
            (f64::from(x) * 2.54).round() as u32,
            (f64::from(y) * 2.54).round() as u32,
        )),
        _ => None,
    };
    Ok(())
}

fn exif_segment(
    c: &mut ByteCursor<'_>,
    payload: usize,
    seen: &mut Segments,
) -> Result<(), ProbeError> {
    if payload < EXIF_ID.len() || !c.starts_with(EXIF_ID) {
        return Ok(());
    }
    c.skip(EXIF_ID.len());
    let tiff = c.read_bytes(payload - EXIF_ID.len())?;
    // EXIF wins over JFIF.
    if let Some(dpi) = exif::resolution(tiff)? {
        seen.resolution = Some(dpi);
    }
    Ok(())
}

fn icc_segment(
    c: &mut ByteCursor<'_>,
    start: usize,
    payload: usize,
    seen: &mut Segments,
) -> Result<(), ProbeError> {
    if !c.starts_with(ICC_ID) {
        c.seek(start)?;
        return Ok(());
    }
    c.skip(ICC_ID.len() + 2); // identifier + chunk index/count
    let profile = c.read_bytes(payload - ICC_ID.len() - 2)?;
    // Only the first chunk of a multi-segment profile is inspected.
    if seen.icc_found {
        return Ok(());
    }
    seen.icc_found = true;
    seen.icc_profile = icc::profile_description(profile);

    let by_name = color_space_from_text(profile);
    let by_signature = || {
        let mut header = ByteCursor::big_endian(profile);
        header.seek(16).ok()?;
        let signature = header.read_fixed_string(4, TextEncoding::Ascii).ok()?;
        color_space_from_signature(signature.as_bytes())
    };
    if let Some(cs) = by_name.or_else(by_signature) {
        seen.color_space = Some(cs);
    }
    Ok(())
}

fn adobe(c: &mut ByteCursor<'_>, seen: &mut Segments) -> Result<(), ProbeError> {
    if !c.starts_with(ADOBE_ID) {
        return Ok(());
    }
    c.skip(ADOBE_ID.len() + 6); // identifier + version + two flag words
    let transform = c.read_u8()?;
    let candidate = match transform {
        0 if !seen.icc_found => Some(ColorSpace::AdobeRgb),
        1 if !seen.icc_found => Some(ColorSpace::YCbCr),
        2 => Some(ColorSpace::Ycck),
        _ => None,
    };
    // Adobe data may replace a weak "RGB" default but not an ICC-derived value.
    if candidate.is_some() && matches!(seen.color_space, None | Some(ColorSpace::Rgb)) {
        seen.color_space = candidate;
    }
    Ok(())
}
