//! WebP: RIFF container with `VP8X`, `VP8 `, `VP8L` and `ICCP` chunks.
//!
//! Two passes over the chunk list. The first only looks for `VP8X`, whose
//! canvas size wins over any bitstream header; the second reads the bitstream
//! headers and the ICC chunk.

use crate::color::{ColorSpace, color_space_from_text};
use crate::cursor::ByteCursor;
use crate::error::ProbeError;
use crate::icc::{EMBEDDED_PROFILE_LABEL, profile_description};
use crate::info::{ImageFormat, ImageInfo};

const RIFF_HEADER_LEN: usize = 12;

const VP8X_ALPHA: u8 = 0x10;
const VP8X_ICC: u8 = 0x20;
const VP8_START_CODE: [u8; 3] = [0x9D, 0x01, 0x2A];
const VP8L_SIGNATURE: u8 = 0x2F;
const DIMENSION_MASK: u32 = 0x3FFF;

/// Walks RIFF sub-chunks, yielding each fourCC with its (possibly truncated) payload.
struct Chunks<'a> {
    c: ByteCursor<'a>,
}

impl<'a> Chunks<'a> {
    fn new(data: &'a [u8]) -> Self {
        let mut c = ByteCursor::little_endian(data);
        c.skip(RIFF_HEADER_LEN);
        Self { c }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = ([u8; 4], &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let fourcc = self.c.read_array::<4>().ok()?;
        let size = self.c.read_u32().ok()? as usize;
        let available = size.min(self.c.remaining());
        let payload = self.c.read_bytes(available).ok()?;
        // Payloads are padded to an even length.
        self.c.skip(size - available + (size & 1));
        Some((fourcc, payload))
    }
}

#[derive(Default)]
struct Canvas {
    width: u32,
    height: u32,
    alpha: bool,
    icc_flag: bool,
}

pub(crate) fn parse(data: &[u8]) -> Result<ImageInfo, ProbeError> {
    if data.len() < RIFF_HEADER_LEN || &data[..4] != b"RIFF" || &data[8..12] != b"WEBP" {
        return Err(ProbeError::UnrecognizedFormat);
    }

    let mut canvas = Chunks::new(data)
        .find(|(fourcc, _)| fourcc == b"VP8X")
        .and_then(|(_, payload)| vp8x(payload).ok())
        .unwrap_or_default();

    let mut icc: Option<(Option<String>, Option<ColorSpace>)> = None;
    for (fourcc, payload) in Chunks::new(data) {
        let frame = match &fourcc {
            b"VP8 " => vp8(payload),
            b"VP8L" => vp8l(payload),
            b"ICCP" => {
                icc.get_or_insert_with(|| iccp(payload));
                continue;
            }
            _ => continue,
        };
        match frame {
            Ok((width, height, alpha)) => {
                canvas.alpha |= alpha;
                if canvas.width == 0 || canvas.height == 0 {
                    canvas.width = width;
                    canvas.height = height;
                }
            }
            Err(e) => tracing::trace!(
                chunk = %String::from_utf8_lossy(&fourcc),
                error = %e,
                "skipping unreadable WebP bitstream header"
            ),
        }
    }

    if canvas.width == 0 || canvas.height == 0 {
        return Err(ProbeError::MissingDimensions("WebP without VP8X, VP8 or VP8L header"));
    }
    let mut info = ImageInfo::new(ImageFormat::WebP, canvas.width.into(), canvas.height.into())?;
    info.bit_depth = Some(8);
    info.channels = Some(if canvas.alpha { 4 } else { 3 });
    match icc {
        Some((name, color_space)) => {
            info.icc_profile = Some(name.unwrap_or_else(|| EMBEDDED_PROFILE_LABEL.to_owned()));
            info.color_space = color_space;
        }
        None if canvas.icc_flag => info.icc_profile = Some(EMBEDDED_PROFILE_LABEL.to_owned()),
        None => {}
    }
    Ok(info)
}

fn vp8x(payload: &[u8]) -> Result<Canvas, ProbeError> {
    let mut c = ByteCursor::little_endian(payload);
    let flags = c.read_u8()?;
    c.skip(3);
    Ok(Canvas {
        width: c.read_u24()? + 1,
        height: c.read_u24()? + 1,
        alpha: flags & VP8X_ALPHA != 0,
        icc_flag: flags & VP8X_ICC != 0,
    })
}

fn vp8(payload: &[u8]) -> Result<(u32, u32, bool), ProbeError> {
    let mut c = ByteCursor::little_endian(payload);
    c.skip(3); // frame tag
    if c.read_array::<3>()? != VP8_START_CODE {
        return Err(ProbeError::InvalidHeader("VP8 start code mismatch".into()));
    }
    let packed = c.read_u32()?;
    Ok((packed & DIMENSION_MASK, (packed >> 16) & DIMENSION_MASK, false))
}

fn vp8l(payload: &[u8]) -> Result<(u32, u32, bool), ProbeError> {
    let mut c = ByteCursor::little_endian(payload);
    if c.read_u8()? != VP8L_SIGNATURE {
        return Err(ProbeError::InvalidHeader("VP8L signature mismatch".into()));
    }
    let packed = c.read_u32()?;
    Ok((
        (packed & DIMENSION_MASK) + 1,
        ((packed >> 14) & DIMENSION_MASK) + 1,
        true,
    ))
}

fn iccp(profile: &[u8]) -> (Option<String>, Option<ColorSpace>) {
    let Some(name) = profile_description(profile) else {
        return (None, None);
    };
    let color_space =
        color_space_from_text(name.as_bytes()).or_else(|| color_space_from_text(profile));
    (Some(name), color_space)
}
