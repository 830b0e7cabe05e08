//! PNG: signature, then a chunk walk until `IEND` or the end of the buffer.
//!
//! Only `IHDR` is mandatory. `pHYs`, `sRGB`, `iCCP` and `gAMA` attach optional
//! metadata; CRCs are never checked and compressed profile data is never
//! inflated.

use crate::color::{ColorSpace, color_space_from_text};
use crate::cursor::{ByteCursor, TextEncoding};
use crate::error::ProbeError;
use crate::info::{ImageFormat, ImageInfo};

pub(crate) const SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

const IHDR_LEN: usize = 13;
const PHYS_LEN: usize = 9;
const GAMA_LEN: usize = 4;
const CRC_LEN: usize = 4;
/// Longest profile name `iCCP` allows.
const ICCP_NAME_MAX: usize = 79;

const PHYS_UNIT_METER: u8 = 1;
const INCHES_PER_METER: f64 = 0.0254;

#[derive(Default)]
struct Chunks {
    header: Option<Header>,
    resolution: Option<(u32, u32)>,
    color_space: Option<ColorSpace>,
    icc_profile: Option<String>,
    gamma: Option<f64>,
}

struct Header {
    width: u32,
    height: u32,
    bit_depth: u8,
    color_type: u8,
}

impl Header {
    fn channels(&self) -> u8 {
        match self.color_type {
            0 | 3 => 1,
            2 => 3,
            4 => 2,
            6 => 4,
            _ => 3,
        }
    }
}

pub(crate) fn parse(data: &[u8]) -> Result<ImageInfo, ProbeError> {
    if !data.starts_with(&SIGNATURE) {
        return Err(ProbeError::UnrecognizedFormat);
    }
    let mut c = ByteCursor::big_endian(data);
    c.skip(SIGNATURE.len());
    let mut chunks = Chunks::default();

    while c.can_read(8) {
        let length = c.read_u32()? as usize;
        let kind = c.read_array::<4>()?;
        let start = c.position();

        match &kind {
            b"IHDR" => chunks.header = Some(ihdr(&mut c, length)?),
            b"pHYs" if length == PHYS_LEN => chunks.resolution = phys(&mut c).ok(),
            b"sRGB" if length >= 1 => chunks.color_space = Some(ColorSpace::Srgb),
            b"iCCP" => iccp(&mut c, length, &mut chunks),
            b"gAMA" if length == GAMA_LEN => chunks.gamma = c.read_u32().ok().map(gamma),
            b"IEND" => break,
            _ => {}
        }

        let next = start.saturating_add(length).saturating_add(CRC_LEN);
        if c.seek(next).is_err() {
            tracing::trace!(
                chunk = %String::from_utf8_lossy(&kind),
                "PNG chunk runs past the probe buffer"
            );
            break;
        }
    }

    let Some(header) = chunks.header else {
        return Err(ProbeError::MissingDimensions("PNG without IHDR"));
    };
    let mut info = ImageInfo::new(ImageFormat::Png, header.width.into(), header.height.into())?
        .with_resolution(chunks.resolution);
    info.bit_depth = Some(header.bit_depth);
    info.channels = Some(header.channels());
    info.color_space = chunks.color_space;
    info.icc_profile = chunks.icc_profile;
    info.gamma = chunks.gamma;
    Ok(info)
}

fn ihdr(c: &mut ByteCursor<'_>, length: usize) -> Result<Header, ProbeError> {
    if length != IHDR_LEN {
        return Err(ProbeError::InvalidHeader(format!(
            "IHDR length {length}, expected {IHDR_LEN}"
        )));
    }
    let header = Header {
        width: c.read_u32()?,
        height: c.read_u32()?,
        bit_depth: c.read_u8()?,
        color_type: c.read_u8()?,
    };
    c.skip(3); // compression, filter, interlace
    Ok(header)
}

fn phys(c: &mut ByteCursor<'_>) -> Result<(u32, u32), ProbeError> {
    let x = c.read_u32()?;
    let y = c.read_u32()?;
    let unit = c.read_u8()?;
    Ok(if unit == PHYS_UNIT_METER {
        (
            (f64::from(x) * INCHES_PER_METER).round() as u32,
            (f64::from(y) * INCHES_PER_METER).round() as u32,
        )
    } else {
        // Unknown unit: the pair is an aspect ratio, kept as-is.
        (x, y)
    })
}

fn iccp(c: &mut ByteCursor<'_>, length: usize, chunks: &mut Chunks) {
    let limit = length.min(ICCP_NAME_MAX + 1);
    let name = c.read_null_terminated_string(Some(limit), TextEncoding::Latin1);
    if name.is_empty() {
        return;
    }
    if chunks.color_space.is_none() {
        chunks.color_space = color_space_from_text(name.as_bytes());
    }
    chunks.icc_profile = Some(name);
}

fn gamma(raw: u32) -> f64 {
    f64::from(raw) / 100_000.0
}
