//! BMP: file header plus the leading fields of the DIB header.
//!
//! Handles the OS/2 core header (12 bytes) and BITMAPINFOHEADER and its
//! successors (40 bytes and up). Compression, palettes and bitfields are not
//! examined.

use crate::cursor::ByteCursor;
use crate::error::ProbeError;
use crate::info::{ImageFormat, ImageInfo};

const CORE_HEADER_LEN: u32 = 12;
const INFO_HEADER_LEN: u32 = 40;

const INCHES_PER_METER: f64 = 0.0254;

pub(crate) fn parse(data: &[u8]) -> Result<ImageInfo, ProbeError> {
    if !data.starts_with(b"BM") {
        return Err(ProbeError::UnrecognizedFormat);
    }
    let mut c = ByteCursor::little_endian(data);
    c.skip(2 + 8); // signature, file size, reserved
    c.skip(4); // pixel data offset
    let header_size = c.read_u32()?;

    if header_size < CORE_HEADER_LEN
        || (header_size > CORE_HEADER_LEN && header_size < INFO_HEADER_LEN)
    {
        return Err(ProbeError::InvalidHeader(format!(
            "unsupported BMP header size {header_size}"
        )));
    }
    if !c.can_read(header_size as usize - 4) {
        return Err(ProbeError::UnexpectedEof);
    }

    let (width, height, bpp, resolution) = if header_size == CORE_HEADER_LEN {
        let width = c.read_u16()?;
        let height = c.read_u16()?;
        c.skip(2); // planes
        (i64::from(width), i64::from(height), c.read_u16()?, None)
    } else {
        let width = c.read_i32()?;
        // Negative height marks top-down row order.
        let height = c.read_i32()?.unsigned_abs();
        c.skip(2); // planes
        let bpp = c.read_u16()?;
        c.skip(8); // compression, image size
        let x_ppm = c.read_i32()?;
        let y_ppm = c.read_i32()?;
        let resolution = (x_ppm > 0 && y_ppm > 0).then(|| (dpi(x_ppm), dpi(y_ppm)));
        (i64::from(width), i64::from(height), bpp, resolution)
    };

    let mut info = ImageInfo::new(ImageFormat::Bmp, width, height)?.with_resolution(resolution);
    info.bit_depth = u8::try_from(bpp).ok().filter(|&b| b > 0);
    info.channels = channels(bpp);
    Ok(info)
}

fn dpi(pixels_per_meter: i32) -> u32 {
    (f64::from(pixels_per_meter) * INCHES_PER_METER).round() as u32
}

fn channels(bpp: u16) -> Option<u8> {
    match bpp {
        1 | 4 | 8 => Some(1),
        16 | 24 => Some(3),
        32 => Some(4),
        _ => None,
    }
}
