//! Resolution tags from the TIFF structure inside an `Exif\0\0` APP1 payload.

use crate::cursor::{ByteCursor, Endian};
use crate::error::ProbeError;

const TAG_X_RESOLUTION: u16 = 0x011A;
const TAG_Y_RESOLUTION: u16 = 0x011B;
const TAG_RESOLUTION_UNIT: u16 = 0x0128;

const TYPE_SHORT: u16 = 3;
const TYPE_RATIONAL: u16 = 5;

const UNIT_CENTIMETER: u16 = 3;

const IFD_ENTRY_LEN: usize = 12;

/// Read XResolution/YResolution/ResolutionUnit from IFD0 and return DPI.
///
/// `tiff` starts at the byte-order mark; all offsets are relative to it.
/// Returns `Ok(None)` when the directory does not carry both resolutions.
pub(super) fn resolution(tiff: &[u8]) -> Result<Option<(u32, u32)>, ProbeError> {
    let endian = match tiff.get(..2) {
        Some(b"II") => Endian::Little,
        Some(b"MM") => Endian::Big,
        _ => return Err(ProbeError::InvalidHeader("bad TIFF byte order".into())),
    };
    let mut c = ByteCursor::new(tiff, endian);
    c.skip(4); // byte order + magic 42
    let ifd_offset = c.read_u32()? as usize;
    c.seek(ifd_offset)?;
    let count = c.read_u16()?;

    let mut x = None;
    let mut y = None;
    let mut unit = None;
    for _ in 0..count {
        // A directory cut off by the probe budget keeps what was read so far.
        if !c.can_read(IFD_ENTRY_LEN) {
            break;
        }
        let tag = c.read_u16()?;
        let kind = c.read_u16()?;
        let n = c.read_u32()?;
        let value = c.read_u32()?;
        match (tag, kind, n) {
            (TAG_X_RESOLUTION, TYPE_RATIONAL, 1) => x = rational(tiff, endian, value),
            (TAG_Y_RESOLUTION, TYPE_RATIONAL, 1) => y = rational(tiff, endian, value),
            (TAG_RESOLUTION_UNIT, TYPE_SHORT, 1) => {
                // A SHORT is left-justified in the value field.
                unit = Some(match endian {
                    Endian::Little => (value & 0xFFFF) as u16,
                    Endian::Big => (value >> 16) as u16,
                });
            }
            _ => {}
        }
    }

    let (Some(x), Some(y)) = (x, y) else {
        return Ok(None);
    };
    let scale = if unit == Some(UNIT_CENTIMETER) { 2.54 } else { 1.0 };
    Ok(Some(((x * scale).round() as u32, (y * scale).round() as u32)))
}

/// Dereference an unsigned RATIONAL stored at `offset`.
fn rational(tiff: &[u8], endian: Endian, offset: u32) -> Option<f64> {
    let mut c = ByteCursor::new(tiff, endian);
    c.seek(offset as usize).ok()?;
    let numerator = c.read_u32().ok()?;
    let denominator = c.read_u32().ok()?;
    (denominator != 0).then(|| f64::from(numerator) / f64::from(denominator))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Little- or big-endian TIFF with X/Y resolution rationals and a unit.
    pub(crate) fn tiff_with_resolution(big_endian: bool, dpi: u32, unit: u16) -> Vec<u8> {
        let u16b = |v: u16| if big_endian { v.to_be_bytes() } else { v.to_le_bytes() };
        let u32b = |v: u32| if big_endian { v.to_be_bytes() } else { v.to_le_bytes() };
        let mut t = Vec::new();
        t.extend_from_slice(if big_endian { b"MM" } else { b"II" });
        t.extend_from_slice(&u16b(42));
        t.extend_from_slice(&u32b(8));
        // IFD0 with three entries, rationals after the next-IFD pointer.
        t.extend_from_slice(&u16b(3));
        let rationals = 8 + 2 + 3 * 12 + 4;
        for (tag, offset) in [(TAG_X_RESOLUTION, rationals), (TAG_Y_RESOLUTION, rationals + 8)] {
            t.extend_from_slice(&u16b(tag));
            t.extend_from_slice(&u16b(TYPE_RATIONAL));
            t.extend_from_slice(&u32b(1));
            t.extend_from_slice(&u32b(offset));
        }
        t.extend_from_slice(&u16b(TAG_RESOLUTION_UNIT));
        t.extend_from_slice(&u16b(TYPE_SHORT));
        t.extend_from_slice(&u32b(1));
        t.extend_from_slice(&u16b(unit));
        t.extend_from_slice(&[0, 0]);
        t.extend_from_slice(&u32b(0));
        for _ in 0..2 {
            t.extend_from_slice(&u32b(dpi));
            t.extend_from_slice(&u32b(1));
        }
        t
    }

    #[test]
    fn little_endian_inches() {
        let tiff = tiff_with_resolution(false, 300, 2);
        assert_eq!(resolution(&tiff).unwrap(), Some((300, 300)));
    }

    #[test]
    fn big_endian_centimeters() {
        let tiff = tiff_with_resolution(true, 118, 3);
        // 118 px/cm * 2.54 = 299.72
        assert_eq!(resolution(&tiff).unwrap(), Some((300, 300)));
    }

    #[test]
    fn truncated_directory_is_not_an_error() {
        let tiff = tiff_with_resolution(false, 72, 2);
        assert_eq!(resolution(&tiff[..20]).unwrap(), None);
    }

    #[test]
    fn zero_denominator_is_ignored() {
        let mut tiff = tiff_with_resolution(false, 72, 2);
        let len = tiff.len();
        tiff[len - 4..].copy_from_slice(&0u32.to_le_bytes());
        assert_eq!(resolution(&tiff).unwrap(), None);
    }

    #[test]
    fn bad_byte_order() {
        assert!(resolution(b"XX\x2a\x00").is_err());
        assert!(resolution(b"I").is_err());
    }
}
