//! ICO: icon directory. Reports the largest image the file bundles.

use crate::cursor::ByteCursor;
use crate::error::ProbeError;
use crate::info::{ImageFormat, ImageInfo};

const ENTRY_LEN: usize = 16;
const TYPE_ICON: u16 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Entry {
    width: u32,
    height: u32,
    bit_count: u16,
}

impl Entry {
    /// Ordering key: width, then height, then bit count.
    fn rank(&self) -> (u32, u32, u16) {
        (self.width, self.height, self.bit_count)
    }
}

pub(crate) fn parse(data: &[u8]) -> Result<ImageInfo, ProbeError> {
    let mut c = ByteCursor::little_endian(data);
    let reserved = c.read_u16()?;
    let kind = c.read_u16()?;
    if reserved != 0 || kind != TYPE_ICON {
        return Err(ProbeError::UnrecognizedFormat);
    }
    let count = usize::from(c.read_u16()?);
    if count == 0 {
        return Err(ProbeError::InvalidHeader("ICO directory is empty".into()));
    }
    if !c.can_read(count * ENTRY_LEN) {
        return Err(ProbeError::UnexpectedEof);
    }

    let mut best: Option<Entry> = None;
    for _ in 0..count {
        let entry = read_entry(&mut c)?;
        if entry.width == 0 || entry.height == 0 {
            continue;
        }
        if best.is_none_or(|b| entry.rank() > b.rank()) {
            best = Some(entry);
        }
    }

    let best = best.ok_or(ProbeError::MissingDimensions("ICO without a usable entry"))?;
    let mut info = ImageInfo::new(ImageFormat::Ico, best.width.into(), best.height.into())?;
    info.bit_depth = u8::try_from(best.bit_count).ok().filter(|&b| b > 0);
    Ok(info)
}

fn read_entry(c: &mut ByteCursor<'_>) -> Result<Entry, ProbeError> {
    // A stored 0 means 256.
    let size = |b: u8| if b == 0 { 256 } else { u32::from(b) };
    let width = size(c.read_u8()?);
    let height = size(c.read_u8()?);
    c.skip(2); // color count, reserved
    c.skip(2); // planes
    let bit_count = c.read_u16()?;
    c.skip(8); // resource size, image offset
    Ok(Entry {
        width,
        height,
        bit_count,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// `(width, height, bit_count)` per entry; pass 0 for 256.
    pub(crate) fn ico(entries: &[(u8, u8, u16)]) -> Vec<u8> {
        let mut d = vec![0, 0, 1, 0];
        d.extend_from_slice(&(entries.len() as u16).to_le_bytes());
        for &(w, h, bpp) in entries {
            d.extend_from_slice(&[w, h, 0, 0]);
            d.extend_from_slice(&1u16.to_le_bytes());
            d.extend_from_slice(&bpp.to_le_bytes());
            d.extend_from_slice(&[0; 8]);
        }
        d
    }

    #[test]
    fn picks_largest_then_deepest() {
        let info = parse(&ico(&[(16, 16, 32), (32, 32, 8), (32, 32, 32)])).unwrap();
        assert_eq!((info.width, info.height), (32, 32));
        assert_eq!(info.bit_depth, Some(32));
        assert_eq!(info.mime_type, "image/vnd.microsoft.icon");
    }

    #[test]
    fn height_breaks_width_ties() {
        let info = parse(&ico(&[(48, 16, 32), (48, 48, 4), (16, 16, 32)])).unwrap();
        assert_eq!((info.width, info.height), (48, 48));
        assert_eq!(info.bit_depth, Some(4));
    }

    #[test]
    fn zero_means_256() {
        let info = parse(&ico(&[(32, 32, 32), (0, 0, 32)])).unwrap();
        assert_eq!((info.width, info.height), (256, 256));
    }

    #[test]
    fn rejects() {
        assert!(parse(&ico(&[])).is_err());
        let mut cursor_type = ico(&[(16, 16, 32)]);
        cursor_type[2] = 2;
        assert!(parse(&cursor_type).is_err());
        let mut reserved = ico(&[(16, 16, 32)]);
        reserved[0] = 1;
        assert!(parse(&reserved).is_err());
        // Second declared entry is missing.
        let mut short = ico(&[(16, 16, 32)]);
        short[4] = 2;
        assert!(parse(&short).is_err());
        assert!(parse(&[0, 0, 1]).is_err());
    }
}
