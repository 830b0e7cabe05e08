//! GIF: signature plus the Logical Screen Descriptor.

use crate::cursor::ByteCursor;
use crate::error::ProbeError;
use crate::info::{ImageFormat, ImageInfo};

pub(crate) const SIGNATURES: [&[u8; 6]; 2] = [b"GIF87a", b"GIF89a"];

pub(crate) fn parse(data: &[u8]) -> Result<ImageInfo, ProbeError> {
    if !SIGNATURES.iter().any(|sig| data.starts_with(*sig)) {
        return Err(ProbeError::UnrecognizedFormat);
    }
    let mut c = ByteCursor::little_endian(data);
    c.skip(6);
    let width = c.read_u16()?;
    let height = c.read_u16()?;
    ImageInfo::new(ImageFormat::Gif, width.into(), height.into())
}
