//! AVIF: ISO-BMFF box walk `ftyp` → `meta` → `iprp` → `ipco`.
//!
//! Inside `ipco` the item properties `ispe` (size), `colr` (color) and `pixi`
//! (bit depth) are read. Item associations are not resolved: the first
//! property of each kind applies to the image.

use crate::color::{ColorSpace, color_space_from_signature, color_space_from_text};
use crate::cursor::ByteCursor;
use crate::error::ProbeError;
use crate::icc::{EMBEDDED_PROFILE_LABEL, profile_description};
use crate::info::{ImageFormat, ImageInfo};

pub(crate) const BRANDS: [&[u8; 4]; 2] = [b"avif", b"avis"];

/// Walks sibling boxes, yielding each type with its content clamped to the buffer.
struct Boxes<'a> {
    c: ByteCursor<'a>,
}

impl<'a> Boxes<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            c: ByteCursor::big_endian(data),
        }
    }
}

impl<'a> Iterator for Boxes<'a> {
    type Item = ([u8; 4], &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.c.position();
        let size = self.c.read_u32().ok()?;
        let kind = self.c.read_array::<4>().ok()?;
        let (header_len, size) = match size {
            // 64-bit size; only the low word is kept.
            1 => {
                self.c.skip(4);
                (16, self.c.read_u32().ok()? as usize)
            }
            0 => (8, self.c.len() - start),
            n => (8, n as usize),
        };
        if size < header_len {
            tracing::trace!(size, "ISO-BMFF box smaller than its header");
            return None;
        }
        let end = start.saturating_add(size).min(self.c.len());
        let content = self.c.data().get(start + header_len..end)?;
        self.c.skip(end - self.c.position());
        Some((kind, content))
    }
}

fn find_box<'a>(data: &'a [u8], kind: &[u8; 4]) -> Option<&'a [u8]> {
    Boxes::new(data).find(|(k, _)| k == kind).map(|(_, content)| content)
}

#[derive(Default)]
struct Properties {
    width: Option<u32>,
    height: Option<u32>,
    color_space: Option<ColorSpace>,
    icc_profile: Option<String>,
    bit_depth: Option<u8>,
    channels: Option<u8>,
    color_primaries: Option<u16>,
    transfer_characteristics: Option<u16>,
}

pub(crate) fn parse(data: &[u8]) -> Result<ImageInfo, ProbeError> {
    let mut branded = false;
    let mut props = Properties::default();

    for (kind, content) in Boxes::new(data) {
        match &kind {
            b"ftyp" => branded = is_avif_brand(content),
            b"meta" if branded => {
                if let Some(ipco) = content
                    .get(4..)
                    .and_then(|meta| find_box(meta, b"iprp"))
                    .and_then(|iprp| find_box(iprp, b"ipco"))
                {
                    item_properties(ipco, &mut props);
                }
            }
            _ => {}
        }
        if props.width.is_some() && props.height.is_some() {
            break;
        }
    }

    if !branded {
        return Err(ProbeError::UnrecognizedFormat);
    }
    let (Some(width), Some(height)) = (props.width, props.height) else {
        return Err(ProbeError::MissingDimensions("AVIF without ispe"));
    };
    let mut info = ImageInfo::new(ImageFormat::Avif, width.into(), height.into())?;
    info.color_space = props.color_space;
    info.icc_profile = props.icc_profile;
    info.bit_depth = props.bit_depth;
    info.channels = props.channels;
    info.color_primaries = props.color_primaries;
    info.transfer_characteristics = props.transfer_characteristics;
    Ok(info)
}

/// Major brand, or any compatible brand after the minor version.
fn is_avif_brand(ftyp: &[u8]) -> bool {
    let major = ftyp.get(..4);
    let compatible = ftyp.get(8..).unwrap_or_default().chunks_exact(4);
    major
        .into_iter()
        .chain(compatible)
        .any(|brand| BRANDS.iter().any(|b| brand == *b))
}

fn item_properties(ipco: &[u8], props: &mut Properties) {
    for (kind, content) in Boxes::new(ipco) {
        let result = match &kind {
            b"ispe" if props.width.is_none() => ispe(content, props),
            b"colr" => colr(content, props),
            b"pixi" if props.bit_depth.is_none() => pixi(content, props),
            _ => Ok(()),
        };
        if let Err(e) = result {
            tracing::trace!(
                property = %String::from_utf8_lossy(&kind),
                error = %e,
                "skipping unreadable AVIF item property"
            );
        }
    }
}

fn ispe(content: &[u8], props: &mut Properties) -> Result<(), ProbeError> {
    let mut c = ByteCursor::big_endian(content);
    c.skip(4); // version, flags
    let width = c.read_u32()?;
    let height = c.read_u32()?;
    props.width = Some(width);
    props.height = Some(height);
    Ok(())
}

fn colr(content: &[u8], props: &mut Properties) -> Result<(), ProbeError> {
    let mut c = ByteCursor::big_endian(content);
    match &c.read_array::<4>()? {
        b"prof" | b"rICC" => {
            let profile = c.read_bytes(c.remaining())?;
            let name = profile_description(profile);
            let color_space = name
                .as_deref()
                .and_then(|n| color_space_from_text(n.as_bytes()))
                .or_else(|| color_space_from_text(profile))
                .or_else(|| profile.get(16..20).and_then(color_space_from_signature))
                .unwrap_or(ColorSpace::IccProfile);
            if props.icc_profile.is_none() {
                props.icc_profile = Some(name.unwrap_or_else(|| EMBEDDED_PROFILE_LABEL.to_owned()));
            }
            props.color_space = props.color_space.or(Some(color_space));
        }
        b"nclx" => {
            let primaries = c.read_u16()?;
            let transfer = c.read_u16()?;
            c.skip(2 + 1); // matrix coefficients, full range flag
            props.color_primaries = props.color_primaries.or(Some(primaries));
            props.transfer_characteristics = props.transfer_characteristics.or(Some(transfer));
            if props.color_space.is_none() {
                props.color_space = match primaries {
                    1 => Some(ColorSpace::Srgb),
                    9 => Some(ColorSpace::Rec2020),
                    11 => Some(ColorSpace::DciP3),
                    12 => Some(ColorSpace::DisplayP3),
                    _ => None,
                };
            }
        }
        _ => {}
    }
    Ok(())
}

fn pixi(content: &[u8], props: &mut Properties) -> Result<(), ProbeError> {
    let mut c = ByteCursor::big_endian(content);
    c.skip(4); // version, flags
    let channels = c.read_u8()?;
    let depths = c.read_bytes(usize::from(channels))?;
    props.channels = Some(channels);
    props.bit_depth = depths.first().copied();
    Ok(())
}
