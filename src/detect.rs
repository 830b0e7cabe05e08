//! Format detection from leading bytes.
//!
//! [`detect`] walks a fixed signature table; the first matching predicate
//! wins. Nothing here parses structure beyond fixed offsets.

use memchr::memmem;

use crate::info::ImageFormat;
use crate::{avif, gif, png};

/// Last byte offset (exclusive) scanned for an AVIF brand.
const AVIF_BRAND_SCAN_END: usize = 100;
/// Prefix length searched for an SVG root element.
const SVG_SNIFF_LEN: usize = 1024;

type Predicate = fn(&[u8]) -> bool;

/// Signature table in match order.
///
/// AVIF precedes ICO: an `ftyp` box of size 256 begins with `00 00 01 00`,
/// which is also the ICO magic.
const SIGNATURES: [(ImageFormat, Predicate); 8] = [
    (ImageFormat::Jpeg, is_jpeg),
    (ImageFormat::Png, is_png),
    (ImageFormat::Gif, is_gif),
    (ImageFormat::WebP, is_webp),
    (ImageFormat::Avif, is_avif),
    (ImageFormat::Bmp, is_bmp),
    (ImageFormat::Ico, is_ico),
    (ImageFormat::Svg, is_svg),
];

fn is_jpeg(data: &[u8]) -> bool {
    data.starts_with(&[0xFF, 0xD8])
}

fn is_png(data: &[u8]) -> bool {
    data.starts_with(&png::SIGNATURE)
}

fn is_gif(data: &[u8]) -> bool {
    gif::SIGNATURES.iter().any(|sig| data.starts_with(*sig))
}

fn is_webp(data: &[u8]) -> bool {
    data.starts_with(b"RIFF") && data.get(8..12) == Some(&b"WEBP"[..])
}

fn is_bmp(data: &[u8]) -> bool {
    data.starts_with(b"BM")
}

fn is_ico(data: &[u8]) -> bool {
    data.starts_with(&[0, 0, 1, 0])
}

fn is_avif(data: &[u8]) -> bool {
    if data.get(4..8) != Some(&b"ftyp"[..]) {
        return false;
    }
    let brands = &data[8.min(data.len())..AVIF_BRAND_SCAN_END.min(data.len())];
    avif::BRANDS
        .iter()
        .any(|brand| memmem::find(brands, *brand).is_some())
}

fn is_svg(data: &[u8]) -> bool {
    let head = &data[..SVG_SNIFF_LEN.min(data.len())];
    memmem::find(head, b"<svg").is_some() || memmem::find(head, b"<!DOCTYPE svg").is_some()
}

/// Identify the format whose signature `data` starts with.
///
/// Detection is a hint: [`crate::parse`] still tries every decoder when the
/// detected one fails.
pub fn detect(data: &[u8]) -> Option<ImageFormat> {
    SIGNATURES
        .iter()
        .find(|(_, matches)| matches(data))
        .map(|&(format, _)| format)
}

/// Format tag (`"png"`, `"jpg"`, ...) for `data`, without parsing it.
pub fn classify(data: &[u8]) -> Option<&'static str> {
    detect(data).map(|format| format.tag())
}

/// Cheap one- or two-byte check for "could this be an image at all".
///
/// May be true for inputs no decoder will accept (a lone `0x00` could still
/// become ICO or AVIF). Only a leading ASCII control character other than
/// whitespace or NUL is rejected, so the one accepted input it can miss is
/// SVG markup buried behind binary control bytes.
pub fn quick_sniff(data: &[u8]) -> bool {
    match *data {
        [] => false,
        // ICO magic, or the high byte of an ISO-BMFF box size.
        [0x00, ..] => true,
        // JPEG and PNG signatures, UTF-8 lead bytes and the BOM.
        [0x80..=0xFF, ..] => true,
        // GIF, RIFF, BM and markup all start with printable ASCII.
        [b, ..] => b.is_ascii_graphic() || b.is_ascii_whitespace(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_order_matches_dispatch_order() {
        let order: Vec<_> = SIGNATURES.iter().map(|(f, _)| *f).collect();
        assert_eq!(order, ImageFormat::ALL);
    }

    #[test]
    fn signatures() {
        assert_eq!(detect(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(detect(&png::SIGNATURE), Some(ImageFormat::Png));
        assert_eq!(detect(b"GIF87a"), Some(ImageFormat::Gif));
        assert_eq!(detect(b"RIFF\x24\0\0\0WEBPVP8 "), Some(ImageFormat::WebP));
        assert_eq!(detect(b"\0\0\0\x1cftypmif1\0\0\0\0mif1avif"), Some(ImageFormat::Avif));
        assert_eq!(detect(b"BM\x36\0\0\0"), Some(ImageFormat::Bmp));
        assert_eq!(detect(&[0, 0, 1, 0, 1, 0]), Some(ImageFormat::Ico));
        assert_eq!(detect(b"<?xml version=\"1.0\"?><svg>"), Some(ImageFormat::Svg));
        assert_eq!(
            detect(b"<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\">"),
            Some(ImageFormat::Svg)
        );
    }

    #[test]
    fn near_misses() {
        assert_eq!(detect(b"RIFF\x24\0\0\0WAVE"), None);
        assert_eq!(detect(b"\0\0\0\x18ftypheic\0\0\0\0mif1heic"), None);
        assert_eq!(detect(b"GIF90a"), None);
        assert_eq!(detect(&[0x89, b'P', b'N']), None);
        assert_eq!(detect(&[0, 0, 2, 0]), None);
        assert_eq!(detect(b""), None);
    }

    #[test]
    fn avif_box_of_size_256_is_not_ico() {
        let mut data = vec![0, 0, 1, 0];
        data.extend_from_slice(b"ftypavif");
        assert_eq!(detect(&data), Some(ImageFormat::Avif));
    }

    #[test]
    fn avif_brand_past_scan_window() {
        let mut data = b"\0\0\0\x80ftypmif1".to_vec();
        data.resize(AVIF_BRAND_SCAN_END, b' ');
        data.extend_from_slice(b"avif");
        assert_eq!(detect(&data), None);
    }

    #[test]
    fn svg_past_sniff_window() {
        let mut data = vec![b' '; SVG_SNIFF_LEN];
        data.extend_from_slice(b"<svg>");
        assert_eq!(detect(&data), None);
    }

    #[test]
    fn classify_tags() {
        assert_eq!(classify(&[0xFF, 0xD8]), Some("jpg"));
        assert_eq!(classify(b"BM"), Some("bmp"));
        assert_eq!(classify(b"hello"), None);
    }

    #[test]
    fn quick_sniff_is_permissive() {
        assert!(quick_sniff(&[0xFF, 0xD8]));
        assert!(quick_sniff(&[0x89, b'P']));
        assert!(quick_sniff(&[0, 0]));
        assert!(quick_sniff(&[0]));
        assert!(quick_sniff(&[0xFF]));
        assert!(quick_sniff(&[0xEF, 0xBB, 0xBF]));
        assert!(quick_sniff(b"GI"));
        assert!(quick_sniff(b"RI"));
        assert!(quick_sniff(b"BM"));
        assert!(quick_sniff(b"<s"));
        assert!(quick_sniff(b"\n<"));
        assert!(!quick_sniff(b""));
        assert!(!quick_sniff(&[0x01, b'<']));
        assert!(!quick_sniff(&[0x7F]));
    }

    #[test]
    fn quick_sniff_accepts_large_boxes_and_utf8_text() {
        // ftyp box of 65 KiB: size bytes 00 01 01 00.
        assert!(quick_sniff(&[0x00, 0x01]));
        let svg = "é<svg width=\"4\" height=\"2\">".as_bytes();
        assert_eq!(detect(svg), Some(ImageFormat::Svg));
        assert!(quick_sniff(&svg[..1]));
        assert!(quick_sniff(&svg[..2]));
        assert!(quick_sniff("日本<svg>".as_bytes()));
    }

    #[test]
    fn quick_sniff_accepts_every_detected_prefix() {
        let samples: [&[u8]; 8] = [
            &[0xFF, 0xD8],
            &png::SIGNATURE,
            b"GIF89a",
            b"RIFF\0\0\0\0WEBP",
            b"\0\0\0\x14ftypavif",
            b"BM",
            &[0, 0, 1, 0],
            b"<svg>",
        ];
        for sample in samples {
            assert!(detect(sample).is_some());
            for len in 1..=2.min(sample.len()) {
                assert!(quick_sniff(&sample[..len]), "{sample:?}[..{len}]");
            }
        }
    }
}
