//! # zenprobe
//!
//! Header-only image metadata probe. Reads the first few kilobytes of an image
//! and reports its dimensions plus whatever resolution, color space, ICC
//! profile name, gamma, bit depth and channel count the header carries. No
//! pixel data is decoded and nothing is decompressed.
//!
//! ## Supported Formats
//!
//! - **JPEG**: SOF dimensions; JFIF and EXIF resolution; ICC and Adobe color hints
//! - **PNG**: `IHDR`, `pHYs`, `sRGB`, `iCCP` (name only), `gAMA`
//! - **GIF**: logical screen size
//! - **WebP**: `VP8X` canvas, `VP8 ` and `VP8L` headers, `ICCP` profile name
//! - **AVIF**: `ispe`, `colr` (`nclx` and ICC), `pixi`
//! - **BMP**: core and info headers, pixels-per-meter resolution
//! - **ICO**: the largest entry in the icon directory
//! - **SVG**: `width`/`height`/`viewBox` of the root element, CSS units converted at 96 DPI
//!
//! ## Probe Budget
//!
//! Everything works on an in-memory prefix. [`DEFAULT_PROBE_BYTES`] is enough
//! for almost every file; callers that can re-read their source may retry
//! with each size in [`RETRY_PROBE_BYTES`] when [`parse`] returns `None`.
//!
//! ## Non-Goals
//!
//! - Pixel decoding, animation frames, EXIF beyond resolution
//! - Multi-segment ICC reassembly or ICC profile validation
//! - Fetching input (files, streams, URLs): bring your own bytes
//!
//! ## Usage
//!
//! ```
//! use zenprobe::{ImageFormat, parse};
//!
//! let gif = b"GIF89a\x40\x01\xf0\x00";
//! let info = parse(gif).unwrap();
//! assert_eq!(info.format, ImageFormat::Gif);
//! assert_eq!((info.width, info.height), (320, 240));
//! assert_eq!(info.mime_type, "image/gif");
//!
//! assert_eq!(zenprobe::classify(gif), Some("gif"));
//! assert!(zenprobe::quick_sniff(gif));
//! ```

#![forbid(unsafe_code)]

mod color;
mod cursor;
mod decode;
mod detect;
mod error;
mod icc;
mod info;
mod limits;

mod avif;
mod bmp;
mod gif;
mod ico;
mod jpeg;
mod png;
mod svg;
mod webp;

// Re-exports
pub use color::{ColorSpace, color_space_from_signature, color_space_from_text};
pub use cursor::{ByteCursor, Endian, TextEncoding};
pub use decode::{
    ParseRequest, decode_avif, decode_bmp, decode_gif, decode_ico, decode_jpeg, decode_png,
    decode_svg, decode_webp, parse,
};
pub use detect::{classify, detect, quick_sniff};
pub use error::ProbeError;
pub use icc::profile_description;
pub use info::{ImageFormat, ImageInfo};
pub use limits::{DEFAULT_PROBE_BYTES, Limits, RETRY_PROBE_BYTES};
