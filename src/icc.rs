//! Best-effort ICC profile naming.
//!
//! This is a sniffer, not an ICC parser: profiles are often cut short by the
//! probe budget, so every step tolerates missing bytes and falls through to
//! the next, cruder one.

use memchr::memmem;

use crate::cursor::{ByteCursor, TextEncoding};

/// Size of the fixed ICC header that precedes the tag table.
const ICC_HEADER_LEN: usize = 128;

/// Profile names recognized verbatim when no `desc` tag can be read.
const NAMED_PROFILES: [&str; 6] = [
    "Adobe RGB (1998)",
    "sRGB IEC61966-2.1",
    "Display P3",
    "ProPhoto RGB",
    "Rec. 2020",
    "DCI-P3",
];

/// Shortest printable run accepted by the last-resort scan.
const MIN_PRINTABLE_RUN: usize = 5;

/// Label used when a profile is present but nothing in it names it.
pub(crate) const EMBEDDED_PROFILE_LABEL: &str = "Embedded ICC Profile";

/// Extract a human-readable profile name from raw (possibly partial) ICC bytes.
///
/// Tries, in order: the `desc` tag reached through its tag-table entry, a
/// list of well-known profile names, then the first printable ASCII run that
/// is not boilerplate.
pub fn profile_description(icc: &[u8]) -> Option<String> {
    description_tag(icc)
        .or_else(|| named_profile(icc).map(str::to_owned))
        .or_else(|| printable_run(icc))
}

fn description_tag(icc: &[u8]) -> Option<String> {
    memmem::find_iter(icc, b"desc").find_map(|pos| {
        let mut entry = ByteCursor::big_endian(icc);
        entry.seek(pos + 4).ok()?;
        let offset = entry.read_u32().ok()? as usize;
        let size = entry.read_u32().ok()? as usize;
        let tag = icc.get(offset..offset.checked_add(size)?)?;
        text_tag(tag)
    })
}

/// Decode a `desc`, `mluc` or `text` tag payload.
fn text_tag(tag: &[u8]) -> Option<String> {
    let mut c = ByteCursor::big_endian(tag);
    let kind = c.read_array::<4>().ok()?;
    c.skip(4);
    let text = match &kind {
        b"desc" => {
            let count = c.read_u32().ok()? as usize;
            let len = count.min(c.remaining());
            c.read_fixed_string(len, TextEncoding::Latin1).ok()?
        }
        b"text" => c.read_null_terminated_string(None, TextEncoding::Latin1),
        b"mluc" => {
            let records = c.read_u32().ok()?;
            let _record_size = c.read_u32().ok()?;
            if records == 0 {
                return None;
            }
            c.skip(4); // language + country
            let len = c.read_u32().ok()? as usize;
            let offset = c.read_u32().ok()? as usize;
            let raw = tag.get(offset..offset.checked_add(len)?)?;
            let units: Vec<u16> = raw
                .chunks_exact(2)
                .map(|p| u16::from_be_bytes([p[0], p[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => return None,
    };
    let text = text.trim_end_matches('\0').trim();
    (!text.is_empty()).then(|| text.to_owned())
}

fn named_profile(icc: &[u8]) -> Option<&'static str> {
    NAMED_PROFILES
        .into_iter()
        .find(|name| memmem::find(icc, name.as_bytes()).is_some())
}

fn printable_run(icc: &[u8]) -> Option<String> {
    let body = if icc.len() > ICC_HEADER_LEN {
        &icc[ICC_HEADER_LEN..]
    } else {
        icc
    };
    body.split(|b| !(0x20..=0x7E).contains(b))
        .filter(|run| run.len() >= MIN_PRINTABLE_RUN)
        .filter(|run| {
            memmem::find(run, b"text").is_none() && memmem::find(run, b"Copyright").is_none()
        })
        .map(|run| String::from_utf8_lossy(run).trim().to_owned())
        .find(|s| !s.is_empty())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal v2 profile: header, one-entry tag table, `desc` tag.
    pub(crate) fn icc_with_desc(name: &str, color_space: &[u8; 4]) -> Vec<u8> {
        let mut icc = vec![0u8; ICC_HEADER_LEN];
        icc[16..20].copy_from_slice(color_space);
        icc[36..40].copy_from_slice(b"acsp");
        icc.extend_from_slice(&1u32.to_be_bytes());
        let tag_offset = (ICC_HEADER_LEN + 4 + 12) as u32;
        let mut tag = Vec::new();
        tag.extend_from_slice(b"desc");
        tag.extend_from_slice(&[0; 4]);
        tag.extend_from_slice(&(name.len() as u32 + 1).to_be_bytes());
        tag.extend_from_slice(name.as_bytes());
        tag.push(0);
        icc.extend_from_slice(b"desc");
        icc.extend_from_slice(&tag_offset.to_be_bytes());
        icc.extend_from_slice(&(tag.len() as u32).to_be_bytes());
        icc.extend_from_slice(&tag);
        let len = icc.len() as u32;
        icc[0..4].copy_from_slice(&len.to_be_bytes());
        icc
    }

    #[test]
    fn reads_desc_tag() {
        let icc = icc_with_desc("Custom Studio Profile", b"RGB ");
        assert_eq!(profile_description(&icc).as_deref(), Some("Custom Studio Profile"));
    }

    #[test]
    fn reads_mluc_tag() {
        let mut icc = vec![0u8; ICC_HEADER_LEN];
        icc.extend_from_slice(&1u32.to_be_bytes());
        let tag_offset = (ICC_HEADER_LEN + 4 + 12) as u32;
        let text: Vec<u8> = "Display P3"
            .encode_utf16()
            .flat_map(|u| u.to_be_bytes())
            .collect();
        let mut tag = Vec::new();
        tag.extend_from_slice(b"mluc");
        tag.extend_from_slice(&[0; 4]);
        tag.extend_from_slice(&1u32.to_be_bytes());
        tag.extend_from_slice(&12u32.to_be_bytes());
        tag.extend_from_slice(b"enUS");
        tag.extend_from_slice(&(text.len() as u32).to_be_bytes());
        tag.extend_from_slice(&28u32.to_be_bytes());
        tag.extend_from_slice(&text);
        icc.extend_from_slice(b"desc");
        icc.extend_from_slice(&tag_offset.to_be_bytes());
        icc.extend_from_slice(&(tag.len() as u32).to_be_bytes());
        icc.extend_from_slice(&tag);
        assert_eq!(profile_description(&icc).as_deref(), Some("Display P3"));
    }

    #[test]
    fn falls_back_to_named_profile() {
        // Tag table entry points past the end of a truncated profile.
        let mut icc = vec![0u8; ICC_HEADER_LEN];
        icc.extend_from_slice(b"desc\x00\x00\xff\x00\x00\x00\x00\x80");
        icc.extend_from_slice(b"\x00\x00ProPhoto RGB\x00");
        assert_eq!(profile_description(&icc).as_deref(), Some("ProPhoto RGB"));
    }

    #[test]
    fn falls_back_to_printable_run() {
        let mut icc = vec![0u8; ICC_HEADER_LEN];
        icc.extend_from_slice(b"\x00text Copyright 2020\x00ab\x00Studio Neutral\x00");
        assert_eq!(profile_description(&icc).as_deref(), Some("Studio Neutral"));
    }

    #[test]
    fn nothing_readable() {
        assert_eq!(profile_description(&[0u8; 200]), None);
        assert_eq!(profile_description(&[]), None);
    }
}
