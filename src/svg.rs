//! SVG: the only text format. Reads `width`, `height` and `viewBox` from the
//! root `<svg>` start tag and converts CSS units to pixels at 96 DPI.

use std::sync::LazyLock;

use memchr::memmem;
use regex::Regex;

use crate::error::ProbeError;
use crate::info::{ImageFormat, ImageInfo};

/// Size used when neither an attribute nor the `viewBox` gives one.
const DEFAULT_WIDTH: f64 = 300.0;
const DEFAULT_HEIGHT: f64 = 150.0;

#[allow(clippy::unwrap_used)]
static START_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<svg(?:\s[^>]*)?/?>").unwrap());

#[allow(clippy::unwrap_used)]
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

#[allow(clippy::unwrap_used)]
static LENGTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?)\s*([A-Za-z%]*)\s*$").unwrap()
});

/// A length attribute split into its number and unit suffix.
#[derive(Clone, Debug, PartialEq)]
struct Length {
    value: f64,
    unit: String,
}

impl Length {
    fn parse(text: &str) -> Option<Self> {
        let caps = LENGTH.captures(text)?;
        let value: f64 = caps[1].parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        let unit = match &caps[2] {
            "" => "px".to_owned(),
            unit => unit.to_owned(),
        };
        Some(Self { value, unit })
    }

    fn pixels(value: f64) -> Self {
        Self {
            value,
            unit: "px".to_owned(),
        }
    }

    /// Value in CSS pixels. Unknown units are taken as pixels.
    fn to_px(&self) -> f64 {
        let factor = match self.unit.as_str() {
            "in" => 96.0,
            "cm" => 37.8,
            "mm" => 3.78,
            "pt" => 1.33,
            "pc" => 16.0,
            "em" | "rem" => 16.0,
            "ex" => 8.0,
            _ => 1.0,
        };
        self.value * factor
    }
}

#[derive(Default)]
struct RootAttributes<'a> {
    width: Option<&'a str>,
    height: Option<&'a str>,
    view_box: Option<&'a str>,
}

pub(crate) fn parse(data: &[u8]) -> Result<ImageInfo, ProbeError> {
    if memmem::find(data, b"<svg").is_none() {
        return Err(ProbeError::UnrecognizedFormat);
    }
    let text = String::from_utf8_lossy(data);
    let tag = START_TAG
        .find(&text)
        .ok_or_else(|| ProbeError::InvalidHeader("unterminated <svg> start tag".into()))?
        .as_str();

    let attrs = root_attributes(tag);
    let view_box = attrs.view_box.and_then(view_box_size);

    let width = attrs
        .width
        .and_then(Length::parse)
        .or_else(|| view_box.map(|(w, _)| Length::pixels(w)))
        .unwrap_or_else(|| Length::pixels(DEFAULT_WIDTH));
    let height = attrs
        .height
        .and_then(Length::parse)
        .or_else(|| view_box.map(|(_, h)| Length::pixels(h)))
        .unwrap_or_else(|| Length::pixels(DEFAULT_HEIGHT));

    let mut info = ImageInfo::new(
        ImageFormat::Svg,
        round(width.to_px()),
        round(height.to_px()),
    )?;
    info.width_units = Some(width.unit);
    info.height_units = Some(height.unit);
    Ok(info)
}

fn root_attributes(tag: &str) -> RootAttributes<'_> {
    let mut attrs = RootAttributes::default();
    for caps in ATTRIBUTE.captures_iter(tag) {
        let Some(value) = caps.get(2).or_else(|| caps.get(3)) else {
            continue;
        };
        let slot = match &caps[1] {
            "width" => &mut attrs.width,
            "height" => &mut attrs.height,
            "viewBox" => &mut attrs.view_box,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value.as_str());
        }
    }
    attrs
}

/// Width and height (third and fourth numbers) of a `viewBox`.
fn view_box_size(value: &str) -> Option<(f64, f64)> {
    let numbers: Vec<f64> = value
        .split(|c: char| c.is_ascii_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    match numbers[..] {
        [_, _, w, h] if w.is_finite() && h.is_finite() => Some((w, h)),
        _ => None,
    }
}

fn round(px: f64) -> i64 {
    // Saturating cast; NaN becomes 0 and is rejected as a dimension.
    px.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(svg: &str) -> ImageInfo {
        parse(svg.as_bytes()).unwrap()
    }

    #[test]
    fn pixel_attributes() {
        let info = probe(r#"<svg xmlns="http://www.w3.org/2000/svg" width="120" height="80px"/>"#);
        assert_eq!((info.width, info.height), (120, 80));
        assert_eq!(info.width_units(), "px");
        assert_eq!(info.height_units(), "px");
        assert_eq!(info.mime_type, "image/svg+xml");
    }

    #[test]
    fn physical_units_keep_their_name() {
        let info = probe(r#"<svg width="10cm" height="8cm">"#);
        assert_eq!((info.width, info.height), (378, 302));
        assert_eq!(info.width_units(), "cm");
        assert_eq!(info.height_units(), "cm");
    }

    #[test]
    fn unit_factors() {
        let cases = [
            ("1in", 96),
            ("10mm", 38),
            ("12pt", 16),
            ("2pc", 32),
            ("2em", 32),
            ("1.5rem", 24),
            ("3ex", 24),
            ("50%", 50),
            ("7furlongs", 7),
            ("1e2", 100),
        ];
        for (width, px) in cases {
            let info = probe(&format!(r#"<svg width="{width}" height="1">"#));
            assert_eq!(info.width, px, "{width}");
        }
    }

    #[test]
    fn view_box_fills_missing_dimensions() {
        let info = probe(r#"<svg viewBox="0 0 640.4 480" width="2in">"#);
        assert_eq!((info.width, info.height), (192, 480));
        assert_eq!(info.width_units(), "in");
        assert_eq!(info.height_units(), "px");

        let info = probe("<svg viewBox='0,0,24,24'>");
        assert_eq!((info.width, info.height), (24, 24));
    }

    #[test]
    fn defaults_to_300_by_150() {
        let info = probe("<?xml version=\"1.0\"?>\n<svg>\n<rect width=\"5\" height=\"5\"/></svg>");
        assert_eq!((info.width, info.height), (300, 150));
        assert_eq!(info.width_units(), "px");
    }

    #[test]
    fn self_closing_root_gets_defaults() {
        let info = probe("<svg/>");
        assert_eq!((info.width, info.height), (300, 150));
        let info = probe(r#"<svg width="12" height="8"/>"#);
        assert_eq!((info.width, info.height), (12, 8));
    }

    #[test]
    fn overflowing_length_falls_back_to_view_box() {
        let info = probe(r#"<svg width="1e400" height="10" viewBox="0 0 50 10">"#);
        assert_eq!((info.width, info.height), (50, 10));
        let info = probe(r#"<svg viewBox="0 0 1e400 10">"#);
        assert_eq!((info.width, info.height), (300, 150));
    }

    #[test]
    fn only_the_root_tag_is_read() {
        let info = probe(r#"<svg viewBox="0 0 10 20"><rect width="999" height="999"/></svg>"#);
        assert_eq!((info.width, info.height), (10, 20));
    }

    #[test]
    fn similar_attribute_names_are_ignored() {
        let info = probe(r#"<svg data-width="5" stroke-width="9" height='40' width="30">"#);
        assert_eq!((info.width, info.height), (30, 40));
    }

    #[test]
    fn unparseable_length_falls_back() {
        let info = probe(r#"<svg width="auto" height="auto" viewBox="0 0 16 9">"#);
        assert_eq!((info.width, info.height), (16, 9));
    }

    #[test]
    fn multiline_start_tag() {
        let info = probe("<svg\n  width=\"64\"\n  height=\"32\"\n>");
        assert_eq!((info.width, info.height), (64, 32));
    }

    #[test]
    fn rejects() {
        assert!(parse(b"<html><body></body></html>").is_err());
        assert!(parse(b"<svg width=\"10\"").is_err());
        assert!(parse(br#"<svg width="0" height="10">"#).is_err());
        assert!(parse(br#"<svg width="-4" height="10">"#).is_err());
        assert!(parse(b"").is_err());
    }
}
