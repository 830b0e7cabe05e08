#![no_main]
use libfuzzer_sys::fuzz_target;
use zenprobe::*;

fuzz_target!(|data: &[u8]| {
    // Dispatcher with fallback: never panics, always deterministic
    let first = parse(data);
    assert_eq!(first, parse(data), "parse is not deterministic");

    // Each decoder on its own: never panics
    let direct = [
        decode_jpeg(data),
        decode_png(data),
        decode_gif(data),
        decode_webp(data),
        decode_avif(data),
        decode_bmp(data),
        decode_ico(data),
        decode_svg(data),
    ];

    if let Some(info) = &first {
        assert!(info.width > 0 && info.height > 0);
        assert_eq!(info.mime_type, info.format.mime_type());
    }

    // A successful detected decoder is what parse returns
    if let Some(format) = detect(data) {
        if let Some(info) = format.decode(data) {
            assert_eq!(first.as_ref(), Some(&info));
        }
    } else {
        assert_eq!(first, direct.into_iter().flatten().next());
    }
});
