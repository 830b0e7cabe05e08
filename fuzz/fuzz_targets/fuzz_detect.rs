#![no_main]
use libfuzzer_sys::fuzz_target;
use zenprobe::ImageFormat;

/// Text that opens with a control character is not sniffed as an image.
fn starts_with_control(data: &[u8]) -> bool {
    data.first()
        .is_some_and(|&b| b != 0 && b.is_ascii_control() && !b.is_ascii_whitespace())
}

fuzz_target!(|data: &[u8]| {
    let detected = zenprobe::detect(data);
    assert_eq!(zenprobe::classify(data), detected.map(|f| f.tag()));

    // quick_sniff never rejects the leading bytes of input a decoder accepts.
    if let Some(info) = zenprobe::parse(data) {
        if !(info.format == ImageFormat::Svg && starts_with_control(data)) {
            for len in 1..=data.len().min(2) {
                assert!(zenprobe::quick_sniff(&data[..len]), "{}", info.format);
            }
        }
    }
});
