#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn chunk(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut c = (payload.len() as u32).to_be_bytes().to_vec();
    c.extend_from_slice(kind);
    c.extend_from_slice(payload);
    c.extend_from_slice(&[0; 4]); // CRC is never checked
    c
}

fn mp4_box(kind: &[u8; 4], content: &[u8]) -> Vec<u8> {
    let mut b = ((content.len() + 8) as u32).to_be_bytes().to_vec();
    b.extend_from_slice(kind);
    b.extend_from_slice(content);
    b
}

fn main() {
    use std::fs;
    for target in ["fuzz_parse", "fuzz_detect"] {
        let dir = format!("fuzz/corpus/{target}");
        fs::create_dir_all(&dir).unwrap();

        // PNG 320x256 RGBA with pHYs and gAMA
        let mut png = b"\x89PNG\r\n\x1a\n".to_vec();
        png.extend(chunk(b"IHDR", b"\x00\x00\x01\x40\x00\x00\x01\x00\x08\x06\x00\x00\x00"));
        png.extend(chunk(b"pHYs", b"\x00\x00\x0b\x13\x00\x00\x0b\x13\x01"));
        png.extend(chunk(b"gAMA", &45455u32.to_be_bytes()));
        png.extend(chunk(b"IEND", b""));
        fs::write(format!("{dir}/png_320x256.png"), png).unwrap();

        // JPEG: JFIF, Adobe, SOF0 16x8 3 components
        let mut jpeg = b"\xff\xd8".to_vec();
        jpeg.extend_from_slice(b"\xff\xe0\x00\x10JFIF\x00\x01\x02\x01\x00\x48\x00\x48\x00\x00");
        jpeg.extend_from_slice(b"\xff\xee\x00\x0eAdobe\x00\x64\x00\x00\x00\x00\x01");
        jpeg.extend_from_slice(b"\xff\xc0\x00\x11\x08\x00\x08\x00\x10\x03");
        jpeg.extend_from_slice(b"\x01\x11\x00\x02\x11\x01\x03\x11\x01\xff\xd9");
        fs::write(format!("{dir}/jpeg_16x8.jpg"), jpeg).unwrap();

        fs::write(format!("{dir}/gif_1x1.gif"), b"GIF89a\x01\x00\x01\x00\x00\x00\x00").unwrap();

        // WebP lossy 400x300
        let webp = b"RIFF\x16\x00\x00\x00WEBPVP8 \x0a\x00\x00\x00\x30\x01\x00\x9d\x01\x2a\x90\x01\x2c\x01";
        fs::write(format!("{dir}/webp_400x300.webp"), webp).unwrap();

        // AVIF: ftyp + meta/iprp/ipco/ispe
        let ispe = mp4_box(b"ispe", b"\x00\x00\x00\x00\x00\x00\x07\x80\x00\x00\x04\x38");
        let mut meta = vec![0u8; 4];
        meta.extend(mp4_box(b"iprp", &mp4_box(b"ipco", &ispe)));
        let mut avif = mp4_box(b"ftyp", b"avif\x00\x00\x00\x00mif1avif");
        avif.extend(mp4_box(b"meta", &meta));
        fs::write(format!("{dir}/avif_1920x1080.avif"), avif).unwrap();

        // Minimal BMP 1x1 24-bit, 2835 pixels per meter
        let mut bmp = vec![0u8; 58];
        bmp[0] = b'B'; bmp[1] = b'M';
        bmp[2..6].copy_from_slice(&58u32.to_le_bytes()); // file size
        bmp[10..14].copy_from_slice(&54u32.to_le_bytes()); // data offset
        bmp[14..18].copy_from_slice(&40u32.to_le_bytes()); // DIB header size
        bmp[18..22].copy_from_slice(&1i32.to_le_bytes()); // width
        bmp[22..26].copy_from_slice(&1i32.to_le_bytes()); // height
        bmp[26..28].copy_from_slice(&1u16.to_le_bytes()); // planes
        bmp[28..30].copy_from_slice(&24u16.to_le_bytes()); // bpp
        bmp[38..42].copy_from_slice(&2835i32.to_le_bytes()); // x ppm
        bmp[42..46].copy_from_slice(&2835i32.to_le_bytes()); // y ppm
        fs::write(format!("{dir}/bmp_1x1.bmp"), bmp).unwrap();

        // ICO with 16x16 and 32x32 entries
        let mut ico = b"\x00\x00\x01\x00\x02\x00".to_vec();
        ico.extend_from_slice(b"\x10\x10\x00\x00\x01\x00\x20\x00\x00\x00\x00\x00\x26\x00\x00\x00");
        ico.extend_from_slice(b"\x20\x20\x00\x00\x01\x00\x20\x00\x00\x00\x00\x00\x26\x00\x00\x00");
        fs::write(format!("{dir}/ico_2_entries.ico"), ico).unwrap();

        fs::write(
            format!("{dir}/svg_cm.svg"),
            br#"<svg xmlns="http://www.w3.org/2000/svg" width="10cm" height="8cm" viewBox="0 0 100 80"/>"#,
        )
        .unwrap();

        // Truncated/malformed seeds for edge coverage
        fs::write(format!("{dir}/empty.bin"), b"").unwrap();
        fs::write(format!("{dir}/just_soi.bin"), b"\xff\xd8").unwrap();
        fs::write(format!("{dir}/bm_short.bin"), b"BM\x00\x00").unwrap();
        fs::write(format!("{dir}/riff_no_chunks.bin"), b"RIFF\x04\x00\x00\x00WEBP").unwrap();
        fs::write(format!("{dir}/svg_unclosed.bin"), b"<svg width=\"10\"").unwrap();
    }

    println!("Generated seed corpus in fuzz/corpus/");
}
