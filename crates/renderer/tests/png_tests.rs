//! Tests for PNG encoding and canvas assembly.
//!
//! Encoded files are checked by walking their chunks, verifying CRCs and
//! inflating the IDAT stream.

use std::io::Read;

use flate2::read::ZlibDecoder;
use renderer::png::{create_png, create_png_indexed};
use renderer::{encode_png, Canvas, PanelLayout, RgbaImage};

// ============================================================================
// Helper functions
// ============================================================================

/// (type, data) for every chunk after the signature, CRCs checked.
fn chunks(png: &[u8]) -> Vec<([u8; 4], Vec<u8>)> {
    assert_eq!(&png[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    let mut out = Vec::new();
    let mut pos = 8;
    while pos < png.len() {
        let len = u32::from_be_bytes(png[pos..pos + 4].try_into().unwrap()) as usize;
        let kind: [u8; 4] = png[pos + 4..pos + 8].try_into().unwrap();
        let data = png[pos + 8..pos + 8 + len].to_vec();
        let crc = u32::from_be_bytes(png[pos + 8 + len..pos + 12 + len].try_into().unwrap());

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&kind);
        hasher.update(&data);
        assert_eq!(hasher.finalize(), crc, "bad CRC in {:?}", kind);

        out.push((kind, data));
        pos += 12 + len;
    }
    out
}

fn chunk<'a>(chunks: &'a [([u8; 4], Vec<u8>)], kind: &[u8; 4]) -> Option<&'a Vec<u8>> {
    chunks.iter().find(|(k, _)| k == kind).map(|(_, d)| d)
}

fn inflate(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    ZlibDecoder::new(data).read_to_end(&mut out).unwrap();
    out
}

// ============================================================================
// Encoding
// ============================================================================

#[test]
fn test_rgba_scanlines() {
    let pixels = [1, 2, 3, 4, 5, 6, 7, 8];
    let png = create_png(&pixels, 1, 2).unwrap();
    let chunks = chunks(&png);

    let ihdr = chunk(&chunks, b"IHDR").unwrap();
    assert_eq!(&ihdr[0..8], &[0, 0, 0, 1, 0, 0, 0, 2]);
    assert_eq!(ihdr[9], 6);

    let raw = inflate(chunk(&chunks, b"IDAT").unwrap());
    assert_eq!(raw, vec![0, 1, 2, 3, 4, 0, 5, 6, 7, 8]);
    assert_eq!(chunks.last().unwrap().0, *b"IEND");
}

#[test]
fn test_indexed_with_transparency() {
    let image = RgbaImage::filled(3, 2, [0, 0, 0, 0]);
    let png = encode_png(&image).unwrap();
    let chunks = chunks(&png);

    assert_eq!(chunk(&chunks, b"IHDR").unwrap()[9], 3);
    assert_eq!(chunk(&chunks, b"PLTE").unwrap(), &vec![0, 0, 0]);
    assert_eq!(chunk(&chunks, b"tRNS").unwrap(), &vec![0]);
    assert_eq!(
        inflate(chunk(&chunks, b"IDAT").unwrap()),
        vec![0, 0, 0, 0, 0, 0, 0, 0]
    );
}

#[test]
fn test_opaque_palette_has_no_trns() {
    let image = RgbaImage::filled(2, 2, [10, 20, 30, 255]);
    let chunks = chunks(&encode_png(&image).unwrap());
    assert!(chunk(&chunks, b"tRNS").is_none());
}

#[test]
fn test_many_colors_fall_back_to_rgba() {
    let pixels: Vec<u8> = (0..300u32)
        .flat_map(|i| [(i % 256) as u8, (i / 256) as u8, 7, 255])
        .collect();
    let png = create_png(&pixels, 300, 1).unwrap();
    assert_eq!(chunk(&chunks(&png), b"IHDR").unwrap()[9], 6);
}

#[test]
fn test_size_mismatch_rejected() {
    assert!(create_png(&[0; 12], 2, 2).is_err());
    assert!(create_png_indexed(2, 2, &[[0, 0, 0, 255]], &[0; 3]).is_err());
    assert!(create_png(&[], 0, 0).is_err());
}

// ============================================================================
// Canvas
// ============================================================================

#[test]
fn test_canvas_panels_land_in_slots() {
    let layout = PanelLayout {
        rows: 2,
        columns: 2,
        panel_width: 2,
        panel_height: 2,
        gap: 1,
    };
    let mut canvas = Canvas::new(layout, [255, 255, 255, 255]).unwrap();
    canvas
        .draw_panel(3, &RgbaImage::filled(2, 2, [255, 0, 0, 255]))
        .unwrap();

    let image = canvas.image();
    assert_eq!((image.width(), image.height()), (7, 7));
    assert_eq!(image.pixel(4, 4), Some([255, 0, 0, 255]));
    assert_eq!(image.pixel(5, 5), Some([255, 0, 0, 255]));
    assert_eq!(image.pixel(1, 1), Some([255, 255, 255, 255]));
    assert_eq!(image.pixel(3, 3), Some([255, 255, 255, 255]));
}

#[test]
fn test_transparent_panel_keeps_background() {
    let mut canvas = Canvas::new(PanelLayout::two_by_two(4, 3), [200, 200, 200, 255]).unwrap();
    canvas.draw_panel(0, &RgbaImage::transparent(4, 3)).unwrap();
    assert!(canvas
        .image()
        .pixels()
        .chunks_exact(4)
        .all(|p| p == [200, 200, 200, 255]));
}

#[test]
fn test_canvas_rejects_bad_panel() {
    let mut canvas = Canvas::new(PanelLayout::two_by_two(4, 3), [0, 0, 0, 255]).unwrap();
    assert!(canvas.draw_panel(4, &RgbaImage::transparent(4, 3)).is_err());
    assert!(canvas.draw_panel(0, &RgbaImage::transparent(3, 3)).is_err());
}

#[test]
fn test_empty_layout_rejected() {
    let layout = PanelLayout {
        rows: 0,
        columns: 2,
        panel_width: 1,
        panel_height: 1,
        gap: 0,
    };
    assert!(Canvas::new(layout, [0, 0, 0, 0]).is_err());
}

#[test]
fn test_canvas_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("compare.png");
    let canvas = Canvas::new(PanelLayout::two_by_two(8, 8), [255, 255, 255, 255]).unwrap();
    canvas.save(&path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let chunks = chunks(&bytes);
    assert_eq!(&chunk(&chunks, b"IHDR").unwrap()[0..8], &[0, 0, 0, 40, 0, 0, 0, 40]);
}
