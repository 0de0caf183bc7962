//! PNG encoding for RGBA rasters.
//!
//! Supports two encoding modes:
//! - **Indexed PNG (color type 3)**: used when the image has ≤256 unique
//!   colors, which is the common case for palette-mapped panels.
//! - **RGBA PNG (color type 6)**: fallback for images with more colors.

use std::collections::HashMap;
use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{RenderError, Result};
use crate::gradient::RgbaImage;

/// Maximum colors for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Encode an image, choosing indexed color when it fits.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    match extract_palette(image.pixels()) {
        Some((palette, indices)) => {
            create_png_indexed(image.width(), image.height(), &palette, &indices)
        }
        None => create_png(image.pixels(), image.width(), image.height()),
    }
}

/// Unique colors in first-seen order plus one palette index per pixel.
///
/// Returns `None` once more than 256 colors are seen.
fn extract_palette(pixels: &[u8]) -> Option<(Vec<[u8; 4]>, Vec<u8>)> {
    let mut color_to_index: HashMap<[u8; 4], u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Vec<[u8; 4]> = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices: Vec<u8> = Vec::with_capacity(pixels.len() / 4);

    for chunk in pixels.chunks_exact(4) {
        let color = [chunk[0], chunk[1], chunk[2], chunk[3]];
        let index = match color_to_index.get(&color) {
            Some(&idx) => idx,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push(color);
                color_to_index.insert(color, idx);
                idx
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

fn header(width: usize, height: usize, color_type: u8) -> Result<[u8; 13]> {
    let w = u32::try_from(width)
        .map_err(|_| RenderError::Encoding(format!("width {} too large", width)))?;
    let h = u32::try_from(height)
        .map_err(|_| RenderError::Encoding(format!("height {} too large", height)))?;
    if w == 0 || h == 0 {
        return Err(RenderError::Encoding(format!(
            "cannot encode an empty {}x{} image",
            width, height
        )));
    }

    let mut ihdr = [0u8; 13];
    ihdr[0..4].copy_from_slice(&w.to_be_bytes());
    ihdr[4..8].copy_from_slice(&h.to_be_bytes());
    ihdr[8] = 8; // bit depth
    ihdr[9] = color_type;
    // compression, filter and interlace methods stay 0
    Ok(ihdr)
}

/// Create an indexed PNG (color type 3) from palette and indices.
pub fn create_png_indexed(
    width: usize,
    height: usize,
    palette: &[[u8; 4]],
    indices: &[u8],
) -> Result<Vec<u8>> {
    if indices.len() != width * height {
        return Err(RenderError::Encoding(format!(
            "{} indices for a {}x{} image",
            indices.len(),
            width,
            height
        )));
    }

    let mut png = SIGNATURE.to_vec();
    write_chunk(&mut png, b"IHDR", &header(width, height, 3)?);

    let plte: Vec<u8> = palette.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    write_chunk(&mut png, b"PLTE", &plte);

    // tRNS only when some entry is not opaque
    if palette.iter().any(|c| c[3] < 255) {
        let trns: Vec<u8> = palette.iter().map(|c| c[3]).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    write_chunk(&mut png, b"IDAT", &deflate_scanlines(indices, width)?);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Create a PNG image from RGBA pixel data (color type 6).
pub fn create_png(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
    if pixels.len() != width * height * 4 {
        return Err(RenderError::Encoding(format!(
            "{} bytes for a {}x{} RGBA image",
            pixels.len(),
            width,
            height
        )));
    }

    let mut png = SIGNATURE.to_vec();
    write_chunk(&mut png, b"IHDR", &header(width, height, 6)?);
    write_chunk(&mut png, b"IDAT", &deflate_scanlines(pixels, width * 4)?);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Prefix every scanline with filter type 0 and zlib-compress the result.
fn deflate_scanlines(data: &[u8], row_bytes: usize) -> Result<Vec<u8>> {
    let rows = data.len() / row_bytes;
    let mut uncompressed = Vec::with_capacity(rows * (1 + row_bytes));
    for row in data.chunks_exact(row_bytes) {
        uncompressed.push(0);
        uncompressed.extend_from_slice(row);
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::fast());
    encoder
        .write_all(&uncompressed)
        .and_then(|_| encoder.finish())
        .map_err(|e| RenderError::Encoding(format!("IDAT compression failed: {}", e)))
}

/// Write a PNG chunk
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_palette_simple() {
        // red, green, blue, red
        let pixels = [
            255, 0, 0, 255, //
            0, 255, 0, 255, //
            0, 0, 255, 255, //
            255, 0, 0, 255,
        ];

        let (palette, indices) = extract_palette(&pixels).unwrap();
        assert_eq!(palette.len(), 3);
        assert_eq!(indices, vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_extract_palette_overflow() {
        let pixels: Vec<u8> = (0..300u32)
            .flat_map(|i| [(i % 256) as u8, (i / 256) as u8, 0, 255])
            .collect();
        assert!(extract_palette(&pixels).is_none());
    }

    #[test]
    fn test_write_chunk_layout() {
        let mut png = Vec::new();
        write_chunk(&mut png, b"IEND", &[]);
        assert_eq!(&png[0..8], &[0, 0, 0, 0, b'I', b'E', b'N', b'D']);
        // CRC of "IEND" is fixed by the PNG standard
        assert_eq!(&png[8..12], &[0xae, 0x42, 0x60, 0x82]);
    }
}
