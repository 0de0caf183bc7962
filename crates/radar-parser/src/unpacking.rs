//! Bit unpacking of raw radar samples.
//!
//! Samples are stored as unsigned integers of `depth` bits, most
//! significant bit first, with no padding between samples.

use crate::error::{RadarError, Result};

/// Unpack `count` samples of `depth` bits.
pub fn unpack(data: &[u8], depth: u32, count: usize) -> Result<Vec<u32>> {
    if depth == 0 || depth > 32 {
        return Err(RadarError::UnpackingError(format!(
            "Invalid bit depth: {}",
            depth
        )));
    }

    let needed_bits = (count as u64).checked_mul(depth as u64).ok_or_else(|| {
        RadarError::UnpackingError(format!("{} samples at {} bits overflow", count, depth))
    })?;
    let available_bits = data.len() as u64 * 8;
    if available_bits < needed_bits {
        return Err(RadarError::UnpackingError(format!(
            "{} samples at {} bits need {} bytes, have {}",
            count,
            depth,
            needed_bits.div_ceil(8),
            data.len()
        )));
    }

    // Byte-aligned fast paths
    match depth {
        8 => return Ok(data[..count].iter().map(|&b| b as u32).collect()),
        16 => {
            return Ok(data[..count * 2]
                .chunks_exact(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]) as u32)
                .collect())
        }
        _ => {}
    }

    let depth = depth as usize;
    (0..count)
        .map(|i| extract_bits(data, i * depth, depth).map_err(RadarError::UnpackingError))
        .collect()
}

/// Extract bits from a byte array
/// Returns the bits as a 32-bit unsigned integer
fn extract_bits(data: &[u8], start_bit: usize, num_bits: usize) -> std::result::Result<u32, String> {
    if num_bits > 32 || num_bits == 0 {
        return Err(format!("Invalid number of bits: {}", num_bits));
    }

    let mut result = 0u32;

    for i in 0..num_bits {
        let absolute_bit = start_bit + i;
        let byte_idx = absolute_bit / 8;
        let bit_idx = 7 - (absolute_bit % 8); // MSB first

        if byte_idx >= data.len() {
            return Err("Not enough data to extract bits".to_string());
        }

        let bit = (data[byte_idx] >> bit_idx) & 1;
        result = (result << 1) | (bit as u32);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bits() {
        let data = vec![0b10110101];

        assert_eq!(extract_bits(&data, 0, 2).unwrap(), 0b10);
        assert_eq!(extract_bits(&data, 2, 2).unwrap(), 0b11);
        assert_eq!(extract_bits(&data, 0, 8).unwrap(), 0b10110101);
    }

    #[test]
    fn test_unpack_byte_depth() {
        assert_eq!(unpack(&[0, 128, 255], 8, 3).unwrap(), vec![0, 128, 255]);
    }

    #[test]
    fn test_unpack_word_depth() {
        assert_eq!(unpack(&[0x01, 0x02, 0xff, 0xff], 16, 2).unwrap(), vec![258, 65535]);
    }

    #[test]
    fn test_unpack_sub_byte_across_boundary() {
        // Four 6-bit samples in three bytes
        let data = [0b000001_00, 0b0010_0000, 0b11_111111];
        assert_eq!(unpack(&data, 6, 4).unwrap(), vec![1, 2, 3, 63]);
    }

    #[test]
    fn test_unpack_ignores_trailing_padding() {
        assert_eq!(unpack(&[0b1010_0000], 1, 3).unwrap(), vec![1, 0, 1]);
    }

    #[test]
    fn test_unpack_short_data() {
        assert!(matches!(
            unpack(&[1, 2], 16, 2),
            Err(RadarError::UnpackingError(_))
        ));
    }

    #[test]
    fn test_invalid_depth() {
        assert!(unpack(&[0; 8], 0, 1).is_err());
        assert!(unpack(&[0; 8], 33, 1).is_err());
    }
}
