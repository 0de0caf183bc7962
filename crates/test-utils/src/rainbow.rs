//! Synthetic Rainbow radar product files.

use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::ZlibEncoder;
use flate2::Compression;

/// Builder for an in-memory radar product file.
///
/// Produces an XML header, the `<!-- END XML -->` marker and one data BLOB
/// holding `rows * columns` samples packed MSB-first at `depth` bits.
///
/// # Example
///
/// ```
/// use test_utils::RainbowFile;
///
/// let bytes = RainbowFile::new(2, 2, 8).with_raw(vec![0, 1, 2, 128]).to_bytes();
/// assert!(bytes.starts_with(b"<product"));
/// ```
#[derive(Debug, Clone)]
pub struct RainbowFile {
    pub rows: usize,
    pub columns: usize,
    pub depth: u32,
    pub min: f64,
    pub max: f64,
    pub raw: Vec<u32>,
    pub site: Option<(f64, f64)>,
    pub compressed: bool,
    /// Bytes dropped from the end of the blob payload
    pub truncate: usize,
}

impl RainbowFile {
    /// Zero-filled product with the reflectivity range 0..65.
    pub fn new(rows: usize, columns: usize, depth: u32) -> Self {
        Self {
            rows,
            columns,
            depth,
            min: 0.0,
            max: 65.0,
            raw: vec![0; rows * columns],
            site: None,
            compressed: true,
            truncate: 0,
        }
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_raw(mut self, raw: Vec<u32>) -> Self {
        self.raw = raw;
        self
    }

    pub fn with_site(mut self, lon: f64, lat: f64) -> Self {
        self.site = Some((lon, lat));
        self
    }

    pub fn uncompressed(mut self) -> Self {
        self.compressed = false;
        self
    }

    pub fn truncated(mut self, bytes: usize) -> Self {
        self.truncate = bytes;
        self
    }

    /// XML header as written before the BLOB section.
    pub fn header(&self) -> String {
        let sensor = match self.site {
            Some((lon, lat)) => format!(
                "    <sensorinfo type=\"rain1\" id=\"SITE\">\n      <lon>{}</lon>\n      <lat>{}</lat>\n    </sensorinfo>\n",
                lon, lat
            ),
            None => String::new(),
        };
        format!(
            "<product version=\"5.0\" datetime=\"2021-06-01T12:00:00\" type=\"cmax\">\n  <data>\n{}    <radarpicture placeid=\"0\" min=\"{}\" max=\"{}\">\n      <datamap blobid=\"0\" depth=\"{}\" rows=\"{}\" columns=\"{}\"/>\n    </radarpicture>\n  </data>\n</product>\n<!-- END XML -->\n",
            sensor, self.min, self.max, self.depth, self.rows, self.columns
        )
    }

    /// Raw samples packed MSB-first.
    pub fn packed(&self) -> Vec<u8> {
        pack_bits(&self.raw, self.depth)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let packed = self.packed();
        let (mut payload, compression) = if self.compressed {
            (qt_compress(&packed), "qt")
        } else {
            (packed, "none")
        };
        let keep = payload.len().saturating_sub(self.truncate);
        payload.truncate(keep);

        let mut out = self.header().into_bytes();
        out.extend_from_slice(
            format!(
                "<BLOB blobid=\"0\" size=\"{}\" compression=\"{}\">\n",
                payload.len(),
                compression
            )
            .as_bytes(),
        );
        out.extend_from_slice(&payload);
        out.extend_from_slice(b"\n</BLOB>\n");
        out
    }

    /// Write the product into `dir` and return its path.
    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.to_bytes()).expect("Failed to write radar product");
        path
    }
}

/// Pack values MSB-first at `depth` bits each.
pub fn pack_bits(values: &[u32], depth: u32) -> Vec<u8> {
    let total_bits = values.len() * depth as usize;
    let mut out = vec![0u8; total_bits.div_ceil(8)];
    let mut bit = 0usize;
    for &value in values {
        for i in (0..depth).rev() {
            if (value >> i) & 1 == 1 {
                out[bit / 8] |= 0x80 >> (bit % 8);
            }
            bit += 1;
        }
    }
    out
}

/// 4-byte big-endian uncompressed length followed by a zlib stream.
pub fn qt_compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("zlib write");
    let body = encoder.finish().expect("zlib finish");

    let mut out = (data.len() as u32).to_be_bytes().to_vec();
    out.extend(body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_bits_byte_aligned() {
        assert_eq!(pack_bits(&[1, 255], 8), vec![1, 255]);
        assert_eq!(pack_bits(&[0x1234], 16), vec![0x12, 0x34]);
    }

    #[test]
    fn test_pack_bits_sub_byte() {
        // 1010 0101
        assert_eq!(pack_bits(&[0b1010, 0b0101], 4), vec![0xA5]);
        // 1 0 1 padded
        assert_eq!(pack_bits(&[1, 0, 1], 1), vec![0b1010_0000]);
    }

    #[test]
    fn test_file_layout() {
        let bytes = RainbowFile::new(1, 2, 8).with_site(19.0, 52.0).to_bytes();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("<!-- END XML -->"));
        assert!(text.contains("compression=\"qt\""));
        assert!(text.contains("<lon>19</lon>"));
        assert!(text.trim_end().ends_with("</BLOB>"));
    }
}
