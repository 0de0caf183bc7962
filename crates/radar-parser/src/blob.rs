//! Binary BLOB sections.
//!
//! Each section is framed as
//!
//! ```text
//! <BLOB blobid="N" size="S" compression="qt">\n<S bytes>\n</BLOB>
//! ```
//!
//! With `qt` compression the payload is a 4-byte big-endian uncompressed
//! length followed by a zlib stream.

use std::io::Read;

use bytes::Bytes;
use flate2::read::ZlibDecoder;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{RadarError, Result};

const BLOB_OPEN: &[u8] = b"<BLOB";
const BLOB_CLOSE: &[u8] = b"</BLOB>";

/// Position of `needle` in `haystack` at or after `from`.
pub(crate) fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from >= haystack.len() || needle.is_empty() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobCompression {
    None,
    Qt,
}

impl BlobCompression {
    fn parse(value: &str) -> Result<Self> {
        match value {
            "" | "none" => Ok(Self::None),
            "qt" => Ok(Self::Qt),
            other => Err(RadarError::invalid_value("BLOB compression", other)),
        }
    }
}

/// Largest buffer reserved up front when inflating a `qt` payload.
const MAX_PREALLOC: usize = 16 * 1024 * 1024;

/// One raw BLOB section, payload not yet decompressed.
#[derive(Debug, Clone)]
pub struct Blob {
    pub id: u32,
    pub compression: BlobCompression,
    pub payload: Bytes,
}

impl Blob {
    /// Decompressed payload of at most `max_len` bytes.
    pub fn data(&self, max_len: usize) -> Result<Vec<u8>> {
        match self.compression {
            BlobCompression::None => Ok(self.payload.to_vec()),
            BlobCompression::Qt => decompress_qt(&self.payload, max_len),
        }
    }
}

/// Inflate a `qt` payload and check it against its declared length.
///
/// Payloads declaring more than `max_len` bytes are rejected before
/// inflating, and the zlib stream is never read past the declared length.
pub fn decompress_qt(payload: &[u8], max_len: usize) -> Result<Vec<u8>> {
    if payload.len() < 4 {
        return Err(RadarError::Decompression(format!(
            "qt payload of {} bytes has no length prefix",
            payload.len()
        )));
    }
    let expected = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]) as usize;

    if expected > max_len {
        return Err(RadarError::Decompression(format!(
            "qt payload declares {} bytes, at most {} expected",
            expected, max_len
        )));
    }

    let mut out = Vec::with_capacity(expected.min(MAX_PREALLOC));
    ZlibDecoder::new(&payload[4..])
        .take(expected as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| RadarError::Decompression(e.to_string()))?;

    if out.len() != expected {
        return Err(RadarError::Decompression(format!(
            "inflated {} bytes, header declares {}",
            out.len(),
            expected
        )));
    }
    Ok(out)
}

/// Attributes of a `<BLOB ...>` opening tag.
fn parse_blob_tag(tag: &[u8]) -> Result<(u32, usize, BlobCompression)> {
    let mut reader = Reader::from_reader(tag);
    let mut buf = Vec::new();
    let start = match reader.read_event_into(&mut buf)? {
        Event::Start(e) | Event::Empty(e) => e.into_owned(),
        other => {
            return Err(RadarError::Blob(format!(
                "expected BLOB tag, found {:?}",
                other
            )))
        }
    };

    let mut id = None;
    let mut size = None;
    let mut compression = BlobCompression::None;
    for attr in start.attributes() {
        let attr = attr.map_err(|e| RadarError::Xml(e.to_string()))?;
        let value = attr.unescape_value()?;
        match attr.key.as_ref() {
            b"blobid" => {
                id = Some(
                    value
                        .trim()
                        .parse::<u32>()
                        .map_err(|_| RadarError::invalid_value("BLOB blobid", value.as_ref()))?,
                )
            }
            b"size" => {
                size = Some(
                    value
                        .trim()
                        .parse::<usize>()
                        .map_err(|_| RadarError::invalid_value("BLOB size", value.as_ref()))?,
                )
            }
            b"compression" => compression = BlobCompression::parse(value.trim())?,
            _ => {}
        }
    }

    let id = id.ok_or_else(|| RadarError::missing("BLOB@blobid"))?;
    let size = size.ok_or_else(|| RadarError::missing("BLOB@size"))?;
    Ok((id, size, compression))
}

/// Collect every BLOB section starting at byte offset `from`.
pub fn scan_blobs(data: &Bytes, from: usize) -> Result<Vec<Blob>> {
    let mut blobs = Vec::new();
    let mut pos = from;

    while let Some(open) = find(data, BLOB_OPEN, pos) {
        let close = find(data, b">", open)
            .ok_or_else(|| RadarError::Blob("unterminated BLOB tag".to_string()))?;
        let (id, size, compression) = parse_blob_tag(&data[open..=close])?;

        // A single line break separates the tag from the payload
        let mut start = close + 1;
        if data.get(start) == Some(&b'\r') {
            start += 1;
        }
        if data.get(start) == Some(&b'\n') {
            start += 1;
        }

        let end = match start.checked_add(size) {
            Some(end) if end <= data.len() => end,
            _ => {
                return Err(RadarError::Blob(format!(
                    "BLOB {} declares {} bytes but only {} remain",
                    id,
                    size,
                    data.len().saturating_sub(start)
                )))
            }
        };
        let trailer = &data[end..];
        let closing = trailer
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .map(|p| trailer[p..].starts_with(BLOB_CLOSE))
            .unwrap_or(false);
        if !closing {
            return Err(RadarError::Blob(format!(
                "BLOB {} is not followed by </BLOB>",
                id
            )));
        }

        blobs.push(Blob {
            id,
            compression,
            payload: data.slice(start..end),
        });
        pos = end + BLOB_CLOSE.len();
    }

    Ok(blobs)
}
