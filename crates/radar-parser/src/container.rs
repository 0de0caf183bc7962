//! Rainbow container layout.
//!
//! A product file starts with an XML header describing the product,
//! optionally closed by an `<!-- END XML -->` marker, followed by binary
//! `<BLOB>` sections referenced from the header by id.

use std::collections::BTreeMap;

use bytes::Bytes;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::blob::{find, scan_blobs, Blob};
use crate::error::{RadarError, Result};

const END_XML_MARKER: &[u8] = b"<!-- END XML -->";
const BLOB_OPEN: &[u8] = b"<BLOB";

/// One element of the XML header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlNode {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub text: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    fn from_start(e: &BytesStart<'_>) -> Result<Self> {
        let mut attributes = BTreeMap::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|err| RadarError::Xml(err.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.insert(key, value);
        }
        Ok(Self {
            name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
            attributes,
            text: String::new(),
            children: Vec::new(),
        })
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Descendant at a `/`-separated path relative to this node.
    pub fn path(&self, path: &str) -> Option<&XmlNode> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .try_fold(self, |node, name| node.child(name))
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Parse the XML header into a node tree.
pub fn parse_header(xml: &str) -> Result<XmlNode> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    let mut attach = |stack: &mut Vec<XmlNode>, node: XmlNode| -> Result<()> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None if root.is_none() => root = Some(node),
            None => {
                return Err(RadarError::Xml(format!(
                    "unexpected second root element <{}>",
                    node.name
                )))
            }
        }
        Ok(())
    };

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(XmlNode::from_start(&e)?),
            Event::Empty(e) => {
                let node = XmlNode::from_start(&e)?;
                attach(&mut stack, node)?;
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| RadarError::Xml("unbalanced closing tag".to_string()))?;
                attach(&mut stack, node)?;
            }
            Event::Text(t) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&t.unescape()?);
                }
            }
            Event::CData(t) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(RadarError::Xml(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| RadarError::Xml("header has no root element".to_string()))
}

/// A parsed product file: header tree plus raw BLOB sections.
#[derive(Debug, Clone)]
pub struct RainbowContainer {
    pub header: XmlNode,
    pub blobs: Vec<Blob>,
}

impl RainbowContainer {
    pub fn parse(data: Bytes) -> Result<Self> {
        let header_end = find(&data, END_XML_MARKER, 0)
            .or_else(|| find(&data, BLOB_OPEN, 0))
            .unwrap_or(data.len());

        let xml = std::str::from_utf8(&data[..header_end])
            .map_err(|e| RadarError::InvalidFormat(format!("header is not UTF-8: {}", e)))?;
        let header = parse_header(xml)?;
        let blobs = scan_blobs(&data, header_end)?;

        debug!(
            root = %header.name,
            header_bytes = header_end,
            blobs = blobs.len(),
            "Parsed radar container"
        );
        Ok(Self { header, blobs })
    }

    pub fn blob(&self, id: u32) -> Option<&Blob> {
        self.blobs.iter().find(|b| b.id == id)
    }
}
