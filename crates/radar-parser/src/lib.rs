//! Decoder for Rainbow radar products.
//!
//! A product file is an XML header followed by binary BLOB sections:
//!
//! ```text
//! <product ...>
//!   <data>
//!     <sensorinfo><lon>..</lon><lat>..</lat></sensorinfo>
//!     <radarpicture min=".." max="..">
//!       <datamap blobid="0" depth="8" rows=".." columns=".."/>
//!     </radarpicture>
//!   </data>
//! </product>
//! <!-- END XML -->
//! <BLOB blobid="0" size=".." compression="qt">
//! ...
//! </BLOB>
//! ```
//!
//! Decoding proceeds in stages:
//! 1. [`container`] splits the header from the BLOB sections and builds a node tree
//! 2. [`blob`] extracts and inflates the referenced BLOB
//! 3. [`unpacking`] unpacks `depth`-bit samples
//! 4. [`product`] validates the samples and rescales them to physical units
//!
//! [`RadarGeometry`] then places a product on its azimuthal equidistant grid.

pub mod blob;
pub mod container;
pub mod error;
pub mod geometry;
pub mod product;
pub mod unpacking;

pub use blob::{decompress_qt, Blob, BlobCompression};
pub use container::{parse_header, RainbowContainer, XmlNode};
pub use error::{RadarError, Result};
pub use geometry::{RadarGeometry, DEFAULT_CELL_SIZE, DEFAULT_SITE};
pub use product::{decode, decode_file, RadarProduct};
pub use unpacking::unpack;
