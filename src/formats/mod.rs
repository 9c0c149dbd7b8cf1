//! Binary graph files
//!
//! A graph directory holds six flat files with fixed-size records and no
//! header. Every multi-byte field is big-endian.
//!
//! | file              | record | fields                                              |
//! |-------------------|--------|-----------------------------------------------------|
//! | `nodes.bin`       | 12     | e: i32 Q28.4, n: i32 Q28.4, degree(4) / edge(28)    |
//! | `sectors.bin`     | 6      | first node: i32, node count: u16 (128 x 128 cells)  |
//! | `edges.bin`       | 10     | target: i32 (`!t` if inverted), length: u16 Q12.4,  |
//! |                   |        | elevation gain: u16 Q12.4, attribute set: u16       |
//! | `profile_ids.bin` | 4      | kind(2) / first sample slot(30)                     |
//! | `elevations.bin`  | 2      | profile sample slots                                |
//! | `attributes.bin`  | 8      | u64 attribute bitmask                               |
//!
//! Tables are read in place through borrowed views; nothing is copied out of
//! the buffers except decoded elevation profiles.

pub mod attributes;
pub mod edges;
pub mod nodes;
pub mod sectors;
pub mod writer;

use memmap2::Mmap;
use std::fs::File;
use std::ops::Deref;
use std::path::Path;

use crate::core::{Error, Result};

pub use attributes::{Attribute, AttributeSet};
pub use edges::{GraphEdges, ProfileKind};
pub use nodes::GraphNodes;
pub use sectors::{GraphSectors, Sector};
pub use writer::{EdgeSpec, GraphWriter};

pub const NODES_FILE: &str = "nodes.bin";
pub const SECTORS_FILE: &str = "sectors.bin";
pub const EDGES_FILE: &str = "edges.bin";
pub const PROFILE_IDS_FILE: &str = "profile_ids.bin";
pub const ELEVATIONS_FILE: &str = "elevations.bin";
pub const ATTRIBUTES_FILE: &str = "attributes.bin";

/// Read-only bytes of one graph file, mapped or owned.
pub enum GraphBuffer {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl GraphBuffer {
    /// Map `path` read-only. Empty files are kept as empty owned buffers since
    /// zero-length mappings are not portable.
    pub fn map(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let len = file.metadata().map_err(|e| Error::io(path, e))?.len();
        if len == 0 {
            return Ok(GraphBuffer::Owned(Vec::new()));
        }
        // SAFETY: graph files are immutable for the lifetime of a loaded
        // graph; nothing in this process writes to them while mapped.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::io(path, e))?;
        Ok(GraphBuffer::Mapped(mmap))
    }
}

impl Deref for GraphBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            GraphBuffer::Mapped(mmap) => mmap,
            GraphBuffer::Owned(bytes) => bytes,
        }
    }
}

impl From<Vec<u8>> for GraphBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        GraphBuffer::Owned(bytes)
    }
}

/// Raw contents of the six graph files, as produced by [`GraphWriter::encode`].
#[derive(Debug, Clone, Default)]
pub struct GraphBuffers {
    pub nodes: Vec<u8>,
    pub sectors: Vec<u8>,
    pub edges: Vec<u8>,
    pub profile_ids: Vec<u8>,
    pub elevations: Vec<u8>,
    pub attributes: Vec<u8>,
}

impl GraphBuffers {
    /// Write every file into `dir`, which must exist.
    pub fn write_to(&self, dir: &Path) -> Result<()> {
        let files: [(&str, &[u8]); 6] = [
            (NODES_FILE, &self.nodes),
            (SECTORS_FILE, &self.sectors),
            (EDGES_FILE, &self.edges),
            (PROFILE_IDS_FILE, &self.profile_ids),
            (ELEVATIONS_FILE, &self.elevations),
            (ATTRIBUTES_FILE, &self.attributes),
        ];
        for (name, bytes) in files {
            let path = dir.join(name);
            std::fs::write(&path, bytes).map_err(|e| Error::io(&path, e))?;
        }
        Ok(())
    }
}

#[inline]
pub(crate) fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([buf[offset], buf[offset + 1]])
}

#[inline]
pub(crate) fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

#[inline]
pub(crate) fn read_i32(buf: &[u8], offset: usize) -> i32 {
    read_u32(buf, offset) as i32
}

#[inline]
pub(crate) fn read_u64(buf: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[offset..offset + 8]);
    u64::from_be_bytes(bytes)
}
