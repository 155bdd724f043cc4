//! WAV audio format support
//!
//! This module implements lossless RIFF/WAV chunk parsing and writing.
//! Known chunks are decoded into named fields through a schema, unknown
//! chunks are kept as opaque bytes so a file can be re-emitted unchanged.

pub mod chunk;
pub mod container;
pub mod demuxer;
pub mod field;
pub mod header;
pub mod muxer;
pub mod schema;

pub use chunk::Chunk;
pub use container::WavFile;
pub use field::{Field, FieldType};
pub use header::{Envelope, FormatTag};

use crate::error::{Error, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Size of a chunk id in bytes
pub const ID_SIZE: usize = 4;

/// Size of a chunk length prefix in bytes
pub const CHUNK_SIZE_BYTES: usize = 4;

/// Largest chunk body the format can describe (room for the 8-byte id+length header)
pub const MAX_CHUNK_SIZE: u32 = u32::MAX - 8;

/// Four-character chunk identifier
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkId(pub [u8; ID_SIZE]);

impl ChunkId {
    pub const RIFF: ChunkId = ChunkId(*b"RIFF");
    pub const WAVE: ChunkId = ChunkId(*b"WAVE");
    pub const FMT: ChunkId = ChunkId(*b"fmt ");
    pub const FACT: ChunkId = ChunkId(*b"fact");
    pub const BEXT: ChunkId = ChunkId(*b"bext");
    pub const CART: ChunkId = ChunkId(*b"cart");
    pub const DATA: ChunkId = ChunkId(*b"data");
    pub const JUNK: ChunkId = ChunkId(*b"JUNK");

    /// Chunks every WAV file carries; they can never be removed
    pub const REQUIRED: [ChunkId; 3] = [ChunkId::FMT, ChunkId::FACT, ChunkId::DATA];

    /// Raw id bytes
    pub fn as_bytes(&self) -> &[u8; ID_SIZE] {
        &self.0
    }

    /// Whether this id names one of the required chunks
    pub fn is_required(&self) -> bool {
        ChunkId::REQUIRED.contains(self)
    }
}

impl From<[u8; ID_SIZE]> for ChunkId {
    fn from(bytes: [u8; ID_SIZE]) -> Self {
        ChunkId(bytes)
    }
}

impl FromStr for ChunkId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes: [u8; ID_SIZE] = s.as_bytes().try_into().map_err(|_| {
            Error::invalid_input(format!(
                "Chunk id must be exactly {} bytes, got '{}'",
                ID_SIZE, s
            ))
        })?;
        Ok(ChunkId(bytes))
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkId(\"{}\")", self)
    }
}

impl Serialize for ChunkId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Chunk header (4 byte ID + 4 byte size)
#[derive(Debug, Clone, Copy)]
pub struct ChunkHeader {
    pub id: ChunkId,
    pub size: u32,
}

impl ChunkHeader {
    /// Read a chunk header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < ID_SIZE + CHUNK_SIZE_BYTES {
            return None;
        }

        let mut id = [0u8; ID_SIZE];
        id.copy_from_slice(&bytes[0..4]);

        let size = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);

        Some(ChunkHeader {
            id: ChunkId(id),
            size,
        })
    }

    /// Convert chunk header to bytes
    pub fn to_bytes(&self) -> [u8; 8] {
        let mut bytes = [0u8; 8];
        bytes[0..4].copy_from_slice(&self.id.0);
        bytes[4..8].copy_from_slice(&self.size.to_le_bytes());
        bytes
    }
}
