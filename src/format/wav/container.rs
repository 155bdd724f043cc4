//! Chunk registry of a WAV file

use super::chunk::Chunk;
use super::header::{Envelope, FormatTag, WavFormat};
use super::schema;
use super::ChunkId;
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use tracing::debug;

/// In-memory WAV file: the RIFF envelope plus every chunk keyed by id.
///
/// Chunks are kept in ascending id order, which is also the order in which
/// chunks other than `fmt ` and `fact` are written.
#[derive(Debug, Clone)]
pub struct WavFile {
    pub(crate) envelope: Envelope,
    pub(crate) chunks: BTreeMap<ChunkId, Chunk>,
}

impl WavFile {
    /// Create a file with the built-in `fmt `, `fact`, `bext`, `cart` and `data` schemas
    pub fn new() -> Self {
        let mut file = Self::empty();
        for chunk in schema::builtin() {
            file.chunks.insert(chunk.id(), chunk);
        }
        file
    }

    /// Create a file with no schemas at all.
    ///
    /// Such a file can be read, but writing requires `fmt `, `fact` and
    /// `data` to be registered first.
    pub fn empty() -> Self {
        WavFile {
            envelope: Envelope::default(),
            chunks: BTreeMap::new(),
        }
    }

    /// Built-in schemas plus `chunks`, which replace built-ins sharing their id
    pub fn with_chunks(chunks: impl IntoIterator<Item = Chunk>) -> Self {
        let mut file = Self::new();
        for chunk in chunks {
            file.add_chunk(chunk);
        }
        file
    }

    /// Register a chunk schema, replacing any chunk with the same id
    pub fn add_chunk(&mut self, chunk: Chunk) {
        if let Some(old) = self.chunks.insert(chunk.id(), chunk) {
            debug!("Replaced schema for chunk '{}'", old.id());
        }
    }

    /// Remove a chunk. `fmt `, `fact` and `data` cannot be removed.
    pub fn remove_chunk(&mut self, id: ChunkId) -> Result<Chunk> {
        if id.is_required() {
            return Err(Error::RequiredChunk(id));
        }
        self.chunks
            .remove(&id)
            .ok_or_else(|| Error::not_found(format!("Chunk '{}'", id)))
    }

    /// Whether a chunk with this id is registered
    pub fn contains(&self, id: ChunkId) -> bool {
        self.chunks.contains_key(&id)
    }

    /// Look up a chunk by id
    pub fn chunk(&self, id: ChunkId) -> Result<&Chunk> {
        self.chunks
            .get(&id)
            .ok_or_else(|| Error::not_found(format!("Chunk '{}'", id)))
    }

    /// Look up a chunk by id for modification
    pub fn chunk_mut(&mut self, id: ChunkId) -> Result<&mut Chunk> {
        self.chunks
            .get_mut(&id)
            .ok_or_else(|| Error::not_found(format!("Chunk '{}'", id)))
    }

    /// All chunks in registry order
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    /// The RIFF envelope as last read or written
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Clear every field value and variable width, ready for a fresh read
    pub fn reset_data(&mut self) {
        for chunk in self.chunks.values_mut() {
            chunk.reset();
        }
    }

    /// Format tag of the `fmt ` chunk
    pub fn format_tag(&self) -> Result<FormatTag> {
        let tag: u16 = self.chunk(ChunkId::FMT)?.field("FormatTag")?.number()?;
        Ok(FormatTag::from(tag))
    }

    /// Decoded `fmt ` chunk
    pub fn format(&self) -> Result<WavFormat> {
        WavFormat::from_chunk(self.chunk(ChunkId::FMT)?)
    }

    /// Raw audio bytes of the `data` chunk
    pub fn payload(&self) -> &[u8] {
        self.chunks
            .get(&ChunkId::DATA)
            .and_then(|chunk| chunk.fields().first())
            .map_or(&[], |field| field.value.as_slice())
    }
}

impl Default for WavFile {
    fn default() -> Self {
        Self::new()
    }
}
