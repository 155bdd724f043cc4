//! WAV file writer
//!
//! Writing is two passes: the first sizes every chunk from its field widths,
//! the second emits the envelope and the chunks. The file is assembled in
//! memory and only then written out, so a failed write produces no file.

use super::chunk::Chunk;
use super::container::WavFile;
use super::header::{Envelope, FormatTag};
use super::{ChunkHeader, ChunkId, MAX_CHUNK_SIZE};
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Bytes of an id + length chunk header
const CHUNK_HEADER_SIZE: u64 = 8;

impl WavFile {
    /// Write the file to disk. Undefined chunks are dropped unless `include_undefined`.
    pub fn write<P: AsRef<Path>>(&mut self, path: P, include_undefined: bool) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes(include_undefined)?;

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&bytes)?;
        writer.flush()?;

        info!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    /// Write the file to a stream
    pub fn write_to<W: Write>(&mut self, mut writer: W, include_undefined: bool) -> Result<()> {
        let bytes = self.to_bytes(include_undefined)?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    /// Serialize the file.
    ///
    /// Variable fields holding a value take its length as their width, and
    /// every chunk's actual size and the envelope size are recomputed.
    pub fn to_bytes(&mut self, include_undefined: bool) -> Result<Vec<u8>> {
        for id in ChunkId::REQUIRED {
            if !self.chunks.contains_key(&id) {
                return Err(Error::RequiredChunk(id));
            }
        }

        for chunk in self.chunks.values_mut() {
            size_chunk(chunk)?;
        }

        let order = self.emission_order(include_undefined);
        let riff_size = order.iter().fold(ChunkId::WAVE.0.len() as u64, |acc, id| {
            acc + self.chunks[id].actual_size() as u64 + CHUNK_HEADER_SIZE
        });
        let riff_size = u32::try_from(riff_size).map_err(|_| {
            Error::size(format!(
                "File of {} bytes exceeds the RIFF size limit",
                riff_size
            ))
        })?;
        self.envelope = Envelope::new(riff_size);

        let mut out = Vec::with_capacity(riff_size as usize + CHUNK_HEADER_SIZE as usize);
        out.extend_from_slice(&self.envelope.to_bytes());
        for id in &order {
            emit_chunk(&self.chunks[id], &mut out)?;
        }

        debug!(
            "Serialized {} chunks, RIFF size {}",
            order.len(),
            riff_size
        );
        Ok(out)
    }

    /// `fmt ` first, `fact` for non-PCM data, then the rest in registry order
    fn emission_order(&self, include_undefined: bool) -> Vec<ChunkId> {
        let mut order = vec![ChunkId::FMT];

        match self.format_tag() {
            Ok(FormatTag::Pcm) => debug!("PCM data; omitting fact chunk"),
            _ => order.push(ChunkId::FACT),
        }

        for (id, chunk) in &self.chunks {
            if *id == ChunkId::FMT || *id == ChunkId::FACT {
                continue;
            }
            if chunk.is_undefined() && !include_undefined {
                debug!("Dropping undefined chunk '{}'", id);
                continue;
            }
            order.push(*id);
        }

        order
    }
}

/// Size pass: give non-empty variable fields a width and total the widths
fn size_chunk(chunk: &mut Chunk) -> Result<()> {
    let id = chunk.id();
    let mut total: u64 = 0;

    for field in chunk.fields_mut() {
        if field.width == 0 && !field.value.is_empty() {
            field.width = u32::try_from(field.value.len()).map_err(|_| {
                Error::size(format!(
                    "Field '{}' of chunk '{}' is larger than a chunk can hold",
                    field.name(),
                    id
                ))
            })?;
        }
        total += field.width as u64;
    }

    if total > MAX_CHUNK_SIZE as u64 {
        return Err(Error::size(format!(
            "Chunk '{}' holds {} bytes, more than the maximum of {}",
            id, total, MAX_CHUNK_SIZE
        )));
    }

    chunk.clear_actual_size();
    chunk.add_to_actual_size(total as u32);
    Ok(())
}

/// Emit id, size and the fields, each zero-padded to its width
fn emit_chunk(chunk: &Chunk, out: &mut Vec<u8>) -> Result<()> {
    let header = ChunkHeader {
        id: chunk.id(),
        size: chunk.actual_size(),
    };
    out.extend_from_slice(&header.to_bytes());

    for field in chunk.fields() {
        if field.value.len() > field.width as usize {
            return Err(Error::FieldOverflow {
                chunk: chunk.id(),
                field: field.name().to_string(),
                width: field.width,
                have: field.value.len(),
            });
        }
        out.extend_from_slice(&field.padded_value());
    }

    Ok(())
}
