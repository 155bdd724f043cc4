//! WAV file reader
//!
//! Reads the chunk sequence in one forward pass. Known chunks are decoded
//! through their schema, `data` and unknown chunks are captured verbatim and
//! `JUNK` is dropped.

use super::chunk::Chunk;
use super::container::WavFile;
use super::header::Envelope;
use super::schema;
use super::{ChunkHeader, ChunkId, CHUNK_SIZE_BYTES, ID_SIZE};
use crate::error::{Error, Result};
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

impl WavFile {
    /// Read a WAV file from disk, replacing all field values
    pub fn read<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::open(path)?;
        debug!("Reading {}", path.display());
        self.read_from(BufReader::new(file))
    }

    /// Read a WAV stream, replacing all field values
    pub fn read_from<R: Read>(&mut self, mut reader: R) -> Result<()> {
        // Chunks captured from a previous file do not carry over
        self.chunks.retain(|_, chunk| !chunk.is_undefined());
        self.reset_data();

        self.envelope = Envelope::read(&mut reader)?;
        debug!("RIFF envelope declares {} bytes", self.envelope.declared_size);

        // Unknown ids captured during this pass; later repeats are dropped
        let mut captured: HashSet<ChunkId> = HashSet::new();
        let mut chunk_count = 0usize;

        while let Some(ChunkHeader { id, size }) = read_chunk_header(&mut reader)? {
            chunk_count += 1;

            if id == ChunkId::DATA {
                let payload = read_body(&mut reader, size)?;
                debug!("Captured {} bytes of audio", payload.len());
                self.chunks.insert(id, schema::data_with(payload)?);
                continue;
            }

            let known = self
                .chunks
                .get(&id)
                .map_or(false, |chunk| !chunk.is_undefined());

            if !known {
                if id == ChunkId::JUNK {
                    debug!("Dropping JUNK chunk of {} bytes", size);
                    skip(&mut reader, size)?;
                } else if size == 0 {
                    debug!("Ignoring empty chunk '{}'", id);
                } else if captured.contains(&id) {
                    debug!("Dropping repeated chunk '{}' of {} bytes", id, size);
                    skip(&mut reader, size)?;
                } else {
                    debug!("Chunk '{}' has no schema; keeping {} bytes as-is", id, size);
                    let body = read_body(&mut reader, size)?;
                    self.chunks.insert(id, schema::undefined(id, body)?);
                    captured.insert(id);
                }
                continue;
            }

            if let Some(chunk) = self.chunks.get_mut(&id) {
                // Older, shorter revisions of a chunk are ignored rather than
                // half filled. `fmt ` is the exception: its 16-byte PCM form
                // is a prefix of the full layout.
                if chunk.schema_size() > size && id != ChunkId::FMT {
                    warn!(
                        "Chunk '{}' holds {} bytes but its schema needs {}; skipping",
                        id,
                        size,
                        chunk.schema_size()
                    );
                    skip(&mut reader, size)?;
                    continue;
                }

                fill_chunk(chunk, &mut reader, size)?;
            }
        }

        info!(
            "Read {} chunks ({} bytes of audio)",
            chunk_count,
            self.payload().len()
        );
        Ok(())
    }
}

/// Fill the fields of `chunk` from a body of `size` bytes.
///
/// Fixed fields are read while they fit. The variable field takes everything
/// left. Whatever is not consumed by a field is skipped.
fn fill_chunk<R: Read>(chunk: &mut Chunk, reader: &mut R, size: u32) -> Result<()> {
    chunk.reset();

    let id = chunk.id();
    let variable = chunk.is_variable();
    let last = chunk.fields().len().saturating_sub(1);
    let mut count: u32 = 0;

    for (i, field) in chunk.fields_mut().iter_mut().enumerate() {
        if count >= size {
            break;
        }

        if field.width == 0 {
            if !variable || i != last {
                return Err(Error::schema(format!(
                    "Field '{}' of chunk '{}' has no width but is not the chunk's variable field",
                    field.name(),
                    id
                )));
            }
            let remaining = size - count;
            field.value = read_body(reader, remaining)?;
            field.width = remaining;
            count = size;
            break;
        }

        if field.width > size - count {
            debug!(
                "Chunk '{}' ends inside field '{}'; remaining fields left empty",
                id,
                field.name()
            );
            break;
        }

        field.value = read_body(reader, field.width)?;
        count += field.width;
    }

    if count < size {
        debug!("Skipping {} unparsed bytes of chunk '{}'", size - count, id);
        skip(reader, size - count)?;
    }

    Ok(())
}

/// Next chunk header, or `None` once fewer than four bytes remain.
///
/// A complete id followed by a cut-off length is a truncated file.
fn read_chunk_header<R: Read>(reader: &mut R) -> Result<Option<ChunkHeader>> {
    let mut header = [0u8; ID_SIZE + CHUNK_SIZE_BYTES];
    let mut filled = 0;

    while filled < header.len() {
        match reader.read(&mut header[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    if filled < ID_SIZE {
        if filled > 0 {
            debug!("Ignoring {} trailing bytes", filled);
        }
        return Ok(None);
    }

    match ChunkHeader::from_bytes(&header[..filled]) {
        Some(parsed) => Ok(Some(parsed)),
        None => Err(Error::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("chunk length truncated after {} header bytes", filled),
        ))),
    }
}

fn read_body<R: Read>(reader: &mut R, size: u32) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    reader.by_ref().take(size as u64).read_to_end(&mut body)?;
    if body.len() < size as usize {
        return Err(truncated(size, body.len() as u64));
    }
    Ok(body)
}

fn skip<R: Read>(reader: &mut R, size: u32) -> Result<()> {
    let skipped = io::copy(&mut reader.by_ref().take(size as u64), &mut io::sink())?;
    if skipped < size as u64 {
        return Err(truncated(size, skipped));
    }
    Ok(())
}

fn truncated(expected: u32, got: u64) -> Error {
    Error::Io(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("chunk body truncated: expected {} bytes, got {}", expected, got),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::wav::field::{Field, FieldType};
    use crate::format::wav::header::FormatTag;
    use std::io::Cursor;

    fn chunk_bytes(id: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut out = id.to_vec();
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(body);
        out
    }

    fn riff(chunks: &[Vec<u8>]) -> Vec<u8> {
        let body: Vec<u8> = chunks.concat();
        let mut out = b"RIFF".to_vec();
        out.extend_from_slice(&(body.len() as u32 + 4).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(&body);
        out
    }

    fn pcm_fmt() -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&1u16.to_le_bytes());
        body.extend_from_slice(&2u16.to_le_bytes());
        body.extend_from_slice(&44100u32.to_le_bytes());
        body.extend_from_slice(&176400u32.to_le_bytes());
        body.extend_from_slice(&4u16.to_le_bytes());
        body.extend_from_slice(&16u16.to_le_bytes());
        chunk_bytes(b"fmt ", &body)
    }

    #[test]
    fn test_read_minimal_pcm() {
        let bytes = riff(&[pcm_fmt(), chunk_bytes(b"data", &[1, 2, 3, 4])]);
        let mut file = WavFile::new();
        file.read_from(Cursor::new(bytes)).unwrap();

        assert_eq!(file.format_tag().unwrap(), FormatTag::Pcm);
        let fmt = file.chunk(ChunkId::FMT).unwrap();
        assert_eq!(fmt.field("SamplesPerSec").unwrap().number::<u32>().unwrap(), 44100);
        // Extensible tail absent from the 16-byte form
        assert!(fmt.field("Size").unwrap().value.is_empty());
        assert_eq!(file.payload(), &[1, 2, 3, 4]);
        assert_eq!(file.envelope().declared_size, 4 + 24 + 12);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = riff(&[pcm_fmt()]);
        bytes[0..4].copy_from_slice(b"RIFX");
        let mut file = WavFile::new();
        assert!(matches!(
            file.read_from(Cursor::new(bytes)),
            Err(Error::Format(_))
        ));

        let mut bytes = riff(&[pcm_fmt()]);
        bytes[8..12].copy_from_slice(b"AVI ");
        assert!(matches!(
            file.read_from(Cursor::new(bytes)),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn test_undersized_known_chunk_is_skipped() {
        let bytes = riff(&[
            pcm_fmt(),
            chunk_bytes(b"fact", &[9, 9]),
            chunk_bytes(b"data", &[5; 6]),
        ]);
        let mut file = WavFile::new();
        file.read_from(Cursor::new(bytes)).unwrap();

        let fact = file.chunk(ChunkId::FACT).unwrap();
        assert!(fact.fields().iter().all(|f| f.value.is_empty()));
        assert_eq!(file.payload(), &[5; 6]);
    }

    #[test]
    fn test_undersized_fmt_fills_what_fits() {
        // 7 bytes: FormatTag, Channels and one byte of SamplesPerSec
        let bytes = riff(&[
            chunk_bytes(b"fmt ", &[1, 0, 1, 0, 0x44, 0xAC, 0x00]),
            chunk_bytes(b"data", &[0; 2]),
        ]);
        let mut file = WavFile::new();
        file.read_from(Cursor::new(bytes)).unwrap();

        let fmt = file.chunk(ChunkId::FMT).unwrap();
        assert_eq!(fmt.field("FormatTag").unwrap().value, vec![1, 0]);
        assert_eq!(fmt.field("Channels").unwrap().value, vec![1, 0]);
        assert!(fmt.field("SamplesPerSec").unwrap().value.is_empty());
        // The partial field was skipped and the stream stayed aligned
        assert_eq!(file.payload(), &[0, 0]);
    }

    #[test]
    fn test_variable_field_absorbs_rest() {
        let mut body = vec![0u8; 602];
        body[..5].copy_from_slice(b"hello");
        body.extend_from_slice(b"A=PCM,F=48000\r\n");
        let bytes = riff(&[pcm_fmt(), chunk_bytes(b"bext", &body)]);

        let mut file = WavFile::new();
        file.read_from(Cursor::new(bytes)).unwrap();

        let bext = file.chunk(ChunkId::BEXT).unwrap();
        assert_eq!(bext.field("Description").unwrap().text(), "hello");
        let history = bext.field("CodingHistory").unwrap();
        assert_eq!(history.value, b"A=PCM,F=48000\r\n".to_vec());
        assert_eq!(history.width, 15);
    }

    #[test]
    fn test_unknown_chunks_keep_first() {
        let bytes = riff(&[
            pcm_fmt(),
            chunk_bytes(b"LIST", b"first"),
            chunk_bytes(b"LIST", b"second!"),
            chunk_bytes(b"data", &[7; 4]),
        ]);
        let mut file = WavFile::new();
        file.read_from(Cursor::new(bytes)).unwrap();

        let list = file.chunk("LIST".parse().unwrap()).unwrap();
        assert!(list.is_undefined());
        assert_eq!(list.field(schema::OPAQUE_FIELD).unwrap().value, b"first".to_vec());
        assert_eq!(file.payload(), &[7; 4]);
    }

    #[test]
    fn test_junk_and_empty_chunks_dropped() {
        let bytes = riff(&[
            chunk_bytes(b"JUNK", &[0; 28]),
            pcm_fmt(),
            chunk_bytes(b"zero", &[]),
            chunk_bytes(b"data", &[1]),
        ]);
        let mut file = WavFile::new();
        file.read_from(Cursor::new(bytes)).unwrap();

        assert!(!file.contains(ChunkId::JUNK));
        assert!(!file.contains("zero".parse().unwrap()));
        assert_eq!(file.payload(), &[1]);
    }

    #[test]
    fn test_registered_junk_schema_is_honored() {
        let junk = Chunk::with_fields(
            ChunkId::JUNK,
            vec![Field::variable("padding", FieldType::ByteArray)],
        )
        .unwrap();
        let mut file = WavFile::with_chunks(vec![junk]);
        let bytes = riff(&[chunk_bytes(b"JUNK", &[3; 4]), pcm_fmt()]);
        file.read_from(Cursor::new(bytes)).unwrap();

        let junk = file.chunk(ChunkId::JUNK).unwrap();
        assert_eq!(junk.field("padding").unwrap().value, vec![3; 4]);
    }

    #[test]
    fn test_zero_width_field_in_fixed_chunk() {
        let mut file = WavFile::new();
        // Break the schema behind its back: a fixed chunk with a zero-width field
        file.chunk_mut(ChunkId::FACT).unwrap().fields_mut()[0].width = 0;

        let bytes = riff(&[pcm_fmt(), chunk_bytes(b"fact", &[1, 0, 0, 0])]);
        let err = file.read_from(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_oversized_chunk_extra_bytes_skipped() {
        let bytes = riff(&[
            pcm_fmt(),
            chunk_bytes(b"fact", &[10, 0, 0, 0, 0xAA, 0xBB]),
            chunk_bytes(b"data", &[4; 3]),
        ]);
        let mut file = WavFile::new();
        file.read_from(Cursor::new(bytes)).unwrap();

        let fact = file.chunk(ChunkId::FACT).unwrap();
        assert_eq!(fact.field("SampleLength").unwrap().number::<i32>().unwrap(), 10);
        assert_eq!(file.payload(), &[4; 3]);
    }

    #[test]
    fn test_truncated_body_is_io_error() {
        let mut bytes = riff(&[pcm_fmt(), chunk_bytes(b"data", &[1; 10])]);
        bytes.truncate(bytes.len() - 4);
        let mut file = WavFile::new();
        assert!(matches!(
            file.read_from(Cursor::new(bytes)),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_truncated_length_is_io_error() {
        let mut bytes = riff(&[pcm_fmt(), chunk_bytes(b"data", &[1; 2])]);
        bytes.extend_from_slice(b"LIST\x05\x00");
        let mut file = WavFile::new();
        assert!(matches!(
            file.read_from(Cursor::new(bytes)),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_trailing_partial_id_ignored() {
        let mut bytes = riff(&[pcm_fmt(), chunk_bytes(b"data", &[1; 2])]);
        bytes.extend_from_slice(b"\0\0");
        let mut file = WavFile::new();
        file.read_from(Cursor::new(bytes)).unwrap();
        assert_eq!(file.payload(), &[1; 2]);
    }

    #[test]
    fn test_reread_resets_previous_values() {
        let mut file = WavFile::new();
        let first = riff(&[
            pcm_fmt(),
            chunk_bytes(b"fact", &[8, 0, 0, 0]),
            chunk_bytes(b"data", &[1; 8]),
        ]);
        file.read_from(Cursor::new(first)).unwrap();

        let second = riff(&[pcm_fmt(), chunk_bytes(b"data", &[2; 2])]);
        file.read_from(Cursor::new(second)).unwrap();

        assert!(file
            .chunk(ChunkId::FACT)
            .unwrap()
            .field("SampleLength")
            .unwrap()
            .value
            .is_empty());
        assert_eq!(file.payload(), &[2; 2]);
    }

    #[test]
    fn test_reread_drops_previous_unknown_chunks() {
        let mut file = WavFile::new();
        let first = riff(&[pcm_fmt(), chunk_bytes(b"LIST", b"info"), chunk_bytes(b"data", &[1])]);
        file.read_from(Cursor::new(first)).unwrap();
        assert!(file.contains("LIST".parse().unwrap()));

        let second = riff(&[pcm_fmt(), chunk_bytes(b"data", &[2])]);
        file.read_from(Cursor::new(second)).unwrap();
        assert!(!file.contains("LIST".parse().unwrap()));
        assert!(file.contains(ChunkId::BEXT));
    }

    #[test]
    fn test_read_missing_file() {
        let mut file = WavFile::new();
        let err = file.read("/nonexistent/dir/missing.wav").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
