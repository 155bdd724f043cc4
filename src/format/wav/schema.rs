//! Built-in chunk schemas
//!
//! Layouts follow the WAVE format chunk (including the extensible tail), the
//! EBU Tech 3285 broadcast extension and the AES46 cart chunk.

use super::chunk::Chunk;
use super::field::{Field, FieldType};
use super::{ChunkId, MAX_CHUNK_SIZE};
use crate::error::{Error, Result};

/// Name of the single field of opaque chunks
pub const OPAQUE_FIELD: &str = "ndef";

/// Name of the single field of the `data` chunk
pub const PAYLOAD_FIELD: &str = "payload";

const FMT_FIELDS: &[(&str, FieldType, u32)] = &[
    ("FormatTag", FieldType::Int, 2),
    ("Channels", FieldType::Int, 2),
    ("SamplesPerSec", FieldType::Int, 4),
    ("AvgBytesPerSec", FieldType::Int, 4),
    ("BlockAlign", FieldType::Int, 2),
    ("BitsPerSample", FieldType::Int, 2),
    ("Size", FieldType::Int, 2),
    ("ValidBitsPerSample", FieldType::Int, 2),
    ("ChannelMask", FieldType::Int, 4),
    ("SubFormat", FieldType::ByteArray, 16),
];

const FACT_FIELDS: &[(&str, FieldType, u32)] = &[("SampleLength", FieldType::Int, 4)];

const BEXT_FIELDS: &[(&str, FieldType, u32)] = &[
    ("Description", FieldType::String, 256),
    ("Originator", FieldType::String, 32),
    ("OriginatorReference", FieldType::String, 32),
    ("OriginationDate", FieldType::String, 10),
    ("OriginationTime", FieldType::String, 8),
    ("TimeReferenceLow", FieldType::UInt, 4),
    ("TimeReferenceHigh", FieldType::UInt, 4),
    ("Version", FieldType::Int, 2),
    ("UMID", FieldType::ByteArray, 64),
    ("LoudnessValue", FieldType::Short, 2),
    ("LoudnessRange", FieldType::Short, 2),
    ("MaxTruePeakLevel", FieldType::Short, 2),
    ("MaxMomentaryLoudness", FieldType::Short, 2),
    ("MaxShortTermLoudness", FieldType::Short, 2),
    ("Reserved", FieldType::Undefined, 180),
    ("CodingHistory", FieldType::String, 0),
];

const CART_FIELDS: &[(&str, FieldType, u32)] = &[
    ("Version", FieldType::String, 4),
    ("Title", FieldType::String, 64),
    ("Artist", FieldType::String, 64),
    ("CutID", FieldType::String, 64),
    ("ClientID", FieldType::String, 64),
    ("Category", FieldType::String, 64),
    ("Classification", FieldType::String, 64),
    ("OutCue", FieldType::String, 64),
    ("StartDate", FieldType::String, 10),
    ("StartTime", FieldType::String, 8),
    ("EndDate", FieldType::String, 10),
    ("EndTime", FieldType::String, 8),
    ("ProducerAppID", FieldType::String, 64),
    ("ProducerAppVersion", FieldType::String, 64),
    ("UserDef", FieldType::String, 64),
    ("LevelReference", FieldType::String, 4),
    ("PostTimer", FieldType::String, 8),
    ("Reserved", FieldType::String, 276),
    ("URL", FieldType::String, 1024),
    ("TagText", FieldType::String, 0),
];

// Static layouts: unique names, variable field last, far below the size cap
fn build(id: ChunkId, layout: &[(&str, FieldType, u32)]) -> Chunk {
    let mut chunk = Chunk::new(id);
    for &(name, kind, width) in layout {
        chunk.push_field(Field::new(name, kind, width));
    }
    chunk
}

fn body_width(id: ChunkId, body: &[u8]) -> Result<u32> {
    u32::try_from(body.len())
        .ok()
        .filter(|&width| width <= MAX_CHUNK_SIZE)
        .ok_or_else(|| {
            Error::size(format!(
                "Body of {} bytes is too large for chunk '{}'",
                body.len(),
                id
            ))
        })
}

/// `fmt ` chunk: 40 bytes including the extensible-format tail
pub fn fmt() -> Chunk {
    build(ChunkId::FMT, FMT_FIELDS)
}

/// `fact` chunk: sample length for non-PCM data
pub fn fact() -> Chunk {
    build(ChunkId::FACT, FACT_FIELDS)
}

/// `bext` broadcast extension chunk, ending in the variable coding history
pub fn bext() -> Chunk {
    build(ChunkId::BEXT, BEXT_FIELDS)
}

/// `cart` chunk, ending in the variable tag text
pub fn cart() -> Chunk {
    build(ChunkId::CART, CART_FIELDS)
}

/// `data` chunk: one variable field holding the raw audio
pub fn data() -> Chunk {
    build(ChunkId::DATA, &[(PAYLOAD_FIELD, FieldType::Undefined, 0)])
}

/// `data` chunk holding `payload`
pub fn data_with(payload: Vec<u8>) -> Result<Chunk> {
    let width = body_width(ChunkId::DATA, &payload)?;
    let mut chunk = data();
    let field = &mut chunk.fields_mut()[0];
    field.width = width;
    field.value = payload;
    Ok(chunk)
}

/// Single-field chunk for an id with no schema, holding `body` verbatim
pub fn undefined(id: ChunkId, body: Vec<u8>) -> Result<Chunk> {
    let width = body_width(id, &body)?;
    let mut chunk = build(id, &[(OPAQUE_FIELD, FieldType::Undefined, 0)]);
    let field = &mut chunk.fields_mut()[0];
    field.width = width;
    field.value = body;
    chunk.mark_undefined();
    Ok(chunk)
}

/// All built-in schemas, in no particular order
pub fn builtin() -> Vec<Chunk> {
    vec![fmt(), fact(), bext(), cart(), data()]
}
