//! Container format handling
//!
//! This module provides functionality for reading and writing RIFF
//! containers. WAV is the only form supported.

pub mod wav;

pub use wav::{Chunk, ChunkId, Field, FieldType, WavFile};
