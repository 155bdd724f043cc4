//! RIFF envelope and format chunk views

use super::chunk::Chunk;
use super::{ChunkId, ID_SIZE};
use crate::error::{Error, Result};
use std::io::Read;

/// WAV format tag identifying the codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatTag {
    /// PCM (uncompressed)
    Pcm,
    /// IEEE Float
    IeeeFloat,
    /// A-Law
    ALaw,
    /// Mu-Law
    MuLaw,
    /// Extensible format
    Extensible,
    /// Unknown format
    Unknown(u16),
}

impl From<u16> for FormatTag {
    fn from(val: u16) -> Self {
        match val {
            0x0001 => FormatTag::Pcm,
            0x0003 => FormatTag::IeeeFloat,
            0x0006 => FormatTag::ALaw,
            0x0007 => FormatTag::MuLaw,
            0xFFFE => FormatTag::Extensible,
            other => FormatTag::Unknown(other),
        }
    }
}

impl From<FormatTag> for u16 {
    fn from(tag: FormatTag) -> Self {
        match tag {
            FormatTag::Pcm => 0x0001,
            FormatTag::IeeeFloat => 0x0003,
            FormatTag::ALaw => 0x0006,
            FormatTag::MuLaw => 0x0007,
            FormatTag::Extensible => 0xFFFE,
            FormatTag::Unknown(val) => val,
        }
    }
}

/// The outer `RIFF <size> WAVE` header framing the chunk sequence.
///
/// It is not a chunk: it has no fields to edit and is never reset. The
/// declared size is whatever the file said on read and is recomputed on
/// every write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope {
    /// Size declared after the magic (file length - 8)
    pub declared_size: u32,
    /// Form type, always `WAVE`
    pub form: ChunkId,
}

impl Envelope {
    /// Length of the envelope on disk
    pub const SIZE: usize = 12;

    /// Envelope for a WAVE form of the given size
    pub fn new(declared_size: u32) -> Self {
        Envelope {
            declared_size,
            form: ChunkId::WAVE,
        }
    }

    /// Read and verify the envelope
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut riff_header = [0u8; Self::SIZE];
        reader
            .read_exact(&mut riff_header)
            .map_err(|e| Error::format(format!("Failed to read RIFF header: {}", e)))?;

        // Verify RIFF magic
        if riff_header[0..4] != ChunkId::RIFF.0 {
            return Err(Error::format("Not a RIFF compliant file format"));
        }

        // Verify WAVE magic
        if riff_header[8..12] != ChunkId::WAVE.0 {
            return Err(Error::format("Not an adequate WAVE file format"));
        }

        let declared_size = u32::from_le_bytes([
            riff_header[4],
            riff_header[5],
            riff_header[6],
            riff_header[7],
        ]);

        Ok(Envelope::new(declared_size))
    }

    /// Convert to bytes for writing
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..ID_SIZE].copy_from_slice(&ChunkId::RIFF.0);
        bytes[4..8].copy_from_slice(&self.declared_size.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.form.0);
        bytes
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Envelope::new(ID_SIZE as u32)
    }
}

/// Decoded view of the leading `fmt ` fields
#[derive(Debug, Clone)]
pub struct WavFormat {
    /// Format tag (codec ID)
    pub format_tag: FormatTag,
    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u16,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Average bytes per second
    pub byte_rate: u32,
    /// Block alignment
    pub block_align: u16,
    /// Bits per sample
    pub bits_per_sample: u16,
}

impl WavFormat {
    /// Decode from a `fmt ` chunk. Empty fields decode as zero.
    pub fn from_chunk(chunk: &Chunk) -> Result<Self> {
        Ok(WavFormat {
            format_tag: chunk.field("FormatTag")?.number::<u16>()?.into(),
            channels: chunk.field("Channels")?.number()?,
            sample_rate: chunk.field("SamplesPerSec")?.number()?,
            byte_rate: chunk.field("AvgBytesPerSec")?.number()?,
            block_align: chunk.field("BlockAlign")?.number()?,
            bits_per_sample: chunk.field("BitsPerSample")?.number()?,
        })
    }

    /// Duration in seconds of `data_size` bytes of audio
    pub fn duration_seconds(&self, data_size: usize) -> f64 {
        if self.byte_rate == 0 {
            return 0.0;
        }
        data_size as f64 / self.byte_rate as f64
    }

    /// Number of sample frames in `data_size` bytes of audio
    pub fn num_samples(&self, data_size: usize) -> u64 {
        if self.block_align == 0 {
            return 0;
        }
        data_size as u64 / self.block_align as u64
    }
}
