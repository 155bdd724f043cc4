//! wavedit - lossless WAV chunk editing written in Rust
//!
//! wavedit reads a WAV file into a registry of chunks, lets callers inspect
//! and change individual fields of the known chunks (`fmt `, `fact`, `bext`,
//! `cart`), and writes the file back. Chunks without a schema are kept as
//! opaque bytes so nothing is lost on the way through.
//!
//! # Architecture
//!
//! - `format`: RIFF/WAV chunk schemas, reader and writer
//! - `util`: little-endian packing of field values
//!
//! ```no_run
//! use wavedit_lib::format::{ChunkId, WavFile};
//!
//! # fn main() -> wavedit_lib::Result<()> {
//! let mut wav = WavFile::new();
//! wav.read("in.wav")?;
//! wav.chunk_mut(ChunkId::BEXT)?
//!     .field_mut("LoudnessValue")?
//!     .set_number(25i16);
//! wav.write("out.wav", false)?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod format;
pub mod util;

pub use error::{Error, Result};

/// wavedit version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const VERSION_MAJOR: u32 = 0;
pub const VERSION_MINOR: u32 = 1;
pub const VERSION_PATCH: u32 = 0;

/// Configuration for the wavedit library
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Enable verbose logging
    pub verbose: bool,
    /// Enable debug output
    pub debug: bool,
}

/// Initialize the wavedit library with the given configuration
pub fn init(config: Config) -> Result<()> {
    // Initialize logging
    if config.verbose || config.debug {
        let level = if config.debug { "debug" } else { "info" };
        tracing_subscriber::fmt()
            .with_env_filter(level)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| Error::Init(format!("Failed to initialize logging: {}", e)))?;
    }

    Ok(())
}
