//! wavedit CLI - inspect and edit WAV chunk metadata
//!
//! A command-line tool for viewing and changing fields of WAV chunks

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use wavedit_lib::format::wav::schema;
use wavedit_lib::format::{ChunkId, WavFile};
use wavedit_lib::{init, Config};

#[derive(Parser)]
#[command(name = "wavedit")]
#[command(about = "wavedit - lossless WAV chunk editor", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every chunk of a WAV file
    Info {
        /// Input file path
        input: PathBuf,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Set one field and write the result
    Set {
        /// Input file path
        input: PathBuf,

        /// Output file path
        output: PathBuf,

        /// Chunk id (e.g. bext, cart, "fmt ")
        #[arg(short, long)]
        chunk: String,

        /// Field name (e.g. LoudnessValue, TagText)
        #[arg(short, long)]
        field: String,

        /// New value, parsed according to the field type
        #[arg(long, allow_hyphen_values = true)]
        value: String,

        /// Drop chunks that have no schema
        #[arg(long)]
        drop_undefined: bool,
    },

    /// Remove a chunk and write the result
    Remove {
        /// Input file path
        input: PathBuf,

        /// Output file path
        output: PathBuf,

        /// Chunk id to remove
        #[arg(short, long)]
        chunk: String,

        /// Drop chunks that have no schema
        #[arg(long)]
        drop_undefined: bool,
    },

    /// Read a file and write it back out
    Copy {
        /// Input file path
        input: PathBuf,

        /// Output file path
        output: PathBuf,

        /// Drop chunks that have no schema
        #[arg(long)]
        drop_undefined: bool,
    },

    /// List the built-in chunk schemas
    Schemas,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init(Config {
        verbose: cli.verbose,
        debug: cli.debug,
    })?;

    info!("wavedit v{}", wavedit_lib::VERSION);

    match cli.command {
        Commands::Info { input, json } => cmd_info(&input, json)?,
        Commands::Set {
            input,
            output,
            chunk,
            field,
            value,
            drop_undefined,
        } => cmd_set(&input, &output, &chunk, &field, &value, drop_undefined)?,
        Commands::Remove {
            input,
            output,
            chunk,
            drop_undefined,
        } => cmd_remove(&input, &output, &chunk, drop_undefined)?,
        Commands::Copy {
            input,
            output,
            drop_undefined,
        } => {
            let mut wav = open(&input)?;
            save(&mut wav, &output, drop_undefined)?;
        }
        Commands::Schemas => cmd_schemas(),
    }

    Ok(())
}

fn open(input: &Path) -> anyhow::Result<WavFile> {
    let mut wav = WavFile::new();
    wav.read(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    Ok(wav)
}

fn save(wav: &mut WavFile, output: &Path, drop_undefined: bool) -> anyhow::Result<()> {
    wav.write(output, !drop_undefined)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Wrote {}", output.display());
    Ok(())
}

fn cmd_info(input: &Path, json: bool) -> anyhow::Result<()> {
    let wav = open(input)?;

    if json {
        let chunks: Vec<_> = wav.chunks().collect();
        println!("{}", serde_json::to_string_pretty(&chunks)?);
        return Ok(());
    }

    println!("File: {}", input.display());
    println!("RIFF size: {}", wav.envelope().declared_size);
    if let Ok(format) = wav.format() {
        let data_size = wav.payload().len();
        println!("Format: {:?}", format.format_tag);
        println!("  Channels: {}", format.channels);
        println!("  Sample Rate: {} Hz", format.sample_rate);
        println!("  Bits Per Sample: {}", format.bits_per_sample);
        println!("  Samples: {}", format.num_samples(data_size));
        println!("  Duration: {:.2}s", format.duration_seconds(data_size));
    }
    println!();

    for chunk in wav.chunks() {
        if chunk.is_undefined() {
            println!("(no schema for '{}', kept as raw bytes)", chunk.id());
        }
        print!("{}", chunk);
    }

    Ok(())
}

fn cmd_set(
    input: &Path,
    output: &Path,
    chunk: &str,
    field: &str,
    value: &str,
    drop_undefined: bool,
) -> anyhow::Result<()> {
    let id: ChunkId = chunk.parse()?;
    let mut wav = open(input)?;

    let target = wav.chunk_mut(id)?.field_mut(field)?;
    target.set_from_str(value)?;
    info!("Set {}.{} = {}", id, field, target.display_value());

    save(&mut wav, output, drop_undefined)
}

fn cmd_remove(
    input: &Path,
    output: &Path,
    chunk: &str,
    drop_undefined: bool,
) -> anyhow::Result<()> {
    let id: ChunkId = chunk.parse()?;
    let mut wav = open(input)?;
    wav.remove_chunk(id)?;
    save(&mut wav, output, drop_undefined)
}

fn cmd_schemas() {
    for chunk in schema::builtin() {
        let size = if chunk.is_variable() {
            format!("{}+ bytes", chunk.schema_size())
        } else {
            format!("{} bytes", chunk.schema_size())
        };
        println!("'{}' ({})", chunk.id(), size);
        for field in chunk.fields() {
            let width = if field.is_variable() {
                "variable".to_string()
            } else {
                field.width.to_string()
            };
            println!("  {:<24} {:<10} {}", field.name(), field.kind, width);
        }
    }
}
