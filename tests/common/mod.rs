//! Common test utilities for wavedit integration tests
//!
//! Helpers that assemble WAV files byte by byte, independent of the writer
//! under test.

#![allow(dead_code)]

use std::path::Path;

// ============================================================================
// Chunk Assembly
// ============================================================================

/// Encode one chunk: id, little-endian length, body
pub fn chunk(id: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut out = id.to_vec();
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(body);
    out
}

/// Wrap chunks in a RIFF/WAVE envelope with a correct declared size
pub fn riff(chunks: &[Vec<u8>]) -> Vec<u8> {
    let body = chunks.concat();
    let mut out = b"RIFF".to_vec();
    out.extend_from_slice(&(body.len() as u32 + 4).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(&body);
    out
}

/// 16-byte PCM `fmt ` body
pub fn pcm_fmt_body(channels: u16, sample_rate: u32, bits_per_sample: u16) -> Vec<u8> {
    let block_align = channels * (bits_per_sample / 8);
    let byte_rate = sample_rate * block_align as u32;

    let mut body = Vec::with_capacity(16);
    body.extend_from_slice(&1u16.to_le_bytes());
    body.extend_from_slice(&channels.to_le_bytes());
    body.extend_from_slice(&sample_rate.to_le_bytes());
    body.extend_from_slice(&byte_rate.to_le_bytes());
    body.extend_from_slice(&block_align.to_le_bytes());
    body.extend_from_slice(&bits_per_sample.to_le_bytes());
    body
}

/// 40-byte `fmt ` body with the given format tag
pub fn full_fmt_body(format_tag: u16) -> Vec<u8> {
    let mut body = pcm_fmt_body(2, 48000, 16);
    body[0..2].copy_from_slice(&format_tag.to_le_bytes());
    body.resize(40, 0);
    body
}

/// 16-bit stereo sine, `frames` sample frames long
pub fn sine_samples(frames: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(frames * 4);
    for i in 0..frames {
        let t = i as f64 / 44100.0;
        let sample = ((2.0 * std::f64::consts::PI * 440.0 * t).sin() * 0.5 * i16::MAX as f64) as i16;
        data.extend_from_slice(&sample.to_le_bytes());
        data.extend_from_slice(&sample.to_le_bytes());
    }
    data
}

/// `bext` body: fixed part with a description, followed by `history`
pub fn bext_body(description: &str, history: &str) -> Vec<u8> {
    let mut body = vec![0u8; 602];
    body[..description.len()].copy_from_slice(description.as_bytes());
    body.extend_from_slice(history.as_bytes());
    body
}

/// A PCM WAV with a bext chunk, an unknown LIST chunk and JUNK padding
pub fn broadcast_wav() -> Vec<u8> {
    riff(&[
        chunk(b"JUNK", &[0u8; 28]),
        chunk(b"fmt ", &pcm_fmt_body(2, 44100, 16)),
        chunk(b"bext", &bext_body("Field recording", "A=PCM,F=44100,W=16\r\n")),
        chunk(b"LIST", b"INFOISFT\x06\x00\x00\x00tool\x00\x00"),
        chunk(b"data", &sine_samples(256)),
    ])
}

/// Locate the first chunk with `id` in a RIFF file, returning (length, body)
pub fn find_chunk<'a>(bytes: &'a [u8], id: &[u8; 4]) -> Option<(u32, &'a [u8])> {
    let mut pos = 12;
    while pos + 8 <= bytes.len() {
        let len = u32::from_le_bytes([bytes[pos + 4], bytes[pos + 5], bytes[pos + 6], bytes[pos + 7]]);
        let end = (pos + 8 + len as usize).min(bytes.len());
        if &bytes[pos..pos + 4] == id {
            return Some((len, &bytes[pos + 8..end]));
        }
        pos = end;
    }
    None
}

/// Chunk ids of a RIFF file, in file order
pub fn chunk_ids(bytes: &[u8]) -> Vec<String> {
    let mut ids = Vec::new();
    let mut pos = 12;
    while pos + 8 <= bytes.len() {
        let len = u32::from_le_bytes([bytes[pos + 4], bytes[pos + 5], bytes[pos + 6], bytes[pos + 7]]);
        ids.push(String::from_utf8_lossy(&bytes[pos..pos + 4]).into_owned());
        pos += 8 + len as usize;
    }
    ids
}

/// Write bytes to `path`
pub fn write_file(path: &Path, bytes: &[u8]) {
    std::fs::write(path, bytes).expect("Failed to write test file");
}
