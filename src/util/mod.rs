//! Common utilities

pub mod bytes;

pub use bytes::{from_le_bytes, to_le_bytes, LeCodec};
