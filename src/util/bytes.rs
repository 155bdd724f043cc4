//! Little-endian packing of numeric values into raw field bytes
//!
//! Field values are stored as raw byte strings. These helpers convert between
//! fixed-width numbers and those strings independently of host byte order.

use crate::error::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};

/// Widest value the codec handles
pub const MAX_WIDTH: usize = 8;

/// A fixed-width number with a little-endian byte representation
pub trait LeCodec: Sized + Copy {
    /// Number of bytes in the encoded form
    const WIDTH: usize;

    /// Encode into `buf`, which is exactly `WIDTH` bytes long
    fn encode(self, buf: &mut [u8]);

    /// Decode from `buf`, which is exactly `WIDTH` bytes long
    fn decode(buf: &[u8]) -> Self;
}

impl LeCodec for u8 {
    const WIDTH: usize = 1;

    fn encode(self, buf: &mut [u8]) {
        buf[0] = self;
    }

    fn decode(buf: &[u8]) -> Self {
        buf[0]
    }
}

impl LeCodec for i8 {
    const WIDTH: usize = 1;

    fn encode(self, buf: &mut [u8]) {
        buf[0] = self as u8;
    }

    fn decode(buf: &[u8]) -> Self {
        buf[0] as i8
    }
}

macro_rules! le_codec {
    ($ty:ty, $width:expr, $write:ident, $read:ident) => {
        impl LeCodec for $ty {
            const WIDTH: usize = $width;

            fn encode(self, buf: &mut [u8]) {
                LittleEndian::$write(buf, self);
            }

            fn decode(buf: &[u8]) -> Self {
                LittleEndian::$read(buf)
            }
        }
    };
}

le_codec!(u16, 2, write_u16, read_u16);
le_codec!(i16, 2, write_i16, read_i16);
le_codec!(u32, 4, write_u32, read_u32);
le_codec!(i32, 4, write_i32, read_i32);
le_codec!(u64, 8, write_u64, read_u64);
le_codec!(i64, 8, write_i64, read_i64);
le_codec!(f32, 4, write_f32, read_f32);
le_codec!(f64, 8, write_f64, read_f64);

/// Pack a number into its little-endian bytes
pub fn to_le_bytes<T: LeCodec>(value: T) -> Vec<u8> {
    let mut out = vec![0u8; T::WIDTH];
    value.encode(&mut out);
    out
}

/// Unpack a number from little-endian bytes.
///
/// Inputs shorter than the type are zero-extended, so an empty field decodes
/// to zero. Inputs longer than the type are rejected.
pub fn from_le_bytes<T: LeCodec>(bytes: &[u8]) -> Result<T> {
    if bytes.len() > T::WIDTH {
        return Err(Error::size(format!(
            "{} bytes cannot be unpacked into a {}-byte value",
            bytes.len(),
            T::WIDTH
        )));
    }

    let mut buf = [0u8; MAX_WIDTH];
    buf[..bytes.len()].copy_from_slice(bytes);
    Ok(T::decode(&buf[..T::WIDTH]))
}
