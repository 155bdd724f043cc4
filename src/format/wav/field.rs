//! Named, typed values inside a chunk

use crate::error::{Error, Result};
use crate::util::bytes::{from_le_bytes, to_le_bytes, LeCodec};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

/// How a field's raw bytes are interpreted for display and editing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Raw bytes, shown one by one
    ByteArray,
    /// Unsigned little-endian integer
    UInt,
    /// Signed little-endian integer
    Int,
    /// Signed 16-bit little-endian integer
    Short,
    /// IEEE float
    Float,
    /// NUL-padded text (dates and times included)
    String,
    /// Opaque bytes with no interpretation
    Undefined,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::ByteArray => "bytes",
            FieldType::UInt => "uint",
            FieldType::Int => "int",
            FieldType::Short => "short",
            FieldType::Float => "float",
            FieldType::String => "text",
            FieldType::Undefined => "undefined",
        };
        f.pad(name)
    }
}

/// A field of a chunk.
///
/// `width` is the number of bytes the field occupies on disk. A width of 0
/// marks the variable field, which may only be the last field of a chunk and
/// takes whatever bytes remain in the chunk. `value` holds the raw bytes and
/// is only checked against `width` when the file is written.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    /// Display/editing type
    pub kind: FieldType,
    /// Declared width in bytes, 0 for variable
    pub width: u32,
    /// Current raw value
    pub value: Vec<u8>,
}

impl Field {
    /// Create an empty fixed-width field
    pub fn new<S: Into<String>>(name: S, kind: FieldType, width: u32) -> Self {
        Field {
            name: name.into(),
            kind,
            width,
            value: Vec::new(),
        }
    }

    /// Create an empty variable-width field
    pub fn variable<S: Into<String>>(name: S, kind: FieldType) -> Self {
        Self::new(name, kind, 0)
    }

    /// Set the initial value
    pub fn with_value(mut self, value: impl Into<Vec<u8>>) -> Self {
        self.value = value.into();
        self
    }

    /// Field name, unique within its chunk
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the declared width is the variable sentinel
    pub fn is_variable(&self) -> bool {
        self.width == 0
    }

    /// Value right-padded with zero bytes up to the declared width
    pub fn padded_value(&self) -> Vec<u8> {
        let mut out = self.value.clone();
        if out.len() < self.width as usize {
            out.resize(self.width as usize, 0);
        }
        out
    }

    /// Decode the value as a number
    pub fn number<T: LeCodec>(&self) -> Result<T> {
        from_le_bytes(&self.value)
    }

    /// Replace the value with a packed number
    pub fn set_number<T: LeCodec>(&mut self, value: T) {
        self.value = to_le_bytes(value);
    }

    /// Decode the value as text, dropping trailing NUL padding
    pub fn text(&self) -> String {
        let end = self
            .value
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |pos| pos + 1);
        String::from_utf8_lossy(&self.value[..end]).into_owned()
    }

    /// Replace the value with text bytes
    pub fn set_text(&mut self, text: &str) {
        self.value = text.as_bytes().to_vec();
    }

    /// Parse a user supplied string according to the field type and store it.
    ///
    /// Integers are packed to the declared width (or their natural width for
    /// a variable field) and rejected when they do not fit. Byte arrays and
    /// undefined fields take hex digits.
    pub fn set_from_str(&mut self, input: &str) -> Result<()> {
        self.value = match self.kind {
            FieldType::String => input.as_bytes().to_vec(),
            FieldType::ByteArray | FieldType::Undefined => parse_hex(input)?,
            FieldType::UInt => {
                let v: u64 = input.trim().parse().map_err(|_| {
                    Error::invalid_input(format!("'{}' is not an unsigned integer", input))
                })?;
                pack_truncated(&to_le_bytes(v), self.numeric_width(4), false, false, &self.name)?
            }
            FieldType::Int | FieldType::Short => {
                let natural = if self.kind == FieldType::Short { 2 } else { 4 };
                let v: i64 = input.trim().parse().map_err(|_| {
                    Error::invalid_input(format!("'{}' is not an integer", input))
                })?;
                pack_truncated(
                    &to_le_bytes(v),
                    self.numeric_width(natural),
                    true,
                    v < 0,
                    &self.name,
                )?
            }
            FieldType::Float => {
                let v: f64 = input.trim().parse().map_err(|_| {
                    Error::invalid_input(format!("'{}' is not a number", input))
                })?;
                match self.numeric_width(4) {
                    4 => to_le_bytes(v as f32),
                    8 => to_le_bytes(v),
                    other => {
                        return Err(Error::size(format!(
                            "Float field '{}' has unsupported width {}",
                            self.name, other
                        )))
                    }
                }
            }
        };
        Ok(())
    }

    fn numeric_width(&self, natural: usize) -> usize {
        if self.width == 0 {
            natural
        } else {
            self.width as usize
        }
    }

    /// Human readable rendering of the value per its type
    pub fn display_value(&self) -> String {
        let decoded = match self.kind {
            FieldType::ByteArray => Some(
                self.value
                    .iter()
                    .map(|b| b.to_string())
                    .collect::<Vec<_>>()
                    .join("-"),
            ),
            FieldType::UInt => self.number::<u32>().ok().map(|v| v.to_string()),
            FieldType::Int => self.number::<i32>().ok().map(|v| v.to_string()),
            FieldType::Short => self.number::<i16>().ok().map(|v| v.to_string()),
            FieldType::Float => self.number::<f32>().ok().map(|v| v.to_string()),
            FieldType::String => Some(self.text()),
            FieldType::Undefined => None,
        };
        decoded.unwrap_or_else(|| format!("<{} bytes>", self.value.len()))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.name, self.display_value())
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Field", 5)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("kind", &self.kind)?;
        state.serialize_field("width", &self.width)?;
        state.serialize_field("length", &self.value.len())?;
        state.serialize_field("value", &self.display_value())?;
        state.end()
    }
}

/// Keep the low `width` bytes of a little-endian number, checking that the
/// dropped bytes are pure sign/zero extension. For signed fields the top kept
/// bit must also agree with the sign.
fn pack_truncated(
    bytes: &[u8],
    width: usize,
    signed: bool,
    negative: bool,
    name: &str,
) -> Result<Vec<u8>> {
    if width > bytes.len() {
        let mut out = bytes.to_vec();
        out.resize(width, if negative { 0xFF } else { 0 });
        return Ok(out);
    }

    let fill = if negative { 0xFF } else { 0 };
    let (kept, dropped) = bytes.split_at(width);
    let high_bit = kept.last().map_or(false, |b| b & 0x80 != 0);
    let sign_ok = !signed || high_bit == negative;
    if dropped.iter().any(|&b| b != fill) || !sign_ok {
        return Err(Error::size(format!(
            "Value does not fit in the {} bytes of field '{}'",
            width, name
        )));
    }
    Ok(kept.to_vec())
}

fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let digits: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != ':')
        .collect();
    if digits.len() % 2 != 0 {
        return Err(Error::invalid_input(format!(
            "Odd number of hex digits in '{}'",
            input
        )));
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| Error::invalid_input(format!("'{}' is not valid hex", input)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_value() {
        let field = Field::new("Originator", FieldType::String, 8).with_value("abc");
        assert_eq!(field.padded_value(), b"abc\0\0\0\0\0".to_vec());

        let variable = Field::variable("CodingHistory", FieldType::String).with_value("xyz");
        assert_eq!(variable.padded_value(), b"xyz".to_vec());
    }

    #[test]
    fn test_text_strips_padding() {
        let field = Field::new("Title", FieldType::String, 6).with_value(b"hi\0\0\0\0".to_vec());
        assert_eq!(field.text(), "hi");
        assert_eq!(field.display_value(), "hi");
    }

    #[test]
    fn test_display_per_type() {
        let mut short = Field::new("LoudnessValue", FieldType::Short, 2);
        short.set_number(-25i16);
        assert_eq!(short.to_string(), "LoudnessValue : -25");

        let bytes = Field::new("SubFormat", FieldType::ByteArray, 3).with_value(vec![1, 0, 255]);
        assert_eq!(bytes.display_value(), "1-0-255");

        let opaque = Field::variable("ndef", FieldType::Undefined).with_value(vec![0; 12]);
        assert_eq!(opaque.display_value(), "<12 bytes>");

        // Value wider than the type cannot be decoded as a number
        let wide = Field::new("Odd", FieldType::Short, 4).with_value(vec![1, 2, 3, 4]);
        assert_eq!(wide.display_value(), "<4 bytes>");
    }

    #[test]
    fn test_set_from_str_integers() {
        let mut channels = Field::new("Channels", FieldType::Int, 2);
        channels.set_from_str("2").unwrap();
        assert_eq!(channels.value, vec![2, 0]);

        channels.set_from_str("-1").unwrap();
        assert_eq!(channels.value, vec![0xFF, 0xFF]);

        assert!(channels.set_from_str("70000").unwrap_err().is_size());
        assert!(channels.set_from_str("-40000").unwrap_err().is_size());
        assert!(channels.set_from_str("two").is_err());

        let mut rate = Field::new("SamplesPerSec", FieldType::UInt, 4);
        rate.set_from_str("48000").unwrap();
        assert_eq!(rate.number::<u32>().unwrap(), 48000);
    }

    #[test]
    fn test_set_from_str_signed_range() {
        let mut loudness = Field::new("LoudnessValue", FieldType::Short, 2);
        assert!(loudness.set_from_str("40000").unwrap_err().is_size());
        assert!(loudness.set_from_str("32768").unwrap_err().is_size());
        assert!(loudness.set_from_str("-32769").unwrap_err().is_size());

        loudness.set_from_str("32767").unwrap();
        assert_eq!(loudness.number::<i16>().unwrap(), i16::MAX);
        loudness.set_from_str("-32768").unwrap();
        assert_eq!(loudness.number::<i16>().unwrap(), i16::MIN);

        // Unsigned fields may use the top bit
        let mut rate = Field::new("TimeReferenceLow", FieldType::UInt, 2);
        rate.set_from_str("40000").unwrap();
        assert_eq!(rate.number::<u16>().unwrap(), 40000);
        assert!(rate.set_from_str("70000").unwrap_err().is_size());
    }

    #[test]
    fn test_set_from_str_other_types() {
        let mut umid = Field::new("UMID", FieldType::ByteArray, 4);
        umid.set_from_str("de-ad-be-ef").unwrap();
        assert_eq!(umid.value, vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(umid.set_from_str("abc").is_err());

        let mut gain = Field::new("Gain", FieldType::Float, 4);
        gain.set_from_str("0.5").unwrap();
        assert_eq!(gain.number::<f32>().unwrap(), 0.5);

        let mut tag = Field::variable("TagText", FieldType::String);
        tag.set_from_str("blahblah").unwrap();
        assert_eq!(tag.value, b"blahblah".to_vec());
    }

    #[test]
    fn test_serialize_field() {
        let field = Field::new("SampleLength", FieldType::Int, 4).with_value(vec![10, 0, 0, 0]);
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["name"], "SampleLength");
        assert_eq!(json["kind"], "int");
        assert_eq!(json["width"], 4);
        assert_eq!(json["value"], "10");
    }
}
