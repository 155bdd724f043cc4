//! Chunk schemas: ordered fields under a four-character id

use super::field::Field;
use super::{ChunkId, MAX_CHUNK_SIZE};
use crate::error::{Error, Result};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// A RIFF chunk described by an ordered list of fields.
///
/// `schema_size` is the sum of the declared field widths at definition time.
/// `actual_size` is only meaningful after a write, when it holds the number
/// of body bytes emitted for the chunk.
#[derive(Debug, Clone)]
pub struct Chunk {
    id: ChunkId,
    fields: Vec<Field>,
    index: HashMap<String, usize>,
    schema_size: u32,
    actual_size: u32,
    variable: bool,
    undefined: bool,
}

impl Chunk {
    /// Create a chunk with no fields
    pub fn new(id: ChunkId) -> Self {
        Chunk {
            id,
            fields: Vec::new(),
            index: HashMap::new(),
            schema_size: 0,
            actual_size: 0,
            variable: false,
            undefined: false,
        }
    }

    /// Create a chunk from fields in wire order
    pub fn with_fields(id: ChunkId, fields: impl IntoIterator<Item = Field>) -> Result<Self> {
        let mut chunk = Chunk::new(id);
        for field in fields {
            chunk.add_field(field)?;
        }
        Ok(chunk)
    }

    /// Append a field to the schema.
    ///
    /// A variable field (width 0) must be the last one: once the chunk holds
    /// one, no more fields can be added.
    pub fn add_field(&mut self, field: Field) -> Result<()> {
        if self.variable {
            return Err(Error::schema(format!(
                "Chunk '{}' ends with a variable field; cannot add '{}'",
                self.id,
                field.name()
            )));
        }

        if self.index.contains_key(field.name()) {
            return Err(Error::schema(format!(
                "Chunk '{}' already has a field named '{}'",
                self.id,
                field.name()
            )));
        }

        self.schema_size
            .checked_add(field.width)
            .filter(|&size| size <= MAX_CHUNK_SIZE)
            .ok_or_else(|| {
                Error::size(format!(
                    "Chunk '{}' would exceed the maximum chunk size of {} bytes",
                    self.id, MAX_CHUNK_SIZE
                ))
            })?;

        self.push_field(field);
        Ok(())
    }

    /// Append a field without the ordering, uniqueness and size checks of
    /// `add_field`. Only for layouts known to satisfy them.
    pub(crate) fn push_field(&mut self, field: Field) {
        self.schema_size = self.schema_size.saturating_add(field.width);
        if field.is_variable() {
            self.variable = true;
        }
        self.index.insert(field.name().to_string(), self.fields.len());
        self.fields.push(field);
    }

    /// Chunk id
    pub fn id(&self) -> ChunkId {
        self.id
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Result<&Field> {
        self.index
            .get(name)
            .map(|&i| &self.fields[i])
            .ok_or_else(|| self.missing(name))
    }

    /// Look up a field by name for modification
    pub fn field_mut(&mut self, name: &str) -> Result<&mut Field> {
        match self.index.get(name) {
            Some(&i) => Ok(&mut self.fields[i]),
            None => Err(self.missing(name)),
        }
    }

    fn missing(&self, name: &str) -> Error {
        Error::not_found(format!("Field '{}' in chunk '{}'", name, self.id))
    }

    /// All fields in wire order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// All fields in wire order, mutable. Names cannot be changed through this.
    pub fn fields_mut(&mut self) -> &mut [Field] {
        &mut self.fields
    }

    /// Sum of declared widths at definition time
    pub fn schema_size(&self) -> u32 {
        self.schema_size
    }

    /// Body size computed by the last write
    pub fn actual_size(&self) -> u32 {
        self.actual_size
    }

    pub(crate) fn clear_actual_size(&mut self) {
        self.actual_size = 0;
    }

    /// Add to the running body size
    pub fn add_to_actual_size(&mut self, delta: u32) {
        self.actual_size = self.actual_size.saturating_add(delta);
    }

    /// Whether the last field is variable
    pub fn is_variable(&self) -> bool {
        self.variable
    }

    /// Whether the chunk was discovered during a read with no schema
    pub fn is_undefined(&self) -> bool {
        self.undefined
    }

    pub(crate) fn mark_undefined(&mut self) {
        self.undefined = true;
    }

    /// Clear values and sizes, ready for a fresh read
    pub fn reset(&mut self) {
        self.actual_size = 0;
        for field in &mut self.fields {
            field.value.clear();
        }
        if self.variable {
            if let Some(last) = self.fields.last_mut() {
                last.width = 0;
            }
        }
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "---------- {} chunk ----------", self.id)?;
        if self.id == ChunkId::DATA {
            let len: usize = self.fields.iter().map(|field| field.value.len()).sum();
            return writeln!(f, "<{} bytes of audio>", len);
        }
        for field in &self.fields {
            writeln!(f, "{}", field)?;
        }
        Ok(())
    }
}

impl Serialize for Chunk {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Chunk", 4)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("undefined", &self.undefined)?;
        state.serialize_field("schema_size", &self.schema_size)?;
        state.serialize_field("fields", &self.fields)?;
        state.end()
    }
}
