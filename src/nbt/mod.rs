// Copyright 2026 region-nbt developers
// SPDX-License-Identifier: GPL-3.0-or-later

//! Core NBT data structures and types.

pub mod encode;
pub mod mutf8;
pub mod parse;

use std::fmt;

use indexmap::IndexMap;

use crate::error::NbtError;
use mutf8::{decode_mutf8, encode_mutf8};

/// A string payload stored as its on-disk modified UTF-8 bytes.
///
/// Keeping the raw bytes means an unmutated string re-encodes exactly,
/// including encodings a Rust `String` cannot hold. [`NbtString::decode`]
/// produces the logical string on demand; [`NbtString::set`] replaces the
/// bytes with a re-encoding of the new value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NbtString {
    bytes: Vec<u8>,
}

impl NbtString {
    /// Wraps raw modified UTF-8 bytes without validating them.
    pub fn from_mutf8(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// The on-disk payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decodes the payload as modified UTF-8.
    pub fn decode(&self) -> Result<String, NbtError> {
        Ok(decode_mutf8(&self.bytes)?)
    }

    /// Replaces the payload with the modified UTF-8 encoding of `s`.
    pub fn set(&mut self, s: &str) {
        self.bytes = encode_mutf8(s);
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<&str> for NbtString {
    fn from(s: &str) -> Self {
        Self {
            bytes: encode_mutf8(s),
        }
    }
}

impl From<String> for NbtString {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl fmt::Display for NbtString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match decode_mutf8(&self.bytes) {
            Ok(s) => f.write_str(&s),
            Err(_) => f.write_str(&String::from_utf8_lossy(&self.bytes)),
        }
    }
}

/// Represents a Minecraft NBT (Named Binary Tag).
///
/// NBT is a tree-based storage format used by Minecraft for player data,
/// level data, and chunks. This enum covers all value-carrying tag types;
/// the End marker (id 0) only terminates wire structures and cannot be
/// constructed as a value.
#[derive(Debug, Clone, PartialEq)]
pub enum NbtTag {
    /// A single signed byte.
    Byte(i8),
    /// A 16-bit signed integer.
    Short(i16),
    /// A 32-bit signed integer.
    Int(i32),
    /// A 64-bit signed integer.
    Long(i64),
    /// A 32-bit floating point number.
    Float(f32),
    /// A 64-bit floating point number.
    Double(f64),
    /// An array of bytes.
    ByteArray(Vec<u8>),
    /// A string, kept as its on-disk modified UTF-8 bytes.
    String(NbtString),
    /// A list of tags that all share one tag id.
    List(Vec<NbtTag>),
    /// A map of named tags. Uses `IndexMap` to preserve field order.
    Compound(IndexMap<String, NbtTag>),
    /// An array of 32-bit signed integers.
    IntArray(Vec<i32>),
    /// An array of 64-bit signed integers.
    LongArray(Vec<i64>),
}

impl NbtTag {
    pub fn tag_id(&self) -> u8 {
        match self {
            NbtTag::Byte(_) => 1,
            NbtTag::Short(_) => 2,
            NbtTag::Int(_) => 3,
            NbtTag::Long(_) => 4,
            NbtTag::Float(_) => 5,
            NbtTag::Double(_) => 6,
            NbtTag::ByteArray(_) => 7,
            NbtTag::String(_) => 8,
            NbtTag::List(_) => 9,
            NbtTag::Compound(_) => 10,
            NbtTag::IntArray(_) => 11,
            NbtTag::LongArray(_) => 12,
        }
    }

    /// An empty Compound.
    pub fn compound() -> Self {
        NbtTag::Compound(IndexMap::new())
    }

    pub fn as_compound(&self) -> Option<&IndexMap<String, NbtTag>> {
        match self {
            NbtTag::Compound(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_compound_mut(&mut self) -> Option<&mut IndexMap<String, NbtTag>> {
        match self {
            NbtTag::Compound(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<NbtTag>> {
        match self {
            NbtTag::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<NbtTag>> {
        match self {
            NbtTag::List(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up a named entry, if this tag is a Compound.
    pub fn get(&self, name: &str) -> Option<&NbtTag> {
        self.as_compound().and_then(|map| map.get(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut NbtTag> {
        self.as_compound_mut().and_then(|map| map.get_mut(name))
    }

    /// Inserts a named entry, if this tag is a Compound. Returns the entry
    /// it replaced.
    pub fn insert(&mut self, name: impl Into<String>, tag: NbtTag) -> Option<NbtTag> {
        self.as_compound_mut()
            .and_then(|map| map.insert(name.into(), tag))
    }

    /// Removes a named entry, if this tag is a Compound, preserving the
    /// order of the remaining entries.
    pub fn remove(&mut self, name: &str) -> Option<NbtTag> {
        self.as_compound_mut().and_then(|map| map.shift_remove(name))
    }

    pub fn as_byte(&self) -> Option<i8> {
        match self {
            NbtTag::Byte(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_short(&self) -> Option<i16> {
        match self {
            NbtTag::Short(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            NbtTag::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            NbtTag::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            NbtTag::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            NbtTag::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&NbtString> {
        match self {
            NbtTag::String(s) => Some(s),
            _ => None,
        }
    }
}

/// A root tag paired with its name.
///
/// Every NBT document is a single named Compound; this is the unit the
/// codec reads and writes.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedTag {
    pub name: String,
    pub tag: NbtTag,
}

impl NamedTag {
    pub fn new(name: impl Into<String>, tag: NbtTag) -> Self {
        Self {
            name: name.into(),
            tag,
        }
    }

    /// Decodes one named Compound from the start of `data`.
    ///
    /// Trailing bytes are ignored; use [`parse::parse_root`] to keep the
    /// cursor.
    pub fn from_bytes(data: &[u8]) -> Result<Self, NbtError> {
        let mut input = data;
        parse::parse_root(&mut input)
    }

    /// Serializes the document, End-terminated.
    pub fn to_bytes(&self) -> Result<Vec<u8>, NbtError> {
        let mut buf = Vec::new();
        encode::write_root(&mut buf, self)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_operations() {
        let mut root = NbtTag::compound();
        root.insert("a", NbtTag::Int(1));
        root.insert("b", NbtTag::String(NbtString::from("two")));
        assert_eq!(root.get("a").and_then(NbtTag::as_int), Some(1));

        root.insert("a", NbtTag::Int(5));
        assert_eq!(root.get("a").and_then(NbtTag::as_int), Some(5));

        assert!(root.remove("a").is_some());
        assert!(root.get("a").is_none());
        assert_eq!(root.as_compound().unwrap().len(), 1);
    }

    #[test]
    fn string_mutation_reencodes() {
        let mut s = NbtString::from_mutf8(vec![b'h', b'i']);
        assert_eq!(s.decode().unwrap(), "hi");
        s.set("a\0");
        assert_eq!(s.as_bytes(), &[b'a', 0xC0, 0x80]);
    }
}
