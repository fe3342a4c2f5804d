// Copyright 2026 region-nbt developers
// SPDX-License-Identifier: GPL-3.0-or-later

//! Manual NBT decoding from byte slices.

use indexmap::IndexMap;

use crate::error::NbtError;
use crate::nbt::mutf8::decode_mutf8;
use crate::nbt::{NamedTag, NbtString, NbtTag};

/// A reader that maintains a cursor over a byte slice for manual parsing.
pub struct ByteReader<'a> {
    /// The remaining data to be read.
    pub data: &'a [u8],
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    #[inline]
    fn read_u8(&mut self) -> Result<u8, NbtError> {
        if self.data.is_empty() {
            return Err(NbtError::TruncatedStream);
        }
        let b = self.data[0];
        self.data = &self.data[1..];
        Ok(b)
    }

    #[inline]
    fn read_i8(&mut self) -> Result<i8, NbtError> {
        self.read_u8().map(|b| b as i8)
    }

    #[inline]
    fn read_u16(&mut self) -> Result<u16, NbtError> {
        if self.data.len() < 2 {
            return Err(NbtError::TruncatedStream);
        }
        let bytes = [self.data[0], self.data[1]];
        self.data = &self.data[2..];
        Ok(u16::from_be_bytes(bytes))
    }

    #[inline]
    fn read_i16(&mut self) -> Result<i16, NbtError> {
        self.read_u16().map(|v| v as i16)
    }

    #[inline]
    fn read_i32(&mut self) -> Result<i32, NbtError> {
        if self.data.len() < 4 {
            return Err(NbtError::TruncatedStream);
        }
        let bytes = [self.data[0], self.data[1], self.data[2], self.data[3]];
        self.data = &self.data[4..];
        Ok(i32::from_be_bytes(bytes))
    }

    #[inline]
    fn read_i64(&mut self) -> Result<i64, NbtError> {
        if self.data.len() < 8 {
            return Err(NbtError::TruncatedStream);
        }
        let bytes: [u8; 8] = self.data[..8].try_into().unwrap();
        self.data = &self.data[8..];
        Ok(i64::from_be_bytes(bytes))
    }

    #[inline]
    fn read_f32(&mut self) -> Result<f32, NbtError> {
        self.read_i32().map(|v| f32::from_bits(v as u32))
    }

    #[inline]
    fn read_f64(&mut self) -> Result<f64, NbtError> {
        self.read_i64().map(|v| f64::from_bits(v as u64))
    }

    #[inline]
    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], NbtError> {
        if self.data.len() < len {
            return Err(NbtError::TruncatedStream);
        }
        let bytes = &self.data[..len];
        self.data = &self.data[len..];
        Ok(bytes)
    }

    /// Reads an array length prefix, rejecting negative values.
    #[inline]
    fn read_len(&mut self) -> Result<usize, NbtError> {
        let len = self.read_i32()?;
        if len < 0 {
            return Err(NbtError::MalformedLength(len));
        }
        Ok(len as usize)
    }
}

/// Parses a length-prefixed string payload, keeping its raw bytes.
pub fn parse_string(reader: &mut ByteReader) -> Result<NbtString, NbtError> {
    let len = reader.read_u16()? as usize;
    let bytes = reader.read_bytes(len)?;
    Ok(NbtString::from_mutf8(bytes.to_vec()))
}

/// Parses a length-prefixed tag name as a logical string.
fn parse_name(reader: &mut ByteReader) -> Result<String, NbtError> {
    let len = reader.read_u16()? as usize;
    let bytes = reader.read_bytes(len)?;
    Ok(decode_mutf8(bytes)?)
}

/// Parses the payload of an NBT tag based on its type id.
pub fn parse_payload(reader: &mut ByteReader, type_id: u8) -> Result<NbtTag, NbtError> {
    match type_id {
        1 => Ok(NbtTag::Byte(reader.read_i8()?)),
        2 => Ok(NbtTag::Short(reader.read_i16()?)),
        3 => Ok(NbtTag::Int(reader.read_i32()?)),
        4 => Ok(NbtTag::Long(reader.read_i64()?)),
        5 => Ok(NbtTag::Float(reader.read_f32()?)),
        6 => Ok(NbtTag::Double(reader.read_f64()?)),
        7 => {
            let len = reader.read_len()?;
            let bytes = reader.read_bytes(len)?;
            Ok(NbtTag::ByteArray(bytes.to_vec()))
        }
        8 => Ok(NbtTag::String(parse_string(reader)?)),
        9 => {
            let element_type = reader.read_u8()?;
            let len = reader.read_i32()?;
            if len <= 0 {
                // Empty lists may declare element type 0 (End).
                return Ok(NbtTag::List(Vec::new()));
            }
            if element_type == 0 {
                return Err(NbtError::MalformedLength(len));
            }
            let len = len as usize;
            let mut elements = Vec::with_capacity(len.min(1 << 16));
            for _ in 0..len {
                elements.push(parse_payload(reader, element_type)?);
            }
            Ok(NbtTag::List(elements))
        }
        10 => {
            let mut map = IndexMap::new();
            loop {
                let tag_type = reader.read_u8()?;
                if tag_type == 0 {
                    break;
                }
                let name = parse_name(reader)?;
                let payload = parse_payload(reader, tag_type)?;
                map.insert(name, payload);
            }
            Ok(NbtTag::Compound(map))
        }
        11 => {
            let len = reader.read_len()?;
            let bytes = reader.read_bytes(len * 4)?;
            let mut ints = Vec::with_capacity(len);
            for chunk in bytes.chunks_exact(4) {
                ints.push(i32::from_be_bytes(chunk.try_into().unwrap()));
            }
            Ok(NbtTag::IntArray(ints))
        }
        12 => {
            let len = reader.read_len()?;
            let bytes = reader.read_bytes(len * 8)?;
            let mut longs = Vec::with_capacity(len);
            for chunk in bytes.chunks_exact(8) {
                longs.push(i64::from_be_bytes(chunk.try_into().unwrap()));
            }
            Ok(NbtTag::LongArray(longs))
        }
        _ => Err(NbtError::UnknownTagId(type_id)),
    }
}

/// Parses one named root Compound from the input.
///
/// This is the entry point for decoding top-level NBT data (like a
/// `level.dat` body or a decompressed chunk). On success, `input` is
/// advanced past the document.
pub fn parse_root(input: &mut &[u8]) -> Result<NamedTag, NbtError> {
    let mut reader = ByteReader::new(input);
    let tag_type = reader.read_u8()?;
    if tag_type != 10 {
        return Err(NbtError::InvalidRoot(tag_type));
    }
    let name = parse_name(&mut reader)?;
    let tag = parse_payload(&mut reader, 10)?;
    *input = reader.data;
    Ok(NamedTag { name, tag })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_string_payload() {
        let data = vec![0, 3, b'h', b'i', b'!'];
        let mut reader = ByteReader::new(&data);
        let s = parse_string(&mut reader).unwrap();
        assert_eq!(s.as_bytes(), b"hi!");
        assert!(reader.data.is_empty());
    }

    #[test]
    fn parse_byte_payload() {
        let data = vec![42];
        let mut reader = ByteReader::new(&data);
        let tag = parse_payload(&mut reader, 1).unwrap();
        assert_eq!(tag, NbtTag::Byte(42));
    }

    #[test]
    fn root_must_be_compound() {
        let data = vec![1, 0, 0, 42];
        let mut input = &data[..];
        assert!(matches!(
            parse_root(&mut input),
            Err(NbtError::InvalidRoot(1))
        ));
    }

    #[test]
    fn rejects_unknown_tag_id() {
        let data = vec![0x0A, 0, 0, 13, 0, 1, b'q', 0];
        let mut input = &data[..];
        assert!(matches!(
            parse_root(&mut input),
            Err(NbtError::UnknownTagId(13))
        ));
    }

    #[test]
    fn rejects_negative_array_length() {
        let mut data = vec![0x0A, 0, 0, 7, 0, 1, b'b'];
        data.extend_from_slice(&(-1i32).to_be_bytes());
        data.push(0);
        let mut input = &data[..];
        assert!(matches!(
            parse_root(&mut input),
            Err(NbtError::MalformedLength(-1))
        ));
    }

    #[test]
    fn rejects_end_typed_nonempty_list() {
        let mut data = vec![0x0A, 0, 0, 9, 0, 1, b'l', 0];
        data.extend_from_slice(&2i32.to_be_bytes());
        data.push(0);
        let mut input = &data[..];
        assert!(matches!(
            parse_root(&mut input),
            Err(NbtError::MalformedLength(2))
        ));
    }

    #[test]
    fn truncated_payload_is_an_error() {
        let data = vec![0x0A, 0, 0, 3, 0, 1, b'i', 0, 0];
        let mut input = &data[..];
        assert!(matches!(
            parse_root(&mut input),
            Err(NbtError::TruncatedStream)
        ));
    }

    #[test]
    fn cursor_advances_past_document() {
        let data = vec![0x0A, 0, 0, 0, 0xFF, 0xFF];
        let mut input = &data[..];
        parse_root(&mut input).unwrap();
        assert_eq!(input, &[0xFF, 0xFF]);
    }
}
