// Copyright 2026 region-nbt developers
// SPDX-License-Identifier: GPL-3.0-or-later

//! NBT encoding to any [`Write`] sink.

use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

use crate::error::NbtError;
use crate::nbt::mutf8::encode_mutf8;
use crate::nbt::{NamedTag, NbtString, NbtTag};

fn seq_len(len: usize, what: &'static str) -> Result<i32, NbtError> {
    i32::try_from(len).map_err(|_| NbtError::ValueOutOfRange(what))
}

/// Writes a length-prefixed string payload from its raw bytes.
pub fn write_string<W: Write>(writer: &mut W, s: &NbtString) -> Result<(), NbtError> {
    let len =
        u16::try_from(s.as_bytes().len()).map_err(|_| NbtError::ValueOutOfRange("string length"))?;
    writer.write_u16::<BigEndian>(len)?;
    writer.write_all(s.as_bytes())?;
    Ok(())
}

fn write_name<W: Write>(writer: &mut W, name: &str) -> Result<(), NbtError> {
    let bytes = encode_mutf8(name);
    let len = u16::try_from(bytes.len()).map_err(|_| NbtError::ValueOutOfRange("name length"))?;
    writer.write_u16::<BigEndian>(len)?;
    writer.write_all(&bytes)?;
    Ok(())
}

/// Writes the payload of an NBT tag.
///
/// This does not include the type id or the name of the tag.
pub fn write_payload<W: Write>(writer: &mut W, tag: &NbtTag) -> Result<(), NbtError> {
    match tag {
        NbtTag::Byte(v) => writer.write_i8(*v)?,
        NbtTag::Short(v) => writer.write_i16::<BigEndian>(*v)?,
        NbtTag::Int(v) => writer.write_i32::<BigEndian>(*v)?,
        NbtTag::Long(v) => writer.write_i64::<BigEndian>(*v)?,
        NbtTag::Float(v) => writer.write_f32::<BigEndian>(*v)?,
        NbtTag::Double(v) => writer.write_f64::<BigEndian>(*v)?,
        NbtTag::ByteArray(v) => {
            writer.write_i32::<BigEndian>(seq_len(v.len(), "byte array length")?)?;
            writer.write_all(v)?;
        }
        NbtTag::String(v) => write_string(writer, v)?,
        NbtTag::List(v) => {
            if v.is_empty() {
                // Empty lists always serialize as element type End.
                writer.write_u8(0)?;
                writer.write_i32::<BigEndian>(0)?;
            } else {
                let element_type = v[0].tag_id();
                if v.iter().any(|element| element.tag_id() != element_type) {
                    return Err(NbtError::MixedList);
                }
                writer.write_u8(element_type)?;
                writer.write_i32::<BigEndian>(seq_len(v.len(), "list length")?)?;
                for element in v {
                    write_payload(writer, element)?;
                }
            }
        }
        NbtTag::Compound(v) => {
            for (name, entry) in v {
                writer.write_u8(entry.tag_id())?;
                write_name(writer, name)?;
                write_payload(writer, entry)?;
            }
            writer.write_u8(0)?;
        }
        NbtTag::IntArray(v) => {
            writer.write_i32::<BigEndian>(seq_len(v.len(), "int array length")?)?;
            for &i in v {
                writer.write_i32::<BigEndian>(i)?;
            }
        }
        NbtTag::LongArray(v) => {
            writer.write_i32::<BigEndian>(seq_len(v.len(), "long array length")?)?;
            for &i in v {
                writer.write_i64::<BigEndian>(i)?;
            }
        }
    }
    Ok(())
}

/// Writes a complete NBT document (type id + name + payload).
///
/// The root must be a Compound; anything else is rejected before a byte is
/// written.
pub fn write_root<W: Write>(writer: &mut W, root: &NamedTag) -> Result<(), NbtError> {
    if !matches!(root.tag, NbtTag::Compound(_)) {
        return Err(NbtError::InvalidRoot(root.tag.tag_id()));
    }
    writer.write_u8(10)?;
    write_name(writer, &root.name)?;
    write_payload(writer, &root.tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nbt::parse::parse_root;
    use indexmap::IndexMap;

    #[test]
    fn write_string_payload() {
        let mut buf = Vec::new();
        write_string(&mut buf, &NbtString::from("hi!")).unwrap();
        assert_eq!(buf, vec![0, 3, b'h', b'i', b'!']);
    }

    #[test]
    fn round_trip_compound() {
        let mut map = IndexMap::new();
        map.insert("byte".to_string(), NbtTag::Byte(42));
        map.insert("string".to_string(), NbtTag::String(NbtString::from("val")));
        let root = NamedTag::new("root", NbtTag::Compound(map));

        let buf = root.to_bytes().unwrap();
        let mut input = &buf[..];
        let decoded = parse_root(&mut input).unwrap();

        assert_eq!(decoded, root);
        assert!(input.is_empty());
    }

    #[test]
    fn non_compound_root_is_rejected() {
        let root = NamedTag::new("n", NbtTag::Int(7));
        assert!(matches!(root.to_bytes(), Err(NbtError::InvalidRoot(3))));
    }

    #[test]
    fn mixed_list_is_rejected() {
        let mut map = IndexMap::new();
        map.insert(
            "l".to_string(),
            NbtTag::List(vec![NbtTag::Byte(1), NbtTag::Int(2)]),
        );
        let root = NamedTag::new("", NbtTag::Compound(map));
        assert!(matches!(root.to_bytes(), Err(NbtError::MixedList)));
    }

    #[test]
    fn oversized_string_is_rejected() {
        let mut map = IndexMap::new();
        map.insert(
            "s".to_string(),
            NbtTag::String(NbtString::from_mutf8(vec![b'a'; 70_000])),
        );
        let root = NamedTag::new("", NbtTag::Compound(map));
        assert!(matches!(
            root.to_bytes(),
            Err(NbtError::ValueOutOfRange("string length"))
        ));
    }
}
