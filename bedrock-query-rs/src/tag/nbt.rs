//! Little-endian NBT decoding, as stored in Bedrock world databases.
//!
//! A payload is one or more concatenated named root tags. A single root
//! decodes to its payload; several roots (entity and pending-tick records)
//! decode to a list of root payloads.

use crate::error::DecodeError;
use crate::tag::{Tag, TagDecoder};

const TAG_END: u8 = 0;
const TAG_BYTE: u8 = 1;
const TAG_SHORT: u8 = 2;
const TAG_INT: u8 = 3;
const TAG_LONG: u8 = 4;
const TAG_FLOAT: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_BYTE_ARRAY: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_LIST: u8 = 9;
const TAG_COMPOUND: u8 = 10;
const TAG_INT_ARRAY: u8 = 11;
const TAG_LONG_ARRAY: u8 = 12;

/// Deepest list/compound nesting accepted in one root.
pub const MAX_DEPTH: usize = 512;

/// Decoder for little-endian NBT payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct NbtDecoder;

impl TagDecoder for NbtDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Tag, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }
        let mut reader = Reader::new(bytes);
        let mut roots = Vec::new();
        while !reader.is_at_end() {
            let id = reader.u8()?;
            if id == TAG_END {
                // Trailing padding.
                continue;
            }
            if id != TAG_COMPOUND && id != TAG_LIST {
                return Err(DecodeError::InvalidRoot(tag_name(id).to_string()));
            }
            let _name = reader.string()?;
            roots.push(reader.payload(id, 0)?);
        }
        match roots.len() {
            0 => Err(DecodeError::Empty),
            1 => Ok(roots.remove(0)),
            _ => Ok(Tag::List(roots)),
        }
    }
}

fn tag_name(id: u8) -> &'static str {
    match id {
        TAG_END => "end",
        TAG_BYTE => "byte",
        TAG_SHORT => "short",
        TAG_INT => "int",
        TAG_LONG => "long",
        TAG_FLOAT => "float",
        TAG_DOUBLE => "double",
        TAG_BYTE_ARRAY => "byteArray",
        TAG_STRING => "string",
        TAG_LIST => "list",
        TAG_COMPOUND => "compound",
        TAG_INT_ARRAY => "intArray",
        TAG_LONG_ARRAY => "longArray",
        _ => "unknown",
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let end = self.pos + N;
        let slice = self
            .bytes
            .get(self.pos..end)
            .ok_or(DecodeError::UnexpectedEof { offset: self.pos })?;
        self.pos = end;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take::<1>()?[0])
    }

    fn i8(&mut self) -> Result<i8, DecodeError> {
        Ok(i8::from_le_bytes(self.take()?))
    }

    fn i16(&mut self) -> Result<i16, DecodeError> {
        Ok(i16::from_le_bytes(self.take()?))
    }

    fn i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_le_bytes(self.take()?))
    }

    fn i64(&mut self) -> Result<i64, DecodeError> {
        Ok(i64::from_le_bytes(self.take()?))
    }

    fn f32(&mut self) -> Result<f32, DecodeError> {
        Ok(f32::from_le_bytes(self.take()?))
    }

    fn f64(&mut self) -> Result<f64, DecodeError> {
        Ok(f64::from_le_bytes(self.take()?))
    }

    fn length(&mut self) -> Result<usize, DecodeError> {
        let offset = self.pos;
        let length = self.i32()?;
        usize::try_from(length).map_err(|_| DecodeError::NegativeLength { length, offset })
    }

    fn string(&mut self) -> Result<String, DecodeError> {
        let len = u16::from_le_bytes(self.take()?) as usize;
        let offset = self.pos;
        let raw = self
            .bytes
            .get(offset..offset + len)
            .ok_or(DecodeError::UnexpectedEof { offset })?;
        self.pos += len;
        String::from_utf8(raw.to_vec()).map_err(|_| DecodeError::InvalidString { offset })
    }

    fn array<T>(
        &mut self,
        mut read: impl FnMut(&mut Self) -> Result<T, DecodeError>,
    ) -> Result<Vec<T>, DecodeError> {
        let len = self.length()?;
        // A corrupt length must not trigger a huge allocation.
        let mut items = Vec::with_capacity(len.min(self.bytes.len() - self.pos));
        for _ in 0..len {
            items.push(read(self)?);
        }
        Ok(items)
    }

    fn payload(&mut self, id: u8, depth: usize) -> Result<Tag, DecodeError> {
        if depth > MAX_DEPTH && (id == TAG_LIST || id == TAG_COMPOUND) {
            return Err(DecodeError::TooDeep {
                limit: MAX_DEPTH,
                offset: self.pos,
            });
        }
        let tag = match id {
            TAG_BYTE => Tag::Byte(self.i8()?),
            TAG_SHORT => Tag::Short(self.i16()?),
            TAG_INT => Tag::Int(self.i32()?),
            TAG_LONG => Tag::Long(self.i64()?),
            TAG_FLOAT => Tag::Float(self.f32()?),
            TAG_DOUBLE => Tag::Double(self.f64()?),
            TAG_BYTE_ARRAY => Tag::ByteArray(self.array(Self::i8)?),
            TAG_STRING => Tag::String(self.string()?),
            TAG_LIST => {
                let element = self.u8()?;
                Tag::List(self.array(|r| r.payload(element, depth + 1))?)
            }
            TAG_COMPOUND => {
                let mut entries = Vec::new();
                loop {
                    let child = self.u8()?;
                    if child == TAG_END {
                        break;
                    }
                    let name = self.string()?;
                    entries.push((name, self.payload(child, depth + 1)?));
                }
                Tag::Compound(entries)
            }
            TAG_INT_ARRAY => Tag::IntArray(self.array(Self::i32)?),
            TAG_LONG_ARRAY => Tag::LongArray(self.array(Self::i64)?),
            other => {
                return Err(DecodeError::UnknownTagId {
                    id: other,
                    offset: self.pos.saturating_sub(1),
                })
            }
        };
        Ok(tag)
    }
}
