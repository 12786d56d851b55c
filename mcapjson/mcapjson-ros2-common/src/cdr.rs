//! CDR decoding driven by a [`ResolvedSchema`].
//!
//! The decoder is a tree-walking interpreter over [`ResolvedType`]: one
//! cursor owns the read position and all alignment bookkeeping, and a
//! single `match` per type tag drives every read. Any failure aborts the
//! whole record; a partial tree is never returned.
//!
//! # Alignment
//!
//! CDR aligns each primitive of natural size S to the next multiple of S
//! *relative to the end of the 4-byte encapsulation header*. Getting this
//! wrong corrupts every subsequent field, so alignment lives in exactly one
//! place ([`ByteCursor::align`]).

use bytes::{Buf, Bytes};
use mcapjson_core::{DecodeError, Value};

use crate::{
    ast::PrimitiveType,
    type_resolver::{ResolvedField, ResolvedSchema, ResolvedType},
};

/// Recursion guard for struct/sequence nesting. Real message schemas are a
/// handful of levels deep; anything beyond this is a cyclic definition.
const MAX_DEPTH: usize = 64;

/// Decode one CDR payload (including its encapsulation header) into a
/// [`Value`] tree shaped exactly like the schema's root struct.
pub fn decode_cdr_to_value(schema: &ResolvedSchema, data: &[u8]) -> Result<Value, DecodeError> {
    let mut cursor = ByteCursor::new(Bytes::copy_from_slice(data));
    cursor.read_encapsulation()?;
    let mut decoder = Decoder { cursor, schema };
    decoder.decode_struct(&schema.root, &schema.root.join("."), 0)
}

fn primitive_align_size(p: &PrimitiveType) -> usize {
    match p {
        PrimitiveType::I16 | PrimitiveType::U16 => 2,
        PrimitiveType::I32 | PrimitiveType::U32 | PrimitiveType::F32 => 4,
        PrimitiveType::I64 | PrimitiveType::U64 | PrimitiveType::F64 => 8,
        _ => 1,
    }
}

/// Exclusively-owned read position over one payload.
///
/// Single pass, one direction; endianness is fixed by the encapsulation
/// header before any field is read.
struct ByteCursor {
    buf: Bytes,
    initial_len: usize,
    /// Offset of the first payload byte; alignment is computed from here.
    align_base: usize,
    little_endian: bool,
}

impl ByteCursor {
    fn new(buf: Bytes) -> Self {
        let initial_len = buf.len();
        Self {
            buf,
            initial_len,
            align_base: 0,
            little_endian: true,
        }
    }

    /// Read the 4-byte representation header and fix the endianness.
    ///
    /// Representation identifiers per the CDR encapsulation scheme:
    /// `0x0000` = big-endian, `0x0001` = little-endian. Parameter-list
    /// representations (`0x0002`/`0x0003`) are not handled.
    fn read_encapsulation(&mut self) -> Result<(), DecodeError> {
        if self.buf.remaining() < 4 {
            return Err(DecodeError::TruncatedHeader);
        }
        let id = self.buf.get_u16();
        self.buf.advance(2); // options, unused
        self.little_endian = match id {
            0x0000 => false,
            0x0001 => true,
            other => return Err(DecodeError::UnsupportedRepresentation { id: other }),
        };
        self.align_base = 4;
        Ok(())
    }

    fn current_offset(&self) -> usize {
        self.initial_len - self.buf.remaining()
    }

    fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Advance to the next offset that is a multiple of `n` relative to the
    /// start of the encapsulated payload.
    fn align(&mut self, n: usize, path: &str) -> Result<(), DecodeError> {
        let relative_offset = self.current_offset() - self.align_base;
        let pad = (n - (relative_offset % n)) % n;
        if self.buf.remaining() < pad {
            return Err(DecodeError::BufferOverrun {
                path: path.to_string(),
                needed: pad,
                remaining: self.buf.remaining(),
            });
        }
        self.buf.advance(pad);
        Ok(())
    }

    fn require(&self, n: usize, path: &str) -> Result<(), DecodeError> {
        if self.buf.remaining() < n {
            return Err(DecodeError::BufferOverrun {
                path: path.to_string(),
                needed: n,
                remaining: self.buf.remaining(),
            });
        }
        Ok(())
    }

    fn read_u8(&mut self, path: &str) -> Result<u8, DecodeError> {
        self.require(1, path)?;
        Ok(self.buf.get_u8())
    }

    fn read_i8(&mut self, path: &str) -> Result<i8, DecodeError> {
        self.require(1, path)?;
        Ok(self.buf.get_i8())
    }

    fn read_u16(&mut self, path: &str) -> Result<u16, DecodeError> {
        self.require(2, path)?;
        Ok(if self.little_endian {
            self.buf.get_u16_le()
        } else {
            self.buf.get_u16()
        })
    }

    fn read_i16(&mut self, path: &str) -> Result<i16, DecodeError> {
        self.read_u16(path).map(|v| v as i16)
    }

    fn read_u32(&mut self, path: &str) -> Result<u32, DecodeError> {
        self.require(4, path)?;
        Ok(if self.little_endian {
            self.buf.get_u32_le()
        } else {
            self.buf.get_u32()
        })
    }

    fn read_i32(&mut self, path: &str) -> Result<i32, DecodeError> {
        self.read_u32(path).map(|v| v as i32)
    }

    fn read_u64(&mut self, path: &str) -> Result<u64, DecodeError> {
        self.require(8, path)?;
        Ok(if self.little_endian {
            self.buf.get_u64_le()
        } else {
            self.buf.get_u64()
        })
    }

    fn read_i64(&mut self, path: &str) -> Result<i64, DecodeError> {
        self.read_u64(path).map(|v| v as i64)
    }

    fn read_f32(&mut self, path: &str) -> Result<f32, DecodeError> {
        self.read_u32(path).map(f32::from_bits)
    }

    fn read_f64(&mut self, path: &str) -> Result<f64, DecodeError> {
        self.read_u64(path).map(f64::from_bits)
    }

    fn read_bytes(&mut self, n: usize, path: &str) -> Result<Bytes, DecodeError> {
        self.require(n, path)?;
        Ok(self.buf.copy_to_bytes(n))
    }
}

struct Decoder<'a> {
    cursor: ByteCursor,
    schema: &'a ResolvedSchema,
}

impl Decoder<'_> {
    fn decode_struct(
        &mut self,
        struct_name: &[String],
        path: &str,
        depth: usize,
    ) -> Result<Value, DecodeError> {
        if depth > MAX_DEPTH {
            return Err(DecodeError::DepthExceeded {
                path: path.to_string(),
                limit: MAX_DEPTH,
            });
        }
        let s = self
            .schema
            .structs
            .get(struct_name)
            .ok_or_else(|| DecodeError::UnknownStruct {
                path: path.to_string(),
                name: struct_name.join("::"),
            })?;
        let mut fields = Vec::with_capacity(s.fields.len());
        for field in &s.fields {
            let field_path = format!("{}.{}", path, field.name);
            let v = self.decode_field(field, &field_path, depth)?;
            fields.push((field.name.clone(), v));
        }
        Ok(Value::Struct(fields))
    }

    fn decode_field(
        &mut self,
        field: &ResolvedField,
        path: &str,
        depth: usize,
    ) -> Result<Value, DecodeError> {
        // Fixed arrays carry no length prefix: exactly `n` elements.
        if let Some(n) = field.fixed_len {
            let mut arr = Vec::with_capacity(n);
            for i in 0..n {
                let p = format!("{path}[{i}]");
                arr.push(self.decode_type(&field.ty, &p, depth)?);
            }
            return Ok(Value::Array(arr));
        }
        self.decode_type(&field.ty, path, depth)
    }

    fn decode_type(
        &mut self,
        ty: &ResolvedType,
        path: &str,
        depth: usize,
    ) -> Result<Value, DecodeError> {
        match ty {
            ResolvedType::Primitive(p) => self.decode_primitive(p, path),
            ResolvedType::Struct(name) => self.decode_struct(name, path, depth + 1),
            // Enums are 32-bit on the wire and decode as their integer
            // value; no symbolic lookup.
            ResolvedType::Enum(_) => {
                self.cursor.align(4, path)?;
                Ok(Value::U32(self.cursor.read_u32(path)?))
            }
            ResolvedType::Sequence { elem } => {
                self.cursor.align(4, path)?;
                let len = self.cursor.read_u32(path)? as usize;
                // Each element occupies at least one byte, so a prefix
                // larger than the remaining payload is corruption.
                if len > self.cursor.remaining() {
                    return Err(DecodeError::ImplausibleLength {
                        path: path.to_string(),
                        len,
                        remaining: self.cursor.remaining(),
                    });
                }
                let mut out = Vec::with_capacity(len);
                for i in 0..len {
                    let p = format!("{path}[{i}]");
                    out.push(self.decode_type(elem, &p, depth + 1)?);
                }
                Ok(Value::List(out))
            }
        }
    }

    fn decode_primitive(&mut self, p: &PrimitiveType, path: &str) -> Result<Value, DecodeError> {
        self.cursor.align(primitive_align_size(p), path)?;
        Ok(match p {
            PrimitiveType::Bool => Value::Bool(self.cursor.read_u8(path)? != 0),
            PrimitiveType::I8 => Value::I8(self.cursor.read_i8(path)?),
            PrimitiveType::I16 => Value::I16(self.cursor.read_i16(path)?),
            PrimitiveType::I32 => Value::I32(self.cursor.read_i32(path)?),
            PrimitiveType::I64 => Value::I64(self.cursor.read_i64(path)?),
            PrimitiveType::U8 | PrimitiveType::Octet => Value::U8(self.cursor.read_u8(path)?),
            PrimitiveType::U16 => Value::U16(self.cursor.read_u16(path)?),
            PrimitiveType::U32 => Value::U32(self.cursor.read_u32(path)?),
            PrimitiveType::U64 => Value::U64(self.cursor.read_u64(path)?),
            PrimitiveType::F32 => Value::F32(self.cursor.read_f32(path)?),
            PrimitiveType::F64 => Value::F64(self.cursor.read_f64(path)?),
            PrimitiveType::Char => {
                let b = self.cursor.read_u8(path)?;
                Value::string((b as char).to_string())
            }
            PrimitiveType::String => Value::string(self.decode_string(path)?),
            PrimitiveType::WString => {
                return Err(DecodeError::UnsupportedType {
                    path: path.to_string(),
                    detail: "wstring".to_string(),
                });
            }
        })
    }

    /// Strings are a 4-byte aligned length prefix followed by that many
    /// bytes. The ROS 2 serializer includes the trailing NUL in the length;
    /// a trailing NUL is stripped when present.
    fn decode_string(&mut self, path: &str) -> Result<String, DecodeError> {
        self.cursor.align(4, path)?;
        let len = self.cursor.read_u32(path)? as usize;
        if len == 0 {
            return Ok(String::new());
        }
        if len > self.cursor.remaining() {
            return Err(DecodeError::ImplausibleLength {
                path: path.to_string(),
                len,
                remaining: self.cursor.remaining(),
            });
        }
        let bytes = self.cursor.read_bytes(len, path)?;
        let content = match bytes.last() {
            Some(0) => &bytes[..len - 1],
            _ => &bytes[..],
        };
        std::str::from_utf8(content)
            .map(ToString::to_string)
            .map_err(|e| DecodeError::InvalidUtf8 {
                path: path.to_string(),
                detail: e.to_string(),
            })
    }
}
