//! AST types produced by the IDL parser.
//!
//! These are raw, name-based declarations; [`crate::type_resolver`] turns
//! them into a fully resolved schema ready for decoding.

use std::collections::HashMap;

/// Scalar primitive types of ROS 2 IDL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    /// 8-bit character, decoded to a one-character string.
    Char,
    /// Unbounded UTF-8 string.
    String,
    /// Unbounded UTF-16 wide string (rejected at resolution time).
    WString,
    /// Alias for `U8`; corresponds to `octet` in IDL.
    Octet,
}

/// A type expression as written in an IDL field declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Primitive(PrimitiveType),
    /// A named (possibly scoped) type, e.g. `["geometry_msgs", "msg", "Point"]`.
    Scoped(Vec<String>),
    /// `sequence<T>` / `sequence<T, N>`. The bound is parsed but not
    /// enforced; it does not affect the wire format.
    Sequence {
        elem: Box<TypeExpr>,
        max_len: Option<usize>,
    },
    /// `string<N>` — the bound is parsed but ignored for decoding.
    BoundedString(usize),
    /// `wstring<N>` (rejected at resolution time).
    BoundedWString(usize),
}

/// A single field inside a struct declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeExpr,
    /// `Some(n)` means the field is a fixed-length array of `n` elements.
    pub fixed_len: Option<usize>,
}

/// A constant defined inside a struct (`const T NAME = VALUE;`).
///
/// Constants occupy no wire space; they are kept only so that field
/// declarations and constants can share the struct body grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstDef {
    pub ty: TypeExpr,
    pub name: String,
    pub value: String,
}

/// A parsed struct with its qualified name and declaration-ordered fields.
///
/// Field order is wire order; CDR is positional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDef {
    /// Fully-qualified name segments, e.g. `["geometry_msgs", "msg", "Point"]`.
    pub full_name: Vec<String>,
    pub fields: Vec<FieldDef>,
    pub consts: Vec<ConstDef>,
}

/// A parsed enum with its qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    pub full_name: Vec<String>,
    /// Variant names in declaration order. Kept for diagnostics only;
    /// enum values decode as their integer representation.
    pub variants: Vec<String>,
}

/// All structs and enums extracted from one IDL section.
#[derive(Debug, Clone, Default)]
pub struct ParsedSection {
    pub structs: HashMap<Vec<String>, StructDef>,
    pub enums: HashMap<Vec<String>, EnumDef>,
}
