//! Shared ROS 2 type model and CDR decoding for `mcapjson`.
//!
//! The IDL parser produces the AST types in [`ast`]; [`type_resolver`]
//! turns them into a self-contained [`ResolvedSchema`]; [`cdr`] walks that
//! schema against a payload to produce a [`mcapjson_core::Value`] tree.

mod ast;
mod cdr;
mod topic_decoder;
mod type_resolver;

pub use ast::{ConstDef, EnumDef, FieldDef, ParsedSection, PrimitiveType, StructDef, TypeExpr};
pub use cdr::decode_cdr_to_value;
pub use topic_decoder::Ros2CdrTopicDecoder;
pub use type_resolver::{
    ResolveError, ResolvedField, ResolvedSchema, ResolvedStruct, ResolvedType,
    ensure_builtin_structs, resolve_parsed_section,
};
