//! Type resolution: converts raw AST types into a fully-resolved schema.
//!
//! The key transformation is expanding every [`TypeExpr::Scoped`] reference
//! (a name like `geometry_msgs::msg::Point` or just `Point`) into either a
//! [`ResolvedType::Struct`] or [`ResolvedType::Enum`] key.
//!
//! # Lookup strategy for scoped names
//!
//! 1. **Exact match** — look up the candidate key directly.
//! 2. **Enum exact match** — same, in the enum map.
//! 3. **Suffix match** — find a unique entry whose key *ends with* the
//!    candidate segments (`["Point"]` resolves to
//!    `["geometry_msgs", "msg", "Point"]`). Ambiguous suffixes do not match.
//! 4. **Error** — reported as an unresolved type.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use crate::ast::{EnumDef, FieldDef, ParsedSection, PrimitiveType, StructDef, TypeExpr};

/// Failure while resolving parsed declarations into a decodable schema.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolveError {
    /// A field names a type that is not declared in the schema text.
    #[error("unresolved type '{type_name}' in '{scope}'")]
    UnknownType { type_name: String, scope: String },

    /// A declared type the CDR decoder cannot drive.
    #[error("unsupported type in '{scope}': {detail}")]
    Unsupported { scope: String, detail: String },
}

/// A fully-resolved type — all named references replaced with qualified
/// keys into [`ResolvedSchema::structs`] / [`ResolvedSchema::enums`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    Primitive(PrimitiveType),
    /// Key into [`ResolvedSchema::structs`].
    Struct(Vec<String>),
    /// An enum reference; decoded as its underlying u32 value.
    Enum(Vec<String>),
    /// Variable-length sequence. Declared bounds do not change the wire
    /// format and are dropped here.
    Sequence { elem: Box<ResolvedType> },
}

/// A field with its type fully resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    /// Shared so every decoded record can carry the name cheaply.
    pub name: Arc<str>,
    pub ty: ResolvedType,
    /// `Some(n)` means this field is a fixed-length array of `n` elements.
    pub fixed_len: Option<usize>,
}

/// A struct with all its fields fully resolved, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStruct {
    pub fields: Vec<ResolvedField>,
}

/// The complete, self-contained schema model needed for CDR decoding.
///
/// Immutable once built; owned by the schema registry for the life of a
/// conversion run.
#[derive(Debug, Clone)]
pub struct ResolvedSchema {
    /// Qualified key of the top-level message type to decode.
    pub root: Vec<String>,
    /// All reachable struct definitions, keyed by qualified name.
    pub structs: HashMap<Vec<String>, ResolvedStruct>,
    /// Names of declared enums (values decode as integers).
    pub enums: HashSet<Vec<String>>,
}

/// Ensure that `builtin_interfaces::msg::Time` and
/// `builtin_interfaces::msg::Duration` are present in `all_structs`.
///
/// These types appear in virtually every stamped ROS 2 message but are not
/// always bundled with the schema text of other packages.
pub fn ensure_builtin_structs(all_structs: &mut HashMap<Vec<String>, StructDef>) {
    for type_name in ["Time", "Duration"] {
        let full_name = vec![
            "builtin_interfaces".to_string(),
            "msg".to_string(),
            type_name.to_string(),
        ];
        all_structs
            .entry(full_name.clone())
            .or_insert_with(|| StructDef {
                full_name,
                fields: vec![
                    FieldDef {
                        name: "sec".to_string(),
                        ty: TypeExpr::Primitive(PrimitiveType::I32),
                        fixed_len: None,
                    },
                    FieldDef {
                        name: "nanosec".to_string(),
                        ty: TypeExpr::Primitive(PrimitiveType::U32),
                        fixed_len: None,
                    },
                ],
                consts: vec![],
            });
    }
}

/// Build a [`ResolvedSchema`] from parsed structs/enums and a selected root.
///
/// Builtin `builtin_interfaces` structs are injected when missing.
pub fn resolve_parsed_section(
    mut parsed: ParsedSection,
    root: Vec<String>,
) -> Result<ResolvedSchema, ResolveError> {
    ensure_builtin_structs(&mut parsed.structs);

    let mut structs = HashMap::new();
    for (name, def) in &parsed.structs {
        let resolved = resolve_struct(def, &parsed.structs, &parsed.enums)?;
        structs.insert(name.clone(), resolved);
    }

    let enums: HashSet<Vec<String>> = parsed.enums.keys().cloned().collect();

    if !structs.contains_key(&root) {
        return Err(ResolveError::UnknownType {
            type_name: root.join("::"),
            scope: "schema root".to_string(),
        });
    }

    Ok(ResolvedSchema {
        root,
        structs,
        enums,
    })
}

/// Resolve all field types in a single struct definition.
fn resolve_struct(
    def: &StructDef,
    all_structs: &HashMap<Vec<String>, StructDef>,
    all_enums: &HashMap<Vec<String>, EnumDef>,
) -> Result<ResolvedStruct, ResolveError> {
    let mut fields = Vec::with_capacity(def.fields.len());
    for f in &def.fields {
        let ty = resolve_type_expr(&f.ty, &def.full_name, all_structs, all_enums)?;
        fields.push(ResolvedField {
            name: Arc::from(f.name.as_str()),
            ty,
            fixed_len: f.fixed_len,
        });
    }

    Ok(ResolvedStruct { fields })
}

/// Recursively resolve a [`TypeExpr`] within the context of `current_struct`.
///
/// Single-segment scoped names are first qualified with the enclosing
/// module before attempting exact and suffix lookups.
fn resolve_type_expr(
    expr: &TypeExpr,
    current_struct: &[String],
    all_structs: &HashMap<Vec<String>, StructDef>,
    all_enums: &HashMap<Vec<String>, EnumDef>,
) -> Result<ResolvedType, ResolveError> {
    let scope = || current_struct.join("::");
    match expr {
        TypeExpr::Primitive(PrimitiveType::WString) => Err(ResolveError::Unsupported {
            scope: scope(),
            detail: "wstring".to_string(),
        }),
        TypeExpr::Primitive(p) => Ok(ResolvedType::Primitive(p.clone())),
        // The bound only constrains the writer; the wire format is the same
        // as an unbounded string.
        TypeExpr::BoundedString(_) => Ok(ResolvedType::Primitive(PrimitiveType::String)),
        TypeExpr::BoundedWString(_) => Err(ResolveError::Unsupported {
            scope: scope(),
            detail: "wstring".to_string(),
        }),
        TypeExpr::Sequence { elem, .. } => Ok(ResolvedType::Sequence {
            elem: Box::new(resolve_type_expr(
                elem,
                current_struct,
                all_structs,
                all_enums,
            )?),
        }),
        TypeExpr::Scoped(name) => {
            // For a single-segment name, prepend the enclosing module so that
            // intra-module references (e.g. `State` within `ex::msg`) resolve
            // to `ex::msg::State` before falling back to a global suffix search.
            let candidate = if name.len() == 1 {
                let mut qualified = current_struct[..current_struct.len().saturating_sub(1)].to_vec();
                qualified.push(name[0].clone());
                qualified
            } else {
                name.clone()
            };

            if all_structs.contains_key(&candidate) {
                Ok(ResolvedType::Struct(candidate))
            } else if all_enums.contains_key(&candidate) {
                Ok(ResolvedType::Enum(candidate))
            } else if let Some(found) = find_by_suffix(all_structs, &candidate) {
                Ok(ResolvedType::Struct(found))
            } else if let Some(found) = find_by_suffix(all_enums, &candidate) {
                Ok(ResolvedType::Enum(found))
            } else {
                Err(ResolveError::UnknownType {
                    type_name: name.join("::"),
                    scope: scope(),
                })
            }
        }
    }
}

/// Find the unique key in `map` whose suffix matches `wanted`.
///
/// Returns `None` if no key matches or if more than one key matches
/// (ambiguous reference).
fn find_by_suffix(
    map: &HashMap<Vec<String>, impl Sized>,
    wanted: &[String],
) -> Option<Vec<String>> {
    let mut found: Option<Vec<String>> = None;
    for key in map.keys() {
        if key.len() < wanted.len() {
            continue;
        }
        if key[key.len() - wanted.len()..] == *wanted {
            if found.is_some() {
                return None;
            }
            found = Some(key.clone());
        }
    }
    found
}
