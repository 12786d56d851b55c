//! Ties together bundle splitting, IDL parsing, and type resolution.

use mcapjson_core::SchemaError;
use mcapjson_ros2_common::{ParsedSection, ResolveError, ResolvedSchema, resolve_parsed_section};

use crate::{
    parser::{ParseError, parse_idl_section},
    schema_bundle::SchemaBundle,
};

/// Parse a multi-section IDL schema text into a fully resolved
/// [`ResolvedSchema`] ready for CDR decoding.
///
/// Steps:
/// 1. Split `schema_text` into sections at `====` separator lines.
/// 2. Parse each section and merge the declared structs and enums.
/// 3. Identify the root type from `schema_name`.
/// 4. Resolve all type references.
pub fn resolve_schema(schema_name: &str, schema_text: &str) -> Result<ResolvedSchema, SchemaError> {
    let bundle =
        SchemaBundle::parse(schema_name, schema_text).map_err(|e| to_schema_error(schema_name, e))?;

    let mut merged = ParsedSection::default();
    for section in &bundle.sections {
        let parsed = parse_idl_section(&section.body).map_err(|e| match e {
            ParseError::Unsupported { construct } => SchemaError::Unsupported {
                schema_name: schema_name.to_string(),
                construct,
            },
            ParseError::Syntax { detail } => SchemaError::Parse {
                schema_name: schema_name.to_string(),
                detail: format!("in section '{}': {detail}", section.idl_path.join("/")),
            },
        })?;
        merged.structs.extend(parsed.structs);
        merged.enums.extend(parsed.enums);
    }

    let root = bundle
        .main_type(schema_name)
        .ok_or_else(|| SchemaError::Parse {
            schema_name: schema_name.to_string(),
            detail: "unable to determine root type".to_string(),
        })?;

    resolve_parsed_section(merged, root).map_err(|e| match e {
        ResolveError::UnknownType { type_name, scope } => SchemaError::UnknownType {
            schema_name: schema_name.to_string(),
            type_name: format!("{type_name} (in {scope})"),
        },
        ResolveError::Unsupported { scope, detail } => SchemaError::Unsupported {
            schema_name: schema_name.to_string(),
            construct: format!("{detail} (in {scope})"),
        },
    })
}

fn to_schema_error(schema_name: &str, e: ParseError) -> SchemaError {
    match e {
        ParseError::Unsupported { construct } => SchemaError::Unsupported {
            schema_name: schema_name.to_string(),
            construct,
        },
        ParseError::Syntax { detail } => SchemaError::Parse {
            schema_name: schema_name.to_string(),
            detail,
        },
    }
}
