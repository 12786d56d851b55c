//! Multi-section IDL schema bundle parsing.
//!
//! An MCAP ROS 2 IDL schema blob may contain several IDL files concatenated
//! with `====` separator lines, each starting with an `IDL: <path>` header:
//!
//! ```text
//! ================================================================================
//! IDL: geometry_msgs/msg/Point
//! module geometry_msgs { module msg { struct Point { ... }; }; };
//! ================================================================================
//! IDL: std_msgs/msg/Header
//! module std_msgs { module msg { struct Header { ... }; }; };
//! ```
//!
//! [`SchemaBundle::parse`] splits such text into [`IdlSection`]s;
//! [`SchemaBundle::main_type`] picks the section that corresponds to the
//! message type named by the schema.

use crate::{
    lex::{is_separator_line, split_qual},
    parser::ParseError,
};

/// One IDL section extracted from a schema bundle.
#[derive(Debug, Clone)]
pub struct IdlSection {
    /// Path components from the `IDL: pkg/msg/Type` header line.
    pub idl_path: Vec<String>,
    /// The raw IDL body text up to the next separator.
    pub body: String,
}

/// A parsed collection of [`IdlSection`]s from a single schema blob.
#[derive(Debug, Clone)]
pub struct SchemaBundle {
    pub sections: Vec<IdlSection>,
}

impl SchemaBundle {
    /// Parse a schema blob that may contain one or more `====`-separated
    /// IDL sections.
    pub fn parse(schema_name: &str, schema_text: &str) -> Result<Self, ParseError> {
        let mut sections = Vec::new();
        let mut buf: Vec<&str> = Vec::new();

        for line in schema_text.lines() {
            if is_separator_line(line) {
                if has_meaningful_lines(&buf) {
                    sections.push(parse_section(&buf)?);
                }
                buf.clear();
                continue;
            }
            buf.push(line);
        }
        if has_meaningful_lines(&buf) {
            sections.push(parse_section(&buf)?);
        }

        if sections.is_empty() {
            return Err(ParseError::Syntax {
                detail: format!("no IDL sections found for schema '{schema_name}'"),
            });
        }

        Ok(Self { sections })
    }

    /// Return the qualified name of the section that matches `schema_name`.
    ///
    /// Falls back to the first section when there is no exact match, which
    /// handles the common single-section bundle.
    pub fn main_type(&self, schema_name: &str) -> Option<Vec<String>> {
        let schema_key = split_qual(schema_name, "/");
        if !schema_key.is_empty() {
            for s in &self.sections {
                if s.idl_path == schema_key {
                    return Some(s.idl_path.clone());
                }
            }
        }
        self.sections.first().map(|s| s.idl_path.clone())
    }
}

fn has_meaningful_lines(lines: &[&str]) -> bool {
    lines.iter().any(|l| !l.trim().is_empty())
}

/// Parse one accumulated block of lines into an [`IdlSection`].
///
/// The first non-empty line must be an `IDL: <path>` header.
fn parse_section(lines: &[&str]) -> Result<IdlSection, ParseError> {
    let mut it = lines.iter().map(|s| s.trim()).filter(|s| !s.is_empty());
    let header = it.next().ok_or_else(|| ParseError::Syntax {
        detail: "empty IDL section".to_string(),
    })?;
    let path = header
        .strip_prefix("IDL:")
        .ok_or_else(|| ParseError::Syntax {
            detail: format!("missing `IDL:` header: {header}"),
        })?
        .trim();
    if path.is_empty() {
        return Err(ParseError::Syntax {
            detail: "empty IDL path in section header".to_string(),
        });
    }

    let body = it.collect::<Vec<_>>().join("\n");
    Ok(IdlSection {
        idl_path: split_qual(path, "/"),
        body,
    })
}
