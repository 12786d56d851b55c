//! ROS 2 IDL parser built on `nom` combinators.
//!
//! The outer loop is line-oriented: it tracks `module`/`struct`/`enum`
//! scoping and annotation state, while individual declarations (fields,
//! constants, type expressions) are parsed with combinators.
//!
//! Supported: modules, structs, enums, primitive types, `sequence<T>` /
//! `sequence<T, N>`, bounded strings, fixed arrays, constants, scoped type
//! names, annotations (skipped), `#include` (skipped).
//!
//! Unsupported and rejected: `union`, `typedef`, `bitmask`, `long double`.

use mcapjson_ros2_common::{
    ConstDef, EnumDef, FieldDef, ParsedSection, PrimitiveType, StructDef, TypeExpr,
};
use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{alpha1, alphanumeric1, char, space0},
    combinator::{map, map_res, opt, recognize, value},
    error::{Error, ErrorKind},
    multi::{many0, separated_list0},
    sequence::{pair, preceded, terminated, tuple},
};

use crate::lex::strip_line_comments;

/// Parse failure for one IDL section.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    /// A construct the decoder cannot drive (`union`, `typedef`, ...).
    #[error("unsupported IDL construct: {construct}")]
    Unsupported { construct: String },

    /// Anything else: malformed declarations, unbalanced braces.
    #[error("{detail}")]
    Syntax { detail: String },
}

impl ParseError {
    fn syntax(detail: impl Into<String>) -> Self {
        Self::Syntax {
            detail: detail.into(),
        }
    }
}

/// Parse the body of one IDL section into its structs and enums.
pub fn parse_idl_section(idl_body: &str) -> Result<ParsedSection, ParseError> {
    let mut out = ParsedSection::default();
    let mut modules: Vec<String> = Vec::new();
    let mut current_struct: Option<(String, Vec<FieldDef>, Vec<ConstDef>)> = None;
    let mut current_enum: Option<(String, Vec<String>)> = None;

    // Annotations may span lines; track unbalanced parens outside strings.
    let mut annotation_depth = 0i32;
    let mut ann_in_str = false;
    let mut ann_escaped = false;

    for (idx, raw) in idl_body.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_line_comments(raw).trim();
        if line.is_empty() {
            continue;
        }

        if annotation_depth > 0 || line.starts_with('@') {
            let (open, close) =
                paren_counts_outside_strings(line, &mut ann_in_str, &mut ann_escaped);
            annotation_depth += open as i32;
            annotation_depth -= close as i32;
            continue;
        }

        if line.starts_with("#include") {
            continue;
        }

        for keyword in ["union ", "typedef ", "bitmask "] {
            if line.starts_with(keyword) {
                return Err(ParseError::Unsupported {
                    construct: format!("{} (line {line_no})", keyword.trim()),
                });
            }
        }

        if let Some(name) = block_open(line, "module") {
            modules.push(name.to_string());
            continue;
        }

        if let Some(name) = block_open(line, "struct") {
            if current_struct.is_some() || current_enum.is_some() {
                return Err(ParseError::syntax(format!(
                    "nested declaration at line {line_no}: {line}"
                )));
            }
            current_struct = Some((name.to_string(), Vec::new(), Vec::new()));
            continue;
        }

        if let Some(name) = block_open(line, "enum") {
            if current_struct.is_some() || current_enum.is_some() {
                return Err(ParseError::syntax(format!(
                    "nested declaration at line {line_no}: {line}"
                )));
            }
            current_enum = Some((name.to_string(), Vec::new()));
            continue;
        }

        if line == "};" || line == "}" {
            if let Some((name, fields, consts)) = current_struct.take() {
                let mut full_name = modules.clone();
                full_name.push(name);
                out.structs.insert(
                    full_name.clone(),
                    StructDef {
                        full_name,
                        fields,
                        consts,
                    },
                );
            } else if let Some((name, variants)) = current_enum.take() {
                let mut full_name = modules.clone();
                full_name.push(name);
                out.enums.insert(
                    full_name.clone(),
                    EnumDef {
                        full_name,
                        variants,
                    },
                );
            } else if modules.pop().is_none() {
                return Err(ParseError::syntax(format!(
                    "unmatched closing brace at line {line_no}"
                )));
            }
            continue;
        }

        if let Some((_, fields, consts)) = current_struct.as_mut() {
            if line.starts_with("const ") {
                consts.push(parse_const(line).map_err(|e| at_line(e, line_no))?);
            } else {
                fields.push(parse_field(line).map_err(|e| at_line(e, line_no))?);
            }
            continue;
        }

        if let Some((_, variants)) = current_enum.as_mut() {
            let name = parse_enum_variant(line).map_err(|e| at_line(e, line_no))?;
            if !name.is_empty() {
                variants.push(name);
            }
            continue;
        }

        return Err(ParseError::syntax(format!(
            "unexpected top-level statement at line {line_no}: {line}"
        )));
    }

    if current_struct.is_some() {
        return Err(ParseError::syntax("unclosed struct declaration"));
    }
    if current_enum.is_some() {
        return Err(ParseError::syntax("unclosed enum declaration"));
    }
    Ok(out)
}

fn at_line(e: ParseError, line_no: usize) -> ParseError {
    match e {
        ParseError::Unsupported { construct } => ParseError::Unsupported { construct },
        ParseError::Syntax { detail } => ParseError::Syntax {
            detail: format!("line {line_no}: {detail}"),
        },
    }
}

/// Match `<keyword> Name {` and return the name.
fn block_open<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let decl = map(
        tuple((tag(keyword), ws1, identifier, ws, char('{'))),
        |(_, _, name, _, _): (&str, _, &str, _, _)| name,
    )(line.trim());
    decl.ok().map(|(_, name)| name)
}

fn parse_const(line: &str) -> Result<ConstDef, ParseError> {
    let body = line
        .strip_prefix("const ")
        .ok_or_else(|| ParseError::syntax("const declaration must start with `const`"))?;
    let body = body
        .strip_suffix(';')
        .ok_or_else(|| ParseError::syntax("const declaration must end with ';'"))?;
    reject_long_double(body)?;

    match const_decl(body.trim()) {
        Ok((rest, def)) if rest.trim().is_empty() => Ok(def),
        Ok((rest, _)) => Err(ParseError::syntax(format!(
            "trailing characters in const: {rest}"
        ))),
        Err(e) => Err(ParseError::syntax(format!(
            "malformed const declaration: {e}"
        ))),
    }
}

fn parse_field(line: &str) -> Result<FieldDef, ParseError> {
    let body = line
        .strip_suffix(';')
        .ok_or_else(|| ParseError::syntax("field declaration must end with ';'"))?
        .trim();
    reject_long_double(body)?;

    match field_decl(body) {
        Ok((rest, def)) if rest.trim().is_empty() => Ok(def),
        Ok((rest, _)) => Err(ParseError::syntax(format!(
            "trailing characters in field: {rest}"
        ))),
        Err(e) => Err(ParseError::syntax(format!(
            "malformed field declaration: {e}"
        ))),
    }
}

/// `long double` has no decodable representation here; reject it early so
/// it does not parse as `long` (i32) followed by a field named `double`.
fn reject_long_double(s: &str) -> Result<(), ParseError> {
    let mut normalized = String::with_capacity(s.len());
    for ch in s.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            normalized.push(ch);
        } else {
            normalized.push(' ');
        }
    }
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    if tokens
        .windows(2)
        .any(|pair| pair[0] == "long" && pair[1] == "double")
    {
        return Err(ParseError::Unsupported {
            construct: "long double".to_string(),
        });
    }
    Ok(())
}

/// Identifier: alphanumeric + underscore, not starting with a digit.
fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn ws(input: &str) -> IResult<&str, ()> {
    value((), space0)(input)
}

fn ws1(input: &str) -> IResult<&str, ()> {
    value((), take_while1(|c: char| c.is_whitespace()))(input)
}

/// Scoped identifier, `foo::bar::Baz` or `foo/bar/Baz`.
fn scoped_name(input: &str) -> IResult<&str, Vec<String>> {
    let sep = if input.contains("::") { "::" } else { "/" };
    map(
        separated_list0(tag(sep), map(identifier, String::from)),
        |parts| parts.into_iter().filter(|s| !s.is_empty()).collect(),
    )(input)
}

/// Primitive type names. Order matters: longer matches first, and each
/// keyword must end at an identifier boundary so `int8_array` is not
/// misread as `int8` + `_array`.
fn primitive_type(input: &str) -> IResult<&str, PrimitiveType> {
    terminated(
        alt((
            value(
                PrimitiveType::U64,
                tuple((tag("unsigned"), ws1, tag("long"), ws1, tag("long"))),
            ),
            value(PrimitiveType::I64, tuple((tag("long"), ws1, tag("long")))),
            value(
                PrimitiveType::U16,
                tuple((tag("unsigned"), ws1, tag("short"))),
            ),
            value(
                PrimitiveType::U32,
                tuple((tag("unsigned"), ws1, tag("long"))),
            ),
            value(PrimitiveType::Bool, alt((tag("boolean"), tag("bool")))),
            value(PrimitiveType::I8, tag("int8")),
            value(PrimitiveType::I16, alt((tag("int16"), tag("short")))),
            value(PrimitiveType::I32, alt((tag("int32"), tag("long")))),
            value(PrimitiveType::I64, tag("int64")),
            value(PrimitiveType::U8, tag("uint8")),
            value(PrimitiveType::U16, tag("uint16")),
            value(PrimitiveType::U32, tag("uint32")),
            value(PrimitiveType::U64, tag("uint64")),
            value(PrimitiveType::F32, alt((tag("float32"), tag("float")))),
            value(PrimitiveType::F64, alt((tag("float64"), tag("double")))),
            value(PrimitiveType::String, tag("string")),
            value(PrimitiveType::WString, tag("wstring")),
            value(PrimitiveType::Char, tag("char")),
            value(PrimitiveType::Octet, tag("octet")),
        )),
        keyword_boundary,
    )(input)
}

fn keyword_boundary(input: &str) -> IResult<&str, ()> {
    if input.chars().next().is_some_and(is_ident_continue) {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Verify)));
    }
    Ok((input, ()))
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Decimal literal. Values that do not fit a `usize` are a parse error,
/// not a panic; schema text is untrusted input.
fn number(input: &str) -> IResult<&str, usize> {
    map_res(take_while1(|c: char| c.is_ascii_digit()), |s: &str| {
        s.parse::<usize>()
    })(input)
}

/// `sequence<T>` or `sequence<T, N>`.
fn sequence_type(input: &str, depth: usize) -> IResult<&str, TypeExpr> {
    map(
        tuple((
            tag("sequence"),
            ws,
            char('<'),
            ws,
            |i| type_expr_at(i, depth + 1),
            opt(preceded(tuple((ws, char(','), ws)), number)),
            ws,
            char('>'),
        )),
        |(_, _, _, _, elem, max_len, _, _)| TypeExpr::Sequence {
            elem: Box::new(elem),
            max_len,
        },
    )(input)
}

/// `string<N>`.
fn bounded_string_type(input: &str) -> IResult<&str, TypeExpr> {
    map(
        tuple((tag("string"), ws, char('<'), ws, number, ws, char('>'))),
        |(_, _, _, _, n, _, _)| TypeExpr::BoundedString(n),
    )(input)
}

/// `wstring<N>`.
fn bounded_wstring_type(input: &str) -> IResult<&str, TypeExpr> {
    map(
        tuple((tag("wstring"), ws, char('<'), ws, number, ws, char('>'))),
        |(_, _, _, _, n, _, _)| TypeExpr::BoundedWString(n),
    )(input)
}

/// Nesting cap for `sequence<sequence<...>>`; mirrors the decoder's
/// recursion guard so hostile schema text cannot exhaust the stack.
const MAX_TYPE_NESTING: usize = 64;

/// Any type expression.
fn type_expr(input: &str) -> IResult<&str, TypeExpr> {
    type_expr_at(input, 0)
}

fn type_expr_at(input: &str, depth: usize) -> IResult<&str, TypeExpr> {
    if depth >= MAX_TYPE_NESTING {
        return Err(nom::Err::Failure(Error::new(input, ErrorKind::TooLarge)));
    }
    alt((
        |i| sequence_type(i, depth),
        bounded_string_type,
        bounded_wstring_type,
        map(primitive_type, TypeExpr::Primitive),
        map(scoped_name, TypeExpr::Scoped),
    ))(input)
}

/// Field name with optional `[N]` fixed-array suffix.
fn field_array_notation(input: &str) -> IResult<&str, (&str, Option<usize>)> {
    alt((
        map(
            pair(identifier, tuple((char('['), ws, number, ws, char(']')))),
            |(name, (_, _, size, _, _))| (name, Some(size)),
        ),
        map(identifier, |name| (name, None)),
    ))(input)
}

/// Field declaration without the semicolon: `type name` or `type name[N]`.
fn field_decl(input: &str) -> IResult<&str, FieldDef> {
    map(
        tuple((type_expr, ws1, field_array_notation)),
        |(ty, _, (name, fixed_len))| FieldDef {
            name: name.to_string(),
            ty,
            fixed_len,
        },
    )(input)
}

fn const_value(input: &str) -> IResult<&str, &str> {
    map(take_while(|c: char| c != ';'), str::trim)(input)
}

/// Const declaration without the `const ` prefix and semicolon.
fn const_decl(input: &str) -> IResult<&str, ConstDef> {
    map(
        tuple((type_expr, ws1, identifier, ws, char('='), ws, const_value)),
        |(ty, _, name, _, _, _, value)| ConstDef {
            ty,
            name: name.to_string(),
            value: value.to_string(),
        },
    )(input)
}

/// Enum variant: `VARIANT` or `VARIANT = value`, optional trailing comma.
fn enum_variant(input: &str) -> IResult<&str, Option<&str>> {
    let trimmed = input.trim().trim_end_matches(',');
    if trimmed.is_empty() {
        return Ok((input, None));
    }

    alt((
        map(
            tuple((identifier, ws, char('='), take_while(|c: char| c != ','))),
            |(name, _, _, _)| Some(name),
        ),
        map(identifier, Some),
    ))(trimmed)
}

fn parse_enum_variant(line: &str) -> Result<String, ParseError> {
    match enum_variant(line) {
        Ok((_, Some(name))) => Ok(name.to_string()),
        Ok((_, None)) => Ok(String::new()),
        Err(e) => Err(ParseError::syntax(format!(
            "malformed enum variant '{line}': {e}"
        ))),
    }
}

/// Count parens on one line, skipping any inside string literals. State is
/// carried across lines because annotation arguments may span lines.
fn paren_counts_outside_strings(s: &str, in_str: &mut bool, escaped: &mut bool) -> (usize, usize) {
    let mut open = 0usize;
    let mut close = 0usize;
    for ch in s.chars() {
        if *in_str {
            if *escaped {
                *escaped = false;
                continue;
            }
            match ch {
                '\\' => *escaped = true,
                '"' => *in_str = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => *in_str = true,
            '(' => open += 1,
            ')' => close += 1,
            _ => {}
        }
    }
    (open, close)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_char_field() {
        let def = parse_field("char code;").expect("parse");
        assert_eq!(def.ty, TypeExpr::Primitive(PrimitiveType::Char));
        assert_eq!(def.name, "code");
        assert_eq!(def.fixed_len, None);
    }

    #[test]
    fn parses_fixed_array_suffix() {
        let def = parse_field("float64 covariance[36];").expect("parse");
        assert_eq!(def.ty, TypeExpr::Primitive(PrimitiveType::F64));
        assert_eq!(def.fixed_len, Some(36));
    }

    #[test]
    fn parses_bounded_sequence() {
        let def = parse_field("sequence<int32, 10> values;").expect("parse");
        let TypeExpr::Sequence { elem, max_len } = def.ty else {
            panic!("expected sequence");
        };
        assert_eq!(*elem, TypeExpr::Primitive(PrimitiveType::I32));
        assert_eq!(max_len, Some(10));
    }

    #[test]
    fn rejects_long_double() {
        let err = parse_field("long double precise;").expect_err("should fail");
        assert!(matches!(err, ParseError::Unsupported { .. }));
    }

    #[test]
    fn bound_larger_than_usize_is_a_syntax_error() {
        let err = parse_field("string<99999999999999999999999999> name;").expect_err("should fail");
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn array_size_larger_than_usize_is_a_syntax_error() {
        let err =
            parse_field("float64 data[99999999999999999999999999];").expect_err("should fail");
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn deeply_nested_sequences_fail_instead_of_recursing() {
        let mut decl = "sequence<".repeat(200_000);
        decl.push_str("int32");
        decl.push_str(&">".repeat(200_000));
        decl.push_str(" values;");
        let err = parse_field(&decl).expect_err("should fail");
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn sequence_nesting_below_the_cap_parses() {
        let mut decl = "sequence<".repeat(8);
        decl.push_str("int32");
        decl.push_str(&">".repeat(8));
        decl.push_str(" values;");
        let def = parse_field(&decl).expect("parse");
        assert!(matches!(def.ty, TypeExpr::Sequence { .. }));
    }

    #[test]
    fn union_is_unsupported() {
        let err = parse_idl_section("union U switch (long) {\n};").expect_err("should fail");
        assert!(matches!(err, ParseError::Unsupported { .. }));
    }
}
