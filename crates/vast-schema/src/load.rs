//! Loading a [`crate::Schema`] from a TOML declaration file.
//!
//! Schemas are declared as a list of named types, each either a record (an
//! ordered list of fields, themselves either base kinds or nested records)
//! or a bare alias of a base/composite kind. This lets an operator declare
//! `--schema` event layouts without recompiling, the way the donor
//! workspace's mapping engine loaded its TOML-based field mappings.

use serde::Deserialize;

use vast_types::{RecordType, Type};

use crate::error::SchemaError;

#[derive(Debug, Deserialize)]
pub struct SchemaFile {
    #[serde(rename = "type", default)]
    pub types: Vec<TypeDecl>,
}

#[derive(Debug, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(rename = "kind", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "kind", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
}

pub fn parse_toml(source: &str) -> Result<Vec<(Type, Vec<String>)>, SchemaError> {
    let file: SchemaFile = toml::from_str(source).map_err(|e| SchemaError::Toml(e.to_string()))?;
    file.types
        .into_iter()
        .map(|decl| {
            let ty = build_type(&decl.fields, decl.kind.as_deref())?.named(decl.name.clone());
            Ok((ty, decl.aliases))
        })
        .collect()
}

fn build_field(decl: &FieldDecl) -> Result<Type, SchemaError> {
    build_type(&decl.fields, decl.kind.as_deref())
}

fn build_type(fields: &[FieldDecl], kind: Option<&str>) -> Result<Type, SchemaError> {
    if !fields.is_empty() {
        let built: Result<Vec<(String, Type)>, SchemaError> = fields
            .iter()
            .map(|f| Ok((f.name.clone(), build_field(f)?)))
            .collect();
        return Ok(Type::record(RecordType::new(built?)));
    }
    let kind = kind.ok_or_else(|| SchemaError::Toml("field has neither kind nor fields".to_string()))?;
    parse_kind(kind)
}

fn parse_kind(s: &str) -> Result<Type, SchemaError> {
    let s = s.trim();
    if let Some(inner) = s.strip_prefix("vector<").and_then(|r| r.strip_suffix('>')) {
        return Ok(Type::vector(parse_kind(inner)?));
    }
    if let Some(inner) = s.strip_prefix("set<").and_then(|r| r.strip_suffix('>')) {
        return Ok(Type::set(parse_kind(inner)?));
    }
    if let Some(inner) = s.strip_prefix("table<").and_then(|r| r.strip_suffix('>')) {
        let (k, v) = inner
            .split_once(',')
            .ok_or_else(|| SchemaError::Toml(format!("malformed table kind: {s}")))?;
        return Ok(Type::table(parse_kind(k)?, parse_kind(v)?));
    }
    Ok(match s {
        "bool" => Type::bool(),
        "int" => Type::int(),
        "count" => Type::count(),
        "real" => Type::real(),
        "time" => Type::time(),
        "duration" => Type::duration(),
        "string" => Type::string(),
        "pattern" => Type::pattern(),
        "addr" => Type::address(),
        "subnet" => Type::subnet(),
        "port" => Type::port(),
        other => return Err(SchemaError::Toml(format!("unknown type kind: {other}"))),
    })
}
