//! The Importer: reads newline-delimited JSON records from a file and
//! builds [`UnidentifiedRecord`]s against a declared event [`Type`]
//! (spec.md §4.9). Importing is a one-shot read, not a long-lived
//! mailbox service, so it is a plain async function rather than an actor
//! — its output feeds the Receiver, which *is* one.
//!
//! The Broccoli wire format and the Boost.Spirit grammars that parse
//! timestamps/durations/globs are explicitly out of scope (spec.md §1);
//! JSON is the workspace's own import format, matching the serde_json
//! stack already used throughout the donor workspace for structured I/O.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::Path;

use serde_json::Value;
use vast_schema::Schema;
use vast_types::{Data, Port, RecordType, Subnet, Type, TypeKind};

use crate::error::IngestError;
use crate::record::UnidentifiedRecord;

/// Resolves `type_name` against `schema` and imports `path` as that
/// type — the `--schema`/`--read` combination the CLI exposes (spec.md
/// §6).
pub async fn import_json_lines_as(
    path: &std::path::Path,
    schema: &Schema,
    type_name: &str,
) -> Result<Vec<UnidentifiedRecord>, IngestError> {
    let ty = schema
        .get(type_name)
        .ok_or_else(|| IngestError::InvalidValue(type_name.to_string(), "schema type name"))?;
    import_json_lines(path, ty).await
}

/// Reads every non-blank line of `path` as a JSON object, converting each
/// into an [`UnidentifiedRecord`] of type `ty`.
///
/// A `"timestamp"` key at the top level of the JSON object, if present, is
/// parsed with [`vast_expr::parse_time_point`] (accepting both a numeric
/// nanosecond value and the `now`/`@duration`/ISO literal grammar used by
/// the query language, so import fixtures and query strings share one
/// timestamp syntax); otherwise the record is stamped with the import
/// time.
pub async fn import_json_lines(path: &Path, ty: &Type) -> Result<Vec<UnidentifiedRecord>, IngestError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| IngestError::Io { path: path.display().to_string(), source })?;
    let mut records = Vec::new();
    for (lineno, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line).map_err(|source| {
            tracing::warn!(line = lineno + 1, error = %source, "skipping malformed import line");
            source
        })?;
        records.push(record_from_json(&value, ty)?);
    }
    Ok(records)
}

fn record_from_json(value: &Value, ty: &Type) -> Result<UnidentifiedRecord, IngestError> {
    let timestamp = match value.get("timestamp") {
        Some(Value::String(s)) => vast_expr::parse_time_point(s)?,
        Some(Value::Number(n)) => n.as_i64().ok_or_else(|| {
            IngestError::InvalidValue(n.to_string(), "timestamp")
        })?,
        _ => vast_expr::now_ns(),
    };
    let data = json_to_data(value, ty)?;
    Ok(UnidentifiedRecord::new(ty.clone(), timestamp, data))
}

/// Converts a JSON value into [`Data`] shaped by `ty`, the way the schema
/// declares it — this is the importer's half of what a query-language
/// literal does on the resolver side.
fn json_to_data(value: &Value, ty: &Type) -> Result<Data, IngestError> {
    match ty.kind() {
        TypeKind::Bool => value
            .as_bool()
            .map(Data::Bool)
            .ok_or_else(|| type_mismatch(ty, "bool", value)),
        TypeKind::Int => value
            .as_i64()
            .map(Data::Int)
            .ok_or_else(|| type_mismatch(ty, "int", value)),
        TypeKind::Count => value
            .as_u64()
            .map(Data::Count)
            .ok_or_else(|| type_mismatch(ty, "count", value)),
        TypeKind::Real => value
            .as_f64()
            .map(|f| Data::Real(vast_types::Real(f)))
            .ok_or_else(|| type_mismatch(ty, "real", value)),
        TypeKind::Time => match value {
            Value::String(s) => Ok(Data::Time(vast_expr::parse_time_point(s)?)),
            Value::Number(n) => n
                .as_i64()
                .map(Data::Time)
                .ok_or_else(|| type_mismatch(ty, "time", value)),
            _ => Err(type_mismatch(ty, "time", value)),
        },
        TypeKind::Duration => match value {
            Value::String(s) => Ok(Data::Duration(vast_expr::parse_duration(s)?)),
            Value::Number(n) => n
                .as_i64()
                .map(Data::Duration)
                .ok_or_else(|| type_mismatch(ty, "duration", value)),
            _ => Err(type_mismatch(ty, "duration", value)),
        },
        TypeKind::String => value
            .as_str()
            .map(|s| Data::String(s.to_string()))
            .ok_or_else(|| type_mismatch(ty, "string", value)),
        TypeKind::Pattern => value
            .as_str()
            .map(|s| Data::Pattern(s.to_string()))
            .ok_or_else(|| type_mismatch(ty, "pattern", value)),
        TypeKind::Address => value
            .as_str()
            .and_then(|s| s.parse::<IpAddr>().ok())
            .map(Data::Address)
            .ok_or_else(|| IngestError::InvalidValue(value.to_string(), "addr")),
        TypeKind::Subnet => value
            .as_str()
            .and_then(parse_subnet)
            .map(Data::Subnet)
            .ok_or_else(|| IngestError::InvalidValue(value.to_string(), "subnet")),
        TypeKind::Port => parse_port(value).ok_or_else(|| IngestError::InvalidValue(value.to_string(), "port")),
        TypeKind::Vector(elem) => {
            let items = value.as_array().ok_or_else(|| type_mismatch(ty, "vector", value))?;
            let converted: Result<Vec<Data>, IngestError> =
                items.iter().map(|v| json_to_data(v, elem)).collect();
            Ok(Data::Vector(converted?))
        }
        TypeKind::Set(elem) => {
            let items = value.as_array().ok_or_else(|| type_mismatch(ty, "set", value))?;
            let converted: Result<Vec<Data>, IngestError> =
                items.iter().map(|v| json_to_data(v, elem)).collect();
            Ok(Data::Set(converted?))
        }
        TypeKind::Table(_, val_ty) => {
            let obj = value.as_object().ok_or_else(|| type_mismatch(ty, "table", value))?;
            let mut table = BTreeMap::new();
            for (k, v) in obj {
                table.insert(k.clone(), json_to_data(v, val_ty)?);
            }
            Ok(Data::Table(table))
        }
        TypeKind::Record(record) => {
            let obj = value.as_object().ok_or_else(|| type_mismatch(ty, "record", value))?;
            build_record(obj, record)
        }
    }
}

fn build_record(
    obj: &serde_json::Map<String, Value>,
    record: &RecordType,
) -> Result<Data, IngestError> {
    let mut fields = Vec::with_capacity(record.len());
    for (name, field_ty) in record.fields() {
        let raw = obj.get(name).ok_or_else(|| IngestError::MissingField(name.clone()))?;
        fields.push((name.clone(), json_to_data(raw, field_ty)?));
    }
    Ok(Data::Record(fields))
}

fn parse_subnet(s: &str) -> Option<Subnet> {
    let (addr, prefix) = s.split_once('/')?;
    Some(Subnet { network: addr.parse().ok()?, prefix: prefix.parse().ok()? })
}

fn parse_port(value: &Value) -> Option<Data> {
    match value {
        Value::Number(n) => Some(Data::Port(Port { number: n.as_u64()? as u16, proto: None })),
        Value::Object(obj) => {
            let number = obj.get("number")?.as_u64()? as u16;
            let proto = obj.get("proto").and_then(|p| p.as_str()).map(str::to_string);
            Some(Data::Port(Port { number, proto }))
        }
        _ => None,
    }
}

fn type_mismatch(ty: &Type, expected: &'static str, found: &Value) -> IngestError {
    let _ = ty;
    IngestError::TypeMismatch { field: expected.to_string(), expected, found: found.to_string() }
}
