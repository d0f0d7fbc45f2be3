//! An immutable, name-indexed collection of event types.

use std::collections::HashMap;

use vast_types::{congruent, Offset, Type};

use crate::error::SchemaError;
use crate::load;

/// A snapshot of every named event type a store or query session knows
/// about.
///
/// A `Schema` is built once (from TOML, or by hand via [`Schema::new`]) and
/// never mutated afterwards; resolvers and the CLI both hold it behind a
/// shared reference.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    types: Vec<Type>,
    by_name: HashMap<String, usize>,
}

impl Schema {
    /// Builds a schema from a flat list of named types, checking invariant
    /// (i): no two distinct, non-congruent types may share a name.
    pub fn new(types: Vec<Type>) -> Result<Self, SchemaError> {
        let mut schema = Schema::default();
        for ty in types {
            schema.insert(ty)?;
        }
        Ok(schema)
    }

    /// Parses a TOML schema description (see [`crate::load`] for the
    /// grammar) and builds the resulting schema.
    pub fn from_toml(source: &str) -> Result<Self, SchemaError> {
        let declared = load::parse_toml(source)?;
        let mut schema = Schema::default();
        for (ty, aliases) in declared {
            let ty = aliases.into_iter().fold(ty, |t, a| t.with_alias(a));
            schema.insert(ty)?;
        }
        Ok(schema)
    }

    fn insert(&mut self, ty: Type) -> Result<(), SchemaError> {
        let Some(name) = ty.name().map(str::to_string) else {
            return Ok(());
        };
        if let Some(&existing) = self.by_name.get(&name) {
            if !congruent(&self.types[existing], &ty) {
                return Err(SchemaError::DuplicateName { name });
            }
            return Ok(());
        }
        let names: Vec<String> = std::iter::once(name.clone())
            .chain(ty.aliases().iter().cloned())
            .collect();
        let index = self.types.len();
        self.types.push(ty);
        for alias in names {
            self.by_name.entry(alias).or_insert(index);
        }
        Ok(())
    }

    /// All named types in this schema, in declaration order.
    pub fn types(&self) -> &[Type] {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Looks up a type by its canonical name or any registered alias.
    pub fn get(&self, name: &str) -> Option<&Type> {
        self.by_name.get(name).map(|&i| &self.types[i])
    }

    /// Finds every `(type, offset, trace)` in the schema whose field path
    /// ends in `key`.
    ///
    /// If `key` has exactly one element and it names a type in the schema
    /// directly (rather than a field of one), that type also matches, at
    /// the root offset — a bare `schema_extractor{key}` for a whole event,
    /// not one of its fields.
    pub fn find_suffix<'a>(&'a self, key: &[String]) -> Vec<(&'a Type, Offset, Vec<Type>)> {
        let mut out = Vec::new();
        for ty in &self.types {
            match ty.as_record() {
                Some(record) => {
                    for (offset, trace) in record.find_suffix(key) {
                        out.push((ty, offset, trace));
                    }
                }
                None => {
                    if key.len() == 1 && ty.name() == Some(key[0].as_str()) {
                        out.push((ty, Offset::root(), vec![ty.clone()]));
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vast_types::RecordType;

    fn conn_type() -> Type {
        let id = RecordType::new(vec![
            ("orig_h".to_string(), Type::address()),
            ("resp_h".to_string(), Type::address()),
        ]);
        Type::record(RecordType::new(vec![
            ("id".to_string(), Type::record(id)),
            ("service".to_string(), Type::string()),
        ]))
        .named("conn")
    }

    #[test]
    fn get_finds_by_name_and_alias() {
        let ty = Type::count().named("bytes").with_alias("octets");
        let schema = Schema::new(vec![ty]).unwrap();
        assert!(schema.get("bytes").is_some());
        assert!(schema.get("octets").is_some());
        assert!(schema.get("nope").is_none());
    }

    #[test]
    fn duplicate_congruent_names_merge() {
        let a = Type::count().named("bytes");
        let b = Type::count().named("bytes");
        let schema = Schema::new(vec![a, b]).unwrap();
        assert_eq!(schema.len(), 1);
    }

    #[test]
    fn duplicate_incongruent_names_error() {
        let a = Type::count().named("bytes");
        let b = Type::string().named("bytes");
        let err = Schema::new(vec![a, b]).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateName { name: "bytes".to_string() });
    }

    #[test]
    fn find_suffix_matches_nested_field() {
        let schema = Schema::new(vec![conn_type()]).unwrap();
        let matches = schema.find_suffix(&["orig_h".to_string()]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].1, Offset::new(vec![0, 0]));
    }

    #[test]
    fn find_suffix_matches_non_record_type_by_bare_name() {
        // Only non-record types match their own bare name: a record type's
        // fields are what `find_suffix` searches, so `conn` itself (whose
        // fields are "id"/"service") never matches its own name — matching
        // spec.md §4.4.1's per-type-kind resolver rules.
        let flag = Type::bool().named("heartbeat");
        let schema = Schema::new(vec![flag]).unwrap();
        let matches = schema.find_suffix(&["heartbeat".to_string()]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].1, Offset::root());
    }

    #[test]
    fn find_suffix_record_type_does_not_match_its_own_bare_name() {
        let schema = Schema::new(vec![conn_type()]).unwrap();
        let matches = schema.find_suffix(&["conn".to_string()]);
        assert!(matches.is_empty());
    }

    #[test]
    fn find_suffix_across_multiple_types() {
        let other = Type::record(RecordType::new(vec![("service".to_string(), Type::string())]))
            .named("dns");
        let schema = Schema::new(vec![conn_type(), other]).unwrap();
        let matches = schema.find_suffix(&["service".to_string()]);
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn from_toml_builds_schema() {
        let src = r#"
            [[type]]
            name = "conn"
            [[type.fields]]
            name = "service"
            kind = "string"
        "#;
        let schema = Schema::from_toml(src).unwrap();
        assert!(schema.get("conn").is_some());
    }
}
