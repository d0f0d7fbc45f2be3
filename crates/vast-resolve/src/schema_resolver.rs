//! `schema_resolve`: rewrites `schema_extractor` leaves into concrete
//! `data_extractor` disjunctions against a [`Schema`].
//!
//! Ported from `vast::expr::schema_resolver` — see `resolver.cc` in the
//! original C++ sources. The conjunction phase collapses to `none` as soon
//! as any operand does (a predicate that can't resolve against any type in
//! the schema makes the whole conjunct meaningless, not just absent).

use vast_schema::Schema;
use vast_types::{congruent, Offset, Type};

use vast_expr::{Expr, Extractor, Operand, Predicate, RelOp};

use crate::error::ResolveError;
use crate::flatten::{flatten_conjunction, flatten_disjunction};

/// Resolves every `schema_extractor` in `expr` against `schema`, producing
/// an expression whose only extractor leaves are `data_extractor` and
/// `type_extractor`.
pub fn schema_resolve(schema: &Schema, expr: &Expr) -> Result<Expr, ResolveError> {
    match expr {
        Expr::None => Ok(Expr::None),
        Expr::Conjunction(operands) => {
            let mut resolved = Vec::with_capacity(operands.len());
            for operand in operands {
                let r = schema_resolve(schema, operand)?;
                if r.is_none() {
                    return Ok(Expr::None);
                }
                resolved.push(r);
            }
            Ok(flatten_conjunction(resolved))
        }
        Expr::Disjunction(operands) => {
            let mut resolved = Vec::with_capacity(operands.len());
            for operand in operands {
                let r = schema_resolve(schema, operand)?;
                if !r.is_none() {
                    resolved.push(r);
                }
            }
            Ok(flatten_disjunction(resolved))
        }
        Expr::Negation(inner) => {
            let r = schema_resolve(schema, inner)?;
            Ok(if r.is_none() { Expr::None } else { Expr::negation(r) })
        }
        Expr::Predicate(p) => resolve_predicate(schema, p),
    }
}

fn resolve_predicate(schema: &Schema, p: &Predicate) -> Result<Expr, ResolveError> {
    if let Operand::Extractor(Extractor::Schema { key }) = &p.lhs {
        return resolve_schema_extractor(schema, key, p.op, &p.rhs);
    }
    if let Operand::Extractor(Extractor::Schema { key }) = &p.rhs {
        return resolve_schema_extractor(schema, key, p.op, &p.lhs);
    }
    Ok(Expr::Predicate(p.clone()))
}

/// Rewrites a single `schema_extractor{key}` into a disjunction of
/// `data_extractor` predicates, one per matching type in the schema.
fn resolve_schema_extractor(
    schema: &Schema,
    key: &[String],
    op: RelOp,
    other: &Operand,
) -> Result<Expr, ResolveError> {
    let mut disjuncts = Vec::new();
    for ty in schema.types() {
        match ty.as_record() {
            None => {
                if key.len() == 1 && ty.name() == Some(key[0].as_str()) {
                    disjuncts.push(Expr::predicate(
                        Operand::resolved(ty.clone(), Offset::root()),
                        op,
                        other.clone(),
                    ));
                }
            }
            Some(record) => {
                let trace = record.find_suffix(key);
                if trace.is_empty() {
                    continue;
                }
                let first_offset = &trace[0].0;
                let first_type = record
                    .at(first_offset)
                    .expect("offset produced by find_suffix is always valid");
                for (offset, _) in &trace {
                    let field_type = record
                        .at(offset)
                        .expect("offset produced by find_suffix is always valid");
                    if !congruent(first_type, field_type) {
                        return Err(ResolveError::TypeClash {
                            type_name: display_name(ty),
                            a: display_name(first_type),
                            b: display_name(field_type),
                        });
                    }
                }
                for (offset, _) in trace {
                    disjuncts.push(Expr::predicate(
                        Operand::resolved(ty.clone(), offset),
                        op,
                        other.clone(),
                    ));
                }
            }
        }
    }
    if disjuncts.is_empty() {
        return Err(ResolveError::InvalidKey { key: key.to_vec() });
    }
    Ok(flatten_disjunction(disjuncts))
}

fn display_name(ty: &Type) -> String {
    ty.name().unwrap_or("<anonymous>").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vast_types::{Data, RecordType};

    fn conn_schema() -> Schema {
        let id = RecordType::new(vec![
            ("orig_h".to_string(), Type::address()),
            ("resp_h".to_string(), Type::address()),
        ]);
        let conn = Type::record(RecordType::new(vec![
            ("id".to_string(), Type::record(id)),
            ("service".to_string(), Type::string()),
        ]))
        .named("conn");
        Schema::new(vec![conn]).unwrap()
    }

    fn eq_predicate(key: &str, data: Data) -> Expr {
        Expr::predicate(
            Operand::schema(key.split('.').map(str::to_string).collect()),
            RelOp::Eq,
            Operand::data(data),
        )
    }

    #[test]
    fn resolves_single_match_without_disjunction_wrapper() {
        let schema = conn_schema();
        let expr = eq_predicate("service", Data::String("http".to_string()));
        let resolved = schema_resolve(&schema, &expr).unwrap();
        match resolved {
            Expr::Predicate(p) => {
                assert_eq!(p.lhs, Operand::resolved(Type::string(), Offset::new(vec![1])));
            }
            other => panic!("expected predicate, got {other:?}"),
        }
    }

    #[test]
    fn unknown_key_is_invalid_key_error() {
        let schema = conn_schema();
        let expr = eq_predicate("nonexistent", Data::Bool(true));
        let err = schema_resolve(&schema, &expr).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidKey { .. }));
    }

    #[test]
    fn bare_type_name_resolves_to_root_offset_for_non_record_types() {
        // Only non-record event types match their own bare name: a record
        // type's fields are "id"/"service", not "conn" itself, so
        // find_suffix(["conn"]) against `conn_schema()` would find nothing.
        let flag = Type::bool().named("heartbeat");
        let schema = Schema::new(vec![flag]).unwrap();
        let expr = eq_predicate("heartbeat", Data::Bool(true));
        let resolved = schema_resolve(&schema, &expr).unwrap();
        match resolved {
            Expr::Predicate(p) => {
                assert_eq!(p.lhs, Operand::resolved(Type::bool().named("heartbeat"), Offset::root()));
            }
            other => panic!("expected predicate, got {other:?}"),
        }
    }

    #[test]
    fn record_type_does_not_match_its_own_bare_name() {
        let schema = conn_schema();
        let expr = eq_predicate("conn", Data::Bool(true));
        let err = schema_resolve(&schema, &expr).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidKey { .. }));
    }

    #[test]
    fn conjunction_collapses_to_none_on_unresolvable_operand() {
        let schema = Schema::new(vec![]).unwrap();
        let expr = Expr::conjunction(vec![
            eq_predicate("whatever", Data::Bool(true)),
        ]);
        // an empty schema makes every schema_extractor an invalid key, not a none —
        // so this exercises the error path, not the none-collapse path.
        assert!(schema_resolve(&schema, &expr).is_err());
    }

    #[test]
    fn disjunction_drops_resolved_none_operands() {
        let schema = conn_schema();
        let expr = Expr::disjunction(vec![Expr::None, eq_predicate("service", Data::Bool(true))]);
        let resolved = schema_resolve(&schema, &expr).unwrap();
        assert!(matches!(resolved, Expr::Predicate(_)));
    }

    #[test]
    fn type_clash_is_reported_with_both_type_names() {
        let mixed = RecordType::new(vec![
            ("a".to_string(), Type::record(RecordType::new(vec![(
                "x".to_string(),
                Type::count(),
            )]))),
            ("b".to_string(), Type::record(RecordType::new(vec![(
                "x".to_string(),
                Type::string(),
            )]))),
        ]);
        let schema = Schema::new(vec![Type::record(mixed).named("mixed")]).unwrap();
        let expr = eq_predicate("x", Data::Bool(true));
        let err = schema_resolve(&schema, &expr).unwrap_err();
        assert!(matches!(err, ResolveError::TypeClash { .. }));
    }
}
