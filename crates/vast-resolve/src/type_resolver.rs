//! `type_resolve`: specializes an already schema-resolved expression for
//! one concrete event type, pruning branches that type can't satisfy.
//!
//! Ported from `vast::expr::type_resolver`. Conjunction semantics differ
//! from the schema phase on purpose: here, any operand collapsing to
//! `none` makes the *entire* conjunction inapplicable to this event type —
//! a conjunct referencing a field this type doesn't have can never be
//! satisfied by an event of this type.

use vast_types::{congruent, Offset, Type};

use vast_expr::{Expr, Extractor, Operand, Predicate, RelOp};

use crate::flatten::{flatten_conjunction, flatten_disjunction};

/// Specializes `expr` for `event_type`, never failing: an extractor this
/// type cannot satisfy simply resolves to `none`.
pub fn type_resolve(event_type: &Type, expr: &Expr) -> Expr {
    match expr {
        Expr::None => Expr::None,
        Expr::Conjunction(operands) => {
            let mut resolved = Vec::with_capacity(operands.len());
            for operand in operands {
                let r = type_resolve(event_type, operand);
                if r.is_none() {
                    return Expr::None;
                }
                resolved.push(r);
            }
            flatten_conjunction(resolved)
        }
        Expr::Disjunction(operands) => {
            let resolved: Vec<Expr> = operands
                .iter()
                .map(|operand| type_resolve(event_type, operand))
                .filter(|e| !e.is_none())
                .collect();
            flatten_disjunction(resolved)
        }
        Expr::Negation(inner) => {
            let r = type_resolve(event_type, inner);
            if r.is_none() {
                Expr::None
            } else {
                Expr::negation(r)
            }
        }
        Expr::Predicate(p) => resolve_predicate(event_type, p),
    }
}

fn resolve_predicate(event_type: &Type, p: &Predicate) -> Expr {
    match &p.lhs {
        Operand::Extractor(Extractor::Type(wanted)) => {
            resolve_type_extractor(event_type, wanted, p.op, &p.rhs)
        }
        Operand::Extractor(Extractor::Data { ty, .. }) => {
            if ty == event_type {
                Expr::Predicate(p.clone())
            } else {
                Expr::None
            }
        }
        _ => Expr::Predicate(p.clone()),
    }
}

/// Walks every leaf of `event_type`, emitting a `data_extractor` predicate
/// for each leaf whose type is congruent to `wanted`. For a non-record
/// `event_type`, [`vast_types::Type::leaves`] yields exactly one leaf —
/// itself at the root offset — so this also covers the scalar-event case
/// without a separate branch.
fn resolve_type_extractor(event_type: &Type, wanted: &Type, op: RelOp, rhs: &Operand) -> Expr {
    let disjuncts: Vec<Expr> = event_type
        .leaves()
        .into_iter()
        .filter_map(|(trace, offset): (Vec<Type>, Offset)| {
            let leaf = trace.last()?;
            congruent(leaf, wanted).then(|| {
                Expr::predicate(Operand::resolved(event_type.clone(), offset), op, rhs.clone())
            })
        })
        .collect();
    flatten_disjunction(disjuncts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vast_types::{Data, RecordType};

    fn conn_type() -> Type {
        let id = RecordType::new(vec![
            ("orig_h".to_string(), Type::address()),
            ("resp_h".to_string(), Type::address()),
        ]);
        Type::record(RecordType::new(vec![
            ("id".to_string(), Type::record(id)),
            ("bytes".to_string(), Type::count()),
        ]))
        .named("conn")
    }

    fn type_extractor_predicate(ty: Type) -> Expr {
        Expr::predicate(Operand::of_type(ty), RelOp::Eq, Operand::data(Data::Count(5)))
    }

    #[test]
    fn type_extractor_matches_every_congruent_leaf() {
        let conn = conn_type();
        let expr = type_extractor_predicate(Type::address());
        let resolved = type_resolve(&conn, &expr);
        match resolved {
            Expr::Disjunction(ops) => assert_eq!(ops.len(), 2),
            other => panic!("expected 2-way disjunction, got {other:?}"),
        }
    }

    #[test]
    fn type_extractor_with_single_match_unwraps() {
        let conn = conn_type();
        let expr = type_extractor_predicate(Type::count());
        let resolved = type_resolve(&conn, &expr);
        assert!(matches!(resolved, Expr::Predicate(_)));
    }

    #[test]
    fn type_extractor_with_no_match_is_none() {
        let conn = conn_type();
        let expr = type_extractor_predicate(Type::string());
        assert!(type_resolve(&conn, &expr).is_none());
    }

    #[test]
    fn non_record_event_type_checks_congruence_directly() {
        let flag = Type::bool().named("heartbeat");
        let matching = type_extractor_predicate(Type::bool());
        let resolved = type_resolve(&flag, &matching);
        assert!(matches!(resolved, Expr::Predicate(_)));

        let not_matching = type_extractor_predicate(Type::string());
        assert!(type_resolve(&flag, &not_matching).is_none());
    }

    #[test]
    fn data_extractor_requires_exact_type_equality() {
        let conn = conn_type();
        let other = Type::record(RecordType::new(vec![])).named("other");
        let predicate = Expr::predicate(
            Operand::resolved(conn.clone(), Offset::root()),
            RelOp::Eq,
            Operand::data(Data::Bool(true)),
        );
        assert!(matches!(type_resolve(&conn, &predicate), Expr::Predicate(_)));
        assert!(type_resolve(&other, &predicate).is_none());
    }

    #[test]
    fn conjunction_collapses_entirely_on_one_unsatisfiable_operand() {
        let conn = conn_type();
        let expr = Expr::conjunction(vec![
            type_extractor_predicate(Type::count()),
            type_extractor_predicate(Type::string()),
        ]);
        assert!(type_resolve(&conn, &expr).is_none());
    }

    #[test]
    fn disjunction_drops_unsatisfiable_operands() {
        let conn = conn_type();
        let expr = Expr::disjunction(vec![
            type_extractor_predicate(Type::count()),
            type_extractor_predicate(Type::string()),
        ]);
        assert!(matches!(type_resolve(&conn, &expr), Expr::Predicate(_)));
    }

    #[test]
    fn negation_of_none_is_none() {
        let conn = conn_type();
        let expr = Expr::negation(type_extractor_predicate(Type::string()));
        assert!(type_resolve(&conn, &expr).is_none());
    }

    #[test]
    fn passthrough_predicates_with_no_lhs_extractor_are_unchanged() {
        let conn = conn_type();
        let expr = Expr::predicate(
            Operand::data(Data::Count(1)),
            RelOp::Eq,
            Operand::data(Data::Count(1)),
        );
        assert_eq!(type_resolve(&conn, &expr), expr);
    }
}
