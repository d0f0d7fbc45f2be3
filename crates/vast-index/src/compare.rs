//! Literal-vs-literal predicate evaluation, for the rare case where
//! `schema_resolve`/`type_resolve` leave a predicate with a data literal on
//! both sides (no `data_extractor` survives). `Partition::evaluate`
//! delegates here instead of touching an `AttributeIndex`.

use std::cmp::Ordering;

use vast_expr::RelOp;
use vast_types::Data;

/// Compares `lhs op rhs`. Variant mismatches (e.g. comparing a string to a
/// count) are never equal and never ordered, so every operator but `!=`
/// reports `false`.
pub fn compare(lhs: &Data, op: RelOp, rhs: &Data) -> bool {
    match op {
        RelOp::Eq => lhs == rhs,
        RelOp::Ne => lhs != rhs,
        RelOp::Lt => ordering(lhs, rhs) == Some(Ordering::Less),
        RelOp::Le => matches!(ordering(lhs, rhs), Some(Ordering::Less | Ordering::Equal)),
        RelOp::Gt => ordering(lhs, rhs) == Some(Ordering::Greater),
        RelOp::Ge => matches!(ordering(lhs, rhs), Some(Ordering::Greater | Ordering::Equal)),
        RelOp::Match => regex_match(lhs, rhs, false),
        RelOp::NotMatch => regex_match(lhs, rhs, true),
        RelOp::In => membership(lhs, rhs, false),
        RelOp::NotIn => membership(lhs, rhs, true),
    }
}

fn ordering(lhs: &Data, rhs: &Data) -> Option<Ordering> {
    match (lhs, rhs) {
        (Data::Bool(a), Data::Bool(b)) => Some(a.cmp(b)),
        (Data::Int(a), Data::Int(b)) => Some(a.cmp(b)),
        (Data::Count(a), Data::Count(b)) => Some(a.cmp(b)),
        (Data::Real(a), Data::Real(b)) => Some(a.0.total_cmp(&b.0)),
        (Data::Time(a), Data::Time(b)) => Some(a.cmp(b)),
        (Data::Duration(a), Data::Duration(b)) => Some(a.cmp(b)),
        (Data::String(a), Data::String(b)) => Some(a.cmp(b)),
        (Data::Address(a), Data::Address(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn regex_match(lhs: &Data, rhs: &Data, negate: bool) -> bool {
    let (Data::String(text), Data::Pattern(pattern) | Data::String(pattern)) = (lhs, rhs) else {
        return false;
    };
    match regex::Regex::new(pattern) {
        Ok(re) => re.is_match(text) != negate,
        Err(_) => false,
    }
}

fn membership(lhs: &Data, rhs: &Data, negate: bool) -> bool {
    let elements: &[Data] = match rhs {
        Data::Vector(v) | Data::Set(v) => v,
        _ => return false,
    };
    elements.contains(lhs) != negate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_literals_of_the_same_variant() {
        assert!(compare(&Data::Count(5), RelOp::Eq, &Data::Count(5)));
        assert!(!compare(&Data::Count(5), RelOp::Eq, &Data::Count(6)));
    }

    #[test]
    fn mismatched_variants_are_never_ordered() {
        assert!(!compare(&Data::Count(5), RelOp::Lt, &Data::String("5".to_string())));
        assert!(compare(&Data::Count(5), RelOp::Ne, &Data::String("5".to_string())));
    }

    #[test]
    fn ordering_operators_compare_within_variant() {
        assert!(compare(&Data::Int(1), RelOp::Lt, &Data::Int(2)));
        assert!(compare(&Data::Int(2), RelOp::Ge, &Data::Int(2)));
    }

    #[test]
    fn in_checks_set_membership() {
        let set = Data::Set(vec![Data::Count(1), Data::Count(2)]);
        assert!(compare(&Data::Count(1), RelOp::In, &set));
        assert!(compare(&Data::Count(3), RelOp::NotIn, &set));
    }
}
