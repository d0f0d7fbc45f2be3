//! Direct evaluation of a resolved expression against a single rehydrated
//! event — the last step of a query (spec.md §4.8, "apply the predicate to
//! eliminate index false positives"). An index's attribute lookup can
//! overapproximate (e.g. a regex match returning every indexed value that
//! merely looks like a candidate); this is the precise check.

use vast_expr::{Expr, Extractor, Operand, Predicate};
use vast_types::{congruent, Data, Event, Offset};

pub fn matches(expr: &Expr, event: &Event) -> bool {
    match expr {
        Expr::None => false,
        Expr::Conjunction(ops) => ops.iter().all(|op| matches(op, event)),
        Expr::Disjunction(ops) => ops.iter().any(|op| matches(op, event)),
        Expr::Negation(inner) => !matches(inner, event),
        Expr::Predicate(p) => matches_predicate(p, event),
    }
}

fn matches_predicate(p: &Predicate, event: &Event) -> bool {
    if let Operand::Extractor(Extractor::Type(ty)) = &p.lhs {
        return congruent(ty, &event.ty);
    }
    let (Some(lhs), Some(rhs)) = (operand_value(&p.lhs, event), operand_value(&p.rhs, event)) else {
        return false;
    };
    vast_index::compare(lhs, p.op, rhs)
}

fn operand_value<'a>(operand: &'a Operand, event: &'a Event) -> Option<&'a Data> {
    match operand {
        Operand::Data(d) => Some(d),
        Operand::Extractor(Extractor::Data { ty, offset }) => {
            if !congruent(ty, &event.ty) {
                return None;
            }
            data_at(&event.value, offset)
        }
        Operand::Extractor(Extractor::Type(_) | Extractor::Schema { .. }) => None,
    }
}

fn data_at<'a>(value: &'a Data, offset: &Offset) -> Option<&'a Data> {
    let mut current = value;
    for &index in offset.as_slice() {
        match current {
            Data::Record(fields) => current = &fields.get(index)?.1,
            _ => return None,
        }
    }
    Some(current)
}
