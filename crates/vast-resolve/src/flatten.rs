//! The flattening rule shared by every boolean visitor in both resolver
//! phases: empty collapses to `none`, a singleton unwraps, and anything
//! else keeps its compound shape. See `vast_expr::Expr` for why the AST's
//! own constructors deliberately don't do this themselves.

use vast_expr::Expr;

pub fn flatten_conjunction(operands: Vec<Expr>) -> Expr {
    flatten(operands, Expr::conjunction)
}

pub fn flatten_disjunction(operands: Vec<Expr>) -> Expr {
    flatten(operands, Expr::disjunction)
}

fn flatten(mut operands: Vec<Expr>, wrap: impl FnOnce(Vec<Expr>) -> Expr) -> Expr {
    match operands.len() {
        0 => Expr::none(),
        1 => operands.pop().unwrap(),
        _ => wrap(operands),
    }
}
