//! Recursive-descent parser for query strings.
//!
//! ```text
//! expr        = or_expr
//! or_expr     = and_expr (("||" | OR) and_expr)*
//! and_expr    = not_expr (("&&" | AND) not_expr)*
//! not_expr    = ("!" | NOT) not_expr | primary
//! primary     = "(" expr ")" | predicate
//! predicate   = operand relop operand
//! operand     = STRING | ATOM | TRUE | FALSE
//! ```
//!
//! An `ATOM` is classified once the parser knows it occupies an operand
//! position: a type-keyword becomes a `type_extractor`, an address/time/
//! duration/number literal becomes `data`, anything else becomes a dotted
//! `schema_extractor` key. Field-offset literals (`data_extractor` written
//! directly in a query string) aren't part of this grammar — they arise
//! only from already-resolved expressions, never from what an operator
//! types, so there is no surface syntax for them here.

use std::net::IpAddr;

use vast_types::{Data, Subnet, Type};

use super::token::{tokenize, SpannedToken, Token};
use crate::ast::{Expr, Operand, RelOp};
use crate::duration::parse_duration;
use crate::error::ExprError;
use crate::glob::glob_to_regex;
use crate::timepoint::parse_time_point;

pub struct QueryParser;

impl QueryParser {
    pub fn parse(input: &str) -> Result<Expr, ExprError> {
        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            return Ok(Expr::None);
        }
        let mut pos = 0;
        let expr = parse_or(&tokens, &mut pos)?;
        if pos != tokens.len() {
            let tok = &tokens[pos];
            return Err(ExprError::UnexpectedToken {
                position: tok.position,
                expected: "end of query".to_string(),
                found: format!("{:?}", tok.token),
            });
        }
        Ok(expr)
    }
}

fn parse_or(tokens: &[SpannedToken], pos: &mut usize) -> Result<Expr, ExprError> {
    let mut operands = vec![parse_and(tokens, pos)?];
    while matches!(peek(tokens, *pos), Some(Token::Or)) {
        *pos += 1;
        operands.push(parse_and(tokens, pos)?);
    }
    Ok(if operands.len() == 1 {
        operands.pop().unwrap()
    } else {
        Expr::disjunction(operands)
    })
}

fn parse_and(tokens: &[SpannedToken], pos: &mut usize) -> Result<Expr, ExprError> {
    let mut operands = vec![parse_not(tokens, pos)?];
    while matches!(peek(tokens, *pos), Some(Token::And)) {
        *pos += 1;
        operands.push(parse_not(tokens, pos)?);
    }
    Ok(if operands.len() == 1 {
        operands.pop().unwrap()
    } else {
        Expr::conjunction(operands)
    })
}

fn parse_not(tokens: &[SpannedToken], pos: &mut usize) -> Result<Expr, ExprError> {
    if matches!(peek(tokens, *pos), Some(Token::Not)) {
        *pos += 1;
        return Ok(Expr::negation(parse_not(tokens, pos)?));
    }
    parse_primary(tokens, pos)
}

fn parse_primary(tokens: &[SpannedToken], pos: &mut usize) -> Result<Expr, ExprError> {
    if matches!(peek(tokens, *pos), Some(Token::LParen)) {
        *pos += 1;
        let inner = parse_or(tokens, pos)?;
        match peek(tokens, *pos) {
            Some(Token::RParen) => {
                *pos += 1;
                return Ok(inner);
            }
            _ => {
                return Err(ExprError::UnexpectedEof { expected: "')'".to_string() });
            }
        }
    }
    parse_predicate(tokens, pos)
}

fn parse_predicate(tokens: &[SpannedToken], pos: &mut usize) -> Result<Expr, ExprError> {
    let lhs = parse_operand(tokens, pos)?;
    let op = match peek(tokens, *pos) {
        Some(Token::Op(op)) => *op,
        other => {
            return Err(ExprError::UnexpectedToken {
                position: tokens.get(*pos).map(|t| t.position).unwrap_or(0),
                expected: "a relational operator".to_string(),
                found: format!("{other:?}"),
            })
        }
    };
    *pos += 1;
    let rhs = parse_operand(tokens, pos)?;
    let rhs = if matches!(op, RelOp::Match | RelOp::NotMatch) {
        match rhs {
            Operand::Data(Data::String(s)) => Operand::data(Data::Pattern(glob_to_regex(&s))),
            other => other,
        }
    } else {
        rhs
    };
    Ok(Expr::predicate(lhs, op, rhs))
}

fn parse_operand(tokens: &[SpannedToken], pos: &mut usize) -> Result<Operand, ExprError> {
    let Some(spanned) = tokens.get(*pos) else {
        return Err(ExprError::UnexpectedEof { expected: "an operand".to_string() });
    };
    *pos += 1;
    match &spanned.token {
        Token::Str(s) => Ok(Operand::data(Data::String(s.clone()))),
        Token::True => Ok(Operand::data(Data::Bool(true))),
        Token::False => Ok(Operand::data(Data::Bool(false))),
        Token::Atom(word) => classify_atom(word),
        other => Err(ExprError::UnexpectedToken {
            position: spanned.position,
            expected: "an operand".to_string(),
            found: format!("{other:?}"),
        }),
    }
}

fn peek(tokens: &[SpannedToken], pos: usize) -> Option<&Token> {
    tokens.get(pos).map(|t| &t.token)
}

fn type_keyword(word: &str) -> Option<Type> {
    Some(match word {
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
        _ => return None,
    })
}

fn classify_atom(word: &str) -> Result<Operand, ExprError> {
    if let Some(ty) = type_keyword(word) {
        return Ok(Operand::of_type(ty));
    }
    if let Ok(data) = classify_literal(word) {
        return Ok(Operand::data(data));
    }
    let key: Vec<String> = word.split('.').map(str::to_string).collect();
    Ok(Operand::schema(key))
}

fn classify_literal(word: &str) -> Result<Data, ExprError> {
    if let Some((addr, prefix)) = word.split_once('/') {
        let network: IpAddr = addr.parse().map_err(|_| literal_err(word))?;
        let prefix: u8 = prefix.parse().map_err(|_| literal_err(word))?;
        return Ok(Data::Subnet(Subnet { network, prefix }));
    }
    if let Ok(addr) = word.parse::<IpAddr>() {
        return Ok(Data::Address(addr));
    }
    if looks_like_time(word) {
        let ns = parse_time_point(word)?;
        return Ok(Data::Time(ns));
    }
    if let Ok(ns) = parse_duration(word) {
        return Ok(Data::Duration(ns));
    }
    if let Ok(i) = word.parse::<i64>() {
        return Ok(Data::Int(i));
    }
    if let Ok(f) = word.parse::<f64>() {
        return Ok(Data::Real(vast_types::Real(f)));
    }
    Err(literal_err(word))
}

fn looks_like_time(word: &str) -> bool {
    if word.starts_with("now") || word.starts_with('@') {
        return true;
    }
    let digits_then_dash = word.len() >= 5
        && word.as_bytes()[..4].iter().all(u8::is_ascii_digit)
        && word.as_bytes()[4] == b'-';
    digits_then_dash
}

fn literal_err(word: &str) -> ExprError {
    ExprError::InvalidLiteral { text: word.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Extractor, Predicate};
    use vast_types::Offset;

    fn predicate(op: RelOp, lhs: Operand, rhs: Operand) -> Expr {
        Expr::Predicate(Predicate { lhs, op, rhs })
    }

    #[test]
    fn parses_simple_equality() {
        let expr = QueryParser::parse("service == \"http\"").unwrap();
        assert_eq!(
            expr,
            predicate(
                RelOp::Eq,
                Operand::schema(vec!["service".to_string()]),
                Operand::data(Data::String("http".to_string()))
            )
        );
    }

    #[test]
    fn parses_dotted_key() {
        let expr = QueryParser::parse("id.orig_h == 10.0.0.1").unwrap();
        match expr {
            Expr::Predicate(Predicate { lhs, rhs, .. }) => {
                assert_eq!(lhs, Operand::schema(vec!["id".to_string(), "orig_h".to_string()]));
                assert!(matches!(rhs, Operand::Data(Data::Address(_))));
            }
            _ => panic!("expected predicate"),
        }
    }

    #[test]
    fn parses_type_keyword_lhs() {
        let expr = QueryParser::parse("count > 10").unwrap();
        match expr {
            Expr::Predicate(Predicate { lhs, .. }) => {
                assert!(matches!(lhs, Operand::Extractor(Extractor::Type(_))));
            }
            _ => panic!("expected predicate"),
        }
    }

    #[test]
    fn parses_conjunction() {
        let expr = QueryParser::parse("a == 1 && b == 2").unwrap();
        match expr {
            Expr::Conjunction(ops) => assert_eq!(ops.len(), 2),
            _ => panic!("expected conjunction"),
        }
    }

    #[test]
    fn parses_disjunction_of_conjunctions_with_precedence() {
        let expr = QueryParser::parse("a == 1 && b == 2 || c == 3").unwrap();
        match expr {
            Expr::Disjunction(ops) => {
                assert_eq!(ops.len(), 2);
                assert!(matches!(ops[0], Expr::Conjunction(_)));
            }
            _ => panic!("expected disjunction of conjunction and predicate"),
        }
    }

    #[test]
    fn parses_negation() {
        let expr = QueryParser::parse("! a == 1").unwrap();
        assert!(matches!(expr, Expr::Negation(_)));
    }

    #[test]
    fn parses_parens() {
        let expr = QueryParser::parse("(a == 1 || b == 2) && c == 3").unwrap();
        match expr {
            Expr::Conjunction(ops) => {
                assert!(matches!(ops[0], Expr::Disjunction(_)));
            }
            _ => panic!("expected conjunction"),
        }
    }

    #[test]
    fn match_operator_converts_string_to_pattern() {
        let expr = QueryParser::parse("host ~ \"*.example.com\"").unwrap();
        match expr {
            Expr::Predicate(Predicate { rhs, .. }) => {
                assert!(matches!(rhs, Operand::Data(Data::Pattern(_))));
            }
            _ => panic!("expected predicate"),
        }
    }

    #[test]
    fn parses_duration_literal() {
        let expr = QueryParser::parse("duration > 5m").unwrap();
        match expr {
            Expr::Predicate(Predicate { rhs, .. }) => {
                assert_eq!(rhs, Operand::data(Data::Duration(5 * 60_000_000_000)));
            }
            _ => panic!("expected predicate"),
        }
    }

    #[test]
    fn parses_now_relative_time() {
        let expr = QueryParser::parse("ts > now-1h").unwrap();
        match expr {
            Expr::Predicate(Predicate { rhs, .. }) => {
                assert!(matches!(rhs, Operand::Data(Data::Time(_))));
            }
            _ => panic!("expected predicate"),
        }
    }

    #[test]
    fn resolved_offset_has_no_surface_syntax() {
        let resolved = Operand::resolved(Type::count(), Offset::root());
        assert!(matches!(resolved, Operand::Extractor(Extractor::Data { .. })));
    }

    #[test]
    fn missing_operator_errors() {
        assert!(QueryParser::parse("a 1").is_err());
    }

    #[test]
    fn unmatched_paren_errors() {
        assert!(QueryParser::parse("(a == 1").is_err());
    }
}
