//! Tokenizer for query strings.

use crate::ast::RelOp;
use crate::error::ExprError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LParen,
    RParen,
    And,
    Or,
    Not,
    True,
    False,
    Op(RelOp),
    /// A quoted string literal, already unescaped.
    Str(String),
    /// An unquoted run of identifier/literal characters — a dotted schema
    /// key, a type-keyword, or a numeric/time/duration/address literal.
    /// The parser classifies it once it knows which position it occupies.
    Atom(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub position: usize,
}

fn is_atom_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | ':' | '+' | '-' | '/' | '_')
}

pub fn tokenize(input: &str) -> Result<Vec<SpannedToken>, ExprError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        let position = i;
        macro_rules! push {
            ($tok:expr, $width:expr) => {{
                tokens.push(SpannedToken { token: $tok, position });
                i += $width;
                continue;
            }};
        }

        match c {
            '(' => push!(Token::LParen, 1),
            ')' => push!(Token::RParen, 1),
            '~' => push!(Token::Op(RelOp::Match), 1),
            '\u{2208}' => push!(Token::Op(RelOp::In), 1),
            '\u{2209}' => push!(Token::Op(RelOp::NotIn), 1),
            '"' => {
                let (s, consumed) = scan_string(&chars[i..], position)?;
                tokens.push(SpannedToken { token: Token::Str(s), position });
                i += consumed;
                continue;
            }
            _ => {}
        }

        if matches(&chars, i, "==") {
            push!(Token::Op(RelOp::Eq), 2);
        }
        if matches(&chars, i, "!=") {
            push!(Token::Op(RelOp::Ne), 2);
        }
        if matches(&chars, i, "<=") {
            push!(Token::Op(RelOp::Le), 2);
        }
        if matches(&chars, i, ">=") {
            push!(Token::Op(RelOp::Ge), 2);
        }
        if matches(&chars, i, "!~") {
            push!(Token::Op(RelOp::NotMatch), 2);
        }
        if matches(&chars, i, "&&") {
            push!(Token::And, 2);
        }
        if matches(&chars, i, "||") {
            push!(Token::Or, 2);
        }
        if c == '<' {
            push!(Token::Op(RelOp::Lt), 1);
        }
        if c == '>' {
            push!(Token::Op(RelOp::Gt), 1);
        }
        if c == '!' {
            push!(Token::Not, 1);
        }

        if is_atom_char(c) {
            let start = i;
            while i < chars.len() && is_atom_char(chars[i]) {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            match word.to_ascii_lowercase().as_str() {
                "and" => tokens.push(SpannedToken { token: Token::And, position }),
                "or" => tokens.push(SpannedToken { token: Token::Or, position }),
                "not" => tokens.push(SpannedToken { token: Token::Not, position }),
                "true" => tokens.push(SpannedToken { token: Token::True, position }),
                "false" => tokens.push(SpannedToken { token: Token::False, position }),
                _ => tokens.push(SpannedToken { token: Token::Atom(word), position }),
            }
            continue;
        }

        return Err(ExprError::UnexpectedToken {
            position,
            expected: "a token".to_string(),
            found: c.to_string(),
        });
    }
    Ok(tokens)
}

fn matches(chars: &[char], pos: usize, needle: &str) -> bool {
    let needle: Vec<char> = needle.chars().collect();
    if pos + needle.len() > chars.len() {
        return false;
    }
    chars[pos..pos + needle.len()] == needle[..]
}

fn scan_string(rest: &[char], position: usize) -> Result<(String, usize), ExprError> {
    let mut out = String::new();
    let mut i = 1; // skip opening quote
    while i < rest.len() {
        match rest[i] {
            '"' => return Ok((out, i + 1)),
            '\\' if i + 1 < rest.len() => {
                out.push(rest[i + 1]);
                i += 2;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    Err(ExprError::UnterminatedString { position })
}
