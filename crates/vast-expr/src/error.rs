//! Errors raised while parsing query strings or literal grammars.

/// Errors raised by the query-string tokenizer and parser, and by the
/// duration/time-point/glob grammars it leans on.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ExprError {
    #[error("unexpected token at position {position}: expected {expected}, found '{found}'")]
    UnexpectedToken {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("unexpected end of query: expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("unmatched closing parenthesis at position {position}")]
    UnmatchedCloseParen { position: usize },

    #[error("unterminated string literal starting at position {position}")]
    UnterminatedString { position: usize },

    #[error("'{text}' is not a valid relational operator")]
    UnknownOperator { text: String },

    #[error("'{text}' is not a valid literal")]
    InvalidLiteral { text: String },

    #[error("empty duration")]
    EmptyDuration,

    #[error("'{text}' is not a valid duration")]
    InvalidDuration { text: String },

    #[error("'{unit}' is not a recognized duration unit")]
    UnknownUnit { unit: String },

    #[error("'{text}' is not a valid time point")]
    InvalidTimePoint { text: String },
}
