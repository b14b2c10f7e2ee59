mod ast;
mod compiled;
mod eval;
mod parser;
mod registry;
mod token;

use thiserror::Error;

pub use ast::{CompareOp, Expression, Value, ValueRef};
pub use compiled::{Filter, FilterSet, NamedFilter};
pub use eval::MessageContext;
pub use parser::{parse, parse_tokens, MAX_NESTING};
pub use registry::{Attribute, ValueType};
pub use token::{decode_string_literal, tokenize, Token, TokenKind, TokenStream};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterErrorKind {
    Lex,
    Syntax,
    Type,
}

impl FilterErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterErrorKind::Lex => "lex",
            FilterErrorKind::Syntax => "syntax",
            FilterErrorKind::Type => "type",
        }
    }
}

/// Why a filter failed to compile. Positions are byte offsets into the
/// filter text; errors at end of input point one past the last byte.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("unterminated string literal at position {position}")]
    UnterminatedString { position: usize },
    #[error("unknown operator `{lexeme}` at position {position}")]
    UnknownOperator { lexeme: String, position: usize },
    #[error("unexpected character `{lexeme}` at position {position}")]
    UnexpectedCharacter { lexeme: String, position: usize },
    #[error("invalid integer literal `{lexeme}` at position {position}")]
    InvalidInteger { lexeme: String, position: usize },

    #[error("filter is empty")]
    Empty,
    #[error("expected {expected}, found `{found}` at position {position}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        position: usize,
    },
    #[error("expected {expected}, found end of filter")]
    UnexpectedEnd {
        expected: &'static str,
        position: usize,
    },
    #[error("unbalanced parenthesis at position {position}")]
    UnbalancedParenthesis { position: usize },
    #[error("expression nested too deeply at position {position}")]
    TooDeep { position: usize },

    #[error("unknown attribute `{name}` at position {position}")]
    UnknownAttribute { name: String, position: usize },
    #[error("operator `{op}` cannot compare {left} with {right} at position {position}")]
    OperatorMismatch {
        op: CompareOp,
        left: ValueType,
        right: ValueType,
        position: usize,
    },
    #[error("{found} value used as a condition at position {position}")]
    NotBoolean { found: ValueType, position: usize },
    #[error("invalid color literal `{literal}` at position {position}")]
    InvalidColor { literal: String, position: usize },
}

impl FilterError {
    pub fn kind(&self) -> FilterErrorKind {
        match self {
            FilterError::UnterminatedString { .. }
            | FilterError::UnknownOperator { .. }
            | FilterError::UnexpectedCharacter { .. }
            | FilterError::InvalidInteger { .. } => FilterErrorKind::Lex,
            FilterError::Empty
            | FilterError::UnexpectedToken { .. }
            | FilterError::UnexpectedEnd { .. }
            | FilterError::UnbalancedParenthesis { .. }
            | FilterError::TooDeep { .. } => FilterErrorKind::Syntax,
            FilterError::UnknownAttribute { .. }
            | FilterError::OperatorMismatch { .. }
            | FilterError::NotBoolean { .. }
            | FilterError::InvalidColor { .. } => FilterErrorKind::Type,
        }
    }

    pub fn position(&self) -> usize {
        match self {
            FilterError::Empty => 0,
            FilterError::UnterminatedString { position }
            | FilterError::UnknownOperator { position, .. }
            | FilterError::UnexpectedCharacter { position, .. }
            | FilterError::InvalidInteger { position, .. }
            | FilterError::UnexpectedToken { position, .. }
            | FilterError::UnexpectedEnd { position, .. }
            | FilterError::UnbalancedParenthesis { position }
            | FilterError::TooDeep { position }
            | FilterError::UnknownAttribute { position, .. }
            | FilterError::OperatorMismatch { position, .. }
            | FilterError::NotBoolean { position, .. }
            | FilterError::InvalidColor { position, .. } => *position,
        }
    }
}
