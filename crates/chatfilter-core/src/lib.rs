pub mod domain;
pub mod error;
pub mod filter;

pub use domain::*;
pub use error::CoreError;
pub use filter::{
    parse, tokenize, Attribute, CompareOp, Expression, Filter, FilterError, FilterErrorKind,
    FilterSet, MessageContext, Token, TokenKind, Value, ValueRef, ValueType,
};
