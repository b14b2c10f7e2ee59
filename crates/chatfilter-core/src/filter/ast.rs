use crate::domain::Color;
use crate::filter::registry::{Attribute, ValueType};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
    Contains,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Neq => "!=",
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
            CompareOp::Lte => "<=",
            CompareOp::Gte => ">=",
            CompareOp::Contains => "contains",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Owned value, as stored in literal nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Bool(bool),
    Int(i64),
    String(String),
    Color(Color),
    StringList(Vec<String>),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        self.borrowed().value_type()
    }

    pub fn borrowed(&self) -> ValueRef<'_> {
        match self {
            Value::Bool(value) => ValueRef::Bool(*value),
            Value::Int(value) => ValueRef::Int(*value),
            Value::String(value) => ValueRef::String(value),
            Value::Color(value) => ValueRef::Color(*value),
            Value::StringList(value) => ValueRef::StringList(value),
        }
    }
}

/// Borrowed value handed out by a message context during evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueRef<'a> {
    Bool(bool),
    Int(i64),
    String(&'a str),
    Color(Color),
    StringList(&'a [String]),
}

impl ValueRef<'_> {
    pub fn value_type(&self) -> ValueType {
        match self {
            ValueRef::Bool(_) => ValueType::Bool,
            ValueRef::Int(_) => ValueType::Int,
            ValueRef::String(_) => ValueType::String,
            ValueRef::Color(_) => ValueType::Color,
            ValueRef::StringList(_) => ValueType::StringList,
        }
    }
}

/// Compiled filter expression. Every node is well-typed once the parser
/// has produced it; the tree is never mutated afterwards.
///
/// Trees are evaluated only through [`Filter::matches`](crate::Filter::matches),
/// so a hand-built tree can be inspected but never run:
///
/// ```compile_fail
/// use chatfilter_core::filter::evaluate;
/// ```
///
/// ```compile_fail
/// use chatfilter_core::{CompareOp, Expression, Value};
/// let _ = Expression::comparison(
///     CompareOp::Contains,
///     Expression::literal(Value::Int(1)),
///     Expression::literal(Value::Int(2)),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Expression {
    Literal {
        value: Value,
    },
    Identifier {
        attribute: Attribute,
    },
    Not {
        operand: Box<Expression>,
    },
    /// Holds at least two operands, evaluated left to right.
    And {
        operands: Vec<Expression>,
    },
    /// Holds at least two operands, evaluated left to right.
    Or {
        operands: Vec<Expression>,
    },
    Comparison {
        op: CompareOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

// Constructors stay crate-private: only the parser builds trees, so every
// tree a caller can get hold of has been type checked.
impl Expression {
    pub(crate) fn literal(value: Value) -> Self {
        Expression::Literal { value }
    }

    pub(crate) fn identifier(attribute: Attribute) -> Self {
        Expression::Identifier { attribute }
    }

    pub(crate) fn not(operand: Expression) -> Self {
        Expression::Not {
            operand: Box::new(operand),
        }
    }

    pub(crate) fn and(operands: Vec<Expression>) -> Self {
        debug_assert!(operands.len() >= 2);
        Expression::And { operands }
    }

    pub(crate) fn or(operands: Vec<Expression>) -> Self {
        debug_assert!(operands.len() >= 2);
        Expression::Or { operands }
    }

    pub(crate) fn comparison(op: CompareOp, left: Expression, right: Expression) -> Self {
        Expression::Comparison {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Expression::Literal { value } => value.value_type(),
            Expression::Identifier { attribute } => attribute.value_type(),
            Expression::Not { .. }
            | Expression::And { .. }
            | Expression::Or { .. }
            | Expression::Comparison { .. } => ValueType::Bool,
        }
    }

    /// Attributes referenced anywhere in the tree, in source order.
    pub fn attributes(&self) -> Vec<Attribute> {
        let mut out = Vec::new();
        self.collect_attributes(&mut out);
        out
    }

    fn collect_attributes(&self, out: &mut Vec<Attribute>) {
        match self {
            Expression::Literal { .. } => {}
            Expression::Identifier { attribute } => {
                if !out.contains(attribute) {
                    out.push(*attribute);
                }
            }
            Expression::Not { operand } => operand.collect_attributes(out),
            Expression::And { operands } | Expression::Or { operands } => {
                for operand in operands {
                    operand.collect_attributes(out);
                }
            }
            Expression::Comparison { left, right, .. } => {
                left.collect_attributes(out);
                right.collect_attributes(out);
            }
        }
    }
}

// Parser-produced trees render in a fully parenthesised form that compiles
// back to the same tree.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal { value } => match value {
                Value::Bool(value) => write!(f, "{value}"),
                Value::Int(value) => write!(f, "{value}"),
                Value::String(value) => write_quoted(f, value),
                Value::Color(value) => write_quoted(f, &value.to_string()),
                Value::StringList(items) => {
                    f.write_str("[")?;
                    for (idx, item) in items.iter().enumerate() {
                        if idx > 0 {
                            f.write_str(", ")?;
                        }
                        write_quoted(f, item)?;
                    }
                    f.write_str("]")
                }
            },
            Expression::Identifier { attribute } => f.write_str(attribute.name()),
            Expression::Not { operand } => write!(f, "!{operand}"),
            Expression::And { operands } => write_chain(f, operands, "&&"),
            Expression::Or { operands } => write_chain(f, operands, "||"),
            Expression::Comparison { op, left, right } => write!(f, "({left} {op} {right})"),
        }
    }
}

fn write_chain(f: &mut fmt::Formatter<'_>, operands: &[Expression], op: &str) -> fmt::Result {
    f.write_str("(")?;
    for (idx, operand) in operands.iter().enumerate() {
        if idx > 0 {
            write!(f, " {op} ")?;
        }
        write!(f, "{operand}")?;
    }
    f.write_str(")")
}

fn write_quoted(f: &mut fmt::Formatter<'_>, raw: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in raw.chars() {
        if ch == '"' || ch == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{ch}")?;
    }
    f.write_str("\"")
}
