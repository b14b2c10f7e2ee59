use crate::filter::ast::{CompareOp, Expression, ValueRef};
use crate::filter::registry::Attribute;

/// Read access to the attributes of one message.
///
/// Implementations must return a value of the attribute's declared
/// [`ValueType`](crate::filter::ValueType) for every attribute.
pub trait MessageContext {
    fn resolve(&self, attribute: Attribute) -> ValueRef<'_>;
}

impl<T: MessageContext + ?Sized> MessageContext for &T {
    fn resolve(&self, attribute: Attribute) -> ValueRef<'_> {
        (**self).resolve(attribute)
    }
}

/// Evaluates a compiled expression against one message.
///
/// Logical operators short-circuit, so attributes on the skipped side are
/// never resolved.
///
/// # Panics
///
/// Panics if the tree is ill-typed (the parser never produces one) or if
/// the context resolves an attribute to a value of the wrong type.
pub(crate) fn evaluate<C: MessageContext + ?Sized>(expr: &Expression, ctx: &C) -> bool {
    match expr {
        Expression::Literal { value } => truthy(value.borrowed()),
        Expression::Identifier { attribute } => truthy(resolve(ctx, *attribute)),
        Expression::Not { operand } => !evaluate(operand, ctx),
        Expression::And { operands } => operands.iter().all(|operand| evaluate(operand, ctx)),
        Expression::Or { operands } => operands.iter().any(|operand| evaluate(operand, ctx)),
        Expression::Comparison { op, left, right } => {
            let left = operand(left, ctx);
            let right = operand(right, ctx);
            compare(*op, left, right)
        }
    }
}

fn operand<'a, C: MessageContext + ?Sized>(expr: &'a Expression, ctx: &'a C) -> ValueRef<'a> {
    match expr {
        Expression::Literal { value } => value.borrowed(),
        Expression::Identifier { attribute } => resolve(ctx, *attribute),
        other => ValueRef::Bool(evaluate(other, ctx)),
    }
}

fn resolve<C: MessageContext + ?Sized>(ctx: &C, attribute: Attribute) -> ValueRef<'_> {
    let value = ctx.resolve(attribute);
    assert_eq!(
        value.value_type(),
        attribute.value_type(),
        "context resolved `{attribute}` to a value of the wrong type"
    );
    value
}

fn truthy(value: ValueRef<'_>) -> bool {
    match value {
        ValueRef::Bool(value) => value,
        other => unreachable!("{} value used as a condition", other.value_type()),
    }
}

fn compare(op: CompareOp, left: ValueRef<'_>, right: ValueRef<'_>) -> bool {
    match (left, right) {
        (ValueRef::Bool(l), ValueRef::Bool(r)) => equality(op, l == r),
        (ValueRef::Color(l), ValueRef::Color(r)) => equality(op, l == r),
        (ValueRef::Int(l), ValueRef::Int(r)) => match op {
            CompareOp::Eq => l == r,
            CompareOp::Neq => l != r,
            CompareOp::Lt => l < r,
            CompareOp::Gt => l > r,
            CompareOp::Lte => l <= r,
            CompareOp::Gte => l >= r,
            CompareOp::Contains => unreachable!("contains on int"),
        },
        (ValueRef::String(l), ValueRef::String(r)) => match op {
            CompareOp::Contains => l.contains(r),
            _ => equality(op, l == r),
        },
        (ValueRef::StringList(items), ValueRef::String(needle)) if op == CompareOp::Contains => {
            items.iter().any(|item| item == needle)
        }
        (l, r) => unreachable!(
            "cannot apply `{op}` to {} and {}",
            l.value_type(),
            r.value_type()
        ),
    }
}

fn equality(op: CompareOp, equal: bool) -> bool {
    match op {
        CompareOp::Eq => equal,
        CompareOp::Neq => !equal,
        other => unreachable!("`{other}` is not an equality operator"),
    }
}
