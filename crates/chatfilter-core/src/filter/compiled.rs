use crate::filter::ast::Expression;
use crate::filter::eval::{evaluate, MessageContext};
use crate::filter::parser::parse;
use crate::filter::FilterError;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A filter compiled once from its text and evaluated per message.
///
/// Clones share the same immutable tree, so a `Filter` can be handed to
/// any number of threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    source: Arc<str>,
    expression: Arc<Expression>,
}

impl Filter {
    pub fn compile(text: &str) -> Result<Self, FilterError> {
        let expression = parse(text)?;
        Ok(Self {
            source: Arc::from(text),
            expression: Arc::new(expression),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// `true` when the message should be shown.
    pub fn matches<C: MessageContext + ?Sized>(&self, ctx: &C) -> bool {
        evaluate(&self.expression, ctx)
    }
}

impl FromStr for Filter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Filter::compile(s)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedFilter {
    pub name: String,
    pub filter: Filter,
}

/// Named filters applied together: a message is shown only when every
/// filter in the set shows it.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    filters: Vec<NamedFilter>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles `text` and stores it under `name`, replacing any filter
    /// already stored under that name. The set is unchanged on error.
    pub fn insert(&mut self, name: &str, text: &str) -> Result<(), FilterError> {
        let filter = Filter::compile(text)?;
        self.push(name, filter);
        Ok(())
    }

    pub fn push(&mut self, name: &str, filter: Filter) {
        match self.filters.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => entry.filter = filter,
            None => self.filters.push(NamedFilter {
                name: name.to_string(),
                filter,
            }),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Filter> {
        let idx = self.filters.iter().position(|entry| entry.name == name)?;
        Some(self.filters.remove(idx).filter)
    }

    pub fn get(&self, name: &str) -> Option<&Filter> {
        self.filters
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.filter)
    }

    pub fn matches<C: MessageContext + ?Sized>(&self, ctx: &C) -> bool {
        self.first_rejecting(ctx).is_none()
    }

    /// Name of the first filter that hides the message, if any.
    pub fn first_rejecting<C: MessageContext + ?Sized>(&self, ctx: &C) -> Option<&str> {
        self.filters
            .iter()
            .find(|entry| !entry.filter.matches(ctx))
            .map(|entry| entry.name.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.iter().map(|entry| entry.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedFilter> {
        self.filters.iter()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}
