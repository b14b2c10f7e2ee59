use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type of an attribute, literal or sub-expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Bool,
    Int,
    String,
    Color,
    StringList,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::String => "string",
            ValueType::Color => "color",
            ValueType::StringList => "string list",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of message attributes a filter may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    #[serde(rename = "message.content")]
    MessageContent,
    #[serde(rename = "message.length")]
    MessageLength,
    #[serde(rename = "author.name")]
    AuthorName,
    #[serde(rename = "author.subscribed")]
    AuthorSubscribed,
    #[serde(rename = "author.subscription_length")]
    AuthorSubscriptionLength,
    #[serde(rename = "author.color")]
    AuthorColor,
    #[serde(rename = "author.no_color")]
    AuthorNoColor,
    #[serde(rename = "author.badges")]
    AuthorBadges,
}

impl Attribute {
    pub const ALL: [Attribute; 8] = [
        Attribute::MessageContent,
        Attribute::MessageLength,
        Attribute::AuthorName,
        Attribute::AuthorSubscribed,
        Attribute::AuthorSubscriptionLength,
        Attribute::AuthorColor,
        Attribute::AuthorNoColor,
        Attribute::AuthorBadges,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Attribute::MessageContent => "message.content",
            Attribute::MessageLength => "message.length",
            Attribute::AuthorName => "author.name",
            Attribute::AuthorSubscribed => "author.subscribed",
            Attribute::AuthorSubscriptionLength => "author.subscription_length",
            Attribute::AuthorColor => "author.color",
            Attribute::AuthorNoColor => "author.no_color",
            Attribute::AuthorBadges => "author.badges",
        }
    }

    pub fn value_type(self) -> ValueType {
        match self {
            Attribute::MessageContent | Attribute::AuthorName => ValueType::String,
            Attribute::MessageLength | Attribute::AuthorSubscriptionLength => ValueType::Int,
            Attribute::AuthorSubscribed | Attribute::AuthorNoColor => ValueType::Bool,
            Attribute::AuthorColor => ValueType::Color,
            Attribute::AuthorBadges => ValueType::StringList,
        }
    }

    /// Exact, case-sensitive lookup by attribute name.
    pub fn lookup(name: &str) -> Option<Attribute> {
        Attribute::ALL
            .into_iter()
            .find(|attribute| attribute.name() == name)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
