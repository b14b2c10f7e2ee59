use crate::domain::Color;
use crate::filter::{Attribute, MessageContext, ValueRef};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Author {
    pub name: String,
    pub subscribed: bool,
    /// Months subscribed.
    pub subscription_length: i64,
    /// `None` when the author never picked a name color.
    pub color: Option<Color>,
    pub badges: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub content: String,
    #[serde(default)]
    pub author: Author,
}

impl Message {
    pub fn new(author: Author, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            author,
        }
    }

    /// Length of the content in characters.
    pub fn length(&self) -> i64 {
        self.content.chars().count() as i64
    }
}

impl MessageContext for Message {
    fn resolve(&self, attribute: Attribute) -> ValueRef<'_> {
        match attribute {
            Attribute::MessageContent => ValueRef::String(&self.content),
            Attribute::MessageLength => ValueRef::Int(self.length()),
            Attribute::AuthorName => ValueRef::String(&self.author.name),
            Attribute::AuthorSubscribed => ValueRef::Bool(self.author.subscribed),
            Attribute::AuthorSubscriptionLength => ValueRef::Int(self.author.subscription_length),
            Attribute::AuthorColor => {
                ValueRef::Color(self.author.color.unwrap_or(Color::TRANSPARENT))
            }
            Attribute::AuthorNoColor => ValueRef::Bool(self.author.color.is_none()),
            Attribute::AuthorBadges => ValueRef::StringList(&self.author.badges),
        }
    }
}
