pub mod color;
pub mod message;

pub use color::Color;
pub use message::{Author, Message};
