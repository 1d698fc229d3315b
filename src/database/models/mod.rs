pub mod message;

pub use message::{Message, MAX_CONTENT_CHARS};
