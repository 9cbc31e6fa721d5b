//! OpenAI chat-completions client.
//!
//! Three call shapes, all synchronous request/response:
//! - [`OpenAi::chat_text`]: plain completion, returns the message text.
//! - [`OpenAi::chat_json`]: JSON-object response format, returns parsed JSON.
//! - [`OpenAi::extract`]: JSON-schema response format for a
//!   [`StructuredOutput`] type, returns the deserialized value.
//!
//! Retry policy is deliberately absent here: the enrichment layer owns its
//! retry budget and the typed-empty fallbacks.

mod client;
pub mod schema;
pub mod util;

pub use client::OpenAi;
pub use schema::StructuredOutput;
