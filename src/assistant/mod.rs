//! Rule-based help assistant.

/// Keyword rules and reply selection
pub mod responder;
/// Chat transcript and session state
pub mod transcript;

pub use responder::{Responder, Response, Topic};
pub use transcript::{ChatMessage, ChatSession, Sender, Transcript};
