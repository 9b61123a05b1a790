//! Chat transcript and session.
//!
//! The responder itself is stateless; the session owns the append-only
//! message list, the "bot is composing" flag and the simulated typing delay.

use crate::assistant::responder::Responder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, trace};

/// First message of every transcript.
pub const GREETING: &str = "Hello! I'm your LoanTracker assistant. How can I help you today?";

/// Canned prompts offered next to the input box.
pub const QUICK_QUESTIONS: [&str; 4] = [
    "How to add a personal loan?",
    "What documents are required?",
    "What is the interest rate?",
    "What is the loan tenure?",
];

/// Default simulated typing delay.
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(800);

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The loan officer
    User,
    /// The assistant
    Bot,
}

/// One chat message. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Millisecond timestamp id, unique within a transcript
    pub id: String,
    /// Message text
    pub text: String,
    /// Author
    pub sender: Sender,
    /// When it was appended
    pub timestamp: DateTime<Utc>,
}

/// Append-only list of messages.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    last_id: i64,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    /// A transcript holding only the greeting.
    #[must_use]
    pub fn new() -> Self {
        let mut transcript = Self {
            messages: Vec::new(),
            last_id: 0,
        };
        transcript.push(Sender::Bot, GREETING.to_string());
        transcript
    }

    /// Appends a message stamped with the current time.
    pub fn push(&mut self, sender: Sender, text: String) -> &ChatMessage {
        let timestamp = Utc::now();
        let id = timestamp.timestamp_millis().max(self.last_id + 1);
        self.last_id = id;
        self.messages.push(ChatMessage {
            id: id.to_string(),
            text,
            sender,
            timestamp,
        });
        &self.messages[self.messages.len() - 1]
    }

    /// Messages in order.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always false; the greeting is present from the start.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// One conversation with the assistant.
#[derive(Debug)]
pub struct ChatSession {
    responder: Responder,
    transcript: Transcript,
    composing: bool,
    reply_delay: Duration,
}

impl ChatSession {
    /// Starts a conversation with the default delay.
    #[must_use]
    pub fn new(responder: Responder) -> Self {
        Self::with_delay(responder, DEFAULT_REPLY_DELAY)
    }

    /// Starts a conversation with a custom typing delay.
    #[must_use]
    pub fn with_delay(responder: Responder, reply_delay: Duration) -> Self {
        Self {
            responder,
            transcript: Transcript::new(),
            composing: false,
            reply_delay,
        }
    }

    /// The conversation so far.
    #[must_use]
    pub const fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Whether a reply is being composed.
    #[must_use]
    pub const fn is_composing(&self) -> bool {
        self.composing
    }

    /// Sends `input` and waits for the reply. Blank input is ignored and
    /// yields `None`.
    pub async fn send(&mut self, input: &str) -> Option<ChatMessage> {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }
        self.transcript.push(Sender::User, text.to_string());
        self.composing = true;
        trace!("Composing reply to {text:?}");

        if !self.reply_delay.is_zero() {
            tokio::time::sleep(self.reply_delay).await;
        }

        let response = self.responder.reply(text);
        debug!("Assistant answered with {:?}", response.topic);
        let reply = self.transcript.push(Sender::Bot, response.text).clone();
        self.composing = false;
        Some(reply)
    }

    /// Sends one of the quick questions by index.
    pub async fn ask_quick_question(&mut self, index: usize) -> Option<ChatMessage> {
        let question = QUICK_QUESTIONS.get(index)?;
        self.send(question).await
    }
}
