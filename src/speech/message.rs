use crate::error::{SpeechError, SpeechResult};
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        MessageId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        MessageId::new(id)
    }
}

/// A piece of text that can be spoken.
///
/// Immutable once built. Both id and text are guaranteed to be non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawMessage")]
pub struct Message {
    id: MessageId,
    text: String,
}

#[derive(Deserialize)]
struct RawMessage {
    id: String,
    text: String,
}

impl TryFrom<RawMessage> for Message {
    type Error = SpeechError;

    fn try_from(raw: RawMessage) -> SpeechResult<Self> {
        Message::new(raw.id, raw.text)
    }
}

impl Message {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> SpeechResult<Self> {
        let id = id.into();
        let text = text.into();
        if id.trim().is_empty() {
            return Err(SpeechError::InvalidMessage("empty id".to_owned()));
        }
        if text.trim().is_empty() {
            return Err(SpeechError::InvalidMessage(format!(
                "message {} has no text",
                id
            )));
        }
        Ok(Message {
            id: MessageId(id),
            text,
        })
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}
