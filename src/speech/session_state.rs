use super::message::{Message, MessageId};

const START_LABEL: &str = "Start Playback";
const STOP_LABEL: &str = "Stop Playback";

/// What is currently being spoken.
///
/// Id and text are always set together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    active: Option<(MessageId, String)>,
}

impl SessionState {
    pub fn start(&mut self, message: &Message) {
        self.active = Some((message.id().clone(), message.text().to_owned()));
    }

    pub fn stop(&mut self) {
        self.active = None;
    }

    pub fn is_active(&self, id: &MessageId) -> bool {
        matches!(&self.active, Some((active_id, _)) if active_id == id)
    }

    pub fn active_message_id(&self) -> Option<&MessageId> {
        self.active.as_ref().map(|(id, _)| id)
    }

    pub fn active_text(&self) -> Option<&str> {
        self.active.as_ref().map(|(_, text)| text.as_str())
    }

    pub fn toggle_label(&self, id: &MessageId) -> &'static str {
        if self.is_active(id) {
            STOP_LABEL
        } else {
            START_LABEL
        }
    }

    pub fn speaking_line(&self, id: &MessageId) -> Option<String> {
        match &self.active {
            Some((active_id, text)) if active_id == id => Some(format!("Speaking: {}", text)),
            _ => None,
        }
    }
}
