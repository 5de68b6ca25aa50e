use crate::{ChatMessage, MessageId, MessageStatus, Sender, Timestamp, WidgetPhase};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WidgetViewModel {
    pub phase: WidgetPhase,
    pub is_open: bool,
    pub messages: Vec<MessageView>,
    pub input_text: String,
    pub is_loading: bool,
    pub can_send: bool,
    pub selected_text: Option<String>,
    pub show_context_badge: bool,
    pub error: Option<String>,
    pub session_id: String,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub id: MessageId,
    pub sender: Sender,
    pub label: &'static str,
    pub content: String,
    pub timestamp: Timestamp,
    pub status: MessageStatus,
}

impl From<&ChatMessage> for MessageView {
    fn from(message: &ChatMessage) -> Self {
        Self {
            id: message.id,
            sender: message.sender,
            label: match message.sender {
                Sender::User => "User",
                Sender::Bot => "Assistant",
            },
            content: message.content.clone(),
            timestamp: message.timestamp,
            status: message.status,
        }
    }
}
