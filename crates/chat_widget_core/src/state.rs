use crate::view_model::{MessageView, WidgetViewModel};

pub type MessageId = u64;
pub type RequestId = u64;
/// Milliseconds since the Unix epoch, supplied by the shell.
pub type Timestamp = u64;

/// Longest accepted message, counted in characters after trimming.
pub const MAX_INPUT_CHARS: usize = 1000;
pub const TOO_LONG_ERROR: &str = "Message is too long. Please keep it under 1000 characters.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStatus {
    Sent,
    Pending,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub sender: Sender,
    pub content: String,
    pub timestamp: Timestamp,
    pub status: MessageStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidgetPhase {
    #[default]
    Closed,
    Idle,
    Sending,
    IdleWithError,
}

/// Opaque conversation identifier sent as `session_token`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trim a raw selection; whitespace-only selections count as none.
pub fn normalize_selection(raw: Option<String>) -> Option<String> {
    let raw = raw?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == raw.len() {
        Some(raw)
    } else {
        Some(trimmed.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WidgetState {
    is_open: bool,
    mounted: bool,
    messages: Vec<ChatMessage>,
    input_text: String,
    in_flight: Option<RequestId>,
    selected_text: Option<String>,
    error: Option<String>,
    session_id: SessionId,
    next_message_id: MessageId,
    last_request_id: RequestId,
    dirty: bool,
}

impl WidgetState {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            next_message_id: 1,
            ..Self::default()
        }
    }

    pub fn view(&self) -> WidgetViewModel {
        WidgetViewModel {
            phase: self.phase(),
            is_open: self.is_open,
            messages: self.messages.iter().map(MessageView::from).collect(),
            input_text: self.input_text.clone(),
            is_loading: self.is_loading(),
            can_send: !self.is_loading() && !self.input_text.trim().is_empty(),
            selected_text: self.selected_text.clone(),
            show_context_badge: self.show_context_badge(),
            error: self.error.clone(),
            session_id: self.session_id.as_str().to_owned(),
            dirty: self.dirty,
        }
    }

    pub fn phase(&self) -> WidgetPhase {
        if !self.is_open {
            WidgetPhase::Closed
        } else if self.is_loading() {
            WidgetPhase::Sending
        } else if self.error.is_some() {
            WidgetPhase::IdleWithError
        } else {
            WidgetPhase::Idle
        }
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn active_request(&self) -> Option<RequestId> {
        self.in_flight
    }

    pub fn selected_text(&self) -> Option<&str> {
        self.selected_text.as_deref()
    }

    pub fn show_context_badge(&self) -> bool {
        self.selected_text.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn set_open(&mut self, open: bool) {
        if self.is_open != open {
            self.is_open = open;
            self.dirty = true;
        }
    }

    pub(crate) fn set_mounted(&mut self, mounted: bool) {
        self.mounted = mounted;
    }

    pub(crate) fn set_input(&mut self, text: String) {
        if self.input_text != text {
            self.input_text = text;
            self.dirty = true;
        }
    }

    pub(crate) fn set_error(&mut self, error: Option<String>) {
        if self.error != error {
            self.error = error;
            self.dirty = true;
        }
    }

    /// Stores an already-normalized selection.
    pub(crate) fn set_selection(&mut self, selection: Option<String>) {
        if self.selected_text != selection {
            self.selected_text = selection;
            self.dirty = true;
        }
    }

    pub(crate) fn adopt_session(&mut self, token: String) {
        if self.session_id.as_str() != token {
            self.session_id = SessionId(token);
            self.dirty = true;
        }
    }

    pub(crate) fn push_message(
        &mut self,
        sender: Sender,
        content: String,
        timestamp: Timestamp,
        status: MessageStatus,
    ) -> MessageId {
        let id = self.next_message_id;
        self.next_message_id += 1;
        self.messages.push(ChatMessage {
            id,
            sender,
            content,
            timestamp,
            status,
        });
        self.dirty = true;
        id
    }

    /// Marks a new request as the only one in flight.
    pub(crate) fn begin_request(&mut self) -> RequestId {
        self.last_request_id += 1;
        self.in_flight = Some(self.last_request_id);
        self.dirty = true;
        self.last_request_id
    }

    /// Settles `request_id` if it is the active request. Any other id is stale.
    pub(crate) fn finish_request(&mut self, request_id: RequestId) -> bool {
        if self.in_flight != Some(request_id) {
            return false;
        }
        self.in_flight = None;
        self.dirty = true;
        true
    }

    /// Drops the active request without an outcome, returning its id.
    pub(crate) fn abandon_request(&mut self) -> Option<RequestId> {
        let abandoned = self.in_flight.take();
        if abandoned.is_some() {
            self.dirty = true;
        }
        abandoned
    }
}
