use crate::{ChatFailure, ChatReply, RequestId, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter { shift: bool },
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Widget attached to the page.
    Mounted,
    /// Widget detached from the page.
    Unmounted,
    /// Floating button clicked.
    ToggleClicked,
    /// Header close button clicked.
    CloseClicked,
    /// Click landed on the window backdrop itself, not on a child.
    BackdropClicked,
    /// Key pressed while the widget has focus or at page level.
    KeyPressed { key: Key, at: Timestamp },
    /// User edited the message input.
    InputChanged(String),
    /// Send button clicked.
    SendClicked { at: Timestamp },
    /// Page selection changed; carries the raw selection text, if any.
    SelectionChanged(Option<String>),
    /// Engine delivered a 2xx reply.
    ChatReplied {
        request_id: RequestId,
        reply: ChatReply,
        at: Timestamp,
    },
    /// Engine gave up on a request.
    ChatFailed {
        request_id: RequestId,
        failure: ChatFailure,
        at: Timestamp,
    },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
