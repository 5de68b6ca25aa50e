//! Chat widget core: pure state machine and view-model helpers.
mod effect;
mod exchange;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use exchange::{ChatFailure, ChatMode, ChatReply, ChatRequest, FALLBACK_REPLY};
pub use msg::{Key, Msg};
pub use state::{
    normalize_selection, ChatMessage, MessageId, MessageStatus, RequestId, Sender, SessionId,
    Timestamp, WidgetPhase, WidgetState, MAX_INPUT_CHARS, TOO_LONG_ERROR,
};
pub use update::update;
pub use view_model::{MessageView, WidgetViewModel};
