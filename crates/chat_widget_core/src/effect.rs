use crate::{ChatRequest, RequestId};

/// Side effects requested by [`crate::update`]; the shell executes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start listening for page selection changes.
    SubscribeSelection,
    /// Stop listening for page selection changes.
    UnsubscribeSelection,
    /// Read the current selection once and report it as `Msg::SelectionChanged`.
    QuerySelection,
    /// Issue one chat completion request under the configured deadline.
    SendChat {
        request_id: RequestId,
        request: ChatRequest,
    },
    /// Abort an in-flight request. Its outcome, if any, is stale.
    CancelChat { request_id: RequestId },
}
