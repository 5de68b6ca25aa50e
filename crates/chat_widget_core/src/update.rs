use crate::{
    normalize_selection, ChatFailure, ChatMode, ChatReply, ChatRequest, Effect, Key,
    MessageStatus, Msg, Sender, Timestamp, WidgetState, FALLBACK_REPLY, MAX_INPUT_CHARS,
    TOO_LONG_ERROR,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: WidgetState, msg: Msg) -> (WidgetState, Vec<Effect>) {
    let effects = match msg {
        Msg::Mounted => {
            if state.is_mounted() {
                return (state, Vec::new());
            }
            state.set_mounted(true);
            vec![Effect::SubscribeSelection, Effect::QuerySelection]
        }
        Msg::Unmounted => {
            if !state.is_mounted() {
                return (state, Vec::new());
            }
            state.set_mounted(false);
            let mut effects = vec![Effect::UnsubscribeSelection];
            if let Some(request_id) = state.abandon_request() {
                effects.push(Effect::CancelChat { request_id });
            }
            effects
        }
        Msg::ToggleClicked => {
            let open = !state.is_open();
            state.set_open(open);
            Vec::new()
        }
        Msg::CloseClicked | Msg::BackdropClicked => {
            state.set_open(false);
            Vec::new()
        }
        Msg::KeyPressed {
            key: Key::Escape, ..
        } => {
            state.set_open(false);
            Vec::new()
        }
        Msg::KeyPressed {
            key: Key::Enter { shift: false },
            at,
        } => send(&mut state, at),
        Msg::KeyPressed { .. } => Vec::new(),
        Msg::InputChanged(text) => {
            state.set_input(text);
            state.set_error(None);
            Vec::new()
        }
        Msg::SendClicked { at } => send(&mut state, at),
        Msg::SelectionChanged(raw) => {
            state.set_selection(normalize_selection(raw));
            Vec::new()
        }
        Msg::ChatReplied {
            request_id,
            reply,
            at,
        } => {
            if state.finish_request(request_id) {
                apply_reply(&mut state, reply, at);
            }
            Vec::new()
        }
        Msg::ChatFailed {
            request_id,
            failure,
            at,
        } => {
            if state.finish_request(request_id) {
                apply_failure(&mut state, failure, at);
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn send(state: &mut WidgetState, at: Timestamp) -> Vec<Effect> {
    // Sends while a request is in flight are ignored, not queued.
    if state.is_loading() {
        return Vec::new();
    }
    let message = state.input_text().trim().to_owned();
    if message.is_empty() {
        return Vec::new();
    }
    if message.chars().count() > MAX_INPUT_CHARS {
        state.set_error(Some(TOO_LONG_ERROR.to_string()));
        return Vec::new();
    }

    state.push_message(Sender::User, message.clone(), at, MessageStatus::Pending);
    state.set_input(String::new());
    state.set_error(None);
    let request_id = state.begin_request();

    let request = ChatRequest {
        message,
        selected_text: state.selected_text().map(ToOwned::to_owned),
        session_token: state.session_id().as_str().to_owned(),
        mode: ChatMode::FullContent,
    };
    vec![Effect::SendChat {
        request_id,
        request,
    }]
}

fn apply_reply(state: &mut WidgetState, reply: ChatReply, at: Timestamp) {
    let content = reply
        .response
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| FALLBACK_REPLY.to_string());
    state.push_message(Sender::Bot, content, at, MessageStatus::Sent);
    state.set_selection(None);
    if let Some(token) = reply.session_token.filter(|token| !token.is_empty()) {
        state.adopt_session(token);
    }
}

// The optimistic user message keeps its `Pending` status on failure.
fn apply_failure(state: &mut WidgetState, failure: ChatFailure, at: Timestamp) {
    state.push_message(
        Sender::Bot,
        failure.transcript_text(),
        at,
        MessageStatus::Error,
    );
    state.set_error(Some(failure.summary()));
}
