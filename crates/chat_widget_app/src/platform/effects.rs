use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use chat_widget_core::{ChatFailure, ChatReply, ChatRequest, Effect, Msg};
use chat_widget_engine::{
    ChatError, CompletionRequest, EngineEvent, EngineHandle, FailureKind, SelectionSource,
    SubscriptionId,
};
use widget_logging::{widget_debug, widget_info, widget_warn};

use super::app::ShellEvent;
use super::now_ms;

/// Executes core effects against the engine and the selection source.
pub(crate) struct EffectRunner {
    engine: EngineHandle,
    selection: Arc<dyn SelectionSource>,
    subscription: Option<SubscriptionId>,
    base_url: String,
    tx: mpsc::Sender<ShellEvent>,
}

impl EffectRunner {
    pub(crate) fn new(
        engine: EngineHandle,
        selection: Arc<dyn SelectionSource>,
        base_url: String,
        tx: mpsc::Sender<ShellEvent>,
    ) -> Self {
        let runner = Self {
            engine,
            selection,
            subscription: None,
            base_url,
            tx,
        };
        runner.spawn_event_loop();
        runner
    }

    /// Stops the engine; the event loop exits once its channel closes.
    pub(crate) fn shutdown(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.selection.unsubscribe(id);
        }
        self.engine.shutdown();
    }

    pub(crate) fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubscribeSelection => {
                    if self.subscription.is_some() {
                        continue;
                    }
                    let tx = self.tx.clone();
                    let id = self.selection.subscribe(Arc::new(move |text: Option<String>| {
                        let _ = tx.send(ShellEvent::Msg(Msg::SelectionChanged(text)));
                    }));
                    widget_debug!("selection subscription {}", id);
                    self.subscription = Some(id);
                }
                Effect::UnsubscribeSelection => {
                    if let Some(id) = self.subscription.take() {
                        self.selection.unsubscribe(id);
                    }
                }
                Effect::QuerySelection => {
                    let current = self.selection.current();
                    let _ = self.tx.send(ShellEvent::Msg(Msg::SelectionChanged(current)));
                }
                Effect::SendChat {
                    request_id,
                    request,
                } => {
                    widget_info!(
                        "SendChat request_id={} message={:?}",
                        request_id,
                        widget_logging::preview(&request.message, 60)
                    );
                    if let Err(err) = self.engine.send(request_id, to_wire(request)) {
                        widget_warn!("Chat request {} not sent: {}", request_id, err);
                        let _ = self.tx.send(ShellEvent::Msg(Msg::ChatFailed {
                            request_id,
                            failure: map_failure(&err, &self.base_url),
                            at: now_ms(),
                        }));
                    }
                }
                Effect::CancelChat { request_id } => {
                    widget_info!("CancelChat request_id={}", request_id);
                    self.engine.cancel(request_id);
                }
            }
        }
    }

    fn spawn_event_loop(&self) {
        let engine = self.engine.clone();
        let base_url = self.base_url.clone();
        let tx = self.tx.clone();
        thread::spawn(move || loop {
            let event = match engine.recv_timeout(Duration::from_millis(200)) {
                Ok(Some(event)) => event,
                Ok(None) => continue,
                Err(err) => {
                    widget_debug!("event loop exiting: {}", err);
                    break;
                }
            };
            let msg = match event {
                EngineEvent::ChatCompleted {
                    request_id,
                    result: Ok(response),
                } => Msg::ChatReplied {
                    request_id,
                    reply: ChatReply {
                        response: response.response,
                        session_token: response.session_token,
                    },
                    at: now_ms(),
                },
                EngineEvent::ChatCompleted {
                    request_id,
                    result: Err(err),
                } => {
                    widget_warn!("Chat request {} failed: {}", request_id, err);
                    Msg::ChatFailed {
                        request_id,
                        failure: map_failure(&err, &base_url),
                        at: now_ms(),
                    }
                }
            };
            if tx.send(ShellEvent::Msg(msg)).is_err() {
                break;
            }
        });
    }
}

fn to_wire(request: ChatRequest) -> CompletionRequest {
    CompletionRequest {
        message: request.message,
        selected_text: request.selected_text,
        session_token: request.session_token,
        mode: request.mode.as_str().to_string(),
    }
}

fn map_failure(err: &ChatError, base_url: &str) -> ChatFailure {
    match &err.kind {
        FailureKind::RateLimited => ChatFailure::RateLimited,
        FailureKind::HttpStatus(code) => ChatFailure::HttpStatus(*code),
        FailureKind::Timeout => ChatFailure::Timeout,
        FailureKind::Unreachable | FailureKind::InvalidUrl => ChatFailure::Unreachable {
            endpoint: base_url.to_string(),
        },
        FailureKind::Network | FailureKind::EngineStopped => ChatFailure::ConnectionFailed,
        FailureKind::InvalidResponse => ChatFailure::InvalidResponse {
            detail: err.message.clone(),
        },
        FailureKind::Cancelled => ChatFailure::Cancelled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_widget_core::ChatMode;
    use chat_widget_engine::{
        ChatClient, CompletionResponse, RequestId, SharedSelection,
    };
    use pretty_assertions::assert_eq;

    const WAIT: Duration = Duration::from_secs(5);
    const BASE: &str = "http://fake";

    struct Echo;

    #[async_trait::async_trait]
    impl ChatClient for Echo {
        async fn complete(
            &self,
            _request_id: RequestId,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, ChatError> {
            Ok(CompletionResponse {
                response: Some(format!("echo: {}", request.message)),
                session_token: Some("session_9_srv".to_string()),
            })
        }

        fn base_url(&self) -> &str {
            BASE
        }
    }

    fn runner() -> (EffectRunner, SharedSelection, mpsc::Receiver<ShellEvent>) {
        let engine = EngineHandle::with_client(Arc::new(Echo)).expect("engine");
        let selection = SharedSelection::new();
        let (tx, rx) = mpsc::channel();
        let runner = EffectRunner::new(
            engine,
            Arc::new(selection.clone()),
            BASE.to_string(),
            tx,
        );
        (runner, selection, rx)
    }

    fn next_msg(rx: &mpsc::Receiver<ShellEvent>) -> Msg {
        match rx.recv_timeout(WAIT).expect("shell event") {
            ShellEvent::Msg(msg) => msg,
            ShellEvent::Input(_) | ShellEvent::InputClosed => panic!("expected a widget message"),
        }
    }

    fn send_chat(request_id: RequestId) -> Effect {
        Effect::SendChat {
            request_id,
            request: ChatRequest {
                message: "Hello".to_string(),
                selected_text: None,
                session_token: "session_1_a".to_string(),
                mode: ChatMode::FullContent,
            },
        }
    }

    fn err(kind: FailureKind) -> ChatError {
        ChatError {
            kind,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn failure_kinds_map_onto_widget_taxonomy() {
        let base = "http://localhost:8000";
        assert_eq!(
            map_failure(&err(FailureKind::RateLimited), base),
            ChatFailure::RateLimited
        );
        assert_eq!(
            map_failure(&err(FailureKind::HttpStatus(502)), base),
            ChatFailure::HttpStatus(502)
        );
        assert_eq!(
            map_failure(&err(FailureKind::Timeout), base),
            ChatFailure::Timeout
        );
        assert_eq!(
            map_failure(&err(FailureKind::Unreachable), base),
            ChatFailure::Unreachable {
                endpoint: base.to_string()
            }
        );
        assert_eq!(
            map_failure(&err(FailureKind::Network), base),
            ChatFailure::ConnectionFailed
        );
    }

    #[test]
    fn wire_request_keeps_every_field() {
        let wire = to_wire(ChatRequest {
            message: "Hello".to_string(),
            selected_text: Some("foo".to_string()),
            session_token: "session_1_a".to_string(),
            mode: ChatMode::FullContent,
        });
        assert_eq!(wire.message, "Hello");
        assert_eq!(wire.selected_text.as_deref(), Some("foo"));
        assert_eq!(wire.session_token, "session_1_a");
        assert_eq!(wire.mode, "full_content");
    }

    #[test]
    fn stopped_engine_reads_as_connection_failure() {
        assert_eq!(
            map_failure(&err(FailureKind::EngineStopped), "http://localhost:8000"),
            ChatFailure::ConnectionFailed
        );
    }

    #[test]
    fn selection_subscription_forwards_changes_until_unsubscribed() {
        let (mut runner, selection, rx) = runner();
        selection.select("already there");
        runner.run(vec![Effect::SubscribeSelection, Effect::QuerySelection]);
        // Subscribing twice keeps a single listener.
        runner.run(vec![Effect::SubscribeSelection]);
        assert_eq!(selection.listener_count(), 1);
        assert_eq!(
            next_msg(&rx),
            Msg::SelectionChanged(Some("already there".to_string()))
        );

        selection.select("foo");
        assert_eq!(next_msg(&rx), Msg::SelectionChanged(Some("foo".to_string())));

        runner.run(vec![Effect::UnsubscribeSelection]);
        assert_eq!(selection.listener_count(), 0);
        selection.select("ignored");
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn send_chat_delivers_reply_for_same_request() {
        let (mut runner, _selection, rx) = runner();
        runner.run(vec![send_chat(4)]);

        match next_msg(&rx) {
            Msg::ChatReplied {
                request_id, reply, ..
            } => {
                assert_eq!(request_id, 4);
                assert_eq!(reply.response.as_deref(), Some("echo: Hello"));
                assert_eq!(reply.session_token.as_deref(), Some("session_9_srv"));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn send_after_shutdown_reports_failure() {
        let (mut runner, selection, rx) = runner();
        runner.run(vec![Effect::SubscribeSelection]);
        runner.shutdown();
        assert_eq!(selection.listener_count(), 0);

        // Wait for the engine thread to wind down.
        assert!(runner.engine.recv_timeout(WAIT).is_err());

        runner.run(vec![send_chat(8)]);
        let failure = match next_msg(&rx) {
            Msg::ChatFailed {
                request_id,
                failure,
                ..
            } => {
                assert_eq!(request_id, 8);
                failure
            }
            other => panic!("unexpected message: {other:?}"),
        };
        assert_eq!(failure, ChatFailure::ConnectionFailed);
    }
}
