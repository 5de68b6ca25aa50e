use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use widget_logging::{widget_debug, widget_error, widget_info};

use crate::client::{ChatClient, ClientSettings, ReqwestChatClient};
use crate::{ChatError, CompletionRequest, EngineEvent, FailureKind, RequestId};

enum EngineCommand {
    Send {
        request_id: RequestId,
        request: CompletionRequest,
    },
    Cancel {
        request_id: RequestId,
    },
    Shutdown,
}

type InFlight = Arc<Mutex<HashMap<RequestId, CancellationToken>>>;

/// Runs chat requests on a background tokio runtime.
///
/// Every request accepted by [`EngineHandle::send`] reports exactly one
/// [`EngineEvent::ChatCompleted`], whether it succeeds, fails, times out, is
/// cancelled or panics. Requests still running at [`EngineHandle::shutdown`]
/// are dropped without an event.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Result<Self, ChatError> {
        let client = ReqwestChatClient::new(settings)?;
        Self::with_client(Arc::new(client))
    }

    pub fn with_client(client: Arc<dyn ChatClient>) -> Result<Self, ChatError> {
        let runtime = tokio::runtime::Runtime::new().map_err(|err| {
            widget_error!("failed to start engine runtime: {}", err);
            ChatError::new(FailureKind::EngineStopped, err.to_string())
        })?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let in_flight: InFlight = Arc::default();
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Send {
                        request_id,
                        request,
                    } => {
                        let token = CancellationToken::new();
                        if let Ok(mut map) = in_flight.lock() {
                            map.insert(request_id, token.clone());
                        }
                        let client = client.clone();
                        let exchange = runtime.spawn(async move {
                            tokio::select! {
                                _ = token.cancelled() => Err(ChatError::new(
                                    FailureKind::Cancelled,
                                    "request cancelled",
                                )),
                                result = client.complete(request_id, &request) => result,
                            }
                        });
                        let event_tx = event_tx.clone();
                        let in_flight = in_flight.clone();
                        runtime.spawn(async move {
                            // A panicking client still settles its request.
                            let result = exchange.await.unwrap_or_else(|err| {
                                Err(ChatError::new(FailureKind::Network, err.to_string()))
                            });
                            if let Ok(mut map) = in_flight.lock() {
                                map.remove(&request_id);
                            }
                            let _ = event_tx.send(EngineEvent::ChatCompleted { request_id, result });
                        });
                    }
                    EngineCommand::Cancel { request_id } => {
                        let token = in_flight
                            .lock()
                            .ok()
                            .and_then(|mut map| map.remove(&request_id));
                        match token {
                            Some(token) => token.cancel(),
                            None => widget_debug!("cancel for settled request id={}", request_id),
                        }
                    }
                    EngineCommand::Shutdown => break,
                }
            }
            // Refuse new commands before the event channel closes.
            drop(cmd_rx);
            drop(runtime);
            drop(event_tx);
            widget_info!("engine stopped");
        });

        Ok(Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        })
    }

    /// Queues a request. Fails once the engine has stopped.
    pub fn send(&self, request_id: RequestId, request: CompletionRequest) -> Result<(), ChatError> {
        self.cmd_tx
            .send(EngineCommand::Send {
                request_id,
                request,
            })
            .map_err(|_| stopped())
    }

    pub fn cancel(&self, request_id: RequestId) {
        if self.cmd_tx.send(EngineCommand::Cancel { request_id }).is_err() {
            widget_debug!("cancel for request id={} after engine stopped", request_id);
        }
    }

    /// Stops the engine thread; requests still running are dropped.
    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    /// Waits up to `timeout` for an event.
    ///
    /// `Ok(None)` means nothing arrived in time; `Err` means the engine has
    /// stopped and no further events will come.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<EngineEvent>, ChatError> {
        let rx = self.event_rx.lock().map_err(|_| stopped())?;
        match rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(stopped()),
        }
    }
}

fn stopped() -> ChatError {
    ChatError::new(FailureKind::EngineStopped, "engine stopped")
}
