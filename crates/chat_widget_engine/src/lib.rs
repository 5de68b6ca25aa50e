//! Chat widget engine: HTTP exchange, request lifecycle and local IO.
mod client;
mod engine;
mod persist;
mod selection;
mod session;
mod types;

pub use client::{ChatClient, ClientSettings, ReqwestChatClient, COMPLETIONS_PATH};
pub use engine::EngineHandle;
pub use persist::{PersistError, StateFile};
pub use selection::{SelectionListener, SelectionSource, SharedSelection, SubscriptionId};
pub use session::{
    generate_session_id, generate_session_id_with, load_or_create_session, KeyValueStore,
    MemoryStore, StoreError, SESSION_KEY,
};
pub use types::{
    ChatError, CompletionRequest, CompletionResponse, EngineEvent, FailureKind,
    RequestId,
};
