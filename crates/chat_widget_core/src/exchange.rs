//! Request/reply values exchanged with the chat completion service.

/// Shown when a successful reply carries no usable text.
pub const FALLBACK_REPLY: &str = "Sorry, I could not process your request.";

const GENERIC_FAILURE: &str = "Sorry, I encountered an error. Please try again.";
const RATE_LIMITED: &str = "Rate limit exceeded. Please wait before sending another message.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatMode {
    /// Answer from the full indexed content, not only the selection.
    #[default]
    FullContent,
}

impl ChatMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ChatMode::FullContent => "full_content",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
    pub selected_text: Option<String>,
    pub session_token: String,
    pub mode: ChatMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatReply {
    pub response: Option<String>,
    pub session_token: Option<String>,
}

/// Why a chat request did not produce a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatFailure {
    /// HTTP 429.
    RateLimited,
    /// Any other non-2xx status.
    HttpStatus(u16),
    /// The request deadline elapsed first.
    Timeout,
    /// The endpoint could not be reached at all.
    Unreachable { endpoint: String },
    /// Transport failure after a connection was possible.
    ConnectionFailed,
    /// A 2xx reply whose body could not be decoded.
    InvalidResponse { detail: String },
    /// The request was aborted on our side.
    Cancelled,
}

impl ChatFailure {
    /// Text of the synthetic bot message appended to the transcript.
    pub fn transcript_text(&self) -> String {
        match self {
            ChatFailure::RateLimited => RATE_LIMITED.to_string(),
            ChatFailure::HttpStatus(code) => {
                format!("Error: API request failed with status {code}")
            }
            ChatFailure::Timeout => "Request timed out. Please try again.".to_string(),
            ChatFailure::Unreachable { endpoint } => format!(
                "Unable to connect to the server. Please make sure the backend is running on {endpoint}."
            ),
            ChatFailure::ConnectionFailed => {
                "Connection failed. Please check if the backend server is running.".to_string()
            }
            ChatFailure::InvalidResponse { detail } => format!("Error: {detail}"),
            ChatFailure::Cancelled => GENERIC_FAILURE.to_string(),
        }
    }

    /// Short description stored in the widget's `error` field.
    pub fn summary(&self) -> String {
        match self {
            ChatFailure::RateLimited => RATE_LIMITED.to_string(),
            ChatFailure::HttpStatus(code) => format!("API request failed with status {code}"),
            ChatFailure::Timeout => "Request timed out".to_string(),
            ChatFailure::Unreachable { endpoint } => format!("Unable to reach {endpoint}"),
            ChatFailure::ConnectionFailed => "Connection failed".to_string(),
            ChatFailure::InvalidResponse { detail } => detail.clone(),
            ChatFailure::Cancelled => "Request cancelled".to_string(),
        }
    }
}
