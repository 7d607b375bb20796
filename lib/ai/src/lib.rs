//! Completion client for voxbridge.
//!
//! - **CompletionBackend**: the seam the orchestrator calls with a transcript
//! - **OpenAiCompatibleClient**: HTTP implementation for OpenAI-style
//!   `/chat/completions` endpoints (Groq by default)

pub mod backend;
pub mod error;
pub mod openai;

pub use backend::{CompletionBackend, CompletionConfig};
pub use error::{LlmError, STATUS_FALLBACK_REPLY, TRANSPORT_FALLBACK_REPLY};
pub use openai::OpenAiCompatibleClient;
