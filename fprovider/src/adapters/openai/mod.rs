//! OpenAI Chat Completions adapter.
//!
//! ```rust
//! use fprovider::adapters::openai::OpenAiProvider;
//! use fprovider::{ModelProvider, ProviderId};
//!
//! let provider = OpenAiProvider::over_http("sk-example", reqwest::Client::new());
//! assert_eq!(provider.id(), ProviderId::OpenAi);
//! assert!(!format!("{provider:?}").contains("sk-example"));
//! ```

mod provider;
mod transport;
mod wire;

pub use provider::OpenAiProvider;
pub use transport::{
    ChatChunkStream, DEFAULT_OPENAI_BASE_URL, OpenAiHttpTransport, OpenAiTransport,
};
pub use wire::{ChatChunk, ChatRequest, ChatResponse};
