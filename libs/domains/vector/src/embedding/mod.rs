mod openai;
mod provider;
mod retry;

pub use openai::{OpenAIConfig, OpenAIProvider};
pub use provider::EmbeddingProvider;
pub use retry::RetryingEmbedder;
