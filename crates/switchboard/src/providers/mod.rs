pub mod base;
pub mod errors;
pub mod ollama;
pub mod testprovider;

pub use base::{ModelInfo, Provider};
pub use errors::ProviderError;
pub use ollama::OllamaProvider;
