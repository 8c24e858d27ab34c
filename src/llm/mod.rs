pub mod llama_service;
pub mod runtime;
pub mod service;
pub mod types;

pub use llama_service::LlamaRuntime;
pub use runtime::{GenerationError, ModelRuntime};
pub use service::{DialogueService, Turn};
pub use types::GenerationOptions;
