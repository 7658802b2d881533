mod client;
mod ollama;

pub use client::TextGenerator;
pub use ollama::{DEFAULT_MODEL, DEFAULT_URL, OllamaClient};
