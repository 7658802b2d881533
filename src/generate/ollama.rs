//! Ollama chat-API client.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::client::TextGenerator;

pub const DEFAULT_URL: &str = "http://localhost:11434/api/chat";
pub const DEFAULT_MODEL: &str = "tinyllama";

/// Talks to a local Ollama instance over its chat endpoint.
pub struct OllamaClient {
    url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(url: String, model: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { url, model, client })
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    async fn generate(&self, system: Option<&str>, prompt: &str) -> String {
        let mut messages = Vec::new();
        if let Some(system) = system {
            messages.push(json!({"role": "system", "content": system}));
        }
        messages.push(json!({"role": "user", "content": prompt}));

        let body = json!({
            "model": self.model,
            "messages": messages,
            "stream": false,
            "options": {
                "temperature": 0.7,
                "num_predict": 500,
            },
        });

        debug!(url = %self.url, model = %self.model, prompt_len = prompt.len(), "Querying model");

        let response = match self.client.post(&self.url).json(&body).send().await {
            Ok(response) => response,
            Err(e) if e.is_connect() => {
                return "ERROR: Cannot connect to Ollama. Make sure it is running (ollama serve)."
                    .to_string();
            }
            Err(e) if e.is_timeout() => {
                return "ERROR: Ollama took too long to respond.".to_string();
            }
            Err(e) => return format!("ERROR: {}", e),
        };

        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(e) => return format!("ERROR: {}", e),
        };

        match response.json::<serde_json::Value>().await {
            Ok(data) => data
                .get("message")
                .and_then(|m| m.get("content"))
                .and_then(|c| c.as_str())
                .unwrap_or_default()
                .to_string(),
            Err(e) => format!("ERROR: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds_with_defaults() {
        let client = OllamaClient::new(DEFAULT_URL.to_string(), DEFAULT_MODEL.to_string());
        assert!(client.is_ok());
    }
}
