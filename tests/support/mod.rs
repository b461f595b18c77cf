//! Shared fixtures for the mock-server tests

#![allow(dead_code)]

use std::time::Duration;

use ai_service::{AiService, PollPolicy, ServiceConfig};
use serde_json::{Value, json};
use wiremock::MockServer;

/// A service whose OpenAI client talks to `server`.
pub fn openai_service(server: &MockServer) -> AiService {
    AiService::new(
        ServiceConfig::new()
            .with_openai_api_key("test-openai-key")
            .with_openai_base_url(server.uri()),
    )
    .unwrap()
}

/// A service whose OpenRouter client talks to `server`.
pub fn openrouter_config(server: &MockServer) -> ServiceConfig {
    ServiceConfig::new()
        .with_openrouter_api_key("test-openrouter-key")
        .with_openrouter_base_url(server.uri())
}

/// A Replicate-only service with fast polling.
pub fn replicate_service(server: &MockServer, max_polls: u32) -> AiService {
    AiService::new(
        ServiceConfig::new()
            .with_replicate_api_token("test-replicate-token")
            .with_replicate_base_url(server.uri())
            .with_poll_policy(PollPolicy::fixed(max_polls, Duration::from_millis(10))),
    )
    .unwrap()
}

/// Chat completion envelope carrying `content`.
pub fn chat_completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1677652288,
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 9, "completion_tokens": 12, "total_tokens": 21}
    })
}

/// Prediction record in `status`.
pub fn prediction(id: &str, status: &str, output: Value) -> Value {
    json!({
        "id": id,
        "status": status,
        "output": output,
        "error": null,
        "urls": {"get": format!("https://api.replicate.com/v1/predictions/{id}")}
    })
}

/// Minimal WAV header, enough for type sniffing.
pub fn wav_bytes() -> Vec<u8> {
    let mut bytes = b"RIFF".to_vec();
    bytes.extend_from_slice(&36u32.to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&[0u8; 32]);
    bytes
}

/// PNG signature plus padding.
pub fn png_bytes() -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[0u8; 16]);
    bytes
}

/// Number of requests `server` has seen.
pub async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map(|r| r.len()).unwrap_or(0)
}
