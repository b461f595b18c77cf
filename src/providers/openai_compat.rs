//! OpenAI-compatible HTTP client
//!
//! One client type serves both OpenRouter and the direct OpenAI API. OpenRouter
//! instances only ever receive chat requests; the media and moderation
//! endpoints are used on OpenAI.

use reqwest::header::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::capability::Capability;
use crate::error::{Result, ServiceError};
use crate::router::BackendId;
use crate::utils::http::{HttpHeaderBuilder, response_error, transport_error};

/// Chat message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    /// A user turn carrying text and one inline image.
    pub fn user_with_image(text: impl Into<String>, data_uri: String, detail: Option<&str>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: text.into() },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: data_uri,
                        detail: detail.map(str::to_string),
                    },
                },
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// `POST /chat/completions` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl ChatRequest {
    /// Whether the request asks for a JSON object reply.
    pub fn wants_json(&self) -> bool {
        self.response_format
            .as_ref()
            .is_some_and(|f| f.kind == "json_object")
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ModerationBody<'a> {
    input: &'a str,
    model: &'a str,
}

/// `OpenAI` moderation API response structure
#[derive(Debug, Deserialize)]
struct OpenAiModerationResponse {
    results: Vec<OpenAiModerationResult>,
}

#[derive(Debug, Deserialize)]
struct OpenAiModerationResult {
    flagged: bool,
    categories: BTreeMap<String, bool>,
    category_scores: BTreeMap<String, f64>,
}

/// `POST /images/generations` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenAiImageRequest {
    pub model: String,
    pub prompt: String,
    pub n: u32,
    pub size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    pub response_format: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiImageResponse {
    #[serde(default)]
    data: Vec<OpenAiImageData>,
}

#[derive(Debug, Deserialize)]
struct OpenAiImageData {
    url: Option<String>,
    b64_json: Option<String>,
    revised_prompt: Option<String>,
}

/// Multipart `POST /audio/transcriptions` fields.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiTranscriptionRequest {
    pub model: String,
    pub audio: Vec<u8>,
    pub file_name: String,
    pub mime: String,
    pub language: Option<String>,
    pub prompt: Option<String>,
    pub temperature: Option<f32>,
}

/// `POST /audio/speech` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenAiSpeechRequest {
    pub model: String,
    pub input: String,
    pub voice: String,
    pub response_format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
}

/// Client for an OpenAI-compatible API (OpenRouter or OpenAI).
#[derive(Clone)]
pub struct OpenAiCompatClient {
    backend: BackendId,
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    referer: Option<String>,
    title: Option<String>,
}

impl std::fmt::Debug for OpenAiCompatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatClient")
            .field("backend", &self.backend)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenAiCompatClient {
    pub fn openai(http: reqwest::Client, base_url: &str, api_key: SecretString) -> Self {
        Self {
            backend: BackendId::OpenAi,
            http,
            base_url: base_url.to_string(),
            api_key,
            referer: None,
            title: None,
        }
    }

    pub fn openrouter(
        http: reqwest::Client,
        base_url: &str,
        api_key: SecretString,
        referer: Option<String>,
        title: Option<String>,
    ) -> Result<Self> {
        let client = Self {
            backend: BackendId::OpenRouter,
            http,
            base_url: base_url.to_string(),
            api_key,
            referer,
            title,
        };
        // Surface bad branding values at construction rather than per call.
        client.headers()?;
        Ok(client)
    }

    pub fn backend(&self) -> BackendId {
        self.backend
    }

    fn header_builder(&self) -> Result<HttpHeaderBuilder> {
        let builder = HttpHeaderBuilder::new().with_bearer_auth(self.api_key.expose_secret())?;
        match self.backend {
            BackendId::OpenRouter => builder
                .with_optional_header("HTTP-Referer", self.referer.as_deref())?
                .with_optional_header("X-Title", self.title.as_deref()),
            _ => Ok(builder),
        }
    }

    fn headers(&self) -> Result<HeaderMap> {
        Ok(self.header_builder()?.build())
    }

    fn json_headers(&self) -> Result<HeaderMap> {
        Ok(self.header_builder()?.with_json_content_type().build())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<reqwest::Response> {
        let response = self
            .http
            .post(self.url(path))
            .headers(self.json_headers()?)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(self.backend, e))?;
        if !response.status().is_success() {
            return Err(response_error(self.backend, response).await);
        }
        Ok(response)
    }

    /// Decode a success body; failure means the `capability` reply is malformed.
    async fn decode<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
        capability: Capability,
    ) -> Result<T> {
        response.json::<T>().await.map_err(|e| {
            ServiceError::malformed(
                capability,
                format!("undecodable {} response: {e}", self.backend),
            )
        })
    }

    /// Run one chat completion and return the assistant's text content.
    pub async fn chat(&self, request: &ChatRequest, capability: Capability) -> Result<String> {
        tracing::debug!(
            "{} chat completion with model {} (json: {})",
            self.backend,
            request.model,
            request.wants_json()
        );
        let response = self.post_json("chat/completions", request).await?;
        let completion: ChatCompletionResponse = self.decode(response, capability).await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ServiceError::malformed(capability, "chat completion has no content"))
    }

    /// Classify `input` with `/moderations`.
    ///
    /// Returns `{flagged, categories, categoryScores}` for the first result.
    pub async fn moderate(&self, input: &str, model: &str) -> Result<serde_json::Map<String, serde_json::Value>> {
        tracing::debug!("{} moderation with model {}", self.backend, model);
        let response = self
            .post_json("moderations", &ModerationBody { input, model })
            .await?;
        let parsed: OpenAiModerationResponse = self.decode(response, Capability::Moderation).await?;
        let result = parsed.results.into_iter().next().ok_or_else(|| {
            ServiceError::malformed(Capability::Moderation, "moderation returned no results")
        })?;

        let mut map = serde_json::Map::new();
        map.insert("flagged".into(), result.flagged.into());
        map.insert("categories".into(), serde_json::json!(result.categories));
        map.insert("categoryScores".into(), serde_json::json!(result.category_scores));
        Ok(map)
    }

    /// Generate one image; returns `{url?, base64?, revisedPrompt?}`.
    pub async fn generate_image(&self, request: &OpenAiImageRequest) -> Result<serde_json::Map<String, serde_json::Value>> {
        tracing::debug!("{} image generation with model {}", self.backend, request.model);
        let response = self.post_json("images/generations", request).await?;
        let parsed: OpenAiImageResponse = self.decode(response, Capability::ImageGeneration).await?;
        let image = parsed.data.into_iter().next().ok_or_else(|| {
            ServiceError::malformed(Capability::ImageGeneration, "image generation returned no data")
        })?;

        let mut map = serde_json::Map::new();
        if let Some(url) = image.url {
            map.insert("url".into(), url.into());
        }
        if let Some(b64) = image.b64_json {
            map.insert("base64".into(), b64.into());
        }
        if let Some(revised) = image.revised_prompt {
            map.insert("revisedPrompt".into(), revised.into());
        }
        Ok(map)
    }

    /// Transcribe audio with a `verbose_json` response.
    pub async fn transcribe(&self, request: &OpenAiTranscriptionRequest) -> Result<serde_json::Map<String, serde_json::Value>> {
        tracing::debug!(
            "{} transcription of {} bytes with model {}",
            self.backend,
            request.audio.len(),
            request.model
        );
        let part = reqwest::multipart::Part::bytes(request.audio.clone())
            .file_name(request.file_name.clone())
            .mime_str(&request.mime)
            .map_err(|e| ServiceError::InvalidInput(format!("Invalid audio MIME type: {e}")))?;
        let mut form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", request.model.clone())
            .text("response_format", "verbose_json");
        if let Some(language) = &request.language {
            form = form.text("language", language.clone());
        }
        if let Some(prompt) = &request.prompt {
            form = form.text("prompt", prompt.clone());
        }
        if let Some(temperature) = request.temperature {
            form = form.text("temperature", temperature.to_string());
        }

        let response = self
            .http
            .post(self.url("audio/transcriptions"))
            .headers(self.headers()?)
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error(self.backend, e))?;
        if !response.status().is_success() {
            return Err(response_error(self.backend, response).await);
        }
        self.decode(response, Capability::Transcription).await
    }

    /// Synthesize speech; returns the encoded audio body.
    pub async fn speech(&self, request: &OpenAiSpeechRequest) -> Result<Vec<u8>> {
        tracing::debug!(
            "{} speech synthesis with model {} and voice {}",
            self.backend,
            request.model,
            request.voice
        );
        let response = self.post_json("audio/speech", request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(self.backend, e))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vision_message_wire_shape() {
        let message = ChatMessage::user_with_image(
            "What is this?",
            "data:image/png;base64,AAAA".to_string(),
            Some("low"),
        );
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][1]["type"], "image_url");
        assert_eq!(
            json["content"][1]["image_url"]["url"],
            "data:image/png;base64,AAAA"
        );
        assert_eq!(json["content"][1]["image_url"]["detail"], "low");
    }

    #[test]
    fn test_chat_request_omits_unset_fields() {
        let request = ChatRequest {
            model: "gpt-4o-mini".into(),
            messages: vec![ChatMessage::system("be terse"), ChatMessage::user("hi")],
            temperature: None,
            max_tokens: None,
            response_format: Some(ResponseFormat { kind: "json_object" }),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("temperature").is_none());
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(json["messages"][0]["content"], "be terse");
        assert!(request.wants_json());
    }

    #[test]
    fn test_openrouter_rejects_invalid_title() {
        let err = OpenAiCompatClient::openrouter(
            reqwest::Client::new(),
            "http://localhost",
            SecretString::from("k".to_string()),
            None,
            Some("bad\ntitle".into()),
        )
        .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_json_headers_carry_content_type_and_branding() {
        let client = OpenAiCompatClient::openrouter(
            reqwest::Client::new(),
            "http://localhost",
            SecretString::from("or-key".to_string()),
            Some("https://app.example".into()),
            None,
        )
        .unwrap();
        let headers = client.json_headers().unwrap();
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(headers["authorization"], "Bearer or-key");
        assert_eq!(headers["http-referer"], "https://app.example");
        assert!(headers.get("x-title").is_none());
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let client = OpenAiCompatClient::openai(
            reqwest::Client::new(),
            "http://localhost",
            SecretString::from("sk-very-secret".to_string()),
        );
        assert!(!format!("{client:?}").contains("sk-very-secret"));
    }
}
