//! Service configuration
//!
//! [`ServiceConfig`] is supplied once when constructing an
//! [`AiService`](crate::AiService) and never mutated afterwards. Credentials
//! are optional: a missing credential only surfaces as a configuration error
//! when a capability that needs it is first called.

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::polling::PollPolicy;
use crate::retry::RetryPolicy;

pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_REPLICATE_BASE_URL: &str = "https://api.replicate.com/v1";

/// HTTP transport settings shared by every backend client.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout
    pub timeout: Option<Duration>,
    /// Connection timeout
    pub connect_timeout: Option<Duration>,
    /// Proxy URL applied to all requests
    pub proxy: Option<String>,
    /// User agent
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(120)),
            connect_timeout: Some(Duration::from_secs(10)),
            proxy: None,
            user_agent: Some(concat!("ai-service/", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}

/// Upper bounds on caller-supplied payloads, checked before any request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputLimits {
    /// Maximum characters of text input
    pub max_text_chars: usize,
    /// Maximum decoded image size in bytes
    pub max_image_bytes: usize,
    /// Maximum audio size in bytes
    pub max_audio_bytes: usize,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            max_text_chars: 100_000,
            max_image_bytes: 20 * 1024 * 1024,
            max_audio_bytes: 25 * 1024 * 1024,
        }
    }
}

/// Configuration for an [`AiService`](crate::AiService).
///
/// ```rust,ignore
/// let config = ServiceConfig::new()
///     .with_openrouter_api_key("sk-or-...")
///     .with_replicate_api_token("r8_...")
///     .with_chat_model("anthropic/claude-3.5-sonnet");
/// let service = AiService::new(config)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    pub openrouter_api_key: Option<SecretString>,
    pub openai_api_key: Option<SecretString>,
    pub replicate_api_token: Option<SecretString>,

    /// OpenRouter endpoint (defaults to [`DEFAULT_OPENROUTER_BASE_URL`])
    pub openrouter_base_url: Option<String>,
    /// Sent as `HTTP-Referer` on OpenRouter requests
    pub openrouter_referer: Option<String>,
    /// Sent as `X-Title` on OpenRouter requests
    pub openrouter_title: Option<String>,
    /// OpenAI endpoint (defaults to [`DEFAULT_OPENAI_BASE_URL`])
    pub openai_base_url: Option<String>,
    /// Replicate endpoint (defaults to [`DEFAULT_REPLICATE_BASE_URL`])
    pub replicate_base_url: Option<String>,

    // Model overrides, applied to whichever backend serves the family.
    pub image_model: Option<String>,
    pub tts_model: Option<String>,
    pub whisper_model: Option<String>,
    pub moderation_model: Option<String>,
    pub chat_model: Option<String>,

    pub http: HttpConfig,
    pub poll_policy: PollPolicy,
    /// Retries for synchronous requests. `None` fails fast.
    pub retry_policy: Option<RetryPolicy>,
    pub limits: InputLimits,
}

fn secret(value: impl Into<String>) -> SecretString {
    SecretString::from(value.into())
}

/// Treats blank secrets as absent.
pub(crate) fn present(key: &Option<SecretString>) -> Option<&SecretString> {
    key.as_ref().filter(|k| !k.expose_secret().trim().is_empty())
}

impl ServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from environment variables.
    ///
    /// Unset or empty variables leave the corresponding field unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            openrouter_api_key: get("OPENROUTER_API_KEY").map(secret),
            openai_api_key: get("OPENAI_API_KEY").map(secret),
            replicate_api_token: get("REPLICATE_API_TOKEN")
                .or_else(|| get("REPLICATE_API_KEY"))
                .map(secret),
            openrouter_base_url: get("OPENROUTER_BASE_URL"),
            openrouter_referer: get("OPENROUTER_REFERER"),
            openrouter_title: get("OPENROUTER_TITLE"),
            openai_base_url: get("OPENAI_BASE_URL"),
            replicate_base_url: get("REPLICATE_BASE_URL"),
            image_model: get("AI_SERVICE_IMAGE_MODEL"),
            tts_model: get("AI_SERVICE_TTS_MODEL"),
            whisper_model: get("AI_SERVICE_WHISPER_MODEL"),
            moderation_model: get("AI_SERVICE_MODERATION_MODEL"),
            chat_model: get("AI_SERVICE_CHAT_MODEL"),
            ..Default::default()
        }
    }

    pub fn with_openrouter_api_key(mut self, key: impl Into<String>) -> Self {
        self.openrouter_api_key = Some(secret(key));
        self
    }

    pub fn with_openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(secret(key));
        self
    }

    pub fn with_replicate_api_token(mut self, token: impl Into<String>) -> Self {
        self.replicate_api_token = Some(secret(token));
        self
    }

    pub fn with_openrouter_base_url(mut self, url: impl Into<String>) -> Self {
        self.openrouter_base_url = Some(url.into());
        self
    }

    pub fn with_openrouter_referer(mut self, referer: impl Into<String>) -> Self {
        self.openrouter_referer = Some(referer.into());
        self
    }

    pub fn with_openrouter_title(mut self, title: impl Into<String>) -> Self {
        self.openrouter_title = Some(title.into());
        self
    }

    pub fn with_openai_base_url(mut self, url: impl Into<String>) -> Self {
        self.openai_base_url = Some(url.into());
        self
    }

    pub fn with_replicate_base_url(mut self, url: impl Into<String>) -> Self {
        self.replicate_base_url = Some(url.into());
        self
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = Some(model.into());
        self
    }

    pub fn with_tts_model(mut self, model: impl Into<String>) -> Self {
        self.tts_model = Some(model.into());
        self
    }

    pub fn with_whisper_model(mut self, model: impl Into<String>) -> Self {
        self.whisper_model = Some(model.into());
        self
    }

    pub fn with_moderation_model(mut self, model: impl Into<String>) -> Self {
        self.moderation_model = Some(model.into());
        self
    }

    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = Some(model.into());
        self
    }

    pub fn with_http_config(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll_policy = policy;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    pub fn with_limits(mut self, limits: InputLimits) -> Self {
        self.limits = limits;
        self
    }

    pub(crate) fn openrouter_base_url(&self) -> &str {
        base_url_or(&self.openrouter_base_url, DEFAULT_OPENROUTER_BASE_URL)
    }

    pub(crate) fn openai_base_url(&self) -> &str {
        base_url_or(&self.openai_base_url, DEFAULT_OPENAI_BASE_URL)
    }

    pub(crate) fn replicate_base_url(&self) -> &str {
        base_url_or(&self.replicate_base_url, DEFAULT_REPLICATE_BASE_URL)
    }
}

fn base_url_or<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    value
        .as_deref()
        .map(|v| v.trim().trim_end_matches('/'))
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_has_no_credentials() {
        let config = ServiceConfig::default();
        assert!(present(&config.openrouter_api_key).is_none());
        assert!(present(&config.openai_api_key).is_none());
        assert!(present(&config.replicate_api_token).is_none());
        assert!(config.retry_policy.is_none());
    }

    #[test]
    fn test_blank_key_counts_as_absent() {
        let config = ServiceConfig::new().with_openai_api_key("   ");
        assert!(present(&config.openai_api_key).is_none());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = ServiceConfig::new()
            .with_openai_api_key("sk-secret-openai-key")
            .with_replicate_api_token("r8-secret-token");
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret-openai-key"));
        assert!(!debug.contains("r8-secret-token"));
    }

    #[test]
    fn test_from_lookup_reads_credentials_and_overrides() {
        let vars: HashMap<&str, &str> = [
            ("OPENROUTER_API_KEY", "or-key"),
            ("REPLICATE_API_KEY", "r8-alias"),
            ("OPENROUTER_TITLE", "My App"),
            ("AI_SERVICE_CHAT_MODEL", "openai/gpt-4o"),
            ("OPENAI_API_KEY", "  "),
        ]
        .into_iter()
        .collect();
        let config = ServiceConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(
            config.openrouter_api_key.as_ref().unwrap().expose_secret(),
            "or-key"
        );
        assert_eq!(
            config.replicate_api_token.as_ref().unwrap().expose_secret(),
            "r8-alias"
        );
        assert!(config.openai_api_key.is_none());
        assert_eq!(config.openrouter_title.as_deref(), Some("My App"));
        assert_eq!(config.chat_model.as_deref(), Some("openai/gpt-4o"));
    }

    #[test]
    fn test_base_urls_default_and_trim() {
        let config = ServiceConfig::new().with_openai_base_url("http://localhost:8080/v1/");
        assert_eq!(config.openai_base_url(), "http://localhost:8080/v1");
        assert_eq!(config.openrouter_base_url(), DEFAULT_OPENROUTER_BASE_URL);
        assert_eq!(config.replicate_base_url(), DEFAULT_REPLICATE_BASE_URL);
    }
}
