//! Capability routing
//!
//! [`ProviderSelection`] is derived once from a [`ServiceConfig`] and records
//! which backend serves each capability family. Missing credentials are kept as
//! `None` slots so the error surfaces at first use of that family rather than
//! at construction.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capability::{Capability, CapabilityFamily, MediaCapability};
use crate::config::{ServiceConfig, present};
use crate::error::{Result, ServiceError};

/// Identity of an upstream backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendId {
    /// OpenAI-compatible chat gateway
    OpenRouter,
    /// Direct OpenAI API
    OpenAi,
    /// Asynchronous prediction backend
    Replicate,
}

impl BackendId {
    pub const fn as_str(self) -> &'static str {
        match self {
            BackendId::OpenRouter => "openrouter",
            BackendId::OpenAi => "openai",
            BackendId::Replicate => "replicate",
        }
    }

    /// Whether this backend serves chat-completion turns (text, vision, moderation).
    pub const fn supports_chat(self) -> bool {
        matches!(self, BackendId::OpenRouter | BackendId::OpenAi)
    }

    /// Whether this backend can serve the given media capability.
    pub const fn supports(self, media: MediaCapability) -> bool {
        use MediaCapability::*;
        match (self, media) {
            (BackendId::OpenAi, ImageGeneration | Transcription | SpeechSynthesis) => true,
            (BackendId::Replicate, ImageGeneration | Transcription | SpeechSynthesis) => true,
            (BackendId::OpenRouter, _) => false,
        }
    }

    /// Whether calls to this backend are submit-then-poll jobs.
    pub const fn is_job_based(self) -> bool {
        matches!(self, BackendId::Replicate)
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only routing table computed once per service instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSelection {
    chat: Option<BackendId>,
    image_generation: Option<BackendId>,
    transcription: Option<BackendId>,
    speech_synthesis: Option<BackendId>,
    job_fallback_available: bool,
}

impl ProviderSelection {
    pub fn from_config(config: &ServiceConfig) -> Self {
        let available = Available {
            openrouter: present(&config.openrouter_api_key).is_some(),
            openai: present(&config.openai_api_key).is_some(),
            replicate: present(&config.replicate_api_token).is_some(),
        };
        let selection = Self {
            chat: available.chat(),
            image_generation: available.media(MediaCapability::ImageGeneration),
            transcription: available.media(MediaCapability::Transcription),
            speech_synthesis: available.media(MediaCapability::SpeechSynthesis),
            job_fallback_available: available.replicate,
        };
        tracing::debug!(
            chat = ?selection.chat,
            image_generation = ?selection.image_generation,
            transcription = ?selection.transcription,
            speech_synthesis = ?selection.speech_synthesis,
            "Computed provider selection"
        );
        selection
    }

    /// Backend serving chat-family capabilities, if any credential allows it.
    pub fn chat_backend(&self) -> Option<BackendId> {
        self.chat
    }

    /// Backend serving the given media capability, if any credential allows it.
    pub fn media_backend(&self, media: MediaCapability) -> Option<BackendId> {
        match media {
            MediaCapability::ImageGeneration => self.image_generation,
            MediaCapability::Transcription => self.transcription,
            MediaCapability::SpeechSynthesis => self.speech_synthesis,
        }
    }

    /// Whether the job backend is configured and can take media capabilities.
    pub fn job_fallback_available(&self) -> bool {
        self.job_fallback_available
    }

    /// Resolve the backend for `capability`, or explain which credential is missing.
    pub fn select(&self, capability: Capability) -> Result<BackendId> {
        match capability.family() {
            CapabilityFamily::Chat => self.chat.ok_or_else(|| {
                ServiceError::Configuration(format!(
                    "{capability} requires OPENROUTER_API_KEY or OPENAI_API_KEY"
                ))
            }),
            CapabilityFamily::Media(media) => self.media_backend(media).ok_or_else(|| {
                ServiceError::Configuration(format!(
                    "{capability} requires OPENAI_API_KEY or REPLICATE_API_TOKEN"
                ))
            }),
        }
    }
}

struct Available {
    openrouter: bool,
    openai: bool,
    replicate: bool,
}

impl Available {
    fn chat(&self) -> Option<BackendId> {
        if self.openrouter {
            Some(BackendId::OpenRouter)
        } else if self.openai {
            Some(BackendId::OpenAi)
        } else {
            None
        }
    }

    fn media(&self, media: MediaCapability) -> Option<BackendId> {
        [
            (self.openai, BackendId::OpenAi),
            (self.replicate, BackendId::Replicate),
        ]
        .into_iter()
        .find(|(configured, backend)| *configured && backend.supports(media))
        .map(|(_, backend)| backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_selects_nothing() {
        let selection = ProviderSelection::from_config(&ServiceConfig::default());
        for cap in Capability::ALL {
            let err = selection.select(cap).unwrap_err();
            assert!(err.is_configuration(), "{cap}: {err}");
        }
        assert!(!selection.job_fallback_available());
    }

    #[test]
    fn test_openrouter_preferred_for_chat() {
        let config = ServiceConfig::new()
            .with_openrouter_api_key("or")
            .with_openai_api_key("oa");
        let selection = ProviderSelection::from_config(&config);
        assert_eq!(
            selection.select(Capability::Summarize).unwrap(),
            BackendId::OpenRouter
        );
        assert_eq!(
            selection.select(Capability::ImageAnalysis).unwrap(),
            BackendId::OpenRouter
        );
        // OpenRouter never serves media
        assert_eq!(
            selection.select(Capability::ImageGeneration).unwrap(),
            BackendId::OpenAi
        );
    }

    #[test]
    #[tracing_test::traced_test]
    fn test_selection_is_logged() {
        ProviderSelection::from_config(&ServiceConfig::new().with_replicate_api_token("r8"));
        assert!(logs_contain("Computed provider selection"));
        assert!(!logs_contain("r8"));
    }

    #[test]
    fn test_openai_only_serves_everything() {
        let selection = ProviderSelection::from_config(&ServiceConfig::new().with_openai_api_key("k"));
        for cap in Capability::ALL {
            assert_eq!(selection.select(cap).unwrap(), BackendId::OpenAi);
        }
    }

    #[test]
    fn test_replicate_only_serves_media_and_nothing_else() {
        let selection =
            ProviderSelection::from_config(&ServiceConfig::new().with_replicate_api_token("r8"));
        assert!(selection.job_fallback_available());
        for cap in Capability::ALL {
            match cap.family() {
                CapabilityFamily::Media(_) => {
                    assert_eq!(selection.select(cap).unwrap(), BackendId::Replicate)
                }
                CapabilityFamily::Chat => assert!(selection.select(cap).unwrap_err().is_configuration()),
            }
        }
    }

    #[test]
    fn test_openrouter_with_replicate_falls_back_for_media() {
        let config = ServiceConfig::new()
            .with_openrouter_api_key("or")
            .with_replicate_api_token("r8");
        let selection = ProviderSelection::from_config(&config);
        assert_eq!(selection.chat_backend(), Some(BackendId::OpenRouter));
        for media in MediaCapability::ALL {
            assert_eq!(selection.media_backend(media), Some(BackendId::Replicate));
        }
    }

    #[test]
    fn test_openrouter_alone_has_no_media() {
        let selection =
            ProviderSelection::from_config(&ServiceConfig::new().with_openrouter_api_key("or"));
        for media in MediaCapability::ALL {
            assert!(selection.media_backend(media).is_none());
            assert!(!BackendId::OpenRouter.supports(media));
        }
    }

    #[test]
    fn test_media_support_table() {
        for media in MediaCapability::ALL {
            assert!(BackendId::OpenAi.supports(media), "{media:?}");
            assert!(BackendId::Replicate.supports(media), "{media:?}");
            assert!(!BackendId::OpenRouter.supports(media), "{media:?}");
        }
    }

    #[test]
    fn test_backend_display() {
        assert_eq!(BackendId::OpenRouter.to_string(), "openrouter");
        assert_eq!(BackendId::OpenAi.to_string(), "openai");
        assert_eq!(BackendId::Replicate.to_string(), "replicate");
    }
}
