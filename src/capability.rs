//! Capability catalog
//!
//! Every public operation of [`AiService`](crate::AiService) maps to exactly one
//! [`Capability`]. Capabilities are grouped into families that share a backend
//! selection policy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend selection policy shared by a group of capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityFamily {
    /// Served by a chat-completion backend (text transforms, vision, moderation).
    Chat,
    /// Served by a media backend (image generation, audio in and out).
    Media(MediaCapability),
}

/// Capabilities that need a media endpoint rather than a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaCapability {
    ImageGeneration,
    Transcription,
    SpeechSynthesis,
}

impl MediaCapability {
    pub const ALL: [MediaCapability; 3] = [
        MediaCapability::ImageGeneration,
        MediaCapability::Transcription,
        MediaCapability::SpeechSynthesis,
    ];
}

/// One supported AI task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ImageAnalysis,
    ImageGeneration,
    Transcription,
    SpeechSynthesis,
    Summarize,
    Translate,
    Sentiment,
    Moderation,
    Simplify,
    EntityExtraction,
    Email,
    ProductDescription,
    Seo,
    CodeGeneration,
    CodeReview,
    Sql,
    Regex,
    ApiDocs,
    Ocr,
    Quiz,
}

impl Capability {
    pub const ALL: [Capability; 20] = [
        Capability::ImageAnalysis,
        Capability::ImageGeneration,
        Capability::Transcription,
        Capability::SpeechSynthesis,
        Capability::Summarize,
        Capability::Translate,
        Capability::Sentiment,
        Capability::Moderation,
        Capability::Simplify,
        Capability::EntityExtraction,
        Capability::Email,
        Capability::ProductDescription,
        Capability::Seo,
        Capability::CodeGeneration,
        Capability::CodeReview,
        Capability::Sql,
        Capability::Regex,
        Capability::ApiDocs,
        Capability::Ocr,
        Capability::Quiz,
    ];

    pub const fn family(self) -> CapabilityFamily {
        match self {
            Capability::ImageGeneration => CapabilityFamily::Media(MediaCapability::ImageGeneration),
            Capability::Transcription => CapabilityFamily::Media(MediaCapability::Transcription),
            Capability::SpeechSynthesis => {
                CapabilityFamily::Media(MediaCapability::SpeechSynthesis)
            }
            _ => CapabilityFamily::Chat,
        }
    }

    /// Stable snake_case identifier, used in logs and error messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            Capability::ImageAnalysis => "image_analysis",
            Capability::ImageGeneration => "image_generation",
            Capability::Transcription => "transcription",
            Capability::SpeechSynthesis => "speech_synthesis",
            Capability::Summarize => "summarize",
            Capability::Translate => "translate",
            Capability::Sentiment => "sentiment",
            Capability::Moderation => "moderation",
            Capability::Simplify => "simplify",
            Capability::EntityExtraction => "entity_extraction",
            Capability::Email => "email",
            Capability::ProductDescription => "product_description",
            Capability::Seo => "seo",
            Capability::CodeGeneration => "code_generation",
            Capability::CodeReview => "code_review",
            Capability::Sql => "sql",
            Capability::Regex => "regex",
            Capability::ApiDocs => "api_docs",
            Capability::Ocr => "ocr",
            Capability::Quiz => "quiz",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<MediaCapability> for Capability {
    fn from(media: MediaCapability) -> Self {
        match media {
            MediaCapability::ImageGeneration => Capability::ImageGeneration,
            MediaCapability::Transcription => Capability::Transcription,
            MediaCapability::SpeechSynthesis => Capability::SpeechSynthesis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_capabilities_map_to_media_family() {
        for media in MediaCapability::ALL {
            assert_eq!(
                Capability::from(media).family(),
                CapabilityFamily::Media(media)
            );
        }
    }

    #[test]
    fn test_vision_and_moderation_are_chat_family() {
        assert_eq!(Capability::ImageAnalysis.family(), CapabilityFamily::Chat);
        assert_eq!(Capability::Ocr.family(), CapabilityFamily::Chat);
        assert_eq!(Capability::Moderation.family(), CapabilityFamily::Chat);
    }

    #[test]
    fn test_seventeen_chat_capabilities() {
        let chat = Capability::ALL
            .iter()
            .filter(|c| c.family() == CapabilityFamily::Chat)
            .count();
        assert_eq!(chat, 17);
    }

    #[test]
    fn test_display_matches_serde_name() {
        for cap in Capability::ALL {
            let json = serde_json::to_string(&cap).unwrap();
            assert_eq!(json, format!("\"{cap}\""));
        }
    }
}
