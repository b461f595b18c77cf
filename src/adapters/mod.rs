//! Request adapters
//!
//! [`adapt`] turns a [`CapabilityRequest`] into the [`BackendRequest`] shape of
//! the backend the router picked. Adapters are pure: media inputs are already
//! loaded, so nothing here touches the network.

pub mod chat;
pub mod media;
pub mod prompts;

use crate::capability::Capability;
use crate::config::ServiceConfig;
use crate::error::{Result, ServiceError};
use crate::providers::openai_compat::{
    ChatRequest, OpenAiImageRequest, OpenAiSpeechRequest, OpenAiTranscriptionRequest,
};
use crate::providers::replicate::PredictionRequest;
use crate::router::BackendId;
use crate::types::input::LoadedMedia;
use crate::types::{
    ApiDocsOptions, CodeGenerationOptions, CodeReviewOptions, EmailOptions, EntityOptions,
    ImageAnalysisOptions, ImageGenerateOptions, ModerationOptions, OcrOptions,
    ProductDescriptionOptions, QuizOptions, ReadingLevel, RegexOptions, SeoOptions, SpeechOptions,
    SqlOptions, SummaryLength, TranscriptionOptions, TranslateOptions,
};

pub const DEFAULT_OPENROUTER_CHAT_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_OPENAI_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_MODERATION_MODEL: &str = "omni-moderation-latest";
pub const DEFAULT_OPENAI_IMAGE_MODEL: &str = "dall-e-3";
pub const DEFAULT_OPENAI_TTS_MODEL: &str = "tts-1";
pub const DEFAULT_OPENAI_WHISPER_MODEL: &str = "whisper-1";
pub const DEFAULT_REPLICATE_IMAGE_MODEL: &str = "black-forest-labs/flux-schnell";
pub const DEFAULT_REPLICATE_TTS_MODEL: &str = "jaaari/kokoro-82m";
pub const DEFAULT_REPLICATE_WHISPER_MODEL: &str = "openai/whisper";

/// Typed arguments of one capability call, with media already loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum CapabilityRequest {
    AnalyzeImage {
        image: LoadedMedia,
        options: ImageAnalysisOptions,
    },
    GenerateImage {
        prompt: String,
        options: ImageGenerateOptions,
    },
    Transcribe {
        audio: LoadedMedia,
        options: TranscriptionOptions,
    },
    SynthesizeSpeech {
        text: String,
        options: SpeechOptions,
    },
    Summarize {
        text: String,
        length: SummaryLength,
    },
    Translate {
        text: String,
        options: TranslateOptions,
    },
    Sentiment {
        text: String,
    },
    Moderate {
        text: String,
        options: ModerationOptions,
    },
    Simplify {
        text: String,
        level: ReadingLevel,
    },
    ExtractEntities {
        text: String,
        options: EntityOptions,
    },
    Email {
        purpose: String,
        options: EmailOptions,
    },
    ProductDescription {
        product: String,
        options: ProductDescriptionOptions,
    },
    Seo {
        content: String,
        options: SeoOptions,
    },
    GenerateCode {
        description: String,
        options: CodeGenerationOptions,
    },
    ReviewCode {
        code: String,
        options: CodeReviewOptions,
    },
    Sql {
        description: String,
        options: SqlOptions,
    },
    Regex {
        description: String,
        options: RegexOptions,
    },
    ApiDocs {
        code: String,
        options: ApiDocsOptions,
    },
    Ocr {
        image: LoadedMedia,
        options: OcrOptions,
    },
    Quiz {
        text: String,
        options: QuizOptions,
    },
}

impl CapabilityRequest {
    pub fn capability(&self) -> Capability {
        match self {
            CapabilityRequest::AnalyzeImage { .. } => Capability::ImageAnalysis,
            CapabilityRequest::GenerateImage { .. } => Capability::ImageGeneration,
            CapabilityRequest::Transcribe { .. } => Capability::Transcription,
            CapabilityRequest::SynthesizeSpeech { .. } => Capability::SpeechSynthesis,
            CapabilityRequest::Summarize { .. } => Capability::Summarize,
            CapabilityRequest::Translate { .. } => Capability::Translate,
            CapabilityRequest::Sentiment { .. } => Capability::Sentiment,
            CapabilityRequest::Moderate { .. } => Capability::Moderation,
            CapabilityRequest::Simplify { .. } => Capability::Simplify,
            CapabilityRequest::ExtractEntities { .. } => Capability::EntityExtraction,
            CapabilityRequest::Email { .. } => Capability::Email,
            CapabilityRequest::ProductDescription { .. } => Capability::ProductDescription,
            CapabilityRequest::Seo { .. } => Capability::Seo,
            CapabilityRequest::GenerateCode { .. } => Capability::CodeGeneration,
            CapabilityRequest::ReviewCode { .. } => Capability::CodeReview,
            CapabilityRequest::Sql { .. } => Capability::Sql,
            CapabilityRequest::Regex { .. } => Capability::Regex,
            CapabilityRequest::ApiDocs { .. } => Capability::ApiDocs,
            CapabilityRequest::Ocr { .. } => Capability::Ocr,
            CapabilityRequest::Quiz { .. } => Capability::Quiz,
        }
    }
}

/// A request in one backend's native shape.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendRequest {
    Chat(ChatRequest),
    Moderation { input: String, model: String },
    OpenAiImage(OpenAiImageRequest),
    OpenAiTranscription(OpenAiTranscriptionRequest),
    OpenAiSpeech(OpenAiSpeechRequest),
    Prediction(PredictionRequest),
}

impl BackendRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            BackendRequest::Chat(_) => "chat",
            BackendRequest::Moderation { .. } => "moderation",
            BackendRequest::OpenAiImage(_) => "image generation",
            BackendRequest::OpenAiTranscription(_) => "transcription",
            BackendRequest::OpenAiSpeech(_) => "speech",
            BackendRequest::Prediction(_) => "prediction",
        }
    }
}

/// Translate `request` into the shape `backend` expects.
pub fn adapt(request: &CapabilityRequest, backend: BackendId, config: &ServiceConfig) -> Result<BackendRequest> {
    let capability = request.capability();
    let unsupported = || {
        ServiceError::Configuration(format!("{backend} cannot serve {capability}"))
    };

    match request {
        CapabilityRequest::GenerateImage { prompt, options } => match backend {
            BackendId::OpenAi => Ok(media::openai_image(prompt, options, config)),
            BackendId::Replicate => Ok(media::replicate_image(prompt, options, config)),
            BackendId::OpenRouter => Err(unsupported()),
        },
        CapabilityRequest::Transcribe { audio, options } => match backend {
            BackendId::OpenAi => Ok(media::openai_transcription(audio, options, config)),
            BackendId::Replicate => Ok(media::replicate_transcription(audio, options, config)),
            BackendId::OpenRouter => Err(unsupported()),
        },
        CapabilityRequest::SynthesizeSpeech { text, options } => match backend {
            BackendId::OpenAi => Ok(media::openai_speech(text, options, config)),
            BackendId::Replicate => Ok(media::replicate_speech(text, options, config)),
            BackendId::OpenRouter => Err(unsupported()),
        },
        CapabilityRequest::Moderate { text, .. } if backend == BackendId::OpenAi => {
            Ok(BackendRequest::Moderation {
                input: text.clone(),
                model: config
                    .moderation_model
                    .clone()
                    .unwrap_or_else(|| DEFAULT_OPENAI_MODERATION_MODEL.to_string()),
            })
        }
        _ if backend.supports_chat() => chat::chat_request(request, backend, config).map(BackendRequest::Chat),
        _ => Err(unsupported()),
    }
}

/// Chat model for `backend`, honoring the configured override.
pub fn chat_model(config: &ServiceConfig, backend: BackendId) -> String {
    config.chat_model.clone().unwrap_or_else(|| match backend {
        BackendId::OpenRouter => DEFAULT_OPENROUTER_CHAT_MODEL.to_string(),
        _ => DEFAULT_OPENAI_CHAT_MODEL.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn openai_config() -> ServiceConfig {
        ServiceConfig::new().with_openai_api_key("k")
    }

    #[test]
    fn test_moderation_uses_endpoint_on_openai_and_chat_on_openrouter() {
        let request = CapabilityRequest::Moderate {
            text: "hello".into(),
            options: ModerationOptions::default(),
        };
        let config = openai_config();

        match adapt(&request, BackendId::OpenAi, &config).unwrap() {
            BackendRequest::Moderation { input, model } => {
                assert_eq!(input, "hello");
                assert_eq!(model, DEFAULT_OPENAI_MODERATION_MODEL);
            }
            other => panic!("expected moderation endpoint, got {other:?}"),
        }

        match adapt(&request, BackendId::OpenRouter, &config).unwrap() {
            BackendRequest::Chat(chat) => assert!(chat.wants_json()),
            other => panic!("expected chat turn, got {other:?}"),
        }
    }

    #[test]
    fn test_text_capability_refused_on_replicate() {
        let request = CapabilityRequest::Summarize {
            text: "long text".into(),
            length: SummaryLength::Short,
        };
        let err = adapt(&request, BackendId::Replicate, &openai_config()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_media_refused_on_openrouter() {
        let request = CapabilityRequest::GenerateImage {
            prompt: "a fox".into(),
            options: ImageGenerateOptions::default(),
        };
        assert!(adapt(&request, BackendId::OpenRouter, &openai_config()).is_err());
    }

    #[test]
    fn test_chat_model_override_applies_to_both_gateways() {
        let config = ServiceConfig::new().with_chat_model("anthropic/claude-3.5-sonnet");
        assert_eq!(chat_model(&config, BackendId::OpenRouter), "anthropic/claude-3.5-sonnet");
        assert_eq!(chat_model(&config, BackendId::OpenAi), "anthropic/claude-3.5-sonnet");
        assert_eq!(
            chat_model(&ServiceConfig::default(), BackendId::OpenRouter),
            DEFAULT_OPENROUTER_CHAT_MODEL
        );
    }
}
