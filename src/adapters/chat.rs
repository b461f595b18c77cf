//! Chat-turn adapters for text, vision and chat-based moderation.

use super::{CapabilityRequest, chat_model, prompts};
use crate::config::ServiceConfig;
use crate::error::{Result, ServiceError};
use crate::providers::openai_compat::{ChatMessage, ChatRequest, ResponseFormat};
use crate::router::BackendId;

/// Build the single chat turn serving `request`.
pub fn chat_request(request: &CapabilityRequest, backend: BackendId, config: &ServiceConfig) -> Result<ChatRequest> {
    let (instruction, user, structured) = match request {
        CapabilityRequest::AnalyzeImage { image, options } => {
            let message = ChatMessage::user_with_image(
                prompts::image_analysis(options),
                image.to_data_uri(),
                options.detail.map(|d| d.as_str()),
            );
            return Ok(ChatRequest {
                model: chat_model(config, backend),
                messages: vec![message],
                temperature: None,
                max_tokens: options.max_tokens,
                response_format: None,
            });
        }
        CapabilityRequest::Ocr { image, options } => {
            let message = ChatMessage::user_with_image(prompts::ocr(options), image.to_data_uri(), Some("high"));
            return Ok(ChatRequest {
                model: chat_model(config, backend),
                messages: vec![message],
                temperature: Some(0.0),
                max_tokens: None,
                response_format: Some(json_object()),
            });
        }
        CapabilityRequest::Moderate { text, options } => {
            let model = config
                .moderation_model
                .clone()
                .unwrap_or_else(|| chat_model(config, backend));
            return Ok(ChatRequest {
                model,
                messages: vec![
                    ChatMessage::system(prompts::moderation(options)),
                    ChatMessage::user(text.clone()),
                ],
                temperature: Some(0.0),
                max_tokens: None,
                response_format: Some(json_object()),
            });
        }
        CapabilityRequest::Summarize { text, length } => (prompts::summarize(*length), text, false),
        CapabilityRequest::Translate { text, options } => (prompts::translate(options), text, true),
        CapabilityRequest::Sentiment { text } => (prompts::sentiment(), text, true),
        CapabilityRequest::Simplify { text, level } => (prompts::simplify(*level), text, false),
        CapabilityRequest::ExtractEntities { text, options } => (prompts::entities(options), text, true),
        CapabilityRequest::Email { purpose, options } => (prompts::email(options), purpose, false),
        CapabilityRequest::ProductDescription { product, options } => {
            (prompts::product_description(options), product, false)
        }
        CapabilityRequest::Seo { content, options } => (prompts::seo(options), content, true),
        CapabilityRequest::GenerateCode {
            description,
            options,
        } => (prompts::code_generation(options), description, true),
        CapabilityRequest::ReviewCode { code, options } => (prompts::code_review(options), code, true),
        CapabilityRequest::Sql {
            description,
            options,
        } => (prompts::sql(options), description, true),
        CapabilityRequest::Regex {
            description,
            options,
        } => (prompts::regex(options), description, true),
        CapabilityRequest::ApiDocs { code, options } => (prompts::api_docs(options), code, true),
        CapabilityRequest::Quiz { text, options } => (prompts::quiz(options), text, true),
        CapabilityRequest::GenerateImage { .. }
        | CapabilityRequest::Transcribe { .. }
        | CapabilityRequest::SynthesizeSpeech { .. } => {
            return Err(ServiceError::Configuration(format!(
                "{} is not a chat capability",
                request.capability()
            )));
        }
    };

    Ok(ChatRequest {
        model: chat_model(config, backend),
        messages: vec![ChatMessage::system(instruction), ChatMessage::user(user.clone())],
        temperature: if structured { Some(0.2) } else { Some(0.7) },
        max_tokens: None,
        response_format: structured.then(json_object),
    })
}

fn json_object() -> ResponseFormat {
    ResponseFormat { kind: "json_object" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::openai_compat::{ContentPart, MessageContent, Role};
    use crate::types::input::LoadedMedia;
    use crate::types::{
        ApiDocsOptions, DocFormat, ImageAnalysisOptions, ImageDetail, SummaryLength,
        TranslateOptions,
    };

    fn config() -> ServiceConfig {
        ServiceConfig::new().with_openrouter_api_key("k")
    }

    #[test]
    fn test_free_text_capability_has_no_response_format() {
        let request = CapabilityRequest::Summarize {
            text: "Rust is a systems language.".into(),
            length: SummaryLength::Short,
        };
        let chat = chat_request(&request, BackendId::OpenRouter, &config()).unwrap();
        assert_eq!(chat.model, "openai/gpt-4o-mini");
        assert!(!chat.wants_json());
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[0].role, Role::System);
        assert_eq!(
            chat.messages[1].content,
            MessageContent::Text("Rust is a systems language.".into())
        );
    }

    #[test]
    fn test_structured_capability_requests_json() {
        let request = CapabilityRequest::Translate {
            text: "Hola".into(),
            options: TranslateOptions::new("en").with_source_language("es"),
        };
        let chat = chat_request(&request, BackendId::OpenAi, &config()).unwrap();
        assert_eq!(chat.model, "gpt-4o-mini");
        assert!(chat.wants_json());
    }

    #[test]
    fn test_api_docs_asks_for_openapi_only_when_requested() {
        let system_prompt = |format| {
            let request = CapabilityRequest::ApiDocs {
                code: "fn health() {}".into(),
                options: ApiDocsOptions::default().with_format(format),
            };
            let chat = chat_request(&request, BackendId::OpenAi, &config()).unwrap();
            match &chat.messages[0].content {
                MessageContent::Text(text) => text.clone(),
                other => panic!("unexpected content {other:?}"),
            }
        };
        assert!(!system_prompt(DocFormat::Markdown).contains("\"openapi\""));
        assert!(system_prompt(DocFormat::OpenApi).contains("\"openapi\""));
    }

    #[test]
    fn test_image_analysis_attaches_data_uri() {
        let request = CapabilityRequest::AnalyzeImage {
            image: LoadedMedia {
                bytes: vec![1, 2, 3],
                mime: "image/png".into(),
            },
            options: ImageAnalysisOptions::default()
                .with_question("How many cats?")
                .with_detail(ImageDetail::Low),
        };
        let chat = chat_request(&request, BackendId::OpenRouter, &config()).unwrap();
        let MessageContent::Parts(parts) = &chat.messages[0].content else {
            panic!("expected multipart content");
        };
        assert_eq!(
            parts[0],
            ContentPart::Text {
                text: "How many cats?".into()
            }
        );
        match &parts[1] {
            ContentPart::ImageUrl { image_url } => {
                assert_eq!(image_url.url, "data:image/png;base64,AQID");
                assert_eq!(image_url.detail.as_deref(), Some("low"));
            }
            other => panic!("expected image part, got {other:?}"),
        }
    }

    #[test]
    fn test_moderation_prefers_moderation_model_override() {
        let request = CapabilityRequest::Moderate {
            text: "text".into(),
            options: Default::default(),
        };
        let config = config().with_moderation_model("meta-llama/llama-guard-3-8b");
        let chat = chat_request(&request, BackendId::OpenRouter, &config).unwrap();
        assert_eq!(chat.model, "meta-llama/llama-guard-3-8b");
    }
}
