//! The `AiService` facade
//!
//! Every capability call follows the same path: the router picks a backend,
//! an adapter shapes the request, the client executes it (polling jobs to
//! completion) and a normalizer produces the fixed result. The service holds no
//! mutable state after construction and can be shared across tasks.

use crate::adapters::{self, CapabilityRequest};
use crate::capability::Capability;
use crate::config::{ServiceConfig, present};
use crate::error::{Result, ServiceError};
use crate::normalize;
use crate::providers::{self, BackendHandle, OpenAiCompatClient, RawProviderResponse, ReplicateClient};
use crate::retry::with_retry;
use crate::router::{BackendId, ProviderSelection};
use crate::types::input::LoadedMedia;
use crate::types::*;
use crate::utils::http::build_http_client;

/// Unified entry point for every AI capability.
///
/// ```rust,ignore
/// let service = AiService::new(ServiceConfig::new().with_openai_api_key("sk-..."))?;
/// let result = service
///     .translate_text("Hola", TranslateOptions::new("en").with_source_language("es"))
///     .await?;
/// println!("{} ({})", result.translation, result.confidence);
/// ```
#[derive(Debug)]
pub struct AiService {
    config: ServiceConfig,
    selection: ProviderSelection,
    http: reqwest::Client,
    openrouter: Option<OpenAiCompatClient>,
    openai: Option<OpenAiCompatClient>,
    replicate: Option<ReplicateClient>,
}

impl AiService {
    /// Build a service from `config`.
    ///
    /// Missing credentials are not an error here; they surface as
    /// [`ServiceError::Configuration`] on the first call that needs them.
    /// Invalid HTTP settings or header values fail immediately.
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let http = build_http_client(&config.http)?;

        let openrouter = present(&config.openrouter_api_key)
            .map(|key| {
                OpenAiCompatClient::openrouter(
                    http.clone(),
                    config.openrouter_base_url(),
                    key.clone(),
                    config.openrouter_referer.clone(),
                    config.openrouter_title.clone(),
                )
            })
            .transpose()?;
        let openai = present(&config.openai_api_key)
            .map(|key| OpenAiCompatClient::openai(http.clone(), config.openai_base_url(), key.clone()));
        let replicate = present(&config.replicate_api_token)
            .map(|token| ReplicateClient::new(http.clone(), config.replicate_base_url(), token.clone()));

        let selection = ProviderSelection::from_config(&config);
        Ok(Self {
            config,
            selection,
            http,
            openrouter,
            openai,
            replicate,
        })
    }

    /// Build a service from environment variables (see [`ServiceConfig::from_env`]).
    pub fn from_env() -> Result<Self> {
        Self::new(ServiceConfig::from_env())
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The routing table computed at construction.
    pub fn selection(&self) -> &ProviderSelection {
        &self.selection
    }

    /// The backend that serves `capability`, or the configuration error a call would raise.
    pub fn backend_for(&self, capability: Capability) -> Result<BackendId> {
        self.selection.select(capability)
    }

    fn handle(&self, backend: BackendId) -> Result<BackendHandle<'_>> {
        let missing = || ServiceError::Configuration(format!("{backend} is not configured"));
        Ok(match backend {
            BackendId::OpenRouter => BackendHandle::OpenRouter(self.openrouter.as_ref().ok_or_else(missing)?),
            BackendId::OpenAi => BackendHandle::OpenAi(self.openai.as_ref().ok_or_else(missing)?),
            BackendId::Replicate => BackendHandle::Replicate(self.replicate.as_ref().ok_or_else(missing)?),
        })
    }

    fn check_text(&self, text: &str, what: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(ServiceError::InvalidInput(format!("{what} is empty")));
        }
        let chars = text.chars().count();
        let limit = self.config.limits.max_text_chars;
        if chars > limit {
            return Err(ServiceError::InvalidInput(format!(
                "{what} is {chars} characters, limit is {limit}"
            )));
        }
        Ok(())
    }

    async fn load_image(&self, image: ImageInput) -> Result<LoadedMedia> {
        image.load(&self.http, self.config.limits.max_image_bytes).await
    }

    /// Adapt, execute and settle `request` on `backend`.
    async fn dispatch(&self, backend: BackendId, request: CapabilityRequest) -> Result<(BackendHandle<'_>, RawProviderResponse)> {
        let capability = request.capability();
        let handle = self.handle(backend)?;
        let backend_request = adapters::adapt(&request, backend, &self.config)?;
        tracing::debug!(
            capability = %capability,
            backend = %backend,
            kind = backend_request.kind(),
            "Dispatching capability call"
        );

        let backend_request = &backend_request;
        let raw = with_retry(self.config.retry_policy.as_ref(), move || {
            providers::execute(handle, capability, backend_request)
        })
        .await
        .inspect_err(|e| tracing::warn!("{} call on {} failed: {}", capability, backend, e))?;

        let raw = providers::settle(handle, raw, &self.config.poll_policy).await?;
        Ok((handle, raw))
    }

    /// Select, validate `text`, dispatch.
    async fn text_call(&self, capability: Capability, text: &str, request: CapabilityRequest) -> Result<RawProviderResponse> {
        let backend = self.backend_for(capability)?;
        self.check_text(text, "input text")?;
        self.dispatch(backend, request).await.map(|(_, raw)| raw)
    }

    // ---------------------------------------------------------------------
    // Vision
    // ---------------------------------------------------------------------

    /// Describe an image or answer a question about it.
    pub async fn analyze_image(&self, image: impl Into<ImageInput>, options: ImageAnalysisOptions) -> Result<String> {
        let backend = self.backend_for(Capability::ImageAnalysis)?;
        let image = self.load_image(image.into()).await?;
        let (_, raw) = self
            .dispatch(backend, CapabilityRequest::AnalyzeImage { image, options })
            .await?;
        normalize::free_text(raw, Capability::ImageAnalysis)
    }

    /// Extract the text visible in an image.
    pub async fn extract_text_from_image(&self, image: impl Into<ImageInput>, options: OcrOptions) -> Result<OcrResult> {
        let backend = self.backend_for(Capability::Ocr)?;
        let image = self.load_image(image.into()).await?;
        let (_, raw) = self
            .dispatch(backend, CapabilityRequest::Ocr { image, options })
            .await?;
        normalize::ocr(raw)
    }

    // ---------------------------------------------------------------------
    // Media
    // ---------------------------------------------------------------------

    pub async fn generate_image(&self, prompt: &str, options: ImageGenerateOptions) -> Result<ImageGenerateResult> {
        let backend = self.backend_for(Capability::ImageGeneration)?;
        self.check_text(prompt, "prompt")?;
        let request = CapabilityRequest::GenerateImage {
            prompt: prompt.to_string(),
            options,
        };
        let (_, raw) = self.dispatch(backend, request).await?;
        normalize::image_generation(raw)
    }

    /// Transcribe audio. The input is read in full before submission.
    pub async fn transcribe_audio(&self, audio: impl Into<AudioInput>, options: TranscriptionOptions) -> Result<TranscriptionResult> {
        let backend = self.backend_for(Capability::Transcription)?;
        let audio = audio
            .into()
            .load(&self.http, self.config.limits.max_audio_bytes)
            .await?;
        let (_, raw) = self
            .dispatch(backend, CapabilityRequest::Transcribe { audio, options })
            .await?;
        normalize::transcription(raw)
    }

    /// Synthesize speech and return the encoded audio.
    pub async fn synthesize_speech(&self, text: &str, options: SpeechOptions) -> Result<Vec<u8>> {
        let backend = self.backend_for(Capability::SpeechSynthesis)?;
        self.check_text(text, "speech text")?;
        let request = CapabilityRequest::SynthesizeSpeech {
            text: text.to_string(),
            options,
        };
        let (handle, raw) = self.dispatch(backend, request).await?;

        let raw = match (handle, raw) {
            (BackendHandle::Replicate(client), RawProviderResponse::Structured(record)) => {
                let url = normalize::speech_output_url(&record)?;
                let url = url.as_str();
                let limit = self.config.limits.max_audio_bytes;
                with_retry(self.config.retry_policy.as_ref(), move || {
                    client.download(url, limit, Capability::SpeechSynthesis)
                })
                .await
                .map(RawProviderResponse::Binary)?
            }
            (_, raw) => raw,
        };
        normalize::speech(raw)
    }

    // ---------------------------------------------------------------------
    // Free-text transforms
    // ---------------------------------------------------------------------

    pub async fn summarize_text(&self, text: &str, length: SummaryLength) -> Result<String> {
        let request = CapabilityRequest::Summarize {
            text: text.to_string(),
            length,
        };
        let raw = self.text_call(Capability::Summarize, text, request).await?;
        normalize::free_text(raw, Capability::Summarize)
    }

    pub async fn simplify_text(&self, text: &str, level: ReadingLevel) -> Result<String> {
        let request = CapabilityRequest::Simplify {
            text: text.to_string(),
            level,
        };
        let raw = self.text_call(Capability::Simplify, text, request).await?;
        normalize::free_text(raw, Capability::Simplify)
    }

    /// Write an email for `purpose`; returns the email text including its subject line.
    pub async fn generate_email(&self, purpose: &str, options: EmailOptions) -> Result<String> {
        let request = CapabilityRequest::Email {
            purpose: purpose.to_string(),
            options,
        };
        let raw = self.text_call(Capability::Email, purpose, request).await?;
        normalize::free_text(raw, Capability::Email)
    }

    pub async fn generate_product_description(&self, product: &str, options: ProductDescriptionOptions) -> Result<String> {
        let request = CapabilityRequest::ProductDescription {
            product: product.to_string(),
            options,
        };
        let raw = self
            .text_call(Capability::ProductDescription, product, request)
            .await?;
        normalize::free_text(raw, Capability::ProductDescription)
    }

    // ---------------------------------------------------------------------
    // Structured transforms
    // ---------------------------------------------------------------------

    pub async fn translate_text(&self, text: &str, options: TranslateOptions) -> Result<TranslationResult> {
        if options.target_language.trim().is_empty() {
            self.backend_for(Capability::Translate)?;
            return Err(ServiceError::InvalidInput("target language is required".to_string()));
        }
        let request = CapabilityRequest::Translate {
            text: text.to_string(),
            options,
        };
        let raw = self.text_call(Capability::Translate, text, request).await?;
        normalize::translation(raw)
    }

    pub async fn analyze_sentiment(&self, text: &str) -> Result<SentimentResult> {
        let request = CapabilityRequest::Sentiment {
            text: text.to_string(),
        };
        let raw = self.text_call(Capability::Sentiment, text, request).await?;
        normalize::sentiment(raw)
    }

    /// Classify content against moderation categories.
    ///
    /// `options.categories` narrows the reported categories and
    /// `options.threshold` recomputes flags from scores.
    pub async fn moderate_content(&self, text: &str, options: ModerationOptions) -> Result<ModerationResult> {
        if let Some(threshold) = options.threshold
            && !(0.0..=1.0).contains(&threshold)
        {
            self.backend_for(Capability::Moderation)?;
            return Err(ServiceError::InvalidInput(format!(
                "moderation threshold {threshold} is outside [0, 1]"
            )));
        }
        let request = CapabilityRequest::Moderate {
            text: text.to_string(),
            options: options.clone(),
        };
        let raw = self.text_call(Capability::Moderation, text, request).await?;
        normalize::moderation(raw, &options)
    }

    pub async fn extract_entities(&self, text: &str, options: EntityOptions) -> Result<EntityResult> {
        let request = CapabilityRequest::ExtractEntities {
            text: text.to_string(),
            options,
        };
        let raw = self
            .text_call(Capability::EntityExtraction, text, request)
            .await?;
        normalize::entities(raw)
    }

    pub async fn optimize_seo(&self, content: &str, options: SeoOptions) -> Result<SeoResult> {
        let request = CapabilityRequest::Seo {
            content: content.to_string(),
            options,
        };
        let raw = self.text_call(Capability::Seo, content, request).await?;
        normalize::seo(raw)
    }

    pub async fn generate_code(&self, description: &str, options: CodeGenerationOptions) -> Result<CodeGenerationResult> {
        let request = CapabilityRequest::GenerateCode {
            description: description.to_string(),
            options,
        };
        let raw = self
            .text_call(Capability::CodeGeneration, description, request)
            .await?;
        normalize::code_generation(raw)
    }

    pub async fn review_code(&self, code: &str, options: CodeReviewOptions) -> Result<CodeReviewResult> {
        let request = CapabilityRequest::ReviewCode {
            code: code.to_string(),
            options,
        };
        let raw = self.text_call(Capability::CodeReview, code, request).await?;
        normalize::code_review(raw)
    }

    pub async fn generate_sql(&self, description: &str, options: SqlOptions) -> Result<SqlResult> {
        let request = CapabilityRequest::Sql {
            description: description.to_string(),
            options,
        };
        let raw = self.text_call(Capability::Sql, description, request).await?;
        normalize::sql(raw)
    }

    pub async fn generate_regex(&self, description: &str, options: RegexOptions) -> Result<RegexResult> {
        let request = CapabilityRequest::Regex {
            description: description.to_string(),
            options,
        };
        let raw = self.text_call(Capability::Regex, description, request).await?;
        normalize::regex(raw)
    }

    pub async fn generate_api_docs(&self, code: &str, options: ApiDocsOptions) -> Result<ApiDocsResult> {
        let request = CapabilityRequest::ApiDocs {
            code: code.to_string(),
            options,
        };
        let raw = self.text_call(Capability::ApiDocs, code, request).await?;
        normalize::api_docs(raw)
    }

    pub async fn generate_quiz(&self, text: &str, options: QuizOptions) -> Result<QuizResult> {
        if options.num_questions == 0 || options.options_per_question < 2 {
            self.backend_for(Capability::Quiz)?;
            return Err(ServiceError::InvalidInput(
                "a quiz needs at least one question and two options".to_string(),
            ));
        }
        let request = CapabilityRequest::Quiz {
            text: text.to_string(),
            options,
        };
        let raw = self.text_call(Capability::Quiz, text, request).await?;
        normalize::quiz(raw)
    }
}
