//! Per-capability options
//!
//! Every option struct implements `Default` and exposes `with_*` setters.
//! Options a backend cannot honor are dropped with a debug log, never an error.

use serde::{Deserialize, Serialize};

/// Vision detail level for image analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    Low,
    High,
    Auto,
}

impl ImageDetail {
    pub const fn as_str(self) -> &'static str {
        match self {
            ImageDetail::Low => "low",
            ImageDetail::High => "high",
            ImageDetail::Auto => "auto",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageAnalysisOptions {
    /// Question to answer about the image; a general description otherwise
    pub question: Option<String>,
    pub detail: Option<ImageDetail>,
    pub max_tokens: Option<u32>,
}

impl ImageAnalysisOptions {
    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }

    pub fn with_detail(mut self, detail: ImageDetail) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Output size for image generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageSize {
    #[serde(rename = "256x256")]
    Square256,
    #[serde(rename = "512x512")]
    Square512,
    #[default]
    #[serde(rename = "1024x1024")]
    Square1024,
    #[serde(rename = "1792x1024")]
    Landscape,
    #[serde(rename = "1024x1792")]
    Portrait,
}

impl ImageSize {
    pub const fn as_str(self) -> &'static str {
        match self {
            ImageSize::Square256 => "256x256",
            ImageSize::Square512 => "512x512",
            ImageSize::Square1024 => "1024x1024",
            ImageSize::Landscape => "1792x1024",
            ImageSize::Portrait => "1024x1792",
        }
    }

    /// Closest aspect ratio accepted by prediction image models.
    pub const fn aspect_ratio(self) -> &'static str {
        match self {
            ImageSize::Square256 | ImageSize::Square512 | ImageSize::Square1024 => "1:1",
            ImageSize::Landscape => "16:9",
            ImageSize::Portrait => "9:16",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    Standard,
    Hd,
}

impl ImageQuality {
    pub const fn as_str(self) -> &'static str {
        match self {
            ImageQuality::Standard => "standard",
            ImageQuality::Hd => "hd",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStyle {
    Vivid,
    Natural,
}

impl ImageStyle {
    pub const fn as_str(self) -> &'static str {
        match self {
            ImageStyle::Vivid => "vivid",
            ImageStyle::Natural => "natural",
        }
    }
}

/// How a generated image is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageResponseFormat {
    #[default]
    Url,
    B64Json,
}

impl ImageResponseFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            ImageResponseFormat::Url => "url",
            ImageResponseFormat::B64Json => "b64_json",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageGenerateOptions {
    pub size: ImageSize,
    pub quality: Option<ImageQuality>,
    pub style: Option<ImageStyle>,
    pub response_format: ImageResponseFormat,
}

impl ImageGenerateOptions {
    pub fn with_size(mut self, size: ImageSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_quality(mut self, quality: ImageQuality) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_style(mut self, style: ImageStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_response_format(mut self, format: ImageResponseFormat) -> Self {
        self.response_format = format;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptionOptions {
    /// ISO-639-1 language hint
    pub language: Option<String>,
    /// Text to guide the model's style or vocabulary
    pub prompt: Option<String>,
    pub temperature: Option<f32>,
}

impl TranscriptionOptions {
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Speech voice. Named voices follow the OpenAI catalog; `Custom` passes a
/// backend-specific voice id through.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Voice {
    #[default]
    Alloy,
    Echo,
    Fable,
    Onyx,
    Nova,
    Shimmer,
    Custom(String),
}

impl Voice {
    pub fn as_str(&self) -> &str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Echo => "echo",
            Voice::Fable => "fable",
            Voice::Onyx => "onyx",
            Voice::Nova => "nova",
            Voice::Shimmer => "shimmer",
            Voice::Custom(id) => id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechFormat {
    #[default]
    Mp3,
    Opus,
    Aac,
    Flac,
    Wav,
}

impl SpeechFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            SpeechFormat::Mp3 => "mp3",
            SpeechFormat::Opus => "opus",
            SpeechFormat::Aac => "aac",
            SpeechFormat::Flac => "flac",
            SpeechFormat::Wav => "wav",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeechOptions {
    pub voice: Voice,
    /// Playback speed, 0.25 to 4.0
    pub speed: Option<f32>,
    pub format: SpeechFormat,
}

impl SpeechOptions {
    pub fn with_voice(mut self, voice: Voice) -> Self {
        self.voice = voice;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_format(mut self, format: SpeechFormat) -> Self {
        self.format = format;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Long,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranslateOptions {
    pub target_language: String,
    /// Detected by the model when absent
    pub source_language: Option<String>,
    pub preserve_formatting: bool,
}

impl TranslateOptions {
    pub fn new(target_language: impl Into<String>) -> Self {
        Self {
            target_language: target_language.into(),
            ..Default::default()
        }
    }

    pub fn with_source_language(mut self, language: impl Into<String>) -> Self {
        self.source_language = Some(language.into());
        self
    }

    pub fn with_preserve_formatting(mut self, preserve: bool) -> Self {
        self.preserve_formatting = preserve;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModerationOptions {
    /// Report only these categories
    pub categories: Option<Vec<String>>,
    /// Flag a category when its score reaches this value
    pub threshold: Option<f64>,
}

impl ModerationOptions {
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingLevel {
    Elementary,
    #[default]
    MiddleSchool,
    HighSchool,
}

impl ReadingLevel {
    pub const fn describe(self) -> &'static str {
        match self {
            ReadingLevel::Elementary => "an elementary school",
            ReadingLevel::MiddleSchool => "a middle school",
            ReadingLevel::HighSchool => "a high school",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityOptions {
    /// Restrict extraction to these entity types (e.g. `person`, `organization`)
    pub types: Option<Vec<String>>,
}

impl EntityOptions {
    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = Some(types.into_iter().map(Into::into).collect());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailTone {
    #[default]
    Professional,
    Friendly,
    Formal,
    Persuasive,
    Apologetic,
}

impl EmailTone {
    pub const fn as_str(self) -> &'static str {
        match self {
            EmailTone::Professional => "professional",
            EmailTone::Friendly => "friendly",
            EmailTone::Formal => "formal",
            EmailTone::Persuasive => "persuasive",
            EmailTone::Apologetic => "apologetic",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailOptions {
    pub tone: EmailTone,
    pub recipient: Option<String>,
    pub sender: Option<String>,
    pub key_points: Vec<String>,
}

impl EmailOptions {
    pub fn with_tone(mut self, tone: EmailTone) -> Self {
        self.tone = tone;
        self
    }

    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    pub fn with_key_point(mut self, point: impl Into<String>) -> Self {
        self.key_points.push(point.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDescriptionOptions {
    pub features: Vec<String>,
    pub target_audience: Option<String>,
    pub tone: Option<String>,
    pub max_words: Option<u32>,
}

impl ProductDescriptionOptions {
    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.push(feature.into());
        self
    }

    pub fn with_target_audience(mut self, audience: impl Into<String>) -> Self {
        self.target_audience = Some(audience.into());
        self
    }

    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = Some(tone.into());
        self
    }

    pub fn with_max_words(mut self, max_words: u32) -> Self {
        self.max_words = Some(max_words);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeoOptions {
    pub keywords: Vec<String>,
    pub target_audience: Option<String>,
}

impl SeoOptions {
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_target_audience(mut self, audience: impl Into<String>) -> Self {
        self.target_audience = Some(audience.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeGenerationOptions {
    pub language: String,
    pub framework: Option<String>,
    pub include_comments: bool,
    pub include_tests: bool,
}

impl Default for CodeGenerationOptions {
    fn default() -> Self {
        Self {
            language: "python".to_string(),
            framework: None,
            include_comments: true,
            include_tests: false,
        }
    }
}

impl CodeGenerationOptions {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            ..Default::default()
        }
    }

    pub fn with_framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = Some(framework.into());
        self
    }

    pub fn with_comments(mut self, include: bool) -> Self {
        self.include_comments = include;
        self
    }

    pub fn with_tests(mut self, include: bool) -> Self {
        self.include_tests = include;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewFocus {
    Security,
    Performance,
    Style,
    #[default]
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewSeverity {
    #[default]
    All,
    Critical,
    High,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeReviewOptions {
    pub language: Option<String>,
    pub focus: ReviewFocus,
    pub severity: ReviewSeverity,
}

impl CodeReviewOptions {
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_focus(mut self, focus: ReviewFocus) -> Self {
        self.focus = focus;
        self
    }

    pub fn with_severity(mut self, severity: ReviewSeverity) -> Self {
        self.severity = severity;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    #[default]
    Postgres,
    Mysql,
    Sqlite,
    Mssql,
}

impl SqlDialect {
    pub const fn as_str(self) -> &'static str {
        match self {
            SqlDialect::Postgres => "PostgreSQL",
            SqlDialect::Mysql => "MySQL",
            SqlDialect::Sqlite => "SQLite",
            SqlDialect::Mssql => "SQL Server",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlOptions {
    pub dialect: SqlDialect,
    /// DDL or a prose description of the tables involved
    pub schema: Option<String>,
}

impl SqlOptions {
    pub fn with_dialect(mut self, dialect: SqlDialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegexOptions {
    /// Regex flavor, e.g. `rust`, `pcre`, `javascript`
    pub flavor: Option<String>,
    pub should_match: Vec<String>,
    pub should_not_match: Vec<String>,
}

impl RegexOptions {
    pub fn with_flavor(mut self, flavor: impl Into<String>) -> Self {
        self.flavor = Some(flavor.into());
        self
    }

    pub fn with_match(mut self, example: impl Into<String>) -> Self {
        self.should_match.push(example.into());
        self
    }

    pub fn with_non_match(mut self, example: impl Into<String>) -> Self {
        self.should_not_match.push(example.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocFormat {
    #[default]
    Markdown,
    OpenApi,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiDocsOptions {
    pub format: DocFormat,
    pub language: Option<String>,
    pub include_examples: bool,
}

impl ApiDocsOptions {
    pub fn with_format(mut self, format: DocFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_examples(mut self, include: bool) -> Self {
        self.include_examples = include;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OcrOptions {
    /// Expected language of the text in the image
    pub language: Option<String>,
    pub preserve_layout: bool,
}

impl OcrOptions {
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_preserve_layout(mut self, preserve: bool) -> Self {
        self.preserve_layout = preserve;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOptions {
    pub num_questions: u32,
    pub difficulty: Difficulty,
    pub options_per_question: u32,
}

impl Default for QuizOptions {
    fn default() -> Self {
        Self {
            num_questions: 5,
            difficulty: Difficulty::Medium,
            options_per_question: 4,
        }
    }
}

impl QuizOptions {
    pub fn with_num_questions(mut self, n: u32) -> Self {
        self.num_questions = n;
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_options_per_question(mut self, n: u32) -> Self {
        self.options_per_question = n;
        self
    }
}
