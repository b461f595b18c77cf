//! Instruction templates
//!
//! Plain functions producing the system instruction for each chat capability.
//! Structured capabilities describe the JSON object the normalizer expects.

use crate::types::{
    ApiDocsOptions, CodeGenerationOptions, CodeReviewOptions, Difficulty, DocFormat, EmailOptions,
    EntityOptions, ImageAnalysisOptions, ModerationOptions, OcrOptions, ProductDescriptionOptions,
    QuizOptions, ReadingLevel, RegexOptions, ReviewFocus, ReviewSeverity, SeoOptions, SqlOptions,
    SummaryLength, TranslateOptions,
};

const JSON_ONLY: &str = "Respond with a single JSON object and nothing else.";

pub fn image_analysis(options: &ImageAnalysisOptions) -> String {
    match options.question.as_deref().map(str::trim) {
        Some(question) if !question.is_empty() => question.to_string(),
        _ => "Describe this image in detail: the main subjects, setting, notable text and overall mood."
            .to_string(),
    }
}

pub fn ocr(options: &OcrOptions) -> String {
    let mut prompt = String::from(
        "Extract all text visible in this image. Return JSON with fields \
         \"text\" (string, the extracted text) and \"confidence\" (number between 0 and 1).",
    );
    if let Some(language) = &options.language {
        prompt.push_str(&format!(" The text is expected to be in {language}."));
    }
    if options.preserve_layout {
        prompt.push_str(" Preserve line breaks and layout.");
    }
    prompt.push(' ');
    prompt.push_str(JSON_ONLY);
    prompt
}

pub fn summarize(length: SummaryLength) -> String {
    let target = match length {
        SummaryLength::Short => "in one or two sentences",
        SummaryLength::Medium => "in one concise paragraph",
        SummaryLength::Long => "in several paragraphs covering every key point",
    };
    format!("Summarize the user's text {target}. Reply with the summary only.")
}

pub fn translate(options: &TranslateOptions) -> String {
    let source = options
        .source_language
        .as_deref()
        .map(|s| format!("from {s} "))
        .unwrap_or_default();
    let formatting = if options.preserve_formatting {
        " Preserve the original formatting, line breaks and markup."
    } else {
        ""
    };
    format!(
        "Translate the user's text {source}into {}.{formatting} Return JSON with fields \
         \"translation\" (string) and \"confidence\" (number between 0 and 1){}. {JSON_ONLY}",
        options.target_language,
        if options.source_language.is_none() {
            " and \"detectedLanguage\" (ISO code of the source language)"
        } else {
            ""
        }
    )
}

pub fn sentiment() -> String {
    format!(
        "Analyze the sentiment of the user's text. Return JSON with fields \"sentiment\" \
         (one of \"positive\", \"negative\", \"neutral\"), \"score\" (number between 0 and 1, \
         the strength of the sentiment) and \"emotions\" (array of strings). {JSON_ONLY}"
    )
}

pub fn moderation(options: &ModerationOptions) -> String {
    let scope = options
        .categories
        .as_ref()
        .filter(|c| !c.is_empty())
        .map(|c| format!(" Consider only these categories: {}.", c.join(", ")))
        .unwrap_or_else(|| {
            " Use the categories hate, harassment, self-harm, sexual, violence and illicit.".to_string()
        });
    format!(
        "You are a content moderator. Classify the user's text.{scope} Return JSON with fields \
         \"flagged\" (boolean), \"categories\" (object mapping category to boolean), \
         \"categoryScores\" (object mapping category to a number between 0 and 1) and \
         \"reasoning\" (string). {JSON_ONLY}"
    )
}

pub fn simplify(level: ReadingLevel) -> String {
    format!(
        "Rewrite the user's text so it is easy to read at {} reading level. Keep the meaning. \
         Reply with the rewritten text only.",
        level.describe()
    )
}

pub fn entities(options: &EntityOptions) -> String {
    let types = options
        .types
        .as_ref()
        .filter(|t| !t.is_empty())
        .map(|t| t.join(", "))
        .unwrap_or_else(|| "person, organization, location, date, money, product".to_string());
    format!(
        "Extract named entities of these types from the user's text: {types}. Return JSON with \
         field \"entities\": an array of objects with \"text\" (string), \"type\" (string) and \
         \"position\" (zero-based character offset of the first occurrence). {JSON_ONLY}"
    )
}

pub fn email(options: &EmailOptions) -> String {
    let mut prompt = format!(
        "Write a {} email for the purpose the user describes. Include a subject line.",
        options.tone.as_str()
    );
    if let Some(recipient) = &options.recipient {
        prompt.push_str(&format!(" The recipient is {recipient}."));
    }
    if let Some(sender) = &options.sender {
        prompt.push_str(&format!(" Sign it as {sender}."));
    }
    if !options.key_points.is_empty() {
        prompt.push_str(&format!(" Cover these points: {}.", options.key_points.join("; ")));
    }
    prompt.push_str(" Reply with the email only.");
    prompt
}

pub fn product_description(options: &ProductDescriptionOptions) -> String {
    let mut prompt = String::from("Write a compelling product description for the product the user names.");
    if !options.features.is_empty() {
        prompt.push_str(&format!(" Highlight: {}.", options.features.join(", ")));
    }
    if let Some(audience) = &options.target_audience {
        prompt.push_str(&format!(" The audience is {audience}."));
    }
    if let Some(tone) = &options.tone {
        prompt.push_str(&format!(" Use a {tone} tone."));
    }
    if let Some(max_words) = options.max_words {
        prompt.push_str(&format!(" Use at most {max_words} words."));
    }
    prompt.push_str(" Reply with the description only.");
    prompt
}

pub fn seo(options: &SeoOptions) -> String {
    let keywords = if options.keywords.is_empty() {
        String::new()
    } else {
        format!(" Target keywords: {}.", options.keywords.join(", "))
    };
    let audience = options
        .target_audience
        .as_deref()
        .map(|a| format!(" The audience is {a}."))
        .unwrap_or_default();
    format!(
        "Optimize the user's content for search engines.{keywords}{audience} Return JSON with \
         fields \"optimizedContent\" (string) and \"analysis\" (string describing the changes). \
         {JSON_ONLY}"
    )
}

pub fn code_generation(options: &CodeGenerationOptions) -> String {
    let framework = options
        .framework
        .as_deref()
        .map(|f| format!(" using {f}"))
        .unwrap_or_default();
    let comments = if options.include_comments {
        " Comment non-obvious parts."
    } else {
        " Do not add comments."
    };
    let tests = if options.include_tests {
        " Include unit tests in a \"tests\" field (string)."
    } else {
        ""
    };
    format!(
        "Write {} code{framework} implementing what the user describes.{comments}{tests} Return \
         JSON with fields \"code\" (string) and \"explanation\" (string). {JSON_ONLY}",
        options.language
    )
}

pub fn code_review(options: &CodeReviewOptions) -> String {
    let language = options
        .language
        .as_deref()
        .map(|l| format!(" {l}"))
        .unwrap_or_default();
    let focus = match options.focus {
        ReviewFocus::Security => " Focus on security.",
        ReviewFocus::Performance => " Focus on performance.",
        ReviewFocus::Style => " Focus on style and readability.",
        ReviewFocus::All => "",
    };
    let severity = match options.severity {
        ReviewSeverity::All => "",
        ReviewSeverity::Critical => " Report only critical issues.",
        ReviewSeverity::High => " Report only high and critical issues.",
    };
    format!(
        "Review the user's{language} code.{focus}{severity} Return JSON with fields \"issues\" \
         (array of strings), \"suggestions\" (array of strings) and \"securityConcerns\" (array \
         of strings). {JSON_ONLY}"
    )
}

pub fn sql(options: &SqlOptions) -> String {
    let schema = options
        .schema
        .as_deref()
        .map(|s| format!(" The schema is:\n{s}\n"))
        .unwrap_or_default();
    format!(
        "Write a {} query for the request the user describes.{schema} Return JSON with fields \
         \"query\" (string) and \"explanation\" (string). {JSON_ONLY}",
        options.dialect.as_str()
    )
}

pub fn regex(options: &RegexOptions) -> String {
    let mut prompt = format!(
        "Write a {} regular expression for the pattern the user describes.",
        options.flavor.as_deref().unwrap_or("PCRE-compatible")
    );
    if !options.should_match.is_empty() {
        prompt.push_str(&format!(" It must match: {}.", options.should_match.join(" | ")));
    }
    if !options.should_not_match.is_empty() {
        prompt.push_str(&format!(
            " It must not match: {}.",
            options.should_not_match.join(" | ")
        ));
    }
    prompt.push_str(&format!(
        " Return JSON with fields \"pattern\" (string), \"explanation\" (string), \"flags\" \
         (string, optional) and \"examples\" (array of matching strings). {JSON_ONLY}"
    ));
    prompt
}

pub fn api_docs(options: &ApiDocsOptions) -> String {
    let openapi = match options.format {
        DocFormat::Markdown => "",
        DocFormat::OpenApi => " and \"openapi\" (string, an OpenAPI 3 YAML document)",
    };
    let language = options
        .language
        .as_deref()
        .map(|l| format!(" written in {l}"))
        .unwrap_or_default();
    let examples = if options.include_examples {
        " Include request and response examples."
    } else {
        ""
    };
    format!(
        "Document the API implemented by the user's code{language}.{examples} Return JSON with \
         fields \"documentation\" (Markdown string){openapi}. {JSON_ONLY}"
    )
}

pub fn quiz(options: &QuizOptions) -> String {
    let difficulty = match options.difficulty {
        Difficulty::Easy => "easy",
        Difficulty::Medium => "medium",
        Difficulty::Hard => "hard",
    };
    format!(
        "Create a {difficulty} multiple-choice quiz with {} questions about the user's text, each \
         with {} options. Return JSON with field \"questions\": an array of objects with \
         \"question\" (string), \"options\" (array of strings), \"correctIndex\" (zero-based index \
         into options) and \"explanation\" (string). {JSON_ONLY}",
        options.num_questions, options.options_per_question
    )
}
