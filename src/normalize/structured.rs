//! Normalizers for structured chat capabilities.

use serde::Deserialize;
use std::collections::BTreeMap;

use super::{decode, non_empty, parse, structured_object, unit_interval};
use crate::capability::Capability;
use crate::error::{Result, ServiceError};
use crate::providers::RawProviderResponse;
use crate::types::{
    ApiDocsResult, CodeGenerationResult, CodeReviewResult, EntityResult, ModerationOptions,
    ModerationResult, OcrResult, QuizResult, RegexResult, SentimentLabel, SentimentResult,
    SeoResult, SqlResult, TranslationResult,
};

pub fn translation(raw: RawProviderResponse) -> Result<TranslationResult> {
    let cap = Capability::Translate;
    let mut result: TranslationResult = parse(raw, cap)?;
    non_empty(&result.translation, "translation", cap)?;
    result.confidence = unit_interval(result.confidence, "confidence", cap)?;
    Ok(result)
}

#[derive(Deserialize)]
struct SentimentWire {
    sentiment: String,
    score: f64,
    #[serde(default)]
    emotions: Vec<String>,
}

pub fn sentiment(raw: RawProviderResponse) -> Result<SentimentResult> {
    let cap = Capability::Sentiment;
    let wire: SentimentWire = parse(raw, cap)?;
    let sentiment = SentimentLabel::parse(&wire.sentiment).ok_or_else(|| {
        ServiceError::malformed(cap, format!("unknown sentiment label '{}'", wire.sentiment))
    })?;
    Ok(SentimentResult {
        sentiment,
        score: unit_interval(wire.score, "score", cap)?,
        emotions: wire.emotions,
    })
}

/// Normalize a moderation payload and apply the caller's category filter and threshold.
///
/// With a threshold, every reported flag is recomputed as `score >= threshold`
/// and `flagged` becomes true when any reported category is flagged.
pub fn moderation(raw: RawProviderResponse, options: &ModerationOptions) -> Result<ModerationResult> {
    let cap = Capability::Moderation;
    let mut result: ModerationResult = decode(structured_object(raw, cap)?, cap)?;

    for (category, score) in result.category_scores.iter_mut() {
        *score = unit_interval(*score, &format!("category score '{category}'"), cap)?;
    }

    if let Some(threshold) = options.threshold {
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(ServiceError::InvalidInput(format!(
                "moderation threshold {threshold} is outside [0, 1]"
            )));
        }
        let names: Vec<String> = result
            .categories
            .keys()
            .chain(result.category_scores.keys())
            .cloned()
            .collect();
        result.categories = names
            .into_iter()
            .map(|name| {
                let hit = result
                    .category_scores
                    .get(&name)
                    .is_some_and(|score| *score >= threshold);
                (name, hit)
            })
            .collect::<BTreeMap<_, _>>();
    }

    if let Some(wanted) = options.categories.as_ref().filter(|c| !c.is_empty()) {
        result.categories.retain(|name, _| wanted.contains(name));
        result.category_scores.retain(|name, _| wanted.contains(name));
    }

    if options.threshold.is_some() || options.categories.as_ref().is_some_and(|c| !c.is_empty()) {
        result.flagged = result.categories.values().any(|flag| *flag);
    }
    Ok(result)
}

pub fn entities(raw: RawProviderResponse) -> Result<EntityResult> {
    let cap = Capability::EntityExtraction;
    let result: EntityResult = parse(raw, cap)?;
    for entity in &result.entities {
        non_empty(&entity.text, "entity text", cap)?;
    }
    Ok(result)
}

pub fn seo(raw: RawProviderResponse) -> Result<SeoResult> {
    let cap = Capability::Seo;
    let result: SeoResult = parse(raw, cap)?;
    non_empty(&result.optimized_content, "optimizedContent", cap)?;
    Ok(result)
}

pub fn code_generation(raw: RawProviderResponse) -> Result<CodeGenerationResult> {
    let cap = Capability::CodeGeneration;
    let result: CodeGenerationResult = parse(raw, cap)?;
    non_empty(&result.code, "code", cap)?;
    Ok(result)
}

pub fn code_review(raw: RawProviderResponse) -> Result<CodeReviewResult> {
    parse(raw, Capability::CodeReview)
}

pub fn sql(raw: RawProviderResponse) -> Result<SqlResult> {
    let cap = Capability::Sql;
    let result: SqlResult = parse(raw, cap)?;
    non_empty(&result.query, "query", cap)?;
    Ok(result)
}

pub fn regex(raw: RawProviderResponse) -> Result<RegexResult> {
    let cap = Capability::Regex;
    let result: RegexResult = parse(raw, cap)?;
    non_empty(&result.pattern, "pattern", cap)?;
    Ok(result)
}

pub fn api_docs(raw: RawProviderResponse) -> Result<ApiDocsResult> {
    let cap = Capability::ApiDocs;
    let mut result: ApiDocsResult = parse(raw, cap)?;
    non_empty(&result.documentation, "documentation", cap)?;
    result.openapi = result.openapi.filter(|doc| !doc.trim().is_empty());
    Ok(result)
}

pub fn ocr(raw: RawProviderResponse) -> Result<OcrResult> {
    let cap = Capability::Ocr;
    let mut result: OcrResult = parse(raw, cap)?;
    result.confidence = unit_interval(result.confidence, "confidence", cap)?;
    Ok(result)
}

/// Every question must index into its own options, or the whole quiz fails.
pub fn quiz(raw: RawProviderResponse) -> Result<QuizResult> {
    let cap = Capability::Quiz;
    let result: QuizResult = parse(raw, cap)?;
    if result.questions.is_empty() {
        return Err(ServiceError::malformed(cap, "quiz has no questions"));
    }
    for (i, question) in result.questions.iter().enumerate() {
        if question.correct_index >= question.options.len() {
            return Err(ServiceError::malformed(
                cap,
                format!(
                    "question {} has correctIndex {} but {} options",
                    i + 1,
                    question.correct_index,
                    question.options.len()
                ),
            ));
        }
    }
    Ok(result)
}
