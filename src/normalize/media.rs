//! Normalizers for media capabilities.

use serde_json::{Map, Value};

use super::{decode, structured_object};
use crate::capability::Capability;
use crate::error::{Result, ServiceError};
use crate::providers::RawProviderResponse;
use crate::providers::replicate::output_urls;
use crate::types::{ImageGenerateResult, TranscriptionResult};

fn string_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

/// An image endpoint payload or a finished prediction record.
pub fn image_generation(raw: RawProviderResponse) -> Result<ImageGenerateResult> {
    let cap = Capability::ImageGeneration;
    let map = structured_object(raw, cap)?;

    let result = match map.get("output") {
        Some(output) => ImageGenerateResult {
            url: output_urls(output).into_iter().next(),
            base64: None,
            revised_prompt: None,
        },
        None => ImageGenerateResult {
            url: string_field(&map, &["url"]),
            base64: string_field(&map, &["base64", "b64_json"]),
            revised_prompt: string_field(&map, &["revisedPrompt", "revised_prompt"]),
        },
    };

    if result.url.is_none() && result.base64.is_none() {
        return Err(ServiceError::malformed(cap, "no image url or data"));
    }
    Ok(result)
}

/// A `verbose_json` transcription or a finished prediction record.
pub fn transcription(raw: RawProviderResponse) -> Result<TranscriptionResult> {
    let cap = Capability::Transcription;
    if let RawProviderResponse::Text(text) = &raw
        && serde_json::from_str::<Value>(text).is_err()
    {
        return Ok(TranscriptionResult {
            text: text.trim().to_string(),
            language: None,
            duration: None,
        });
    }

    let map = structured_object(raw, cap)?;
    if !map.contains_key("output") {
        let mut result: TranscriptionResult = decode(map, cap)?;
        result.text = result.text.trim().to_string();
        return Ok(result);
    }

    match &map["output"] {
        Value::String(text) => Ok(TranscriptionResult {
            text: text.trim().to_string(),
            language: None,
            duration: None,
        }),
        Value::Object(output) => {
            let text = string_field(output, &["transcription", "text"])
                .ok_or_else(|| ServiceError::malformed(cap, "prediction output has no transcription"))?;
            let duration = output
                .get("segments")
                .and_then(Value::as_array)
                .and_then(|segments| segments.last())
                .and_then(|last| last.get("end"))
                .and_then(Value::as_f64);
            Ok(TranscriptionResult {
                text: text.trim().to_string(),
                language: string_field(output, &["detected_language", "language"]),
                duration,
            })
        }
        _ => Err(ServiceError::malformed(cap, "unexpected prediction output")),
    }
}

/// The audio file URL of a finished speech prediction.
pub fn speech_output_url(record: &Map<String, Value>) -> Result<String> {
    record
        .get("output")
        .and_then(|output| output_urls(output).into_iter().next())
        .ok_or_else(|| ServiceError::malformed(Capability::SpeechSynthesis, "prediction has no audio url"))
}

/// Synthesized audio bytes; empty audio is malformed.
pub fn speech(raw: RawProviderResponse) -> Result<Vec<u8>> {
    match raw {
        RawProviderResponse::Binary(bytes) if !bytes.is_empty() => Ok(bytes),
        RawProviderResponse::Binary(_) => Err(ServiceError::malformed(
            Capability::SpeechSynthesis,
            "empty audio",
        )),
        _ => Err(ServiceError::malformed(
            Capability::SpeechSynthesis,
            "expected audio bytes",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn structured(value: Value) -> RawProviderResponse {
        RawProviderResponse::Structured(value.as_object().cloned().unwrap())
    }

    #[test]
    fn test_image_from_openai_payload() {
        let result = image_generation(structured(json!({
            "url": "https://files.example/img.png",
            "revisedPrompt": "a red fox in snow"
        })))
        .unwrap();
        assert_eq!(result.url.as_deref(), Some("https://files.example/img.png"));
        assert_eq!(result.revised_prompt.as_deref(), Some("a red fox in snow"));
    }

    #[test]
    fn test_image_from_prediction_record() {
        let result = image_generation(structured(json!({
            "id": "p1",
            "status": "succeeded",
            "output": ["https://replicate.delivery/out-0.png"]
        })))
        .unwrap();
        assert_eq!(result.url.as_deref(), Some("https://replicate.delivery/out-0.png"));
        assert_eq!(result.base64, None);
    }

    #[test]
    fn test_image_without_url_or_data_is_malformed() {
        assert!(image_generation(structured(json!({"output": []}))).unwrap_err().is_malformed());
        assert!(image_generation(structured(json!({}))).is_err());
    }

    #[test]
    fn test_transcription_verbose_json() {
        let result = transcription(structured(json!({
            "text": " Hello world. ",
            "language": "english",
            "duration": 2.5
        })))
        .unwrap();
        assert_eq!(result.text, "Hello world.");
        assert_eq!(result.language.as_deref(), Some("english"));
        assert_eq!(result.duration, Some(2.5));
    }

    #[test]
    fn test_transcription_prediction_output() {
        let result = transcription(structured(json!({
            "status": "succeeded",
            "output": {
                "transcription": "Hello world.",
                "detected_language": "en",
                "segments": [{"start": 0.0, "end": 1.2}, {"start": 1.2, "end": 3.4}]
            }
        })))
        .unwrap();
        assert_eq!(result.text, "Hello world.");
        assert_eq!(result.language.as_deref(), Some("en"));
        assert_eq!(result.duration, Some(3.4));
    }

    #[test]
    fn test_transcription_missing_text_is_malformed() {
        assert!(transcription(structured(json!({"output": {"segments": []}}))).is_err());
        assert!(transcription(structured(json!({"language": "en"}))).is_err());
    }

    #[test]
    fn test_speech_bytes() {
        assert_eq!(speech(RawProviderResponse::Binary(vec![1, 2])).unwrap(), vec![1, 2]);
        assert!(speech(RawProviderResponse::Binary(vec![])).unwrap_err().is_malformed());
    }

    #[test]
    fn test_speech_output_url() {
        let record = json!({"output": "https://replicate.delivery/speech.wav"});
        assert_eq!(
            speech_output_url(record.as_object().unwrap()).unwrap(),
            "https://replicate.delivery/speech.wav"
        );
        assert!(speech_output_url(&Map::new()).is_err());
    }
}
