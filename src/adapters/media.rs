//! Media adapters
//!
//! OpenAI gets its native endpoints. Replicate gets prediction inputs; options
//! its models cannot express are dropped with a debug log.

use serde_json::{Map, json};

use super::{
    BackendRequest, DEFAULT_OPENAI_IMAGE_MODEL, DEFAULT_OPENAI_TTS_MODEL,
    DEFAULT_OPENAI_WHISPER_MODEL, DEFAULT_REPLICATE_IMAGE_MODEL, DEFAULT_REPLICATE_TTS_MODEL,
    DEFAULT_REPLICATE_WHISPER_MODEL,
};
use crate::config::ServiceConfig;
use crate::providers::openai_compat::{
    OpenAiImageRequest, OpenAiSpeechRequest, OpenAiTranscriptionRequest,
};
use crate::providers::replicate::PredictionRequest;
use crate::types::input::LoadedMedia;
use crate::types::{ImageGenerateOptions, SpeechFormat, SpeechOptions, TranscriptionOptions, Voice};
use crate::utils::mime::audio_extension;

/// Voices the default prediction TTS model knows.
const REPLICATE_TTS_VOICES: &[&str] = &[
    "af_alloy", "af_aoede", "af_bella", "af_heart", "af_jessica", "af_kore", "af_nicole",
    "af_nova", "af_river", "af_sarah", "af_sky", "am_adam", "am_echo", "am_eric", "am_fenrir",
    "am_liam", "am_michael", "am_onyx", "am_puck", "bf_alice", "bf_emma", "bf_isabella",
    "bf_lily", "bm_daniel", "bm_fable", "bm_george", "bm_lewis",
];
const REPLICATE_DEFAULT_VOICE: &str = "af_bella";

fn model_or(configured: &Option<String>, default: &str) -> String {
    configured
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(default)
        .to_string()
}

pub fn openai_image(prompt: &str, options: &ImageGenerateOptions, config: &ServiceConfig) -> BackendRequest {
    BackendRequest::OpenAiImage(OpenAiImageRequest {
        model: model_or(&config.image_model, DEFAULT_OPENAI_IMAGE_MODEL),
        prompt: prompt.to_string(),
        n: 1,
        size: options.size.as_str().to_string(),
        quality: options.quality.map(|q| q.as_str().to_string()),
        style: options.style.map(|s| s.as_str().to_string()),
        response_format: options.response_format.as_str().to_string(),
    })
}

pub fn replicate_image(prompt: &str, options: &ImageGenerateOptions, config: &ServiceConfig) -> BackendRequest {
    if let Some(quality) = options.quality {
        tracing::debug!("Dropping image quality '{}' for Replicate", quality.as_str());
    }
    if let Some(style) = options.style {
        tracing::debug!("Dropping image style '{}' for Replicate", style.as_str());
    }

    let mut input = Map::new();
    input.insert("prompt".into(), prompt.into());
    input.insert("aspect_ratio".into(), options.size.aspect_ratio().into());
    input.insert("num_outputs".into(), json!(1));
    input.insert("output_format".into(), "png".into());

    BackendRequest::Prediction(PredictionRequest {
        model: model_or(&config.image_model, DEFAULT_REPLICATE_IMAGE_MODEL),
        input,
    })
}

pub fn openai_transcription(audio: &LoadedMedia, options: &TranscriptionOptions, config: &ServiceConfig) -> BackendRequest {
    BackendRequest::OpenAiTranscription(OpenAiTranscriptionRequest {
        model: model_or(&config.whisper_model, DEFAULT_OPENAI_WHISPER_MODEL),
        audio: audio.bytes.clone(),
        file_name: format!("audio.{}", audio_extension(&audio.mime)),
        mime: audio.mime.clone(),
        language: options.language.clone(),
        prompt: options.prompt.clone(),
        temperature: options.temperature,
    })
}

pub fn replicate_transcription(audio: &LoadedMedia, options: &TranscriptionOptions, config: &ServiceConfig) -> BackendRequest {
    let mut input = Map::new();
    input.insert("audio".into(), audio.to_data_uri().into());
    input.insert("transcription".into(), "plain text".into());
    if let Some(language) = &options.language {
        input.insert("language".into(), language.clone().into());
    }
    if let Some(prompt) = &options.prompt {
        input.insert("initial_prompt".into(), prompt.clone().into());
    }
    if let Some(temperature) = options.temperature {
        input.insert("temperature".into(), json!(temperature));
    }

    BackendRequest::Prediction(PredictionRequest {
        model: model_or(&config.whisper_model, DEFAULT_REPLICATE_WHISPER_MODEL),
        input,
    })
}

pub fn openai_speech(text: &str, options: &SpeechOptions, config: &ServiceConfig) -> BackendRequest {
    BackendRequest::OpenAiSpeech(OpenAiSpeechRequest {
        model: model_or(&config.tts_model, DEFAULT_OPENAI_TTS_MODEL),
        input: text.to_string(),
        voice: options.voice.as_str().to_string(),
        response_format: options.format.as_str().to_string(),
        speed: options.speed,
    })
}

pub fn replicate_speech(text: &str, options: &SpeechOptions, config: &ServiceConfig) -> BackendRequest {
    let mut input = Map::new();
    input.insert("text".into(), text.into());
    input.insert("voice".into(), replicate_voice(&options.voice).into());
    if let Some(speed) = options.speed {
        input.insert("speed".into(), json!(speed));
    }
    if options.format != SpeechFormat::default() {
        tracing::debug!(
            "Dropping speech format '{}' for Replicate",
            options.format.as_str()
        );
    }

    BackendRequest::Prediction(PredictionRequest {
        model: model_or(&config.tts_model, DEFAULT_REPLICATE_TTS_MODEL),
        input,
    })
}

/// Map a voice onto the prediction model's catalog, falling back to its default.
fn replicate_voice(voice: &Voice) -> &'static str {
    let wanted = voice.as_str();
    let direct = REPLICATE_TTS_VOICES.iter().find(|v| **v == wanted);
    let by_name = REPLICATE_TTS_VOICES
        .iter()
        .find(|v| v.split_once('_').is_some_and(|(_, name)| name == wanted));

    match direct.or(by_name) {
        Some(v) => *v,
        None => {
            tracing::debug!(
                "Voice '{}' unknown to Replicate TTS, using '{}'",
                wanted,
                REPLICATE_DEFAULT_VOICE
            );
            REPLICATE_DEFAULT_VOICE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ImageQuality, ImageSize, ImageStyle};

    fn prediction(request: BackendRequest) -> PredictionRequest {
        match request {
            BackendRequest::Prediction(p) => p,
            other => panic!("expected prediction, got {other:?}"),
        }
    }

    #[test]
    fn test_replicate_image_maps_size_and_drops_quality_and_style() {
        let options = ImageGenerateOptions::default()
            .with_size(ImageSize::Landscape)
            .with_quality(ImageQuality::Hd)
            .with_style(ImageStyle::Vivid);
        let p = prediction(replicate_image("a fox", &options, &ServiceConfig::default()));

        assert_eq!(p.model, DEFAULT_REPLICATE_IMAGE_MODEL);
        assert_eq!(p.input["prompt"], "a fox");
        assert_eq!(p.input["aspect_ratio"], "16:9");
        assert!(p.input.get("quality").is_none());
        assert!(p.input.get("style").is_none());
    }

    #[test]
    fn test_openai_image_keeps_every_option() {
        let options = ImageGenerateOptions::default()
            .with_size(ImageSize::Portrait)
            .with_quality(ImageQuality::Hd)
            .with_style(ImageStyle::Natural);
        let BackendRequest::OpenAiImage(image) = openai_image("a fox", &options, &ServiceConfig::default()) else {
            panic!("expected an OpenAI image request");
        };
        assert_eq!(image.model, DEFAULT_OPENAI_IMAGE_MODEL);
        assert_eq!(image.size, "1024x1792");
        assert_eq!(image.quality.as_deref(), Some("hd"));
        assert_eq!(image.style.as_deref(), Some("natural"));
        assert_eq!(image.response_format, "url");
    }

    #[test]
    fn test_image_model_override_applies_to_replicate() {
        let config = ServiceConfig::new().with_image_model("stability-ai/sdxl:abc123");
        let p = prediction(replicate_image("a fox", &ImageGenerateOptions::default(), &config));
        assert_eq!(p.model, "stability-ai/sdxl:abc123");
    }

    #[test]
    fn test_replicate_transcription_inlines_audio() {
        let audio = LoadedMedia {
            bytes: b"ID3".to_vec(),
            mime: "audio/mpeg".into(),
        };
        let options = TranscriptionOptions::default().with_language("en");
        let p = prediction(replicate_transcription(&audio, &options, &ServiceConfig::default()));
        assert_eq!(p.model, DEFAULT_REPLICATE_WHISPER_MODEL);
        assert_eq!(p.input["audio"], "data:audio/mpeg;base64,SUQz");
        assert_eq!(p.input["language"], "en");
    }

    #[test]
    fn test_openai_transcription_file_name_follows_mime() {
        let audio = LoadedMedia {
            bytes: vec![0; 4],
            mime: "audio/wav".into(),
        };
        let BackendRequest::OpenAiTranscription(t) =
            openai_transcription(&audio, &TranscriptionOptions::default(), &ServiceConfig::default())
        else {
            panic!("expected an OpenAI transcription request");
        };
        assert_eq!(t.file_name, "audio.wav");
        assert_eq!(t.model, DEFAULT_OPENAI_WHISPER_MODEL);
    }

    #[test]
    fn test_unknown_voice_degrades_to_default() {
        assert_eq!(replicate_voice(&Voice::Custom("am_adam".into())), "am_adam");
        assert_eq!(replicate_voice(&Voice::Nova), "af_nova");
        assert_eq!(replicate_voice(&Voice::Shimmer), REPLICATE_DEFAULT_VOICE);
        assert_eq!(
            replicate_voice(&Voice::Custom("nonexistent".into())),
            REPLICATE_DEFAULT_VOICE
        );
    }

    #[test]
    fn test_speech_request_on_both_backends() {
        let options = SpeechOptions::default().with_voice(Voice::Onyx).with_speed(1.25);
        let BackendRequest::OpenAiSpeech(s) = openai_speech("hi", &options, &ServiceConfig::default()) else {
            panic!("expected an OpenAI speech request");
        };
        assert_eq!(s.voice, "onyx");
        assert_eq!(s.response_format, "mp3");

        let p = prediction(replicate_speech("hi", &options, &ServiceConfig::default()));
        assert_eq!(p.model, DEFAULT_REPLICATE_TTS_MODEL);
        assert_eq!(p.input["voice"], "am_onyx");
        assert_eq!(p.input["text"], "hi");
    }
}
