//! Backend clients and dispatch
//!
//! [`BackendHandle`] pairs a backend identity with a borrowed client. A
//! [`BackendRequest`] is executed against a handle and yields a
//! [`RawProviderResponse`]; job handles are then settled by polling.

pub mod openai_compat;
pub mod replicate;

use serde_json::{Map, Value};

use crate::adapters::BackendRequest;
use crate::capability::Capability;
use crate::error::{Result, ServiceError};
use crate::polling::{PollPolicy, poll_until_terminal};
use crate::router::BackendId;

pub use openai_compat::OpenAiCompatClient;
pub use replicate::ReplicateClient;

/// A resolved backend: its identity plus the client that talks to it.
#[derive(Debug, Clone, Copy)]
pub enum BackendHandle<'a> {
    OpenRouter(&'a OpenAiCompatClient),
    OpenAi(&'a OpenAiCompatClient),
    Replicate(&'a ReplicateClient),
}

impl BackendHandle<'_> {
    pub fn id(&self) -> BackendId {
        match self {
            BackendHandle::OpenRouter(_) => BackendId::OpenRouter,
            BackendHandle::OpenAi(_) => BackendId::OpenAi,
            BackendHandle::Replicate(_) => BackendId::Replicate,
        }
    }
}

/// A submitted job that has not been polled yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub backend: BackendId,
    pub id: String,
    /// Capability the job serves; names malformed job records
    pub capability: Capability,
}

/// Backend output before normalization. Never returned to callers.
#[derive(Debug, Clone, PartialEq)]
pub enum RawProviderResponse {
    /// Chat completion text
    Text(String),
    /// A JSON object: media endpoint payload or a finished job record
    Structured(Map<String, Value>),
    /// A job that must be polled to completion
    JobHandle(JobHandle),
    /// Binary body such as synthesized audio
    Binary(Vec<u8>),
}

/// Send `request` to the backend behind `handle`.
///
/// A success status with an unusable body is reported as a malformed
/// `capability` response, never as a request failure.
pub async fn execute(
    handle: BackendHandle<'_>,
    capability: Capability,
    request: &BackendRequest,
) -> Result<RawProviderResponse> {
    match (handle, request) {
        (BackendHandle::OpenRouter(client) | BackendHandle::OpenAi(client), BackendRequest::Chat(chat)) => {
            client.chat(chat, capability).await.map(RawProviderResponse::Text)
        }
        (BackendHandle::OpenAi(client), BackendRequest::Moderation { input, model }) => client
            .moderate(input, model)
            .await
            .map(RawProviderResponse::Structured),
        (BackendHandle::OpenAi(client), BackendRequest::OpenAiImage(image)) => client
            .generate_image(image)
            .await
            .map(RawProviderResponse::Structured),
        (BackendHandle::OpenAi(client), BackendRequest::OpenAiTranscription(audio)) => client
            .transcribe(audio)
            .await
            .map(RawProviderResponse::Structured),
        (BackendHandle::OpenAi(client), BackendRequest::OpenAiSpeech(speech)) => {
            client.speech(speech).await.map(RawProviderResponse::Binary)
        }
        (BackendHandle::Replicate(client), BackendRequest::Prediction(prediction)) => client
            .submit(prediction, capability)
            .await
            .map(RawProviderResponse::JobHandle),
        (handle, request) => Err(ServiceError::Configuration(format!(
            "{} cannot serve a {} request",
            handle.id(),
            request.kind()
        ))),
    }
}

/// Poll a job handle to completion; other responses pass through unchanged.
pub async fn settle(
    handle: BackendHandle<'_>,
    raw: RawProviderResponse,
    policy: &PollPolicy,
) -> Result<RawProviderResponse> {
    match (handle, raw) {
        (BackendHandle::Replicate(client), RawProviderResponse::JobHandle(job)) => {
            poll_until_terminal(client, &job, policy)
                .await
                .map(RawProviderResponse::Structured)
        }
        (handle, RawProviderResponse::JobHandle(job)) => Err(ServiceError::Configuration(format!(
            "{} cannot poll a {} job",
            handle.id(),
            job.backend
        ))),
        (_, raw) => Ok(raw),
    }
}
