//! Replicate prediction client
//!
//! Predictions are submitted, then polled by id until they reach a terminal
//! status. Official models are addressed as `owner/name`; pinned versions as
//! `owner/name:version`.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::capability::Capability;
use crate::error::{Result, ServiceError};
use crate::polling::{JobStatus, JobStatusSource};
use crate::providers::JobHandle;
use crate::router::BackendId;
use crate::utils::http::{HttpHeaderBuilder, response_error, transport_error};

/// A prediction to submit.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    /// `owner/name` or `owner/name:version`
    pub model: String,
    pub input: Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct VersionedPrediction<'a> {
    version: &'a str,
    input: &'a Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct ModelPrediction<'a> {
    input: &'a Map<String, Value>,
}

#[derive(Clone)]
pub struct ReplicateClient {
    http: reqwest::Client,
    base_url: String,
    api_token: SecretString,
}

impl std::fmt::Debug for ReplicateClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplicateClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ReplicateClient {
    pub fn new(http: reqwest::Client, base_url: &str, api_token: SecretString) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
            api_token,
        }
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        let headers = HttpHeaderBuilder::new()
            .with_bearer_auth(self.api_token.expose_secret())?
            .build();
        Ok(builder.headers(headers))
    }

    /// Send `builder`; an undecodable success body is a malformed `capability` response.
    async fn send(&self, builder: reqwest::RequestBuilder, capability: Capability) -> Result<Map<String, Value>> {
        let response = self
            .authorized(builder)?
            .send()
            .await
            .map_err(|e| transport_error(BackendId::Replicate, e))?;
        if !response.status().is_success() {
            return Err(response_error(BackendId::Replicate, response).await);
        }
        response
            .json::<Map<String, Value>>()
            .await
            .map_err(|e| ServiceError::malformed(capability, format!("undecodable prediction: {e}")))
    }

    /// Submit a prediction and return a handle for polling it.
    pub async fn submit(&self, request: &PredictionRequest, capability: Capability) -> Result<JobHandle> {
        let builder = match request.model.split_once(':') {
            Some((_, version)) => self
                .http
                .post(format!("{}/predictions", self.base_url))
                .json(&VersionedPrediction {
                    version,
                    input: &request.input,
                }),
            None => {
                let (owner, name) = request.model.split_once('/').ok_or_else(|| {
                    ServiceError::Configuration(format!(
                        "Replicate model '{}' must be 'owner/name' or 'owner/name:version'",
                        request.model
                    ))
                })?;
                self.http
                    .post(format!("{}/models/{owner}/{name}/predictions", self.base_url))
                    .json(&ModelPrediction {
                        input: &request.input,
                    })
            }
        };

        let prediction = self.send(builder, capability).await?;
        let id = prediction
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ServiceError::malformed(capability, "prediction has no id"))?;
        tracing::debug!("Submitted Replicate prediction {} for {}", id, request.model);
        Ok(JobHandle {
            backend: BackendId::Replicate,
            id: id.to_string(),
            capability,
        })
    }

    /// Fetch the current prediction record.
    pub async fn get_prediction(&self, id: &str, capability: Capability) -> Result<Map<String, Value>> {
        self.send(self.http.get(format!("{}/predictions/{id}", self.base_url)), capability)
            .await
    }

    /// Download a prediction output file of at most `max_bytes`.
    pub async fn download(&self, url: &str, max_bytes: usize, capability: Capability) -> Result<Vec<u8>> {
        tracing::debug!("Downloading Replicate output {}", url);
        let mut response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(BackendId::Replicate, e))?;
        if !response.status().is_success() {
            return Err(response_error(BackendId::Replicate, response).await);
        }
        let too_large = |len: usize| {
            ServiceError::malformed(
                capability,
                format!("output file is {len} bytes, limit is {max_bytes}"),
            )
        };
        if let Some(len) = response.content_length()
            && len as usize > max_bytes
        {
            return Err(too_large(len as usize));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| transport_error(BackendId::Replicate, e))?
        {
            if body.len() + chunk.len() > max_bytes {
                return Err(too_large(body.len() + chunk.len()));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

/// Map a prediction record to a [`JobStatus`].
pub fn prediction_status(record: Map<String, Value>) -> JobStatus {
    let status = record
        .get("status")
        .and_then(Value::as_str)
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match status.as_str() {
        "succeeded" => JobStatus::Succeeded(record),
        "failed" | "canceled" | "cancelled" => {
            let reason = match record.get("error") {
                Some(Value::String(message)) => message.clone(),
                Some(Value::Null) | None => format!("prediction {status}"),
                Some(other) => other.to_string(),
            };
            JobStatus::Failed(reason)
        }
        _ => JobStatus::Pending,
    }
}

#[async_trait]
impl JobStatusSource for ReplicateClient {
    fn backend(&self) -> BackendId {
        BackendId::Replicate
    }

    async fn job_status(&self, job: &JobHandle) -> Result<JobStatus> {
        let record = self.get_prediction(&job.id, job.capability).await?;
        Ok(prediction_status(record))
    }
}

/// Collect output URLs from a prediction's `output` value, in order, deduplicated.
pub fn output_urls(output: &Value) -> Vec<String> {
    let mut out = Vec::new();
    collect_urls(output, &mut out);
    out
}

fn collect_urls(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(url) => {
            let trimmed = url.trim();
            if trimmed.starts_with("http") && !out.iter().any(|existing| existing == trimmed) {
                out.push(trimmed.to_string());
            }
        }
        Value::Array(rows) => {
            for row in rows {
                collect_urls(row, out);
            }
        }
        Value::Object(obj) => {
            for key in ["url", "urls", "audio_out", "output"] {
                if let Some(nested) = obj.get(key) {
                    collect_urls(nested, out);
                }
            }
        }
        _ => {}
    }
}
