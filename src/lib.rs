//! ai-service
//!
//! One facade for text, vision and audio capabilities over three backends:
//! OpenRouter and OpenAI for chat-style work, OpenAI and Replicate for media.
//! Callers pick a capability; the service picks the backend from whichever
//! credentials are configured and always returns the same result shape.
//!
//! ```rust,ignore
//! use ai_service::{AiService, SummaryLength};
//!
//! let service = AiService::from_env()?;
//! let summary = service.summarize_text(article, SummaryLength::Short).await?;
//! ```
#![deny(unsafe_code)]

pub mod adapters;
pub mod cancel;
pub mod capability;
pub mod config;
pub mod error;
pub mod normalize;
pub mod polling;
pub mod providers;
pub mod retry;
pub mod router;
pub mod service;
pub mod types;
pub mod utils;

pub use cancel::CancelHandle;
pub use capability::{Capability, CapabilityFamily, MediaCapability};
pub use config::{HttpConfig, InputLimits, ServiceConfig};
pub use error::{Result, ServiceError};
pub use polling::PollPolicy;
pub use retry::RetryPolicy;
pub use router::{BackendId, ProviderSelection};
pub use service::AiService;
pub use types::*;
