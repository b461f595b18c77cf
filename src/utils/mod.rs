//! Shared helpers: MIME sniffing and HTTP plumbing.

pub mod http;
pub mod mime;
