//! Daily prompt generation against the Gemini `generateContent` API.
//!
//! One stateless call per request, no retries: whatever the provider says
//! is surfaced to the caller as a [`GenerateError`].

pub mod client;
pub mod error;
pub mod extract;
pub mod instruction;

pub use client::{GeminiClient, LlmConfig};
pub use error::GenerateError;
