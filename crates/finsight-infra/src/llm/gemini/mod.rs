//! Gemini provider: HTTP client and wire types.

mod client;
mod types;

pub use client::GeminiProvider;
