//! Google Gemini text generation for SmartPlanner.

pub mod client;
pub mod error;
pub mod types;

pub use client::{GeminiClient, TextGenerator, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use error::GeminiError;
