//! LLM Provider Clients
//!
//! The chat proxy relays prompts to Google's Gemini API. The module keeps the
//! provider behind the [`LLMClient`] trait so handlers stay testable.
//!
//! - [`client`] - the [`LLMClient`] trait and prompt composition
//! - [`gemini`] - the Gemini `generateContent` client
//! - [`retry`] - bounded exponential backoff for transient upstream failures

/// Core LLM client trait.
pub mod client;
/// Gemini `generateContent` client.
pub mod gemini;
/// Retry executor and backoff calculation.
pub mod retry;

pub use client::{LLMClient, compose_prompt};
pub use gemini::GeminiClient;
