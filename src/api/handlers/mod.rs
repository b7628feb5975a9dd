//! API request handlers.

/// Gemini chat proxy handler.
pub mod chat;
/// Projects, tasks, team and notes handlers.
pub mod dashboard;
/// Health check handler.
pub mod health;
