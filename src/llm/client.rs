//! LLM client abstraction
//!
//! The chat handler talks to the upstream model through [`LLMClient`] so the
//! relay logic can be exercised against a mock in unit tests and against a
//! wiremock-backed [`GeminiClient`](super::gemini::GeminiClient) in
//! integration tests.

use crate::types::Result;
use async_trait::async_trait;

/// Generic LLM client trait for provider abstraction
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate with a system/context instruction placed ahead of the prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Combine a context instruction and a user prompt into one text block.
pub fn compose_prompt(system: &str, prompt: &str) -> String {
    format!("{}\n\nUser: {}", system, prompt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_prompt_layout() {
        assert_eq!(
            compose_prompt("Be helpful.", "What is due today?"),
            "Be helpful.\n\nUser: What is due today?"
        );
    }

    #[tokio::test]
    async fn test_mock_client_is_object_safe() {
        let mut mock = MockLLMClient::new();
        mock.expect_generate()
            .returning(|prompt| Ok(format!("echo: {}", prompt)));
        mock.expect_model_name().return_const("mock-model".to_string());

        let client: Box<dyn LLMClient> = Box::new(mock);
        assert_eq!(client.generate("hi").await.unwrap(), "echo: hi");
        assert_eq!(client.model_name(), "mock-model");
    }
}
