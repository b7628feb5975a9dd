use crate::{
    AppState,
    llm::{GeminiClient, LLMClient},
    types::{AppError, ChatRequest, ChatResponse, Result},
};
use axum::{Json, body::Bytes, extract::State};
use tracing::{error, info};

/// Relay a chat prompt to Gemini
///
/// The body is parsed by hand so a malformed payload still produces the
/// JSON failure envelope instead of the extractor's plain-text rejection.
pub async fn chat(State(state): State<AppState>, body: Bytes) -> Result<Json<ChatResponse>> {
    match handle_chat(&state, &body).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!(kind = ?e.kind(), "Error in chat proxy: {}", e);
            Err(e)
        }
    }
}

async fn handle_chat(state: &AppState, body: &[u8]) -> Result<ChatResponse> {
    let request: ChatRequest = serde_json::from_slice(body)
        .map_err(|e| AppError::Unexpected(format!("Invalid request body: {}", e)))?;

    if request.prompt.trim().is_empty() {
        return Err(AppError::InvalidInput("prompt must not be empty".to_string()));
    }

    let config = state.config_manager.config();
    let api_key = config.gemini_api_key().ok_or_else(|| {
        AppError::Configuration(format!(
            "Gemini API key not found: set {}",
            config.gemini.api_key_env
        ))
    })?;

    let client = GeminiClient::new(state.http.clone(), api_key, &config.gemini);
    relay(&client, &request).await
}

/// Send the request's context and prompt through `client`
pub async fn relay(client: &dyn LLMClient, request: &ChatRequest) -> Result<ChatResponse> {
    let text = client
        .generate_with_system(request.context_or_default(), &request.prompt)
        .await?;

    info!(
        model = client.model_name(),
        chars = text.len(),
        "Chat response generated"
    );
    Ok(ChatResponse::ok(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::MockLLMClient;
    use crate::types::{DEFAULT_CONTEXT, ErrorKind};
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_relay_uses_default_context() {
        let mut mock = MockLLMClient::new();
        mock.expect_generate_with_system()
            .with(eq(DEFAULT_CONTEXT), eq("What should I focus on today?"))
            .times(1)
            .returning(|_, _| Ok("Start with the overdue tasks.".to_string()));
        mock.expect_model_name().return_const("gemini-pro".to_string());

        let request = ChatRequest {
            prompt: "What should I focus on today?".to_string(),
            context: None,
        };
        let response = relay(&mock, &request).await.unwrap();

        assert!(response.success);
        assert_eq!(response.response, "Start with the overdue tasks.");
    }

    #[tokio::test]
    async fn test_relay_passes_custom_context_and_errors() {
        let mut mock = MockLLMClient::new();
        mock.expect_generate_with_system()
            .with(eq("You are terse."), eq("hi"))
            .returning(|_, _| {
                Err(AppError::EmptyResult("No response from Gemini".to_string()))
            });

        let request = ChatRequest {
            prompt: "hi".to_string(),
            context: Some("You are terse.".to_string()),
        };
        let err = relay(&mock, &request).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::EmptyResult);
        assert_eq!(err.to_string(), "No response from Gemini");
    }
}
