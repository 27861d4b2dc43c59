//! The recipe generation endpoint: one request in, one gateway call, one
//! recipe (or error) out.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    app::AppState,
    goal::FoodGoal,
    prompt::{SYSTEM_PROMPT, build_user_prompt, strip_code_fences},
    recipe::validate_shape,
    upstream::{ChatMessage, ChatRequest, TEMPERATURE, UpstreamError},
};

pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please try again in a moment!";
pub const CREDITS_MESSAGE: &str = "AI credits depleted. Please add funds to continue cooking!";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRecipeRequest {
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub food_goal: String,
    pub cooking_time: u32,
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("AI_GATEWAY_API_KEY is not configured")]
    MissingApiKey,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("{}", RATE_LIMIT_MESSAGE)]
    RateLimited,

    #[error("{}", CREDITS_MESSAGE)]
    CreditsExhausted,

    #[error("AI gateway error: {0}")]
    GatewayStatus(u16),

    #[error("AI gateway error: {0}")]
    Gateway(String),

    #[error("AI gateway request failed")]
    GatewayUnreachable,

    #[error("No content in AI response")]
    EmptyContent,

    #[error("Failed to parse recipe from AI response")]
    Unparsable,

    #[error("Recipe from AI response is incomplete")]
    Incomplete(Vec<String>),
}

impl GenerateError {
    pub fn status(&self) -> StatusCode {
        match self {
            GenerateError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            GenerateError::CreditsExhausted => StatusCode::PAYMENT_REQUIRED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<UpstreamError> for GenerateError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::RateLimited => GenerateError::RateLimited,
            UpstreamError::CreditsExhausted => GenerateError::CreditsExhausted,
            UpstreamError::Status { status, .. } => GenerateError::GatewayStatus(status),
            UpstreamError::EmptyContent => GenerateError::EmptyContent,
            UpstreamError::Gateway(message) => GenerateError::Gateway(message),
            err @ (UpstreamError::Transport(_) | UpstreamError::Decode(_)) => {
                error!(error = %err, "AI gateway call did not complete");
                GenerateError::GatewayUnreachable
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for GenerateError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            GenerateError::RateLimited | GenerateError::CreditsExhausted => {
                warn!(status = status.as_u16(), "AI gateway refused request");
            }
            GenerateError::Incomplete(problems) => {
                error!(?problems, "generated recipe is missing fields");
            }
            other => error!(error = %other, "error generating recipe"),
        }
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

pub fn build_chat_request(model: &str, request: &GenerateRecipeRequest) -> ChatRequest {
    let goal = FoodGoal::resolve(&request.food_goal);
    ChatRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_user_prompt(&request.ingredients, goal, request.cooking_time)),
        ],
        temperature: TEMPERATURE,
    }
}

/// Parses model output into a JSON value after removing any code fence.
/// The raw content is logged on failure and never handed back to the caller.
pub fn parse_recipe_content(content: &str) -> Result<Value, GenerateError> {
    serde_json::from_str(strip_code_fences(content)).map_err(|err| {
        error!(error = %err, content = %content, "failed to parse recipe JSON");
        GenerateError::Unparsable
    })
}

pub async fn generate_recipe(
    state: &AppState,
    request: GenerateRecipeRequest,
) -> Result<Value, GenerateError> {
    let api_key = state
        .config
        .gateway_api_key
        .as_deref()
        .ok_or(GenerateError::MissingApiKey)?;

    let chat = build_chat_request(&state.config.gateway_model, &request);
    let content = state.backend.complete(api_key, &chat).await?;
    let recipe = parse_recipe_content(&content)?;

    if state.config.strict_schema {
        let problems = validate_shape(&recipe);
        if !problems.is_empty() {
            return Err(GenerateError::Incomplete(problems));
        }
    }
    Ok(recipe)
}

pub async fn generate_recipe_handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRecipeRequest>, JsonRejection>,
) -> Result<Json<Value>, GenerateError> {
    let Json(request) = payload.map_err(|err| GenerateError::InvalidBody(err.body_text()))?;
    info!(
        ingredients = request.ingredients.len(),
        food_goal = %request.food_goal,
        cooking_time = request.cooking_time,
        "generating recipe"
    );
    let recipe = generate_recipe(&state, request).await?;
    Ok(Json(recipe))
}
