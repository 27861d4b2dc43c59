//! Caller side of the generation endpoint, plus the saved-recipe book.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};
use url::Url;
use uuid::Uuid;

use crate::{
    generate::GenerateRecipeRequest,
    goal::FoodGoal,
    mapping::{from_record, to_new_record},
    recipe::Recipe,
    store::{RecipeStore, StoreError},
};

pub const MIN_COOKING_TIME: u32 = 10;
pub const MAX_COOKING_TIME: u32 = 120;

const GENERIC_FAILURE: &str = "Failed to generate recipe";

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("Add at least one ingredient!")]
    NoIngredients,

    #[error("Cooking time must be between 10 and 120 minutes, got {0}")]
    CookingTimeOutOfRange(u32),

    #[error("Whoa there, speedy! Too many requests. Take a breath and try again.")]
    RateLimited,

    #[error("Rex needs more fuel! AI credits are low.")]
    CreditsExhausted,

    #[error("{0}")]
    Failed(String),

    #[error("Rex had trouble cooking up that recipe. Try again!")]
    Transport(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Trims, drops blanks and removes case-insensitive duplicates, keeping the
/// first spelling of each ingredient in its original position.
pub fn normalize_ingredients<I, S>(ingredients: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = Vec::<String>::new();
    let mut normalized = Vec::new();
    for ingredient in ingredients {
        let trimmed = ingredient.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        let key = trimmed.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        normalized.push(trimmed.to_string());
    }
    normalized
}

/// Builds the request body, rejecting input that must never reach the network.
pub fn compose_request<I, S>(
    ingredients: I,
    goal: FoodGoal,
    cooking_time: u32,
) -> Result<GenerateRecipeRequest, ComposeError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let ingredients = normalize_ingredients(ingredients);
    if ingredients.is_empty() {
        return Err(ComposeError::NoIngredients);
    }
    if !(MIN_COOKING_TIME..=MAX_COOKING_TIME).contains(&cooking_time) {
        return Err(ComposeError::CookingTimeOutOfRange(cooking_time));
    }
    Ok(GenerateRecipeRequest {
        ingredients,
        food_goal: goal.as_str().to_string(),
        cooking_time,
    })
}

#[derive(Debug, Clone)]
pub struct RecipeClient {
    http: Client,
    endpoint: Url,
    bearer_token: String,
}

impl RecipeClient {
    pub fn new(endpoint: Url, bearer_token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint,
            bearer_token: bearer_token.into(),
        }
    }

    /// Sends one generation request. There is no retry: every failure is
    /// final for this call.
    pub async fn generate<I, S>(
        &self,
        ingredients: I,
        goal: FoodGoal,
        cooking_time: u32,
    ) -> Result<Recipe, ComposeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let request = compose_request(ingredients, goal, cooking_time)?;
        info!(ingredients = request.ingredients.len(), %goal, cooking_time, "requesting recipe");

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.bearer_token)
            .json(&request)
            .send()
            .await
            .map_err(|err| transport(err.to_string()))?;

        let status = response.status();
        match status {
            StatusCode::TOO_MANY_REQUESTS => return Err(ComposeError::RateLimited),
            StatusCode::PAYMENT_REQUIRED => return Err(ComposeError::CreditsExhausted),
            status if !status.is_success() => {
                let message = response
                    .json::<ErrorBody>()
                    .await
                    .ok()
                    .and_then(|body| body.error)
                    .unwrap_or_else(|| GENERIC_FAILURE.to_string());
                error!(status = status.as_u16(), %message, "recipe generation failed");
                return Err(ComposeError::Failed(message));
            }
            _ => {}
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| transport(err.to_string()))?;
        let value: Value = serde_json::from_slice(&body).map_err(|err| {
            error!(error = %err, "recipe response is not JSON");
            ComposeError::Failed(GENERIC_FAILURE.to_string())
        })?;
        let mut recipe = Recipe::from_value(value);
        recipe.food_goal = Some(goal);
        Ok(recipe)
    }
}

fn transport(detail: String) -> ComposeError {
    error!(error = %detail, "error generating recipe");
    ComposeError::Transport(detail)
}

/// A user's saved recipes. Each call is independent; a failed refresh after
/// a successful save is not reconciled.
pub struct RecipeBook<S> {
    store: S,
}

impl<S: RecipeStore> RecipeBook<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn save(&self, user_id: &str, recipe: &Recipe) -> Result<Recipe, StoreError> {
        let record = self.store.insert(to_new_record(recipe, user_id)).await?;
        info!(id = %record.id, "recipe saved");
        Ok(from_record(record))
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<Recipe>, StoreError> {
        let records = self.store.list_for_user(user_id).await?;
        Ok(records.into_iter().map(from_record).collect())
    }

    pub async fn delete(&self, user_id: &str, id: Uuid) -> Result<(), StoreError> {
        self.store.delete(user_id, id).await?;
        info!(%id, "recipe removed");
        Ok(())
    }
}
