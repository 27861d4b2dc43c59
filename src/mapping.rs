//! Field mapping between the camelCase recipe the generator returns and the
//! snake_case row the recipe store keeps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    goal::FoodGoal,
    recipe::{Difficulty, Ingredient, Instruction, Nutrition, Recipe, Substitution},
};

/// Insert payload for the recipe store. Identity and timestamps are assigned
/// by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecipeRecord {
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub dino_commentary: Option<String>,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<Instruction>,
    pub tips: Vec<String>,
    pub substitutions: Vec<Substitution>,
    pub prep_time: Option<u32>,
    pub cook_time: Option<u32>,
    pub total_time: Option<u32>,
    pub servings: u32,
    pub difficulty: Difficulty,
    pub food_goal: Option<FoodGoal>,
    pub nutrition: Nutrition,
}

/// A persisted recipe row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRecord {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub dino_commentary: Option<String>,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<Instruction>,
    #[serde(default)]
    pub tips: Option<Vec<String>>,
    pub substitutions: Vec<Substitution>,
    pub prep_time: Option<u32>,
    pub cook_time: Option<u32>,
    pub total_time: Option<u32>,
    pub servings: u32,
    pub difficulty: Difficulty,
    pub food_goal: Option<FoodGoal>,
    pub nutrition: Nutrition,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewRecipeRecord {
    pub fn into_record(self, id: Uuid, now: DateTime<Utc>) -> RecipeRecord {
        RecipeRecord {
            id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            dino_commentary: self.dino_commentary,
            ingredients: self.ingredients,
            instructions: self.instructions,
            tips: Some(self.tips),
            substitutions: self.substitutions,
            prep_time: self.prep_time,
            cook_time: self.cook_time,
            total_time: self.total_time,
            servings: self.servings,
            difficulty: self.difficulty,
            food_goal: self.food_goal,
            nutrition: self.nutrition,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Write-transform: recipe shape to insert row, owned by `user_id`.
pub fn to_new_record(recipe: &Recipe, user_id: &str) -> NewRecipeRecord {
    NewRecipeRecord {
        user_id: user_id.to_string(),
        title: recipe.title.clone(),
        description: recipe.description.clone(),
        dino_commentary: non_empty(&recipe.dino_commentary),
        ingredients: recipe.ingredients.clone(),
        instructions: recipe.instructions.clone(),
        tips: recipe.tips.clone(),
        substitutions: recipe.substitutions.clone(),
        prep_time: non_zero(recipe.prep_time),
        cook_time: non_zero(recipe.cook_time),
        total_time: non_zero(recipe.total_time),
        servings: recipe.servings,
        difficulty: recipe.difficulty,
        food_goal: recipe.food_goal,
        nutrition: recipe.nutrition.clone(),
    }
}

/// Read-transform: stored row back to the recipe shape.
pub fn from_record(record: RecipeRecord) -> Recipe {
    Recipe {
        id: Some(record.id),
        user_id: Some(record.user_id),
        title: record.title,
        description: record.description,
        dino_commentary: record.dino_commentary.unwrap_or_default(),
        ingredients: record.ingredients,
        instructions: record.instructions,
        tips: record.tips.unwrap_or_default(),
        substitutions: record.substitutions,
        prep_time: record.prep_time.unwrap_or_default(),
        cook_time: record.cook_time.unwrap_or_default(),
        total_time: record.total_time.unwrap_or_default(),
        servings: record.servings,
        difficulty: record.difficulty,
        food_goal: record.food_goal,
        nutrition: record.nutrition,
        created_at: Some(record.created_at),
    }
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

fn non_zero(minutes: u32) -> Option<u32> {
    (minutes > 0).then_some(minutes)
}
