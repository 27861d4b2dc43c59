//! Recipe shape as returned by the generator and consumed by clients.
//!
//! Reading is tolerant: a field that is absent, null or of the wrong type
//! falls back to zero or empty instead of failing the whole recipe.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use tracing::warn;
use uuid::Uuid;

use crate::goal::FoodGoal;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recipe {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "optional_text")]
    pub user_id: Option<String>,
    #[serde(deserialize_with = "text")]
    pub title: String,
    #[serde(deserialize_with = "text")]
    pub description: String,
    #[serde(deserialize_with = "text")]
    pub dino_commentary: String,
    #[serde(deserialize_with = "list")]
    pub ingredients: Vec<Ingredient>,
    #[serde(deserialize_with = "list")]
    pub instructions: Vec<Instruction>,
    #[serde(deserialize_with = "list")]
    pub tips: Vec<String>,
    #[serde(deserialize_with = "list")]
    pub substitutions: Vec<Substitution>,
    #[serde(deserialize_with = "whole_number")]
    pub prep_time: u32,
    #[serde(deserialize_with = "whole_number")]
    pub cook_time: u32,
    #[serde(deserialize_with = "whole_number")]
    pub total_time: u32,
    #[serde(deserialize_with = "whole_number")]
    pub servings: u32,
    pub difficulty: Difficulty,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub food_goal: Option<FoodGoal>,
    #[serde(deserialize_with = "lenient")]
    pub nutrition: Nutrition,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub created_at: Option<DateTime<Utc>>,
}

/// One ingredient line. A bare string reads as an ingredient with only a name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ingredient {
    pub name: String,
    pub amount: String,
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One numbered step. A bare string reads as the step text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Instruction {
    pub step: u32,
    pub instruction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Substitution {
    #[serde(deserialize_with = "text")]
    pub original: String,
    #[serde(deserialize_with = "text")]
    pub substitute: String,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "optional_text")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Nutrition {
    #[serde(deserialize_with = "decimal")]
    pub calories: f64,
    #[serde(deserialize_with = "decimal")]
    pub protein: f64,
    #[serde(deserialize_with = "decimal")]
    pub carbs: f64,
    #[serde(deserialize_with = "decimal")]
    pub fat: f64,
    #[serde(deserialize_with = "decimal")]
    pub fiber: f64,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "optional_text")]
    pub goal_notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(match raw.as_str().map(|raw| raw.trim().to_ascii_lowercase()).as_deref() {
            Some("intermediate") => Difficulty::Intermediate,
            Some("advanced") => Difficulty::Advanced,
            _ => Difficulty::Beginner,
        })
    }
}

impl<'de> Deserialize<'de> for Ingredient {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Object(mut fields) => Ingredient {
                name: take_text(&mut fields, "name"),
                amount: take_text(&mut fields, "amount"),
                unit: take_text(&mut fields, "unit"),
                notes: take_optional_text(&mut fields, "notes"),
            },
            other => Ingredient {
                name: plain_text(other),
                ..Ingredient::default()
            },
        })
    }
}

impl<'de> Deserialize<'de> for Instruction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Object(mut fields) => Instruction {
                step: fields.remove("step").map(|step| to_whole_number(&step)).unwrap_or_default(),
                instruction: take_text(&mut fields, "instruction"),
                tip: take_optional_text(&mut fields, "tip"),
            },
            other => Instruction {
                instruction: plain_text(other),
                ..Instruction::default()
            },
        })
    }
}

impl Recipe {
    /// Total minutes to show for this recipe.
    ///
    /// `totalTime` wins whenever the generator filled it in; only a missing
    /// (zero) total falls back to `prepTime + cookTime`.
    pub fn effective_total_time(&self) -> u32 {
        if self.total_time > 0 {
            self.total_time
        } else {
            self.prep_time.saturating_add(self.cook_time)
        }
    }

    /// Reads whatever the generator produced. Anything that is not a JSON
    /// object yields an empty recipe.
    pub fn from_value(value: Value) -> Self {
        if !value.is_object() {
            warn!(kind = value_kind(&value), "recipe body is not a JSON object");
            return Recipe::default();
        }
        serde_json::from_value(value).unwrap_or_else(|err| {
            warn!(error = %err, "unreadable recipe body");
            Recipe::default()
        })
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).unwrap_or_default())
}

// A single value where a list belongs counts as a one-item list; items that
// cannot be read are dropped.
fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        Value::Null => Vec::new(),
        single => serde_json::from_value(single).into_iter().collect(),
    })
}

fn plain_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn take_text(fields: &mut Map<String, Value>, key: &str) -> String {
    fields.remove(key).map(plain_text).unwrap_or_default()
}

fn take_optional_text(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    fields.remove(key).and_then(|value| match value {
        Value::Null => None,
        other => Some(plain_text(other)),
    })
}

fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(plain_text(Value::deserialize(deserializer)?))
}

fn optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        other => Some(plain_text(other)),
    })
}

// Model output is loose about numbers: "20", 20.0 and null all show up.
fn to_decimal(value: &Value) -> f64 {
    let number = match value {
        Value::Number(number) => number.as_f64().unwrap_or_default(),
        Value::String(text) => text.trim().parse::<f64>().unwrap_or_default(),
        _ => 0.0,
    };
    if number.is_finite() && number > 0.0 { number } else { 0.0 }
}

fn to_whole_number(value: &Value) -> u32 {
    to_decimal(value).round().min(u32::MAX as f64) as u32
}

fn decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(to_decimal(&Value::deserialize(deserializer)?))
}

fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(to_whole_number(&Value::deserialize(deserializer)?))
}

const REQUIRED_TEXT: [&str; 3] = ["title", "description", "dinoCommentary"];
const REQUIRED_LISTS: [&str; 4] = ["ingredients", "instructions", "tips", "substitutions"];
const REQUIRED_NUMBERS: [&str; 4] = ["prepTime", "cookTime", "totalTime", "servings"];
const NUTRITION_NUMBERS: [&str; 5] = ["calories", "protein", "carbs", "fat", "fiber"];

/// Lists required recipe fields that are missing or have the wrong type.
/// An empty result means the value has the full recipe shape.
pub fn validate_shape(value: &Value) -> Vec<String> {
    let Some(object) = value.as_object() else {
        return vec!["recipe is not a JSON object".to_string()];
    };

    let mut problems = Vec::new();
    for key in REQUIRED_TEXT {
        if !object.get(key).is_some_and(Value::is_string) {
            problems.push(format!("{key}: expected text"));
        }
    }
    for key in REQUIRED_LISTS {
        if !object.get(key).is_some_and(Value::is_array) {
            problems.push(format!("{key}: expected list"));
        }
    }
    for key in REQUIRED_NUMBERS {
        if !object.get(key).is_some_and(Value::is_number) {
            problems.push(format!("{key}: expected number"));
        }
    }
    if object.get("servings").and_then(Value::as_f64).is_some_and(|servings| servings < 1.0) {
        problems.push("servings: expected a positive integer".to_string());
    }
    match object.get("difficulty").and_then(Value::as_str) {
        Some("beginner" | "intermediate" | "advanced") => {}
        _ => problems.push("difficulty: expected beginner, intermediate or advanced".to_string()),
    }
    match object.get("nutrition").and_then(Value::as_object) {
        Some(nutrition) => {
            for key in NUTRITION_NUMBERS {
                if !nutrition.get(key).is_some_and(Value::is_number) {
                    problems.push(format!("nutrition.{key}: expected number"));
                }
            }
        }
        None => problems.push("nutrition: expected object".to_string()),
    }
    problems
}
