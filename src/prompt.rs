use crate::goal::FoodGoal;

/// Persona prompt sent with every generation request. It carries the exact
/// JSON shape the model has to answer with.
pub const SYSTEM_PROMPT: &str = include_str!("../templates/system_prompt.txt");

pub fn build_user_prompt(ingredients: &[String], goal: FoodGoal, cooking_time: u32) -> String {
    let ingredient_list = ingredients.join(", ");
    let slug = goal.as_str();
    format!(
        "Create a recipe using these ingredients: {ingredient_list}.\n\
\n\
The user's food goal is: {slug} ({description}).\n\
Available cooking time: {cooking_time} minutes total.\n\
\n\
Requirements:\n\
- Use mainly the provided ingredients (you can assume they have basic pantry staples like salt, pepper, oil)\n\
- Keep total time under {cooking_time} minutes\n\
- Optimize for their {slug} goal\n\
- Make it beginner-friendly with clear instructions\n\
- Include Rex's personality in the commentary and instructions\n\
- Provide accurate nutrition estimates\n\
- Suggest substitutions for any harder-to-find ingredients",
        description = goal.description(),
    )
}

/// Removes a markdown code fence wrapped around model output, if any.
///
/// Accepts both a ```` ```json ```` opener (any case) and a bare ```` ``` ````.
/// Backticks inside the payload are left alone.
pub fn strip_code_fences(content: &str) -> &str {
    let mut body = content.trim();
    if let Some(rest) = body.strip_prefix("```") {
        body = match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        };
    }
    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_carries_schema() {
        assert!(SYSTEM_PROMPT.contains("You are Rex"));
        assert!(SYSTEM_PROMPT.contains("\"dinoCommentary\""));
        assert!(SYSTEM_PROMPT.contains("\"goalNotes\""));
        assert!(SYSTEM_PROMPT.contains("no markdown, no code blocks"));
    }

    #[test]
    fn user_prompt_interpolates_request() {
        let prompt = build_user_prompt(
            &["egg".to_string(), "rice".to_string()],
            FoodGoal::Bulking,
            30,
        );
        assert!(prompt.starts_with("Create a recipe using these ingredients: egg, rice."));
        assert!(prompt.contains(
            "The user's food goal is: bulking (high calories, high protein, high carbs for muscle gain)."
        ));
        assert!(prompt.contains("Available cooking time: 30 minutes total."));
        assert!(prompt.contains("- Keep total time under 30 minutes"));
        assert!(prompt.contains("- Optimize for their bulking goal"));
    }

    #[test]
    fn strips_json_fence() {
        let fenced = "```json\n{\"title\": \"Dino Rice\"}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"title\": \"Dino Rice\"}");
    }

    #[test]
    fn strips_bare_and_uppercase_fences() {
        assert_eq!(strip_code_fences("```\n{}\n```\n"), "{}");
        assert_eq!(strip_code_fences("```JSON {\"a\":1} ```"), "{\"a\":1}");
    }

    #[test]
    fn unfenced_content_is_only_trimmed() {
        assert_eq!(strip_code_fences("  {\"a\": \"```\"}  \n"), "{\"a\": \"```\"}");
    }

    #[test]
    fn fenced_and_plain_parse_identically() {
        let plain = r#"{"title":"Egg Fried Rice","servings":2}"#;
        let fenced = format!("```json\n{plain}\n```");
        let a: serde_json::Value = serde_json::from_str(strip_code_fences(plain)).unwrap();
        let b: serde_json::Value = serde_json::from_str(strip_code_fences(&fenced)).unwrap();
        assert_eq!(a, b);
    }
}
