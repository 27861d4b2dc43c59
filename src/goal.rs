use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Nutrition goal chosen by the user, used to steer the generation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FoodGoal {
    MuscleBuilding,
    HighProtein,
    LowCalorie,
    #[default]
    Balanced,
    Cutting,
    Bulking,
    GeneralHealth,
}

impl FoodGoal {
    pub const ALL: [FoodGoal; 7] = [
        FoodGoal::MuscleBuilding,
        FoodGoal::HighProtein,
        FoodGoal::LowCalorie,
        FoodGoal::Balanced,
        FoodGoal::Cutting,
        FoodGoal::Bulking,
        FoodGoal::GeneralHealth,
    ];

    /// Resolves a goal slug. Anything unrecognised, including an empty
    /// string, falls back to `Balanced`.
    pub fn resolve(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "muscle-building" => FoodGoal::MuscleBuilding,
            "high-protein" => FoodGoal::HighProtein,
            "low-calorie" => FoodGoal::LowCalorie,
            "balanced" => FoodGoal::Balanced,
            "cutting" => FoodGoal::Cutting,
            "bulking" => FoodGoal::Bulking,
            "general-health" => FoodGoal::GeneralHealth,
            _ => FoodGoal::Balanced,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FoodGoal::MuscleBuilding => "muscle-building",
            FoodGoal::HighProtein => "high-protein",
            FoodGoal::LowCalorie => "low-calorie",
            FoodGoal::Balanced => "balanced",
            FoodGoal::Cutting => "cutting",
            FoodGoal::Bulking => "bulking",
            FoodGoal::GeneralHealth => "general-health",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FoodGoal::MuscleBuilding => "Muscle Building",
            FoodGoal::HighProtein => "High Protein",
            FoodGoal::LowCalorie => "Low Calorie",
            FoodGoal::Balanced => "Balanced Diet",
            FoodGoal::Cutting => "Cutting",
            FoodGoal::Bulking => "Bulking",
            FoodGoal::GeneralHealth => "General Health",
        }
    }

    /// Phrase interpolated into the user prompt.
    pub fn description(&self) -> &'static str {
        match self {
            FoodGoal::MuscleBuilding => "high protein, moderate carbs for muscle growth and recovery",
            FoodGoal::HighProtein => "maximizing protein content while keeping calories reasonable",
            FoodGoal::LowCalorie => "keeping calories low while still being satisfying and nutritious",
            FoodGoal::Balanced => "a well-rounded balance of macros for general health",
            FoodGoal::Cutting => "high protein, low carb, low fat for fat loss while preserving muscle",
            FoodGoal::Bulking => "high calories, high protein, high carbs for muscle gain",
            FoodGoal::GeneralHealth => "nutrient-dense, wholesome ingredients for overall wellness",
        }
    }
}

impl std::fmt::Display for FoodGoal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FoodGoal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FoodGoal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(FoodGoal::resolve(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_goal_resolves_from_its_slug() {
        for goal in FoodGoal::ALL {
            assert_eq!(FoodGoal::resolve(goal.as_str()), goal);
        }
    }

    #[test]
    fn unknown_goal_falls_back_to_balanced() {
        assert_eq!(FoodGoal::resolve("moon-diet"), FoodGoal::Balanced);
        assert_eq!(FoodGoal::resolve(""), FoodGoal::Balanced);
        assert_eq!(
            FoodGoal::resolve("moon-diet").description(),
            FoodGoal::Balanced.description()
        );
    }

    #[test]
    fn labels_are_distinct_display_names() {
        assert_eq!(FoodGoal::MuscleBuilding.label(), "Muscle Building");
        assert_eq!(FoodGoal::Balanced.label(), "Balanced Diet");
        let mut labels: Vec<_> = FoodGoal::ALL.iter().map(FoodGoal::label).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), FoodGoal::ALL.len());
    }

    #[test]
    fn resolve_ignores_case_and_whitespace() {
        assert_eq!(FoodGoal::resolve("  Bulking "), FoodGoal::Bulking);
    }

    #[test]
    fn serializes_as_slug() {
        let json = serde_json::to_string(&FoodGoal::GeneralHealth).unwrap();
        assert_eq!(json, "\"general-health\"");
        let parsed: FoodGoal = serde_json::from_str("\"cutting\"").unwrap();
        assert_eq!(parsed, FoodGoal::Cutting);
    }
}
