use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::NutritionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Scenario {
    #[serde(rename = "Weight Loss Journey")]
    WeightLoss,
    #[serde(rename = "Managing Diabetes")]
    DiabetesManagement,
    #[serde(rename = "Building Muscle")]
    MuscleBuilding,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [
        Scenario::WeightLoss,
        Scenario::DiabetesManagement,
        Scenario::MuscleBuilding,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Scenario::WeightLoss => "weight_loss",
            Scenario::DiabetesManagement => "diabetes_management",
            Scenario::MuscleBuilding => "muscle_building",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Scenario::WeightLoss => "Weight Loss Journey",
            Scenario::DiabetesManagement => "Managing Diabetes",
            Scenario::MuscleBuilding => "Building Muscle",
        }
    }

    /// Activity levels offered for this scenario. Empty when the scenario does not ask for one.
    pub fn activity_levels(&self) -> &'static [ActivityLevel] {
        match self {
            Scenario::WeightLoss => &[ActivityLevel::Low, ActivityLevel::Moderate, ActivityLevel::High],
            Scenario::DiabetesManagement => &[],
            Scenario::MuscleBuilding => &[
                ActivityLevel::Moderate,
                ActivityLevel::High,
                ActivityLevel::VeryHigh,
            ],
        }
    }

    pub fn diet_preferences(&self) -> &'static [DietPreference] {
        match self {
            Scenario::WeightLoss => &[
                DietPreference::Vegetarian,
                DietPreference::NonVegetarian,
                DietPreference::Vegan,
            ],
            Scenario::DiabetesManagement => &[
                DietPreference::LowCarb,
                DietPreference::Balanced,
                DietPreference::Other,
            ],
            Scenario::MuscleBuilding => &[
                DietPreference::HighProtein,
                DietPreference::Balanced,
                DietPreference::Other,
            ],
        }
    }

    pub fn tracks_weight_loss(&self) -> bool {
        matches!(self, Scenario::WeightLoss)
    }

    pub fn tracks_weight_gain(&self) -> bool {
        matches!(self, Scenario::MuscleBuilding)
    }

    pub fn tracks_nutrient_focus(&self) -> bool {
        matches!(self, Scenario::MuscleBuilding)
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Scenario {
    type Err = NutritionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Scenario::ALL
            .into_iter()
            .find(|scenario| {
                scenario.label().eq_ignore_ascii_case(trimmed)
                    || scenario.id().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| NutritionError::UnknownScenario(trimmed.to_string()))
    }
}

// Same rules as `FromStr`, so every accepted spelling parses the same way.
impl<'de> Deserialize<'de> for Scenario {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityLevel {
    Low,
    Moderate,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl std::fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ActivityLevel::Low => "Low",
            ActivityLevel::Moderate => "Moderate",
            ActivityLevel::High => "High",
            ActivityLevel::VeryHigh => "Very High",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DietPreference {
    Vegetarian,
    #[serde(rename = "Non-Vegetarian")]
    NonVegetarian,
    Vegan,
    #[serde(rename = "Low-Carb")]
    LowCarb,
    Balanced,
    #[serde(rename = "High-Protein")]
    HighProtein,
    Other,
}

impl std::fmt::Display for DietPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DietPreference::Vegetarian => "Vegetarian",
            DietPreference::NonVegetarian => "Non-Vegetarian",
            DietPreference::Vegan => "Vegan",
            DietPreference::LowCarb => "Low-Carb",
            DietPreference::Balanced => "Balanced",
            DietPreference::HighProtein => "High-Protein",
            DietPreference::Other => "Other",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NutrientFocus {
    Protein,
    Carbs,
    Fats,
    Vitamins,
    Minerals,
}

impl std::fmt::Display for NutrientFocus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub const AGE_RANGE: std::ops::RangeInclusive<u32> = 1..=100;
pub const CALORIE_GOAL_RANGE: std::ops::RangeInclusive<u32> = 500..=3000;

fn default_name() -> String {
    "User".to_string()
}

fn default_age() -> u32 {
    28
}

fn default_calorie_goal() -> u32 {
    1500
}

const DEFAULT_GOAL_WEIGHT_LOSS: u32 = 15;
const DEFAULT_GOAL_WEIGHT_GAIN: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_age")]
    pub age: u32,
    pub scenario: Scenario,
    #[serde(default)]
    pub goal_weight_loss: Option<u32>, // pounds, WeightLoss only
    #[serde(default)]
    pub goal_weight_gain: Option<u32>, // pounds, MuscleBuilding only
    #[serde(default)]
    pub activity_level: Option<ActivityLevel>,
    #[serde(default)]
    pub diet_preference: Option<DietPreference>,
    #[serde(default = "default_calorie_goal")]
    pub calorie_goal: u32,
    #[serde(default)]
    pub nutrient_focus: Vec<NutrientFocus>,
}

impl UserProfile {
    /// Profile with the same defaults the form starts with.
    #[cfg(test)]
    pub fn new(name: impl Into<String>, scenario: Scenario) -> Self {
        Self {
            name: name.into(),
            age: default_age(),
            scenario,
            goal_weight_loss: scenario.tracks_weight_loss().then_some(DEFAULT_GOAL_WEIGHT_LOSS),
            goal_weight_gain: scenario.tracks_weight_gain().then_some(DEFAULT_GOAL_WEIGHT_GAIN),
            activity_level: None,
            diet_preference: None,
            calorie_goal: default_calorie_goal(),
            nutrient_focus: Vec::new(),
        }
    }

    /// Checks bounds and scenario-specific choices, fills the form's default
    /// goal weight for the scenario, and drops the fields that do not apply.
    pub fn validated(mut self) -> Result<Self, NutritionError> {
        let scenario = self.scenario;

        if self.name.trim().is_empty() {
            self.name = default_name();
        }
        if !AGE_RANGE.contains(&self.age) {
            return Err(NutritionError::InvalidProfile(format!(
                "age must be between {} and {}, got {}",
                AGE_RANGE.start(),
                AGE_RANGE.end(),
                self.age
            )));
        }
        if !CALORIE_GOAL_RANGE.contains(&self.calorie_goal) {
            return Err(NutritionError::InvalidProfile(format!(
                "daily calorie goal must be between {} and {}, got {}",
                CALORIE_GOAL_RANGE.start(),
                CALORIE_GOAL_RANGE.end(),
                self.calorie_goal
            )));
        }

        if scenario.tracks_weight_loss() {
            self.goal_weight_loss.get_or_insert(DEFAULT_GOAL_WEIGHT_LOSS);
        } else {
            self.goal_weight_loss = None;
        }
        if scenario.tracks_weight_gain() {
            self.goal_weight_gain.get_or_insert(DEFAULT_GOAL_WEIGHT_GAIN);
        } else {
            self.goal_weight_gain = None;
        }
        if !scenario.tracks_nutrient_focus() {
            self.nutrient_focus.clear();
        }
        if let Some(0) = self.goal_weight_loss.or(self.goal_weight_gain) {
            return Err(NutritionError::InvalidProfile(
                "goal weight must be at least 1 pound".to_string(),
            ));
        }

        let activity_levels = scenario.activity_levels();
        if activity_levels.is_empty() {
            self.activity_level = None;
        } else if let Some(level) = self.activity_level {
            if !activity_levels.contains(&level) {
                return Err(NutritionError::InvalidProfile(format!(
                    "activity level '{}' is not available for {}",
                    level, scenario
                )));
            }
        }

        if let Some(diet) = self.diet_preference {
            if !scenario.diet_preferences().contains(&diet) {
                return Err(NutritionError::InvalidProfile(format!(
                    "diet preference '{}' is not available for {}",
                    diet, scenario
                )));
            }
        }

        let mut seen = Vec::with_capacity(self.nutrient_focus.len());
        self.nutrient_focus.retain(|focus| {
            if seen.contains(focus) {
                false
            } else {
                seen.push(*focus);
                true
            }
        });

        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMime {
    Jpeg,
    Png,
}

impl ImageMime {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Png => "image/png",
        }
    }

    pub fn from_content_type(content_type: &str) -> Option<Self> {
        // Ignore parameters such as "; charset=binary"
        let essence = content_type.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(ImageMime::Jpeg),
            "image/png" => Some(ImageMime::Png),
            _ => None,
        }
    }

    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let lower = file_name.to_ascii_lowercase();
        if lower.ends_with(".png") {
            Some(ImageMime::Png)
        } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
            Some(ImageMime::Jpeg)
        } else {
            None
        }
    }
}

impl std::fmt::Display for ImageMime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file as received from the client, before it is checked.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub content_type: String,
    pub file_name: Option<String>,
    pub data: Vec<u8>,
}

/// Meal photo as handed to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealImage {
    pub mime_type: ImageMime,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub prompt: String,
    pub image_parts: Vec<MealImage>,
    pub instruction: String,
}

#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub prompt: String,
}

/// Result of a model call, ready to be shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ModelResponse {
    Text { response: String },
    Error { error: String },
}

impl From<Result<String, NutritionError>> for ModelResponse {
    fn from(result: Result<String, NutritionError>) -> Self {
        match result {
            Ok(response) => ModelResponse::Text { response },
            Err(e) => ModelResponse::Error { error: e.to_string() },
        }
    }
}
