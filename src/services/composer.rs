use crate::models::{AnalysisRequest, MealImage, PlanRequest, UserProfile};
use crate::services::prompts;

const NOT_SPECIFIED: &str = "Not specified";

/// Greets the user by name and appends the scenario's analysis template.
/// The image is what the model analyses; other profile fields are not sent.
pub fn compose_analysis(profile: &UserProfile, image_parts: Vec<MealImage>) -> AnalysisRequest {
    AnalysisRequest {
        prompt: format!("Hello {}, {}", profile.name, prompts::template(profile.scenario)),
        image_parts,
        instruction: String::new(),
    }
}

pub fn compose_plan(profile: &UserProfile) -> PlanRequest {
    let diet = profile
        .diet_preference
        .map(|d| d.to_string())
        .unwrap_or_else(|| NOT_SPECIFIED.to_string());
    let activity = profile
        .activity_level
        .map(|a| a.to_string())
        .unwrap_or_else(|| NOT_SPECIFIED.to_string());

    let mut prompt = format!(
        "You are an expert nutritionist. Here is the information about the user:\n\
         Name: {}\n\
         Age: {}\n\
         Health Goal: {}\n\
         Dietary Preference: {}\n\
         Activity Level: {}\n",
        profile.name,
        profile.age,
        profile.scenario.label(),
        diet,
        activity
    );

    if let Some(pounds) = profile.goal_weight_loss {
        prompt.push_str(&format!("Goal Weight Loss: {} pounds\n", pounds));
    }
    if let Some(pounds) = profile.goal_weight_gain {
        prompt.push_str(&format!("Goal Weight Gain: {} pounds\n", pounds));
    }
    prompt.push_str(&format!("Daily Calorie Goal: {} kcal\n", profile.calorie_goal));
    if !profile.nutrient_focus.is_empty() {
        let focus = profile
            .nutrient_focus
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        prompt.push_str(&format!("Nutrient Focus: {}\n", focus));
    }

    prompt.push_str("\nPlease generate a meal plan that fits their requirements and goals.\n");

    PlanRequest { prompt }
}
