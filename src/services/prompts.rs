use crate::models::Scenario;

const WEIGHT_LOSS_PROMPT: &str = "You are an expert in nutrition where you need to see the food items from the image,
calculate the total calories, and determine if the meal is appropriate for weight loss.
Provide the details of each food item with calorie intake and indicate if the meal is appropriate for weight loss in the following format:
1. Item 1 - no of calories
2. Item 2 - no of calories
Total calories: X

Is the meal appropriate for weight loss: Yes, appropriate calories/No, need more calories
";

const DIABETES_PROMPT: &str = "You are an expert in diabetes management where you need to see the food items from the image,
calculate the total carbohydrates, and determine if the meal is appropriate for diabetes management.
Provide the details of each food item with carbohydrate content and indicate if the meal is appropriate for diabetes management in the following format:
1. Item 1 - carbs grams, glycemic index
2. Item 2 - carbs grams, glycemic index
Total carbohydrates: X grams

Is the meal appropriate for diabetes management: Yes, appropriate calories/No, need more calories
";

const MUSCLE_BUILDING_PROMPT: &str = "You are an expert in muscle-building nutrition where you need to see the food items from the image,
calculate the total protein intake, and determine if the meal is appropriate for muscle building.
Provide the details of each food item with protein content and indicate if the meal is appropriate for muscle building in the following format:
1. Item 1 - protein grams
2. Item 2 - protein grams
Total protein: X grams

Is the meal appropriate for muscle building: Yes, appropriate calories/No, need more calories
";

/// Analysis instructions sent along with the meal photo.
pub fn template(scenario: Scenario) -> &'static str {
    match scenario {
        Scenario::WeightLoss => WEIGHT_LOSS_PROMPT,
        Scenario::DiabetesManagement => DIABETES_PROMPT,
        Scenario::MuscleBuilding => MUSCLE_BUILDING_PROMPT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_scenario_has_total_and_verdict_lines() {
        for scenario in Scenario::ALL {
            let prompt = template(scenario);
            assert!(!prompt.is_empty());

            assert!(
                prompt.lines().any(|line| line.starts_with("Total ") && line.contains(": X")),
                "missing total line for {}",
                scenario
            );
            assert!(
                prompt.lines().any(|line| line.starts_with("Is the meal appropriate for ")
                    && line.contains(": Yes, ")
                    && line.contains("/No, ")),
                "missing verdict line for {}",
                scenario
            );
        }
    }

    #[test]
    fn test_templates_are_scenario_specific() {
        assert!(template(Scenario::WeightLoss).contains("Total calories: X"));
        assert!(template(Scenario::DiabetesManagement).contains("glycemic index"));
        assert!(template(Scenario::MuscleBuilding).contains("Total protein: X grams"));
    }
}
