use std::sync::Arc;

use crate::error::Result;
use crate::models::{UploadedFile, UserProfile};
use crate::services::composer::{compose_analysis, compose_plan};
use crate::services::image::input_image_setup;
use crate::services::ModelGateway;

pub struct NutritionistHandler {
    gateway: Arc<dyn ModelGateway>,
}

impl NutritionistHandler {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self { gateway }
    }

    /// "Analyze Meal": requires a photo, fails before calling the model otherwise.
    pub async fn analyze_meal(&self, profile: &UserProfile, upload: Option<UploadedFile>) -> Result<String> {
        log::info!("📸 Analyze request from {} ({})", profile.name, profile.scenario);

        let image_parts = match input_image_setup(upload) {
            Ok(parts) => parts,
            Err(e) => {
                log::warn!("⚠️ Rejected meal upload: {}", e);
                return Err(e);
            }
        };

        let request = compose_analysis(profile, image_parts);
        let response = self
            .gateway
            .analyze_image(&request.prompt, &request.image_parts, &request.instruction)
            .await;

        match &response {
            Ok(_) => log::info!("✅ Meal analysis ready for {}", profile.name),
            Err(e) => log::error!("❌ Meal analysis failed: {}", e),
        }
        response
    }

    /// "Generate Meal Plan": text only.
    pub async fn generate_meal_plan(&self, profile: &UserProfile) -> Result<String> {
        log::info!("🍽️ Meal plan request from {} ({})", profile.name, profile.scenario);

        let request = compose_plan(profile);
        let response = self.gateway.generate_plan(&request.prompt).await;

        match &response {
            Ok(_) => log::info!("✅ Meal plan ready for {}", profile.name),
            Err(e) => log::error!("❌ Meal plan generation failed: {}", e),
        }
        response
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::NutritionError;
    use crate::models::{DietPreference, ImageMime, MealImage, ModelResponse, Scenario};
    use crate::services::prompts;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records every call and answers with a canned reply or error.
    #[derive(Default)]
    pub(crate) struct FakeGateway {
        pub calls: AtomicUsize,
        pub prompts: Mutex<Vec<String>>,
        pub images: Mutex<Vec<MealImage>>,
        pub fail_with: Option<String>,
    }

    impl FakeGateway {
        pub(crate) fn failing(message: &str) -> Self {
            Self {
                fail_with: Some(message.to_string()),
                ..Default::default()
            }
        }

        fn reply(&self, prompt: &str, reply: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.fail_with {
                Some(message) => Err(NutritionError::ModelCallFailed(message.clone())),
                None => Ok(reply.to_string()),
            }
        }
    }

    #[async_trait::async_trait]
    impl ModelGateway for FakeGateway {
        async fn analyze_image(
            &self,
            prompt: &str,
            image_parts: &[MealImage],
            _instruction: &str,
        ) -> Result<String> {
            self.images.lock().unwrap().extend_from_slice(image_parts);
            self.reply(prompt, "Total calories: 420")
        }

        async fn generate_plan(&self, prompt: &str) -> Result<String> {
            self.reply(prompt, "Breakfast: oats")
        }
    }

    fn jpeg_upload() -> UploadedFile {
        UploadedFile {
            content_type: "image/jpeg".to_string(),
            file_name: Some("meal.jpg".to_string()),
            data: vec![0xFF, 0xD8, 0xFF, 0xE0, 0x01, 0x02, 0xFF, 0xD9],
        }
    }

    #[tokio::test]
    async fn test_analyze_without_image_never_calls_gateway() {
        let gateway = Arc::new(FakeGateway::default());
        let handler = NutritionistHandler::new(gateway.clone());
        let profile = UserProfile::new("Alex", Scenario::WeightLoss);

        let result = handler.analyze_meal(&profile, None).await;

        assert!(matches!(result, Err(NutritionError::NoImageProvided)));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_analyze_sends_greeting_template_and_image() {
        let gateway = Arc::new(FakeGateway::default());
        let handler = NutritionistHandler::new(gateway.clone());
        let profile = UserProfile::new("Alex", Scenario::WeightLoss);

        let response = handler.analyze_meal(&profile, Some(jpeg_upload())).await.unwrap();

        assert_eq!(response, "Total calories: 420");
        let prompts_sent = gateway.prompts.lock().unwrap();
        assert_eq!(
            prompts_sent[0],
            format!("Hello Alex, {}", prompts::template(Scenario::WeightLoss))
        );
        let images = gateway.images.lock().unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].mime_type, ImageMime::Jpeg);
        assert_eq!(images[0].data, jpeg_upload().data);
    }

    #[tokio::test]
    async fn test_plan_uses_profile_fields() {
        let gateway = Arc::new(FakeGateway::default());
        let handler = NutritionistHandler::new(gateway.clone());
        let mut profile = UserProfile::new("Alex", Scenario::DiabetesManagement);
        profile.age = 30;
        profile.diet_preference = Some(DietPreference::LowCarb);

        let response = handler.generate_meal_plan(&profile).await.unwrap();

        assert_eq!(response, "Breakfast: oats");
        let prompts_sent = gateway.prompts.lock().unwrap();
        assert!(prompts_sent[0].contains("Health Goal: Managing Diabetes"));
        assert!(gateway.images.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_plan_failure_is_displayable() {
        let gateway = Arc::new(FakeGateway::failing("dns error: no such host"));
        let handler = NutritionistHandler::new(gateway);
        let profile = UserProfile::new("Alex", Scenario::MuscleBuilding);

        let result = handler.generate_meal_plan(&profile).await;
        assert!(matches!(result, Err(NutritionError::ModelCallFailed(_))));

        match ModelResponse::from(result) {
            ModelResponse::Error { error } => assert!(error.contains("dns error: no such host")),
            other => panic!("expected an error response, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_analysis_failure_uses_same_error_kind() {
        let gateway = Arc::new(FakeGateway::failing("Gemini API error (500)"));
        let handler = NutritionistHandler::new(gateway);
        let profile = UserProfile::new("Alex", Scenario::WeightLoss);

        let result = handler.analyze_meal(&profile, Some(jpeg_upload())).await;

        assert!(matches!(result, Err(NutritionError::ModelCallFailed(ref m)) if m.contains("500")));
    }
}
