use crate::error::Result;
use crate::models::MealImage;

/// Boundary to the generative model (Gemini, or a fake in tests).
#[async_trait::async_trait]
pub trait ModelGateway: Send + Sync {
    /// Sends the prompt, the image parts and a trailing instruction in one request.
    async fn analyze_image(
        &self,
        prompt: &str,
        image_parts: &[MealImage],
        instruction: &str,
    ) -> Result<String>;

    async fn generate_plan(&self, prompt: &str) -> Result<String>;
}
