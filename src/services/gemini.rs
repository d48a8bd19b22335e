use anyhow::Result;
use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::ModelGateway;
use crate::error::NutritionError;
use crate::models::MealImage;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl From<&MealImage> for InlineData {
    fn from(image: &MealImage) -> Self {
        Self {
            mime_type: image.mime_type.as_str().to_string(),
            data: general_purpose::STANDARD.encode(&image.data),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub api_base: String,
    pub vision_model: String,
    pub text_model: String,
    pub max_output_tokens: u32,
    pub timeout: Duration,
}

/// Gemini `generateContent` client.
pub struct GeminiService {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiService {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn build_request(&self, prompt: &str, image_parts: &[MealImage], instruction: &str) -> GenerateRequest {
        let mut parts = vec![Part::Text {
            text: prompt.to_string(),
        }];
        parts.extend(image_parts.iter().map(|image| Part::InlineData {
            inline_data: image.into(),
        }));
        // The API rejects empty text parts
        if !instruction.is_empty() {
            parts.push(Part::Text {
                text: instruction.to_string(),
            });
        }

        GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.config.max_output_tokens,
            },
        }
    }

    async fn generate(&self, model: &str, request: &GenerateRequest) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            model
        );

        log::info!("🤖 Sending request to Gemini with model: {}", model);
        log::debug!("📤 Request payload size: {} bytes", serde_json::to_string(request)?.len());

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        log::debug!("📥 Gemini response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await?;
            log::error!("❌ Gemini API error ({}): {}", status, error_text);
            anyhow::bail!("Gemini API error ({}): {}", status, error_text);
        }

        let response_text = response.text().await?;
        log::debug!("📄 Raw Gemini response size: {} bytes", response_text.len());

        let text = extract_text(&response_text)?;
        log::info!("✅ Received {} characters from Gemini", text.len());
        Ok(text)
    }
}

fn extract_text(body: &str) -> Result<String> {
    let response: GenerateResponse = serde_json::from_str(body)?;

    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        anyhow::bail!("Gemini blocked the prompt: {}", reason);
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("Gemini returned no candidates"))?;

    let text = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.is_empty() {
        anyhow::bail!(
            "Gemini returned an empty response (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        );
    }

    Ok(text)
}

fn model_call_failed(e: anyhow::Error) -> NutritionError {
    NutritionError::ModelCallFailed(format!("{:#}", e))
}

#[async_trait::async_trait]
impl ModelGateway for GeminiService {
    async fn analyze_image(
        &self,
        prompt: &str,
        image_parts: &[MealImage],
        instruction: &str,
    ) -> crate::error::Result<String> {
        let request = self.build_request(prompt, image_parts, instruction);
        self.generate(&self.config.vision_model, &request)
            .await
            .map_err(model_call_failed)
    }

    async fn generate_plan(&self, prompt: &str) -> crate::error::Result<String> {
        let request = self.build_request(prompt, &[], "");
        self.generate(&self.config.text_model, &request)
            .await
            .map_err(model_call_failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageMime;

    fn service() -> GeminiService {
        service_at("https://generativelanguage.googleapis.com/v1beta")
    }

    fn service_at(api_base: &str) -> GeminiService {
        GeminiService::new(GeminiConfig {
            api_key: "test_key".to_string(),
            api_base: api_base.to_string(),
            vision_model: "vision".to_string(),
            text_model: "text".to_string(),
            max_output_tokens: 256,
            timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    #[test]
    fn test_analysis_request_layout() {
        let image = MealImage {
            mime_type: ImageMime::Png,
            data: vec![0x89, b'P', b'N', b'G', 0x00, 0xFF],
        };

        let request = service().build_request("Hello Alex, analyse", &[image.clone()], "");
        let json = serde_json::to_value(&request).unwrap();

        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["text"], "Hello Alex, analyse");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 256);

        let decoded = general_purpose::STANDARD
            .decode(parts[1]["inlineData"]["data"].as_str().unwrap())
            .unwrap();
        assert_eq!(decoded, image.data);
    }

    #[test]
    fn test_trailing_instruction_is_sent_when_present() {
        let request = service().build_request("prompt", &[], "be brief");
        let json = serde_json::to_value(&request).unwrap();

        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1]["text"], "be brief");
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let body = r#"{
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "1. Rice - 200 calories\n" }, { "text": "Total calories: 200" }] },
                "finishReason": "STOP"
            }]
        }"#;

        assert_eq!(extract_text(body).unwrap(), "1. Rice - 200 calories\nTotal calories: 200");
    }

    #[test]
    fn test_extract_text_reports_blocked_and_empty_responses() {
        let blocked = r#"{ "promptFeedback": { "blockReason": "SAFETY" } }"#;
        assert!(extract_text(blocked).unwrap_err().to_string().contains("SAFETY"));

        let empty = r#"{ "candidates": [{ "finishReason": "MAX_TOKENS" }] }"#;
        assert!(extract_text(empty).unwrap_err().to_string().contains("MAX_TOKENS"));

        assert!(extract_text("not json").is_err());
    }

    #[tokio::test]
    async fn test_transport_error_becomes_model_call_failed() {
        // Reserve a free port, then close it so the connection is refused
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = service_at(&format!("http://{}", addr)).generate_plan("plan please").await;

        match result {
            Err(NutritionError::ModelCallFailed(message)) => {
                assert!(message.contains("error sending request"), "got: {}", message);
                assert!(message.contains(&addr.to_string()), "got: {}", message);

                let shown = NutritionError::ModelCallFailed(message.clone()).to_string();
                assert_eq!(shown, format!("An error occurred: {}", message));
            }
            other => panic!("expected ModelCallFailed, got {:?}", other),
        }
    }
}
