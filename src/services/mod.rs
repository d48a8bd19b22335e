pub mod ai_service;
pub mod composer;
pub mod gemini; // Google Gemini generateContent client
pub mod image;
pub mod prompts;

pub use ai_service::ModelGateway;
pub use gemini::{GeminiConfig, GeminiService};
