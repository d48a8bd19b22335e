use thiserror::Error;

/// Errors surfaced to the user by the analyze and meal plan actions.
#[derive(Debug, Error)]
pub enum NutritionError {
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("No file uploaded")]
    NoImageProvided,

    #[error("Unsupported image type: {0} (expected image/jpeg or image/png)")]
    UnsupportedImageType(String),

    #[error("Image too large: the limit is {0} bytes")]
    ImageTooLarge(usize),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("An error occurred: {0}")]
    ModelCallFailed(String),
}

impl NutritionError {
    /// True for errors caused by the request itself rather than the model service.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, NutritionError::ModelCallFailed(_))
    }
}

pub type Result<T> = std::result::Result<T, NutritionError>;
