pub mod nutritionist;

pub use nutritionist::NutritionistHandler;
