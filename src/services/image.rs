use crate::error::{NutritionError, Result};
use crate::models::{ImageMime, MealImage, UploadedFile};

/// Turns the uploaded meal photo into the image parts sent to the model.
///
/// The model call takes a list of parts; only one image is ever sent.
pub fn input_image_setup(upload: Option<UploadedFile>) -> Result<Vec<MealImage>> {
    let upload = match upload {
        Some(file) if !file.data.is_empty() => file,
        _ => return Err(NutritionError::NoImageProvided),
    };

    let mime_type = ImageMime::from_content_type(&upload.content_type)
        .or_else(|| upload.file_name.as_deref().and_then(ImageMime::from_file_name))
        .ok_or_else(|| NutritionError::UnsupportedImageType(upload.content_type.clone()))?;

    log::debug!("📊 Image upload: {} bytes ({})", upload.data.len(), mime_type);

    Ok(vec![MealImage {
        mime_type,
        data: upload.data,
    }])
}
