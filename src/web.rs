use serde::Serialize;

use crate::error::NutritionError;
use crate::models::{ActivityLevel, DietPreference, Scenario, UploadedFile, UserProfile};

/// What the front-end needs to render the form for one scenario.
#[derive(Debug, Serialize)]
pub struct ScenarioInfo {
    pub id: &'static str,
    pub label: &'static str,
    pub activity_levels: &'static [ActivityLevel],
    pub diet_preferences: &'static [DietPreference],
    pub goal_weight_loss: bool,
    pub goal_weight_gain: bool,
    pub nutrient_focus: bool,
}

impl From<Scenario> for ScenarioInfo {
    fn from(scenario: Scenario) -> Self {
        Self {
            id: scenario.id(),
            label: scenario.label(),
            activity_levels: scenario.activity_levels(),
            diet_preferences: scenario.diet_preferences(),
            goal_weight_loss: scenario.tracks_weight_loss(),
            goal_weight_gain: scenario.tracks_weight_gain(),
            nutrient_focus: scenario.tracks_nutrient_focus(),
        }
    }
}

/// Parses and validates a profile sent by the client. Unknown scenarios are
/// rejected here, before anything else looks at the profile.
pub fn parse_profile(body: &str) -> Result<UserProfile, NutritionError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| NutritionError::InvalidProfile(format!("malformed JSON: {}", e)))?;

    match value.get("scenario") {
        Some(serde_json::Value::String(s)) => {
            s.parse::<Scenario>()?;
        }
        Some(other) => return Err(NutritionError::UnknownScenario(other.to_string())),
        None => return Err(NutritionError::InvalidProfile("missing field `scenario`".to_string())),
    }

    let profile: UserProfile =
        serde_json::from_value(value).map_err(|e| NutritionError::InvalidProfile(e.to_string()))?;
    profile.validated()
}

pub mod server {
    use super::*;
    use std::sync::Arc;

    use axum::{
        extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use tower_http::cors::CorsLayer;

    use crate::handlers::NutritionistHandler;
    use crate::models::ModelResponse;

    pub struct AppState {
        pub handler: Arc<NutritionistHandler>,
        pub max_upload_bytes: usize,
    }

    type ApiResponse = (StatusCode, Json<ModelResponse>);

    pub fn create_router(handler: Arc<NutritionistHandler>, max_upload_bytes: usize) -> Router {
        let state = Arc::new(AppState {
            handler,
            max_upload_bytes,
        });

        Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_check))
            .route("/api/scenarios", get(scenarios_handler))
            .route("/api/analyze", post(analyze_handler))
            .route("/api/plan", post(plan_handler))
            // Leave room for the multipart framing and the profile field
            .layer(DefaultBodyLimit::max(max_upload_bytes.saturating_add(64 * 1024)))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    fn respond(result: Result<String, NutritionError>) -> ApiResponse {
        let status = match &result {
            Ok(_) => StatusCode::OK,
            Err(NutritionError::ImageTooLarge(_)) => StatusCode::PAYLOAD_TOO_LARGE,
            Err(e) if e.is_user_error() => StatusCode::BAD_REQUEST,
            Err(_) => StatusCode::BAD_GATEWAY,
        };
        (status, Json(ModelResponse::from(result)))
    }

    /// The body limit surfaces as a multipart read error; report it as an oversized image.
    fn upload_error(e: MultipartError, max_upload_bytes: usize) -> NutritionError {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            NutritionError::ImageTooLarge(max_upload_bytes)
        } else {
            NutritionError::InvalidProfile(format!("malformed upload: {}", e))
        }
    }

    async fn analyze_handler(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> ApiResponse {
        let mut profile_body: Option<String> = None;
        let mut upload: Option<UploadedFile> = None;

        loop {
            let field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                Err(e) => {
                    log::warn!("⚠️ Malformed multipart body: {}", e);
                    return respond(Err(upload_error(e, state.max_upload_bytes)));
                }
            };

            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("profile") => match field.text().await {
                    Ok(text) => profile_body = Some(text),
                    Err(e) => return respond(Err(upload_error(e, state.max_upload_bytes))),
                },
                Some("image") => {
                    let content_type = field.content_type().unwrap_or("").to_string();
                    let file_name = field.file_name().map(str::to_string);
                    match field.bytes().await {
                        Ok(data) if data.len() > state.max_upload_bytes => {
                            log::warn!(
                                "⚠️ Image upload of {} bytes exceeds the {} byte limit",
                                data.len(),
                                state.max_upload_bytes
                            );
                            return respond(Err(NutritionError::ImageTooLarge(state.max_upload_bytes)));
                        }
                        Ok(data) => {
                            upload = Some(UploadedFile {
                                content_type,
                                file_name,
                                data: data.to_vec(),
                            })
                        }
                        Err(e) => {
                            log::warn!("⚠️ Failed to read image field: {}", e);
                            return respond(Err(upload_error(e, state.max_upload_bytes)));
                        }
                    }
                }
                other => log::debug!("Ignoring multipart field {:?}", other),
            }
        }

        let profile = match profile_body.as_deref().map(parse_profile) {
            Some(Ok(profile)) => profile,
            Some(Err(e)) => {
                log::warn!("⚠️ Rejected profile: {}", e);
                return respond(Err(e));
            }
            None => {
                return respond(Err(NutritionError::InvalidProfile(
                    "missing `profile` field".to_string(),
                )))
            }
        };

        respond(state.handler.analyze_meal(&profile, upload).await)
    }

    async fn plan_handler(State(state): State<Arc<AppState>>, body: String) -> ApiResponse {
        let profile = match parse_profile(&body) {
            Ok(profile) => profile,
            Err(e) => {
                log::warn!("⚠️ Rejected profile: {}", e);
                return respond(Err(e));
            }
        };

        respond(state.handler.generate_meal_plan(&profile).await)
    }

    async fn scenarios_handler() -> Json<Vec<ScenarioInfo>> {
        Json(Scenario::ALL.into_iter().map(ScenarioInfo::from).collect())
    }

    async fn root_handler() -> &'static str {
        "AI Nutritionist - POST /api/analyze (multipart: profile, image) or /api/plan (JSON profile)"
    }

    async fn health_check() -> &'static str {
        "OK"
    }
}
