use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    routing::get,
    Json, Router,
};

use codecamp_core::SpeakerId;

use crate::app::dto::SpeakerModel;
use crate::app::errors::{ApiError, ApiResult};
use crate::app::mapper;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/api/speakers", get(list_speakers))
        .route("/api/speakers/:id", get(get_speaker))
        .route("/api/camps/:moniker/speakers", get(list_camp_speakers))
}

pub async fn list_speakers(
    Extension(services): Extension<Arc<AppServices>>,
) -> ApiResult<Json<Vec<SpeakerModel>>> {
    let speakers = services.repository.get_all_speakers().await?;
    Ok(Json(speakers.iter().map(mapper::speaker_to_model).collect()))
}

pub async fn get_speaker(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<Json<SpeakerModel>> {
    let speaker_id: SpeakerId = id.parse()?;
    let speaker = services
        .repository
        .get_speaker(speaker_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Could not find speaker {speaker_id}")))?;
    Ok(Json(mapper::speaker_to_model(&speaker)))
}

pub async fn list_camp_speakers(
    Extension(services): Extension<Arc<AppServices>>,
    Path(moniker): Path<String>,
) -> ApiResult<Json<Vec<SpeakerModel>>> {
    let speakers = services.repository.get_speakers_by_moniker(&moniker).await?;
    if speakers.is_empty() {
        return Err(ApiError::not_found("No speakers found"));
    }
    Ok(Json(speakers.iter().map(mapper::speaker_to_model).collect()))
}
