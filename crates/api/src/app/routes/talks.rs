use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use codecamp_core::TalkId;
use codecamp_infra::ChangeSet;

use crate::app::dto::{deserialize_flag, TalkModel};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::extract::{ValidJson, ValidQuery};
use crate::app::mapper;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route(
            "/api/camps/:moniker/talks",
            get(list_talks).post(create_talk),
        )
        .route("/api/camps/:moniker/talks/:id", get(get_talk).put(update_talk))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TalkQuery {
    #[serde(default, alias = "IncludeSpeakers", deserialize_with = "deserialize_flag")]
    pub include_speakers: bool,
}

pub async fn list_talks(
    Extension(services): Extension<Arc<AppServices>>,
    Path(moniker): Path<String>,
    ValidQuery(query): ValidQuery<TalkQuery>,
) -> ApiResult<Json<Vec<TalkModel>>> {
    let talks = services
        .repository
        .get_talks_by_moniker(&moniker, query.include_speakers)
        .await?;
    if talks.is_empty() {
        return Err(ApiError::not_found("No talks found"));
    }
    Ok(Json(talks.iter().map(mapper::talk_to_model).collect()))
}

pub async fn get_talk(
    Extension(services): Extension<Arc<AppServices>>,
    Path((moniker, id)): Path<(String, String)>,
    ValidQuery(query): ValidQuery<TalkQuery>,
) -> ApiResult<Json<TalkModel>> {
    let talk_id: TalkId = id.parse()?;
    let talk = services
        .repository
        .get_talk_by_moniker(&moniker, talk_id, query.include_speakers)
        .await?
        .ok_or_else(|| ApiError::not_found("Could not find the talk"))?;
    Ok(Json(mapper::talk_to_model(&talk)))
}

pub async fn create_talk(
    Extension(services): Extension<Arc<AppServices>>,
    Path(moniker): Path<String>,
    ValidJson(model): ValidJson<TalkModel>,
) -> ApiResult<Response> {
    let camp = services
        .repository
        .get_camp(&moniker, false)
        .await?
        .ok_or_else(|| ApiError::validation("Camp does not exist"))?;

    let speaker_id = model
        .speaker
        .as_ref()
        .map(|s| s.speaker_id)
        .ok_or_else(|| ApiError::validation("Speaker ID is required"))?;
    let speaker = services
        .repository
        .get_speaker(speaker_id)
        .await?
        .ok_or_else(|| ApiError::validation("Speaker could not be found"))?;

    let mut talk = mapper::talk_from_model(model);
    talk.assign_camp(camp.camp_id);
    talk.attach_speaker(speaker);

    let mut changes = ChangeSet::new();
    changes.add(talk);
    let commit = services.repository.save_changes(changes).await?;

    let Some(created) = commit.added_talks().next().filter(|_| commit.succeeded()) else {
        return Err(ApiError::commit("Failed to save new talk"));
    };
    tracing::info!(talk_id = %created.talk_id, %moniker, "talk created");

    let body = Json(mapper::talk_to_model(created));
    Ok(match services.links.talk(&moniker, created.talk_id) {
        Some(location) => (StatusCode::CREATED, [(header::LOCATION, location)], body).into_response(),
        None => (StatusCode::CREATED, body).into_response(),
    })
}

pub async fn update_talk(
    Extension(services): Extension<Arc<AppServices>>,
    Path((moniker, id)): Path<(String, String)>,
    ValidJson(model): ValidJson<TalkModel>,
) -> ApiResult<Json<TalkModel>> {
    let talk_id: TalkId = id.parse()?;
    let mut talk = services
        .repository
        .get_talk_by_moniker(&moniker, talk_id, true)
        .await?
        .ok_or_else(|| ApiError::not_found("Could not find the talk"))?;

    // An unknown speaker leaves the current one in place.
    if let Some(speaker_id) = model.speaker.as_ref().map(|s| s.speaker_id) {
        match services.repository.get_speaker(speaker_id).await? {
            Some(speaker) => talk.attach_speaker(speaker),
            None => tracing::debug!(%speaker_id, "speaker not found; keeping current speaker"),
        }
    }
    mapper::apply_talk_model(model, &mut talk);

    let mut changes = ChangeSet::new();
    changes.update(talk.clone());
    let commit = services.repository.save_changes(changes).await?;
    if !commit.succeeded() {
        return Err(ApiError::commit("Failed to update talk"));
    }

    tracing::info!(%talk_id, %moniker, "talk updated");
    Ok(Json(mapper::talk_to_model(&talk)))
}
