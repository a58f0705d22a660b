use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use codecamp_infra::{ChangeSet, RepositoryError};

use crate::app::dto::{deserialize_flag, parse_event_date, CampModel};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::extract::{ValidJson, ValidQuery};
use crate::app::mapper;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/api/camps", get(list_camps).post(create_camp))
        .route("/api/camps/search", get(search_camps))
        .route(
            "/api/camps/:moniker",
            get(get_camp).put(update_camp).delete(delete_camp),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampQuery {
    #[serde(default, alias = "IncludeTalks", deserialize_with = "deserialize_flag")]
    pub include_talks: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default, alias = "TheDate")]
    pub the_date: Option<String>,
    #[serde(default, alias = "IncludeTalks", deserialize_with = "deserialize_flag")]
    pub include_talks: bool,
}

pub async fn list_camps(
    Extension(services): Extension<Arc<AppServices>>,
    ValidQuery(query): ValidQuery<CampQuery>,
) -> ApiResult<Json<Vec<CampModel>>> {
    let camps = services.repository.get_all_camps(query.include_talks).await?;
    Ok(Json(camps.iter().map(mapper::camp_to_model).collect()))
}

pub async fn get_camp(
    Extension(services): Extension<Arc<AppServices>>,
    Path(moniker): Path<String>,
    ValidQuery(query): ValidQuery<CampQuery>,
) -> ApiResult<Json<CampModel>> {
    let camp = services
        .repository
        .get_camp(&moniker, query.include_talks)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Could not find camp with moniker {moniker}")))?;
    Ok(Json(mapper::camp_to_model(&camp)))
}

pub async fn search_camps(
    Extension(services): Extension<Arc<AppServices>>,
    ValidQuery(query): ValidQuery<SearchQuery>,
) -> ApiResult<Json<Vec<CampModel>>> {
    let raw = query
        .the_date
        .ok_or_else(|| ApiError::validation("theDate is required"))?;
    let date = parse_event_date(&raw)
        .ok_or_else(|| ApiError::validation(format!("theDate {raw:?} is not a valid date")))?;

    let camps = services
        .repository
        .get_camps_by_event_date(date, query.include_talks)
        .await?;
    if camps.is_empty() {
        return Err(ApiError::not_found(format!("No camps found on {date}")));
    }
    Ok(Json(camps.iter().map(mapper::camp_to_model).collect()))
}

pub async fn create_camp(
    Extension(services): Extension<Arc<AppServices>>,
    ValidJson(model): ValidJson<CampModel>,
) -> ApiResult<Response> {
    if services.repository.get_camp(&model.moniker, false).await?.is_some() {
        return Err(moniker_in_use());
    }

    let location = services
        .links
        .camp(&model.moniker)
        .ok_or_else(|| ApiError::validation("Could not use current moniker"))?;

    let mut changes = ChangeSet::new();
    changes.add(mapper::camp_from_model(model));
    let commit = services
        .repository
        .save_changes(changes)
        .await
        .map_err(conflict_as_moniker_in_use)?;

    match commit.added_camps().next() {
        Some(camp) if commit.succeeded() => {
            tracing::info!(camp_id = %camp.camp_id, moniker = %camp.moniker, "camp created");
            Ok((
                StatusCode::CREATED,
                [(header::LOCATION, location)],
                Json(mapper::camp_to_model(camp)),
            )
                .into_response())
        }
        _ => Err(ApiError::commit("Could not save new camp")),
    }
}

pub async fn update_camp(
    Extension(services): Extension<Arc<AppServices>>,
    Path(moniker): Path<String>,
    ValidJson(model): ValidJson<CampModel>,
) -> ApiResult<Json<CampModel>> {
    let mut camp = services
        .repository
        .get_camp(&moniker, false)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Could not find camp with moniker {moniker}")))?;

    mapper::apply_camp_model(model, &mut camp);

    let mut changes = ChangeSet::new();
    changes.update(camp.clone());
    let commit = services
        .repository
        .save_changes(changes)
        .await
        .map_err(conflict_as_moniker_in_use)?;
    if !commit.succeeded() {
        return Err(ApiError::commit("Could not update camp"));
    }

    tracing::info!(camp_id = %camp.camp_id, moniker = %camp.moniker, "camp updated");
    Ok(Json(mapper::camp_to_model(&camp)))
}

pub async fn delete_camp(
    Extension(services): Extension<Arc<AppServices>>,
    Path(moniker): Path<String>,
) -> ApiResult<StatusCode> {
    let camp = services
        .repository
        .get_camp(&moniker, false)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Could not find camp with moniker {moniker}")))?;

    let camp_id = camp.camp_id;
    let mut changes = ChangeSet::new();
    changes.delete(camp);
    let commit = services.repository.save_changes(changes).await?;
    if !commit.succeeded() {
        return Err(ApiError::commit("Could not delete camp"));
    }

    tracing::info!(%camp_id, %moniker, rows = commit.rows_affected(), "camp deleted");
    Ok(StatusCode::OK)
}

fn moniker_in_use() -> ApiError {
    ApiError::validation("Moniker already in use")
}

// Another request may claim the moniker between the lookup and the commit.
fn conflict_as_moniker_in_use(err: RepositoryError) -> ApiError {
    match err {
        RepositoryError::Conflict(_) => moniker_in_use(),
        other => ApiError::Store(other),
    }
}
