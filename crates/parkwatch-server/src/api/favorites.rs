use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{run_favorites, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct FavoriteChange {
    pub name: String,
    pub changed: bool,
}

pub(super) async fn list_favorites(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let favorites = run_favorites(&state, &req_id.0, |store| Ok(store.load())).await?;
    Ok(Json(ApiResponse::new(favorites.names().to_vec(), req_id.0)))
}

pub(super) async fn add_favorite(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<FavoriteChange>>, ApiError> {
    let name = validate_name(&req_id.0, &name)?;
    let changed = {
        let name = name.clone();
        run_favorites(&state, &req_id.0, move |store| store.add(&name)).await?
    };
    tracing::info!(name = %name, changed, "favorite added");
    Ok(Json(ApiResponse::new(FavoriteChange { name, changed }, req_id.0)))
}

pub(super) async fn remove_favorite(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<FavoriteChange>>, ApiError> {
    let name = validate_name(&req_id.0, &name)?;
    let changed = {
        let name = name.clone();
        run_favorites(&state, &req_id.0, move |store| store.remove(&name)).await?
    };
    tracing::info!(name = %name, changed, "favorite removed");
    Ok(Json(ApiResponse::new(FavoriteChange { name, changed }, req_id.0)))
}

fn validate_name(request_id: &str, name: &str) -> Result<String, ApiError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::new(
            request_id,
            "validation_error",
            "favorite name must not be blank",
        ));
    }
    Ok(trimmed.to_string())
}
