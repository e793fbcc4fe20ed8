use axum::{
    extract::{Query, State},
    Extension, Json,
};
use parkwatch_core::{
    aggregate, filter_available_only, filter_by_substring, rank, FacilitySummary, FavoriteSet,
    ParkingRecord,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{run_favorites, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct ParkingQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub q: Option<String>,
    #[serde(default)]
    pub available_only: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct RefreshQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(super) struct FacilityItem {
    #[serde(flatten)]
    pub summary: FacilitySummary,
    pub favorite: bool,
}

/// `GET /api/v1/parking`: acquire at an explicit coordinate, or reuse the
/// last snapshot when none is given.
pub(super) async fn list_parking(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ParkingQuery>,
) -> Result<Json<ApiResponse<Vec<FacilityItem>>>, ApiError> {
    let coordinate = resolve_coordinate(&req_id.0, params.lat, params.lon)?;

    let records = {
        let mut pipeline = state.pipeline.lock().await;
        match coordinate {
            Some((lat, lon)) => pipeline.acquire(lat, lon).await,
            None if pipeline.last().is_some() => pipeline.last_records().to_vec(),
            None => {
                pipeline
                    .acquire(state.config.default_lat, state.config.default_lon)
                    .await
            }
        }
    };

    let favorites = run_favorites(&state, &req_id.0, |store| Ok(store.load())).await?;
    let items = present(&records, &favorites, params.q.as_deref(), params.available_only);
    Ok(Json(ApiResponse::new(items, req_id.0)))
}

/// `POST /api/v1/parking/refresh`: live acquisition that never answers from
/// the cache.
pub(super) async fn refresh_parking(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<RefreshQuery>,
) -> Result<Json<ApiResponse<Vec<FacilityItem>>>, ApiError> {
    let (lat, lon) = resolve_coordinate(&req_id.0, params.lat, params.lon)?
        .unwrap_or((state.config.default_lat, state.config.default_lon));

    let records = state.pipeline.lock().await.refresh(lat, lon).await;

    let favorites = run_favorites(&state, &req_id.0, |store| Ok(store.load())).await?;
    let items = present(&records, &favorites, None, false);
    Ok(Json(ApiResponse::new(items, req_id.0)))
}

fn resolve_coordinate(
    request_id: &str,
    lat: Option<f64>,
    lon: Option<f64>,
) -> Result<Option<(f64, f64)>, ApiError> {
    match (lat, lon) {
        (None, None) => Ok(None),
        (Some(lat), Some(lon)) => {
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                return Err(ApiError::new(
                    request_id,
                    "validation_error",
                    "lat must be within [-90, 90] and lon within [-180, 180]",
                ));
            }
            Ok(Some((lat, lon)))
        }
        _ => Err(ApiError::new(
            request_id,
            "validation_error",
            "lat and lon must be given together",
        )),
    }
}

fn present(
    records: &[ParkingRecord],
    favorites: &FavoriteSet,
    search: Option<&str>,
    available_only: bool,
) -> Vec<FacilityItem> {
    let mut summaries = rank(aggregate(records), favorites);
    if let Some(text) = search {
        summaries = filter_by_substring(&summaries, text);
    }
    if available_only {
        summaries = filter_available_only(&summaries);
    }

    summaries
        .into_iter()
        .map(|summary| FacilityItem {
            favorite: favorites.contains(&summary.name),
            summary,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_coordinate_requires_both_or_neither() {
        assert!(matches!(resolve_coordinate("r", None, None), Ok(None)));
        assert!(matches!(
            resolve_coordinate("r", Some(25.0), Some(121.0)),
            Ok(Some(_))
        ));
        assert!(resolve_coordinate("r", None, Some(121.0)).is_err());
        assert!(resolve_coordinate("r", Some(25.0), Some(200.0)).is_err());
    }
}
