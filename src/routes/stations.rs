//! Station endpoints.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::auth::AuthMaterial;
use crate::common::AppState;
use crate::error::{ApiError, ApiResult};
use crate::services::stations;

use super::valid_ref;

#[derive(Debug, Deserialize)]
pub struct CreateStationRequest {
    name: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    altitude: Option<f64>,
}

/// `POST /stations` — create a station, gated by the owner's quota.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthMaterial,
    body: Bytes,
) -> ApiResult<Response> {
    let req: CreateStationRequest =
        serde_json::from_slice(&body).map_err(|_| ApiError::InvalidParams)?;

    let (Some(lat), Some(lon)) = (req.lat, req.lon) else {
        return Err(ApiError::InvalidParams);
    };
    let altitude = req.altitude.unwrap_or(0.0);

    let station =
        stations::create(&state, req.name.as_deref(), lon, lat, altitude, &auth).await?;
    Ok((StatusCode::CREATED, Json(station)).into_response())
}

/// `GET /stations` — public listing.
pub async fn list(State(state): State<AppState>) -> ApiResult<Response> {
    let list = stations::list(&state, None).await?;
    Ok((StatusCode::OK, Json(list)).into_response())
}

/// `GET /stations/{station}` — single station by UUID or name.
pub async fn list_one(
    State(state): State<AppState>,
    Path(station): Path<String>,
) -> ApiResult<Response> {
    if !valid_ref(&station) {
        return Err(ApiError::NotFound);
    }
    let found = stations::list(&state, Some(&station)).await?;
    Ok((StatusCode::OK, Json(found)).into_response())
}
