// src/handlers/amenities.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermAmenityAdd, RequirePermission},
    },
    models::apartment::{Amenity, CreateAmenityPayload},
};

// GET /api/amenities
#[utoipa::path(
    get,
    path = "/api/amenities",
    tag = "Amenities",
    responses((status = 200, description = "Comodidades em ordem alfabética", body = Vec<Amenity>))
)]
pub async fn list_amenities(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<Vec<Amenity>>, ApiError> {
    let amenities = app_state
        .catalog_service
        .list_amenities()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(amenities))
}

// POST /api/amenities
#[utoipa::path(
    post,
    path = "/api/amenities",
    tag = "Amenities",
    request_body = CreateAmenityPayload,
    responses(
        (status = 201, description = "Comodidade criada", body = Amenity),
        (status = 403, description = "Sem a permissão amenity:add"),
        (status = 409, description = "Nome já usado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_amenity(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermAmenityAdd>,
    Json(payload): Json<CreateAmenityPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let amenity = app_state
        .catalog_service
        .create_amenity(&payload.name)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(amenity)))
}
