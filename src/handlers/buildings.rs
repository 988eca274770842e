// src/handlers/buildings.rs

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        pagination::{Page, PageQuery},
    },
    config::AppState,
    handlers::upload::{read_image, UploadForm},
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermBuildingAdd, PermBuildingChange, PermBuildingDelete, RequirePermission},
    },
    models::building::{Building, BuildingDetail, CreateBuildingPayload, UpdateBuildingPayload},
};

// GET /api/buildings
#[utoipa::path(
    get,
    path = "/api/buildings",
    tag = "Buildings",
    params(PageQuery),
    responses(
        (status = 200, description = "Prédios em ordem alfabética, 10 por página", body = Page<Building>)
    )
)]
pub async fn list_buildings(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = app_state
        .catalog_service
        .list_buildings(query.page)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(page))
}

// GET /api/buildings/{id}
#[utoipa::path(
    get,
    path = "/api/buildings/{id}",
    tag = "Buildings",
    params(("id" = Uuid, Path, description = "ID do prédio")),
    responses(
        (status = 200, description = "Prédio e suas unidades", body = BuildingDetail),
        (status = 404, description = "Prédio não encontrado")
    )
)]
pub async fn get_building(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<Json<BuildingDetail>, ApiError> {
    let detail = app_state
        .catalog_service
        .get_building(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(detail))
}

// GET /api/cities
#[utoipa::path(
    get,
    path = "/api/cities",
    tag = "Buildings",
    responses(
        (status = 200, description = "Cidades com apartamentos disponíveis", body = Vec<String>)
    )
)]
pub async fn list_cities(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<Vec<String>>, ApiError> {
    let cities = app_state
        .catalog_service
        .list_cities()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(cities))
}

// POST /api/buildings
#[utoipa::path(
    post,
    path = "/api/buildings",
    tag = "Buildings",
    request_body = CreateBuildingPayload,
    responses(
        (status = 201, description = "Prédio cadastrado", body = Building),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Sem a permissão building:add"),
        (status = 409, description = "Nome já usado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_building(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermBuildingAdd>,
    Json(payload): Json<CreateBuildingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let building = app_state
        .catalog_service
        .create_building(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(building)))
}

// PUT /api/buildings/{id}
#[utoipa::path(
    put,
    path = "/api/buildings/{id}",
    tag = "Buildings",
    params(("id" = Uuid, Path, description = "ID do prédio")),
    request_body = UpdateBuildingPayload,
    responses(
        (status = 200, description = "Prédio atualizado", body = Building),
        (status = 403, description = "Não é o proprietário"),
        (status = 404, description = "Prédio não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_building(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermBuildingChange>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBuildingPayload>,
) -> Result<Json<Building>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let building = app_state
        .catalog_service
        .update_building(&user, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(building))
}

// DELETE /api/buildings/{id}
#[utoipa::path(
    delete,
    path = "/api/buildings/{id}",
    tag = "Buildings",
    params(("id" = Uuid, Path, description = "ID do prédio")),
    responses(
        (status = 204, description = "Prédio e unidades removidos"),
        (status = 403, description = "Não é o proprietário"),
        (status = 404, description = "Prédio não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_building(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermBuildingDelete>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .catalog_service
        .delete_building(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/buildings/{id}/facade
#[utoipa::path(
    post,
    path = "/api/buildings/{id}/facade",
    tag = "Buildings",
    params(("id" = Uuid, Path, description = "ID do prédio")),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Foto da fachada trocada", body = Building),
        (status = 403, description = "Não é o proprietário"),
        (status = 415, description = "Formato de imagem não suportado")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_facade(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermBuildingChange>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<Building>, ApiError> {
    let upload = read_image(multipart)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let building = app_state
        .catalog_service
        .upload_facade_photo(&user, id, &upload.file_name, &upload.bytes)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(building))
}
