// src/handlers/apartments.rs

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
        pagination::Page,
    },
    config::AppState,
    handlers::upload::{read_image, UploadForm},
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermApartmentAdd, PermApartmentChange, PermApartmentDelete, RequirePermission},
    },
    models::{
        apartment::{
            Apartment, ApartmentDetail, ApartmentFilter, ApartmentListEntry, ApartmentPhoto,
            CreateApartmentPayload, UpdateApartmentPayload,
        },
        review::ReviewEntry,
    },
};

// GET /api/apartments?city=...&page=...
#[utoipa::path(
    get,
    path = "/api/apartments",
    tag = "Apartments",
    params(ApartmentFilter),
    responses(
        (status = 200, description = "Unidades disponíveis, 9 por página", body = Page<ApartmentListEntry>)
    )
)]
pub async fn list_apartments(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<ApartmentFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let page = app_state
        .catalog_service
        .list_apartments(filter.city.as_deref(), filter.page)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(page))
}

// GET /api/apartments/{id}
#[utoipa::path(
    get,
    path = "/api/apartments/{id}",
    tag = "Apartments",
    params(("id" = Uuid, Path, description = "ID do apartamento")),
    responses(
        (status = 200, description = "Anúncio completo", body = ApartmentDetail),
        (status = 404, description = "Apartamento não encontrado")
    )
)]
pub async fn get_apartment(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<Json<ApartmentDetail>, ApiError> {
    let detail = app_state
        .catalog_service
        .get_apartment(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(detail))
}

// GET /api/apartments/{id}/reviews
#[utoipa::path(
    get,
    path = "/api/apartments/{id}/reviews",
    tag = "Reviews",
    params(("id" = Uuid, Path, description = "ID do apartamento")),
    responses(
        (status = 200, description = "Avaliações, mais recentes primeiro", body = Vec<ReviewEntry>)
    )
)]
pub async fn list_reviews(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ReviewEntry>>, ApiError> {
    let reviews = app_state
        .review_service
        .list_for_apartment(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(reviews))
}

// POST /api/buildings/{id}/apartments
#[utoipa::path(
    post,
    path = "/api/buildings/{id}/apartments",
    tag = "Apartments",
    params(("id" = Uuid, Path, description = "ID do prédio")),
    request_body = CreateApartmentPayload,
    responses(
        (status = 201, description = "Unidade cadastrada", body = Apartment),
        (status = 400, description = "Dados inválidos ou comodidade inexistente"),
        (status = 404, description = "Prédio não encontrado"),
        (status = 409, description = "Identificador já usado neste prédio")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_apartment(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermApartmentAdd>,
    Path(building_id): Path<Uuid>,
    Json(payload): Json<CreateApartmentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let apartment = app_state
        .catalog_service
        .create_apartment(&user, building_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(apartment)))
}

// PUT /api/apartments/{id}
#[utoipa::path(
    put,
    path = "/api/apartments/{id}",
    tag = "Apartments",
    params(("id" = Uuid, Path, description = "ID do apartamento")),
    request_body = UpdateApartmentPayload,
    responses(
        (status = 200, description = "Unidade atualizada", body = Apartment),
        (status = 403, description = "Não é o proprietário"),
        (status = 404, description = "Apartamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_apartment(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermApartmentChange>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateApartmentPayload>,
) -> Result<Json<Apartment>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let apartment = app_state
        .catalog_service
        .update_apartment(&user, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(apartment))
}

// DELETE /api/apartments/{id}
#[utoipa::path(
    delete,
    path = "/api/apartments/{id}",
    tag = "Apartments",
    params(("id" = Uuid, Path, description = "ID do apartamento")),
    responses(
        (status = 204, description = "Unidade removida"),
        (status = 403, description = "Não é o proprietário"),
        (status = 404, description = "Apartamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_apartment(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermApartmentDelete>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .catalog_service
        .delete_apartment(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/apartments/{id}/main-photo
#[utoipa::path(
    post,
    path = "/api/apartments/{id}/main-photo",
    tag = "Apartments",
    params(("id" = Uuid, Path, description = "ID do apartamento")),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Foto principal trocada", body = Apartment),
        (status = 403, description = "Não é o proprietário"),
        (status = 415, description = "Formato de imagem não suportado")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_main_photo(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermApartmentChange>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<Apartment>, ApiError> {
    let upload = read_image(multipart)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let apartment = app_state
        .catalog_service
        .upload_main_photo(&user, id, &upload.file_name, &upload.bytes)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(apartment))
}

// POST /api/apartments/{id}/photos
#[utoipa::path(
    post,
    path = "/api/apartments/{id}/photos",
    tag = "Apartments",
    params(("id" = Uuid, Path, description = "ID do apartamento")),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Foto adicionada à galeria", body = ApartmentPhoto),
        (status = 403, description = "Não é o proprietário"),
        (status = 415, description = "Formato de imagem não suportado")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_photo(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermApartmentChange>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let upload = read_image(multipart)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let photo = app_state
        .catalog_service
        .add_photo(&user, id, &upload.file_name, &upload.bytes, upload.caption.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(photo)))
}

// DELETE /api/apartments/{id}/photos/{photo_id}
#[utoipa::path(
    delete,
    path = "/api/apartments/{id}/photos/{photo_id}",
    tag = "Apartments",
    params(
        ("id" = Uuid, Path, description = "ID do apartamento"),
        ("photo_id" = Uuid, Path, description = "ID da foto")
    ),
    responses(
        (status = 204, description = "Foto removida"),
        (status = 403, description = "Não é o proprietário"),
        (status = 404, description = "Foto não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_photo(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermApartmentChange>,
    Path((id, photo_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    app_state
        .catalog_service
        .delete_photo(&user, id, photo_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
