// src/handlers/reservations.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermReservationAdd, RequirePermission},
    },
    models::{
        reservation::{CreateReservationPayload, Reservation, ReservationView, StatusChangeResponse},
        review::{CreateReviewPayload, Review},
    },
};

fn status_ok(reservation: Reservation) -> Json<StatusChangeResponse> {
    Json(StatusChangeResponse {
        status: "ok".to_string(),
        reservation,
    })
}

// POST /api/apartments/{id}/reservations
#[utoipa::path(
    post,
    path = "/api/apartments/{id}/reservations",
    tag = "Reservations",
    params(("id" = Uuid, Path, description = "ID do apartamento")),
    request_body = CreateReservationPayload,
    responses(
        (status = 201, description = "Reserva pedida (PENDING)", body = Reservation),
        (status = 400, description = "Período inválido"),
        (status = 404, description = "Apartamento não encontrado"),
        (status = 409, description = "Datas em conflito, unidade indisponível ou do próprio usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_reservation(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermReservationAdd>,
    Path(apartment_id): Path<Uuid>,
    Json(payload): Json<CreateReservationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let reservation = app_state
        .reservation_service
        .create(&user, apartment_id, payload.check_in, payload.check_out)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(reservation)))
}

// GET /api/reservations ("minhas reservas")
#[utoipa::path(
    get,
    path = "/api/reservations",
    tag = "Reservations",
    responses(
        (status = 200, description = "Reservas do usuário como hóspede, mais recentes primeiro", body = Vec<ReservationView>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_my_reservations(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<ReservationView>>, ApiError> {
    let reservations = app_state
        .reservation_service
        .list_mine(&user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(reservations))
}

// GET /api/reservations/{id}
#[utoipa::path(
    get,
    path = "/api/reservations/{id}",
    tag = "Reservations",
    params(("id" = Uuid, Path, description = "ID da reserva")),
    responses(
        (status = 200, description = "Detalhe da reserva", body = ReservationView),
        (status = 403, description = "Nem hóspede nem proprietário"),
        (status = 404, description = "Reserva não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_reservation(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationView>, ApiError> {
    let reservation = app_state
        .reservation_service
        .detail(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(reservation))
}

// POST /api/reservations/{id}/approve
#[utoipa::path(
    post,
    path = "/api/reservations/{id}/approve",
    tag = "Reservations",
    params(("id" = Uuid, Path, description = "ID da reserva")),
    responses(
        (status = 200, description = "Reserva confirmada", body = StatusChangeResponse),
        (status = 403, description = "Só o proprietário aprova"),
        (status = 409, description = "A reserva não está pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_reservation(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusChangeResponse>, ApiError> {
    let reservation = app_state
        .reservation_service
        .approve(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(status_ok(reservation))
}

// POST /api/reservations/{id}/reject
#[utoipa::path(
    post,
    path = "/api/reservations/{id}/reject",
    tag = "Reservations",
    params(("id" = Uuid, Path, description = "ID da reserva")),
    responses(
        (status = 200, description = "Reserva recusada", body = StatusChangeResponse),
        (status = 403, description = "Só o proprietário recusa"),
        (status = 409, description = "A reserva não está pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_reservation(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusChangeResponse>, ApiError> {
    let reservation = app_state
        .reservation_service
        .reject(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(status_ok(reservation))
}

// POST /api/reservations/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/reservations/{id}/cancel",
    tag = "Reservations",
    params(("id" = Uuid, Path, description = "ID da reserva")),
    responses(
        (status = 200, description = "Reserva cancelada pelo hóspede", body = StatusChangeResponse),
        (status = 403, description = "Só o hóspede cancela"),
        (status = 409, description = "A reserva já está cancelada")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_reservation(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusChangeResponse>, ApiError> {
    let reservation = app_state
        .reservation_service
        .cancel(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(status_ok(reservation))
}

// POST /api/reservations/{id}/review
#[utoipa::path(
    post,
    path = "/api/reservations/{id}/review",
    tag = "Reviews",
    params(("id" = Uuid, Path, description = "ID da reserva")),
    request_body = CreateReviewPayload,
    responses(
        (status = 201, description = "Avaliação registrada", body = Review),
        (status = 403, description = "Só o hóspede avalia"),
        (status = 409, description = "Reserva não confirmada, estadia não terminada ou já avaliada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_review(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateReviewPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let review = app_state
        .review_service
        .create(&user, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(review)))
}
