use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    common::i18n::I18nStore,
    middleware::i18n::Locale,
    models::reservation::{ReservationStatus, StayPeriodError},
};

// Erros de domínio. Os serviços e repositórios só conhecem este tipo;
// a tradução para HTTP acontece em `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Período de estadia inválido: {0:?}")]
    InvalidStayPeriod(StayPeriodError),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Nome de usuário já existe")]
    UsernameAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Permissão negada: {0}")]
    PermissionDenied(String),

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Conflito de datas com outra reserva")]
    ReservationConflict,

    #[error("Apartamento indisponível para reserva")]
    ApartmentUnavailable,

    #[error("Proprietário não pode reservar a própria unidade")]
    OwnReservation,

    #[error("Transição de status inválida: {from:?} -> {to:?}")]
    InvalidStatusTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },

    #[error("Avaliação não permitida: {0}")]
    ReviewNotAllowed(String),

    #[error("Reserva já avaliada")]
    ReviewAlreadyExists,

    #[error("Comodidades inexistentes")]
    UnknownAmenities,

    #[error("Upload inválido: {0}")]
    InvalidUpload(String),

    #[error("Tipo de arquivo não suportado: {0}")]
    UnsupportedMediaType(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// O erro que efetivamente sai pela API.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    /// Converte o erro de domínio no erro HTTP, com a mensagem no idioma pedido.
    pub fn to_api_error(&self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();
        let simple = |status: StatusCode, key: &str, params: &[(&str, &str)]| ApiError {
            status,
            error: i18n.translate(lang, key, params),
            details: None,
        };

        match self {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(m) => m.to_string(),
                            None => i18n.translate(lang, &format!("validation.{}", e.code), &[]),
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: i18n.translate(lang, "error.validation", &[]),
                    details: Some(json!(details)),
                }
            }
            AppError::InvalidStayPeriod(reason) => {
                let mut details = serde_json::Map::new();
                details.insert(
                    reason.field().to_string(),
                    json!([i18n.translate(lang, reason.message_key(), &[])]),
                );
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: i18n.translate(lang, "error.validation", &[]),
                    details: Some(Value::Object(details)),
                }
            }
            AppError::EmailAlreadyExists => simple(StatusCode::CONFLICT, "error.email_exists", &[]),
            AppError::UsernameAlreadyExists => simple(StatusCode::CONFLICT, "error.username_exists", &[]),
            AppError::InvalidCredentials => simple(StatusCode::UNAUTHORIZED, "error.invalid_credentials", &[]),
            AppError::InvalidToken => simple(StatusCode::UNAUTHORIZED, "error.invalid_token", &[]),
            AppError::UserNotFound => simple(StatusCode::NOT_FOUND, "error.user_not_found", &[]),
            AppError::ResourceNotFound(what) => {
                simple(StatusCode::NOT_FOUND, "error.not_found", &[("resource", what.as_str())])
            }
            AppError::PermissionDenied(action) => {
                simple(StatusCode::FORBIDDEN, "error.permission_denied", &[("action", action.as_str())])
            }
            AppError::UniqueConstraintViolation(msg) => ApiError {
                status: StatusCode::CONFLICT,
                error: msg.clone(),
                details: None,
            },
            AppError::ReservationConflict => simple(StatusCode::CONFLICT, "error.reservation_conflict", &[]),
            AppError::ApartmentUnavailable => simple(StatusCode::CONFLICT, "error.apartment_unavailable", &[]),
            AppError::OwnReservation => simple(StatusCode::CONFLICT, "error.own_reservation", &[]),
            AppError::InvalidStatusTransition { from, to } => simple(
                StatusCode::CONFLICT,
                "error.invalid_transition",
                &[("from", from.as_str()), ("to", to.as_str())],
            ),
            AppError::ReviewNotAllowed(reason) => {
                simple(StatusCode::CONFLICT, "error.review_not_allowed", &[("reason", reason.as_str())])
            }
            AppError::ReviewAlreadyExists => simple(StatusCode::CONFLICT, "error.review_exists", &[]),
            AppError::UnknownAmenities => simple(StatusCode::BAD_REQUEST, "error.unknown_amenities", &[]),
            AppError::InvalidUpload(reason) => {
                simple(StatusCode::BAD_REQUEST, "error.invalid_upload", &[("reason", reason.as_str())])
            }
            AppError::UnsupportedMediaType(ext) => {
                simple(StatusCode::UNSUPPORTED_MEDIA_TYPE, "error.unsupported_media", &[("ext", ext.as_str())])
            }

            // O resto vira 500. O detalhe vai para o log, nunca para o cliente.
            e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                simple(StatusCode::INTERNAL_SERVER_ERROR, "error.internal", &[])
            }
        }
    }
}

// Converte erro de chave única do Postgres na mensagem amigável informada.
pub(crate) fn map_unique_violation(e: sqlx::Error, message: &str) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::UniqueConstraintViolation(message.to_string());
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn store() -> I18nStore {
        I18nStore::load().expect("catálogos embutidos devem ser válidos")
    }

    fn pt() -> Locale {
        Locale("pt".to_string())
    }

    #[test]
    fn test_status_codes() {
        let i18n = store();
        let cases = vec![
            (AppError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AppError::InvalidToken, StatusCode::UNAUTHORIZED),
            (AppError::PermissionDenied("aprovar".into()), StatusCode::FORBIDDEN),
            (AppError::ResourceNotFound("Reserva".into()), StatusCode::NOT_FOUND),
            (AppError::ReservationConflict, StatusCode::CONFLICT),
            (AppError::ReviewAlreadyExists, StatusCode::CONFLICT),
            (
                AppError::InvalidStayPeriod(StayPeriodError::CheckInInPast),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::UnsupportedMediaType("exe".into()), StatusCode::UNSUPPORTED_MEDIA_TYPE),
            (AppError::InternalServerError(anyhow::anyhow!("boom")), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.to_api_error(&pt(), &i18n).status, expected, "{:?}", err);
        }
    }

    #[test]
    fn test_internal_error_does_not_leak_details() {
        let api = AppError::InternalServerError(anyhow::anyhow!("senha do banco: hunter2"))
            .to_api_error(&pt(), &store());
        assert!(!api.error.contains("hunter2"));
    }

    #[test]
    fn test_stay_period_error_points_to_field() {
        let api = AppError::InvalidStayPeriod(StayPeriodError::CheckOutNotAfterCheckIn)
            .to_api_error(&pt(), &store());
        let details = api.details.expect("deve ter detalhes");
        assert!(details.get("checkOut").is_some());
    }

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 3, message = "curto demais"))]
        name: String,
    }

    #[test]
    fn test_validation_details_keep_field_messages() {
        let errors = Sample { name: "a".into() }.validate().unwrap_err();
        let api = AppError::ValidationError(errors).to_api_error(&pt(), &store());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.details.unwrap()["name"][0], "curto demais");
    }
}
