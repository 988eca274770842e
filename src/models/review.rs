// src/models/review.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Avaliação (uma por reserva)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub reservation_id: Uuid,
    #[schema(example = 5)]
    pub rating: i16,
    #[schema(example = "Ótimo!")]
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

// Avaliação como aparece no anúncio
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub guest_username: String,
    pub apartment_title: String,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl ReviewView {
    pub fn headline(&self) -> String {
        format!("Avaliação de {} para {}", self.guest_username, self.apartment_title)
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEntry {
    pub headline: String,
    #[serde(flatten)]
    pub review: ReviewView,
}

impl From<ReviewView> for ReviewEntry {
    fn from(review: ReviewView) -> Self {
        Self {
            headline: review.headline(),
            review,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReviewPayload {
    #[validate(range(min = 1, max = 5, message = "A nota deve ser de 1 a 5."))]
    #[schema(example = 5)]
    pub rating: i16,
    #[serde(default)]
    #[validate(length(max = 2000, message = "Comentário muito longo."))]
    pub comment: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headline() {
        let view = ReviewView {
            id: Uuid::new_v4(),
            reservation_id: Uuid::new_v4(),
            guest_username: "hospede_teste".into(),
            apartment_title: "Apartamento de Teste".into(),
            rating: 5,
            comment: "Ótimo!".into(),
            created_at: Utc::now(),
        };
        assert_eq!(view.headline(), "Avaliação de hospede_teste para Apartamento de Teste");
    }

    #[test]
    fn test_rating_range() {
        let ok = CreateReviewPayload { rating: 5, comment: String::new() };
        let low = CreateReviewPayload { rating: 0, comment: String::new() };
        let high = CreateReviewPayload { rating: 6, comment: String::new() };
        assert!(ok.validate().is_ok());
        assert!(low.validate().is_err());
        assert!(high.validate().is_err());
    }
}
