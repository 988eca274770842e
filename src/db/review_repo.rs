// src/db/review_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::review::{CreateReviewPayload, Review, ReviewView},
};

#[derive(Clone)]
pub struct ReviewRepository {
    pool: PgPool,
}

impl ReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, reservation_id: Uuid, input: &CreateReviewPayload) -> Result<Review, AppError> {
        sqlx::query_as::<_, Review>(
            "INSERT INTO reviews (reservation_id, rating, comment) VALUES ($1, $2, $3) \
             RETURNING id, reservation_id, rating, comment, created_at",
        )
        .bind(reservation_id)
        .bind(input.rating)
        .bind(&input.comment)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            // Uma avaliação por reserva (reviews.reservation_id é UNIQUE)
            Some(db_err) if db_err.is_unique_violation() => AppError::ReviewAlreadyExists,
            _ => e.into(),
        })
    }

    pub async fn list_for_apartment(&self, apartment_id: Uuid) -> Result<Vec<ReviewView>, AppError> {
        let reviews = sqlx::query_as::<_, ReviewView>(
            r#"
            SELECT rv.id, rv.reservation_id, u.username AS guest_username,
                   a.title AS apartment_title, rv.rating, rv.comment, rv.created_at
            FROM reviews rv
            JOIN reservations r ON r.id = rv.reservation_id
            JOIN apartments a ON a.id = r.apartment_id
            JOIN users u ON u.id = r.guest_id
            WHERE r.apartment_id = $1
            ORDER BY rv.created_at DESC
            "#,
        )
        .bind(apartment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }
}
