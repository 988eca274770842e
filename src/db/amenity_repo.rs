// src/db/amenity_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::apartment::Amenity,
};

#[derive(Clone)]
pub struct AmenityRepository {
    pool: PgPool,
}

impl AmenityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Amenity>, AppError> {
        let amenities = sqlx::query_as::<_, Amenity>("SELECT id, name FROM amenities ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(amenities)
    }

    pub async fn create(&self, name: &str) -> Result<Amenity, AppError> {
        sqlx::query_as::<_, Amenity>("INSERT INTO amenities (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "Já existe uma comodidade com este nome."))
    }

    /// Quantos dos IDs informados existem de fato.
    pub async fn count_existing(&self, ids: &[Uuid]) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM amenities WHERE id = ANY($1)")
            .bind(ids)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // Idempotente: só insere os nomes que ainda não existem
    pub async fn ensure_defaults(&self, names: &[&str]) -> Result<u64, AppError> {
        let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        let result = sqlx::query(
            "INSERT INTO amenities (name) SELECT UNNEST($1::TEXT[]) ON CONFLICT (name) DO NOTHING",
        )
        .bind(&names)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
