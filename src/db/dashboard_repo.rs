// src/db/dashboard_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::reservation_repo::VIEW_SELECT,
    models::reservation::ReservationView,
};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Reservas de todas as unidades do proprietário, em ordem de chegada
    pub async fn reservations_for_owner(&self, owner_id: Uuid) -> Result<Vec<ReservationView>, AppError> {
        let reservations = sqlx::query_as::<_, ReservationView>(&format!(
            "{} WHERE a.owner_id = $1 ORDER BY r.check_in ASC, r.created_at ASC",
            VIEW_SELECT
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reservations)
    }
}
