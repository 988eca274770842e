// src/db/reservation_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::reservation::{Reservation, ReservationStatus, ReservationView, StayPeriod},
};

const RESERVATION_COLUMNS: &str =
    "id, apartment_id, guest_id, check_in, check_out, status, created_at, updated_at";

// $1 = apartamento, $2 = check-in pedido, $3 = check-out pedido (limites inclusivos)
const ACTIVE_OVERLAP_FILTER: &str =
    "apartment_id = $1 AND status <> 'CANCELLED' AND check_out >= $2 AND check_in <= $3";

pub(crate) const VIEW_SELECT: &str = r#"
    SELECT r.id, r.apartment_id, a.title AS apartment_title, b.name AS building_name,
           a.owner_id, r.guest_id, u.username AS guest_username,
           r.check_in, r.check_out, r.status, r.created_at
    FROM reservations r
    JOIN apartments a ON a.id = r.apartment_id
    JOIN buildings b ON b.id = a.building_id
    JOIN users u ON u.id = r.guest_id
"#;

#[derive(Clone)]
pub struct ReservationRepository {
    pool: PgPool,
}

impl ReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Reservas ativas da unidade que cruzam o período pedido.
    /// `find_conflict` aplica a mesma regra sobre o resultado.
    pub async fn list_active_candidates<'e, E>(
        &self,
        executor: E,
        apartment_id: Uuid,
        period: &StayPeriod,
    ) -> Result<Vec<Reservation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reservations = sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {} FROM reservations WHERE {} ORDER BY check_in ASC",
            RESERVATION_COLUMNS, ACTIVE_OVERLAP_FILTER
        ))
        .bind(apartment_id)
        .bind(period.check_in)
        .bind(period.check_out)
        .fetch_all(executor)
        .await?;

        Ok(reservations)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        apartment_id: Uuid,
        guest_id: Uuid,
        period: &StayPeriod,
    ) -> Result<Reservation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reservation = sqlx::query_as::<_, Reservation>(&format!(
            "INSERT INTO reservations (apartment_id, guest_id, check_in, check_out, status) \
             VALUES ($1, $2, $3, $4, 'PENDING') RETURNING {}",
            RESERVATION_COLUMNS
        ))
        .bind(apartment_id)
        .bind(guest_id)
        .bind(period.check_in)
        .bind(period.check_out)
        .fetch_one(executor)
        .await?;

        Ok(reservation)
    }

    pub async fn find_view(&self, id: Uuid) -> Result<Option<ReservationView>, AppError> {
        let reservation = sqlx::query_as::<_, ReservationView>(&format!("{} WHERE r.id = $1", VIEW_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(reservation)
    }

    // Visão travada: a mudança de status lê e escreve na mesma transação
    pub async fn find_view_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<ReservationView>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reservation = sqlx::query_as::<_, ReservationView>(&format!(
            "{} WHERE r.id = $1 FOR UPDATE OF r",
            VIEW_SELECT
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(reservation)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: ReservationStatus,
    ) -> Result<Reservation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reservation = sqlx::query_as::<_, Reservation>(&format!(
            "UPDATE reservations SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            RESERVATION_COLUMNS
        ))
        .bind(id)
        .bind(status)
        .fetch_one(executor)
        .await?;

        Ok(reservation)
    }

    // "Minhas reservas": mais recentes primeiro
    pub async fn list_for_guest(&self, guest_id: Uuid) -> Result<Vec<ReservationView>, AppError> {
        let reservations = sqlx::query_as::<_, ReservationView>(&format!(
            "{} WHERE r.guest_id = $1 ORDER BY r.created_at DESC",
            VIEW_SELECT
        ))
        .bind(guest_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reservations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Mesmos limites de StayPeriod::conflicts_with, nos dois lados do período
    #[test]
    fn test_overlap_filter_bounds_both_sides() {
        assert!(ACTIVE_OVERLAP_FILTER.contains("check_out >= $2"));
        assert!(ACTIVE_OVERLAP_FILTER.contains("check_in <= $3"));
        assert!(ACTIVE_OVERLAP_FILTER.contains("status <> 'CANCELLED'"));
    }
}
