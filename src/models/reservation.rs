// src/models/reservation.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "reservation_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

// O que alguém está tentando fazer com a reserva
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationAction {
    Approve, // proprietário
    Reject,  // proprietário
    Cancel,  // hóspede
}

impl ReservationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReservationStatus::Pending => "PENDING",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReservationStatus::Pending => "Pendente",
            ReservationStatus::Confirmed => "Confirmada",
            ReservationStatus::Cancelled => "Cancelada",
        }
    }

    /// Próximo status para a ação pedida.
    ///
    /// PENDING -> CONFIRMED (aprovar), PENDING -> CANCELLED (recusar),
    /// PENDING|CONFIRMED -> CANCELLED (hóspede cancela). CANCELLED é final.
    pub fn apply(self, action: ReservationAction) -> Result<ReservationStatus, AppError> {
        use ReservationAction::*;
        use ReservationStatus::*;

        let next = match (self, action) {
            (Pending, Approve) => Some(Confirmed),
            (Pending, Reject) => Some(Cancelled),
            (Pending | Confirmed, Cancel) => Some(Cancelled),
            _ => None,
        };

        next.ok_or(AppError::InvalidStatusTransition {
            from: self,
            to: match action {
                Approve => Confirmed,
                Reject | Cancel => Cancelled,
            },
        })
    }
}

// --- Período de estadia ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StayPeriodError {
    CheckInInPast,
    CheckOutNotAfterCheckIn,
}

impl StayPeriodError {
    // Campo do payload ao qual o erro se refere
    pub fn field(self) -> &'static str {
        match self {
            StayPeriodError::CheckInInPast => "checkIn",
            StayPeriodError::CheckOutNotAfterCheckIn => "checkOut",
        }
    }

    pub fn message_key(self) -> &'static str {
        match self {
            StayPeriodError::CheckInInPast => "stay.check_in_past",
            StayPeriodError::CheckOutNotAfterCheckIn => "stay.check_out_not_after_check_in",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayPeriod {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl StayPeriod {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Self {
        Self { check_in, check_out }
    }

    pub fn validate(&self, today: NaiveDate) -> Result<(), StayPeriodError> {
        if self.check_in < today {
            return Err(StayPeriodError::CheckInInPast);
        }
        if self.check_out <= self.check_in {
            return Err(StayPeriodError::CheckOutNotAfterCheckIn);
        }
        Ok(())
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Limites inclusivos: um check-out no mesmo dia do check-in da outra reserva também conflita.
    pub fn conflicts_with(&self, existing: &StayPeriod) -> bool {
        existing.check_in <= self.check_out && existing.check_out >= self.check_in
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: Uuid,
    pub apartment_id: Uuid,
    pub guest_id: Uuid,
    #[schema(example = "2025-08-01")]
    pub check_in: NaiveDate,
    #[schema(example = "2025-08-05")]
    pub check_out: NaiveDate,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn period(&self) -> StayPeriod {
        StayPeriod::new(self.check_in, self.check_out)
    }
}

/// Primeira reserva ativa (não cancelada) que conflita com o período pedido.
pub fn find_conflict<'a>(existing: &'a [Reservation], requested: &StayPeriod) -> Option<&'a Reservation> {
    existing
        .iter()
        .filter(|r| r.status != ReservationStatus::Cancelled)
        .find(|r| requested.conflicts_with(&r.period()))
}

// Reserva com os nomes que as telas precisam (painel, "minhas reservas")
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationView {
    pub id: Uuid,
    pub apartment_id: Uuid,
    pub apartment_title: String,
    pub building_name: String,
    pub owner_id: Uuid,
    pub guest_id: Uuid,
    pub guest_username: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationPayload {
    #[schema(example = "2025-08-01")]
    pub check_in: NaiveDate,
    #[schema(example = "2025-08-05")]
    pub check_out: NaiveDate,
}

// Resposta dos endpoints RPC (aprovar/recusar/cancelar)
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusChangeResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub reservation: Reservation,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn reservation(check_in: &str, check_out: &str, status: ReservationStatus) -> Reservation {
        Reservation {
            id: Uuid::new_v4(),
            apartment_id: Uuid::new_v4(),
            guest_id: Uuid::new_v4(),
            check_in: d(check_in),
            check_out: d(check_out),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_valid_period() {
        let today = d("2025-07-30");
        assert!(StayPeriod::new(d("2025-08-01"), d("2025-08-05")).validate(today).is_ok());
        // Check-in hoje é permitido
        assert!(StayPeriod::new(today, d("2025-07-31")).validate(today).is_ok());
    }

    #[test]
    fn test_check_in_in_the_past() {
        let err = StayPeriod::new(d("2020-01-01"), d("2020-01-05"))
            .validate(d("2025-07-30"))
            .unwrap_err();
        assert_eq!(err, StayPeriodError::CheckInInPast);
        assert_eq!(err.field(), "checkIn");
    }

    #[test]
    fn test_check_out_must_be_after_check_in() {
        let today = d("2025-07-30");
        let same_day = StayPeriod::new(d("2025-08-01"), d("2025-08-01")).validate(today);
        let inverted = StayPeriod::new(d("2025-08-05"), d("2025-08-01")).validate(today);
        assert_eq!(same_day, Err(StayPeriodError::CheckOutNotAfterCheckIn));
        assert_eq!(inverted, Err(StayPeriodError::CheckOutNotAfterCheckIn));
    }

    #[test]
    fn test_overlapping_dates_conflict() {
        let existing = StayPeriod::new(d("2025-09-10"), d("2025-09-15"));
        assert!(StayPeriod::new(d("2025-09-12"), d("2025-09-17")).conflicts_with(&existing));
        assert!(StayPeriod::new(d("2025-09-08"), d("2025-09-11")).conflicts_with(&existing));
        assert!(StayPeriod::new(d("2025-09-11"), d("2025-09-12")).conflicts_with(&existing));
        assert!(StayPeriod::new(d("2025-09-01"), d("2025-09-30")).conflicts_with(&existing));
    }

    #[test]
    fn test_touching_bounds_conflict() {
        let existing = StayPeriod::new(d("2025-09-10"), d("2025-09-15"));
        // Check-in no dia do check-out existente
        assert!(StayPeriod::new(d("2025-09-15"), d("2025-09-18")).conflicts_with(&existing));
        // Check-out no dia do check-in existente
        assert!(StayPeriod::new(d("2025-09-07"), d("2025-09-10")).conflicts_with(&existing));
    }

    #[test]
    fn test_disjoint_dates_do_not_conflict() {
        let existing = StayPeriod::new(d("2025-09-10"), d("2025-09-15"));
        assert!(!StayPeriod::new(d("2025-09-16"), d("2025-09-20")).conflicts_with(&existing));
        assert!(!StayPeriod::new(d("2025-09-01"), d("2025-09-09")).conflicts_with(&existing));
    }

    #[test]
    fn test_cancelled_reservations_are_ignored() {
        let existing = vec![
            reservation("2025-09-10", "2025-09-15", ReservationStatus::Cancelled),
            reservation("2025-09-20", "2025-09-25", ReservationStatus::Confirmed),
        ];

        let free = StayPeriod::new(d("2025-09-12"), d("2025-09-14"));
        assert!(find_conflict(&existing, &free).is_none());

        let taken = StayPeriod::new(d("2025-09-24"), d("2025-09-28"));
        let hit = find_conflict(&existing, &taken).expect("deve conflitar");
        assert_eq!(hit.status, ReservationStatus::Confirmed);
    }

    #[test]
    fn test_pending_reservations_block_dates() {
        let existing = vec![reservation("2025-09-10", "2025-09-15", ReservationStatus::Pending)];
        let requested = StayPeriod::new(d("2025-09-12"), d("2025-09-17"));
        assert!(find_conflict(&existing, &requested).is_some());
    }

    #[test]
    fn test_nights() {
        assert_eq!(StayPeriod::new(d("2025-01-01"), d("2025-01-05")).nights(), 4);
    }

    #[test]
    fn test_status_workflow() {
        use ReservationAction::*;
        use ReservationStatus::*;

        assert_eq!(Pending.apply(Approve).unwrap(), Confirmed);
        assert_eq!(Pending.apply(Reject).unwrap(), Cancelled);
        assert_eq!(Pending.apply(Cancel).unwrap(), Cancelled);
        assert_eq!(Confirmed.apply(Cancel).unwrap(), Cancelled);

        assert!(matches!(
            Confirmed.apply(Approve),
            Err(AppError::InvalidStatusTransition { from: Confirmed, to: Confirmed })
        ));
        assert!(Confirmed.apply(Reject).is_err());
        for action in [Approve, Reject, Cancel] {
            assert!(Cancelled.apply(action).is_err(), "CANCELLED deve ser final");
        }
    }
}
