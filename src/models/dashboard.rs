// src/models/dashboard.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::reservation::{ReservationStatus, ReservationView};

#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub pending: usize,
    pub confirmed: usize,
    pub cancelled: usize,
}

// Painel do proprietário: reservas das suas unidades separadas por status
#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerDashboard {
    pub counts: StatusCounts,
    pub pending: Vec<ReservationView>,
    pub confirmed: Vec<ReservationView>,
    pub cancelled: Vec<ReservationView>,
}

impl OwnerDashboard {
    // Mantém a ordem de entrada dentro de cada grupo
    pub fn from_reservations(reservations: Vec<ReservationView>) -> Self {
        let mut dashboard = OwnerDashboard::default();
        for r in reservations {
            match r.status {
                ReservationStatus::Pending => dashboard.pending.push(r),
                ReservationStatus::Confirmed => dashboard.confirmed.push(r),
                ReservationStatus::Cancelled => dashboard.cancelled.push(r),
            }
        }
        dashboard.counts = StatusCounts {
            pending: dashboard.pending.len(),
            confirmed: dashboard.confirmed.len(),
            cancelled: dashboard.cancelled.len(),
        };
        dashboard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn view(title: &str, status: ReservationStatus) -> ReservationView {
        ReservationView {
            id: Uuid::new_v4(),
            apartment_id: Uuid::new_v4(),
            apartment_title: title.into(),
            building_name: "Residencial".into(),
            owner_id: Uuid::new_v4(),
            guest_id: Uuid::new_v4(),
            guest_username: "hospede".into(),
            check_in: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2025, 8, 5).unwrap(),
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_groups_by_status() {
        let dashboard = OwnerDashboard::from_reservations(vec![
            view("101", ReservationStatus::Pending),
            view("102", ReservationStatus::Confirmed),
            view("103", ReservationStatus::Pending),
            view("104", ReservationStatus::Cancelled),
        ]);

        assert_eq!(dashboard.counts.pending, 2);
        assert_eq!(dashboard.counts.confirmed, 1);
        assert_eq!(dashboard.counts.cancelled, 1);
        let pending: Vec<_> = dashboard.pending.iter().map(|r| r.apartment_title.as_str()).collect();
        assert_eq!(pending, vec!["101", "103"]);
    }

    #[test]
    fn test_empty_dashboard() {
        let dashboard = OwnerDashboard::from_reservations(vec![]);
        assert_eq!(dashboard.counts.pending + dashboard.counts.confirmed + dashboard.counts.cancelled, 0);
    }
}
