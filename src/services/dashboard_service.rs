// src/services/dashboard_service.rs

use uuid::Uuid;

use crate::{common::error::AppError, db::DashboardRepository, models::dashboard::OwnerDashboard};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    // Painel do proprietário: reservas das suas unidades, separadas por status
    pub async fn owner_dashboard(&self, owner_id: Uuid) -> Result<OwnerDashboard, AppError> {
        let reservations = self.repo.reservations_for_owner(owner_id).await?;
        Ok(OwnerDashboard::from_reservations(reservations))
    }
}
