// src/services/review_service.rs

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ReservationRepository, ReviewRepository},
    models::{
        auth::User,
        reservation::{ReservationStatus, ReservationView},
        review::{CreateReviewPayload, Review, ReviewEntry},
    },
};

#[derive(Clone)]
pub struct ReviewService {
    review_repo: ReviewRepository,
    reservation_repo: ReservationRepository,
}

/// Só se avalia uma estadia confirmada que já terminou.
fn check_reviewable(reservation: &ReservationView, today: NaiveDate) -> Result<(), AppError> {
    if reservation.status != ReservationStatus::Confirmed {
        return Err(AppError::ReviewNotAllowed(format!(
            "reserva {}",
            reservation.status.label().to_lowercase()
        )));
    }
    if reservation.check_out > today {
        return Err(AppError::ReviewNotAllowed("a estadia ainda não terminou".into()));
    }
    Ok(())
}

impl ReviewService {
    pub fn new(review_repo: ReviewRepository, reservation_repo: ReservationRepository) -> Self {
        Self {
            review_repo,
            reservation_repo,
        }
    }

    pub async fn create(
        &self,
        user: &User,
        reservation_id: Uuid,
        input: &CreateReviewPayload,
    ) -> Result<Review, AppError> {
        let reservation = self
            .reservation_repo
            .find_view(reservation_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("reservation".into()))?;

        if reservation.guest_id != user.id {
            return Err(AppError::PermissionDenied("review".into()));
        }
        check_reviewable(&reservation, Utc::now().date_naive())?;

        let review = self.review_repo.create(reservation_id, input).await?;
        tracing::info!("⭐ {} avaliou '{}' com nota {}", user.username, reservation.apartment_title, review.rating);
        Ok(review)
    }

    pub async fn list_for_apartment(&self, apartment_id: Uuid) -> Result<Vec<ReviewEntry>, AppError> {
        let reviews = self.review_repo.list_for_apartment(apartment_id).await?;
        Ok(reviews.into_iter().map(ReviewEntry::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn reservation(status: ReservationStatus, check_out: &str) -> ReservationView {
        ReservationView {
            id: Uuid::new_v4(),
            apartment_id: Uuid::new_v4(),
            apartment_title: "Apto 101".into(),
            building_name: "Edifício Sol".into(),
            owner_id: Uuid::new_v4(),
            guest_id: Uuid::new_v4(),
            guest_username: "ana".into(),
            check_in: d("2025-03-01"),
            check_out: d(check_out),
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_finished_confirmed_stay_can_be_reviewed() {
        let today = d("2025-03-10");
        assert!(check_reviewable(&reservation(ReservationStatus::Confirmed, "2025-03-05"), today).is_ok());
        // Check-out hoje já conta como estadia encerrada
        assert!(check_reviewable(&reservation(ReservationStatus::Confirmed, "2025-03-10"), today).is_ok());
    }

    #[test]
    fn test_future_check_out_is_rejected() {
        let err = check_reviewable(&reservation(ReservationStatus::Confirmed, "2025-03-20"), d("2025-03-10"))
            .unwrap_err();
        assert!(matches!(err, AppError::ReviewNotAllowed(_)));
    }

    #[test]
    fn test_only_confirmed_reservations() {
        let today = d("2025-03-10");
        for status in [ReservationStatus::Pending, ReservationStatus::Cancelled] {
            let err = check_reviewable(&reservation(status, "2025-03-05"), today).unwrap_err();
            assert!(matches!(err, AppError::ReviewNotAllowed(_)));
        }
    }
}
