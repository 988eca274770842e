// src/services/reservation_service.rs

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ApartmentRepository, ReservationRepository, UserRepository},
    models::{
        apartment::Apartment,
        auth::User,
        reservation::{
            find_conflict, Reservation, ReservationAction, ReservationView, StayPeriod,
        },
    },
    services::notification_service::NotificationService,
};

#[derive(Clone)]
pub struct ReservationService {
    reservation_repo: ReservationRepository,
    apartment_repo: ApartmentRepository,
    user_repo: UserRepository,
    notifications: NotificationService,
    pool: PgPool,
}

// Regras de quem pode pedir uma reserva, sem tocar no banco
fn check_bookable(apartment: &Apartment, guest: &User) -> Result<(), AppError> {
    if !apartment.available {
        return Err(AppError::ApartmentUnavailable);
    }
    if apartment.owner_id == guest.id {
        return Err(AppError::OwnReservation);
    }
    Ok(())
}

/// Aprovar e recusar são do proprietário; cancelar é do hóspede.
fn check_actor(view: &ReservationView, user: &User, action: ReservationAction) -> Result<(), AppError> {
    let allowed = match action {
        ReservationAction::Approve | ReservationAction::Reject => user.is_superuser || view.owner_id == user.id,
        ReservationAction::Cancel => view.guest_id == user.id,
    };
    if allowed {
        return Ok(());
    }
    let name = match action {
        ReservationAction::Approve => "approve",
        ReservationAction::Reject => "reject",
        ReservationAction::Cancel => "cancel",
    };
    Err(AppError::PermissionDenied(name.to_string()))
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

impl ReservationService {
    pub fn new(
        reservation_repo: ReservationRepository,
        apartment_repo: ApartmentRepository,
        user_repo: UserRepository,
        notifications: NotificationService,
        pool: PgPool,
    ) -> Self {
        Self {
            reservation_repo,
            apartment_repo,
            user_repo,
            notifications,
            pool,
        }
    }

    /// Pede uma reserva (fica PENDING até o proprietário decidir).
    ///
    /// A linha do apartamento fica travada durante a checagem de conflito,
    /// então dois pedidos simultâneos para a mesma unidade não passam juntos.
    pub async fn create(
        &self,
        guest: &User,
        apartment_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Reservation, AppError> {
        let period = StayPeriod::new(check_in, check_out);

        let mut tx = self.pool.begin().await?;

        let apartment = self
            .apartment_repo
            .find_for_update(&mut *tx, apartment_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("apartment".into()))?;

        check_bookable(&apartment, guest)?;
        period.validate(today()).map_err(AppError::InvalidStayPeriod)?;

        let existing = self
            .reservation_repo
            .list_active_candidates(&mut *tx, apartment_id, &period)
            .await?;
        if let Some(conflict) = find_conflict(&existing, &period) {
            tracing::debug!(
                "Conflito de datas: pedido {}..{} x reserva {}",
                period.check_in,
                period.check_out,
                conflict.id
            );
            return Err(AppError::ReservationConflict);
        }

        let reservation = self
            .reservation_repo
            .create(&mut *tx, apartment_id, guest.id, &period)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "📅 Reserva {} pedida por {} ({} noites em '{}')",
            reservation.id,
            guest.username,
            period.nights(),
            apartment.title
        );
        Ok(reservation)
    }

    pub async fn approve(&self, user: &User, id: Uuid) -> Result<Reservation, AppError> {
        self.change_status(user, id, ReservationAction::Approve).await
    }

    pub async fn reject(&self, user: &User, id: Uuid) -> Result<Reservation, AppError> {
        self.change_status(user, id, ReservationAction::Reject).await
    }

    pub async fn cancel(&self, user: &User, id: Uuid) -> Result<Reservation, AppError> {
        self.change_status(user, id, ReservationAction::Cancel).await
    }

    async fn change_status(&self, user: &User, id: Uuid, action: ReservationAction) -> Result<Reservation, AppError> {
        let mut tx = self.pool.begin().await?;

        let view = self
            .reservation_repo
            .find_view_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("reservation".into()))?;

        check_actor(&view, user, action)?;
        let next = view.status.apply(action)?;

        let updated = self.reservation_repo.update_status(&mut *tx, id, next).await?;
        tx.commit().await?;

        tracing::info!(
            "🔁 Reserva {}: {} -> {} por {}",
            id,
            view.status.as_str(),
            next.as_str(),
            user.username
        );

        self.notify(&view, action).await;
        Ok(updated)
    }

    // Aprovar/recusar avisam o hóspede; o cancelamento avisa o proprietário
    async fn notify(&self, view: &ReservationView, action: ReservationAction) {
        let recipient_id = match action {
            ReservationAction::Approve | ReservationAction::Reject => view.guest_id,
            ReservationAction::Cancel => view.owner_id,
        };

        match self.user_repo.find_by_id(recipient_id).await {
            Ok(Some(recipient)) => {
                self.notifications
                    .reservation_status_changed(view, action, &recipient.email)
                    .await
            }
            Ok(None) => tracing::warn!("Destinatário {} do aviso não existe mais", recipient_id),
            Err(e) => tracing::error!("Falha ao buscar destinatário do aviso: {}", e),
        }
    }

    pub async fn list_mine(&self, user: &User) -> Result<Vec<ReservationView>, AppError> {
        self.reservation_repo.list_for_guest(user.id).await
    }

    /// Visível para o hóspede e para o proprietário da unidade.
    pub async fn detail(&self, user: &User, id: Uuid) -> Result<ReservationView, AppError> {
        let view = self
            .reservation_repo
            .find_view(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("reservation".into()))?;

        if user.is_superuser || view.guest_id == user.id || view.owner_id == user.id {
            Ok(view)
        } else {
            Err(AppError::PermissionDenied("reservation:view".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    use crate::models::reservation::ReservationStatus;

    fn user(id: Uuid, is_superuser: bool) -> User {
        User {
            id,
            username: "ana".into(),
            email: "ana@example.com".into(),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: String::new(),
            is_active: true,
            is_superuser,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn apartment(owner_id: Uuid, available: bool) -> Apartment {
        Apartment {
            id: Uuid::new_v4(),
            building_id: Uuid::new_v4(),
            owner_id,
            title: "Apto 101".into(),
            description: String::new(),
            bedrooms: 1,
            bathrooms: 1,
            area_m2: Decimal::new(4500, 2),
            daily_price: Decimal::new(15000, 2),
            main_photo_path: None,
            main_photo_url: None,
            available,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn view(owner_id: Uuid, guest_id: Uuid) -> ReservationView {
        ReservationView {
            id: Uuid::new_v4(),
            apartment_id: Uuid::new_v4(),
            apartment_title: "Apto 101".into(),
            building_name: "Edifício Sol".into(),
            owner_id,
            guest_id,
            guest_username: "ana".into(),
            check_in: today(),
            check_out: today().succ_opt().unwrap(),
            status: ReservationStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_unavailable_apartment_cannot_be_booked() {
        let guest = user(Uuid::new_v4(), false);
        let err = check_bookable(&apartment(Uuid::new_v4(), false), &guest).unwrap_err();
        assert!(matches!(err, AppError::ApartmentUnavailable));
    }

    #[test]
    fn test_owner_cannot_book_own_apartment() {
        let owner = user(Uuid::new_v4(), false);
        let err = check_bookable(&apartment(owner.id, true), &owner).unwrap_err();
        assert!(matches!(err, AppError::OwnReservation));
    }

    #[test]
    fn test_guest_can_book() {
        let guest = user(Uuid::new_v4(), false);
        assert!(check_bookable(&apartment(Uuid::new_v4(), true), &guest).is_ok());
    }

    #[test]
    fn test_only_owner_or_superuser_approves() {
        let owner = user(Uuid::new_v4(), false);
        let guest = user(Uuid::new_v4(), false);
        let v = view(owner.id, guest.id);

        assert!(check_actor(&v, &owner, ReservationAction::Approve).is_ok());
        assert!(check_actor(&v, &owner, ReservationAction::Reject).is_ok());
        assert!(check_actor(&v, &user(Uuid::new_v4(), true), ReservationAction::Approve).is_ok());

        let err = check_actor(&v, &guest, ReservationAction::Approve).unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(a) if a == "approve"));
        let err = check_actor(&v, &user(Uuid::new_v4(), false), ReservationAction::Reject).unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(a) if a == "reject"));
    }

    #[test]
    fn test_only_guest_cancels() {
        let owner = user(Uuid::new_v4(), false);
        let guest = user(Uuid::new_v4(), false);
        let v = view(owner.id, guest.id);

        assert!(check_actor(&v, &guest, ReservationAction::Cancel).is_ok());
        assert!(check_actor(&v, &owner, ReservationAction::Cancel).is_err());
    }
}
