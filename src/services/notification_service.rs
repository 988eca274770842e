// src/services/notification_service.rs

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};

use crate::{
    config::SmtpConfig,
    models::reservation::{ReservationAction, ReservationView},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, from: &str, message: &EmailMessage) -> anyhow::Result<()>;
}

// Desenvolvimento: o e-mail vai para o log em vez de sair pela rede
pub struct ConsoleMailer;

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, from: &str, message: &EmailMessage) -> anyhow::Result<()> {
        tracing::info!(
            from = from,
            to = %message.to,
            subject = %message.subject,
            "📧 E-mail (console):\n{}",
            message.body
        );
        Ok(())
    }
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .with_context(|| format!("Servidor SMTP inválido: {}", config.host))?
            .port(config.port);

        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(config.username.clone(), config.password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, from: &str, message: &EmailMessage) -> anyhow::Result<()> {
        let email = Message::builder()
            .from(from.parse().context("Remetente inválido")?)
            .to(message.to.parse().context("Destinatário inválido")?)
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())?;

        self.transport.send(email).await?;
        Ok(())
    }
}

/// Avisos de mudança de status das reservas.
/// Falhas de envio nunca desfazem a operação: só vão para o log.
#[derive(Clone)]
pub struct NotificationService {
    mailer: Arc<dyn Mailer>,
    from: String,
}

impl NotificationService {
    pub fn new(mailer: Arc<dyn Mailer>, from: String) -> Self {
        Self { mailer, from }
    }

    pub async fn reservation_status_changed(
        &self,
        reservation: &ReservationView,
        action: ReservationAction,
        recipient_email: &str,
    ) {
        if recipient_email.trim().is_empty() {
            tracing::debug!("Destinatário sem e-mail; aviso da reserva {} ignorado", reservation.id);
            return;
        }

        let message = compose(reservation, action, recipient_email);
        match self.mailer.send(&self.from, &message).await {
            Ok(()) => tracing::info!("📨 Aviso enviado para {} (reserva {})", message.to, reservation.id),
            Err(e) => tracing::error!("Falha ao enviar e-mail da reserva {}: {:#}", reservation.id, e),
        }
    }
}

fn compose(reservation: &ReservationView, action: ReservationAction, to: &str) -> EmailMessage {
    let period = format!(
        "{} a {}",
        reservation.check_in.format("%d/%m/%Y"),
        reservation.check_out.format("%d/%m/%Y")
    );

    let (subject, body) = match action {
        ReservationAction::Approve => (
            format!("Reserva confirmada: {}", reservation.apartment_title),
            format!(
                "Olá, {}!\n\nSua reserva em {} ({}) para {} foi confirmada pelo proprietário.\n\nBoa estadia!",
                reservation.guest_username, reservation.apartment_title, reservation.building_name, period
            ),
        ),
        ReservationAction::Reject => (
            format!("Reserva recusada: {}", reservation.apartment_title),
            format!(
                "Olá, {}!\n\nInfelizmente sua reserva em {} ({}) para {} foi recusada pelo proprietário.",
                reservation.guest_username, reservation.apartment_title, reservation.building_name, period
            ),
        ),
        ReservationAction::Cancel => (
            format!("Reserva cancelada pelo hóspede: {}", reservation.apartment_title),
            format!(
                "Olá!\n\nO hóspede {} cancelou a reserva em {} ({}) para {}.",
                reservation.guest_username, reservation.apartment_title, reservation.building_name, period
            ),
        ),
    };

    EmailMessage {
        to: to.to_string(),
        subject,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use std::sync::Mutex;
    use uuid::Uuid;

    use crate::models::reservation::ReservationStatus;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<EmailMessage>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, _from: &str, message: &EmailMessage) -> anyhow::Result<()> {
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _from: &str, _message: &EmailMessage) -> anyhow::Result<()> {
            anyhow::bail!("SMTP fora do ar")
        }
    }

    fn view() -> ReservationView {
        ReservationView {
            id: Uuid::new_v4(),
            apartment_id: Uuid::new_v4(),
            apartment_title: "Apto 204".into(),
            building_name: "Residencial Vista do Rio".into(),
            owner_id: Uuid::new_v4(),
            guest_id: Uuid::new_v4(),
            guest_username: "maria".into(),
            check_in: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2025, 8, 5).unwrap(),
            status: ReservationStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_compose_approval() {
        let msg = compose(&view(), ReservationAction::Approve, "maria@example.com");
        assert_eq!(msg.to, "maria@example.com");
        assert_eq!(msg.subject, "Reserva confirmada: Apto 204");
        assert!(msg.body.contains("01/08/2025 a 05/08/2025"));
        assert!(msg.body.contains("confirmada"));
    }

    #[test]
    fn test_compose_guest_cancel_mentions_guest() {
        let msg = compose(&view(), ReservationAction::Cancel, "dono@example.com");
        assert!(msg.subject.starts_with("Reserva cancelada"));
        assert!(msg.body.contains("maria"));
    }

    #[tokio::test]
    async fn test_sends_through_mailer() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = NotificationService::new(mailer.clone(), "nao-responda@test".into());

        service
            .reservation_status_changed(&view(), ReservationAction::Reject, "maria@example.com")
            .await;

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].subject.starts_with("Reserva recusada"));
    }

    #[tokio::test]
    async fn test_skips_users_without_email() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = NotificationService::new(mailer.clone(), "nao-responda@test".into());

        service
            .reservation_status_changed(&view(), ReservationAction::Approve, "  ")
            .await;

        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_failure_is_swallowed() {
        let service = NotificationService::new(Arc::new(FailingMailer), "nao-responda@test".into());
        // Não deve entrar em pânico nem propagar o erro
        service
            .reservation_status_changed(&view(), ReservationAction::Approve, "maria@example.com")
            .await;
    }
}
