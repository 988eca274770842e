// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::{i18n::I18nStore, media::MediaStorage},
    db::{
        AmenityRepository, ApartmentRepository, BuildingRepository, DashboardRepository,
        RbacRepository, ReservationRepository, ReviewRepository, UserRepository,
    },
    services::{
        auth::AuthService,
        catalog_service::CatalogService,
        dashboard_service::DashboardService,
        notification_service::{ConsoleMailer, Mailer, NotificationService, SmtpMailer},
        reservation_service::ReservationService,
        review_service::ReviewService,
    },
};

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct SuperuserConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

// Tudo que vem do ambiente (.env)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub media_root: String,
    pub media_url: String,
    pub email_from: String,
    pub smtp: Option<SmtpConfig>,
    pub superuser: Option<SuperuserConfig>,
}

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name).with_context(|| format!("{} deve ser definida", name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_max_connections = match optional("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v.parse().context("DATABASE_MAX_CONNECTIONS deve ser um número")?,
            None => 5,
        };

        let smtp = match optional("SMTP_HOST") {
            Some(host) => Some(SmtpConfig {
                host,
                port: match optional("SMTP_PORT") {
                    Some(p) => p.parse().context("SMTP_PORT deve ser um número")?,
                    None => 587,
                },
                username: optional("SMTP_USERNAME").unwrap_or_default(),
                password: optional("SMTP_PASSWORD").unwrap_or_default(),
            }),
            None => None,
        };

        // Só cria o superusuário quando as três variáveis estão presentes
        let superuser = match (
            optional("SUPERUSER_USERNAME"),
            optional("SUPERUSER_EMAIL"),
            optional("SUPERUSER_PASSWORD"),
        ) {
            (Some(username), Some(email), Some(password)) => Some(SuperuserConfig {
                username,
                email,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            media_root: optional("MEDIA_ROOT").unwrap_or_else(|| "mediafiles".to_string()),
            media_url: optional("MEDIA_URL").unwrap_or_else(|| "/media".to_string()),
            email_from: optional("EMAIL_FROM")
                .unwrap_or_else(|| "nao-responda@apartamentos.local".to_string()),
            smtp,
            superuser,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub i18n_store: Arc<I18nStore>,
    pub media: MediaStorage,
    pub rbac_repo: RbacRepository,
    pub auth_service: AuthService,
    pub catalog_service: CatalogService,
    pub reservation_service: ReservationService,
    pub review_service: ReviewService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::from_parts(config, db_pool)
    }

    // Monta o gráfico de dependências a partir de um pool já criado
    pub fn from_parts(config: Config, db_pool: PgPool) -> anyhow::Result<Self> {
        let i18n_store = Arc::new(I18nStore::load()?);
        let media = MediaStorage::new(&config.media_root, &config.media_url);

        let mailer: Arc<dyn Mailer> = match &config.smtp {
            Some(smtp) => {
                tracing::info!("📧 Envio de e-mails via SMTP ({})", smtp.host);
                Arc::new(SmtpMailer::new(smtp)?)
            }
            None => {
                tracing::info!("📧 SMTP não configurado: e-mails serão escritos no log");
                Arc::new(ConsoleMailer)
            }
        };
        let notifications = NotificationService::new(mailer, config.email_from.clone());

        let user_repo = UserRepository::new(db_pool.clone());
        let building_repo = BuildingRepository::new(db_pool.clone());
        let apartment_repo = ApartmentRepository::new(db_pool.clone());
        let amenity_repo = AmenityRepository::new(db_pool.clone());
        let reservation_repo = ReservationRepository::new(db_pool.clone());
        let review_repo = ReviewRepository::new(db_pool.clone());
        let rbac_repo = RbacRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            media.clone(),
            config.jwt_secret.clone(),
            db_pool.clone(),
        );
        let catalog_service = CatalogService::new(
            building_repo,
            apartment_repo.clone(),
            amenity_repo,
            media.clone(),
            db_pool.clone(),
        );
        let reservation_service = ReservationService::new(
            reservation_repo.clone(),
            apartment_repo,
            user_repo,
            notifications,
            db_pool.clone(),
        );
        let review_service = ReviewService::new(review_repo, reservation_repo);
        let dashboard_service = DashboardService::new(dashboard_repo);

        Ok(Self {
            db_pool,
            config: Arc::new(config),
            i18n_store,
            media,
            rbac_repo,
            auth_service,
            catalog_service,
            reservation_service,
            review_service,
            dashboard_service,
        })
    }
}
