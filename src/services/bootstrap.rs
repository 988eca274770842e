// src/services/bootstrap.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    config::{AppState, SuperuserConfig},
    db::{user_repo::NewUser, UserRepository},
    models::auth::UserRole,
    services::auth::hash_password,
};

/// Dados iniciais, executado a cada inicialização depois das migrações.
/// Tudo aqui é idempotente.
pub async fn setup_initial_data(app_state: &AppState) -> Result<(), AppError> {
    match &app_state.config.superuser {
        Some(superuser) => ensure_superuser(&app_state.db_pool, superuser).await?,
        None => tracing::info!("SUPERUSER_* não definidas; criação do superusuário pulada"),
    }

    let inserted = app_state.catalog_service.ensure_default_amenities().await?;
    if inserted > 0 {
        tracing::info!("🧩 {} comodidades padrão criadas", inserted);
    }
    Ok(())
}

async fn ensure_superuser(pool: &PgPool, superuser: &SuperuserConfig) -> Result<(), AppError> {
    let user_repo = UserRepository::new(pool.clone());

    if user_repo.exists_by_username(&superuser.username).await? {
        tracing::info!("Superusuário '{}' já existe", superuser.username);
        return Ok(());
    }

    let password_hash = hash_password(&superuser.password).await?;

    let mut tx = pool.begin().await?;
    let user = user_repo
        .create_user(
            &mut *tx,
            NewUser {
                username: &superuser.username,
                email: &superuser.email,
                first_name: "",
                last_name: "",
                password_hash: &password_hash,
                is_superuser: true,
            },
        )
        .await?;
    user_repo.create_profile(&mut *tx, user.id, UserRole::Client).await?;
    tx.commit().await?;

    tracing::info!("🔑 Superusuário '{}' criado", user.username);
    Ok(())
}
