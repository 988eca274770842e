// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Profile, UserRole, User, UpdateProfilePayload},
};

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, password_hash, is_active, is_superuser, created_at, updated_at";

// O repositório de usuários, responsável pelas tabelas 'users' e 'profiles'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password_hash: &'a str,
    pub is_superuser: bool,
}

// Converte violação de unicidade no erro certo, olhando o nome do índice
fn map_user_unique_violation(e: sqlx::Error) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some(c) if c.contains("email") => AppError::EmailAlreadyExists,
                _ => AppError::UsernameAlreadyExists,
            };
        }
    }
    e.into()
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca por nome de usuário OU e-mail, sem diferenciar maiúsculas
    pub async fn find_by_login(&self, login: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE LOWER(username) = LOWER($1) OR LOWER(email) = LOWER($1) \
             ORDER BY created_at LIMIT 1",
            USER_COLUMNS
        ))
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn exists_by_username(&self, username: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE LOWER(username) = LOWER($1))",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    // Cria um novo usuário (dentro da transação do cadastro)
    pub async fn create_user<'e, E>(&self, executor: E, new_user: NewUser<'_>) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, first_name, last_name, password_hash, is_superuser) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(new_user.username)
        .bind(new_user.email)
        .bind(new_user.first_name)
        .bind(new_user.last_name)
        .bind(new_user.password_hash)
        .bind(new_user.is_superuser)
        .fetch_one(executor)
        .await
        .map_err(map_user_unique_violation)
    }

    // Todo usuário tem exatamente um perfil
    pub async fn create_profile<'e, E>(&self, executor: E, user_id: Uuid, role: UserRole) -> Result<Profile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, Profile>(
            "INSERT INTO profiles (user_id, role) VALUES ($1, $2) \
             RETURNING user_id, role, phone, bio, photo_path, updated_at",
        )
        .bind(user_id)
        .bind(role)
        .fetch_one(executor)
        .await?;

        Ok(profile)
    }

    pub async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT user_id, role, phone, bio, photo_path, updated_at FROM profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    pub async fn update_user<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        input: &UpdateProfilePayload,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET \
                first_name = COALESCE($2, first_name), \
                last_name = COALESCE($3, last_name), \
                email = COALESCE($4, email), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(input.first_name.as_deref())
        .bind(input.last_name.as_deref())
        .bind(input.email.as_deref())
        .fetch_one(executor)
        .await
        .map_err(map_user_unique_violation)
    }

    pub async fn update_profile<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        input: &UpdateProfilePayload,
    ) -> Result<Profile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, Profile>(
            "UPDATE profiles SET \
                phone = COALESCE($2, phone), \
                bio = COALESCE($3, bio), \
                updated_at = NOW() \
             WHERE user_id = $1 \
             RETURNING user_id, role, phone, bio, photo_path, updated_at",
        )
        .bind(user_id)
        .bind(input.phone.as_deref())
        .bind(input.bio.as_deref())
        .fetch_one(executor)
        .await?;

        Ok(profile)
    }

    pub async fn set_profile_photo(&self, user_id: Uuid, photo_path: &str) -> Result<Profile, AppError> {
        let profile = sqlx::query_as::<_, Profile>(
            "UPDATE profiles SET photo_path = $2, updated_at = NOW() WHERE user_id = $1 \
             RETURNING user_id, role, phone, bio, photo_path, updated_at",
        )
        .bind(user_id)
        .bind(photo_path)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }
}
