// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::{
    common::{
        error::AppError,
        media::{MediaStorage, PROFILE_PHOTO_FOLDER},
    },
    db::{user_repo::NewUser, UserRepository},
    models::auth::{Claims, Me, Profile, RegisterUserPayload, UpdateProfilePayload, User, UserRole},
};

const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    media: MediaStorage,
    jwt_secret: String,
    pool: PgPool,
}

pub(crate) async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

impl AuthService {
    pub fn new(user_repo: UserRepository, media: MediaStorage, jwt_secret: String, pool: PgPool) -> Self {
        Self {
            user_repo,
            media,
            jwt_secret,
            pool,
        }
    }

    pub async fn register_user(&self, payload: &RegisterUserPayload) -> Result<String, AppError> {
        let role = payload.role.unwrap_or(UserRole::Client);
        if !role.is_self_assignable() {
            let mut err = ValidationError::new("role");
            err.message = Some("Escolha CLIENT ou OWNER.".into());
            let mut errors = ValidationErrors::new();
            errors.add("role", err);
            return Err(AppError::ValidationError(errors));
        }

        // 1. Hashing (fora da transação, não toca no banco)
        let hashed_password = hash_password(&payload.password).await?;

        // 2. Usuário e perfil nascem juntos
        let mut tx = self.pool.begin().await?;

        let new_user = self
            .user_repo
            .create_user(
                &mut *tx,
                NewUser {
                    username: &payload.username,
                    email: &payload.email,
                    first_name: &payload.first_name,
                    last_name: &payload.last_name,
                    password_hash: &hashed_password,
                    is_superuser: false,
                },
            )
            .await?;

        self.user_repo.create_profile(&mut *tx, new_user.id, role).await?;

        tx.commit().await?;

        tracing::info!("👤 Novo usuário '{}' ({:?})", new_user.username, role);
        self.create_token(new_user.id)
    }

    // Aceita nome de usuário ou e-mail
    pub async fn login_user(&self, login: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_login(login)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(user.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = decode_token(token, &self.jwt_secret)?;

        self.user_repo
            .find_by_id(claims.sub)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AppError::InvalidToken)
    }

    pub fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        encode_token(user_id, &self.jwt_secret)
    }

    // ---
    // Perfil
    // ---

    pub async fn me(&self, user: User) -> Result<Me, AppError> {
        let profile = self.profile_of(user.id).await?;
        Ok(self.build_me(user, profile))
    }

    pub async fn update_profile(&self, user_id: Uuid, input: &UpdateProfilePayload) -> Result<Me, AppError> {
        let mut tx = self.pool.begin().await?;
        let user = self.user_repo.update_user(&mut *tx, user_id, input).await?;
        let profile = self.user_repo.update_profile(&mut *tx, user_id, input).await?;
        tx.commit().await?;

        Ok(self.build_me(user, profile))
    }

    /// Troca a foto do perfil; o arquivo anterior é apagado do disco.
    pub async fn upload_profile_photo(&self, user: User, file_name: &str, bytes: &[u8]) -> Result<Me, AppError> {
        let previous = self.profile_of(user.id).await?.photo_path;

        let path = self.media.save(PROFILE_PHOTO_FOLDER, file_name, bytes).await?;
        let profile = match self.user_repo.set_profile_photo(user.id, &path).await {
            Ok(p) => p,
            Err(e) => {
                self.media.delete(&path).await;
                return Err(e);
            }
        };

        if let Some(old) = previous {
            self.media.delete(&old).await;
        }

        Ok(self.build_me(user, profile))
    }

    async fn profile_of(&self, user_id: Uuid) -> Result<Profile, AppError> {
        self.user_repo
            .find_profile(user_id)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    fn build_me(&self, user: User, profile: Profile) -> Me {
        let photo_url = profile.photo_path.as_deref().map(|p| self.media.url(p));
        Me {
            user,
            profile,
            photo_url,
        }
    }
}

fn encode_token(user_id: Uuid, secret: &str) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now + chrono::Duration::days(TOKEN_TTL_DAYS);

    let claims = Claims {
        sub: user_id,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

fn decode_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_ref()), &Validation::default())
        .map_err(|_| AppError::InvalidToken)?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "segredo-de-teste";

    #[test]
    fn test_token_round_trip_keeps_subject() {
        let user_id = Uuid::new_v4();
        let token = encode_token(user_id, SECRET).unwrap();
        let claims = decode_token(&token, SECRET).unwrap();

        assert_eq!(claims.sub, user_id);
        let days = (claims.exp - claims.iat) / 86_400;
        assert_eq!(days, TOKEN_TTL_DAYS as usize);
    }

    #[test]
    fn test_token_with_wrong_secret_is_rejected() {
        let token = encode_token(Uuid::new_v4(), SECRET).unwrap();
        assert!(matches!(decode_token(&token, "outro"), Err(AppError::InvalidToken)));
        assert!(matches!(decode_token("lixo", SECRET), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_hash_password_verifies() {
        let hashed = hash_password("senha-forte-123").await.unwrap();
        assert!(verify("senha-forte-123", &hashed).unwrap());
        assert!(!verify("errada", &hashed).unwrap());
    }
}
