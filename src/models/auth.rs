// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    #[schema(example = "maria")]
    pub username: String,
    #[schema(example = "maria@exemplo.com")]
    pub email: String,
    pub first_name: String,
    pub last_name: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    pub is_active: bool,
    pub is_superuser: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

// Papel do usuário. Define o "grupo" de permissões (ver migração de permissões).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Client,
    Owner,
    Manager,
    Staff,
}

impl UserRole {
    // Só estes papéis podem ser escolhidos no cadastro público.
    pub fn is_self_assignable(self) -> bool {
        matches!(self, UserRole::Client | UserRole::Owner)
    }
}

// Perfil estendido (um para um com o usuário)
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[schema(ignore)]
    pub user_id: Uuid,
    pub role: UserRole,
    #[schema(example = "(74) 99999-9999")]
    pub phone: String,
    pub bio: String,
    pub photo_path: Option<String>,
    pub updated_at: DateTime<Utc>,
}

// Resposta do /me
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Me {
    #[serde(flatten)]
    pub user: User,
    pub profile: Profile,
    pub photo_url: Option<String>,
}

// Dados públicos do proprietário exibidos nos anúncios
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    let ok = username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if !ok {
        let mut err = ValidationError::new("username");
        err.message = Some("Use apenas letras, números e @/./+/-/_".into());
        return Err(err);
    }
    Ok(())
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(
        length(min = 3, max = 150, message = "O usuário deve ter entre 3 e 150 caracteres."),
        custom(function = "validate_username")
    )]
    #[schema(example = "maria")]
    pub username: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "maria@exemplo.com")]
    pub email: String,

    #[validate(length(min = 8, message = "A senha deve ter no mínimo 8 caracteres."))]
    pub password: String,

    #[serde(default)]
    #[validate(length(max = 150, message = "Nome muito longo."))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(max = 150, message = "Sobrenome muito longo."))]
    pub last_name: String,

    // CLIENT (padrão) ou OWNER
    pub role: Option<UserRole>,
}

// Dados para login. `username` aceita o nome de usuário OU o e-mail.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(length(min = 1, message = "Informe o usuário ou e-mail."))]
    #[schema(example = "maria@exemplo.com")]
    pub username: String,
    #[validate(length(min = 1, message = "Informe a senha."))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    #[validate(length(max = 150, message = "Nome muito longo."))]
    pub first_name: Option<String>,
    #[validate(length(max = 150, message = "Sobrenome muito longo."))]
    pub last_name: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    #[validate(length(max = 20, message = "O telefone deve ter no máximo 20 caracteres."))]
    pub phone: Option<String>,
    pub bio: Option<String>,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(username: &str, email: &str, password: &str) -> RegisterUserPayload {
        RegisterUserPayload {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            first_name: String::new(),
            last_name: String::new(),
            role: None,
        }
    }

    #[test]
    fn test_register_payload_validation() {
        assert!(payload("maria", "maria@exemplo.com", "segredo123").validate().is_ok());

        let errors = payload("m", "nao-e-email", "curta").validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_username_rejects_spaces() {
        assert!(payload("maria silva", "maria@exemplo.com", "segredo123").validate().is_err());
    }

    #[test]
    fn test_only_client_and_owner_are_self_assignable() {
        assert!(UserRole::Client.is_self_assignable());
        assert!(UserRole::Owner.is_self_assignable());
        assert!(!UserRole::Manager.is_self_assignable());
        assert!(!UserRole::Staff.is_self_assignable());
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&UserRole::Owner).unwrap(), "\"OWNER\"");
        let role: UserRole = serde_json::from_str("\"CLIENT\"").unwrap();
        assert_eq!(role, UserRole::Client);
    }
}
