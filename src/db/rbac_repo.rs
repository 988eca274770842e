// src/db/rbac_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::rbac::{Permission, RoleGrant},
};

#[derive(Clone)]
pub struct RbacRepository {
    pool: PgPool,
}

impl RbacRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Todas as permissões disponíveis (para o Frontend montar a tela)
    pub async fn list_all_permissions(&self) -> Result<Vec<Permission>, AppError> {
        let permissions = sqlx::query_as::<_, Permission>(
            "SELECT slug, description, module FROM permissions ORDER BY module, slug",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(permissions)
    }

    pub async fn list_role_grants(&self) -> Result<Vec<RoleGrant>, AppError> {
        let grants = sqlx::query_as::<_, RoleGrant>(
            "SELECT role, permission_slug FROM role_permissions ORDER BY role, permission_slug",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(grants)
    }

    /// O papel vem do perfil; usuários inativos não têm permissão nenhuma.
    pub async fn user_has_permission(&self, user_id: Uuid, permission_slug: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM users u
                JOIN profiles pr ON pr.user_id = u.id
                JOIN role_permissions rp ON rp.role = pr.role
                WHERE u.id = $1
                  AND u.is_active = TRUE
                  AND rp.permission_slug = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(permission_slug)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
