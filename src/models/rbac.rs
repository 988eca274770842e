// src/models/rbac.rs

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::auth::UserRole;

// O que sai do banco (Tabela Permissions)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[schema(example = "reservation:add")]
    pub slug: String,

    #[schema(example = "Solicitar reservas")]
    pub description: String,

    #[schema(example = "RESERVATION")]
    pub module: String,
}

// Uma linha de role_permissions
#[derive(Debug, Clone, FromRow)]
pub struct RoleGrant {
    pub role: UserRole,
    pub permission_slug: String,
}

// Permissões de um papel (o antigo "grupo")
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RolePermissions {
    pub role: UserRole,
    pub permissions: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionCatalog {
    pub permissions: Vec<Permission>,
    pub roles: Vec<RolePermissions>,
}

impl PermissionCatalog {
    /// Agrupa as concessões por papel, mantendo a ordem em que chegam.
    pub fn new(permissions: Vec<Permission>, grants: Vec<RoleGrant>) -> Self {
        let mut roles: Vec<RolePermissions> = Vec::new();
        for grant in grants {
            match roles.iter_mut().find(|r| r.role == grant.role) {
                Some(entry) => entry.permissions.push(grant.permission_slug),
                None => roles.push(RolePermissions {
                    role: grant.role,
                    permissions: vec![grant.permission_slug],
                }),
            }
        }
        Self { permissions, roles }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(role: UserRole, slug: &str) -> RoleGrant {
        RoleGrant {
            role,
            permission_slug: slug.into(),
        }
    }

    #[test]
    fn test_catalog_groups_by_role() {
        let catalog = PermissionCatalog::new(
            vec![],
            vec![
                grant(UserRole::Client, "reservation:add"),
                grant(UserRole::Client, "reservation:view"),
                grant(UserRole::Staff, "building:view"),
            ],
        );

        assert_eq!(catalog.roles.len(), 2);
        assert_eq!(catalog.roles[0].role, UserRole::Client);
        assert_eq!(catalog.roles[0].permissions, vec!["reservation:add", "reservation:view"]);
        assert_eq!(catalog.roles[1].permissions, vec!["building:view"]);
    }
}
