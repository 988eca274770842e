// src/middleware/rbac.rs

use axum::extract::{FromRef, FromRequestParts};
use axum::http::{request::Parts, StatusCode};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
};

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    fn slug() -> &'static str;
}

/// 2. O Extractor (Guardião). Superusuários passam sempre.
pub struct RequirePermission<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_request_parts(parts, state).await.unwrap_or_default();
        let i18n = &app_state.i18n_store;

        // A. Extrai Usuário
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale, i18n))?;

        if user.0.is_superuser {
            return Ok(RequirePermission(PhantomData));
        }

        // B. Verifica no Banco
        let required_perm = T::slug();
        let has_permission = app_state
            .rbac_repo
            .user_has_permission(user.0.id, required_perm)
            .await
            .map_err(|e| e.to_api_error(&locale, i18n))?;

        if !has_permission {
            return Err(ApiError {
                status: StatusCode::FORBIDDEN,
                error: i18n.translate(&locale.0, "error.missing_permission", &[("permission", required_perm)]),
                details: None,
            });
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

macro_rules! permission {
    ($name:ident, $slug:literal) => {
        pub struct $name;
        impl PermissionDef for $name {
            fn slug() -> &'static str {
                $slug
            }
        }
    };
}

permission!(PermBuildingAdd, "building:add");
permission!(PermBuildingChange, "building:change");
permission!(PermBuildingDelete, "building:delete");
permission!(PermApartmentAdd, "apartment:add");
permission!(PermApartmentChange, "apartment:change");
permission!(PermApartmentDelete, "apartment:delete");
permission!(PermReservationAdd, "reservation:add");
permission!(PermAmenityAdd, "amenity:add");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugs_match_seeded_permissions() {
        let seed = include_str!("../../migrations/20250101000002_roles_and_permissions.sql");
        for slug in [
            PermBuildingAdd::slug(),
            PermBuildingChange::slug(),
            PermBuildingDelete::slug(),
            PermApartmentAdd::slug(),
            PermApartmentChange::slug(),
            PermApartmentDelete::slug(),
            PermReservationAdd::slug(),
            PermAmenityAdd::slug(),
        ] {
            assert!(seed.contains(&format!("'{}'", slug)), "permissão {} não semeada", slug);
        }
    }
}
