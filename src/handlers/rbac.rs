// src/handlers/rbac.rs

use axum::{extract::State, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::rbac::PermissionCatalog,
};

// GET /api/permissions (Para o frontend saber o que cada papel pode fazer)
#[utoipa::path(
    get,
    path = "/api/permissions",
    tag = "RBAC",
    responses(
        (status = 200, description = "Permissões e as concessões de cada papel", body = PermissionCatalog)
    )
)]
pub async fn list_permissions(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<PermissionCatalog>, ApiError> {
    let to_api = |e: crate::common::error::AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let permissions = app_state.rbac_repo.list_all_permissions().await.map_err(to_api)?;
    let grants = app_state.rbac_repo.list_role_grants().await.map_err(to_api)?;

    Ok(Json(PermissionCatalog::new(permissions, grants)))
}
