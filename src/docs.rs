// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::update_profile,
        handlers::auth::upload_photo,
        handlers::auth::my_apartments,

        // --- RBAC ---
        handlers::rbac::list_permissions,

        // --- Buildings ---
        handlers::buildings::list_buildings,
        handlers::buildings::get_building,
        handlers::buildings::list_cities,
        handlers::buildings::create_building,
        handlers::buildings::update_building,
        handlers::buildings::delete_building,
        handlers::buildings::upload_facade,

        // --- Apartments ---
        handlers::apartments::list_apartments,
        handlers::apartments::get_apartment,
        handlers::apartments::create_apartment,
        handlers::apartments::update_apartment,
        handlers::apartments::delete_apartment,
        handlers::apartments::upload_main_photo,
        handlers::apartments::add_photo,
        handlers::apartments::delete_photo,

        // --- Amenities ---
        handlers::amenities::list_amenities,
        handlers::amenities::create_amenity,

        // --- Reservations ---
        handlers::reservations::create_reservation,
        handlers::reservations::list_my_reservations,
        handlers::reservations::get_reservation,
        handlers::reservations::approve_reservation,
        handlers::reservations::reject_reservation,
        handlers::reservations::cancel_reservation,

        // --- Reviews ---
        handlers::reservations::create_review,
        handlers::apartments::list_reviews,

        // --- Dashboard ---
        handlers::dashboard::owner_dashboard,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::UserRole,
            models::auth::Profile,
            models::auth::Me,
            models::auth::UserSummary,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::UpdateProfilePayload,
            models::auth::AuthResponse,

            // --- RBAC ---
            models::rbac::Permission,
            models::rbac::RolePermissions,
            models::rbac::PermissionCatalog,

            // --- Catálogo ---
            models::building::Building,
            models::building::BuildingDetail,
            models::building::CreateBuildingPayload,
            models::building::UpdateBuildingPayload,
            models::apartment::Amenity,
            models::apartment::CreateAmenityPayload,
            models::apartment::Apartment,
            models::apartment::ApartmentListEntry,
            models::apartment::ApartmentPhoto,
            models::apartment::RatingSummary,
            models::apartment::ApartmentDetail,
            models::apartment::CreateApartmentPayload,
            models::apartment::UpdateApartmentPayload,
            handlers::upload::UploadForm,

            // --- Reservas ---
            models::reservation::ReservationStatus,
            models::reservation::Reservation,
            models::reservation::ReservationView,
            models::reservation::CreateReservationPayload,
            models::reservation::StatusChangeResponse,
            models::review::Review,
            models::review::ReviewView,
            models::review::ReviewEntry,
            models::review::CreateReviewPayload,

            // --- Dashboard ---
            models::dashboard::StatusCounts,
            models::dashboard::OwnerDashboard,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "RBAC", description = "Papéis e Permissões"),
        (name = "Buildings", description = "Prédios e Condomínios"),
        (name = "Apartments", description = "Unidades para aluguel e suas fotos"),
        (name = "Amenities", description = "Comodidades"),
        (name = "Reservations", description = "Pedidos de reserva e o fluxo de aprovação"),
        (name = "Reviews", description = "Avaliações de estadias"),
        (name = "Dashboard", description = "Painel do Proprietário")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("api_jwt", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_core_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/login",
            "/api/apartments",
            "/api/apartments/{id}/reservations",
            "/api/reservations/{id}/approve",
            "/api/dashboard",
        ] {
            assert!(doc.paths.paths.contains_key(path), "rota {} ausente", path);
        }
    }
}
