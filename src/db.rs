pub mod user_repo;
pub use user_repo::UserRepository;
pub mod building_repo;
pub use building_repo::BuildingRepository;
pub mod apartment_repo;
pub use apartment_repo::ApartmentRepository;
pub mod amenity_repo;
pub use amenity_repo::AmenityRepository;
pub mod reservation_repo;
pub use reservation_repo::ReservationRepository;
pub mod review_repo;
pub use review_repo::ReviewRepository;
pub mod rbac_repo;
pub use rbac_repo::RbacRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
