pub mod auth;
pub mod bootstrap;
pub mod catalog_service;
pub mod dashboard_service;
pub mod notification_service;
pub mod reservation_service;
pub mod review_service;
