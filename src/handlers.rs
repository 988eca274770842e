pub mod amenities;
pub mod apartments;
pub mod auth;
pub mod buildings;
pub mod dashboard;
pub mod rbac;
pub mod reservations;
pub mod upload;
