pub mod apartment;
pub mod auth;
pub mod building;
pub mod dashboard;
pub mod rbac;
pub mod reservation;
pub mod review;
