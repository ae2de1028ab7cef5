pub mod auth_service;
pub mod diff_service;
