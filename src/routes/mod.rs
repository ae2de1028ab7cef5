pub mod api;
pub mod auth_middleware;
pub mod error_middleware;

pub use api::create_api_routes;
