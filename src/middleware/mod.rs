pub mod auth;
pub mod cors;

pub use auth::{admin_middleware, identity_middleware, AuthenticatedIdentity};
pub use cors::cors_layer;
