// handlers/elevated/mod.rs - Elevated handlers (admin identity required)
//
// Security Level: Bearer token whose email is in the admin registry
// Middleware: admin_middleware (injects AdminCaller)
//
// Authentication failures surface as 401, authenticated non-admins as 403.
// Both are decided before the request body is read.

pub mod admin;

pub use admin::{admin_add, admin_list, admin_remove};
