// handlers/protected/mod.rs - Protected handlers (verified identity required)
//
// Security Level: Bearer token verified by the identity provider
// Middleware: identity_middleware (injects AuthenticatedIdentity)

pub mod admin_check;

pub use admin_check::admin_check;
