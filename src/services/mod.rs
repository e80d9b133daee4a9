pub mod admin_service;

pub use admin_service::{AddedAdmin, AdminError, AdminService, MutationOutcome, RemovedAdmin};
