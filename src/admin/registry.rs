use parking_lot::RwLock;
use thiserror::Error;

use super::record::AdminRecord;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("User is already an admin: {0}")]
    AlreadyExists(String),
}

/// In-process set of admin grants.
///
/// Records live for the lifetime of the process only. Every operation takes the
/// lock for its own duration, so uniqueness is re-checked atomically on `add`
/// even when a caller's earlier `is_admin` check has gone stale.
#[derive(Debug, Default)]
pub struct AdminRegistry {
    records: RwLock<Vec<AdminRecord>>,
}

impl AdminRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry pre-populated with bootstrap admins
    pub fn with_bootstrap<I, S>(emails: I, added_by: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let registry = Self::new();
        registry.seed(emails, added_by);
        registry
    }

    /// Insert bootstrap records, skipping emails that are already present
    pub fn seed<I, S>(&self, emails: I, added_by: &str) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seeded = 0;
        for email in emails {
            let email = email.into();
            match self.add(&email, added_by) {
                Ok(_) => seeded += 1,
                Err(RegistryError::AlreadyExists(_)) => {
                    tracing::debug!("Bootstrap admin '{}' already present", email);
                }
            }
        }
        seeded
    }

    pub fn is_admin(&self, email: &str) -> bool {
        self.records.read().iter().any(|record| record.email == email)
    }

    /// Snapshot of all records in insertion order
    pub fn list(&self) -> Vec<AdminRecord> {
        self.records.read().clone()
    }

    pub fn add(&self, email: &str, added_by: &str) -> Result<AdminRecord, RegistryError> {
        let mut records = self.records.write();
        if records.iter().any(|record| record.email == email) {
            return Err(RegistryError::AlreadyExists(email.to_string()));
        }

        let record = AdminRecord::new(email, added_by);
        records.push(record.clone());
        Ok(record)
    }

    /// Remove the record for `email`. Absence is not an error; the return value
    /// only tells whether anything was removed.
    pub fn remove(&self, email: &str) -> bool {
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|record| record.email != email);
        records.len() != before
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}
