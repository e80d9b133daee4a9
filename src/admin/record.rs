use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single grant of admin privilege, keyed by email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRecord {
    pub email: String,
    pub added_at: DateTime<Utc>,
    pub added_by: String,
}

impl AdminRecord {
    pub fn new(email: impl Into<String>, added_by: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            added_at: Utc::now(),
            added_by: added_by.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let record = AdminRecord::new("a@example.com", "system");
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["email"], "a@example.com");
        assert_eq!(value["addedBy"], "system");
        assert!(value["addedAt"].is_string());
        assert!(value.get("added_at").is_none());
    }
}
