pub mod add;
pub mod list;
pub mod remove;

use serde::{Deserialize, Serialize};

pub use add::admin_add;
pub use list::admin_list;
pub use remove::admin_remove;

/// Body of add/remove requests
#[derive(Debug, Deserialize)]
pub struct AdminRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminMutationResponse {
    pub message: String,
    /// Whether the identity provider's custom claims were updated too
    pub claims_mirrored: bool,
}
