// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None
// Middleware: None (no authentication or authorization)
//
// Search is reachable without a token; every admin endpoint is gated.

pub mod search;
pub mod system;

pub use search::search_post;
pub use system::{health, root};
