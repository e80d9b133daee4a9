// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no auth) → Protected (verified bearer token) → Elevated (registered admin)
//
pub mod public;    // Tier 1: No authentication required (/, /health, /api/search)
pub mod protected; // Tier 2: Valid identity required (/api/admin/check)
pub mod elevated;  // Tier 3: Admin identity required (/api/admin/list|add|remove)
