// handlers/mod.rs - HTTP handlers
//
// Handlers extract, delegate to the pipeline, and wrap the result in the
// response envelope. Access rules live in the pipeline, not here.

pub mod auth;      // register, login, whoami
pub mod inventory; // /api/inventory
pub mod ops;       // /api/query
pub mod system;    // /, /health, fallback
pub mod users;     // /api/users
