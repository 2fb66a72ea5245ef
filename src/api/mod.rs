//! HTTP surface for consultations.
//!
//! Routes are nested under `/api/`. Every route except the health check
//! passes through the identity middleware, which resolves the caller's
//! `OwnerIdentity` from the upstream authentication header.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_server, ApiServer, ServerInfo};
pub use types::ApiContext;
