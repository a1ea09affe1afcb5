//! HTTP surface for the care registry.
//!
//! Mounts the doctor, patient and assignment resources under `/api`,
//! authenticates `Authorization: Bearer <token>` and maps access-layer
//! errors onto status codes.

pub mod api;
pub mod config;

pub use api::router::api_router;
pub use api::server::{start_server, RegistryServer};
pub use config::ServerConfig;
