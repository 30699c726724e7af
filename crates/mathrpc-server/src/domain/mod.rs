//! Domain layer for mathrpc-server.
//!
//! Contains pure types with no dependencies on I/O, networking, or external
//! frameworks.  The wire message types themselves live in `mathrpc-core`
//! because the client needs them too; what remains here is configuration.

pub mod config;

pub use config::ServerConfig;
