// dantewatch-api: Async Rust client for the Dante Director GraphQL API

pub mod client;
pub mod error;
pub mod query;
pub mod transport;
pub mod types;

pub use client::DirectorClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
