//! Engine side of the serde layer: TOML configuration, the plugin catalog
//! and the name-based serde host.

pub mod config;
pub mod error;
pub mod host;

pub use config::{EngineConfig, SerdeConfig};
pub use error::EngineError;
pub use host::{SerdeCatalog, SerdeFactory, SerdeHost};
