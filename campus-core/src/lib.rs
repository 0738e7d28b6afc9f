//! Campus Core - shared types, errors, configuration and logging
//!
//! Everything the API client, the views and the command-line console have in common

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;

// Re-export commonly used external types
pub use tracing;
