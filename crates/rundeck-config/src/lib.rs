//! # Rundeck Config
//!
//! Connection settings for the Rundeck job resource: where the server lives,
//! how to authenticate, and which API version to speak.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
