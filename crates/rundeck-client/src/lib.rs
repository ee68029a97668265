//! Rundeck job model and REST client.
//!
//! [`JobDefinition`] is the strongly-typed job as the server stores it.
//! [`JobClient`] is the narrow slice of the server API the job resource
//! needs: import, fetch and delete.

mod api;
mod client;
mod error;
mod job;
mod wire;

pub use api::ImportMode;
pub use client::{JobClient, RundeckClient, DEFAULT_API_VERSION};
#[cfg(feature = "mock")]
pub use client::MockJobClient;
pub use error::ClientError;
pub use job::*;
