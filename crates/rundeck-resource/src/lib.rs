//! The `rundeck_job` resource.
//!
//! A job is declared as a loosely-typed configuration tree ([`ResourceData`])
//! that must conform to [`job_schema`]. The mapper turns that tree into a
//! [`JobDefinition`](rundeck_client::JobDefinition) and back, and
//! [`JobResource`] drives the create/read/update/delete lifecycle against a
//! [`JobClient`](rundeck_client::JobClient).

mod data;
mod error;
mod job_resource;
mod mapper;
mod schedule;
mod schema;

pub use data::{Block, ResourceData};
pub use error::{BlockKind, ResourceError};
pub use job_resource::JobResource;
pub use mapper::{decode_job, encode_job};
pub use schedule::{format_schedule, parse_schedule};
pub use schema::{job_schema, Field, FieldType, Schema};
