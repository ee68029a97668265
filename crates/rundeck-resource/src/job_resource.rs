//! Create/read/update/delete lifecycle of a `rundeck_job` resource.

use std::sync::Arc;

use rundeck_client::{ImportMode, JobClient};
use tracing::{debug, info};

use crate::data::ResourceData;
use crate::error::ResourceError;
use crate::mapper::{decode_job, encode_job};

/// Drives a [`ResourceData`] through its lifecycle against a job server.
///
/// Every operation issues its remote calls one after another and returns the
/// first failure unchanged; nothing is retried.
#[derive(Clone)]
pub struct JobResource {
    client: Arc<dyn JobClient>,
}

impl JobResource {
    pub fn new(client: Arc<dyn JobClient>) -> Self {
        Self { client }
    }

    /// Import the declared job as new, record the assigned ID, then refresh
    /// the configuration from the server.
    pub async fn create(&self, data: &mut ResourceData) -> Result<(), ResourceError> {
        self.import(data, ImportMode::Create).await
    }

    /// Import the declared job over the existing one, then refresh.
    pub async fn update(&self, data: &mut ResourceData) -> Result<(), ResourceError> {
        self.import(data, ImportMode::Update).await
    }

    async fn import(&self, data: &mut ResourceData, mode: ImportMode) -> Result<(), ResourceError> {
        let job = decode_job(data)?;
        let summary = self.client.import_job(&job, mode).await?;
        info!(
            "Imported job '{}' ({}) with mode {}",
            job.name,
            summary.id,
            mode.dupe_option()
        );

        data.set_id(summary.id);
        self.read(data).await
    }

    /// Delete the job and clear the resource ID.
    pub async fn delete(&self, data: &mut ResourceData) -> Result<(), ResourceError> {
        self.client.delete_job(data.id()).await?;
        info!("Deleted job {}", data.id());
        data.set_id("");
        Ok(())
    }

    /// Whether the job still exists on the server. Only a not-found answer
    /// means `false`; any other failure is reported.
    pub async fn exists(&self, data: &ResourceData) -> Result<bool, ResourceError> {
        match self.client.get_job(data.id()).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => {
                debug!("Job {} no longer exists", data.id());
                Ok(false)
            }
            Err(e) => Err(ResourceError::ExistenceCheck(e)),
        }
    }

    /// Overwrite the configuration with the job as the server sees it.
    pub async fn read(&self, data: &mut ResourceData) -> Result<(), ResourceError> {
        let job = self.client.get_job(data.id()).await?;
        debug!("Read job {} from server", job.id);
        encode_job(&job, data);
        Ok(())
    }
}

#[cfg(test)]
#[path = "job_resource_tests.rs"]
mod tests;
