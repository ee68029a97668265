//! Job subcommand handlers.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use rundeck_config::ConfigLoader;
use rundeck_resource::{decode_job, JobResource, ResourceData};

use crate::cli::JobAction;

/// Handle a job subcommand. `resource` is only needed for remote actions.
pub(crate) async fn handle_job_command(
    action: JobAction,
    resource: Option<JobResource>,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        JobAction::Validate { file } => job_validate(&file),
        JobAction::Create { file } => {
            let resource = require(resource)?;
            let mut data = load_job_file(&file)?;
            resource.create(&mut data).await?;
            print_json(&data)
        }
        JobAction::Update { file, id } => {
            let resource = require(resource)?;
            let mut data = load_job_file(&file)?;
            data.set_id(id);
            resource.update(&mut data).await?;
            print_json(&data)
        }
        JobAction::Read { id, file } => {
            let resource = require(resource)?;
            let mut data = match file {
                Some(ref file) => load_job_file(file)?,
                None => ResourceData::new(),
            };
            data.set_id(id);
            resource.read(&mut data).await?;
            print_json(&data)
        }
        JobAction::Exists { id } => {
            let resource = require(resource)?;
            let mut data = ResourceData::new();
            data.set_id(id);
            let exists = resource.exists(&data).await?;
            print_json(&serde_json::json!({ "id": data.id(), "exists": exists }))
        }
        JobAction::Delete { id } => {
            let resource = require(resource)?;
            let mut data = ResourceData::new();
            data.set_id(id.as_str());
            resource.delete(&mut data).await?;
            print_json(&serde_json::json!({ "id": id, "deleted": true }))
        }
    }
}

fn require(resource: Option<JobResource>) -> Result<JobResource, Box<dyn std::error::Error>> {
    Ok(resource.ok_or("no Rundeck client configured")?)
}

/// Decode a job file and print the job that would be sent to the server.
fn job_validate(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data = load_job_file(file)?;
    let job = decode_job(&data)?;
    info!("{} is a valid job definition", file.display());
    print_json(&job)
}

pub(crate) fn load_job_file(file: &Path) -> Result<ResourceData, Box<dyn std::error::Error>> {
    let path = ConfigLoader::expand_path(&file.to_string_lossy());
    let content = fs::read_to_string(&path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
    Ok(ResourceData::from_toml_str(&content)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
