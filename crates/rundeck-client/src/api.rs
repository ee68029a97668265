//! Wire types for the job import endpoint.

use serde::Deserialize;

use crate::job::JobSummary;

/// How an import treats a job that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Fail if a job with the same identity exists.
    Create,
    /// Replace the existing job with the same identity.
    Update,
}

impl ImportMode {
    /// Value of the `dupeOption` query parameter.
    pub fn dupe_option(self) -> &'static str {
        match self {
            ImportMode::Create => "create",
            ImportMode::Update => "update",
        }
    }
}

/// Body returned by `POST /project/{project}/jobs/import`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ImportResult {
    pub succeeded: Vec<JobSummary>,
    pub failed: Vec<ImportFailure>,
    pub skipped: Vec<JobSummary>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ImportFailure {
    pub index: Option<u32>,
    pub name: Option<String>,
    pub error: Option<String>,
}

impl ImportFailure {
    pub fn describe(&self) -> String {
        let error = self.error.as_deref().unwrap_or("unknown error");
        match (&self.name, self.index) {
            (Some(name), _) => format!("{}: {}", name, error),
            (None, Some(index)) => format!("job #{}: {}", index, error),
            (None, None) => error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dupe_option() {
        assert_eq!(ImportMode::Create.dupe_option(), "create");
        assert_eq!(ImportMode::Update.dupe_option(), "update");
    }

    #[test]
    fn test_import_result_deserialization() {
        let json = serde_json::json!({
            "succeeded": [{"index": 1, "id": "abc", "name": "backup", "group": "ops", "project": "infra"}],
            "failed": [],
            "skipped": []
        });
        let result: ImportResult = serde_json::from_value(json).unwrap();
        assert_eq!(result.succeeded.len(), 1);
        assert_eq!(result.succeeded[0].id, "abc");
        assert!(result.failed.is_empty());
    }

    #[test]
    fn test_import_result_missing_lists() {
        let result: ImportResult = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(result.succeeded.is_empty());
        assert!(result.failed.is_empty());
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn test_import_failure_describe() {
        let named = ImportFailure {
            index: Some(1),
            name: Some("backup".to_string()),
            error: Some("Job already exists".to_string()),
        };
        assert_eq!(named.describe(), "backup: Job already exists");

        let indexed = ImportFailure {
            index: Some(2),
            name: None,
            error: Some("invalid".to_string()),
        };
        assert_eq!(indexed.describe(), "job #2: invalid");

        assert_eq!(ImportFailure::default().describe(), "unknown error");
    }
}
