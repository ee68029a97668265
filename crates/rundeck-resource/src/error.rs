//! Resource errors.

use std::fmt;

use rundeck_client::ClientError;
use thiserror::Error;

/// Nested blocks a command may carry at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Job,
    StepPlugin,
    NodeStepPlugin,
}

impl BlockKind {
    /// Configuration key of the block.
    pub fn key(self) -> &'static str {
        match self {
            BlockKind::Job => "job",
            BlockKind::StepPlugin => "step_plugin",
            BlockKind::NodeStepPlugin => "node_step_plugin",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("Invalid configuration at {path}: {message}")]
    InvalidConfig { path: String, message: String },

    #[error("Invalid configuration at {path}: a command may have no more than one {kind} block")]
    TooManyBlocks { path: String, kind: BlockKind },

    #[error(
        "Invalid schedule '{expression}': expected a Quartz cron expression with 7 space-separated fields \
         (seconds minute hour day-of-month month day-of-week year), found {fields}. \
         See http://www.quartz-scheduler.org/documentation/quartz-2.2.x/tutorials/tutorial-lesson-06.html"
    )]
    InvalidSchedule { expression: String, fields: usize },

    #[error("Invalid job document: {0}")]
    InvalidDocument(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Error checking if job exists: {0}")]
    ExistenceCheck(#[source] ClientError),
}

impl ResourceError {
    pub fn invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        ResourceError::InvalidConfig {
            path: path.into(),
            message: message.into(),
        }
    }
}
