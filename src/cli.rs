//! CLI definitions for rundeck-provider.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Manage Rundeck jobs declared in TOML files.
#[derive(Parser)]
#[command(name = "rundeck-provider")]
#[command(about = "Declarative Rundeck job management")]
#[command(version)]
pub(crate) struct Cli {
    /// Provider configuration file path
    #[arg(short, long, default_value = "provider.toml", global = true)]
    pub config: String,

    /// Rundeck server URL (overrides the configuration file)
    #[arg(long, env = "RUNDECK_URL", global = true)]
    pub url: Option<String>,

    /// API token (overrides the configuration file)
    #[arg(long, env = "RUNDECK_AUTH_TOKEN", global = true, hide_env_values = true)]
    pub auth_token: Option<String>,

    #[command(subcommand)]
    pub command: JobAction,
}

#[derive(Subcommand)]
pub(crate) enum JobAction {
    /// Decode a job file without contacting the server
    Validate {
        /// Job definition file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Create a job from a job file
    Create {
        /// Job definition file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Replace an existing job with the contents of a job file
    Update {
        /// Job definition file
        #[arg(short, long)]
        file: PathBuf,

        /// Job ID
        #[arg(long)]
        id: String,
    },

    /// Print a job as configuration state
    Read {
        /// Job ID
        #[arg(long)]
        id: String,

        /// Job file to refresh instead of starting from an empty state
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Check whether a job exists
    Exists {
        /// Job ID
        #[arg(long)]
        id: String,
    },

    /// Delete a job
    Delete {
        /// Job ID
        #[arg(long)]
        id: String,
    },
}

impl JobAction {
    /// Whether the action talks to the server.
    pub fn is_remote(&self) -> bool {
        !matches!(self, JobAction::Validate { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_update() {
        let cli = Cli::try_parse_from([
            "rundeck-provider",
            "update",
            "--file",
            "job.toml",
            "--id",
            "abc-123",
        ])
        .unwrap();
        assert_eq!(cli.config, "provider.toml");
        match cli.command {
            JobAction::Update { file, id } => {
                assert_eq!(file, PathBuf::from("job.toml"));
                assert_eq!(id, "abc-123");
            }
            _ => panic!("Expected Update"),
        }
    }

    #[test]
    fn test_parse_global_overrides() {
        let cli = Cli::try_parse_from([
            "rundeck-provider",
            "exists",
            "--id",
            "abc-123",
            "--url",
            "https://rundeck.example.com",
            "--auth-token",
            "secret",
        ])
        .unwrap();
        assert_eq!(cli.url.as_deref(), Some("https://rundeck.example.com"));
        assert_eq!(cli.auth_token.as_deref(), Some("secret"));
        assert!(cli.command.is_remote());
    }

    #[test]
    fn test_parse_read_without_file() {
        let cli = Cli::try_parse_from(["rundeck-provider", "read", "--id", "abc-123"]).unwrap();
        assert!(matches!(cli.command, JobAction::Read { file: None, .. }));
    }

    #[test]
    fn test_validate_is_local() {
        let cli = Cli::try_parse_from(["rundeck-provider", "validate", "-f", "job.toml"]).unwrap();
        assert!(!cli.command.is_remote());
    }

    #[test]
    fn test_update_requires_id() {
        assert!(Cli::try_parse_from(["rundeck-provider", "update", "--file", "job.toml"]).is_err());
    }
}
