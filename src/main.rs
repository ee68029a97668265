//! rundeck-provider - declarative Rundeck job management
//!
//! Loads the provider configuration, connects to Rundeck and runs one job
//! lifecycle command.

mod cli;
mod cmd_job;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rundeck_client::RundeckClient;
use rundeck_config::{Config, ConfigLoader, ConfigValidator, ProviderConfig};
use rundeck_resource::JobResource;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();
    let provider = load_provider_config(&cli)?;

    let resource = if cli.command.is_remote() {
        Some(build_resource(&provider)?)
    } else {
        None
    };

    cmd_job::handle_job_command(cli.command, resource).await
}

/// Logs go to stderr; stdout carries command output only.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Read the configuration file if present, apply CLI overrides and validate.
fn load_provider_config(cli: &Cli) -> Result<ProviderConfig, Box<dyn std::error::Error>> {
    let path = ConfigLoader::expand_path(&cli.config);
    let mut config = if Path::new(&path).exists() {
        debug!("Loading configuration from {}", path);
        ConfigLoader::load(Path::new(&path))?
    } else {
        debug!("No configuration file at {}, using defaults", path);
        Config::default()
    };

    if let Some(ref url) = cli.url {
        config.provider.url = url.clone();
    }
    if let Some(ref token) = cli.auth_token {
        config.provider.auth_token = Some(token.clone());
    }

    for warning in ConfigValidator::validate(&config).into_result()? {
        warn!("{}: {}", warning.path, warning.message);
    }

    Ok(config.provider)
}

fn build_resource(provider: &ProviderConfig) -> Result<JobResource, Box<dyn std::error::Error>> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(provider.timeout_seconds))
        .build()?;

    let client = RundeckClient::with_http_client(&provider.url, provider.auth_token.clone(), http)?
        .with_api_version(provider.api_version);

    Ok(JobResource::new(Arc::new(client)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn cli_for(config: &str, extra: &[&str]) -> Cli {
        let mut args = vec!["rundeck-provider", "--config", config];
        args.extend_from_slice(extra);
        args.extend_from_slice(&["exists", "--id", "abc-123"]);
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let cli = cli_for("/nonexistent/provider.toml", &["--auth-token", "secret"]);
        let provider = load_provider_config(&cli).unwrap();
        assert_eq!(provider.url, "http://localhost:4440");
        assert_eq!(provider.api_version, 24);
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [provider]
            url = "https://file.example.com"
            auth_token = "from-file"
            api_version = 18
            "#
        )
        .unwrap();
        let config_path = file.path().to_string_lossy().to_string();

        let cli = cli_for(&config_path, &["--url", "https://cli.example.com", "--auth-token", "from-cli"]);
        let provider = load_provider_config(&cli).unwrap();
        assert_eq!(provider.url, "https://cli.example.com");
        assert_eq!(provider.auth_token.as_deref(), Some("from-cli"));
        assert_eq!(provider.api_version, 18);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let cli = cli_for("/nonexistent/provider.toml", &["--url", "ftp://rundeck"]);
        assert!(load_provider_config(&cli).is_err());
    }

    #[test]
    fn test_build_resource() {
        let provider = ProviderConfig::default();
        assert!(build_resource(&provider).is_ok());
    }
}
