mod file_config;

pub use file_config::FileConfig;

use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub upstream_url: Option<String>,
    pub upstream_timeout_sec: u64,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub selection_ttl_secs: i64,
    pub selection_prune_interval_secs: u64,
}

/// Fully-resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub upstream_url: String,
    pub upstream_timeout_sec: u64,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub selection_ttl_secs: i64,
    pub selection_prune_interval_secs: u64,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let upstream_url = file
            .upstream_url
            .or_else(|| cli.upstream_url.clone())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "upstream_url must be specified via --upstream-url or in config file"
                )
            })?;

        if !upstream_url.starts_with("http://") && !upstream_url.starts_with("https://") {
            bail!("upstream_url must be an http(s) URL: {:?}", upstream_url);
        }

        let upstream_timeout_sec = file
            .upstream_timeout_sec
            .unwrap_or(cli.upstream_timeout_sec);
        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let selection_ttl_secs = file.selection_ttl_secs.unwrap_or(cli.selection_ttl_secs);
        if selection_ttl_secs <= 0 {
            bail!(
                "selection_ttl_secs must be positive, got {}",
                selection_ttl_secs
            );
        }

        let selection_prune_interval_secs = file
            .selection_prune_interval_secs
            .unwrap_or(cli.selection_prune_interval_secs);
        if selection_prune_interval_secs == 0 {
            bail!("selection_prune_interval_secs must be positive");
        }

        Ok(AppConfig {
            upstream_url,
            upstream_timeout_sec,
            port,
            metrics_port,
            logging_level,
            frontend_dir_path,
            selection_ttl_secs,
            selection_prune_interval_secs,
        })
    }
}

fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_defaults() -> CliConfig {
        CliConfig {
            upstream_url: Some("http://localhost:8080".to_string()),
            upstream_timeout_sec: 30,
            port: 3001,
            metrics_port: 9091,
            logging_level: RequestsLoggingLevel::Path,
            frontend_dir_path: None,
            selection_ttl_secs: 3600,
            selection_prune_interval_secs: 600,
        }
    }

    #[test]
    fn resolves_from_cli_alone() {
        let config = AppConfig::resolve(&cli_defaults(), None).unwrap();
        assert_eq!(config.upstream_url, "http://localhost:8080");
        assert_eq!(config.port, 3001);
        assert_eq!(config.metrics_port, 9091);
        assert_eq!(config.selection_ttl_secs, 3600);
    }

    #[test]
    fn file_values_override_cli() {
        let file: FileConfig = toml::from_str(
            r#"
            port = 4000
            upstream_url = "https://music.example.com"
            logging_level = "headers"
            "#,
        )
        .unwrap();

        let config = AppConfig::resolve(&cli_defaults(), Some(file)).unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.upstream_url, "https://music.example.com");
        assert_eq!(config.logging_level, RequestsLoggingLevel::Headers);
        // Not present in the file, falls back to CLI
        assert_eq!(config.metrics_port, 9091);
    }

    #[test]
    fn missing_upstream_url_fails() {
        let cli = CliConfig {
            upstream_url: None,
            ..cli_defaults()
        };
        assert!(AppConfig::resolve(&cli, None).is_err());
    }

    #[test]
    fn non_http_upstream_url_fails() {
        let cli = CliConfig {
            upstream_url: Some("ftp://music.example.com".to_string()),
            ..cli_defaults()
        };
        assert!(AppConfig::resolve(&cli, None).is_err());
    }

    #[test]
    fn unknown_logging_level_in_file_falls_back_to_cli() {
        let file: FileConfig = toml::from_str(r#"logging_level = "chatty""#).unwrap();
        let config = AppConfig::resolve(&cli_defaults(), Some(file)).unwrap();
        assert_eq!(config.logging_level, RequestsLoggingLevel::Path);
    }

    #[test]
    fn zero_ttl_fails_validation() {
        let cli = CliConfig {
            selection_ttl_secs: 0,
            ..cli_defaults()
        };
        assert!(AppConfig::resolve(&cli, None).is_err());
    }
}
