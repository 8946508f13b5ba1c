use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub mod validator;

use crate::cli::Cli;

/// Default agent service endpoint (`langgraph dev`)
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:2024";
/// Graph id the PMM agent is deployed under
pub const DEFAULT_ASSISTANT_ID: &str = "pmm_agent";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub service: ServiceSettings,
    #[serde(default)]
    pub repl: ReplSettings,
}

/// Connection to the remote agent service
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceSettings {
    /// Base URL of the agent service
    #[serde(default = "default_url")]
    pub url: String,
    /// Assistant (graph) to run
    #[serde(default = "default_assistant_id")]
    pub assistant_id: String,
    /// Environment variable containing the API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    /// Seconds without a stream event before a run fails (0 disables)
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    /// TCP connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

fn default_url() -> String {
    DEFAULT_SERVICE_URL.to_string()
}

fn default_assistant_id() -> String {
    DEFAULT_ASSISTANT_ID.to_string()
}

fn default_idle_timeout() -> u64 {
    300
}

fn default_connect_timeout() -> u64 {
    10
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            url: default_url(),
            assistant_id: default_assistant_id(),
            api_key_env: None,
            idle_timeout_seconds: default_idle_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

impl ServiceSettings {
    /// Idle timeout as a duration, `None` when disabled
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_seconds > 0).then(|| Duration::from_secs(self.idle_timeout_seconds))
    }
}

/// Terminal front end options
#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ReplSettings {
    /// Print tool call arguments next to each tool call
    #[serde(default)]
    pub show_tool_args: bool,
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_root(".")
    }

    /// Create settings from CLI arguments (includes config file and CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let mut settings = Self::load(File::from(cli.config.clone()).required(false))?;

        // CLI > env vars > config file
        settings.apply_cli_overrides(cli);

        settings.validate()?;
        Ok(settings)
    }

    /// Load `pmm.toml` (or any supported extension) from a directory
    pub fn from_root(root: &str) -> Result<Self, anyhow::Error> {
        let config_path = Path::new(root).join("pmm");
        let settings = Self::load(File::from(config_path).required(false))?;
        settings.validate()?;
        Ok(settings)
    }

    fn load<S>(source: S) -> Result<Self, anyhow::Error>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let s = Config::builder()
            .set_default("service.url", DEFAULT_SERVICE_URL)?
            .set_default("service.assistant_id", DEFAULT_ASSISTANT_ID)?
            .add_source(source)
            .build()?;

        Ok(s.try_deserialize()?)
    }

    /// Apply CLI argument overrides to settings
    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(url) = &cli.url {
            self.service.url = url.clone();
        }
        if let Some(assistant_id) = &cli.assistant_id {
            self.service.assistant_id = assistant_id.clone();
        }
        if let Some(api_key_env) = &cli.api_key_env {
            self.service.api_key_env = Some(api_key_env.clone());
        }
        if let Some(idle_timeout) = cli.idle_timeout {
            self.service.idle_timeout_seconds = idle_timeout;
        }
        if cli.show_tool_args {
            self.repl.show_tool_args = true;
        }
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_overrides_file_values() {
        let mut settings = Settings::default();
        let cli = Cli::parse_from([
            "pmm-chat",
            "--url",
            "https://agent.example.com",
            "--assistant-id",
            "pmm_eval",
            "--idle-timeout",
            "0",
        ]);
        settings.apply_cli_overrides(&cli);

        assert_eq!(settings.service.url, "https://agent.example.com");
        assert_eq!(settings.service.assistant_id, "pmm_eval");
        assert_eq!(settings.service.idle_timeout(), None);
        assert!(!settings.repl.show_tool_args);
    }

    #[test]
    fn test_default_idle_timeout() {
        let settings = ServiceSettings::default();
        assert_eq!(settings.idle_timeout(), Some(Duration::from_secs(300)));
    }
}
