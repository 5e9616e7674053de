// ABOUTME: Layered configuration loading - defaults, global and project
// ABOUTME: files, an explicit path, then TOOLRUN_ environment variables.

//! Configuration file loader with multi-source merging

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use super::ToolrunConfig;
use crate::error::ConfigError;

const PROJECT_FILES: [&str; 2] = ["toolrun.toml", ".toolrun.toml"];

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `TOOLRUN_` environment variables (`__` separates nested keys)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./toolrun.toml` or `./.toolrun.toml`
    /// 4. Global config: `<config dir>/toolrun/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<ToolrunConfig, ConfigError> {
        let config: ToolrunConfig = Self::figment(config_path)
            .extract()
            .map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// The merged provider chain, before extraction.
    pub fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(ToolrunConfig::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(&global_path));
            }
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed("TOOLRUN_").split("__"))
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("toolrun").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Describe the config file locations being used
    pub fn describe_sources(config_path: Option<&Path>) -> Vec<String> {
        let mut lines = Vec::new();

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            lines.push(format!("[{}] Explicit: {}", mark, path.display()));
        }

        match Self::project_config_path() {
            Some(path) => lines.push(format!("[FOUND] Project: {}", path.display())),
            None => lines.push("[     ] Project: ./toolrun.toml or ./.toolrun.toml".to_string()),
        }

        if let Some(path) = Self::global_config_path() {
            let mark = if path.exists() { "FOUND" } else { "     " };
            lines.push(format!("[{}] Global:  {}", mark, path.display()));
        }

        lines.push("[     ] Default: built-in defaults".to_string());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorKind;
    use crate::transport::Protocol;

    #[test]
    fn test_load_explicit_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
                [[tools]]
                name = "jira_call_api"
                category = "jira"
                capabilities = ["rest_api"]

                [transports.jira]
                base_url = "https://mcp.example.com/jira"

                [transports.webex]
                protocol = "rest"
                base_url = "https://webex.example.com"
                request_timeout_secs = 5

                [inference]
                generator = "ollama"
                model = "llama3.2"
                "#,
            )?;

            let config = ConfigLoader::load(Some(Path::new("custom.toml")))
                .map_err(|e| e.to_string())?;

            assert_eq!(config.tools.len(), 1);
            assert!(config.tools[0].is_generic_api());
            assert_eq!(config.transports["jira"].protocol, Protocol::JsonRpc);
            assert_eq!(config.transports["jira"].connect_timeout_secs, 10);
            assert_eq!(config.transports["webex"].protocol, Protocol::Rest);
            assert_eq!(config.transports["webex"].request_timeout_secs, 5);
            assert_eq!(config.inference.generator, GeneratorKind::Ollama);
            assert_eq!(config.executor.max_concurrency, 1);
            Ok(())
        });
    }

    #[test]
    fn test_project_file_and_env_override() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "toolrun.toml",
                r#"
                [executor]
                max_concurrency = 2
                agent_name = "from-file"
                "#,
            )?;
            jail.set_env("TOOLRUN_EXECUTOR__AGENT_NAME", "from-env");

            let config = ConfigLoader::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.executor.max_concurrency, 2);
            assert_eq!(config.executor.agent_name, "from-env");
            Ok(())
        });
    }

    #[test]
    fn test_invalid_values_rejected() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("toolrun.toml", "[executor]\nmax_concurrency = 0\n")?;
            assert!(matches!(
                ConfigLoader::load(None),
                Err(ConfigError::Invalid(_))
            ));
            Ok(())
        });
    }
}
