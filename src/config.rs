use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Parser, Debug)]
#[command(name = "bookmarks")]
#[command(about = "Runs the bookmark manager API", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".bookmarks")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

#[derive(Debug, Deserialize, Clone)]
pub struct App {
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_data_file")]
    data_file: String,
}

fn default_port() -> u16 {
    3001
}

fn default_data_file() -> String {
    "bookmarks.json".to_string()
}

impl Default for App {
    fn default() -> Self {
        App {
            port: default_port(),
            data_file: default_data_file(),
        }
    }
}

impl App {
    pub fn get_port(&self) -> u16 {
        self.port
    }

    /// Relative data files live next to the config file.
    pub fn data_path(&self, config_dir: &Path) -> PathBuf {
        let path = PathBuf::from(&self.data_file);
        if path.is_absolute() { path } else { config_dir.join(path) }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_enabled() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    5
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            enabled: default_enabled(),
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub fetch: FetchConfig,
}

impl Config {
    pub fn new(path: &str) -> Result<Self> {
        let cfg = Config::load_config(path).with_context(|| format!("loading config from {}", path))?;
        Ok(cfg)
    }

    /// Like `new`, but a missing file yields the built-in defaults.
    pub fn new_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = ?path, "no config file found, using defaults");
            return Ok(Config::default());
        }
        Config::new(&path.to_string_lossy())
    }

    fn load_config(path: &str) -> Result<Config> {
        let yaml_str = fs::read_to_string(path)?;
        Config::from_yaml(&yaml_str)
    }

    pub fn from_yaml(yaml_str: &str) -> Result<Config> {
        let yaml_with_env = Config::substitute_env_vars(yaml_str)?;
        let config: Config = serde_yaml::from_str(&yaml_with_env)?;
        Ok(config)
    }

    /// Expands `${VAR}` and `${VAR:-default}`. An unset variable without a
    /// default becomes an empty string; an unterminated reference is an error.
    fn substitute_env_vars(yaml_str: &str) -> Result<String> {
        let mut out = String::with_capacity(yaml_str.len());
        let mut rest = yaml_str;

        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let reference = &rest[start + 2..];
            let end = reference.find('}').with_context(|| {
                let line = reference.lines().next().unwrap_or_default();
                format!("unterminated variable reference '${{{}'", line)
            })?;

            let (name, default) = match reference[..end].split_once(":-") {
                Some((name, default)) => (name, Some(default)),
                None => (&reference[..end], None),
            };
            let value = match (env::var(name), default) {
                (Ok(value), _) => value,
                (Err(_), Some(default)) => default.to_string(),
                (Err(_), None) => {
                    tracing::warn!(var = name, "environment variable not set");
                    String::new()
                }
            };

            out.push_str(&value);
            rest = &reference[end + 1..];
        }

        out.push_str(rest);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_sections_missing() {
        let cfg = Config::from_yaml("{}").unwrap();
        assert_eq!(cfg.app.get_port(), 3001);
        assert!(cfg.fetch.enabled);
        assert_eq!(cfg.fetch.timeout_seconds, 5);
        assert_eq!(cfg.fetch.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_env_default_substitution() {
        let yaml = "app:\n  port: ${BOOKMARKS_TEST_UNSET_PORT:-4010}\n  data_file: /var/lib/bookmarks.json\nfetch:\n  enabled: false\n";
        let cfg = Config::from_yaml(yaml).unwrap();
        assert_eq!(cfg.app.get_port(), 4010);
        assert!(!cfg.fetch.enabled);
        assert_eq!(
            cfg.app.data_path(Path::new("/etc/bookmarks")),
            PathBuf::from("/var/lib/bookmarks.json")
        );
    }

    #[test]
    fn test_relative_data_file_resolves_against_config_dir() {
        let cfg = Config::default();
        assert_eq!(
            cfg.app.data_path(Path::new("/home/me/.bookmarks")),
            PathBuf::from("/home/me/.bookmarks/bookmarks.json")
        );
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::new_or_default(&dir.path().join("config.yaml")).unwrap();
        assert_eq!(cfg.app.get_port(), 3001);
    }

    #[test]
    fn test_explicit_missing_config_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.yaml");
        assert!(Config::new(&path.to_string_lossy()).is_err());
    }

    #[test]
    fn test_unterminated_variable_is_an_error() {
        let err = Config::from_yaml("app:\n  port: ${BOOKMARKS_PORT:-3001\n").unwrap_err();
        assert!(err.to_string().contains("unterminated variable reference"));
    }

    #[test]
    fn test_substitution_leaves_plain_text_alone() {
        let out = Config::substitute_env_vars("a: $HOME\nb: ${BOOKMARKS_TEST_UNSET_VAR}x\n").unwrap();
        assert_eq!(out, "a: $HOME\nb: x\n");
    }
}
