use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Agent configuration file contents (`agent/config.json` by default)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Display identifier of the backing model. Not used algorithmically.
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_capabilities")]
    pub capabilities: Vec<String>,
}

fn default_name() -> String {
    "KnowledgeMap Agent".to_string()
}

fn default_model() -> String {
    "claude-3.7-sonnet".to_string()
}

fn default_capabilities() -> Vec<String> {
    vec!["知识图谱构建".to_string(), "实体关系提取".to_string()]
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            model: default_model(),
            capabilities: default_capabilities(),
        }
    }
}

impl AgentConfig {
    /// Load the agent configuration from a JSON file.
    ///
    /// A missing file is not an error: the built-in defaults are used and a
    /// warning is logged. A file that exists but cannot be read or parsed is.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("Config file {} not found, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))
            }
        };

        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// Process-level configuration: where things live and where to listen
#[derive(Debug, Clone)]
pub struct Config {
    pub agent: AgentConfig,
    pub config_path: PathBuf,
    pub graph_path: PathBuf,
    pub host: String,
    pub port: u16,
}

pub const DEFAULT_CONFIG_PATH: &str = "agent/config.json";
pub const DEFAULT_GRAPH_PATH: &str = "knowledge_graph.json";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;

impl Config {
    /// Load configuration from the environment
    ///
    /// Loads environment variables from .env file (if present) first.
    /// Recognized variables:
    /// 1. KNOWLEDGEMAP_CONFIG - agent config file (default `agent/config.json`)
    /// 2. KNOWLEDGEMAP_GRAPH_PATH - persisted graph file (default `knowledge_graph.json`)
    /// 3. KNOWLEDGEMAP_HOST / KNOWLEDGEMAP_PORT - HTTP listen address
    pub fn load() -> Result<Self> {
        let _ = dotenv::dotenv();

        let config_path = std::env::var("KNOWLEDGEMAP_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        let graph_path = std::env::var("KNOWLEDGEMAP_GRAPH_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_GRAPH_PATH));
        let host = std::env::var("KNOWLEDGEMAP_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = match std::env::var("KNOWLEDGEMAP_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("KNOWLEDGEMAP_PORT is not a valid port: {}", raw))?,
            Err(_) => DEFAULT_PORT,
        };

        let agent = AgentConfig::load(&config_path)?;

        Ok(Self {
            agent,
            config_path,
            graph_path,
            host,
            port,
        })
    }

    /// Socket address string for the HTTP listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
