use crate::error::{VariantError, VariantResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root application configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `VARIANT_EXPRESS__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub frontend: FrontendConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

/// Epsilon-greedy agent settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Probability of exploring a uniformly random arm once cold start is over.
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    #[serde(default = "default_arms")]
    pub arms: Vec<String>,
    /// Total length of the shuffled warm-up sequence, split evenly across arms.
    #[serde(default = "default_cold_start_size")]
    pub cold_start_size: usize,
    /// Fixed RNG seed; `None` seeds from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrontendConfig {
    #[serde(default = "default_static_dir")]
    pub static_dir: Option<PathBuf>,
}

// Default functions
fn default_node_id() -> String {
    "node-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    5000
}
fn default_metrics_enabled() -> bool {
    true
}
fn default_metrics_port() -> u16 {
    9091
}
fn default_epsilon() -> f64 {
    0.10
}
fn default_arms() -> Vec<String> {
    vec!["day".to_string(), "night".to_string()]
}
fn default_cold_start_size() -> usize {
    10
}
fn default_static_dir() -> Option<PathBuf> {
    Some(PathBuf::from("frontend"))
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            port: default_metrics_port(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
            arms: default_arms(),
            cold_start_size: default_cold_start_size(),
            seed: None,
        }
    }
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            static_dir: default_static_dir(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            agent: AgentConfig::default(),
            frontend: FrontendConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Reject settings the agent cannot be built from: epsilon outside
    /// `[0, 1]`, an empty arm set, blank labels, or duplicate labels.
    pub fn validate(&self) -> VariantResult<()> {
        if !self.epsilon.is_finite() || !(0.0..=1.0).contains(&self.epsilon) {
            return Err(VariantError::Config(format!(
                "epsilon must be within [0, 1], got {}",
                self.epsilon
            )));
        }
        if self.arms.is_empty() {
            return Err(VariantError::Config(
                "at least one arm must be configured".to_string(),
            ));
        }
        for (i, arm) in self.arms.iter().enumerate() {
            if arm.trim().is_empty() {
                return Err(VariantError::Config("arm labels must not be blank".to_string()));
            }
            if self.arms[..i].contains(arm) {
                return Err(VariantError::Config(format!("duplicate arm '{}'", arm)));
            }
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load configuration from an optional TOML file, then environment
    /// variables (which take precedence).
    pub fn load(path: Option<&Path>) -> VariantResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path.to_path_buf()).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("VARIANT_EXPRESS")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("agent.arms"),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.agent.validate()?;
        Ok(config)
    }
}
