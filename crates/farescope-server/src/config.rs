use anyhow::Context;
use farescope_core::GeneratorConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::cli::Cli;

/// Contents of `farescope.toml`. Every section is optional; missing keys
/// take the defaults below.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FarescopeConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub generator: GeneratorSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP listen address
    pub http_addr: SocketAddr,
    /// Whole-request deadline applied by the HTTP layer, in seconds
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            request_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Flight-data provider credential. Absent means mock data only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aviation_stack_api_key: Option<String>,
    pub aviation_stack_base_url: String,
    /// Language-model credential. Absent means templated insights only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Deadline for each outbound call, in seconds
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            aviation_stack_api_key: None,
            aviation_stack_base_url: "http://api.aviationstack.com/v1".to_string(),
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-3.5-turbo".to_string(),
            max_tokens: 1000,
            temperature: 0.7,
            timeout_secs: 30,
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn aviation_stack_key(&self) -> Option<&str> {
        non_blank(self.aviation_stack_api_key.as_deref())
    }

    pub fn openai_key(&self) -> Option<&str> {
        non_blank(self.openai_api_key.as_deref())
    }
}

/// `[generator]` section, mirrored onto [`GeneratorConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSection {
    pub min_flights_per_day: usize,
    pub max_flights_per_day: usize,
    pub weekend_multiplier: f64,
    pub midpoint_multiplier: f64,
    pub price_floor: f64,
    pub price_ceiling: f64,
}

impl Default for GeneratorSection {
    fn default() -> Self {
        let defaults = GeneratorConfig::default();
        Self {
            min_flights_per_day: defaults.min_flights_per_day,
            max_flights_per_day: defaults.max_flights_per_day,
            weekend_multiplier: defaults.weekend_multiplier,
            midpoint_multiplier: defaults.midpoint_multiplier,
            price_floor: defaults.price_floor,
            price_ceiling: defaults.price_ceiling,
        }
    }
}

impl GeneratorSection {
    pub fn to_generator_config(&self) -> GeneratorConfig {
        GeneratorConfig::new()
            .with_flights_per_day(self.min_flights_per_day, self.max_flights_per_day)
            .with_weekend_multiplier(self.weekend_multiplier)
            .with_midpoint_multiplier(self.midpoint_multiplier)
            .with_price_band(self.price_floor, self.price_ceiling)
    }
}

impl FarescopeConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Like [`FarescopeConfig::load`], but a missing file yields the
    /// defaults. A file that exists and fails to parse is still an error.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Load from `cli.config` and apply command-line / environment
    /// overrides on top.
    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        Ok(Self::load_or_default(&cli.config)?.with_overrides(cli))
    }

    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(addr) = cli.http_addr {
            self.server.http_addr = addr;
        }
        if let Some(key) = &cli.aviation_stack_api_key {
            self.upstream.aviation_stack_api_key = Some(key.clone());
        }
        if let Some(key) = &cli.openai_api_key {
            self.upstream.openai_api_key = Some(key.clone());
        }
        if let Some(secs) = cli.api_timeout {
            self.upstream.timeout_secs = secs;
        }
        self
    }

    /// Every problem found, empty when the configuration is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.server.request_timeout_secs == 0 {
            errors.push("[server] request_timeout_secs must be > 0".to_string());
        }
        if self.upstream.timeout_secs == 0 {
            errors.push("[upstream] timeout_secs must be > 0".to_string());
        }
        if self.upstream.timeout_secs >= self.server.request_timeout_secs {
            errors.push(
                "[upstream] timeout_secs must be shorter than [server] request_timeout_secs"
                    .to_string(),
            );
        }
        for (name, url) in [
            ("aviation_stack_base_url", &self.upstream.aviation_stack_base_url),
            ("openai_base_url", &self.upstream.openai_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                errors.push(format!("[upstream] {} must be an http(s) URL, got '{}'", name, url));
            }
        }
        if self.upstream.openai_model.trim().is_empty() {
            errors.push("[upstream] openai_model must not be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.upstream.temperature) {
            errors.push("[upstream] temperature must be within 0.0..=2.0".to_string());
        }
        if let Err(e) = self.generator.to_generator_config().validate() {
            errors.push(format!("[generator] {}", e));
        }

        errors
    }

    /// [`FarescopeConfig::validate`] folded into one error.
    pub fn ensure_valid(&self) -> anyhow::Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            return Ok(());
        }
        anyhow::bail!("invalid configuration:\n  - {}", errors.join("\n  - "))
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            flight_data: self.upstream.aviation_stack_key().is_some(),
            language_model: self.upstream.openai_key().is_some(),
        }
    }
}

/// Which outbound credentials are present. Reported by `/health`; the
/// keys themselves never leave the process.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Credentials {
    pub flight_data: bool,
    pub language_model: bool,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
