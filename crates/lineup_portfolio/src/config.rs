//! Portfolio configuration.
//!
//! Loaded from TOML with `LINEUP_*` environment variable overrides, then
//! validated as a whole so every problem is reported at once.

use lineup_core::risk::validate_alpha;
use lineup_optimiser::{ComplianceError, ComplianceRules, ExposureLimits, SolverConfig};
use lineup_spec::{RunConfig, RunConfigError, SimParams};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// One term of the blended tail objective.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct AlphaWeight {
    /// Tail quantile
    pub alpha: f64,
    /// Weight of CVaR at `alpha` in the objective
    pub weight: f64,
}

impl AlphaWeight {
    /// Create a term.
    pub fn new(alpha: f64, weight: f64) -> Self {
        Self { alpha, weight }
    }
}

/// Portfolio generation configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PortfolioConfig {
    /// Number of lineups requested
    #[serde(default = "default_n_lineups")]
    pub n_lineups: usize,

    /// Entities per lineup
    #[serde(default = "default_required_size")]
    pub required_size: usize,

    /// Maximum total cost of a lineup
    #[serde(default = "default_budget_cap")]
    pub budget_cap: f64,

    /// Smallest non-zero selection from a stacked group
    #[serde(default = "default_min_stack")]
    pub min_stack: usize,

    /// Largest selection from a stacked group
    #[serde(default = "default_max_stack")]
    pub max_stack: usize,

    /// Largest fraction of lineups any entity may appear in
    #[serde(default = "default_exposure")]
    pub max_entity_exposure: f64,

    /// Largest fraction of lineups any group may appear in
    #[serde(default = "default_exposure")]
    pub max_group_exposure: f64,

    /// Blended CVaR objective terms
    #[serde(default = "default_alpha_weights")]
    pub alpha_weights: Vec<AlphaWeight>,

    /// Quantile used for the metrics attached to each lineup
    #[serde(default = "default_metrics_alpha")]
    pub metrics_alpha: f64,

    /// Objective penalty per overlap with a previous lineup
    #[serde(default = "default_diversity_weight")]
    pub diversity_weight: f64,

    /// Largest number of entities shared with any previous lineup
    /// (`required_size - 1` when unset)
    pub max_overlap: Option<usize>,

    /// Wall-clock limit per solve, in milliseconds
    #[serde(default = "default_time_limit_ms")]
    pub time_limit_ms: u64,

    /// Consecutive rejected solutions tolerated before giving up
    #[serde(default = "default_max_rejections")]
    pub max_rejections: usize,

    /// Seed recorded in the run configuration
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,
}

fn default_n_lineups() -> usize {
    20
}

fn default_required_size() -> usize {
    6
}

fn default_budget_cap() -> f64 {
    50_000.0
}

fn default_min_stack() -> usize {
    1
}

fn default_max_stack() -> usize {
    3
}

fn default_exposure() -> f64 {
    1.0
}

fn default_alpha_weights() -> Vec<AlphaWeight> {
    vec![AlphaWeight::new(0.99, 0.7), AlphaWeight::new(0.95, 0.3)]
}

fn default_metrics_alpha() -> f64 {
    0.99
}

fn default_diversity_weight() -> f64 {
    0.1
}

fn default_time_limit_ms() -> u64 {
    10_000
}

fn default_max_rejections() -> usize {
    5
}

fn default_random_seed() -> u64 {
    42
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            n_lineups: default_n_lineups(),
            required_size: default_required_size(),
            budget_cap: default_budget_cap(),
            min_stack: default_min_stack(),
            max_stack: default_max_stack(),
            max_entity_exposure: default_exposure(),
            max_group_exposure: default_exposure(),
            alpha_weights: default_alpha_weights(),
            metrics_alpha: default_metrics_alpha(),
            diversity_weight: default_diversity_weight(),
            max_overlap: None,
            time_limit_ms: default_time_limit_ms(),
            max_rejections: default_max_rejections(),
            random_seed: default_random_seed(),
        }
    }
}

/// Parse an environment variable, warning and ignoring it when malformed.
fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable environment override");
            None
        }
    }
}

/// Parse `alpha:weight` pairs separated by commas, e.g. `0.99:0.7,0.95:0.3`.
fn parse_alpha_weights(raw: &str) -> Option<Vec<AlphaWeight>> {
    raw.split(',')
        .map(|term| {
            let (alpha, weight) = term.split_once(':')?;
            Some(AlphaWeight::new(
                alpha.trim().parse().ok()?,
                weight.trim().parse().ok()?,
            ))
        })
        .collect()
}

impl PortfolioConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from `path` or fall back to defaults
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Apply environment variable overrides
    pub fn with_env_override(mut self) -> Self {
        if let Some(v) = env_parse("LINEUP_N_LINEUPS") {
            self.n_lineups = v;
        }
        if let Some(v) = env_parse("LINEUP_REQUIRED_SIZE") {
            self.required_size = v;
        }
        if let Some(v) = env_parse("LINEUP_BUDGET_CAP") {
            self.budget_cap = v;
        }
        if let Some(v) = env_parse("LINEUP_MIN_STACK") {
            self.min_stack = v;
        }
        if let Some(v) = env_parse("LINEUP_MAX_STACK") {
            self.max_stack = v;
        }
        if let Some(v) = env_parse("LINEUP_MAX_ENTITY_EXPOSURE") {
            self.max_entity_exposure = v;
        }
        if let Some(v) = env_parse("LINEUP_MAX_GROUP_EXPOSURE") {
            self.max_group_exposure = v;
        }
        if let Ok(raw) = std::env::var("LINEUP_ALPHA_WEIGHTS") {
            match parse_alpha_weights(&raw) {
                Some(weights) => self.alpha_weights = weights,
                None => warn!(value = %raw, "ignoring malformed LINEUP_ALPHA_WEIGHTS"),
            }
        }
        if let Some(v) = env_parse("LINEUP_METRICS_ALPHA") {
            self.metrics_alpha = v;
        }
        if let Some(v) = env_parse("LINEUP_DIVERSITY_WEIGHT") {
            self.diversity_weight = v;
        }
        if let Some(v) = env_parse("LINEUP_MAX_OVERLAP") {
            self.max_overlap = Some(v);
        }
        if let Some(v) = env_parse("LINEUP_TIME_LIMIT_MS") {
            self.time_limit_ms = v;
        }
        if let Some(v) = env_parse("LINEUP_MAX_REJECTIONS") {
            self.max_rejections = v;
        }
        if let Some(v) = env_parse("LINEUP_RANDOM_SEED") {
            self.random_seed = v;
        }

        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.n_lineups == 0 {
            errors.push("n_lineups must be greater than 0".to_string());
        }
        if self.required_size == 0 {
            errors.push("required_size must be greater than 0".to_string());
        }
        if !self.budget_cap.is_finite() || self.budget_cap < 0.0 {
            errors.push(format!(
                "budget_cap must be finite and non-negative, got {}",
                self.budget_cap
            ));
        }

        // Stacking band
        if self.min_stack == 0 {
            errors.push("min_stack must be greater than 0".to_string());
        }
        if self.min_stack > self.max_stack {
            errors.push(format!(
                "min_stack {} exceeds max_stack {}",
                self.min_stack, self.max_stack
            ));
        }

        // Exposure caps are fractions of the portfolio
        for (name, cap) in [
            ("max_entity_exposure", self.max_entity_exposure),
            ("max_group_exposure", self.max_group_exposure),
        ] {
            if !(cap > 0.0 && cap <= 1.0) {
                errors.push(format!("{} must be in (0, 1], got {}", name, cap));
            }
        }

        // Objective terms
        if self.alpha_weights.is_empty() {
            errors.push("alpha_weights cannot be empty".to_string());
        }
        for term in &self.alpha_weights {
            if validate_alpha(term.alpha).is_err() {
                errors.push(format!("alpha_weights alpha {} outside [0, 1]", term.alpha));
            }
            if !term.weight.is_finite() || term.weight < 0.0 {
                errors.push(format!(
                    "alpha_weights weight {} must be finite and non-negative",
                    term.weight
                ));
            }
        }
        if !self.alpha_weights.is_empty()
            && self.alpha_weights.iter().map(|t| t.weight).sum::<f64>() <= 0.0
        {
            errors.push("alpha_weights must have a positive total weight".to_string());
        }

        if validate_alpha(self.metrics_alpha).is_err() {
            errors.push(format!(
                "metrics_alpha {} outside [0, 1]",
                self.metrics_alpha
            ));
        }
        if !self.diversity_weight.is_finite() || self.diversity_weight < 0.0 {
            errors.push(format!(
                "diversity_weight must be finite and non-negative, got {}",
                self.diversity_weight
            ));
        }
        if let Some(overlap) = self.max_overlap {
            if overlap >= self.required_size {
                errors.push(format!(
                    "max_overlap {} must be below required_size {}",
                    overlap, self.required_size
                ));
            }
        }
        if self.time_limit_ms == 0 {
            errors.push("time_limit_ms must be greater than 0".to_string());
        }
        if self.random_seed == 0 {
            errors.push("random_seed must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load configuration from file and validate
    pub fn load_and_validate(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from file with environment overrides and validate
    pub fn load_with_env_and_validate(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?.with_env_override();
        config.validate()?;
        Ok(config)
    }

    /// Overlap bound applied against every previous lineup.
    pub fn effective_max_overlap(&self) -> usize {
        self.max_overlap
            .unwrap_or_else(|| self.required_size.saturating_sub(1))
    }

    /// Per-solve solver budget.
    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig::default().with_time_limit(Duration::from_millis(self.time_limit_ms))
    }

    /// Exposure caps.
    pub fn exposure_limits(&self) -> ExposureLimits {
        ExposureLimits::new(self.max_entity_exposure, self.max_group_exposure)
    }

    /// Roster, budget and stacking rules.
    pub fn compliance_rules(&self) -> Result<ComplianceRules, ComplianceError> {
        ComplianceRules::new(
            self.required_size,
            self.budget_cap,
            self.min_stack,
            self.max_stack,
        )
    }

    /// Reproducibility record for a run over `n_scenarios` scenarios.
    pub fn run_config(
        &self,
        run_id: impl Into<String>,
        constraint_spec_hash: impl Into<String>,
        n_scenarios: usize,
    ) -> Result<RunConfig, RunConfigError> {
        RunConfig::new(
            run_id,
            constraint_spec_hash,
            SimParams::new(n_scenarios),
            self.random_seed,
        )
    }
}

/// Configuration error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(String),

    /// Parse error in config file
    #[error("Parse error: {0}")]
    Parse(String),

    /// Validation error
    #[error("Validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

impl ConfigError {
    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
