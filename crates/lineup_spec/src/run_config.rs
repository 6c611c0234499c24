//! Reproducible run configuration.

use crate::digest::validate_digest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Errors raised when building or loading a [`RunConfig`].
#[derive(Error, Debug)]
pub enum RunConfigError {
    /// Run identifier is blank.
    #[error("run_id must not be empty")]
    EmptyRunId,

    /// Spec hash is not a 64-character lowercase hex digest.
    #[error("Invalid constraint_spec_hash: {0}")]
    InvalidSpecHash(String),

    /// Scenario count must be positive.
    #[error("sim_params.n_scenarios must be > 0, got {0}")]
    InvalidScenarioCount(usize),

    /// Seed must be positive.
    #[error("random_seed must be > 0, got {0}")]
    InvalidSeed(u64),

    /// JSON encoding or decoding failure.
    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),

    /// File system failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Simulation parameters recorded with a run.
///
/// `n_scenarios` is required; any further keys are kept verbatim in sorted
/// order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    /// Number of simulated scenarios
    pub n_scenarios: usize,
    /// Additional simulator parameters
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl SimParams {
    /// Parameters with only a scenario count.
    pub fn new(n_scenarios: usize) -> Self {
        Self {
            n_scenarios,
            extra: BTreeMap::new(),
        }
    }

    /// Record an additional parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Immutable record of everything needed to reproduce a run.
///
/// # Examples
///
/// ```
/// use lineup_spec::{RunConfig, SimParams};
///
/// let hash = "a".repeat(64);
/// let config = RunConfig::new("run-1", &hash, SimParams::new(10_000), 42).unwrap();
/// let restored = RunConfig::from_json(&config.to_json().unwrap()).unwrap();
/// assert_eq!(config, restored);
///
/// assert!(RunConfig::new("run-1", "abc", SimParams::new(10_000), 42).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    run_id: String,
    constraint_spec_hash: String,
    sim_params: SimParams,
    random_seed: u64,
    created_at: DateTime<Utc>,
}

impl RunConfig {
    /// Build and validate a config stamped with the current time.
    pub fn new(
        run_id: impl Into<String>,
        constraint_spec_hash: impl Into<String>,
        sim_params: SimParams,
        random_seed: u64,
    ) -> Result<Self, RunConfigError> {
        let config = Self {
            run_id: run_id.into(),
            constraint_spec_hash: constraint_spec_hash.into(),
            sim_params,
            random_seed,
            created_at: Utc::now(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Replace the creation timestamp.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    fn validate(&self) -> Result<(), RunConfigError> {
        if self.run_id.trim().is_empty() {
            return Err(RunConfigError::EmptyRunId);
        }
        validate_digest(&self.constraint_spec_hash)
            .map_err(|e| RunConfigError::InvalidSpecHash(e.to_string()))?;
        if self.sim_params.n_scenarios == 0 {
            return Err(RunConfigError::InvalidScenarioCount(0));
        }
        if self.random_seed == 0 {
            return Err(RunConfigError::InvalidSeed(0));
        }
        Ok(())
    }

    /// Run identifier.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Hash of the constraint spec the run was compiled against.
    pub fn constraint_spec_hash(&self) -> &str {
        &self.constraint_spec_hash
    }

    /// Simulation parameters.
    pub fn sim_params(&self) -> &SimParams {
        &self.sim_params
    }

    /// Seed for every random draw in the run.
    pub fn random_seed(&self) -> u64 {
        self.random_seed
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Serialise to pretty, sorted-key JSON.
    pub fn to_json(&self) -> Result<String, RunConfigError> {
        let value = serde_json::to_value(self)?;
        Ok(serde_json::to_string_pretty(&value)?)
    }

    /// Parse and re-validate a config.
    pub fn from_json(json: &str) -> Result<Self, RunConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), RunConfigError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load and validate a config from `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RunConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
