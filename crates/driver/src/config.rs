//! Configuration for one batch job.

use anyhow::{Context, Result, bail};
use engine::AlsConfig;
use pipeline::FilterConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Every knob of a batch run. Missing fields in a JSON file take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    pub filter: FilterConfig,
    pub als: AlsConfig,
    /// Length of each persisted recommendation list
    pub top_k: usize,
    /// Share of ratings held out for evaluation; 0 evaluates on training data only
    pub holdout_fraction: f64,
    pub split_seed: Option<u64>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            als: AlsConfig::default(),
            top_k: 10,
            holdout_fraction: 0.0,
            split_seed: None,
        }
    }
}

impl JobConfig {
    /// Load from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    pub fn with_filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_als(mut self, als: AlsConfig) -> Self {
        self.als = als;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_holdout(mut self, fraction: f64, seed: Option<u64>) -> Self {
        self.holdout_fraction = fraction;
        self.split_seed = seed;
        self
    }

    /// Reject settings that would fail deep inside the run
    pub fn validate(&self) -> Result<()> {
        self.als.validate()?;
        if self.top_k == 0 {
            bail!("top_k must be at least 1");
        }
        if !(0.0..1.0).contains(&self.holdout_fraction) {
            bail!(
                "holdout_fraction must be in [0, 1), got {}",
                self.holdout_fraction
            );
        }
        Ok(())
    }
}
