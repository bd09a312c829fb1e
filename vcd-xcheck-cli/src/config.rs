//! Batch configuration loading and parsing

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use vcd_xcheck::{AnalysisConfig, SignalFilter, SimTime};

/// Main application configuration (loaded from a TOML file)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub analysis: AnalysisSection,
    #[serde(default)]
    pub output: OutputSection,
    pub tests: Vec<TestCaseConfig>,
}

/// `[analysis]` table: thresholds and the signal filter
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisSection {
    /// Instant by which the reset sequence is assumed complete, in the
    /// dump's raw time unit
    pub reset_release_time: SimTime,
    /// Later steady-state observation point, same unit
    pub post_reset_time: SimTime,
    /// Qualified-name substrings selecting design-under-test signals;
    /// empty means analyze every signal
    #[serde(default)]
    pub scope_filters: Vec<String>,
}

impl AnalysisSection {
    /// Convert into the library's analysis parameters
    pub fn to_analysis_config(&self) -> AnalysisConfig {
        let filter = match self.scope_filters.len() {
            0 => SignalFilter::All,
            1 => SignalFilter::PathContains(self.scope_filters[0].clone()),
            _ => SignalFilter::AnyPathContains(self.scope_filters.clone()),
        };
        AnalysisConfig::new(self.reset_release_time, self.post_reset_time)
            .with_filter(filter)
    }
}

/// `[output]` table
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputSection {
    #[serde(default)]
    pub format: OutputFormat,
    /// Cap on persistent-X entries printed per test in text mode
    #[serde(default = "default_max_listed")]
    pub max_listed: usize,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            max_listed: default_max_listed(),
        }
    }
}

fn default_max_listed() -> usize {
    20
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// One `[[tests]]` entry: a test identity and the dump it produced
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TestCaseConfig {
    /// Test case name (report ordering follows config order)
    pub name: String,
    /// Path to the dump file for this test case
    pub dump: PathBuf,
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}
