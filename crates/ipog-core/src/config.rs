//! Run configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{IpogError, Parameter};

/// Default memory budget of a single coverage map, in bytes (1 GiB).
pub const DEFAULT_MAX_COVERAGE_BYTES: usize = 1 << 30;

/// Horizontal extension algorithm the run is based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BaseAlgorithm {
    /// Rows in array order, each gets the value with the highest gain.
    #[default]
    Ipog,
    /// Globally best (row, value) first, exact recount after each assignment.
    IpogF,
    /// Like `IpogF`, but recounts with a combinatorial upper bound. Faster,
    /// and may overestimate what other rows already cover.
    IpogF2,
}

impl BaseAlgorithm {
    pub const ALL: [BaseAlgorithm; 3] = [BaseAlgorithm::Ipog, BaseAlgorithm::IpogF, BaseAlgorithm::IpogF2];

    pub fn as_str(&self) -> &'static str {
        match self {
            BaseAlgorithm::Ipog => "ipog",
            BaseAlgorithm::IpogF => "ipog-f",
            BaseAlgorithm::IpogF2 => "ipog-f2",
        }
    }
}

impl fmt::Display for BaseAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BaseAlgorithm {
    type Err = IpogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "ipog" => Ok(BaseAlgorithm::Ipog),
            "ipog-f" | "ipogf" => Ok(BaseAlgorithm::IpogF),
            "ipog-f2" | "ipogf2" => Ok(BaseAlgorithm::IpogF2),
            _ => Err(IpogError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

/// Everything a generation run needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfiguration {
    pub parameters: Vec<Parameter>,
    pub strength: usize,
    #[serde(default)]
    pub algorithm: BaseAlgorithm,
    /// Run simulated annealing between horizontal and vertical extension.
    #[serde(default)]
    pub enhance_horizontal: bool,
    /// Let the annealing also touch don't-care cells of earlier columns.
    #[serde(default)]
    pub full_horizontal: bool,
    /// Order vertical extension by a smallest-last graph coloring.
    #[serde(default)]
    pub adapt_vertical: bool,
    /// Seed for the annealing's random source; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Memory budget of one coverage map in bytes; larger maps fail with
    /// `CoverageTooLarge` instead of being allocated.
    #[serde(default = "default_max_coverage_bytes")]
    pub max_coverage_bytes: usize,
}

fn default_max_coverage_bytes() -> usize {
    DEFAULT_MAX_COVERAGE_BYTES
}

impl RunConfiguration {
    pub fn builder(parameters: Vec<Parameter>, strength: usize, algorithm: BaseAlgorithm) -> RunConfigurationBuilder {
        RunConfigurationBuilder {
            config: RunConfiguration {
                parameters,
                strength,
                algorithm,
                enhance_horizontal: false,
                full_horizontal: false,
                adapt_vertical: false,
                seed: None,
                max_coverage_bytes: DEFAULT_MAX_COVERAGE_BYTES,
            },
        }
    }
}

/// Builder for [`RunConfiguration`].
#[derive(Debug, Clone)]
pub struct RunConfigurationBuilder {
    config: RunConfiguration,
}

impl RunConfigurationBuilder {
    /// Enable the annealing pass. With `full`, don't-care cells of earlier
    /// columns are modifiable too, and the iteration budget is ten times larger.
    pub fn enhance_horizontal(mut self, full: bool) -> Self {
        self.config.enhance_horizontal = true;
        self.config.full_horizontal = full;
        self
    }

    /// Use the graph-coloring vertical extension.
    pub fn adapt_vertical(mut self) -> Self {
        self.config.adapt_vertical = true;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn max_coverage_bytes(mut self, limit: usize) -> Self {
        self.config.max_coverage_bytes = limit;
        self
    }

    pub fn build(self) -> RunConfiguration {
        self.config
    }
}
