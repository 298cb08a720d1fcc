//! Column-by-column covering array construction.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::annealing::{self, SearchScope};
use crate::combinatorics::CartesianProduct;
use crate::coverage::CoverageMap;
use crate::graph;
use crate::strategy::Strategy;
use crate::table::{Layout, Table};
use crate::vertical::Partitions;
use crate::{CoveringArray, Result, RunConfiguration};

/// Covering array generator for one configuration.
pub struct Generator {
    config: RunConfiguration,
    layout: Layout,
    strategy: Strategy,
    rng: StdRng,
}

impl Generator {
    /// Validate the configuration and prepare the run.
    ///
    /// Fails on a strength of zero or above the parameter count, on an empty
    /// domain, and when the binomial table for the run would overflow.
    pub fn new(config: RunConfiguration) -> Result<Self> {
        let layout = Layout::new(&config.parameters, config.strength)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            strategy: Strategy::from(config.algorithm),
            config,
            layout,
            rng,
        })
    }

    pub fn config(&self) -> &RunConfiguration {
        &self.config
    }

    /// Parameter columns in the order they are placed.
    pub fn processing_order(&self) -> &[usize] {
        &self.layout.order
    }

    /// Build the covering array.
    pub fn generate(&mut self) -> Result<CoveringArray> {
        let Self {
            config,
            layout,
            strategy,
            rng,
        } = self;
        let config: &RunConfiguration = config;
        let layout: &Layout = layout;
        let started = Instant::now();
        let strength = layout.strength;
        let count = layout.parameter_count();
        info!(
            parameters = count,
            strength,
            algorithm = %config.algorithm,
            annealing = config.enhance_horizontal,
            coloring = config.adapt_vertical,
            "generating covering array"
        );

        let mut table = Table::new();
        for values in CartesianProduct::new(&layout.sizes[..strength]) {
            let mut row = vec![None; count];
            for (k, value) in values.into_iter().enumerate() {
                row[layout.order[k]] = Some(value);
            }
            table.push(row);
        }

        let scope = if config.full_horizontal {
            SearchScope::Full
        } else {
            SearchScope::NewColumn
        };

        for column in strength..count {
            let rows_before = table.len();
            let mut map = CoverageMap::new(
                &layout.sizes[..=column],
                strength,
                &layout.binom,
                &layout.order,
                config.enhance_horizontal,
                config.max_coverage_bytes,
            )?;

            if !strategy.extend_horizontal(layout, &mut table, &mut map, column) {
                debug!(column, rows = table.len(), "covered horizontally");
                continue;
            }
            debug!(
                column,
                covered = map.total_covered_value_combinations_count(),
                tracked = map.total_value_combinations_count(),
                "horizontal extension done"
            );

            if config.enhance_horizontal {
                let stats = annealing::enhance_horizontal(layout, &mut table, &mut map, column, scope, rng)?;
                debug!(
                    column,
                    accepted = stats.accepted,
                    reverted = stats.reverted,
                    covered = map.total_covered_value_combinations_count(),
                    "local search done"
                );
                if !map.may_have_uncovered_combinations() {
                    continue;
                }
            }

            let mut partitions = Partitions::new(layout, &table, column);
            let appended = if config.adapt_vertical {
                graph::extend_vertical_by_coloring(layout, &mut table, &mut map, &mut partitions)
            } else {
                strategy.extend_vertical(layout, &mut table, &mut map, &mut partitions)
            };
            debug!(column, rows_before, appended, rows = table.len(), "vertical extension done");
        }

        info!(
            rows = table.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "covering array generated"
        );
        CoveringArray::new(config.parameters.clone(), table.into_rows())
    }
}
