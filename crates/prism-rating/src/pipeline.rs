use std::collections::BTreeMap;

use prism_core::{
    AggregatorRegistry, Color, FinalMethod, MatrixAggregation, RatingConfig, SectorMethod,
    best_color, evaluate_color, majority, worst_color,
};
use tracing::{debug, info};

use crate::errors::{RatingError, Result};
use crate::model::RatingResult;

/// Metric → sector → final rating over a compiled [`RatingConfig`].
///
/// The pipeline holds no state of its own beyond the registry reference, so
/// one instance can rate any number of models, from any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct RatingPipeline<'a> {
    registry: &'a AggregatorRegistry,
}

impl<'a> RatingPipeline<'a> {
    pub fn new(registry: &'a AggregatorRegistry) -> Self {
        Self { registry }
    }

    /// Rate every metric with a value, then roll colors up by sector and overall.
    ///
    /// Metrics without a value are skipped and listed in `skipped`; sectors
    /// left without any evaluated metric are omitted.
    pub fn compute(
        &self,
        config: &RatingConfig,
        metric_values: &BTreeMap<String, f64>,
    ) -> Result<RatingResult> {
        let mut metrics = BTreeMap::new();
        let mut skipped = Vec::new();

        for (key, spec) in &config.metrics {
            let Some(value) = metric_values.get(key).copied() else {
                debug!(event = "metric_skipped", metric = %key, sector = %spec.sector);
                skipped.push(key.clone());
                continue;
            };
            let color =
                evaluate_color(value, &spec.thresholds).map_err(|source| RatingError::Metric {
                    metric: key.clone(),
                    source,
                })?;
            debug!(event = "metric_rated", metric = %key, value, color = %color);
            metrics.insert(key.clone(), color);
        }

        let mut by_sector: BTreeMap<&str, Vec<(&str, Color)>> = BTreeMap::new();
        for (key, color) in &metrics {
            if let Some(spec) = config.metrics.get(key) {
                by_sector
                    .entry(spec.sector.as_str())
                    .or_default()
                    .push((key.as_str(), *color));
            }
        }

        let mut sectors = BTreeMap::new();
        for (sector, members) in &by_sector {
            let method = config.method_for(sector);
            let color = self
                .aggregate_sector(method, members)
                .map_err(|source| RatingError::Sector {
                    sector: sector.to_string(),
                    method: method.name().to_string(),
                    source,
                })?;
            debug!(
                event = "sector_rated",
                sector = %sector,
                method = method.name(),
                metrics = members.len(),
                color = %color
            );
            sectors.insert(sector.to_string(), color);
        }

        let overall =
            final_color(&config.final_method, &sectors).map_err(|source| RatingError::Final {
                method: config.final_method.name().to_string(),
                source,
            })?;
        info!(
            event = "rating_computed",
            method = config.final_method.name(),
            metrics = metrics.len(),
            sectors = sectors.len(),
            skipped = skipped.len(),
            color = %overall
        );

        Ok(RatingResult {
            metrics,
            sectors,
            overall,
            skipped,
        })
    }

    fn aggregate_sector(
        &self,
        method: &SectorMethod,
        members: &[(&str, Color)],
    ) -> prism_core::Result<Color> {
        let colors: Vec<Color> = members.iter().map(|(_, color)| *color).collect();
        match method {
            SectorMethod::WorstColor => worst_color(&colors),
            SectorMethod::BestColor => best_color(&colors),
            SectorMethod::Majority => majority(&colors),
            SectorMethod::WeightedAverage(weighted) => weighted.aggregate(members.iter().copied()),
            SectorMethod::Matrix(matrix) => matrix.resolve_available(|dimension| {
                members
                    .iter()
                    .find(|(key, _)| *key == dimension)
                    .map(|(_, color)| *color)
            }),
            SectorMethod::Registered(name) => self.registry.aggregate(&colors, name),
        }
    }
}

/// Rate with the builtin aggregators only.
pub fn compute(
    config: &RatingConfig,
    metric_values: &BTreeMap<String, f64>,
) -> Result<RatingResult> {
    let registry = AggregatorRegistry::new();
    RatingPipeline::new(&registry).compute(config, metric_values)
}

fn final_color(
    method: &FinalMethod,
    sectors: &BTreeMap<String, Color>,
) -> prism_core::Result<Color> {
    match method {
        FinalMethod::WorstColor => {
            let colors: Vec<Color> = sectors.values().copied().collect();
            if colors.is_empty() {
                return Ok(Color::Green);
            }
            worst_color(&colors)
        }
        FinalMethod::Matrix(matrix) => final_matrix(matrix, sectors),
    }
}

fn final_matrix(
    matrix: &MatrixAggregation,
    sectors: &BTreeMap<String, Color>,
) -> prism_core::Result<Color> {
    let active: Vec<Color> = matrix
        .dimensions
        .iter()
        .filter_map(|dimension| sectors.get(dimension).copied())
        .collect();

    match active.as_slice() {
        [] => Ok(Color::Green),
        [only] => Ok(*only),
        _ => matrix.resolve_available(|dimension| sectors.get(dimension).copied()),
    }
}
