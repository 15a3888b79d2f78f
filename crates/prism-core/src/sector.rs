use std::collections::BTreeMap;
use std::fmt;

use crate::color::Color;
use crate::error::{Error, Result};
use crate::threshold::ThresholdSet;

pub const WORST_COLOR: &str = "worst_color";
pub const BEST_COLOR: &str = "best_color";
pub const MAJORITY: &str = "majority";
pub const WEIGHTED_AVERAGE: &str = "weighted_average";
pub const MATRIX: &str = "matrix";

/// Parameterless strategy combining the colors of one sector.
pub trait SectorAggregator: Send + Sync {
    /// Method name used in configuration.
    fn name(&self) -> &str;

    fn aggregate(&self, colors: &[Color]) -> Result<Color>;
}

/// Worst color wins (red beats yellow beats green).
#[derive(Debug, Clone, Copy, Default)]
pub struct WorstColor;

/// Best color wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestColor;

/// Most frequent color; ties go to the worst tied color.
#[derive(Debug, Clone, Copy, Default)]
pub struct Majority;

impl SectorAggregator for WorstColor {
    fn name(&self) -> &str {
        WORST_COLOR
    }

    fn aggregate(&self, colors: &[Color]) -> Result<Color> {
        worst_color(colors)
    }
}

impl SectorAggregator for BestColor {
    fn name(&self) -> &str {
        BEST_COLOR
    }

    fn aggregate(&self, colors: &[Color]) -> Result<Color> {
        best_color(colors)
    }
}

impl SectorAggregator for Majority {
    fn name(&self) -> &str {
        MAJORITY
    }

    fn aggregate(&self, colors: &[Color]) -> Result<Color> {
        majority(colors)
    }
}

pub fn worst_color(colors: &[Color]) -> Result<Color> {
    colors.iter().copied().max().ok_or(Error::EmptyInput)
}

pub fn best_color(colors: &[Color]) -> Result<Color> {
    colors.iter().copied().min().ok_or(Error::EmptyInput)
}

pub fn majority(colors: &[Color]) -> Result<Color> {
    let mut counts = [0usize; 3];
    for color in colors {
        counts[color.rank()] += 1;
    }
    Color::PRIORITY
        .into_iter()
        .filter(|color| counts[color.rank()] > 0)
        .max_by_key(|color| (counts[color.rank()], color.rank()))
        .ok_or(Error::EmptyInput)
}

/// Aggregate colors with one of the builtin parameterless methods.
pub fn aggregate_sector(colors: &[Color], method: &str) -> Result<Color> {
    if colors.is_empty() {
        return Err(Error::EmptyInput);
    }
    match method {
        WORST_COLOR => worst_color(colors),
        BEST_COLOR => best_color(colors),
        MAJORITY => majority(colors),
        other => Err(Error::UnknownMethod(other.to_string())),
    }
}

/// Weighted mean of color scores (green=3, yellow=2, red=1), reclassified by thresholds.
///
/// Falls back to [`ThresholdSet::weighted_default`] when `thresholds` is `None`.
pub fn aggregate_sector_weighted<'a, I>(
    metric_colors: I,
    weights: &BTreeMap<String, f64>,
    thresholds: Option<&ThresholdSet>,
) -> Result<Color>
where
    I: IntoIterator<Item = (&'a str, Color)>,
{
    let mut seen = false;
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for (key, color) in metric_colors {
        seen = true;
        let weight = weights
            .get(key)
            .copied()
            .ok_or_else(|| Error::MissingWeight(key.to_string()))?;
        weighted_sum += color.score() * weight;
        total_weight += weight;
    }

    if !seen {
        return Err(Error::EmptyInput);
    }
    if total_weight == 0.0 {
        return Err(Error::ZeroWeight);
    }

    let score = weighted_sum / total_weight;
    match thresholds {
        Some(thresholds) => thresholds.evaluate(score),
        None => ThresholdSet::weighted_default().evaluate(score),
    }
}

/// Weighted-average parameters compiled from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedAverage {
    pub weights: BTreeMap<String, f64>,
    pub thresholds: ThresholdSet,
}

impl WeightedAverage {
    pub fn new(weights: BTreeMap<String, f64>) -> Self {
        Self {
            weights,
            thresholds: ThresholdSet::weighted_default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: ThresholdSet) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn aggregate<'a, I>(&self, metric_colors: I) -> Result<Color>
    where
        I: IntoIterator<Item = (&'a str, Color)>,
    {
        aggregate_sector_weighted(metric_colors, &self.weights, Some(&self.thresholds))
    }
}

/// Named parameterless aggregators, built once and shared by reference.
pub struct AggregatorRegistry {
    aggregators: BTreeMap<String, Box<dyn SectorAggregator>>,
}

impl AggregatorRegistry {
    /// Names owned by parameterized methods.
    pub const RESERVED: [&'static str; 2] = [WEIGHTED_AVERAGE, MATRIX];

    /// Registry with the builtin methods only.
    pub fn new() -> Self {
        let mut aggregators: BTreeMap<String, Box<dyn SectorAggregator>> = BTreeMap::new();
        aggregators.insert(WORST_COLOR.to_string(), Box::new(WorstColor));
        aggregators.insert(BEST_COLOR.to_string(), Box::new(BestColor));
        aggregators.insert(MAJORITY.to_string(), Box::new(Majority));
        Self { aggregators }
    }

    /// Builtins plus `extra`; duplicate or reserved names are rejected.
    pub fn with_aggregators<I>(extra: I) -> Result<Self>
    where
        I: IntoIterator<Item = Box<dyn SectorAggregator>>,
    {
        let mut registry = Self::new();
        for aggregator in extra {
            registry.register(aggregator)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, aggregator: Box<dyn SectorAggregator>) -> Result<()> {
        let name = aggregator.name().to_string();
        if Self::RESERVED.contains(&name.as_str()) {
            return Err(Error::ReservedMethod(name));
        }
        if self.aggregators.contains_key(&name) {
            return Err(Error::DuplicateMethod(name));
        }
        self.aggregators.insert(name, aggregator);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn SectorAggregator> {
        self.aggregators.get(name).map(|aggregator| aggregator.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.aggregators.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.aggregators.keys().map(String::as_str)
    }

    pub fn aggregate(&self, colors: &[Color], method: &str) -> Result<Color> {
        if colors.is_empty() {
            return Err(Error::EmptyInput);
        }
        self.get(method)
            .ok_or_else(|| Error::UnknownMethod(method.to_string()))?
            .aggregate(colors)
    }
}

impl Default for AggregatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AggregatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregatorRegistry")
            .field("methods", &self.aggregators.keys().collect::<Vec<_>>())
            .finish()
    }
}
