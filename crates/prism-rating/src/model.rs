use std::collections::BTreeMap;

use prism_core::Color;
use serde::{Deserialize, Serialize};

/// Colors produced by one rating computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingResult {
    /// Color per evaluated metric.
    pub metrics: BTreeMap<String, Color>,
    /// Color per sector with at least one evaluated metric.
    pub sectors: BTreeMap<String, Color>,
    #[serde(rename = "final")]
    pub overall: Color,
    /// Declared metrics that had no value.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

impl RatingResult {
    pub fn summary(&self) -> RatingSummary {
        RatingSummary {
            metrics: ColorCounts::from_colors(self.metrics.values().copied()),
            sectors: ColorCounts::from_colors(self.sectors.values().copied()),
            overall: self.overall,
            skipped: self.skipped.clone(),
        }
    }
}

/// Number of green, yellow and red ratings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorCounts {
    pub green: usize,
    pub yellow: usize,
    pub red: usize,
}

impl ColorCounts {
    pub fn from_colors<I>(colors: I) -> Self
    where
        I: IntoIterator<Item = Color>,
    {
        let mut counts = Self::default();
        for color in colors {
            match color {
                Color::Green => counts.green += 1,
                Color::Yellow => counts.yellow += 1,
                Color::Red => counts.red += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.green + self.yellow + self.red
    }
}

/// Compact rollup of a [`RatingResult`] for logs and run artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub metrics: ColorCounts,
    pub sectors: ColorCounts,
    #[serde(rename = "final")]
    pub overall: Color,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}
