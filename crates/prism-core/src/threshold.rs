use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::color::Color;
use crate::error::{Error, Result};

const THRESHOLD_PATTERN: &str = r"^\s*(>=|<=|>|<|==|!=)\s*([+-]?\d+(?:\.\d+)?)\s*$";

/// Comparison operator of a threshold expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Ge,
    Le,
    Gt,
    Lt,
    Eq,
    Ne,
}

impl Comparison {
    pub fn as_str(self) -> &'static str {
        match self {
            Comparison::Ge => ">=",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Lt => "<",
            Comparison::Eq => "==",
            Comparison::Ne => "!=",
        }
    }

    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            ">=" => Some(Comparison::Ge),
            "<=" => Some(Comparison::Le),
            ">" => Some(Comparison::Gt),
            "<" => Some(Comparison::Lt),
            "==" => Some(Comparison::Eq),
            "!=" => Some(Comparison::Ne),
            _ => None,
        }
    }
}

/// Parsed `<op> <number>` predicate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    pub op: Comparison,
    pub bound: f64,
}

impl Threshold {
    pub const fn new(op: Comparison, bound: f64) -> Self {
        Self { op, bound }
    }

    /// Parse an expression such as `">= 0.4"` or `"<0.3"`.
    pub fn parse(expr: &str) -> Result<Self> {
        let invalid = || Error::InvalidThreshold {
            expr: expr.to_string(),
        };
        let re = Regex::new(THRESHOLD_PATTERN).map_err(|_| invalid())?;
        let caps = re.captures(expr).ok_or_else(invalid)?;
        let op = Comparison::from_symbol(&caps[1]).ok_or_else(invalid)?;
        let bound = caps[2].parse::<f64>().map_err(|_| invalid())?;
        Ok(Self { op, bound })
    }

    /// Exact comparison; `==` and `!=` do not apply a tolerance.
    pub fn matches(&self, value: f64) -> bool {
        match self.op {
            Comparison::Ge => value >= self.bound,
            Comparison::Le => value <= self.bound,
            Comparison::Gt => value > self.bound,
            Comparison::Lt => value < self.bound,
            Comparison::Eq => value == self.bound,
            Comparison::Ne => value != self.bound,
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op.as_str(), self.bound)
    }
}

impl FromStr for Threshold {
    type Err = Error;

    fn from_str(expr: &str) -> Result<Self> {
        Self::parse(expr)
    }
}

/// Parse a threshold expression into a predicate.
pub fn parse_threshold(expr: &str) -> Result<Threshold> {
    Threshold::parse(expr)
}

/// Per-color thresholds evaluated in the fixed order green, yellow, red.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThresholdSet {
    slots: [Option<Threshold>; 3],
}

impl ThresholdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score thresholds used by weighted averaging when none are configured.
    pub fn weighted_default() -> Self {
        Self::new()
            .with(Color::Green, Threshold::new(Comparison::Ge, 2.5))
            .with(Color::Yellow, Threshold::new(Comparison::Ge, 1.5))
            .with(Color::Red, Threshold::new(Comparison::Lt, 1.5))
    }

    /// Parse `(color, expression)` pairs; a later entry for a color replaces an earlier one.
    pub fn parse<'a, I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Color, &'a str)>,
    {
        let mut set = Self::new();
        for (color, expr) in entries {
            set.insert(color, Threshold::parse(expr)?);
        }
        Ok(set)
    }

    pub fn with(mut self, color: Color, threshold: Threshold) -> Self {
        self.insert(color, threshold);
        self
    }

    pub fn insert(&mut self, color: Color, threshold: Threshold) {
        self.slots[color.rank()] = Some(threshold);
    }

    pub fn get(&self, color: Color) -> Option<&Threshold> {
        self.slots[color.rank()].as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Configured thresholds in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (Color, &Threshold)> + '_ {
        Color::PRIORITY
            .into_iter()
            .filter_map(|color| self.get(color).map(|threshold| (color, threshold)))
    }

    /// First color whose predicate accepts `value`.
    pub fn evaluate(&self, value: f64) -> Result<Color> {
        self.iter()
            .find(|(_, threshold)| threshold.matches(value))
            .map(|(color, _)| color)
            .ok_or_else(|| Error::NoThresholdMatch {
                value,
                thresholds: self.clone(),
            })
    }
}

impl fmt::Display for ThresholdSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (idx, (color, threshold)) in self.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{color}: \"{threshold}\"")?;
        }
        f.write_str("}")
    }
}

/// Classify `value` against `thresholds`; an unmatched value is an error, never a default.
pub fn evaluate_color(value: f64, thresholds: &ThresholdSet) -> Result<Color> {
    thresholds.evaluate(value)
}
