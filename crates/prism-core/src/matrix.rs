use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::color::{Color, RuleToken};
use crate::error::{Error, Result, RuleParseError};

/// One `token | token | ... = result` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixRule {
    pub tokens: Vec<RuleToken>,
    pub result: Color,
}

impl MatrixRule {
    /// Parse a rule string, splitting on the last `=`.
    pub fn parse(rule: &str, num_dimensions: usize) -> std::result::Result<Self, RuleParseError> {
        let (lhs, rhs) = rule
            .rsplit_once('=')
            .ok_or_else(|| RuleParseError::MissingEquals {
                rule: rule.to_string(),
            })?;

        let result_token = rhs.trim();
        let result = result_token
            .parse::<Color>()
            .map_err(|_| RuleParseError::InvalidResult {
                rule: rule.to_string(),
                result: result_token.to_string(),
            })?;

        let parts: Vec<&str> = lhs.split('|').map(str::trim).collect();
        if parts.len() != num_dimensions {
            return Err(RuleParseError::DimensionMismatch {
                rule: rule.to_string(),
                found: parts.len(),
                expected: num_dimensions,
            });
        }

        let tokens = parts
            .into_iter()
            .map(|part| {
                part.parse::<RuleToken>()
                    .map_err(|_| RuleParseError::InvalidToken {
                        rule: rule.to_string(),
                        token: part.to_string(),
                    })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { tokens, result })
    }

    pub fn wildcard_count(&self) -> usize {
        self.tokens.iter().filter(|token| token.is_wildcard()).count()
    }
}

impl fmt::Display for MatrixRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, token) in self.tokens.iter().enumerate() {
            if idx > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{token}")?;
        }
        write!(f, " = {}", self.result)
    }
}

/// Unordered set of rules over a fixed number of dimensions.
///
/// Lookups are resolved by specificity: fewer wildcards first, then
/// ascending-index combinations of wildcard positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    num_dimensions: usize,
    rules: HashMap<Vec<RuleToken>, Color>,
}

impl RuleTable {
    pub fn new(num_dimensions: usize) -> Self {
        Self {
            num_dimensions,
            rules: HashMap::new(),
        }
    }

    /// Parse every rule string; the first malformed rule aborts.
    pub fn parse<S: AsRef<str>>(
        rules: &[S],
        num_dimensions: usize,
    ) -> std::result::Result<Self, RuleParseError> {
        let mut table = Self::new(num_dimensions);
        for rule in rules {
            let rule = rule.as_ref();
            table.insert(rule, MatrixRule::parse(rule, num_dimensions)?)?;
        }
        Ok(table)
    }

    /// Add a parsed rule. Repeating a rule is accepted; redefining its result is not.
    pub fn insert(
        &mut self,
        source: &str,
        rule: MatrixRule,
    ) -> std::result::Result<(), RuleParseError> {
        if rule.tokens.len() != self.num_dimensions {
            return Err(RuleParseError::DimensionMismatch {
                rule: source.to_string(),
                found: rule.tokens.len(),
                expected: self.num_dimensions,
            });
        }
        match self.rules.get(&rule.tokens) {
            Some(existing) if *existing != rule.result => Err(RuleParseError::ConflictingRule {
                rule: source.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                self.rules.insert(rule.tokens, rule.result);
                Ok(())
            }
        }
    }

    pub fn num_dimensions(&self) -> usize {
        self.num_dimensions
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Exact key lookup without wildcard expansion.
    pub fn lookup(&self, key: &[RuleToken]) -> Option<Color> {
        self.rules.get(key).copied()
    }

    /// Most specific match for `colors`; `None` positions only match `*`.
    pub fn find(&self, colors: &[Option<Color>]) -> Option<Color> {
        let base: Vec<RuleToken> = colors
            .iter()
            .map(|color| color.map_or(RuleToken::Any, RuleToken::Is))
            .collect();
        let active: Vec<usize> = colors
            .iter()
            .enumerate()
            .filter_map(|(idx, color)| color.map(|_| idx))
            .collect();

        let mut key = base.clone();
        for wildcards in 0..=active.len() {
            let mut combo: Vec<usize> = (0..wildcards).collect();
            loop {
                for &slot in &combo {
                    key[active[slot]] = RuleToken::Any;
                }
                if let Some(result) = self.lookup(&key) {
                    return Some(result);
                }
                for &slot in &combo {
                    key[active[slot]] = base[active[slot]];
                }
                if !next_combination(&mut combo, active.len()) {
                    break;
                }
            }
        }
        None
    }

    /// Resolve a full tuple of colors in dimension order.
    pub fn resolve(&self, colors: &[Color]) -> Result<Color> {
        let input: Vec<Option<Color>> = colors.iter().copied().map(Some).collect();
        self.find(&input).ok_or_else(|| Error::NoRuleMatch {
            input: format_tuple(&input),
        })
    }
}

/// Parse rule strings into a [`RuleTable`].
pub fn parse_rules<S: AsRef<str>>(
    rules: &[S],
    num_dimensions: usize,
) -> std::result::Result<RuleTable, RuleParseError> {
    RuleTable::parse(rules, num_dimensions)
}

/// Resolve the colors of `dimensions` (in declared order) against `table`.
pub fn resolve(
    input_colors: &BTreeMap<String, Color>,
    dimensions: &[String],
    table: &RuleTable,
) -> Result<Color> {
    let colors = dimensions
        .iter()
        .map(|dimension| {
            input_colors
                .get(dimension)
                .copied()
                .map(Some)
                .ok_or_else(|| Error::MissingDimension(dimension.clone()))
        })
        .collect::<Result<Vec<_>>>()?;

    table.find(&colors).ok_or_else(|| Error::NoRuleMatch {
        input: format_named(dimensions, &colors),
    })
}

/// Like [`resolve`], but dimensions without a color are pinned to `*`.
pub fn resolve_available<F>(dimensions: &[String], table: &RuleTable, color_of: F) -> Result<Color>
where
    F: Fn(&str) -> Option<Color>,
{
    let colors: Vec<Option<Color>> = dimensions
        .iter()
        .map(|dimension| color_of(dimension))
        .collect();

    table.find(&colors).ok_or_else(|| Error::NoRuleMatch {
        input: format_named(dimensions, &colors),
    })
}

fn next_combination(combo: &mut [usize], n: usize) -> bool {
    let k = combo.len();
    for i in (0..k).rev() {
        if combo[i] < n - k + i {
            combo[i] += 1;
            for j in i + 1..k {
                combo[j] = combo[j - 1] + 1;
            }
            return true;
        }
    }
    false
}

fn format_tuple(colors: &[Option<Color>]) -> String {
    let parts: Vec<String> = colors.iter().map(|color| format_color(*color)).collect();
    format!("({})", parts.join(", "))
}

fn format_named(dimensions: &[String], colors: &[Option<Color>]) -> String {
    let parts: Vec<String> = dimensions
        .iter()
        .zip(colors)
        .map(|(dimension, color)| format!("{dimension}: {}", format_color(*color)))
        .collect();
    format!("{{{}}}", parts.join(", "))
}

fn format_color(color: Option<Color>) -> String {
    color.map_or_else(|| "-".to_string(), |color| color.to_string())
}
