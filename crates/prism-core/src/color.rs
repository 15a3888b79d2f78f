use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// RAG status rating, ordered best to worst (`Green < Yellow < Red`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Green,
    Yellow,
    Red,
}

impl Color {
    /// Fixed evaluation priority for threshold sets.
    pub const PRIORITY: [Color; 3] = [Color::Green, Color::Yellow, Color::Red];

    /// Rank from best (0) to worst (2).
    pub fn rank(self) -> usize {
        match self {
            Color::Green => 0,
            Color::Yellow => 1,
            Color::Red => 2,
        }
    }

    /// Numeric score used by weighted averaging (green=3, yellow=2, red=1).
    pub fn score(self) -> f64 {
        match self {
            Color::Green => 3.0,
            Color::Yellow => 2.0,
            Color::Red => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Red => "red",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "green" => Ok(Color::Green),
            "yellow" => Ok(Color::Yellow),
            "red" => Ok(Color::Red),
            other => Err(Error::InvalidColor(other.to_string())),
        }
    }
}

/// A position in a matrix rule: a concrete color or the `*` wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleToken {
    Is(Color),
    Any,
}

impl RuleToken {
    pub const WILDCARD: &'static str = "*";

    pub fn is_wildcard(self) -> bool {
        matches!(self, RuleToken::Any)
    }
}

impl From<Color> for RuleToken {
    fn from(color: Color) -> Self {
        RuleToken::Is(color)
    }
}

impl fmt::Display for RuleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleToken::Is(color) => color.fmt(f),
            RuleToken::Any => f.write_str(Self::WILDCARD),
        }
    }
}

impl FromStr for RuleToken {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value == Self::WILDCARD {
            Ok(RuleToken::Any)
        } else {
            value.parse().map(RuleToken::Is)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_green_before_red() {
        assert!(Color::Green < Color::Yellow);
        assert!(Color::Yellow < Color::Red);
        assert_eq!(Color::PRIORITY.iter().max(), Some(&Color::Red));
    }

    #[test]
    fn parses_tokens_and_rejects_unknown_colors() {
        assert_eq!("*".parse::<RuleToken>().ok(), Some(RuleToken::Any));
        assert_eq!(
            "yellow".parse::<RuleToken>().ok(),
            Some(RuleToken::Is(Color::Yellow))
        );
        assert!(matches!(
            "amber".parse::<Color>(),
            Err(Error::InvalidColor(token)) if token == "amber"
        ));
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&Color::Yellow).expect("serialize color");
        assert_eq!(json, "\"yellow\"");
    }
}
