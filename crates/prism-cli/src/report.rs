use std::path::Path;

use prism_config::{ModelConfig, ValidationIssue, ValidationReport};
use prism_rating::{RatingResult, RatingSummary};
use serde::Serialize;

/// Ratings artifact written to `ratings.json` and `--out`.
#[derive(Debug, Serialize)]
pub struct RatingsReport<'a> {
    pub model_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<&'a str>,
    #[serde(flatten)]
    pub result: &'a RatingResult,
    pub summary: RatingSummary,
}

impl<'a> RatingsReport<'a> {
    pub fn new(config: &'a ModelConfig, result: &'a RatingResult, run_id: Option<&'a str>) -> Self {
        Self {
            model_id: &config.model_id,
            model_name: config.model_name.as_deref(),
            model_version: config.model_version.as_deref(),
            run_id,
            result,
            summary: result.summary(),
        }
    }
}

pub fn print_config_ok(path: &Path, warnings: &[ValidationIssue]) {
    println!("[OK] {}", path.display());
    for issue in warnings {
        print_issue("warning", issue);
    }
}

pub fn print_config_failure(path: &Path, report: &ValidationReport) {
    println!("[FAIL] {}", path.display());
    for issue in &report.errors {
        print_issue("error", issue);
    }
    for issue in &report.warnings {
        print_issue("warning", issue);
    }
}

fn print_issue(label: &str, issue: &ValidationIssue) {
    println!("  {label} {} {}: {}", issue.code, issue.path, issue.message);
    if let Some(hint) = &issue.hint {
        println!("    hint: {hint}");
    }
}
