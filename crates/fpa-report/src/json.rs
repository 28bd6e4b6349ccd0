use anyhow::{Context, Result};
use serde::Serialize;

use fpa_core::pipeline::{BudgetCheck, EstimateReport, TrendReport};

fn to_json<T: Serialize>(value: &T, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    json.context("failed to serialize report")
}

/// Format a full estimate report as JSON.
pub fn format_estimate(report: &EstimateReport, compact: bool) -> Result<String> {
    to_json(report, compact)
}

/// Wrapper for check output that adds pass/fail metadata.
#[derive(Debug, Serialize)]
pub struct CheckOutput<'a> {
    #[serde(flatten)]
    pub report: &'a EstimateReport,
    pub check: &'a BudgetCheck,
}

/// Format a budget check as JSON. Returns (json_string, passed).
pub fn format_check(
    report: &EstimateReport,
    check: &BudgetCheck,
    compact: bool,
) -> Result<(String, bool)> {
    let output = CheckOutput { report, check };
    Ok((to_json(&output, compact)?, check.passed))
}

/// Format a trend report as JSON.
pub fn format_trend(report: &TrendReport, compact: bool) -> Result<String> {
    to_json(report, compact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_estimate, sample_trend};

    #[test]
    fn test_estimate_valid_json() {
        let json = format_estimate(&sample_estimate(), false).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("should be valid JSON");
        assert_eq!(parsed["project"], "billing");
        assert_eq!(parsed["unadjusted_fp"], 40);
        // Adjusted estimate fields are flattened to the top level
        assert!(parsed.get("value_adjustment_factor").is_some());
        assert!(parsed.get("effort_hours").is_some());
        assert_eq!(parsed["components"][0]["level"], "low");
        assert_eq!(parsed["components"][0]["kind"], "internal-data-store");
    }

    #[test]
    fn test_compact_is_single_line() {
        let json = format_estimate(&sample_estimate(), true).unwrap();
        assert!(!json.contains('\n'), "compact JSON should be single line");
        let pretty = format_trend(&sample_trend(), false).unwrap();
        assert!(pretty.contains('\n'), "pretty JSON should be multiline");
    }

    #[test]
    fn test_check_flattened_fields() {
        let check = BudgetCheck {
            passed: true,
            breaches: vec![],
        };
        let (json, passed) = format_check(&sample_estimate(), &check, false).unwrap();
        assert!(passed);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.get("unadjusted_fp").is_some());
        assert_eq!(parsed["check"]["passed"], true);
    }

    #[test]
    fn test_trend_json_shape() {
        let json = format_trend(&sample_trend(), false).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["metric"], "adjusted-fp");
        assert_eq!(parsed["analysis"]["trend"], "increasing");
        assert_eq!(parsed["anomalies"].as_array().map(Vec::len), Some(1));
        assert_eq!(parsed["forecast"].as_array().map(Vec::len), Some(2));
    }
}
