use colored::Colorize;

use fpa_core::classifier;
use fpa_core::pipeline::{BudgetCheck, EstimateReport, TrendReport};
use fpa_core::trend::TrendDirection;
use fpa_core::types::{ComplexityLevel, ComponentKind, GeneralSystemCharacteristic};

/// Format a full estimate report for terminal output.
pub fn format_estimate(report: &EstimateReport) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "\n{}\n",
        format!("FPA - Function Point Estimate: {}", report.project).bold()
    ));
    out.push_str(&format!("{}\n\n", "=".repeat(40)));

    out.push_str(&format!(
        "{}: {:.1} hours\n",
        "Estimated Effort".bold(),
        report.estimate.effort_hours
    ));
    out.push_str(&format!(
        "  Unadjusted FP:         {}\n",
        report.unadjusted_fp
    ));
    out.push_str(&format!(
        "  Value Adjustment:      {:.2} (total influence {})\n",
        report.estimate.value_adjustment_factor, report.total_degree_of_influence
    ));
    out.push_str(&format!(
        "  Adjusted FP:           {:.1}\n",
        report.estimate.adjusted_fp
    ));
    out.push_str(&format!(
        "  Productivity:          {:.1} hours/FP\n",
        report.productivity_factor
    ));

    // Breakdown by kind
    out.push_str(&format!("\n{}\n{}\n", "By Kind".bold(), "-".repeat(40)));
    for summary in report.by_kind.iter().filter(|s| s.count() > 0) {
        out.push_str(&format!(
            "  {:<4} {:>3} (low {}, average {}, high {})  {:>4} FP\n",
            summary.kind.abbreviation(),
            summary.count(),
            summary.low,
            summary.average,
            summary.high,
            summary.function_points,
        ));
    }

    // Components
    if report.components.is_empty() {
        out.push_str(&format!("\n{}\n", "No components counted.".yellow()));
    } else {
        out.push_str(&format!(
            "\n{} ({})\n{}\n",
            "Components".bold(),
            report.components.len(),
            "-".repeat(40)
        ));
        for c in &report.components {
            out.push_str(&format!(
                "  {:<4} {} [{}] {} FP\n",
                c.kind.abbreviation(),
                c.name,
                level_label(c.level),
                c.function_points,
            ));
        }
    }

    // Influence factors
    out.push_str(&format!(
        "\n{}\n{}\n",
        "General System Characteristics".bold(),
        "-".repeat(40)
    ));
    for (gsc, degree) in GeneralSystemCharacteristic::ALL.iter().zip(&report.influence) {
        out.push_str(&format!("  {:<30} {degree}\n", gsc.label()));
    }

    out.push('\n');
    out
}

fn level_label(level: ComplexityLevel) -> String {
    match level {
        ComplexityLevel::Low => "low".green().to_string(),
        ComplexityLevel::Average => "average".yellow().to_string(),
        ComplexityLevel::High => "high".red().to_string(),
    }
}

/// Format a budget check for CI use. Returns (text, passed).
pub fn format_check(report: &EstimateReport, check: &BudgetCheck) -> (String, bool) {
    let mut out = format_estimate(report);

    if check.passed {
        out.push_str(&format!("{}\n", "CHECK PASSED".green().bold()));
    } else {
        out.push_str(&format!(
            "{}: {} budget(s) exceeded\n",
            "CHECK FAILED".red().bold(),
            check.breaches.len()
        ));
        for breach in &check.breaches {
            out.push_str(&format!("  - {breach}\n"));
        }
    }

    (out, check.passed)
}

/// Format a trend report for terminal output.
pub fn format_trend(report: &TrendReport) -> String {
    let mut out = String::new();
    let analysis = &report.analysis;

    out.push_str(&format!(
        "\n{}\n",
        format!("FPA - Trend: {}", report.metric).bold()
    ));
    out.push_str(&format!("{}\n\n", "=".repeat(40)));

    let trend_str = analysis.trend.to_string();
    let trend_colored = match analysis.trend {
        TrendDirection::Increasing => trend_str.red(),
        TrendDirection::Decreasing => trend_str.green(),
        TrendDirection::Stable => trend_str.normal(),
    };
    out.push_str(&format!("{}: {}\n", "Trend".bold(), trend_colored));

    let change = analysis
        .percentage_change
        .map(|p| format!("{p:+.1}%"))
        .unwrap_or_else(|| "n/a".to_string());
    out.push_str(&format!("  Change:        {change}\n"));
    out.push_str(&format!(
        "  Range:         {:.2} .. {:.2} (avg {:.2})\n",
        analysis.min_value, analysis.max_value, analysis.average_value
    ));
    out.push_str(&format!(
        "  Slope:         {:.4}/day\n",
        analysis.regression.slope
    ));
    out.push_str(&format!(
        "  Forecast:      {:.2} (confidence {:.1}%)\n",
        analysis.forecasted_value, analysis.confidence_level
    ));

    out.push_str(&format!(
        "\n{} ({} snapshots)\n{}\n",
        "History".bold(),
        analysis.data.len(),
        "-".repeat(40)
    ));
    for s in &analysis.data {
        out.push_str(&format!(
            "  {}  {:.2}\n",
            s.timestamp.format("%Y-%m-%d"),
            s.value
        ));
    }

    if !report.forecast.is_empty() {
        out.push_str(&format!("\n{}\n{}\n", "Forecast".bold(), "-".repeat(40)));
        for p in &report.forecast {
            out.push_str(&format!("  {}  {:.2}\n", p.date.format("%Y-%m-%d"), p.value));
        }
    }

    if report.anomalies.is_empty() {
        out.push_str(&format!("\n{}\n", "No anomalies detected.".green()));
    } else {
        out.push_str(&format!(
            "\n{} ({} found, z > {})\n{}\n",
            "Anomalies".yellow().bold(),
            report.anomalies.len(),
            report.anomaly_threshold,
            "-".repeat(40)
        ));
        for s in &report.anomalies {
            out.push_str(&format!(
                "  {}  {:.2}\n",
                s.timestamp.format("%Y-%m-%d"),
                s.value
            ));
        }
    }

    out.push('\n');
    out
}

/// Format the fixed classification tables.
pub fn format_tables() -> String {
    let mut out = String::new();
    out.push_str(&format!("\n{}\n", "FPA - Classification Tables".bold()));
    out.push_str(&format!("{}\n", "=".repeat(40)));

    for kind in ComponentKind::ALL {
        let (references, elements) = classifier::axis_tables(kind);
        let points = classifier::function_point_table(kind);
        out.push_str(&format!("\n{} ({})\n", kind.abbreviation().bold(), kind));
        out.push_str(&format!(
            "  {:<16} {}\n",
            kind.reference_axis_label(),
            format_ranges(&references.ranges())
        ));
        out.push_str(&format!(
            "  {:<16} {}\n",
            "data elements",
            format_ranges(&elements.ranges())
        ));
        out.push_str(&format!(
            "  {:<16} low {}, average {}, high {}\n",
            "function points", points.low, points.average, points.high
        ));
    }

    out.push('\n');
    out
}

fn format_ranges(ranges: &[classifier::ComplexityRange]) -> String {
    ranges
        .iter()
        .map(|r| match r.max {
            Some(max) if max == r.min => format!("{} {}", r.level, r.min),
            Some(max) => format!("{} {}-{}", r.level, r.min, max),
            None => format!("{} {}+", r.level, r.min),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_estimate, sample_trend};

    #[test]
    fn test_estimate_mentions_totals() {
        colored::control::set_override(false);
        let text = format_estimate(&sample_estimate());
        assert!(text.contains("Estimated Effort: 332.8 hours"), "{text}");
        assert!(text.contains("Adjusted FP:           41.6"));
        assert!(text.contains("Facilitate change"));
        assert!(text.contains("ILF"));
    }

    #[test]
    fn test_check_failed_lists_breaches() {
        colored::control::set_override(false);
        let check = BudgetCheck {
            passed: false,
            breaches: vec!["effort of 332.8 hours exceeds budget of 100.0".to_string()],
        };
        let (text, passed) = format_check(&sample_estimate(), &check);
        assert!(!passed);
        assert!(text.contains("CHECK FAILED"));
        assert!(text.contains("exceeds budget"));
    }

    #[test]
    fn test_trend_text() {
        colored::control::set_override(false);
        let text = format_trend(&sample_trend());
        assert!(text.contains("Trend: increasing"), "{text}");
        assert!(text.contains("Anomalies (1 found"));
        assert!(text.contains("+30.0%"));
    }

    #[test]
    fn test_tables_show_every_kind() {
        colored::control::set_override(false);
        let text = format_tables();
        for kind in ComponentKind::ALL {
            assert!(text.contains(kind.abbreviation()));
        }
        assert!(text.contains("low 0-1, average 2-5, high 6+"));
        assert!(text.contains("average 2, high 3+"));
    }
}
