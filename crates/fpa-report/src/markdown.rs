use fpa_core::pipeline::{EstimateReport, TrendReport};
use fpa_core::types::GeneralSystemCharacteristic;

/// Format a full estimate report as Markdown.
pub fn format_estimate(report: &EstimateReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("# Function Point Estimate: {}\n\n", report.project));

    out.push_str("## Summary\n\n");
    out.push_str("| Metric | Value |\n");
    out.push_str("|--------|-------|\n");
    out.push_str(&format!(
        "| Unadjusted FP | {} |\n",
        report.unadjusted_fp
    ));
    out.push_str(&format!(
        "| Value Adjustment Factor | {:.2} |\n",
        report.estimate.value_adjustment_factor
    ));
    out.push_str(&format!(
        "| Adjusted FP | {:.1} |\n",
        report.estimate.adjusted_fp
    ));
    out.push_str(&format!(
        "| Productivity | {:.1} hours/FP |\n",
        report.productivity_factor
    ));
    out.push_str(&format!(
        "| **Effort** | **{:.1} hours** |\n",
        report.estimate.effort_hours
    ));

    out.push_str("\n## By Kind\n\n");
    out.push_str("| Kind | Low | Average | High | FP |\n");
    out.push_str("|------|-----|---------|------|----|\n");
    for s in &report.by_kind {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            s.kind.abbreviation(),
            s.low,
            s.average,
            s.high,
            s.function_points
        ));
    }

    if report.components.is_empty() {
        out.push_str("\n## Components\n\nNo components counted.\n");
    } else {
        out.push_str(&format!(
            "\n## Components ({})\n\n",
            report.components.len()
        ));
        out.push_str("| Name | Kind | References | Data Elements | Complexity | FP |\n");
        out.push_str("|------|------|------------|---------------|------------|----|\n");
        for c in &report.components {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                escape(&c.name),
                c.kind.abbreviation(),
                c.references,
                c.data_elements,
                c.level,
                c.function_points
            ));
        }
    }

    out.push_str("\n## General System Characteristics\n\n");
    out.push_str("| Characteristic | Degree |\n");
    out.push_str("|----------------|--------|\n");
    for (gsc, degree) in GeneralSystemCharacteristic::ALL.iter().zip(&report.influence) {
        out.push_str(&format!("| {} | {degree} |\n", gsc.label()));
    }
    out.push_str(&format!(
        "| **Total** | **{}** |\n",
        report.total_degree_of_influence
    ));

    out
}

/// Format a trend report as Markdown.
pub fn format_trend(report: &TrendReport) -> String {
    let analysis = &report.analysis;
    let mut out = String::new();

    out.push_str(&format!("# Estimate Trend: {}\n\n", report.metric));

    let change = analysis
        .percentage_change
        .map(|p| format!("{p:+.1}%"))
        .unwrap_or_else(|| "n/a".to_string());

    out.push_str(&format!(
        "- **Trend:** {}\n- **Change:** {change}\n- **Average:** {:.2}\n- **Range:** {:.2} .. {:.2}\n- **Forecast:** {:.2} (confidence {:.1}%)\n",
        analysis.trend,
        analysis.average_value,
        analysis.min_value,
        analysis.max_value,
        analysis.forecasted_value,
        analysis.confidence_level
    ));

    out.push_str("\n## History\n\n| Date | Value |\n|------|-------|\n");
    for s in &analysis.data {
        let marker = if report.anomalies.iter().any(|a| a == s) {
            " ⚠"
        } else {
            ""
        };
        out.push_str(&format!(
            "| {} | {:.2}{marker} |\n",
            s.timestamp.format("%Y-%m-%d"),
            s.value
        ));
    }

    if !report.forecast.is_empty() {
        out.push_str("\n## Forecast\n\n| Date | Value |\n|------|-------|\n");
        for p in &report.forecast {
            out.push_str(&format!(
                "| {} | {:.2} |\n",
                p.date.format("%Y-%m-%d"),
                p.value
            ));
        }
    }

    out.push_str(&format!(
        "\n## Anomalies\n\n{} value(s) beyond z = {}.\n",
        report.anomalies.len(),
        report.anomaly_threshold
    ));

    out
}

fn escape(text: &str) -> String {
    text.replace('|', "\\|")
}
