use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classifier::{self, QuerySide};
use crate::config::{CheckConfig, Config};
use crate::error::EstimationError;
use crate::estimate::{self, AdjustedEstimate};
use crate::trend::{
    self, EstimateRecord, EstimateSnapshot, ForecastPoint, TrendAnalysis, TrendMetric,
};
use crate::types::{ComplexityLevel, ComponentKind, GeneralSystemCharacteristic};

/// Degrees of influence, either as the ordered 14-entry vector or keyed by
/// characteristic name. Characteristics missing from the keyed form count as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InfluenceFactors {
    Vector(Vec<i64>),
    Named(HashMap<GeneralSystemCharacteristic, i64>),
}

impl InfluenceFactors {
    pub fn to_vector(&self) -> Vec<i64> {
        match self {
            InfluenceFactors::Vector(values) => values.clone(),
            InfluenceFactors::Named(named) => GeneralSystemCharacteristic::ALL
                .iter()
                .map(|gsc| named.get(gsc).copied().unwrap_or(0))
                .collect(),
        }
    }
}

/// One component as counted by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentInput {
    pub name: String,
    pub kind: ComponentKind,
    /// Record groups for data functions, file references for transactions.
    pub references: i64,
    pub data_elements: i64,
    /// Output-side counts of an external query rated from both perspectives.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_side: Option<QuerySide>,
}

/// Everything needed to size one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateInput {
    pub project: String,
    /// Overrides the configured hours per function point.
    #[serde(default)]
    pub productivity_factor: Option<f64>,
    pub influence: InfluenceFactors,
    #[serde(default)]
    pub components: Vec<ComponentInput>,
}

/// A component with its rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedComponent {
    pub name: String,
    pub kind: ComponentKind,
    pub references: i64,
    pub data_elements: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_side: Option<QuerySide>,
    pub level: ComplexityLevel,
    pub function_points: u32,
}

/// Component counts and points for one kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KindSummary {
    pub kind: ComponentKind,
    pub low: usize,
    pub average: usize,
    pub high: usize,
    pub function_points: u64,
}

impl KindSummary {
    pub fn count(&self) -> usize {
        self.low + self.average + self.high
    }
}

/// Full estimate output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateReport {
    pub project: String,
    pub components: Vec<ClassifiedComponent>,
    pub by_kind: Vec<KindSummary>,
    pub unadjusted_fp: u64,
    pub influence: Vec<i64>,
    pub total_degree_of_influence: i64,
    pub productivity_factor: f64,
    #[serde(flatten)]
    pub estimate: AdjustedEstimate,
}

impl EstimateReport {
    /// The numeric outputs of this estimate, stamped for history tracking.
    pub fn record(&self, timestamp: DateTime<Utc>) -> EstimateRecord {
        EstimateRecord {
            timestamp,
            project: Some(self.project.clone()),
            unadjusted_fp: self.unadjusted_fp,
            value_adjustment_factor: self.estimate.value_adjustment_factor,
            adjusted_fp: self.estimate.adjusted_fp,
            effort_hours: self.estimate.effort_hours,
        }
    }
}

/// Trend analysis, forecast and anomalies for one metric of an estimate history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub metric: TrendMetric,
    pub analysis: TrendAnalysis,
    pub forecast: Vec<ForecastPoint>,
    pub anomaly_threshold: f64,
    pub anomalies: Vec<EstimateSnapshot>,
}

/// Outcome of comparing an estimate against configured budgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetCheck {
    pub passed: bool,
    pub breaches: Vec<String>,
}

/// Drives the engine over whole projects and histories.
pub struct EstimationPipeline {
    config: Config,
}

impl EstimationPipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn classify_component(&self, component: &ComponentInput) -> Result<ClassifiedComponent> {
        let classification = match (component.kind, component.output_side) {
            (ComponentKind::ExternalQuery, Some(output)) => classifier::classify_dual_query(
                QuerySide {
                    file_references: component.references,
                    data_elements: component.data_elements,
                },
                output,
                self.config.classifier.dual_query_strategy,
            )?,
            (kind, Some(_)) => {
                bail!("output-side counts are only allowed for external queries, not {kind}")
            }
            (kind, None) => {
                classifier::classify(kind, component.references, component.data_elements)?
            }
        };

        debug!(
            component = %component.name,
            kind = %component.kind,
            level = %classification.level,
            points = classification.function_points,
            "component classified"
        );

        Ok(ClassifiedComponent {
            name: component.name.clone(),
            kind: component.kind,
            references: component.references,
            data_elements: component.data_elements,
            output_side: component.output_side,
            level: classification.level,
            function_points: classification.function_points,
        })
    }

    /// Classify every component, sum the points, and apply the value adjustment.
    pub fn estimate(&self, input: &EstimateInput) -> Result<EstimateReport> {
        let components: Vec<ClassifiedComponent> = input
            .components
            .par_iter()
            .map(|c| {
                self.classify_component(c)
                    .with_context(|| format!("failed to classify component '{}'", c.name))
            })
            .collect::<Result<_>>()?;

        let by_kind = summarize_by_kind(&components);
        let unadjusted_fp: u64 = components.iter().map(|c| u64::from(c.function_points)).sum();

        let influence = input.influence.to_vector();
        let total_degree_of_influence = estimate::total_degree_of_influence(&influence)
            .context("invalid influence factors")?;
        let productivity_factor = input
            .productivity_factor
            .unwrap_or(self.config.estimate.productivity_factor);

        let ufp = i64::try_from(unadjusted_fp).context("unadjusted function points overflow")?;
        let adjusted = estimate::compute_adjusted_estimate(ufp, &influence, productivity_factor)
            .context("failed to compute adjusted estimate")?;

        info!(
            project = %input.project,
            components = components.len(),
            unadjusted_fp,
            adjusted_fp = adjusted.adjusted_fp,
            effort_hours = adjusted.effort_hours,
            "estimate computed"
        );

        Ok(EstimateReport {
            project: input.project.clone(),
            components,
            by_kind,
            unadjusted_fp,
            influence,
            total_degree_of_influence,
            productivity_factor,
            estimate: adjusted,
        })
    }

    /// Analyze one metric of an estimate history, falling back to the configured
    /// metric and forecast horizon when none is given.
    pub fn trend(
        &self,
        records: &[EstimateRecord],
        metric: Option<TrendMetric>,
        periods: Option<u32>,
    ) -> Result<TrendReport> {
        let metric = metric.unwrap_or(self.config.trend.metric);
        let periods = periods.unwrap_or(self.config.trend.forecast_periods);
        let threshold = self.config.trend.anomaly_threshold;

        let snapshots = trend::snapshots_for(records, metric);
        let analysis = trend::analyze_trend(&snapshots, periods)
            .with_context(|| format!("failed to analyze {metric} trend"))?;
        let forecast = trend::forecast_values(&snapshots, periods)
            .with_context(|| format!("failed to forecast {metric}"))?;
        let anomalies = trend::detect_anomalies(&snapshots, threshold)
            .context("failed to detect anomalies")?;

        Ok(TrendReport {
            metric,
            analysis,
            forecast,
            anomaly_threshold: threshold,
            anomalies,
        })
    }
}

fn summarize_by_kind(components: &[ClassifiedComponent]) -> Vec<KindSummary> {
    ComponentKind::ALL
        .iter()
        .map(|&kind| {
            let mut summary = KindSummary {
                kind,
                low: 0,
                average: 0,
                high: 0,
                function_points: 0,
            };
            for c in components.iter().filter(|c| c.kind == kind) {
                match c.level {
                    ComplexityLevel::Low => summary.low += 1,
                    ComplexityLevel::Average => summary.average += 1,
                    ComplexityLevel::High => summary.high += 1,
                }
                summary.function_points += u64::from(c.function_points);
            }
            summary
        })
        .collect()
}

fn checked_budget(
    name: &'static str,
    max: Option<f64>,
) -> Result<Option<f64>, EstimationError> {
    match max {
        Some(value) if !value.is_finite() || value < 0.0 => {
            Err(EstimationError::InvalidBudget { name, value })
        }
        _ => Ok(max),
    }
}

/// Compare an estimate against the configured budgets.
pub fn check_budget(
    report: &EstimateReport,
    budget: &CheckConfig,
) -> Result<BudgetCheck, EstimationError> {
    let max_adjusted_fp = checked_budget("adjusted function point", budget.max_adjusted_fp)?;
    let max_effort_hours = checked_budget("effort", budget.max_effort_hours)?;
    let mut breaches = Vec::new();

    if let Some(max) = max_adjusted_fp {
        if report.estimate.adjusted_fp > max {
            breaches.push(format!(
                "adjusted function points {:.1} exceed budget of {max:.1}",
                report.estimate.adjusted_fp
            ));
        }
    }
    if let Some(max) = max_effort_hours {
        if report.estimate.effort_hours > max {
            breaches.push(format!(
                "effort of {:.1} hours exceeds budget of {max:.1}",
                report.estimate.effort_hours
            ));
        }
    }

    Ok(BudgetCheck {
        passed: breaches.is_empty(),
        breaches,
    })
}
