//! Regression trend, forecasting, and anomaly detection over historical estimates.
//!
//! All functions take the caller's snapshots by reference, sort a private copy
//! chronologically, and never mutate shared state. The x-axis is fractional days
//! since the earliest snapshot.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EstimationError;

/// Slope (value change per day) above which a series is increasing,
/// and below whose negation it is decreasing.
pub const STABLE_SLOPE_THRESHOLD: f64 = 0.05;

pub const DEFAULT_ANOMALY_THRESHOLD: f64 = 2.0;
pub const DEFAULT_FORECAST_PERIODS: u32 = 1;

pub const MIN_REGRESSION_SNAPSHOTS: usize = 2;
pub const MIN_ANOMALY_SNAPSHOTS: usize = 4;

/// Longest forecast horizon, in average snapshot steps.
pub const MAX_FORECAST_PERIODS: u32 = 10_000;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// One historical value of an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimateSnapshot {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl EstimateSnapshot {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Ordinary least-squares fit of value against days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl RegressionResult {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    pub fn from_slope(slope: f64) -> Self {
        if slope > STABLE_SLOPE_THRESHOLD {
            TrendDirection::Increasing
        } else if slope < -STABLE_SLOPE_THRESHOLD {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Increasing => write!(f, "increasing"),
            TrendDirection::Decreasing => write!(f, "decreasing"),
            TrendDirection::Stable => write!(f, "stable"),
        }
    }
}

/// Summary of a snapshot series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    /// Snapshots in chronological order.
    pub data: Vec<EstimateSnapshot>,
    pub trend: TrendDirection,
    /// Change from the first to the last value, in percent.
    /// `None` when the first value is zero.
    pub percentage_change: Option<f64>,
    pub average_value: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub forecasted_value: f64,
    /// R² of the fit scaled to 0..=100.
    pub confidence_level: f64,
    pub regression: RegressionResult,
}

/// A projected value at a future date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: DateTime<Utc>,
    pub value: f64,
}

/// Fit a least-squares line through `(xs[i], ys[i])`.
///
/// A zero x-variance yields slope 0; a zero y-variance yields R² 0.
pub fn linear_regression(xs: &[f64], ys: &[f64]) -> RegressionResult {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return RegressionResult {
            slope: 0.0,
            intercept: 0.0,
            r_squared: 0.0,
        };
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);

    let mean_x = mean(xs);
    let mean_y = mean(ys);

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        numerator += (x - mean_x) * (y - mean_y);
        denominator += (x - mean_x) * (x - mean_x);
    }

    let slope = if denominator == 0.0 {
        debug!("all snapshots share one x value; slope forced to zero");
        0.0
    } else {
        numerator / denominator
    };
    let intercept = mean_y - slope * mean_x;

    let mut residual = 0.0;
    let mut total = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let predicted = intercept + slope * x;
        residual += (y - predicted) * (y - predicted);
        total += (y - mean_y) * (y - mean_y);
    }

    let r_squared = if total == 0.0 {
        0.0
    } else {
        (1.0 - residual / total).clamp(0.0, 1.0)
    };

    RegressionResult {
        slope,
        intercept,
        r_squared,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MILLIS_PER_DAY
}

fn days_to_duration(days: f64) -> Option<Duration> {
    let millis = (days * MILLIS_PER_DAY).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    Duration::try_milliseconds(millis as i64)
}

fn check_horizon(periods: u32) -> Result<(), EstimationError> {
    if periods > MAX_FORECAST_PERIODS {
        return Err(EstimationError::ForecastHorizonOutOfRange { periods });
    }
    Ok(())
}

/// Chronologically sorted copy of the input, validated for finite values.
fn sorted_snapshots(
    snapshots: &[EstimateSnapshot],
) -> Result<Vec<EstimateSnapshot>, EstimationError> {
    if let Some(index) = snapshots.iter().position(|s| !s.value.is_finite()) {
        return Err(EstimationError::NonFiniteSnapshot { index });
    }
    let mut data = snapshots.to_vec();
    data.sort_by_key(|s| s.timestamp);
    Ok(data)
}

/// A sorted series together with its regression line.
struct FittedSeries {
    data: Vec<EstimateSnapshot>,
    regression: RegressionResult,
    last_x: f64,
    /// Average spacing between consecutive snapshots, in days.
    step_days: f64,
}

impl FittedSeries {
    fn fit(snapshots: &[EstimateSnapshot]) -> Result<Self, EstimationError> {
        if snapshots.len() < MIN_REGRESSION_SNAPSHOTS {
            return Err(EstimationError::InsufficientSnapshots {
                required: MIN_REGRESSION_SNAPSHOTS,
                actual: snapshots.len(),
            });
        }

        let data = sorted_snapshots(snapshots)?;
        let first = data[0].timestamp;
        let xs: Vec<f64> = data.iter().map(|s| days_between(first, s.timestamp)).collect();
        let ys: Vec<f64> = data.iter().map(|s| s.value).collect();

        let regression = linear_regression(&xs, &ys);
        let last_x = xs[xs.len() - 1];
        let step_days = last_x / (xs.len() - 1) as f64;
        if step_days == 0.0 {
            debug!("snapshots span zero time; forecasts stay at the last snapshot");
        }

        Ok(Self {
            data,
            regression,
            last_x,
            step_days,
        })
    }

    fn last_timestamp(&self) -> DateTime<Utc> {
        self.data[self.data.len() - 1].timestamp
    }

    fn offset_days(&self, periods: u32) -> f64 {
        self.step_days * f64::from(periods)
    }

    fn project_value(&self, periods: u32) -> f64 {
        self.regression
            .predict(self.last_x + self.offset_days(periods))
            .max(0.0)
    }

    fn project(&self, periods: u32) -> Result<ForecastPoint, EstimationError> {
        let date = days_to_duration(self.offset_days(periods))
            .and_then(|offset| self.last_timestamp().checked_add_signed(offset))
            .ok_or(EstimationError::ForecastHorizonOutOfRange { periods })?;
        Ok(ForecastPoint {
            date,
            value: self.project_value(periods),
        })
    }
}

/// Fit a trend line through the snapshots and project it `forecast_periods`
/// average steps past the last snapshot.
pub fn analyze_trend(
    snapshots: &[EstimateSnapshot],
    forecast_periods: u32,
) -> Result<TrendAnalysis, EstimationError> {
    check_horizon(forecast_periods)?;
    let fitted = FittedSeries::fit(snapshots)?;
    let values: Vec<f64> = fitted.data.iter().map(|s| s.value).collect();

    let first = values[0];
    let last = values[values.len() - 1];
    let percentage_change = if first == 0.0 {
        None
    } else {
        Some((last - first) / first * 100.0)
    };

    let min_value = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max_value = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let forecasted_value = fitted.project_value(forecast_periods);
    let trend = TrendDirection::from_slope(fitted.regression.slope);

    debug!(
        slope = fitted.regression.slope,
        r_squared = fitted.regression.r_squared,
        %trend,
        "trend analyzed"
    );

    Ok(TrendAnalysis {
        average_value: mean(&values),
        min_value,
        max_value,
        forecasted_value,
        confidence_level: fitted.regression.r_squared * 100.0,
        percentage_change,
        trend,
        regression: fitted.regression,
        data: fitted.data,
    })
}

/// Project `periods` successive points at the series' average spacing.
/// Projected values never go below zero.
pub fn forecast_values(
    snapshots: &[EstimateSnapshot],
    periods: u32,
) -> Result<Vec<ForecastPoint>, EstimationError> {
    check_horizon(periods)?;
    let fitted = FittedSeries::fit(snapshots)?;
    (1..=periods).map(|period| fitted.project(period)).collect()
}

/// Snapshots whose z-score (population standard deviation) exceeds `threshold`,
/// in chronological order.
///
/// Fewer than four snapshots, or a series with no spread, yields no anomalies.
pub fn detect_anomalies(
    snapshots: &[EstimateSnapshot],
    threshold: f64,
) -> Result<Vec<EstimateSnapshot>, EstimationError> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(EstimationError::InvalidThreshold(threshold));
    }
    let data = sorted_snapshots(snapshots)?;
    if data.len() < MIN_ANOMALY_SNAPSHOTS {
        return Ok(Vec::new());
    }

    let values: Vec<f64> = data.iter().map(|s| s.value).collect();
    let mean = mean(&values);
    let variance =
        values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / values.len() as f64;
    let std_dev = variance.sqrt();

    if std_dev == 0.0 {
        return Ok(Vec::new());
    }

    Ok(data
        .into_iter()
        .filter(|s| (s.value - mean).abs() / std_dev > threshold)
        .collect())
}

/// Which field of a historical estimate a trend follows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrendMetric {
    UnadjustedFp,
    #[default]
    AdjustedFp,
    EffortHours,
    ValueAdjustmentFactor,
}

impl fmt::Display for TrendMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendMetric::UnadjustedFp => write!(f, "unadjusted-fp"),
            TrendMetric::AdjustedFp => write!(f, "adjusted-fp"),
            TrendMetric::EffortHours => write!(f, "effort-hours"),
            TrendMetric::ValueAdjustmentFactor => write!(f, "value-adjustment-factor"),
        }
    }
}

impl std::str::FromStr for TrendMetric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unadjusted-fp" | "ufp" => Ok(TrendMetric::UnadjustedFp),
            "adjusted-fp" | "afp" => Ok(TrendMetric::AdjustedFp),
            "effort-hours" | "effort" => Ok(TrendMetric::EffortHours),
            "value-adjustment-factor" | "vaf" => Ok(TrendMetric::ValueAdjustmentFactor),
            _ => Err(anyhow::anyhow!("unknown trend metric: {s}")),
        }
    }
}

/// The numeric outputs of one past estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    pub unadjusted_fp: u64,
    pub value_adjustment_factor: f64,
    pub adjusted_fp: f64,
    pub effort_hours: f64,
}

impl EstimateRecord {
    pub fn value(&self, metric: TrendMetric) -> f64 {
        match metric {
            TrendMetric::UnadjustedFp => self.unadjusted_fp as f64,
            TrendMetric::AdjustedFp => self.adjusted_fp,
            TrendMetric::EffortHours => self.effort_hours,
            TrendMetric::ValueAdjustmentFactor => self.value_adjustment_factor,
        }
    }
}

/// Extract one metric from each record as a snapshot series.
pub fn snapshots_for(records: &[EstimateRecord], metric: TrendMetric) -> Vec<EstimateSnapshot> {
    records
        .iter()
        .map(|r| EstimateSnapshot::new(r.timestamp, r.value(metric)))
        .collect()
}
