pub mod classifier;
pub mod config;
pub mod error;
pub mod estimate;
pub mod pipeline;
pub mod trend;
pub mod types;

pub use classifier::{classify, classify_dual_query, DualQueryStrategy, QuerySide};
pub use config::Config;
pub use error::EstimationError;
pub use estimate::{compute_adjusted_estimate, AdjustedEstimate};
pub use pipeline::{EstimateInput, EstimateReport, EstimationPipeline, TrendReport};
pub use trend::{
    analyze_trend, detect_anomalies, forecast_values, EstimateRecord, EstimateSnapshot,
    TrendAnalysis, TrendMetric,
};
pub use types::*;
