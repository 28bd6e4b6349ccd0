//! Input-validation errors raised by the estimation engine.

use crate::types::ComponentKind;

/// Errors returned synchronously for caller-correctable input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EstimationError {
    #[error("{kind} {axis} count must be non-negative, got {value}")]
    NegativeCount {
        kind: ComponentKind,
        axis: &'static str,
        value: i64,
    },

    #[error("influence vector must have exactly 14 entries, got {0}")]
    InfluenceVectorLength(usize),

    #[error("influence factor #{index} must be between 0 and 5, got {value}")]
    InfluenceOutOfRange { index: usize, value: i64 },

    #[error("unadjusted function points must be non-negative, got {0}")]
    NegativeFunctionPoints(i64),

    #[error("productivity factor must be a non-negative finite number, got {0}")]
    InvalidProductivityFactor(f64),

    #[error("at least {required} snapshots are required, got {actual}")]
    InsufficientSnapshots { required: usize, actual: usize },

    #[error("snapshot #{index} has a non-finite value")]
    NonFiniteSnapshot { index: usize },

    #[error("anomaly threshold must be a non-negative finite number, got {0}")]
    InvalidThreshold(f64),

    #[error("a forecast {periods} periods ahead is beyond the supported horizon")]
    ForecastHorizonOutOfRange { periods: u32 },

    #[error("{name} budget must be a non-negative finite number, got {value}")]
    InvalidBudget { name: &'static str, value: f64 },

    #[error("dual-perspective external query evaluation is disabled by configuration")]
    DualQueryRejected,
}
