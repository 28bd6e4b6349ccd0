use serde::{Deserialize, Serialize};

use crate::error::EstimationError;

/// Number of general system characteristics in an influence vector.
pub const INFLUENCE_FACTOR_COUNT: usize = 14;

/// Highest degree of influence a single characteristic may carry.
pub const MAX_DEGREE_OF_INFLUENCE: i64 = 5;

pub const MIN_VALUE_ADJUSTMENT_FACTOR: f64 = 0.65;
pub const MAX_VALUE_ADJUSTMENT_FACTOR: f64 = 1.35;

/// Value adjustment and effort derived from an unadjusted function point count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustedEstimate {
    pub value_adjustment_factor: f64,
    pub adjusted_fp: f64,
    pub effort_hours: f64,
}

/// Total degree of influence (0..=70) of a validated vector.
pub fn total_degree_of_influence(influence: &[i64]) -> Result<i64, EstimationError> {
    if influence.len() != INFLUENCE_FACTOR_COUNT {
        return Err(EstimationError::InfluenceVectorLength(influence.len()));
    }
    for (index, &value) in influence.iter().enumerate() {
        if !(0..=MAX_DEGREE_OF_INFLUENCE).contains(&value) {
            return Err(EstimationError::InfluenceOutOfRange { index, value });
        }
    }
    Ok(influence.iter().sum())
}

/// VAF = 0.65 + 0.01 * total degree of influence, always within [0.65, 1.35].
pub fn value_adjustment_factor(influence: &[i64]) -> Result<f64, EstimationError> {
    let total = total_degree_of_influence(influence)?;
    Ok(MIN_VALUE_ADJUSTMENT_FACTOR + 0.01 * total as f64)
}

/// Apply the value adjustment factor and productivity factor (hours per function
/// point) to a caller-summed unadjusted function point count.
pub fn compute_adjusted_estimate(
    unadjusted_fp: i64,
    influence: &[i64],
    productivity_factor: f64,
) -> Result<AdjustedEstimate, EstimationError> {
    if unadjusted_fp < 0 {
        return Err(EstimationError::NegativeFunctionPoints(unadjusted_fp));
    }
    if !productivity_factor.is_finite() || productivity_factor < 0.0 {
        return Err(EstimationError::InvalidProductivityFactor(productivity_factor));
    }

    let value_adjustment_factor = value_adjustment_factor(influence)?;
    let adjusted_fp = unadjusted_fp as f64 * value_adjustment_factor;
    let effort_hours = adjusted_fp * productivity_factor;

    Ok(AdjustedEstimate {
        value_adjustment_factor,
        adjusted_fp,
        effort_hours,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLE: [i64; 14] = [3, 4, 2, 3, 4, 3, 3, 3, 2, 4, 3, 3, 2, 0];

    #[test]
    fn test_sample_vector() {
        let estimate = compute_adjusted_estimate(100, &SAMPLE, 8.0).unwrap();
        assert!((estimate.value_adjustment_factor - 1.04).abs() < 1e-9);
        assert!((estimate.adjusted_fp - 104.0).abs() < 1e-9);
        assert!((estimate.effort_hours - 832.0).abs() < 1e-9);
    }

    #[test]
    fn test_vaf_follows_actual_sum() {
        // Sums to 43, so the factor is 1.08 rather than 1.04.
        let influence = [3, 4, 2, 3, 4, 3, 3, 3, 2, 4, 3, 3, 2, 4];
        assert_eq!(total_degree_of_influence(&influence).unwrap(), 43);
        let estimate = compute_adjusted_estimate(100, &influence, 8.0).unwrap();
        assert!((estimate.value_adjustment_factor - 1.08).abs() < 1e-9);
        assert!((estimate.adjusted_fp - 108.0).abs() < 1e-9);
    }

    #[test]
    fn test_vaf_bounds() {
        let min = value_adjustment_factor(&[0; 14]).unwrap();
        let max = value_adjustment_factor(&[5; 14]).unwrap();
        assert!((min - MIN_VALUE_ADJUSTMENT_FACTOR).abs() < 1e-9);
        assert!((max - MAX_VALUE_ADJUSTMENT_FACTOR).abs() < 1e-9);
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert_eq!(
            compute_adjusted_estimate(10, &[1; 13], 1.0),
            Err(EstimationError::InfluenceVectorLength(13))
        );
        assert_eq!(
            value_adjustment_factor(&[1; 15]),
            Err(EstimationError::InfluenceVectorLength(15))
        );
    }

    #[test]
    fn test_out_of_range_entry_rejected() {
        let mut vector = SAMPLE;
        vector[7] = 6;
        assert_eq!(
            compute_adjusted_estimate(10, &vector, 1.0),
            Err(EstimationError::InfluenceOutOfRange { index: 7, value: 6 })
        );
        vector[7] = -1;
        assert!(compute_adjusted_estimate(10, &vector, 1.0).is_err());
    }

    #[test]
    fn test_negative_inputs_rejected() {
        assert_eq!(
            compute_adjusted_estimate(-1, &SAMPLE, 1.0),
            Err(EstimationError::NegativeFunctionPoints(-1))
        );
        assert!(matches!(
            compute_adjusted_estimate(10, &SAMPLE, -0.5),
            Err(EstimationError::InvalidProductivityFactor(_))
        ));
        assert!(matches!(
            compute_adjusted_estimate(10, &SAMPLE, f64::NAN),
            Err(EstimationError::InvalidProductivityFactor(_))
        ));
    }

    #[test]
    fn test_zero_productivity_means_zero_effort() {
        let estimate = compute_adjusted_estimate(50, &SAMPLE, 0.0).unwrap();
        assert_eq!(estimate.effort_hours, 0.0);
    }

    proptest! {
        #[test]
        fn vaf_stays_in_bounds(vector in prop::array::uniform14(0i64..=5)) {
            let vaf = value_adjustment_factor(&vector).unwrap();
            prop_assert!(vaf >= MIN_VALUE_ADJUSTMENT_FACTOR - 1e-9);
            prop_assert!(vaf <= MAX_VALUE_ADJUSTMENT_FACTOR + 1e-9);
        }

        #[test]
        fn effort_scales_with_productivity(ufp in 0i64..10_000, hours in 0.0f64..40.0) {
            let e = compute_adjusted_estimate(ufp, &SAMPLE, hours).unwrap();
            prop_assert!((e.effort_hours - e.adjusted_fp * hours).abs() < 1e-6);
        }
    }
}
