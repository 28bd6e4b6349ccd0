use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EstimationError;
use crate::types::{Classification, ComplexityLevel, ComponentKind};

/// An integer interval bucketing one axis into a complexity level.
/// `max == None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityRange {
    pub level: ComplexityLevel,
    pub min: u32,
    pub max: Option<u32>,
}

/// One axis table, expressed as two ascending cut points.
///
/// Values below `average_from` are Low, values below `high_from` are Average,
/// everything else is High, so the three ranges can neither overlap nor leave gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisTable {
    average_from: u32,
    high_from: u32,
}

impl AxisTable {
    const fn new(average_from: u32, high_from: u32) -> Self {
        assert!(average_from > 0 && average_from < high_from);
        Self {
            average_from,
            high_from,
        }
    }

    pub fn level(&self, count: u32) -> ComplexityLevel {
        if count < self.average_from {
            ComplexityLevel::Low
        } else if count < self.high_from {
            ComplexityLevel::Average
        } else {
            ComplexityLevel::High
        }
    }

    /// The three ranges this table covers, Low first.
    pub fn ranges(&self) -> [ComplexityRange; 3] {
        [
            ComplexityRange {
                level: ComplexityLevel::Low,
                min: 0,
                max: Some(self.average_from - 1),
            },
            ComplexityRange {
                level: ComplexityLevel::Average,
                min: self.average_from,
                max: Some(self.high_from - 1),
            },
            ComplexityRange {
                level: ComplexityLevel::High,
                min: self.high_from,
                max: None,
            },
        ]
    }
}

/// Function-point weights per complexity level for one component kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionPointTable {
    pub low: u32,
    pub average: u32,
    pub high: u32,
}

impl FunctionPointTable {
    pub fn weight(&self, level: ComplexityLevel) -> u32 {
        match level {
            ComplexityLevel::Low => self.low,
            ComplexityLevel::Average => self.average,
            ComplexityLevel::High => self.high,
        }
    }
}

// Record groups (RET) and data elements (DET) for data functions.
const DATA_RECORD_GROUPS: AxisTable = AxisTable::new(2, 6);
const DATA_ELEMENTS: AxisTable = AxisTable::new(20, 51);

// File references (FTR) and data elements for external inputs.
const INPUT_FILE_REFERENCES: AxisTable = AxisTable::new(2, 3);
const INPUT_DATA_ELEMENTS: AxisTable = AxisTable::new(5, 16);

// External outputs and queries share their axis tables.
const OUTPUT_FILE_REFERENCES: AxisTable = AxisTable::new(2, 4);
const OUTPUT_DATA_ELEMENTS: AxisTable = AxisTable::new(6, 20);

const ILF_POINTS: FunctionPointTable = FunctionPointTable {
    low: 7,
    average: 10,
    high: 15,
};
const EIF_POINTS: FunctionPointTable = FunctionPointTable {
    low: 5,
    average: 7,
    high: 10,
};
const EI_POINTS: FunctionPointTable = FunctionPointTable {
    low: 3,
    average: 4,
    high: 6,
};
const EO_POINTS: FunctionPointTable = FunctionPointTable {
    low: 4,
    average: 5,
    high: 7,
};
const EQ_POINTS: FunctionPointTable = FunctionPointTable {
    low: 3,
    average: 4,
    high: 6,
};

/// Axis tables for a kind: (reference axis, data-element axis).
pub fn axis_tables(kind: ComponentKind) -> (AxisTable, AxisTable) {
    match kind {
        ComponentKind::InternalDataStore | ComponentKind::ExternalDataReference => {
            (DATA_RECORD_GROUPS, DATA_ELEMENTS)
        }
        ComponentKind::ExternalInput => (INPUT_FILE_REFERENCES, INPUT_DATA_ELEMENTS),
        ComponentKind::ExternalOutput | ComponentKind::ExternalQuery => {
            (OUTPUT_FILE_REFERENCES, OUTPUT_DATA_ELEMENTS)
        }
    }
}

pub fn function_point_table(kind: ComponentKind) -> FunctionPointTable {
    match kind {
        ComponentKind::InternalDataStore => ILF_POINTS,
        ComponentKind::ExternalDataReference => EIF_POINTS,
        ComponentKind::ExternalInput => EI_POINTS,
        ComponentKind::ExternalOutput => EO_POINTS,
        ComponentKind::ExternalQuery => EQ_POINTS,
    }
}

/// Combine two per-axis levels into the component's level.
///
/// Weights are summed (Low=1, Average=2, High=3). Only the minimum sum (2) is Low
/// and only the maximum sum (6) is High; sums 3 to 5 are Average.
pub fn combine_levels(a: ComplexityLevel, b: ComplexityLevel) -> ComplexityLevel {
    let sum = a.weight() + b.weight();
    if sum <= 2 {
        ComplexityLevel::Low
    } else if sum <= 4 {
        ComplexityLevel::Average
    } else {
        ComplexityLevel::High
    }
}

fn checked_count(
    kind: ComponentKind,
    axis: &'static str,
    value: i64,
) -> Result<u32, EstimationError> {
    if value < 0 {
        return Err(EstimationError::NegativeCount { kind, axis, value });
    }
    // Counts beyond u32 are High on every axis anyway.
    Ok(u32::try_from(value).unwrap_or(u32::MAX))
}

/// Classify one component from its reference count (record groups or file
/// references, depending on `kind`) and its data-element count.
pub fn classify(
    kind: ComponentKind,
    references: i64,
    data_elements: i64,
) -> Result<Classification, EstimationError> {
    let references = checked_count(kind, kind.reference_axis_label(), references)?;
    let data_elements = checked_count(kind, "data elements", data_elements)?;

    let (reference_table, element_table) = axis_tables(kind);
    let level = combine_levels(
        reference_table.level(references),
        element_table.level(data_elements),
    );
    let function_points = function_point_table(kind).weight(level);

    Ok(Classification {
        level,
        function_points,
    })
}

/// How an external query described from both its input and output side is rated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DualQueryStrategy {
    /// Rate each side with the standard query rule and keep the heavier result.
    /// When both sides earn the same points the input side is kept.
    #[default]
    HigherSide,
    /// Refuse dual evaluation until the combination rule is settled.
    Reject,
}

impl std::str::FromStr for DualQueryStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "higher-side" | "higher" => Ok(DualQueryStrategy::HigherSide),
            "reject" => Ok(DualQueryStrategy::Reject),
            _ => Err(anyhow::anyhow!("unknown dual query strategy: {s}")),
        }
    }
}

/// Counts for one side of a dual-perspective external query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySide {
    pub file_references: i64,
    pub data_elements: i64,
}

/// Classify an external query from its input and output perspectives.
pub fn classify_dual_query(
    input: QuerySide,
    output: QuerySide,
    strategy: DualQueryStrategy,
) -> Result<Classification, EstimationError> {
    match strategy {
        DualQueryStrategy::Reject => Err(EstimationError::DualQueryRejected),
        DualQueryStrategy::HigherSide => {
            let input_side = classify(
                ComponentKind::ExternalQuery,
                input.file_references,
                input.data_elements,
            )?;
            let output_side = classify(
                ComponentKind::ExternalQuery,
                output.file_references,
                output.data_elements,
            )?;
            debug!(
                input = %input_side.level,
                output = %output_side.level,
                "dual query sides classified"
            );
            if output_side.function_points > input_side.function_points {
                Ok(output_side)
            } else {
                Ok(input_side)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use ComplexityLevel::*;

    #[test]
    fn test_combine_levels_truth_table() {
        assert_eq!(combine_levels(Low, Low), Low);

        assert_eq!(combine_levels(Low, Average), Average);
        assert_eq!(combine_levels(Average, Low), Average);
        assert_eq!(combine_levels(Average, Average), Average);
        assert_eq!(combine_levels(Low, High), Average);
        assert_eq!(combine_levels(High, Low), Average);

        // Sum of 5 is still Average
        assert_eq!(combine_levels(Average, High), Average);
        assert_eq!(combine_levels(High, Average), Average);

        assert_eq!(combine_levels(High, High), High);
    }

    #[test]
    fn test_internal_data_store_boundaries() {
        let low = classify(ComponentKind::InternalDataStore, 1, 10).unwrap();
        assert_eq!(low.level, Low);
        assert_eq!(low.function_points, 7);

        let average = classify(ComponentKind::InternalDataStore, 3, 25).unwrap();
        assert_eq!(average.level, Average);
        assert_eq!(average.function_points, 10);

        let high = classify(ComponentKind::InternalDataStore, 6, 55).unwrap();
        assert_eq!(high.level, High);
        assert_eq!(high.function_points, 15);
    }

    #[test]
    fn test_external_input_average() {
        let c = classify(ComponentKind::ExternalInput, 2, 10).unwrap();
        assert_eq!(c.level, Average);
        assert_eq!(c.function_points, 4);
    }

    #[test]
    fn test_same_counts_different_tables() {
        let ilf = classify(ComponentKind::InternalDataStore, 1, 10).unwrap();
        let eif = classify(ComponentKind::ExternalDataReference, 1, 10).unwrap();
        assert_eq!(ilf.level, eif.level);
        assert_eq!(eif.function_points, 5);

        let eo = classify(ComponentKind::ExternalOutput, 4, 20).unwrap();
        let eq = classify(ComponentKind::ExternalQuery, 4, 20).unwrap();
        assert_eq!(eo.level, High);
        assert_eq!(eq.level, High);
        assert_eq!(eo.function_points, 7);
        assert_eq!(eq.function_points, 6);
    }

    #[test]
    fn test_axis_edges() {
        assert_eq!(DATA_RECORD_GROUPS.level(1), Low);
        assert_eq!(DATA_RECORD_GROUPS.level(2), Average);
        assert_eq!(DATA_RECORD_GROUPS.level(5), Average);
        assert_eq!(DATA_RECORD_GROUPS.level(6), High);

        assert_eq!(DATA_ELEMENTS.level(19), Low);
        assert_eq!(DATA_ELEMENTS.level(20), Average);
        assert_eq!(DATA_ELEMENTS.level(50), Average);
        assert_eq!(DATA_ELEMENTS.level(51), High);

        assert_eq!(INPUT_FILE_REFERENCES.level(1), Low);
        assert_eq!(INPUT_FILE_REFERENCES.level(2), Average);
        assert_eq!(INPUT_FILE_REFERENCES.level(3), High);

        assert_eq!(OUTPUT_DATA_ELEMENTS.level(5), Low);
        assert_eq!(OUTPUT_DATA_ELEMENTS.level(6), Average);
        assert_eq!(OUTPUT_DATA_ELEMENTS.level(19), Average);
        assert_eq!(OUTPUT_DATA_ELEMENTS.level(20), High);
    }

    #[test]
    fn test_zero_counts_are_low() {
        for kind in ComponentKind::ALL {
            let c = classify(kind, 0, 0).unwrap();
            assert_eq!(c.level, Low, "{kind} with zero counts");
        }
    }

    #[test]
    fn test_negative_counts_rejected() {
        let err = classify(ComponentKind::ExternalInput, -1, 3).unwrap_err();
        assert_eq!(
            err,
            EstimationError::NegativeCount {
                kind: ComponentKind::ExternalInput,
                axis: "file references",
                value: -1,
            }
        );

        let err = classify(ComponentKind::InternalDataStore, 1, -4).unwrap_err();
        assert!(matches!(
            err,
            EstimationError::NegativeCount {
                axis: "data elements",
                value: -4,
                ..
            }
        ));
    }

    #[test]
    fn test_ranges_are_contiguous() {
        for kind in ComponentKind::ALL {
            let (a, b) = axis_tables(kind);
            for table in [a, b] {
                let [low, average, high] = table.ranges();
                assert_eq!(low.min, 0);
                assert_eq!(low.max.map(|m| m + 1), Some(average.min));
                assert_eq!(average.max.map(|m| m + 1), Some(high.min));
                assert_eq!(high.max, None);
            }
        }
    }

    #[test]
    fn test_dual_query_takes_heavier_side() {
        let input = QuerySide {
            file_references: 1,
            data_elements: 3,
        };
        let output = QuerySide {
            file_references: 5,
            data_elements: 25,
        };
        let c = classify_dual_query(input, output, DualQueryStrategy::HigherSide).unwrap();
        assert_eq!(c.level, High);
        assert_eq!(c.function_points, 6);

        // Order of sides does not matter
        let swapped = classify_dual_query(output, input, DualQueryStrategy::HigherSide).unwrap();
        assert_eq!(swapped, c);
    }

    #[test]
    fn test_dual_query_tie_keeps_input_rating() {
        let input = QuerySide {
            file_references: 2,
            data_elements: 3,
        };
        let output = QuerySide {
            file_references: 1,
            data_elements: 10,
        };
        let c = classify_dual_query(input, output, DualQueryStrategy::HigherSide).unwrap();
        assert_eq!(c, classify(ComponentKind::ExternalQuery, 2, 3).unwrap());
        assert_eq!(c.level, Average);
    }

    #[test]
    fn test_dual_query_reject_strategy() {
        let side = QuerySide {
            file_references: 1,
            data_elements: 1,
        };
        assert_eq!(
            classify_dual_query(side, side, DualQueryStrategy::Reject),
            Err(EstimationError::DualQueryRejected)
        );
    }

    #[test]
    fn test_dual_query_validates_both_sides() {
        let good = QuerySide {
            file_references: 1,
            data_elements: 1,
        };
        let bad = QuerySide {
            file_references: 1,
            data_elements: -2,
        };
        assert!(classify_dual_query(good, bad, DualQueryStrategy::HigherSide).is_err());
    }

    fn any_kind() -> impl Strategy<Value = ComponentKind> {
        prop::sample::select(ComponentKind::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn classification_is_pure(kind in any_kind(), a in 0i64..200, b in 0i64..200) {
            prop_assert_eq!(classify(kind, a, b).unwrap(), classify(kind, a, b).unwrap());
        }

        #[test]
        fn points_match_kind_table(kind in any_kind(), a in 0i64..200, b in 0i64..200) {
            let c = classify(kind, a, b).unwrap();
            prop_assert_eq!(c.function_points, function_point_table(kind).weight(c.level));
        }

        #[test]
        fn more_elements_never_lowers_level(kind in any_kind(), a in 0i64..50, b in 0i64..100, extra in 0i64..100) {
            let base = classify(kind, a, b).unwrap();
            let bigger = classify(kind, a, b + extra).unwrap();
            prop_assert!(bigger.level >= base.level);
        }
    }
}
