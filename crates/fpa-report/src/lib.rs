//! Renderers for estimate and trend reports: colored terminal text, JSON and Markdown.

pub mod json;
pub mod markdown;
pub mod text;

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{Duration, TimeZone, Utc};

    use fpa_core::config::Config;
    use fpa_core::pipeline::{
        ComponentInput, EstimateInput, EstimateReport, EstimationPipeline, InfluenceFactors,
        TrendReport,
    };
    use fpa_core::trend::{self, EstimateSnapshot, TrendMetric};
    use fpa_core::types::ComponentKind;

    fn component(
        name: &str,
        kind: ComponentKind,
        references: i64,
        data_elements: i64,
    ) -> ComponentInput {
        ComponentInput {
            name: name.to_string(),
            kind,
            references,
            data_elements,
            output_side: None,
        }
    }

    /// 40 unadjusted FP, VAF 1.04, 8 hours per FP.
    pub fn sample_estimate() -> EstimateReport {
        let input = EstimateInput {
            project: "billing".to_string(),
            productivity_factor: None,
            influence: InfluenceFactors::Vector(vec![3, 4, 2, 3, 4, 3, 3, 3, 2, 4, 3, 3, 2, 0]),
            components: vec![
                component("Customer", ComponentKind::InternalDataStore, 1, 10),
                component("Invoice", ComponentKind::InternalDataStore, 3, 25),
                component("Tax rates", ComponentKind::ExternalDataReference, 1, 5),
                component("Create invoice", ComponentKind::ExternalInput, 2, 10),
                component("Update invoice", ComponentKind::ExternalInput, 2, 10),
                component("Statement", ComponentKind::ExternalOutput, 4, 22),
                component("Invoice lookup", ComponentKind::ExternalQuery, 1, 4),
            ],
        };
        EstimationPipeline::new(Config::default())
            .estimate(&input)
            .expect("sample estimate is valid")
    }

    /// Weekly increasing series with one spike.
    pub fn sample_trend() -> TrendReport {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let snapshots: Vec<EstimateSnapshot> = [100.0, 102.0, 104.0, 180.0, 108.0, 110.0, 130.0]
            .iter()
            .enumerate()
            .map(|(i, &v)| EstimateSnapshot::new(start + Duration::days(7 * i as i64), v))
            .collect();

        TrendReport {
            metric: TrendMetric::AdjustedFp,
            analysis: trend::analyze_trend(&snapshots, 1).unwrap(),
            forecast: trend::forecast_values(&snapshots, 2).unwrap(),
            anomaly_threshold: 1.5,
            anomalies: trend::detect_anomalies(&snapshots, 1.5).unwrap(),
        }
    }
}
