use serde::{Deserialize, Serialize};
use std::fmt;

/// Complexity rating of a single component.
/// Ordered from simplest (Low) to most complex (High).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    Low,
    Average,
    High,
}

impl ComplexityLevel {
    pub const ALL: [ComplexityLevel; 3] = [
        ComplexityLevel::Low,
        ComplexityLevel::Average,
        ComplexityLevel::High,
    ];

    /// Numeric weight used when combining two axis levels: 1, 2 or 3.
    pub fn weight(&self) -> u8 {
        match self {
            ComplexityLevel::Low => 1,
            ComplexityLevel::Average => 2,
            ComplexityLevel::High => 3,
        }
    }
}

impl fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplexityLevel::Low => write!(f, "low"),
            ComplexityLevel::Average => write!(f, "average"),
            ComplexityLevel::High => write!(f, "high"),
        }
    }
}

/// The five standardized function types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentKind {
    /// ILF: a logical data group maintained inside the application.
    #[serde(alias = "ilf")]
    InternalDataStore,
    /// EIF: a logical data group referenced but maintained elsewhere.
    #[serde(alias = "eif")]
    ExternalDataReference,
    /// EI
    #[serde(alias = "ei")]
    ExternalInput,
    /// EO
    #[serde(alias = "eo")]
    ExternalOutput,
    /// EQ
    #[serde(alias = "eq")]
    ExternalQuery,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 5] = [
        ComponentKind::InternalDataStore,
        ComponentKind::ExternalDataReference,
        ComponentKind::ExternalInput,
        ComponentKind::ExternalOutput,
        ComponentKind::ExternalQuery,
    ];

    /// Classic FPA abbreviation (ILF, EIF, EI, EO, EQ).
    pub fn abbreviation(&self) -> &'static str {
        match self {
            ComponentKind::InternalDataStore => "ILF",
            ComponentKind::ExternalDataReference => "EIF",
            ComponentKind::ExternalInput => "EI",
            ComponentKind::ExternalOutput => "EO",
            ComponentKind::ExternalQuery => "EQ",
        }
    }

    /// Data functions count record groups on their first axis;
    /// transactional functions count file references.
    pub fn is_data_function(&self) -> bool {
        matches!(
            self,
            ComponentKind::InternalDataStore | ComponentKind::ExternalDataReference
        )
    }

    /// Label of the first classification axis.
    pub fn reference_axis_label(&self) -> &'static str {
        if self.is_data_function() {
            "record groups"
        } else {
            "file references"
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::InternalDataStore => write!(f, "internal-data-store"),
            ComponentKind::ExternalDataReference => write!(f, "external-data-reference"),
            ComponentKind::ExternalInput => write!(f, "external-input"),
            ComponentKind::ExternalOutput => write!(f, "external-output"),
            ComponentKind::ExternalQuery => write!(f, "external-query"),
        }
    }
}

impl std::str::FromStr for ComponentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ilf" | "internal-data-store" => Ok(ComponentKind::InternalDataStore),
            "eif" | "external-data-reference" => Ok(ComponentKind::ExternalDataReference),
            "ei" | "external-input" => Ok(ComponentKind::ExternalInput),
            "eo" | "external-output" => Ok(ComponentKind::ExternalOutput),
            "eq" | "external-query" => Ok(ComponentKind::ExternalQuery),
            _ => Err(anyhow::anyhow!("unknown component kind: {s}")),
        }
    }
}

/// Outcome of classifying one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub level: ComplexityLevel,
    pub function_points: u32,
}

/// The 14 general system characteristics whose degrees of influence
/// make up the value adjustment factor, in their canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneralSystemCharacteristic {
    DataCommunications,
    DistributedDataProcessing,
    Performance,
    HeavilyUsedConfiguration,
    TransactionRate,
    OnlineDataEntry,
    EndUserEfficiency,
    OnlineUpdate,
    ComplexProcessing,
    Reusability,
    InstallationEase,
    OperationalEase,
    MultipleSites,
    FacilitateChange,
}

impl GeneralSystemCharacteristic {
    pub const ALL: [GeneralSystemCharacteristic; 14] = [
        GeneralSystemCharacteristic::DataCommunications,
        GeneralSystemCharacteristic::DistributedDataProcessing,
        GeneralSystemCharacteristic::Performance,
        GeneralSystemCharacteristic::HeavilyUsedConfiguration,
        GeneralSystemCharacteristic::TransactionRate,
        GeneralSystemCharacteristic::OnlineDataEntry,
        GeneralSystemCharacteristic::EndUserEfficiency,
        GeneralSystemCharacteristic::OnlineUpdate,
        GeneralSystemCharacteristic::ComplexProcessing,
        GeneralSystemCharacteristic::Reusability,
        GeneralSystemCharacteristic::InstallationEase,
        GeneralSystemCharacteristic::OperationalEase,
        GeneralSystemCharacteristic::MultipleSites,
        GeneralSystemCharacteristic::FacilitateChange,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            GeneralSystemCharacteristic::DataCommunications => "Data communications",
            GeneralSystemCharacteristic::DistributedDataProcessing => {
                "Distributed data processing"
            }
            GeneralSystemCharacteristic::Performance => "Performance",
            GeneralSystemCharacteristic::HeavilyUsedConfiguration => "Heavily used configuration",
            GeneralSystemCharacteristic::TransactionRate => "Transaction rate",
            GeneralSystemCharacteristic::OnlineDataEntry => "Online data entry",
            GeneralSystemCharacteristic::EndUserEfficiency => "End-user efficiency",
            GeneralSystemCharacteristic::OnlineUpdate => "Online update",
            GeneralSystemCharacteristic::ComplexProcessing => "Complex processing",
            GeneralSystemCharacteristic::Reusability => "Reusability",
            GeneralSystemCharacteristic::InstallationEase => "Installation ease",
            GeneralSystemCharacteristic::OperationalEase => "Operational ease",
            GeneralSystemCharacteristic::MultipleSites => "Multiple sites",
            GeneralSystemCharacteristic::FacilitateChange => "Facilitate change",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complexity_ordering() {
        assert!(ComplexityLevel::Low < ComplexityLevel::Average);
        assert!(ComplexityLevel::Average < ComplexityLevel::High);
    }

    #[test]
    fn test_complexity_weights() {
        assert_eq!(ComplexityLevel::Low.weight(), 1);
        assert_eq!(ComplexityLevel::Average.weight(), 2);
        assert_eq!(ComplexityLevel::High.weight(), 3);
    }

    #[test]
    fn test_component_kind_parse() {
        assert_eq!(
            "ilf".parse::<ComponentKind>().unwrap(),
            ComponentKind::InternalDataStore
        );
        assert_eq!(
            "EQ".parse::<ComponentKind>().unwrap(),
            ComponentKind::ExternalQuery
        );
        assert_eq!(
            "external-output".parse::<ComponentKind>().unwrap(),
            ComponentKind::ExternalOutput
        );
        assert!("report".parse::<ComponentKind>().is_err());
    }

    #[test]
    fn test_component_kind_display_round_trips_through_parse() {
        for kind in ComponentKind::ALL {
            assert_eq!(kind.to_string().parse::<ComponentKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_kind_serde_is_kebab_case() {
        let json = serde_json::to_string(&ComponentKind::ExternalDataReference).unwrap();
        assert_eq!(json, "\"external-data-reference\"");
        let kind: ComponentKind = serde_json::from_str("\"eif\"").unwrap();
        assert_eq!(kind, ComponentKind::ExternalDataReference);
    }

    #[test]
    fn test_fourteen_characteristics() {
        assert_eq!(GeneralSystemCharacteristic::ALL.len(), 14);
        assert_eq!(
            GeneralSystemCharacteristic::ALL[13],
            GeneralSystemCharacteristic::FacilitateChange
        );
    }
}
