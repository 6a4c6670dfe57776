use serde::{Deserialize, Serialize};

use crate::fit::bra::BraSize;

/// Unit system used to interpret the legacy `height`/`weight`/`bust`/`waist`/`hip` fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }

    /// Lenient parse used for request payloads; unknown values are `None`.
    pub fn parse_lenient(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "metric" => Some(Self::Metric),
            "imperial" => Some(Self::Imperial),
            _ => None,
        }
    }

    pub fn length_unit(self) -> LengthUnit {
        match self {
            Self::Metric => LengthUnit::Centimeters,
            Self::Imperial => LengthUnit::Inches,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LengthUnit {
    #[default]
    #[serde(rename = "cm")]
    Centimeters,
    #[serde(rename = "in")]
    Inches,
}

impl LengthUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Centimeters => "cm",
            Self::Inches => "in",
        }
    }
}

/// Raw measurements as supplied by the shopper. Current fields carry their unit in
/// the name; legacy fields are interpreted through `unit`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementInput {
    pub unit: Option<UnitSystem>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub bust_in: Option<f64>,
    pub waist_in: Option<f64>,
    pub hip_in: Option<f64>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub bust: Option<f64>,
    pub waist: Option<f64>,
    pub hip: Option<f64>,
    pub bra: Option<String>,
}

/// Measurements in one canonical unit per axis: bust/waist/hip in `length_unit`
/// (the size chart's unit), height in centimeters, weight in kilograms.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMeasurements {
    pub unit_system: UnitSystem,
    pub length_unit: LengthUnit,
    pub bust: Option<f64>,
    pub waist: Option<f64>,
    pub hip: Option<f64>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub bra: Option<BraSize>,
    pub bust_from_bra: bool,
}

impl NormalizedMeasurements {
    pub fn has_body_measurements(&self) -> bool {
        self.bust.is_some() || self.waist.is_some() || self.hip.is_some()
    }
}
