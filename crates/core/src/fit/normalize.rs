use crate::domain::measurement::{
    LengthUnit, MeasurementInput, NormalizedMeasurements, UnitSystem,
};
use crate::fit::bra::BraSize;
use crate::fit::units::{inches_to_cm, pounds_to_kg};

/// Converts raw measurements into the chart's length unit plus cm/kg.
///
/// Current fields (`bust_in`, `height_cm`, ...) always win. Legacy fields only fill
/// gaps and are read through the request's unit system. A parsed bra size is the
/// last resort for bust.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeasurementNormalizer {
    length_unit: LengthUnit,
    default_unit_system: UnitSystem,
}

impl MeasurementNormalizer {
    pub fn new(length_unit: LengthUnit, default_unit_system: UnitSystem) -> Self {
        Self { length_unit, default_unit_system }
    }

    pub fn length_unit(&self) -> LengthUnit {
        self.length_unit
    }

    pub fn normalize(&self, input: &MeasurementInput) -> NormalizedMeasurements {
        let unit_system = input.unit.unwrap_or(self.default_unit_system);
        let legacy_length_unit = unit_system.length_unit();

        let girth = |current_inches: Option<f64>, legacy: Option<f64>| -> Option<f64> {
            present(current_inches)
                .map(|inches| LengthUnit::Inches.convert(inches, self.length_unit))
                .or_else(|| {
                    present(legacy)
                        .map(|value| legacy_length_unit.convert(value, self.length_unit))
                })
        };

        let bra = input.bra.as_deref().and_then(BraSize::parse);
        let mut bust = girth(input.bust_in, input.bust);
        let mut bust_from_bra = false;
        if bust.is_none() {
            if let Some(bra) = &bra {
                bust = Some(LengthUnit::Centimeters.convert(bra.estimated_bust_cm(), self.length_unit));
                bust_from_bra = true;
            }
        }

        NormalizedMeasurements {
            unit_system,
            length_unit: self.length_unit,
            bust,
            waist: girth(input.waist_in, input.waist),
            hip: girth(input.hip_in, input.hip),
            height_cm: present(input.height_cm)
                .or_else(|| present(input.height).map(|value| legacy_height_cm(value, unit_system))),
            weight_kg: present(input.weight_kg)
                .or_else(|| present(input.weight).map(|value| legacy_weight_kg(value, unit_system))),
            bra,
            bust_from_bra,
        }
    }
}

fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|value| value.is_finite() && *value > 0.0)
}

fn legacy_height_cm(value: f64, unit_system: UnitSystem) -> f64 {
    match unit_system {
        UnitSystem::Metric => value,
        UnitSystem::Imperial => inches_to_cm(value).round(),
    }
}

fn legacy_weight_kg(value: f64, unit_system: UnitSystem) -> f64 {
    match unit_system {
        UnitSystem::Metric => value,
        UnitSystem::Imperial => pounds_to_kg(value).round(),
    }
}
