use crate::domain::measurement::LengthUnit;

pub const CM_PER_INCH: f64 = 2.54;
pub const KG_PER_POUND: f64 = 0.453592;

pub fn inches_to_cm(inches: f64) -> f64 {
    inches * CM_PER_INCH
}

pub fn cm_to_inches(cm: f64) -> f64 {
    cm / CM_PER_INCH
}

pub fn pounds_to_kg(pounds: f64) -> f64 {
    pounds * KG_PER_POUND
}

pub fn kg_to_pounds(kg: f64) -> f64 {
    kg / KG_PER_POUND
}

impl LengthUnit {
    pub fn convert(self, value: f64, to: LengthUnit) -> f64 {
        match (self, to) {
            (Self::Centimeters, Self::Inches) => cm_to_inches(value),
            (Self::Inches, Self::Centimeters) => inches_to_cm(value),
            _ => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{cm_to_inches, inches_to_cm, kg_to_pounds, pounds_to_kg};
    use crate::domain::measurement::LengthUnit;

    #[test]
    fn imperial_values_survive_a_round_trip() {
        for inches in [28.0, 36.5, 47.25] {
            assert!((cm_to_inches(inches_to_cm(inches)) - inches).abs() < 0.01);
        }
        for pounds in [110.0, 165.5, 240.0] {
            assert!((kg_to_pounds(pounds_to_kg(pounds)) - pounds).abs() < 0.01);
        }
    }

    #[test]
    fn length_unit_conversion_is_identity_within_a_unit() {
        assert_eq!(LengthUnit::Inches.convert(36.0, LengthUnit::Inches), 36.0);
        assert!((LengthUnit::Inches.convert(36.0, LengthUnit::Centimeters) - 91.44).abs() < 1e-9);
        assert!((LengthUnit::Centimeters.convert(91.44, LengthUnit::Inches) - 36.0).abs() < 1e-9);
    }
}
