use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::measurement::{MeasurementInput, UnitSystem};
use crate::domain::preference::{Activity, FitPreferences, Modesty, StylePreference};
use crate::errors::DomainError;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductContext {
    pub handle: Option<String>,
    pub title: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FitRequest {
    pub measurements: MeasurementInput,
    pub preferences: FitPreferences,
    pub product: ProductContext,
}

impl FitRequest {
    /// Builds a request from a loosely typed payload. Only a non-object payload is
    /// rejected; fields of the wrong type are read as absent.
    pub fn from_json(payload: &Value) -> Result<Self, DomainError> {
        let object = payload.as_object().ok_or_else(|| {
            DomainError::MalformedRequest("request body must be a JSON object".to_string())
        })?;

        let measurements = MeasurementInput {
            unit: string_field(object, "unit").and_then(|value| UnitSystem::parse_lenient(&value)),
            height_cm: measurement_field(object, "height_cm"),
            weight_kg: measurement_field(object, "weight_kg"),
            bust_in: measurement_field(object, "bust_in"),
            waist_in: measurement_field(object, "waist_in"),
            hip_in: measurement_field(object, "hip_in"),
            height: measurement_field(object, "height"),
            weight: measurement_field(object, "weight"),
            bust: measurement_field(object, "bust"),
            waist: measurement_field(object, "waist"),
            hip: measurement_field(object, "hip"),
            bra: string_field(object, "bra"),
        };

        let preferences = FitPreferences {
            activity: string_field(object, "activity")
                .and_then(|value| Activity::parse_lenient(&value)),
            modesty: string_field(object, "modesty")
                .and_then(|value| Modesty::parse_lenient(&value)),
            tummy_control: bool_field(object, "tummy_control"),
            style_preference: string_field(object, "style_preference")
                .and_then(|value| StylePreference::parse_lenient(&value)),
        };

        let product = ProductContext {
            handle: string_field(object, "product_handle"),
            title: string_field(object, "product_title"),
        };

        Ok(Self { measurements, preferences, product })
    }
}

/// Positive finite numbers only. Zero counts as "not provided", matching how the
/// storefront form submits empty inputs.
fn measurement_field(object: &Map<String, Value>, key: &str) -> Option<f64> {
    let value = match object.get(key)? {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    (value.is_finite() && value > 0.0).then_some(value)
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        _ => None,
    }
}

fn bool_field(object: &Map<String, Value>, key: &str) -> bool {
    match object.get(key) {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => {
            matches!(text.trim().to_ascii_lowercase().as_str(), "true" | "on" | "yes" | "1")
        }
        Some(Value::Number(number)) => number.as_f64().map(|value| value != 0.0).unwrap_or(false),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::FitRequest;
    use crate::domain::measurement::UnitSystem;
    use crate::domain::preference::{Activity, Modesty, StylePreference};
    use crate::errors::DomainError;

    #[test]
    fn reads_every_documented_field() {
        let request = FitRequest::from_json(&json!({
            "unit": "imperial",
            "height": 65,
            "weight": 140,
            "bust": 36,
            "waist_in": 30,
            "hip_in": 40.5,
            "bra": "36C",
            "activity": "swim_class",
            "modesty": "medium",
            "tummy_control": true,
            "style_preference": "rashguard",
            "product_handle": "lagoon-burkini",
            "product_title": "Lagoon Burkini"
        }))
        .expect("object payload");

        assert_eq!(request.measurements.unit, Some(UnitSystem::Imperial));
        assert_eq!(request.measurements.height, Some(65.0));
        assert_eq!(request.measurements.hip_in, Some(40.5));
        assert_eq!(request.measurements.bra.as_deref(), Some("36C"));
        assert_eq!(request.preferences.activity, Some(Activity::SwimClass));
        assert_eq!(request.preferences.modesty, Some(Modesty::Medium));
        assert!(request.preferences.tummy_control);
        assert_eq!(request.preferences.style_preference, Some(StylePreference::Rashguard));
        assert_eq!(request.product.handle.as_deref(), Some("lagoon-burkini"));
    }

    #[test]
    fn wrong_types_and_zero_read_as_absent() {
        let request = FitRequest::from_json(&json!({
            "bust_in": "not a number",
            "waist_in": 0,
            "hip_in": -3,
            "height_cm": [170],
            "weight_kg": "62.5",
            "bra": 36,
            "activity": "parasailing",
            "tummy_control": "nope"
        }))
        .expect("object payload");

        assert_eq!(request.measurements.bust_in, None);
        assert_eq!(request.measurements.waist_in, None);
        assert_eq!(request.measurements.hip_in, None);
        assert_eq!(request.measurements.height_cm, None);
        assert_eq!(request.measurements.weight_kg, Some(62.5));
        assert_eq!(request.measurements.bra, None);
        assert_eq!(request.preferences.activity, None);
        assert!(!request.preferences.tummy_control);
    }

    #[test]
    fn form_style_checkbox_values_enable_tummy_control() {
        for value in [json!("on"), json!("TRUE"), json!(1)] {
            let request =
                FitRequest::from_json(&json!({ "tummy_control": value })).expect("object payload");
            assert!(request.preferences.tummy_control);
        }
    }

    #[test]
    fn non_object_payload_is_malformed() {
        let error = FitRequest::from_json(&json!(["bust", 90])).expect_err("array is rejected");
        assert!(matches!(error, DomainError::MalformedRequest(_)));
    }
}
