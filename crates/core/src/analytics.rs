use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::request::FitRequest;
use crate::fit::FitEvaluation;

/// One recommendation as persisted for merchandising analysis. Flat on purpose so
/// it maps onto a single table row in every backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsRecord {
    pub id: String,
    pub correlation_id: String,
    pub recorded_at: DateTime<Utc>,
    pub unit_system: String,
    pub length_unit: String,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub bust: Option<f64>,
    pub waist: Option<f64>,
    pub hip: Option<f64>,
    pub bra_raw: Option<String>,
    pub bra_band: Option<u8>,
    pub bra_cup: Option<String>,
    pub activity: Option<String>,
    pub modesty: Option<String>,
    pub tummy_control: bool,
    pub style_preference: Option<String>,
    pub product_handle: Option<String>,
    pub product_title: Option<String>,
    pub size: String,
    pub size_source: String,
    pub coverage: String,
    pub fit_notes: String,
}

impl AnalyticsRecord {
    pub fn from_evaluation(
        request: &FitRequest,
        evaluation: &FitEvaluation,
        correlation_id: impl Into<String>,
    ) -> Self {
        let measurements = &evaluation.measurements;
        let preferences = &request.preferences;

        Self {
            id: Uuid::new_v4().to_string(),
            correlation_id: correlation_id.into(),
            recorded_at: Utc::now(),
            unit_system: measurements.unit_system.as_str().to_string(),
            length_unit: measurements.length_unit.as_str().to_string(),
            height_cm: measurements.height_cm,
            weight_kg: measurements.weight_kg,
            bust: measurements.bust,
            waist: measurements.waist,
            hip: measurements.hip,
            bra_raw: request.measurements.bra.clone(),
            bra_band: measurements.bra.as_ref().map(|bra| bra.band),
            bra_cup: measurements.bra.as_ref().map(|bra| bra.cup.clone()),
            activity: preferences.activity.map(|value| value.as_str().to_string()),
            modesty: preferences.modesty.map(|value| value.as_str().to_string()),
            tummy_control: preferences.tummy_control,
            style_preference: preferences.style_preference.map(|value| value.as_str().to_string()),
            product_handle: request.product.handle.clone(),
            product_title: request.product.title.clone(),
            size: evaluation.size.label.as_str().to_string(),
            size_source: evaluation.size.source.as_str().to_string(),
            coverage: evaluation.coverage.style.as_str().to_string(),
            fit_notes: evaluation.fit_notes.clone(),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("analytics storage failure: {0}")]
    Storage(String),
    #[error("analytics backend unavailable: {0}")]
    Unavailable(String),
    #[error("analytics backend rejected record with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("analytics record could not be encoded: {0}")]
    Encode(String),
}

#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    /// Short backend name used in logs and diagnostics.
    fn backend(&self) -> &'static str;

    async fn record(&self, record: &AnalyticsRecord) -> Result<(), AnalyticsError>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::AnalyticsRecord;
    use crate::domain::request::FitRequest;
    use crate::fit::{DeterministicFitRuntime, FitRuntime};

    #[test]
    fn record_flattens_request_and_evaluation() {
        let request = FitRequest::from_json(&json!({
            "bra": "36C",
            "height_cm": 170,
            "weight_kg": 72,
            "activity": "swim_class",
            "modesty": "medium",
            "product_handle": "aqua-dress",
            "product_title": "Aqua Dress"
        }))
        .expect("object payload");
        let evaluation = DeterministicFitRuntime::default().evaluate(&request);

        let record = AnalyticsRecord::from_evaluation(&request, &evaluation, "req-77");

        assert_eq!(record.correlation_id, "req-77");
        assert_eq!(record.bra_raw.as_deref(), Some("36C"));
        assert_eq!(record.bra_band, Some(36));
        assert_eq!(record.bra_cup.as_deref(), Some("C"));
        assert_eq!(record.activity.as_deref(), Some("swim_class"));
        assert_eq!(record.modesty.as_deref(), Some("medium"));
        assert_eq!(record.size, "XL");
        assert_eq!(record.size_source, "chart");
        assert_eq!(record.coverage, "knee length");
        assert_eq!(record.product_handle.as_deref(), Some("aqua-dress"));
        assert_eq!(record.unit_system, "metric");
        assert_eq!(record.length_unit, "cm");
        assert!(!record.id.is_empty());
    }

    #[test]
    fn each_record_gets_a_fresh_id() {
        let request = FitRequest::default();
        let evaluation = DeterministicFitRuntime::default().evaluate(&request);

        let first = AnalyticsRecord::from_evaluation(&request, &evaluation, "req-1");
        let second = AnalyticsRecord::from_evaluation(&request, &evaluation, "req-1");

        assert_ne!(first.id, second.id);
        assert_eq!(first.size, "M");
        assert_eq!(first.size_source, "default");
    }
}
