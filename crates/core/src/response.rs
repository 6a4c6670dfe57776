use serde::{Deserialize, Serialize};

use crate::fit::FitEvaluation;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintsBody {
    pub tummy_control_panels: bool,
    pub secure_shoulder_coverage: bool,
    pub full_coverage: bool,
}

/// Storefront-facing shape of a recommendation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendResponse {
    pub size: String,
    pub coverage: String,
    pub fit_notes: String,
    pub size_source: String,
    pub hints: HintsBody,
}

impl From<&FitEvaluation> for RecommendResponse {
    fn from(evaluation: &FitEvaluation) -> Self {
        Self {
            size: evaluation.size.label.as_str().to_string(),
            coverage: evaluation.coverage.style.as_str().to_string(),
            fit_notes: evaluation.fit_notes.clone(),
            size_source: evaluation.size.source.as_str().to_string(),
            hints: HintsBody {
                tummy_control_panels: evaluation.hints.tummy_control_panels,
                secure_shoulder_coverage: evaluation.hints.secure_shoulder_coverage,
                full_coverage: evaluation.hints.full_coverage,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::RecommendResponse;
    use crate::domain::request::FitRequest;
    use crate::fit::{DeterministicFitRuntime, FitRuntime};

    #[test]
    fn response_uses_storefront_field_names() {
        let request = FitRequest::from_json(&json!({ "tummy_control": true })).expect("object");
        let evaluation = DeterministicFitRuntime::default().evaluate(&request);

        let value = serde_json::to_value(RecommendResponse::from(&evaluation)).expect("serialize");

        assert_eq!(value["size"], "M");
        assert_eq!(value["sizeSource"], "default");
        assert_eq!(value["coverage"], "knee length");
        assert_eq!(value["hints"]["tummyControlPanels"], true);
        assert!(value["fitNotes"].as_str().is_some_and(|notes| notes.contains("tummy-control")));
    }
}
