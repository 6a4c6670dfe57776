use std::sync::Arc;

use tracing::{info, warn};

use crate::analytics::{AnalyticsRecord, AnalyticsSink};
use crate::domain::request::FitRequest;
use crate::fit::{FitEvaluation, FitRuntime};

/// Runs the deterministic engines and hands the result to the analytics sink.
/// A failed analytics write never changes the recommendation.
#[derive(Clone)]
pub struct FitAdvisor {
    runtime: Arc<dyn FitRuntime>,
    analytics: Option<Arc<dyn AnalyticsSink>>,
}

impl FitAdvisor {
    pub fn new(runtime: Arc<dyn FitRuntime>) -> Self {
        Self { runtime, analytics: None }
    }

    pub fn with_analytics(mut self, sink: Arc<dyn AnalyticsSink>) -> Self {
        self.analytics = Some(sink);
        self
    }

    pub fn analytics_backend(&self) -> &'static str {
        self.analytics.as_ref().map(|sink| sink.backend()).unwrap_or("disabled")
    }

    pub fn evaluate(&self, request: &FitRequest) -> FitEvaluation {
        self.runtime.evaluate(request)
    }

    pub async fn recommend(&self, request: &FitRequest, correlation_id: &str) -> FitEvaluation {
        let evaluation = self.runtime.evaluate(request);

        info!(
            event_name = "fit.recommendation.computed",
            correlation_id,
            size = evaluation.size.label.as_str(),
            size_source = evaluation.size.source.as_str(),
            coverage = evaluation.coverage.style.as_str(),
            coverage_rule = %evaluation.coverage.rule_id,
            "fit recommendation computed"
        );

        if let Some(sink) = &self.analytics {
            let record = AnalyticsRecord::from_evaluation(request, &evaluation, correlation_id);
            if let Err(error) = sink.record(&record).await {
                warn!(
                    event_name = "fit.analytics.write_failed",
                    correlation_id,
                    backend = sink.backend(),
                    error = %error,
                    "analytics write failed; recommendation returned unchanged"
                );
            }
        }

        evaluation
    }
}
