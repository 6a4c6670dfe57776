pub mod advice;
pub mod bra;
pub mod chart;
pub mod coverage;
pub mod normalize;
pub mod size;
pub mod units;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::domain::measurement::NormalizedMeasurements;
use crate::domain::request::FitRequest;

use self::{
    advice::{compose_fit_notes, FitHints},
    chart::{ChartError, SizeChart},
    coverage::{CoverageDecision, CoverageEngine, RuleCascadeCoverageEngine},
    normalize::MeasurementNormalizer,
    size::{ChartSizeEngine, SizeDecision, SizeEngine},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitEvaluation {
    pub measurements: NormalizedMeasurements,
    pub size: SizeDecision,
    pub coverage: CoverageDecision,
    pub hints: FitHints,
    pub fit_notes: String,
}

pub trait FitRuntime: Send + Sync {
    fn evaluate(&self, request: &FitRequest) -> FitEvaluation;
}

pub struct DeterministicFitRuntime<S, C> {
    normalizer: MeasurementNormalizer,
    size_engine: S,
    coverage_engine: C,
}

impl<S, C> DeterministicFitRuntime<S, C> {
    pub fn new(normalizer: MeasurementNormalizer, size_engine: S, coverage_engine: C) -> Self {
        Self { normalizer, size_engine, coverage_engine }
    }
}

impl Default for DeterministicFitRuntime<ChartSizeEngine, RuleCascadeCoverageEngine> {
    fn default() -> Self {
        Self::new(
            MeasurementNormalizer::default(),
            ChartSizeEngine::default(),
            RuleCascadeCoverageEngine::default(),
        )
    }
}

impl<S, C> FitRuntime for DeterministicFitRuntime<S, C>
where
    S: SizeEngine,
    C: CoverageEngine,
{
    fn evaluate(&self, request: &FitRequest) -> FitEvaluation {
        let measurements = self.normalizer.normalize(&request.measurements);
        let size = self.size_engine.select(&measurements);
        let coverage = self.coverage_engine.decide(&request.preferences);
        let hints = FitHints::derive(&request.preferences, coverage.style);
        let fit_notes = compose_fit_notes(size.label, coverage.style, &hints);

        FitEvaluation { measurements, size, coverage, hints, fit_notes }
    }
}

/// Loads the configured chart (or the built-in one), converts it to the configured
/// length unit and wires the standard engines around it.
pub fn build_runtime(
    config: &EngineConfig,
) -> Result<DeterministicFitRuntime<ChartSizeEngine, RuleCascadeCoverageEngine>, ChartError> {
    let chart = match &config.size_chart_path {
        Some(path) => SizeChart::load(path)?,
        None => SizeChart::default(),
    };
    let chart = chart.converted_to(config.length_unit);

    Ok(DeterministicFitRuntime::new(
        MeasurementNormalizer::new(config.length_unit, config.default_unit_system),
        ChartSizeEngine::new(Arc::new(chart)),
        RuleCascadeCoverageEngine::default(),
    ))
}
