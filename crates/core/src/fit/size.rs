use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::measurement::NormalizedMeasurements;
use crate::domain::size::{SizeLabel, SizeSource};
use crate::fit::chart::SizeChart;

pub const DEFAULT_SIZE: SizeLabel = SizeLabel::M;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartMatch {
    pub label: SizeLabel,
    pub score: u8,
    pub distance: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SizeDecision {
    pub label: SizeLabel,
    pub source: SizeSource,
    pub chart_match: Option<ChartMatch>,
    pub body_mass_index: Option<f64>,
}

pub trait SizeEngine: Send + Sync {
    fn select(&self, measurements: &NormalizedMeasurements) -> SizeDecision;
}

pub struct ChartSizeEngine {
    chart: Arc<SizeChart>,
}

impl ChartSizeEngine {
    pub fn new(chart: Arc<SizeChart>) -> Self {
        Self { chart }
    }

    pub fn chart(&self) -> &SizeChart {
        &self.chart
    }
}

impl Default for ChartSizeEngine {
    fn default() -> Self {
        Self::new(Arc::new(SizeChart::default()))
    }
}

impl SizeEngine for ChartSizeEngine {
    fn select(&self, measurements: &NormalizedMeasurements) -> SizeDecision {
        select_size(&self.chart, measurements)
    }
}

/// Chart lookup first, then the BMI heuristic, then [`DEFAULT_SIZE`].
pub fn select_size(chart: &SizeChart, measurements: &NormalizedMeasurements) -> SizeDecision {
    if let Some(chart_match) =
        pick_from_chart(chart, measurements.bust, measurements.waist, measurements.hip)
    {
        return SizeDecision {
            label: chart_match.label,
            source: SizeSource::Chart,
            chart_match: Some(chart_match),
            body_mass_index: None,
        };
    }

    let bmi = measurements
        .height_cm
        .zip(measurements.weight_kg)
        .and_then(|(height_cm, weight_kg)| body_mass_index(height_cm, weight_kg));
    if let Some(bmi) = bmi {
        return SizeDecision {
            label: size_for_bmi(bmi),
            source: SizeSource::Bmi,
            chart_match: None,
            body_mass_index: Some(bmi),
        };
    }

    debug!(
        event_name = "fit.size.default_applied",
        size = DEFAULT_SIZE.as_str(),
        "no usable measurements, falling back to default size"
    );
    SizeDecision {
        label: DEFAULT_SIZE,
        source: SizeSource::Default,
        chart_match: None,
        body_mass_index: None,
    }
}

/// Greedy nearest-fit over the chart rows: most axes in range wins, then the
/// smallest summed distance, then table order. `None` when no axis is present.
pub fn pick_from_chart(
    chart: &SizeChart,
    bust: Option<f64>,
    waist: Option<f64>,
    hip: Option<f64>,
) -> Option<ChartMatch> {
    if bust.is_none() && waist.is_none() && hip.is_none() {
        return None;
    }

    let mut best: Option<ChartMatch> = None;
    for entry in &chart.rows {
        let axes = [(bust, &entry.bust), (waist, &entry.waist), (hip, &entry.hip)];

        let mut score = 0u8;
        let mut distance = 0.0;
        for (value, range) in axes {
            let Some(value) = value else {
                continue;
            };
            if range.contains(value) {
                score += 1;
            }
            distance += range.distance(value);
        }

        let better = match &best {
            None => true,
            Some(current) => {
                score > current.score || (score == current.score && distance < current.distance)
            }
        };
        if better {
            best = Some(ChartMatch { label: entry.label, score, distance });
        }
    }

    best
}

pub fn body_mass_index(height_cm: f64, weight_kg: f64) -> Option<f64> {
    if height_cm <= 0.0 || weight_kg <= 0.0 {
        return None;
    }
    let meters = height_cm / 100.0;
    Some(weight_kg / (meters * meters))
}

pub fn size_for_bmi(bmi: f64) -> SizeLabel {
    if bmi < 21.0 {
        SizeLabel::S
    } else if bmi < 24.0 {
        SizeLabel::M
    } else if bmi < 27.0 {
        SizeLabel::L
    } else if bmi < 31.0 {
        SizeLabel::XL
    } else {
        SizeLabel::XXL
    }
}

pub fn size_from_bmi(height_cm: Option<f64>, weight_kg: Option<f64>) -> Option<SizeLabel> {
    let bmi = body_mass_index(height_cm?, weight_kg?)?;
    Some(size_for_bmi(bmi))
}

#[cfg(test)]
mod tests {
    use super::{pick_from_chart, select_size, size_for_bmi, size_from_bmi};
    use crate::domain::measurement::{LengthUnit, NormalizedMeasurements};
    use crate::domain::size::{SizeLabel, SizeSource};
    use crate::fit::chart::{MeasurementRange, SizeChart, SizeChartEntry};

    fn entry(label: SizeLabel, bust: (f64, f64)) -> SizeChartEntry {
        SizeChartEntry {
            label,
            bust: MeasurementRange::new(bust.0, bust.1),
            waist: MeasurementRange::new(60.0, 70.0),
            hip: MeasurementRange::new(90.0, 100.0),
        }
    }

    #[test]
    fn single_axis_in_range_selects_that_row() {
        let chart = SizeChart::default();
        let found = pick_from_chart(&chart, Some(90.0), None, None).expect("match");

        assert_eq!(found.label, SizeLabel::M);
        assert_eq!(found.score, 1);
        assert!((found.distance - 0.05).abs() < 1e-9);
    }

    #[test]
    fn more_axes_in_range_beats_closer_distance() {
        let chart = SizeChart::default();
        // bust fits L, waist and hip fit M
        let found = pick_from_chart(&chart, Some(98.0), Some(72.0), Some(96.0)).expect("match");

        assert_eq!(found.label, SizeLabel::M);
        assert_eq!(found.score, 2);
    }

    #[test]
    fn equal_scores_prefer_the_nearest_midpoint() {
        let chart = SizeChart {
            unit: LengthUnit::Centimeters,
            rows: vec![entry(SizeLabel::S, (88.0, 94.0)), entry(SizeLabel::M, (85.0, 95.0))],
        };

        let found = pick_from_chart(&chart, Some(90.0), None, None).expect("match");
        assert_eq!(found.label, SizeLabel::M);
    }

    #[test]
    fn exact_ties_keep_table_order() {
        let chart = SizeChart {
            unit: LengthUnit::Centimeters,
            rows: vec![entry(SizeLabel::L, (85.0, 95.0)), entry(SizeLabel::M, (85.0, 95.0))],
        };

        let found = pick_from_chart(&chart, Some(90.0), None, None).expect("match");
        assert_eq!(found.label, SizeLabel::L);
    }

    #[test]
    fn out_of_range_values_pick_the_closest_row() {
        let chart = SizeChart::default();

        let below = pick_from_chart(&chart, Some(70.0), None, None).expect("match");
        assert_eq!((below.label, below.score), (SizeLabel::S, 0));

        let above = pick_from_chart(&chart, None, None, Some(140.0)).expect("match");
        assert_eq!(above.label, SizeLabel::XXL);
    }

    #[test]
    fn lookup_is_deterministic() {
        let chart = SizeChart::default();
        let first = pick_from_chart(&chart, Some(101.3), Some(80.0), None);
        for _ in 0..10 {
            assert_eq!(pick_from_chart(&chart, Some(101.3), Some(80.0), None), first);
        }
    }

    #[test]
    fn no_measurements_means_no_chart_decision() {
        assert_eq!(pick_from_chart(&SizeChart::default(), None, None, None), None);
    }

    #[test]
    fn bmi_thresholds_map_to_sizes() {
        assert_eq!(size_for_bmi(20.9), SizeLabel::S);
        assert_eq!(size_for_bmi(21.0), SizeLabel::M);
        assert_eq!(size_for_bmi(24.0), SizeLabel::L);
        assert_eq!(size_for_bmi(27.0), SizeLabel::XL);
        assert_eq!(size_for_bmi(31.0), SizeLabel::XXL);
        assert_eq!(size_from_bmi(Some(165.0), None), None);
    }

    #[test]
    fn height_and_weight_are_used_when_chart_has_nothing() {
        let decision = select_size(
            &SizeChart::default(),
            &NormalizedMeasurements {
                height_cm: Some(165.0),
                weight_kg: Some(60.0),
                ..NormalizedMeasurements::default()
            },
        );

        assert_eq!(decision.label, SizeLabel::M);
        assert_eq!(decision.source, SizeSource::Bmi);
        assert!((decision.body_mass_index.expect("bmi") - 22.04).abs() < 0.01);
    }

    #[test]
    fn chart_lookup_takes_precedence_over_bmi() {
        let decision = select_size(
            &SizeChart::default(),
            &NormalizedMeasurements {
                hip: Some(125.0),
                height_cm: Some(165.0),
                weight_kg: Some(60.0),
                ..NormalizedMeasurements::default()
            },
        );

        assert_eq!(decision.label, SizeLabel::XXL);
        assert_eq!(decision.source, SizeSource::Chart);
    }

    #[test]
    fn empty_input_falls_back_to_medium() {
        let decision = select_size(&SizeChart::default(), &NormalizedMeasurements::default());

        assert_eq!(decision.label, SizeLabel::M);
        assert_eq!(decision.source, SizeSource::Default);
    }
}
