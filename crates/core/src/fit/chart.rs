use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::measurement::LengthUnit;
use crate::domain::size::SizeLabel;

/// Penalty weight applied to the distance from a range midpoint when a value is
/// already inside the range.
pub const IN_RANGE_MIDPOINT_WEIGHT: f64 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRange {
    pub low: f64,
    pub high: f64,
}

impl MeasurementRange {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }

    pub fn midpoint(&self) -> f64 {
        (self.low + self.high) / 2.0
    }

    /// Distance outside the range, or a small midpoint penalty inside it.
    pub fn distance(&self, value: f64) -> f64 {
        if value < self.low {
            self.low - value
        } else if value > self.high {
            value - self.high
        } else {
            (value - self.midpoint()).abs() * IN_RANGE_MIDPOINT_WEIGHT
        }
    }

    fn converted(&self, from: LengthUnit, to: LengthUnit) -> Self {
        Self { low: from.convert(self.low, to), high: from.convert(self.high, to) }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SizeChartEntry {
    pub label: SizeLabel,
    pub bust: MeasurementRange,
    pub waist: MeasurementRange,
    pub hip: MeasurementRange,
}

impl SizeChartEntry {
    fn axes(&self) -> [(&'static str, &MeasurementRange); 3] {
        [("bust", &self.bust), ("waist", &self.waist), ("hip", &self.hip)]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SizeChart {
    pub unit: LengthUnit,
    pub rows: Vec<SizeChartEntry>,
}

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("could not read size chart `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse size chart `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("invalid size chart: {0}")]
    Invalid(String),
}

fn row(
    label: SizeLabel,
    bust: (f64, f64),
    waist: (f64, f64),
    hip: (f64, f64),
) -> SizeChartEntry {
    SizeChartEntry {
        label,
        bust: MeasurementRange::new(bust.0, bust.1),
        waist: MeasurementRange::new(waist.0, waist.1),
        hip: MeasurementRange::new(hip.0, hip.1),
    }
}

impl Default for SizeChart {
    fn default() -> Self {
        Self {
            unit: LengthUnit::Centimeters,
            rows: vec![
                row(SizeLabel::S, (80.0, 86.0), (62.0, 68.0), (86.0, 92.0)),
                row(SizeLabel::M, (87.0, 94.0), (69.0, 76.0), (93.0, 100.0)),
                row(SizeLabel::L, (95.0, 102.0), (77.0, 84.0), (101.0, 108.0)),
                row(SizeLabel::XL, (103.0, 111.0), (85.0, 93.0), (109.0, 117.0)),
                row(SizeLabel::XXL, (112.0, 122.0), (94.0, 106.0), (118.0, 130.0)),
            ],
        }
    }
}

impl SizeChart {
    /// Loads a chart authored in TOML:
    ///
    /// ```toml
    /// unit = "cm"
    ///
    /// [[rows]]
    /// label = "S"
    /// bust = [80, 86]
    /// waist = [62, 68]
    /// hip = [86, 92]
    /// ```
    pub fn load(path: &Path) -> Result<Self, ChartError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| ChartError::ReadFile { path: path.to_path_buf(), source })?;
        let file = toml::from_str::<ChartFile>(&raw)
            .map_err(|source| ChartError::ParseFile { path: path.to_path_buf(), source })?;
        Self::from_rows(file.unit, file.rows.into_iter().map(ChartFileRow::into_entry).collect())
    }

    pub fn from_rows(unit: LengthUnit, rows: Vec<SizeChartEntry>) -> Result<Self, ChartError> {
        if rows.is_empty() {
            return Err(ChartError::Invalid("chart must contain at least one row".to_string()));
        }

        for entry in &rows {
            for (axis, range) in entry.axes() {
                if !range.low.is_finite() || !range.high.is_finite() || range.low > range.high {
                    return Err(ChartError::Invalid(format!(
                        "row {} has an invalid {axis} range {}..={}",
                        entry.label, range.low, range.high
                    )));
                }
            }
        }

        Ok(Self { unit, rows })
    }

    pub fn converted_to(&self, unit: LengthUnit) -> Self {
        if unit == self.unit {
            return self.clone();
        }

        let rows = self
            .rows
            .iter()
            .map(|entry| SizeChartEntry {
                label: entry.label,
                bust: entry.bust.converted(self.unit, unit),
                waist: entry.waist.converted(self.unit, unit),
                hip: entry.hip.converted(self.unit, unit),
            })
            .collect();

        Self { unit, rows }
    }

    /// Rows are expected to grow from smallest to largest on every axis. Lookup does
    /// not depend on it, so breaches are reported rather than rejected.
    pub fn monotonic_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        for pair in self.rows.windows(2) {
            let (previous, next) = (&pair[0], &pair[1]);
            if next.label <= previous.label {
                violations.push(format!("{} is listed after {}", next.label, previous.label));
            }
            for ((axis, before), (_, after)) in previous.axes().into_iter().zip(next.axes()) {
                if after.low < before.low || after.high < before.high {
                    violations.push(format!(
                        "{axis} range of {} ({}..={}) shrinks below {} ({}..={})",
                        next.label, after.low, after.high, previous.label, before.low, before.high
                    ));
                }
            }
        }

        violations
    }
}

#[derive(Debug, Deserialize)]
struct ChartFile {
    #[serde(default)]
    unit: LengthUnit,
    rows: Vec<ChartFileRow>,
}

#[derive(Debug, Deserialize)]
struct ChartFileRow {
    label: SizeLabel,
    bust: (f64, f64),
    waist: (f64, f64),
    hip: (f64, f64),
}

impl ChartFileRow {
    fn into_entry(self) -> SizeChartEntry {
        row(self.label, self.bust, self.waist, self.hip)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::{ChartError, MeasurementRange, SizeChart};
    use crate::domain::measurement::LengthUnit;
    use crate::domain::size::SizeLabel;

    #[test]
    fn range_distance_measures_overshoot_outside_and_midpoint_penalty_inside() {
        let range = MeasurementRange::new(87.0, 94.0);
        assert_eq!(range.distance(85.0), 2.0);
        assert_eq!(range.distance(97.0), 3.0);
        assert!((range.distance(90.0) - 0.05).abs() < 1e-9);
        assert!(range.contains(87.0) && range.contains(94.0));
    }

    #[test]
    fn built_in_chart_is_monotonic() {
        let chart = SizeChart::default();
        assert_eq!(chart.rows.len(), 5);
        assert!(chart.monotonic_violations().is_empty());
    }

    #[test]
    fn converted_chart_keeps_labels_and_scales_ranges() {
        let chart = SizeChart::default().converted_to(LengthUnit::Inches);
        assert_eq!(chart.unit, LengthUnit::Inches);
        assert_eq!(chart.rows[1].label, SizeLabel::M);
        assert!((chart.rows[1].bust.low - 87.0 / 2.54).abs() < 1e-9);
    }

    #[test]
    fn loads_chart_from_toml_and_reports_shrinking_rows() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("chart.toml");
        fs::write(
            &path,
            r#"
unit = "in"

[[rows]]
label = "S"
bust = [32, 34]
waist = [25, 27]
hip = [34, 36]

[[rows]]
label = "M"
bust = [35, 37]
waist = [24, 26]
hip = [37, 39]
"#,
        )
        .expect("write chart");

        let chart = SizeChart::load(&path).expect("chart loads");
        assert_eq!(chart.unit, LengthUnit::Inches);
        assert_eq!(chart.rows.len(), 2);

        let violations = chart.monotonic_violations();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].starts_with("waist range of M"));
    }

    #[test]
    fn rejects_inverted_ranges_and_empty_charts() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("chart.toml");
        fs::write(
            &path,
            r#"
[[rows]]
label = "S"
bust = [90, 80]
waist = [62, 68]
hip = [86, 92]
"#,
        )
        .expect("write chart");

        assert!(matches!(SizeChart::load(&path), Err(ChartError::Invalid(message)) if message.contains("bust")));
        assert!(matches!(
            SizeChart::from_rows(LengthUnit::Centimeters, Vec::new()),
            Err(ChartError::Invalid(_))
        ));
    }
}
