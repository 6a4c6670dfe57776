pub mod advisor;
pub mod analytics;
pub mod config;
pub mod domain;
pub mod errors;
pub mod fit;
pub mod response;

pub use advisor::FitAdvisor;
pub use analytics::{AnalyticsError, AnalyticsRecord, AnalyticsSink};
pub use domain::measurement::{LengthUnit, MeasurementInput, NormalizedMeasurements, UnitSystem};
pub use domain::preference::{Activity, FitPreferences, Modesty, StylePreference};
pub use domain::request::{FitRequest, ProductContext};
pub use domain::size::{SizeLabel, SizeSource};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use fit::coverage::{CoverageDecision, CoverageStyle};
pub use fit::size::SizeDecision;
pub use fit::{build_runtime, DeterministicFitRuntime, FitEvaluation, FitRuntime};
pub use response::RecommendResponse;
