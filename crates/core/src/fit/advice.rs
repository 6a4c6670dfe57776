use serde::{Deserialize, Serialize};

use crate::domain::preference::{Activity, FitPreferences, Modesty};
use crate::domain::size::SizeLabel;
use crate::fit::coverage::CoverageStyle;

const FIT_GUIDANCE: &str =
    "For close fit choose your measured size; for relaxed fit, consider one size up.";

/// Structured form of the hints mentioned in the fit notes, for callers that
/// should not parse copy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitHints {
    pub tummy_control_panels: bool,
    pub secure_shoulder_coverage: bool,
    pub full_coverage: bool,
}

impl FitHints {
    pub fn derive(preferences: &FitPreferences, coverage: CoverageStyle) -> Self {
        Self {
            tummy_control_panels: preferences.tummy_control,
            secure_shoulder_coverage: preferences.activity == Some(Activity::SwimClass),
            full_coverage: preferences.modesty == Some(Modesty::High)
                || coverage == CoverageStyle::Burkini,
        }
    }

    pub fn phrases(&self) -> Vec<&'static str> {
        [
            (self.tummy_control_panels, "tummy-control panels"),
            (self.secure_shoulder_coverage, "secure shoulder coverage"),
            (self.full_coverage, "full coverage"),
        ]
        .into_iter()
        .filter_map(|(enabled, phrase)| enabled.then_some(phrase))
        .collect()
    }
}

pub fn compose_fit_notes(size: SizeLabel, coverage: CoverageStyle, hints: &FitHints) -> String {
    let phrases = hints.phrases();
    let clause =
        if phrases.is_empty() { String::new() } else { format!(" with {}", phrases.join(" & ")) };

    format!("We suggest **{size}** in a **{coverage}** style{clause}. {FIT_GUIDANCE}")
}
