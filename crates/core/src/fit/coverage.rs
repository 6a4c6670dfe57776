use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::preference::{Activity, FitPreferences, Modesty, StylePreference};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoverageStyle {
    #[serde(rename = "burkini")]
    Burkini,
    #[serde(rename = "knee length")]
    KneeLength,
    #[serde(rename = "one-piece")]
    OnePiece,
    #[serde(rename = "one-piece + rash guard")]
    OnePieceWithRashGuard,
}

impl CoverageStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Burkini => "burkini",
            Self::KneeLength => "knee length",
            Self::OnePiece => "one-piece",
            Self::OnePieceWithRashGuard => "one-piece + rash guard",
        }
    }
}

impl fmt::Display for CoverageStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageDecision {
    pub style: CoverageStyle,
    pub rule_id: String,
}

#[derive(Clone, Copy)]
pub struct CoverageRule {
    pub id: &'static str,
    pub applies: fn(&FitPreferences) -> bool,
    pub style: CoverageStyle,
}

impl fmt::Debug for CoverageRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoverageRule").field("id", &self.id).field("style", &self.style).finish()
    }
}

pub trait CoverageEngine: Send + Sync {
    fn decide(&self, preferences: &FitPreferences) -> CoverageDecision;
}

/// Ordered rules, first match wins. The last rule must always apply.
#[derive(Clone, Debug)]
pub struct RuleCascadeCoverageEngine {
    rules: Vec<CoverageRule>,
}

impl RuleCascadeCoverageEngine {
    pub fn new(rules: Vec<CoverageRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[CoverageRule] {
        &self.rules
    }
}

impl Default for RuleCascadeCoverageEngine {
    fn default() -> Self {
        Self::new(standard_rules())
    }
}

impl CoverageEngine for RuleCascadeCoverageEngine {
    fn decide(&self, preferences: &FitPreferences) -> CoverageDecision {
        self.rules
            .iter()
            .find(|rule| (rule.applies)(preferences))
            .map(|rule| CoverageDecision { style: rule.style, rule_id: rule.id.to_string() })
            .unwrap_or_else(|| CoverageDecision {
                style: DEFAULT_COVERAGE,
                rule_id: "default".to_string(),
            })
    }
}

pub const DEFAULT_COVERAGE: CoverageStyle = CoverageStyle::KneeLength;

fn class_activity(preferences: &FitPreferences) -> bool {
    preferences.activity.is_some_and(Activity::is_class)
}

pub fn standard_rules() -> Vec<CoverageRule> {
    vec![
        CoverageRule {
            id: "style_burkini",
            applies: |p| p.style_preference == Some(StylePreference::Burkini),
            style: CoverageStyle::Burkini,
        },
        CoverageRule {
            id: "style_swimdress",
            applies: |p| p.style_preference == Some(StylePreference::Swimdress),
            style: CoverageStyle::KneeLength,
        },
        CoverageRule {
            id: "style_rashguard",
            applies: |p| p.style_preference == Some(StylePreference::Rashguard),
            style: CoverageStyle::OnePieceWithRashGuard,
        },
        CoverageRule {
            id: "modesty_high",
            applies: |p| p.modesty == Some(Modesty::High),
            style: CoverageStyle::Burkini,
        },
        CoverageRule {
            id: "class_medium_modesty",
            applies: |p| class_activity(p) && p.modesty == Some(Modesty::Medium),
            style: CoverageStyle::KneeLength,
        },
        CoverageRule { id: "class_activity", applies: class_activity, style: CoverageStyle::OnePiece },
        CoverageRule {
            id: "tummy_control",
            applies: |p| p.tummy_control,
            style: CoverageStyle::KneeLength,
        },
        CoverageRule { id: "default", applies: |_| true, style: DEFAULT_COVERAGE },
    ]
}

#[cfg(test)]
mod tests {
    use super::{CoverageEngine, CoverageStyle, RuleCascadeCoverageEngine};
    use crate::domain::preference::{Activity, FitPreferences, Modesty, StylePreference};

    fn decide(preferences: FitPreferences) -> (CoverageStyle, String) {
        let decision = RuleCascadeCoverageEngine::default().decide(&preferences);
        (decision.style, decision.rule_id)
    }

    #[test]
    fn style_preference_overrides_modesty_and_activity() {
        let (style, rule) = decide(FitPreferences {
            activity: Some(Activity::Beach),
            modesty: Some(Modesty::Low),
            style_preference: Some(StylePreference::Burkini),
            ..FitPreferences::default()
        });
        assert_eq!(style, CoverageStyle::Burkini);
        assert_eq!(rule, "style_burkini");

        let (style, _) = decide(FitPreferences {
            modesty: Some(Modesty::High),
            style_preference: Some(StylePreference::Rashguard),
            ..FitPreferences::default()
        });
        assert_eq!(style, CoverageStyle::OnePieceWithRashGuard);
    }

    #[test]
    fn swimdress_preference_maps_to_knee_length() {
        let (style, rule) = decide(FitPreferences {
            style_preference: Some(StylePreference::Swimdress),
            ..FitPreferences::default()
        });
        assert_eq!(style, CoverageStyle::KneeLength);
        assert_eq!(rule, "style_swimdress");
    }

    #[test]
    fn high_modesty_beats_class_activity() {
        let (style, rule) = decide(FitPreferences {
            activity: Some(Activity::SwimClass),
            modesty: Some(Modesty::High),
            ..FitPreferences::default()
        });
        assert_eq!(style, CoverageStyle::Burkini);
        assert_eq!(rule, "modesty_high");
    }

    #[test]
    fn class_activities_depend_on_modesty() {
        let (style, _) = decide(FitPreferences {
            activity: Some(Activity::AquaFitness),
            modesty: Some(Modesty::Medium),
            ..FitPreferences::default()
        });
        assert_eq!(style, CoverageStyle::KneeLength);

        let (style, rule) = decide(FitPreferences {
            activity: Some(Activity::SwimClass),
            modesty: Some(Modesty::Low),
            tummy_control: true,
            ..FitPreferences::default()
        });
        assert_eq!(style, CoverageStyle::OnePiece);
        assert_eq!(rule, "class_activity");
    }

    #[test]
    fn tummy_control_and_default_both_resolve_to_knee_length() {
        let (style, rule) = decide(FitPreferences {
            activity: Some(Activity::Beach),
            tummy_control: true,
            ..FitPreferences::default()
        });
        assert_eq!((style, rule.as_str()), (CoverageStyle::KneeLength, "tummy_control"));

        let (style, rule) = decide(FitPreferences {
            style_preference: Some(StylePreference::Onepiece),
            ..FitPreferences::default()
        });
        assert_eq!((style, rule.as_str()), (CoverageStyle::KneeLength, "default"));
    }

    #[test]
    fn empty_rule_list_still_returns_default() {
        let engine = RuleCascadeCoverageEngine::new(Vec::new());
        let decision = engine.decide(&FitPreferences::default());
        assert_eq!(decision.style, CoverageStyle::KneeLength);
    }

    #[test]
    fn wire_strings_match_storefront_copy() {
        assert_eq!(
            serde_json::to_string(&CoverageStyle::OnePieceWithRashGuard).expect("serialize"),
            "\"one-piece + rash guard\""
        );
        assert_eq!(CoverageStyle::KneeLength.to_string(), "knee length");
    }
}
