use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Beach,
    SwimClass,
    AquaFitness,
}

impl Activity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beach => "beach",
            Self::SwimClass => "swim_class",
            Self::AquaFitness => "aqua_fitness",
        }
    }

    pub fn parse_lenient(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "beach" => Some(Self::Beach),
            "swim_class" => Some(Self::SwimClass),
            "aqua_fitness" => Some(Self::AquaFitness),
            _ => None,
        }
    }

    /// Structured pool sessions, where the garment has to stay put.
    pub fn is_class(self) -> bool {
        matches!(self, Self::SwimClass | Self::AquaFitness)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modesty {
    Low,
    Medium,
    High,
}

impl Modesty {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse_lenient(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StylePreference {
    Swimdress,
    Onepiece,
    Burkini,
    Rashguard,
}

impl StylePreference {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Swimdress => "swimdress",
            Self::Onepiece => "onepiece",
            Self::Burkini => "burkini",
            Self::Rashguard => "rashguard",
        }
    }

    pub fn parse_lenient(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "swimdress" => Some(Self::Swimdress),
            "onepiece" => Some(Self::Onepiece),
            "burkini" => Some(Self::Burkini),
            "rashguard" => Some(Self::Rashguard),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitPreferences {
    pub activity: Option<Activity>,
    pub modesty: Option<Modesty>,
    pub tummy_control: bool,
    pub style_preference: Option<StylePreference>,
}
