use serde::{Deserialize, Serialize};

use crate::fit::units::inches_to_cm;

/// Cup increment used when the cup letters are not in the table.
pub const DEFAULT_CUP_INCREMENT_INCHES: f64 = 7.5;

const CUP_INCREMENTS_INCHES: &[(&str, f64)] = &[
    ("A", 2.5),
    ("B", 5.0),
    ("C", 7.5),
    ("D", 10.0),
    ("DD", 12.5),
    ("E", 12.5),
    ("F", 15.0),
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BraSize {
    pub band: u8,
    pub cup: String,
}

impl BraSize {
    /// Accepts two band digits followed by cup letters, ignoring whitespace and case
    /// (`"36C"`, `"34 dd"`). Anything else is not a bra size.
    pub fn parse(raw: &str) -> Option<Self> {
        let compact: String = raw.chars().filter(|ch| !ch.is_whitespace()).collect();
        if !compact.is_char_boundary(2) {
            return None;
        }
        let (band, cup) = compact.split_at(2);

        if !band.chars().all(|ch| ch.is_ascii_digit()) {
            return None;
        }
        if cup.is_empty() || !cup.chars().all(|ch| ch.is_ascii_alphabetic()) {
            return None;
        }

        Some(Self { band: band.parse().ok()?, cup: cup.to_ascii_uppercase() })
    }

    pub fn estimated_bust_cm(&self) -> f64 {
        inches_to_cm(f64::from(self.band) + cup_increment_inches(&self.cup))
    }
}

pub fn cup_increment_inches(cup: &str) -> f64 {
    CUP_INCREMENTS_INCHES
        .iter()
        .find(|(letters, _)| letters.eq_ignore_ascii_case(cup))
        .map(|(_, increment)| *increment)
        .unwrap_or(DEFAULT_CUP_INCREMENT_INCHES)
}

#[cfg(test)]
mod tests {
    use super::{cup_increment_inches, BraSize};

    #[test]
    fn parses_band_and_cup_ignoring_case_and_whitespace() {
        assert_eq!(BraSize::parse("36C"), Some(BraSize { band: 36, cup: "C".to_string() }));
        assert_eq!(BraSize::parse(" 34 dd "), Some(BraSize { band: 34, cup: "DD".to_string() }));
    }

    #[test]
    fn rejects_strings_outside_the_grammar() {
        for raw in ["C36", "36", "3C", "136C", "36C2", "", "ab"] {
            assert_eq!(BraSize::parse(raw), None, "`{raw}` should not parse");
        }
    }

    #[test]
    fn estimates_bust_from_band_and_cup() {
        let bra = BraSize::parse("36C").expect("valid bra size");
        assert!((bra.estimated_bust_cm() - 110.49).abs() < 1e-9);
    }

    #[test]
    fn unknown_cup_uses_c_increment() {
        assert_eq!(cup_increment_inches("G"), 7.5);
        assert_eq!(cup_increment_inches("dd"), 12.5);
        assert_eq!(cup_increment_inches("A"), 2.5);
    }
}
