//! Density levels, pitch classes and the gull-wing fillet goals.
//!
//! A gull-wing land pattern is selected by two keys: the density level
//! requested for the board (Most, Nominal, Least) and the pitch class of the
//! part. Fine-pitch parts use a separate table with smaller side fillets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lead pitch at and above which the large-pitch gull-wing table applies (mm).
pub const LARGE_PITCH_THRESHOLD: f64 = 0.625;

/// IPC-7351B density level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DensityLevel {
    /// Level A, largest lands.
    Most,
    /// Level B.
    #[default]
    Nominal,
    /// Level C, smallest lands.
    Least,
}

impl DensityLevel {
    /// Letter appended to IPC land pattern names.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Most => 'M',
            Self::Nominal => 'N',
            Self::Least => 'L',
        }
    }

    /// Courtyard excess around the land pattern (mm).
    #[must_use]
    pub const fn courtyard_excess(self) -> f64 {
        match self {
            Self::Most => 0.5,
            Self::Nominal => 0.25,
            Self::Least => 0.1,
        }
    }
}

impl FromStr for DensityLevel {
    type Err = String;

    /// Accepts the letter or the full name, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "m" | "most" => Ok(Self::Most),
            "n" | "nominal" => Ok(Self::Nominal),
            "l" | "least" => Ok(Self::Least),
            _ => Err(format!("unknown density '{s}', expected L, N or M")),
        }
    }
}

impl fmt::Display for DensityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Which of the two gull-wing tables a part uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PitchClass {
    /// Pitch of 0.625 mm and above.
    Large,
    /// Pitch below 0.625 mm.
    Small,
}

impl PitchClass {
    /// Classifies a lead pitch.
    #[must_use]
    pub fn from_pitch(pitch: f64) -> Self {
        if pitch >= LARGE_PITCH_THRESHOLD {
            Self::Large
        } else {
            Self::Small
        }
    }
}

/// Toe, heel and side fillet goals in mm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolderFilletGoals {
    /// Toe fillet (Jt), beyond the lead tip.
    pub toe: f64,
    /// Heel fillet (Jh), inside the lead bend.
    pub heel: f64,
    /// Side fillet (Js), per side of the lead.
    pub side: f64,
}

impl SolderFilletGoals {
    /// Creates new solder fillet goals.
    #[must_use]
    pub const fn new(toe: f64, heel: f64, side: f64) -> Self {
        Self { toe, heel, side }
    }

    /// IPC-7351B Table 3-3 values for gull-wing leads.
    ///
    /// The small-pitch side goal is negative for Nominal and Least.
    #[must_use]
    pub const fn for_gull_wing(density: DensityLevel, pitch: PitchClass) -> Self {
        match (pitch, density) {
            (PitchClass::Large, DensityLevel::Most) => Self::new(0.55, 0.45, 0.05),
            (PitchClass::Large, DensityLevel::Nominal) => Self::new(0.35, 0.35, 0.03),
            (PitchClass::Large, DensityLevel::Least) => Self::new(0.15, 0.25, 0.01),
            (PitchClass::Small, DensityLevel::Most) => Self::new(0.55, 0.45, 0.01),
            (PitchClass::Small, DensityLevel::Nominal) => Self::new(0.35, 0.35, -0.02),
            (PitchClass::Small, DensityLevel::Least) => Self::new(0.15, 0.25, -0.04),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_density() {
        assert_eq!("M".parse(), Ok(DensityLevel::Most));
        assert_eq!("nominal".parse(), Ok(DensityLevel::Nominal));
        assert_eq!("Least".parse(), Ok(DensityLevel::Least));
        assert!("X".parse::<DensityLevel>().is_err());
    }

    #[test]
    fn display_is_name_letter() {
        assert_eq!(DensityLevel::Most.to_string(), "M");
        assert_eq!(DensityLevel::Least.letter(), 'L');
    }

    #[test]
    fn pitch_threshold() {
        assert_eq!(PitchClass::from_pitch(0.65), PitchClass::Large);
        assert_eq!(PitchClass::from_pitch(0.625), PitchClass::Large);
        assert_eq!(PitchClass::from_pitch(0.5), PitchClass::Small);
    }

    #[test]
    fn fine_pitch_has_smaller_side_fillet() {
        for density in [DensityLevel::Most, DensityLevel::Nominal, DensityLevel::Least] {
            let large = SolderFilletGoals::for_gull_wing(density, PitchClass::Large);
            let small = SolderFilletGoals::for_gull_wing(density, PitchClass::Small);
            assert!(small.side < large.side);
            assert!((small.toe - large.toe).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn courtyard_grows_with_density() {
        assert!(DensityLevel::Least.courtyard_excess() < DensityLevel::Nominal.courtyard_excess());
        assert!((DensityLevel::Most.courtyard_excess() - 0.5).abs() < f64::EPSILON);
    }
}
