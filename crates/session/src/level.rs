//! Citizen level derived from completed pickups.

use serde::{Deserialize, Serialize};

/// Pickups needed to leave the novice tier
pub const RESPONSIBLE_THRESHOLD: u64 = 10;

/// Pickups needed for the top tier; also the length of one progress cycle
pub const EXEMPLARY_THRESHOLD: u64 = 50;

/// Gamification tier shown on the home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitizenLevel {
    Novice,
    Responsible,
    Exemplary,
}

impl CitizenLevel {
    /// Tier for a pickup count
    pub fn for_pickups(count: u64) -> Self {
        if count < RESPONSIBLE_THRESHOLD {
            Self::Novice
        } else if count < EXEMPLARY_THRESHOLD {
            Self::Responsible
        } else {
            Self::Exemplary
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Novice => "Novice Neighbor",
            Self::Responsible => "Responsible Neighbor",
            Self::Exemplary => "Exemplary Neighbor",
        }
    }
}

impl std::fmt::Display for CitizenLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Progress through the current 50-pickup cycle, in `[0, 1)`.
pub fn level_progress(count: u64) -> f64 {
    let within = (count % EXEMPLARY_THRESHOLD) as f64 / EXEMPLARY_THRESHOLD as f64;
    within.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers() {
        assert_eq!(CitizenLevel::for_pickups(0), CitizenLevel::Novice);
        assert_eq!(CitizenLevel::for_pickups(9), CitizenLevel::Novice);
        assert_eq!(CitizenLevel::for_pickups(10), CitizenLevel::Responsible);
        assert_eq!(CitizenLevel::for_pickups(49), CitizenLevel::Responsible);
        assert_eq!(CitizenLevel::for_pickups(50), CitizenLevel::Exemplary);
        assert_eq!(CitizenLevel::for_pickups(500), CitizenLevel::Exemplary);
    }

    #[test]
    fn test_progress_wraps_each_cycle() {
        assert_eq!(level_progress(0), 0.0);
        assert_eq!(level_progress(25), 0.5);
        assert_eq!(level_progress(50), 0.0);
        assert!((level_progress(74) - 0.48).abs() < 1e-12);
    }

    #[test]
    fn test_ordering() {
        assert!(CitizenLevel::Novice < CitizenLevel::Exemplary);
    }
}
