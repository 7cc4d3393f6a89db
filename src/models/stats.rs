use serde::{Deserialize, Serialize};

/// Per-tier day counts for one week window of the arc.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekStats {
    pub full: u32,
    pub partial: u32,
    pub missed: u32,
    /// Full days as a rounded percentage of the window's day count.
    pub percent: u32,
}

/// Composite momentum score: 70% capped streak, 30% recent completion rate.
/// Drives presentation intensity only; no gating decision reads it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityHeat {
    pub value: f64,
    pub streak_heat: f64,
    pub rate_heat: f64,
}

/// Lifetime counters that outlive any single arc. Stored as a single
/// profile row, loaded and saved through the profile repository.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    pub arcs_completed: u32,
    pub momentum_points: u32,
}

/// Momentum tier shown on the status line, from the strict streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MomentumTier {
    Cold,
    Flicker,
    Rising,
    Burning,
    Roaring,
}

impl MomentumTier {
    pub fn from_streak(streak: u32) -> MomentumTier {
        match streak {
            0 => MomentumTier::Cold,
            1..=3 => MomentumTier::Flicker,
            4..=7 => MomentumTier::Rising,
            8..=14 => MomentumTier::Burning,
            _ => MomentumTier::Roaring,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MomentumTier::Cold => "Cold",
            MomentumTier::Flicker => "Flicker",
            MomentumTier::Rising => "Rising",
            MomentumTier::Burning => "Burning",
            MomentumTier::Roaring => "Roaring",
        }
    }
}

impl std::fmt::Display for MomentumTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn momentum_tier_bands() {
        assert_eq!(MomentumTier::from_streak(0), MomentumTier::Cold);
        assert_eq!(MomentumTier::from_streak(1), MomentumTier::Flicker);
        assert_eq!(MomentumTier::from_streak(3), MomentumTier::Flicker);
        assert_eq!(MomentumTier::from_streak(4), MomentumTier::Rising);
        assert_eq!(MomentumTier::from_streak(7), MomentumTier::Rising);
        assert_eq!(MomentumTier::from_streak(8), MomentumTier::Burning);
        assert_eq!(MomentumTier::from_streak(14), MomentumTier::Burning);
        assert_eq!(MomentumTier::from_streak(15), MomentumTier::Roaring);
    }
}
