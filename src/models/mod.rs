pub mod arc;
pub mod day;
pub mod stats;

pub use arc::{Arc, ArcStatus, ModelError, Rank, ARC_LENGTH};
pub use day::{Day, DayCompletion, Pillar, PillarSlot};
pub use stats::{IdentityHeat, MomentumTier, Profile, WeekStats};
