//! Arc progression engine: pure derivations over an arc's day records.
//!
//! Every function here is deterministic given its inputs: the caller
//! supplies "today", nothing reads the clock or touches storage. Derived
//! caches are recomputed eagerly on every state-affecting event; a full
//! recomputation is a linear scan of at most 30 records.

pub mod momentum;
pub mod progression;

pub use momentum::{
    consecutive_misses_so_far, identity_heat, recent_completion_rate, RATE_WINDOW,
    STREAK_HEAT_CAP,
};
pub use progression::{
    arc_progress, can_complete_arc, completion_percent, current_day_number, current_streak,
    current_week_range, full_days_count, is_access_blocked, missed_days_so_far,
    required_full_days, should_reset_for_misses, update_derived, weakest_pillar, week_stats,
    FREE_LIMIT_DAYS, MAX_MISSED_DAYS_BEFORE_RESET, REQUIRED_FULL_FRACTION,
};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::models::{Day, Pillar};

    /// Build numbered days from completed-pillar counts (0..=3 each).
    pub fn days_from_tiers(tiers: &[u32]) -> Vec<Day> {
        tiers
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                let mut day = Day::new(i as u32 + 1);
                for p in Pillar::all().into_iter().take(count as usize) {
                    day.set_pillar(p, "t", "", true);
                }
                day
            })
            .collect()
    }
}
