use crate::models::{Day, DayCompletion, IdentityHeat};

use super::progression::current_streak;

/// Streak length at which streak heat saturates.
pub const STREAK_HEAT_CAP: f64 = 14.0;

/// Window for the recent completion rate.
pub const RATE_WINDOW: u32 = 7;

fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

/// Trailing run of Missed days among past days only (today excluded, same
/// cutoff floor as the miss counter). Same backward walk as the streak,
/// inverted. Drives presentation decay, never gameplay.
pub fn consecutive_misses_so_far(days: &[Day], current_day: u32) -> u32 {
    let cutoff = current_day.saturating_sub(1).max(1);
    let mut relevant: Vec<&Day> = days.iter().filter(|d| d.number <= cutoff).collect();
    relevant.sort_by_key(|d| d.number);

    relevant
        .iter()
        .rev()
        .take_while(|d| d.completion() == DayCompletion::Missed)
        .count() as u32
}

/// Average completion score over the last `window` elapsed days, scoring
/// Full=1.0, Partial=0.5, Missed=0.0. Averages over fewer days early in
/// the arc; 0 when none have elapsed.
pub fn recent_completion_rate(days: &[Day], current_day: u32, window: u32) -> f64 {
    let mut relevant: Vec<&Day> = days.iter().filter(|d| d.number <= current_day).collect();
    relevant.sort_by_key(|d| d.number);

    let skip = relevant.len().saturating_sub(window as usize);
    let recent = &relevant[skip..];
    if recent.is_empty() {
        return 0.0;
    }

    let score: f64 = recent.iter().map(|d| d.completion().score()).sum();
    clamp01(score / recent.len() as f64)
}

/// Identity heat blends the strict Full streak with recent stability:
/// 0.70 * clamp01(streak/14) + 0.30 * rate(window=7), clamped to [0,1].
/// Downstream consumers rely on the exact numeric value.
pub fn identity_heat(days: &[Day], current_day: u32) -> IdentityHeat {
    let streak_heat = clamp01(current_streak(days, current_day) as f64 / STREAK_HEAT_CAP);
    let rate_heat = clamp01(recent_completion_rate(days, current_day, RATE_WINDOW));
    IdentityHeat {
        value: clamp01(0.70 * streak_heat + 0.30 * rate_heat),
        streak_heat,
        rate_heat,
    }
}
