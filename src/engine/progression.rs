use chrono::NaiveDate;
use std::ops::RangeInclusive;

use crate::models::{Arc, Day, DayCompletion, Pillar, WeekStats, ARC_LENGTH};

/// Fraction of the 30 days that must be Full before an arc can be completed.
pub const REQUIRED_FULL_FRACTION: f64 = 0.85;

/// Days available without entitlement.
pub const FREE_LIMIT_DAYS: u32 = 7;

/// Cumulative missed past days that trigger a hard reset.
pub const MAX_MISSED_DAYS_BEFORE_RESET: u32 = 3;

/// Day number for `today` within an arc that began on `start_date`.
/// Day 1 is the start date itself; the value saturates at 30 and never
/// auto-advances past it. Clamped to 1 if the clock somehow runs backwards.
pub fn current_day_number(start_date: NaiveDate, today: NaiveDate) -> u32 {
    let elapsed = (today - start_date).num_days();
    (elapsed + 1).clamp(1, ARC_LENGTH as i64) as u32
}

fn elapsed_days(days: &[Day], cutoff: u32) -> Vec<&Day> {
    let mut relevant: Vec<&Day> = days.iter().filter(|d| d.number <= cutoff).collect();
    relevant.sort_by_key(|d| d.number);
    relevant
}

/// Strict streak: only Full days count, and if the latest elapsed day is not
/// Full the whole streak collapses to zero. Otherwise the maximal trailing
/// run of Full days ending at the latest elapsed day.
pub fn current_streak(days: &[Day], current_day: u32) -> u32 {
    let relevant = elapsed_days(days, current_day);
    match relevant.last() {
        Some(latest) if latest.completion() == DayCompletion::Full => relevant
            .iter()
            .rev()
            .take_while(|d| d.completion() == DayCompletion::Full)
            .count() as u32,
        _ => 0,
    }
}

/// Full days across the entire arc, regardless of the current day.
pub fn full_days_count(days: &[Day]) -> u32 {
    days.iter()
        .filter(|d| d.completion() == DayCompletion::Full)
        .count() as u32
}

/// Full days as a fraction of the arc length, in [0,1].
pub fn completion_percent(days: &[Day]) -> f64 {
    if ARC_LENGTH == 0 {
        return 0.0;
    }
    full_days_count(days) as f64 / ARC_LENGTH as f64
}

/// Full-day quota for completion, derived from the fraction and arc length
/// rather than hardcoded: ceil(0.85 * 30) = 26.
pub fn required_full_days() -> u32 {
    (REQUIRED_FULL_FRACTION * ARC_LENGTH as f64).ceil() as u32
}

/// An arc can be completed only once day 30 is reached AND the full-day
/// quota is met, never early, even if the quota is already satisfied.
pub fn can_complete_arc(current_day: u32, full_days: u32) -> bool {
    current_day >= ARC_LENGTH && full_days >= required_full_days()
}

/// Access gate: past the free range and not entitled. No effect on any
/// streak or day math.
pub fn is_access_blocked(current_day: u32, entitled: bool) -> bool {
    !entitled && current_day > FREE_LIMIT_DAYS
}

/// The 7-day window containing `current_day`: 1-7, 8-14, 15-21, then 22-30.
/// The final window is 9 days because 30 does not divide by 7; that
/// asymmetry is deliberate and preserved.
pub fn current_week_range(current_day: u32) -> RangeInclusive<u32> {
    let start = ((current_day - 1) / 7) * 7 + 1;
    let end = (start + 6).min(ARC_LENGTH);
    start..=end
}

/// Completion-tier counts among the days whose number falls in `range`.
/// Numbers outside 1..=30 fall outside every window and are ignored.
pub fn week_stats(days: &[Day], range: RangeInclusive<u32>) -> WeekStats {
    let week_days: Vec<&Day> = days.iter().filter(|d| range.contains(&d.number)).collect();
    if week_days.is_empty() {
        return WeekStats::default();
    }

    let mut stats = WeekStats::default();
    for day in &week_days {
        match day.completion() {
            DayCompletion::Full => stats.full += 1,
            DayCompletion::Partial => stats.partial += 1,
            DayCompletion::Missed => stats.missed += 1,
        }
    }
    stats.percent = (stats.full as f64 / week_days.len() as f64 * 100.0).round() as u32;
    stats
}

/// The pillar with the fewest completions across the full 30-day set.
/// Deliberately not scoped to elapsed days, so mid-arc it compares against
/// full-arc potential. Ties resolve to the earliest pillar in fixed order.
pub fn weakest_pillar(days: &[Day]) -> Option<Pillar> {
    if days.is_empty() {
        return None;
    }
    Pillar::all()
        .into_iter()
        .map(|p| (p, days.iter().filter(|d| d.slot(p).completed).count()))
        .min_by_key(|(_, count)| *count)
        .map(|(p, _)| p)
}

/// Missed days strictly before the current day. Today is excluded because
/// it can still be completed; cutoff floors at day 1.
pub fn missed_days_so_far(days: &[Day], current_day: u32) -> u32 {
    let cutoff = current_day.saturating_sub(1).max(1);
    days.iter()
        .filter(|d| d.number <= cutoff)
        .filter(|d| d.completion() == DayCompletion::Missed)
        .count() as u32
}

/// Non-strict threshold: true from the third cumulative miss onward.
pub fn should_reset_for_misses(missed: u32) -> bool {
    missed >= MAX_MISSED_DAYS_BEFORE_RESET
}

/// Fraction of the arc reached, for the thin progress bar.
pub fn arc_progress(current_day: u32) -> f64 {
    (current_day.min(ARC_LENGTH) as f64 / ARC_LENGTH as f64).clamp(0.0, 1.0)
}

/// Recompute the derived caches on an arc. Cheap (a linear scan of at most
/// 30 records), so always done eagerly instead of maintained incrementally.
pub fn update_derived(arc: &mut Arc, today: NaiveDate) {
    arc.current_day = current_day_number(arc.start_date, today);
    arc.streak = current_streak(&arc.days, arc.current_day);
}
