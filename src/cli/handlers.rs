use anyhow::{anyhow, Result};
use chrono::Local;
use rusqlite::Connection;
use std::str::FromStr;

use crate::config::AppConfig;
use crate::db::repository::{ArcRepo, DayRepo, MetaRepo, ProfileRepo};
use crate::engine;
use crate::models::{Arc, ArcStatus, DayCompletion, MomentumTier, Pillar, Rank, ARC_LENGTH};
use crate::utils::format::{completion_icon, format_percent, progress_bar};

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const EMBER: &str = "\x1b[38;2;221;115;41m";

const LAST_RESET_KEY: &str = "last_reset_at";

// ─── Arc loading & refresh ───────────────────────────────────────────────────

/// Fetch the most recent arc, creating a fresh one if none exists yet.
fn ensure_arc(conn: &Connection) -> Result<Arc> {
    if let Some(arc) = ArcRepo::latest(conn)? {
        return Ok(arc);
    }
    let today = Local::now().date_naive();
    let mut arc = Arc::new(today);
    engine::update_derived(&mut arc, today);
    let id = ArcRepo::insert(conn, &arc)?;
    arc.id = Some(id);
    log::debug!("created first arc starting {}", today);
    Ok(arc)
}

/// Recompute derived caches and apply the controlled-stakes rule: three
/// cumulative missed past days discard the arc and start a fresh one.
/// Returns the arc the caller should work with.
fn refresh(conn: &Connection, mut arc: Arc) -> Result<Arc> {
    let today = Local::now().date_naive();
    let old_day = arc.current_day;
    let old_streak = arc.streak;
    engine::update_derived(&mut arc, today);

    if arc.status == ArcStatus::Active {
        let missed = engine::missed_days_so_far(&arc.days, arc.current_day);
        if engine::should_reset_for_misses(missed) {
            let arc_id = arc.id.ok_or_else(|| anyhow!("Arc has no id"))?;
            ArcRepo::supersede(conn, arc_id)?;
            MetaRepo::set(conn, LAST_RESET_KEY, &today.format("%Y-%m-%d").to_string())?;

            let mut fresh = Arc::new(today);
            engine::update_derived(&mut fresh, today);
            let id = ArcRepo::insert(conn, &fresh)?;
            fresh.id = Some(id);
            log::warn!("arc {} reset after {} missed days", arc_id, missed);
            return Ok(fresh);
        }
    }

    if arc.current_day != old_day || arc.streak != old_streak {
        if let Some(id) = arc.id {
            ArcRepo::save_derived(conn, id, arc.current_day, arc.streak)?;
        }
    }
    Ok(arc)
}

fn load_current(conn: &Connection) -> Result<Arc> {
    let arc = ensure_arc(conn)?;
    refresh(conn, arc)
}

/// Amber refusal shown by every mutating command past the free range.
fn print_access_notice(day: u32) {
    println_colored!(
        AMBER,
        "  Day {} is past the free range ({} days). Run `emberarc config --entitled true` to continue.",
        day,
        engine::FREE_LIMIT_DAYS
    );
}

/// Print the pending reset notice once, then clear it.
fn show_reset_notice(conn: &Connection) -> Result<()> {
    if let Some(date) = MetaRepo::get(conn, LAST_RESET_KEY)? {
        println_colored!(RED, "  Arc reset on {}. Three misses.", date);
        println_colored!(DIM, "  No drama. Day 1 again.");
        println!();
        MetaRepo::clear(conn, LAST_RESET_KEY)?;
    }
    Ok(())
}

// ─── Status ──────────────────────────────────────────────────────────────────

pub fn handle_status(conn: &Connection, config: &AppConfig) -> Result<()> {
    let arc = load_current(conn)?;

    println!();
    show_reset_notice(conn)?;

    if arc.status == ArcStatus::Completed {
        let rank = arc
            .final_rank
            .map(|r| r.display_name())
            .unwrap_or("unranked");
        println_colored!(GREEN, "  Arc completed — rank {}.", rank);
        println_colored!(DIM, "  Start the next one with `emberarc new`.");
        println!();
        return Ok(());
    }

    let day = arc.current_day;
    let streak = arc.streak;
    let tier = MomentumTier::from_streak(streak);
    let heat = engine::identity_heat(&arc.days, day);

    println_colored!(EMBER, "  Day {} of {}", day, ARC_LENGTH);
    println!(
        "  {}  {}",
        progress_bar(engine::arc_progress(day), 20),
        format_percent(engine::arc_progress(day))
    );
    println!();
    println_colored!(BOLD, "  Streak: {} full days — {}", streak, tier);
    if config.display.show_heat_breakdown {
        println!(
            "  Heat:   {:.2}  (streak {:.2}, recent {:.2})",
            heat.value, heat.streak_heat, heat.rate_heat
        );
    } else {
        println!("  Heat:   {:.2}", heat.value);
    }

    if config.display.show_week_summary {
        let range = engine::current_week_range(day);
        let stats = engine::week_stats(&arc.days, range.clone());
        println!();
        println_colored!(
            DIM,
            "  This week (days {}-{}): {} full, {} partial, {} missed — {}%",
            range.start(),
            range.end(),
            stats.full,
            stats.partial,
            stats.missed,
            stats.percent
        );
    }

    if let Some(weakest) = engine::weakest_pillar(&arc.days) {
        println_colored!(DIM, "  Weakest pillar: {}", weakest);
    }

    let missed = engine::missed_days_so_far(&arc.days, day);
    if missed > 0 {
        println!();
        println_colored!(
            AMBER,
            "  Missed days: {}/{} — three misses reset the arc",
            missed,
            engine::MAX_MISSED_DAYS_BEFORE_RESET
        );
    }

    if engine::is_access_blocked(day, config.access.entitled) {
        println!();
        println_colored!(
            AMBER,
            "  Free range ended on day {}. Run `emberarc config --entitled true` to continue.",
            engine::FREE_LIMIT_DAYS
        );
    }

    println!();
    Ok(())
}

// ─── Mark ────────────────────────────────────────────────────────────────────

pub fn handle_mark(
    conn: &Connection,
    config: &AppConfig,
    pillar_str: &str,
    task: Option<&str>,
    note: Option<&str>,
    undo: bool,
) -> Result<()> {
    let pillar = Pillar::from_str(pillar_str)
        .map_err(|_| anyhow!("Unknown pillar '{}'. Use: body, mind, focus", pillar_str))?;

    let mut arc = load_current(conn)?;
    show_reset_notice(conn)?;
    if arc.status != ArcStatus::Active {
        return Err(anyhow!("This arc is finished. Start a new one with `emberarc new`"));
    }

    let day_number = arc.current_day;
    if engine::is_access_blocked(day_number, config.access.entitled) {
        print_access_notice(day_number);
        return Ok(());
    }

    let arc_id = arc.id.ok_or_else(|| anyhow!("Arc has no id"))?;
    let day = arc
        .day_mut(day_number)
        .ok_or_else(|| anyhow!("No record for day {}", day_number))?;

    // Keep whatever was on the slot unless new text is supplied.
    let was_done = day.slot(pillar).completed;
    let task = task.map(str::to_string).unwrap_or_else(|| day.slot(pillar).task.clone());
    let note = note
        .map(str::to_string)
        .unwrap_or_else(|| day.slot(pillar).reflection.clone());
    day.set_pillar(pillar, &task, &note, !undo);
    DayRepo::set_pillar(conn, arc_id, day_number, pillar, day.slot(pillar))?;

    let completion = day.completion();
    if undo {
        println_colored!(DIM, "  ○ {} unmarked for day {}", pillar, day_number);
    } else {
        // A point per honest completion, not per repeat of the same mark.
        if !was_done {
            ProfileRepo::add_momentum_point(conn)?;
        }
        println_colored!(GREEN, "  ✓ {} done for day {}", pillar, day_number);
        if completion == DayCompletion::Full {
            println_colored!(EMBER, "  Day {} locked — all three pillars.", day_number);
        }
    }

    let today = Local::now().date_naive();
    engine::update_derived(&mut arc, today);
    ArcRepo::save_derived(conn, arc_id, arc.current_day, arc.streak)?;
    Ok(())
}

// ─── Day ─────────────────────────────────────────────────────────────────────

pub fn handle_day(conn: &Connection, number: Option<u32>) -> Result<()> {
    let arc = load_current(conn)?;
    let number = number.unwrap_or(arc.current_day);
    if !(1..=ARC_LENGTH).contains(&number) {
        return Err(anyhow!("Day number must be 1-{}", ARC_LENGTH));
    }
    let day = arc
        .day(number)
        .ok_or_else(|| anyhow!("No record for day {}", number))?;

    println!();
    println_colored!(
        EMBER,
        "  Day {} — {} ({}/3)",
        number,
        day.completion().as_str(),
        day.completed_count()
    );
    println!();
    for pillar in Pillar::all() {
        let slot = day.slot(pillar);
        let mark = if slot.completed {
            format!("{}✓\x1b[0m", GREEN)
        } else {
            format!("{}○\x1b[0m", DIM)
        };
        let task = if slot.task.is_empty() { "—" } else { slot.task.as_str() };
        println!("  {} {:<6} {}", mark, pillar.display_name(), task);
        if !slot.reflection.is_empty() {
            println_colored!(DIM, "           {}", slot.reflection);
        }
    }
    println!();
    Ok(())
}

// ─── Stats ───────────────────────────────────────────────────────────────────

pub fn handle_stats(conn: &Connection, week: bool, json: bool) -> Result<()> {
    let arc = load_current(conn)?;
    let profile = ProfileRepo::load(conn)?;

    let day = arc.current_day;
    let full = engine::full_days_count(&arc.days);
    let missed = engine::missed_days_so_far(&arc.days, day);
    let heat = engine::identity_heat(&arc.days, day);
    let rate = engine::recent_completion_rate(&arc.days, day, engine::RATE_WINDOW);
    let weakest = engine::weakest_pillar(&arc.days);

    if json {
        let out = serde_json::json!({
            "day": day,
            "streak": arc.streak,
            "full_days": full,
            "required_full_days": engine::required_full_days(),
            "completion_percent": engine::completion_percent(&arc.days),
            "missed_days": missed,
            "consecutive_misses": engine::consecutive_misses_so_far(&arc.days, day),
            "recent_completion_rate": rate,
            "identity_heat": heat,
            "weakest_pillar": weakest.map(|p| p.as_str()),
            "status": arc.status.as_str(),
            "arcs_completed": profile.arcs_completed,
            "momentum_points": profile.momentum_points,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println_colored!(EMBER, "  Statistics");
    println!();
    println_colored!(BOLD, "  Day:         {} of {}", day, ARC_LENGTH);
    println_colored!(BOLD, "  Streak:      {} full days", arc.streak);
    println!(
        "  Full days:   {} of {} required ({})",
        full,
        engine::required_full_days(),
        format_percent(engine::completion_percent(&arc.days))
    );
    println!("  Recent rate: {:.2} over last {} days", rate, engine::RATE_WINDOW);
    println!("  Heat:        {:.2}", heat.value);
    if let Some(p) = weakest {
        println!("  Weakest:     {}", p);
    }
    if missed > 0 {
        println_colored!(AMBER, "  Missed:      {} days", missed);
    }
    println_colored!(
        DIM,
        "  Lifetime:    {} arcs completed, {} momentum points",
        profile.arcs_completed,
        profile.momentum_points
    );

    if week {
        println!();
        println_colored!(DIM, "  30 days  (● full, ◑ partial, ○ missed, · ahead)");
        println!();
        print!("  ");
        for number in 1..=ARC_LENGTH {
            if number > day {
                print!("{}·\x1b[0m ", DIM);
            } else if let Some(d) = arc.day(number) {
                let color = match d.completion() {
                    DayCompletion::Full => GREEN,
                    DayCompletion::Partial => AMBER,
                    DayCompletion::Missed => DIM,
                };
                print!("{}{}\x1b[0m ", color, completion_icon(d.completion()));
            } else {
                print!("{}·\x1b[0m ", DIM);
            }
            if number % 10 == 0 {
                println!();
                print!("  ");
            }
        }
        println!();
    }

    println!();
    Ok(())
}

// ─── Complete / New / Reset ──────────────────────────────────────────────────

pub fn handle_complete(conn: &Connection, config: &AppConfig) -> Result<()> {
    let arc = load_current(conn)?;
    show_reset_notice(conn)?;
    if arc.status != ArcStatus::Active {
        return Err(anyhow!("No active arc to complete"));
    }

    if engine::is_access_blocked(arc.current_day, config.access.entitled) {
        print_access_notice(arc.current_day);
        return Ok(());
    }

    let full = engine::full_days_count(&arc.days);
    if !engine::can_complete_arc(arc.current_day, full) {
        println!();
        if arc.current_day < ARC_LENGTH {
            println_colored!(
                AMBER,
                "  Not yet — day {} of {}. The arc completes on day {}.",
                arc.current_day,
                ARC_LENGTH,
                ARC_LENGTH
            );
        }
        if full < engine::required_full_days() {
            println_colored!(
                AMBER,
                "  Full days: {} of {} required.",
                full,
                engine::required_full_days()
            );
        }
        println!();
        return Ok(());
    }

    let arc_id = arc.id.ok_or_else(|| anyhow!("Arc has no id"))?;
    let rank = Rank::from_day_number(arc.current_day);
    ArcRepo::complete(conn, arc_id, rank, Local::now().naive_local())?;
    ProfileRepo::record_completed_arc(conn)?;

    let profile = ProfileRepo::load(conn)?;
    println!();
    println_colored!(GREEN, "  ✓ Arc complete — rank {}.", rank);
    println_colored!(DIM, "  {} arcs completed lifetime.", profile.arcs_completed);
    println!();
    Ok(())
}

pub fn handle_new(conn: &Connection) -> Result<()> {
    if let Some(arc) = ArcRepo::latest(conn)? {
        let arc = refresh(conn, arc)?;
        if arc.status == ArcStatus::Active {
            return Err(anyhow!(
                "An arc is already running (day {}). Finish it or use `emberarc reset`",
                arc.current_day
            ));
        }
    }

    let today = Local::now().date_naive();
    let mut arc = Arc::new(today);
    engine::update_derived(&mut arc, today);
    ArcRepo::insert(conn, &arc)?;
    println_colored!(EMBER, "  New arc started. Day 1 of {}.", ARC_LENGTH);
    Ok(())
}

pub fn handle_reset(conn: &Connection, yes: bool) -> Result<()> {
    if !yes {
        println_colored!(
            AMBER,
            "  This discards the current arc and starts over. Re-run with --yes to confirm."
        );
        return Ok(());
    }

    let arc = load_current(conn)?;
    if arc.status == ArcStatus::Active {
        let arc_id = arc.id.ok_or_else(|| anyhow!("Arc has no id"))?;
        ArcRepo::supersede(conn, arc_id)?;
    }

    let today = Local::now().date_naive();
    let mut fresh = Arc::new(today);
    engine::update_derived(&mut fresh, today);
    ArcRepo::insert(conn, &fresh)?;
    println_colored!(EMBER, "  Arc reset. Day 1 of {}.", ARC_LENGTH);
    Ok(())
}

// ─── Config ──────────────────────────────────────────────────────────────────

pub fn handle_config(config: &mut AppConfig, entitled: Option<bool>) -> Result<()> {
    if let Some(value) = entitled {
        config.access.entitled = value;
        config.save()?;
        if value {
            println_colored!(GREEN, "  ✓ Entitled. All {} days are open.", ARC_LENGTH);
        } else {
            println_colored!(
                AMBER,
                "  Entitlement removed. Days past {} are gated again.",
                engine::FREE_LIMIT_DAYS
            );
        }
        return Ok(());
    }

    println!();
    println_colored!(EMBER, "  Configuration — {}", AppConfig::config_path()?.display());
    println!();
    println!("  entitled:            {}", config.access.entitled);
    println!("  show_heat_breakdown: {}", config.display.show_heat_breakdown);
    println!("  show_week_summary:   {}", config.display.show_week_summary);
    println!();
    Ok(())
}

// ─── Export ──────────────────────────────────────────────────────────────────

pub fn handle_export(conn: &Connection) -> Result<()> {
    let arc = load_current(conn)?;
    let profile = ProfileRepo::load(conn)?;
    let day = arc.current_day;
    let full = engine::full_days_count(&arc.days);

    println!("# emberarc — Arc Summary");
    println!("# started {}", arc.start_date.format("%Y-%m-%d"));
    println!();
    println!("## Days");
    for number in 1..=day {
        if let Some(d) = arc.day(number) {
            println!(
                "  day {:>2}  {}  {}/3",
                number,
                completion_icon(d.completion()),
                d.completed_count()
            );
        }
    }
    println!();
    println!("## Summary");
    println!("  Status:     {}", arc.status.as_str());
    println!("  Day:        {} of {}", day, ARC_LENGTH);
    println!("  Streak:     {} full days", arc.streak);
    println!(
        "  Full days:  {} of {} required",
        full,
        engine::required_full_days()
    );
    println!(
        "  Missed:     {}",
        engine::missed_days_so_far(&arc.days, day)
    );
    if let Some(rank) = arc.final_rank {
        println!("  Rank:       {}", rank);
    }
    println!("  Lifetime:   {} arcs completed", profile.arcs_completed);
    Ok(())
}
