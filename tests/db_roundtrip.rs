use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use tempfile::TempDir;

use emberarc::db::migrations::run_migrations;
use emberarc::db::repository::{ArcRepo, DayRepo, MetaRepo, ProfileRepo};
use emberarc::engine;
use emberarc::models::{Arc, ArcStatus, DayCompletion, Pillar, PillarSlot, Rank};

fn open_db() -> (TempDir, Connection) {
    let dir = TempDir::new().unwrap();
    let conn = Connection::open(dir.path().join("emberarc.db")).unwrap();
    run_migrations(&conn).unwrap();
    (dir, conn)
}

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()
}

#[test]
fn migrations_are_idempotent() {
    let (_dir, conn) = open_db();
    run_migrations(&conn).unwrap();
    run_migrations(&conn).unwrap();
}

#[test]
fn arc_round_trips_with_thirty_days() {
    let (_dir, conn) = open_db();
    assert!(ArcRepo::latest(&conn).unwrap().is_none());

    let arc = Arc::new(start_date());
    let id = ArcRepo::insert(&conn, &arc).unwrap();

    let loaded = ArcRepo::latest(&conn).unwrap().unwrap();
    assert_eq!(loaded.id, Some(id));
    assert_eq!(loaded.start_date, start_date());
    assert_eq!(loaded.status, ArcStatus::Active);
    assert_eq!(loaded.days.len(), 30);
    assert!(loaded.final_rank.is_none());
    assert!(loaded.completed_at.is_none());
}

#[test]
fn pillar_updates_persist_and_derive() {
    let (_dir, conn) = open_db();
    let id = ArcRepo::insert(&conn, &Arc::new(start_date())).unwrap();

    for pillar in Pillar::all() {
        let slot = PillarSlot {
            task: format!("{} task", pillar.as_str()),
            reflection: "held the line".to_string(),
            completed: true,
        };
        DayRepo::set_pillar(&conn, id, 1, pillar, &slot).unwrap();
    }

    let loaded = ArcRepo::latest(&conn).unwrap().unwrap();
    let day = loaded.day(1).unwrap();
    assert_eq!(day.completed_count(), 3);
    assert_eq!(day.completion(), DayCompletion::Full);
    assert_eq!(day.body.task, "body task");
    assert_eq!(day.mind.reflection, "held the line");
    assert_eq!(engine::current_streak(&loaded.days, 1), 1);
}

#[test]
fn set_pillar_rejects_unknown_day() {
    let (_dir, conn) = open_db();
    let id = ArcRepo::insert(&conn, &Arc::new(start_date())).unwrap();
    let slot = PillarSlot::default();
    assert!(DayRepo::set_pillar(&conn, id, 99, Pillar::Body, &slot).is_err());
}

#[test]
fn derived_caches_persist() {
    let (_dir, conn) = open_db();
    let id = ArcRepo::insert(&conn, &Arc::new(start_date())).unwrap();
    ArcRepo::save_derived(&conn, id, 12, 5).unwrap();

    let loaded = ArcRepo::latest(&conn).unwrap().unwrap();
    assert_eq!(loaded.current_day, 12);
    assert_eq!(loaded.streak, 5);
}

#[test]
fn completion_is_one_way() {
    let (_dir, conn) = open_db();
    let id = ArcRepo::insert(&conn, &Arc::new(start_date())).unwrap();

    let at = NaiveDateTime::parse_from_str("2026-08-30 21:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
    ArcRepo::complete(&conn, id, Rank::Inferno, at).unwrap();

    let loaded = ArcRepo::latest(&conn).unwrap().unwrap();
    assert_eq!(loaded.status, ArcStatus::Completed);
    assert_eq!(loaded.final_rank, Some(Rank::Inferno));
    assert_eq!(loaded.completed_at, Some(at));

    // Superseding a completed arc is a no-op: the guard only touches Active.
    ArcRepo::supersede(&conn, id).unwrap();
    let loaded = ArcRepo::latest(&conn).unwrap().unwrap();
    assert_eq!(loaded.status, ArcStatus::Completed);
}

#[test]
fn reset_supersedes_and_new_arc_takes_over() {
    let (_dir, conn) = open_db();
    let old_id = ArcRepo::insert(&conn, &Arc::new(start_date())).unwrap();
    ArcRepo::supersede(&conn, old_id).unwrap();

    let next_start = NaiveDate::from_ymd_opt(2026, 8, 4).unwrap();
    let new_id = ArcRepo::insert(&conn, &Arc::new(next_start)).unwrap();

    let loaded = ArcRepo::latest(&conn).unwrap().unwrap();
    assert_eq!(loaded.id, Some(new_id));
    assert_eq!(loaded.status, ArcStatus::Active);
    assert_eq!(loaded.start_date, next_start);
    assert_ne!(old_id, new_id);
}

#[test]
fn profile_counters_accumulate() {
    let (_dir, conn) = open_db();
    let profile = ProfileRepo::load(&conn).unwrap();
    assert_eq!(profile.arcs_completed, 0);
    assert_eq!(profile.momentum_points, 0);

    ProfileRepo::record_completed_arc(&conn).unwrap();
    ProfileRepo::add_momentum_point(&conn).unwrap();
    ProfileRepo::add_momentum_point(&conn).unwrap();

    let profile = ProfileRepo::load(&conn).unwrap();
    assert_eq!(profile.arcs_completed, 1);
    assert_eq!(profile.momentum_points, 2);
}

#[test]
fn meta_set_get_clear() {
    let (_dir, conn) = open_db();
    assert_eq!(MetaRepo::get(&conn, "last_reset_at").unwrap(), None);
    MetaRepo::set(&conn, "last_reset_at", "2026-08-10").unwrap();
    assert_eq!(
        MetaRepo::get(&conn, "last_reset_at").unwrap().as_deref(),
        Some("2026-08-10")
    );
    MetaRepo::set(&conn, "last_reset_at", "2026-08-12").unwrap();
    assert_eq!(
        MetaRepo::get(&conn, "last_reset_at").unwrap().as_deref(),
        Some("2026-08-12")
    );
    MetaRepo::clear(&conn, "last_reset_at").unwrap();
    assert_eq!(MetaRepo::get(&conn, "last_reset_at").unwrap(), None);
}
