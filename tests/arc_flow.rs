use chrono::{Duration, Local};
use rusqlite::Connection;
use tempfile::TempDir;

use emberarc::cli::handlers;
use emberarc::config::AppConfig;
use emberarc::db::migrations::run_migrations;
use emberarc::db::repository::{ArcRepo, MetaRepo, ProfileRepo};
use emberarc::models::{Arc, ArcStatus, Pillar, Rank};

fn open_db() -> (TempDir, Connection) {
    let dir = TempDir::new().unwrap();
    let conn = Connection::open(dir.path().join("emberarc.db")).unwrap();
    run_migrations(&conn).unwrap();
    (dir, conn)
}

/// An arc that started `days_ago` days before today, so handlers see a
/// predictable current day without any clock stubbing.
fn arc_started_days_ago(days_ago: i64) -> Arc {
    Arc::new(Local::now().date_naive() - Duration::days(days_ago))
}

fn fill_full(arc: &mut Arc, from: u32, to: u32) {
    for number in from..=to {
        let day = arc.day_mut(number).unwrap();
        day.set_pillar(Pillar::Body, "train", "", true);
        day.set_pillar(Pillar::Mind, "read", "", true);
        day.set_pillar(Pillar::Focus, "deep work", "", true);
    }
}

#[test]
fn complete_refused_without_entitlement() {
    let (_dir, conn) = open_db();

    // Day 30, 27 full days: completable on merit, but past the free range.
    let mut arc = arc_started_days_ago(34);
    fill_full(&mut arc, 1, 27);
    ArcRepo::insert(&conn, &arc).unwrap();

    let config = AppConfig::default();
    handlers::handle_complete(&conn, &config).unwrap();

    let loaded = ArcRepo::latest(&conn).unwrap().unwrap();
    assert_eq!(loaded.status, ArcStatus::Active);
    assert!(loaded.final_rank.is_none());
    assert_eq!(ProfileRepo::load(&conn).unwrap().arcs_completed, 0);

    let mut entitled = AppConfig::default();
    entitled.access.entitled = true;
    handlers::handle_complete(&conn, &entitled).unwrap();

    let loaded = ArcRepo::latest(&conn).unwrap().unwrap();
    assert_eq!(loaded.status, ArcStatus::Completed);
    assert_eq!(loaded.final_rank, Some(Rank::Inferno));
    assert_eq!(ProfileRepo::load(&conn).unwrap().arcs_completed, 1);
}

#[test]
fn mark_after_collapse_lands_on_fresh_arc_and_clears_notice() {
    let (_dir, conn) = open_db();

    // Nine untouched elapsed days: well past the three-miss limit.
    let stale = arc_started_days_ago(9);
    let stale_id = ArcRepo::insert(&conn, &stale).unwrap();

    let config = AppConfig::default();
    handlers::handle_mark(&conn, &config, "body", Some("train"), None, false).unwrap();

    let current = ArcRepo::latest(&conn).unwrap().unwrap();
    assert_ne!(current.id, Some(stale_id));
    assert_eq!(current.current_day, 1);
    assert!(current.day(1).unwrap().slot(Pillar::Body).completed);

    // The mark handler surfaced the reset notice, so the flag is consumed.
    assert!(MetaRepo::get(&conn, "last_reset_at").unwrap().is_none());
}

#[test]
fn repeat_marks_do_not_inflate_points() {
    let (_dir, conn) = open_db();
    ArcRepo::insert(&conn, &arc_started_days_ago(0)).unwrap();

    let config = AppConfig::default();
    handlers::handle_mark(&conn, &config, "mind", Some("read"), None, false).unwrap();
    handlers::handle_mark(&conn, &config, "mind", Some("read more"), None, false).unwrap();
    assert_eq!(ProfileRepo::load(&conn).unwrap().momentum_points, 1);

    handlers::handle_mark(&conn, &config, "mind", None, None, true).unwrap();
    handlers::handle_mark(&conn, &config, "mind", None, None, false).unwrap();
    assert_eq!(ProfileRepo::load(&conn).unwrap().momentum_points, 2);
}
