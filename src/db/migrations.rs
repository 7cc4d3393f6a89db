use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS arcs (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            start_date   TEXT NOT NULL,
            status       TEXT NOT NULL DEFAULT 'active'
                         CHECK(status IN ('active','completed','reset')),
            completed_at TEXT,
            current_day  INTEGER NOT NULL DEFAULT 1,
            streak       INTEGER NOT NULL DEFAULT 0,
            final_rank   TEXT CHECK(final_rank IN ('spark','ember','blaze','inferno')),
            created_at   TEXT DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS arc_days (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            arc_id           INTEGER NOT NULL REFERENCES arcs(id) ON DELETE CASCADE,
            number           INTEGER NOT NULL CHECK(number BETWEEN 1 AND 30),
            body_task        TEXT NOT NULL DEFAULT '',
            body_reflection  TEXT NOT NULL DEFAULT '',
            body_done        INTEGER NOT NULL DEFAULT 0,
            mind_task        TEXT NOT NULL DEFAULT '',
            mind_reflection  TEXT NOT NULL DEFAULT '',
            mind_done        INTEGER NOT NULL DEFAULT 0,
            focus_task       TEXT NOT NULL DEFAULT '',
            focus_reflection TEXT NOT NULL DEFAULT '',
            focus_done       INTEGER NOT NULL DEFAULT 0,
            UNIQUE(arc_id, number)
        );

        CREATE TABLE IF NOT EXISTS profile (
            id              INTEGER PRIMARY KEY CHECK(id = 1),
            arcs_completed  INTEGER NOT NULL DEFAULT 0,
            momentum_points INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS app_meta (
            key   TEXT PRIMARY KEY,
            value TEXT
        );
    ")?;

    // Single profile row, created once.
    conn.execute("INSERT OR IGNORE INTO profile (id) VALUES (1)", [])?;
    Ok(())
}
