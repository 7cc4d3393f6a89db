use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};
use std::str::FromStr;

use crate::models::{Arc, ArcStatus, Day, Pillar, PillarSlot, Profile, Rank};

const DATE_FMT: &str = "%Y-%m-%d";
const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FMT).map_err(|e| anyhow!("Bad date '{}': {}", s, e))
}

// ─── Arc repo ────────────────────────────────────────────────────────────────

pub struct ArcRepo;

impl ArcRepo {
    /// Most recent arc regardless of status, with its day records attached.
    pub fn latest(conn: &Connection) -> Result<Option<Arc>> {
        let row = conn
            .query_row(
                "SELECT id, start_date, status, completed_at, current_day, streak, final_rank
                 FROM arcs ORDER BY id DESC LIMIT 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, i64>(5)?,
                        row.get::<_, Option<String>>(6)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, start_date, status, completed_at, current_day, streak, final_rank)) = row
        else {
            return Ok(None);
        };

        let completed_at = completed_at
            .map(|s| {
                NaiveDateTime::parse_from_str(&s, DATETIME_FMT)
                    .map_err(|e| anyhow!("Bad timestamp '{}': {}", s, e))
            })
            .transpose()?;
        let final_rank = final_rank.map(|s| Rank::from_str(&s)).transpose()?;

        let days = Self::days_for(conn, id)?;
        let mut arc = Arc::with_days(parse_date(&start_date)?, days)?;
        arc.id = Some(id);
        arc.status = ArcStatus::from_str(&status)?;
        arc.completed_at = completed_at;
        arc.current_day = current_day as u32;
        arc.streak = streak as u32;
        arc.final_rank = final_rank;
        Ok(Some(arc))
    }

    fn days_for(conn: &Connection, arc_id: i64) -> Result<Vec<Day>> {
        let mut stmt = conn.prepare(
            "SELECT id, number,
                    body_task, body_reflection, body_done,
                    mind_task, mind_reflection, mind_done,
                    focus_task, focus_reflection, focus_done
             FROM arc_days WHERE arc_id = ?1 ORDER BY number",
        )?;

        let rows = stmt.query_map(params![arc_id], |row| {
            Ok(Day {
                id: Some(row.get::<_, i64>(0)?),
                number: row.get::<_, i64>(1)? as u32,
                body: PillarSlot {
                    task: row.get(2)?,
                    reflection: row.get(3)?,
                    completed: row.get::<_, i64>(4)? != 0,
                },
                mind: PillarSlot {
                    task: row.get(5)?,
                    reflection: row.get(6)?,
                    completed: row.get::<_, i64>(7)? != 0,
                },
                focus: PillarSlot {
                    task: row.get(8)?,
                    reflection: row.get(9)?,
                    completed: row.get::<_, i64>(10)? != 0,
                },
            })
        })?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    /// Insert a brand-new arc with all of its day records. Returns the row id.
    pub fn insert(conn: &Connection, arc: &Arc) -> Result<i64> {
        conn.execute(
            "INSERT INTO arcs (start_date, status, current_day, streak)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                arc.start_date.format(DATE_FMT).to_string(),
                arc.status.as_str(),
                arc.current_day,
                arc.streak,
            ],
        )?;
        let id = conn.last_insert_rowid();

        for day in &arc.days {
            conn.execute(
                "INSERT INTO arc_days (arc_id, number,
                    body_task, body_reflection, body_done,
                    mind_task, mind_reflection, mind_done,
                    focus_task, focus_reflection, focus_done)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    id,
                    day.number,
                    day.body.task,
                    day.body.reflection,
                    day.body.completed as i32,
                    day.mind.task,
                    day.mind.reflection,
                    day.mind.completed as i32,
                    day.focus.task,
                    day.focus.reflection,
                    day.focus.completed as i32,
                ],
            )?;
        }
        log::debug!("inserted arc {} starting {}", id, arc.start_date);
        Ok(id)
    }

    /// Persist the derived caches after an engine refresh.
    pub fn save_derived(conn: &Connection, arc_id: i64, current_day: u32, streak: u32) -> Result<()> {
        conn.execute(
            "UPDATE arcs SET current_day = ?1, streak = ?2 WHERE id = ?3",
            params![current_day, streak, arc_id],
        )?;
        Ok(())
    }

    /// One-way transition to Completed, stamping the final rank and timestamp.
    pub fn complete(
        conn: &Connection,
        arc_id: i64,
        rank: Rank,
        completed_at: NaiveDateTime,
    ) -> Result<()> {
        conn.execute(
            "UPDATE arcs SET status = 'completed', completed_at = ?1, final_rank = ?2
             WHERE id = ?3 AND status = 'active'",
            params![
                completed_at.format(DATETIME_FMT).to_string(),
                rank.as_str(),
                arc_id
            ],
        )?;
        Ok(())
    }

    /// Mark an arc superseded by a reset. Its day records stay queryable.
    pub fn supersede(conn: &Connection, arc_id: i64) -> Result<()> {
        conn.execute(
            "UPDATE arcs SET status = 'reset' WHERE id = ?1 AND status = 'active'",
            params![arc_id],
        )?;
        log::debug!("arc {} superseded by reset", arc_id);
        Ok(())
    }
}

// ─── Day repo ────────────────────────────────────────────────────────────────

pub struct DayRepo;

impl DayRepo {
    /// Write one pillar's slot on a day record.
    pub fn set_pillar(
        conn: &Connection,
        arc_id: i64,
        number: u32,
        pillar: Pillar,
        slot: &PillarSlot,
    ) -> Result<()> {
        let sql = match pillar {
            Pillar::Body => {
                "UPDATE arc_days SET body_task = ?1, body_reflection = ?2, body_done = ?3
                 WHERE arc_id = ?4 AND number = ?5"
            }
            Pillar::Mind => {
                "UPDATE arc_days SET mind_task = ?1, mind_reflection = ?2, mind_done = ?3
                 WHERE arc_id = ?4 AND number = ?5"
            }
            Pillar::Focus => {
                "UPDATE arc_days SET focus_task = ?1, focus_reflection = ?2, focus_done = ?3
                 WHERE arc_id = ?4 AND number = ?5"
            }
        };
        let changed = conn.execute(
            sql,
            params![slot.task, slot.reflection, slot.completed as i32, arc_id, number],
        )?;
        if changed == 0 {
            return Err(anyhow!("No day {} in arc {}", number, arc_id));
        }
        Ok(())
    }
}

// ─── Profile repo ────────────────────────────────────────────────────────────

pub struct ProfileRepo;

impl ProfileRepo {
    pub fn load(conn: &Connection) -> Result<Profile> {
        conn.query_row(
            "SELECT arcs_completed, momentum_points FROM profile WHERE id = 1",
            [],
            |row| {
                Ok(Profile {
                    arcs_completed: row.get::<_, i64>(0)? as u32,
                    momentum_points: row.get::<_, i64>(1)? as u32,
                })
            },
        )
        .map_err(anyhow::Error::from)
    }

    pub fn record_completed_arc(conn: &Connection) -> Result<()> {
        conn.execute(
            "UPDATE profile SET arcs_completed = arcs_completed + 1 WHERE id = 1",
            [],
        )?;
        Ok(())
    }

    pub fn add_momentum_point(conn: &Connection) -> Result<()> {
        conn.execute(
            "UPDATE profile SET momentum_points = momentum_points + 1 WHERE id = 1",
            [],
        )?;
        Ok(())
    }
}

// ─── App meta ────────────────────────────────────────────────────────────────

pub struct MetaRepo;

impl MetaRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM app_meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO app_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn clear(conn: &Connection, key: &str) -> Result<()> {
        conn.execute("DELETE FROM app_meta WHERE key = ?1", params![key])?;
        Ok(())
    }
}
