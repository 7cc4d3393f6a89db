use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::models::Day;

/// Number of days in one arc.
pub const ARC_LENGTH: u32 = 30;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("day number {0} is out of range 1..={ARC_LENGTH}")]
    DayOutOfRange(u32),
    #[error("duplicate day number {0}")]
    DuplicateDay(u32),
}

/// Explicit arc lifecycle tag. Completion is one-way; a reset supersedes the
/// arc wholesale and a fresh Active arc takes its place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArcStatus {
    Active,
    Completed,
    Reset,
}

impl ArcStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArcStatus::Active => "active",
            ArcStatus::Completed => "completed",
            ArcStatus::Reset => "reset",
        }
    }
}

impl FromStr for ArcStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ArcStatus::Active),
            "completed" => Ok(ArcStatus::Completed),
            "reset" => Ok(ArcStatus::Reset),
            _ => Err(anyhow::anyhow!("Unknown arc status: {}", s)),
        }
    }
}

/// Final rank stamped when an arc is completed, from the day number reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Spark,
    Ember,
    Blaze,
    Inferno,
}

impl Rank {
    pub fn from_day_number(day: u32) -> Rank {
        match day {
            1..=7 => Rank::Spark,
            8..=14 => Rank::Ember,
            15..=21 => Rank::Blaze,
            _ => Rank::Inferno,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Spark => "spark",
            Rank::Ember => "ember",
            Rank::Blaze => "blaze",
            Rank::Inferno => "inferno",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Rank::Spark => "Spark",
            Rank::Ember => "Ember",
            Rank::Blaze => "Blaze",
            Rank::Inferno => "Inferno",
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Rank {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spark" => Ok(Rank::Spark),
            "ember" => Ok(Rank::Ember),
            "blaze" => Ok(Rank::Blaze),
            "inferno" => Ok(Rank::Inferno),
            _ => Err(anyhow::anyhow!("Unknown rank: {}", s)),
        }
    }
}

/// One 30-day commitment cycle. `current_day` and `streak` are derived caches
/// recomputed by the engine on every state-affecting event; they are persisted
/// only as a convenience for readers that cannot run the derivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arc {
    pub id: Option<i64>,
    pub start_date: NaiveDate,
    pub status: ArcStatus,
    pub completed_at: Option<NaiveDateTime>,
    pub current_day: u32,
    pub streak: u32,
    pub final_rank: Option<Rank>,
    pub days: Vec<Day>,
}

impl Arc {
    /// A fresh Active arc with 30 empty day records.
    pub fn new(start_date: NaiveDate) -> Self {
        Self {
            id: None,
            start_date,
            status: ArcStatus::Active,
            completed_at: None,
            current_day: 1,
            streak: 0,
            final_rank: None,
            days: (1..=ARC_LENGTH).map(Day::new).collect(),
        }
    }

    /// Build an arc from existing day records, rejecting numbers outside
    /// 1..=30 and duplicates.
    pub fn with_days(start_date: NaiveDate, days: Vec<Day>) -> Result<Self, ModelError> {
        let mut seen = [false; ARC_LENGTH as usize];
        for day in &days {
            if day.number < 1 || day.number > ARC_LENGTH {
                return Err(ModelError::DayOutOfRange(day.number));
            }
            let idx = (day.number - 1) as usize;
            if seen[idx] {
                return Err(ModelError::DuplicateDay(day.number));
            }
            seen[idx] = true;
        }
        let mut arc = Self::new(start_date);
        arc.days = days;
        Ok(arc)
    }

    pub fn day(&self, number: u32) -> Option<&Day> {
        self.days.iter().find(|d| d.number == number)
    }

    pub fn day_mut(&mut self, number: u32) -> Option<&mut Day> {
        self.days.iter_mut().find(|d| d.number == number)
    }
}
