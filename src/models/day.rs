use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The three daily task slots: physical, mental, directional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pillar {
    Body,
    Mind,
    Focus,
}

impl Pillar {
    /// Fixed preference order; tie-breaks resolve to the earliest entry.
    pub fn all() -> [Pillar; 3] {
        [Pillar::Body, Pillar::Mind, Pillar::Focus]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Pillar::Body => "body",
            Pillar::Mind => "mind",
            Pillar::Focus => "focus",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Pillar::Body => "Body",
            Pillar::Mind => "Mind",
            Pillar::Focus => "Focus",
        }
    }
}

impl std::fmt::Display for Pillar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Pillar {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "body" => Ok(Pillar::Body),
            "mind" => Ok(Pillar::Mind),
            "focus" => Ok(Pillar::Focus),
            _ => Err(anyhow::anyhow!("Unknown pillar: {}", s)),
        }
    }
}

/// Completion tier for a day: all three pillars / some / none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayCompletion {
    Missed,
    Partial,
    Full,
}

impl DayCompletion {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayCompletion::Missed => "missed",
            DayCompletion::Partial => "partial",
            DayCompletion::Full => "full",
        }
    }

    /// Score used by the recent completion rate: Full=1, Partial=0.5, Missed=0.
    pub fn score(&self) -> f64 {
        match self {
            DayCompletion::Full => 1.0,
            DayCompletion::Partial => 0.5,
            DayCompletion::Missed => 0.0,
        }
    }
}

impl FromStr for DayCompletion {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "missed" => Ok(DayCompletion::Missed),
            "partial" => Ok(DayCompletion::Partial),
            "full" => Ok(DayCompletion::Full),
            _ => Err(anyhow::anyhow!("Unknown day completion: {}", s)),
        }
    }
}

/// One pillar's slot on a given day: chosen task, reflection note, done flag.
/// An empty task label means "not chosen yet".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PillarSlot {
    pub task: String,
    pub reflection: String,
    pub completed: bool,
}

/// One day's record within an arc. `number` is 1..=30 and immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Day {
    pub id: Option<i64>,
    pub number: u32,
    pub body: PillarSlot,
    pub mind: PillarSlot,
    pub focus: PillarSlot,
}

impl Day {
    pub fn new(number: u32) -> Self {
        Self {
            id: None,
            number,
            body: PillarSlot::default(),
            mind: PillarSlot::default(),
            focus: PillarSlot::default(),
        }
    }

    pub fn slot(&self, pillar: Pillar) -> &PillarSlot {
        match pillar {
            Pillar::Body => &self.body,
            Pillar::Mind => &self.mind,
            Pillar::Focus => &self.focus,
        }
    }

    /// Set one pillar's slot, normalizing the free text: task trimmed,
    /// reflection newlines flattened to spaces then trimmed.
    pub fn set_pillar(&mut self, pillar: Pillar, task: &str, reflection: &str, completed: bool) {
        let task = task.trim().to_string();
        let reflection = reflection
            .replace(['\n', '\r'], " ")
            .trim()
            .to_string();

        let slot = match pillar {
            Pillar::Body => &mut self.body,
            Pillar::Mind => &mut self.mind,
            Pillar::Focus => &mut self.focus,
        };
        slot.task = task;
        slot.reflection = reflection;
        slot.completed = completed;
    }

    pub fn completed_count(&self) -> u32 {
        [&self.body, &self.mind, &self.focus]
            .iter()
            .filter(|s| s.completed)
            .count() as u32
    }

    pub fn completion(&self) -> DayCompletion {
        match self.completed_count() {
            3 => DayCompletion::Full,
            1 | 2 => DayCompletion::Partial,
            _ => DayCompletion::Missed,
        }
    }
}
