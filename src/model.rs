//! Records produced by the simulation.

use crate::brood::StageCounts;
use crate::honey::{HoneyFlow, Supering};
use crate::queen::QueenStatus;
use crate::weather::WeatherDay;
use serde::{Deserialize, Serialize};

/// Discrete change to the colony, applied before the day's step or by it.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum EventKind {
    /// Frames added to the brood chamber; `added < requested` when the chamber was full.
    FrameAddition {
        requested: u32,
        added: u32,
        brood_frames: u32,
    },
    /// The laying queen was lost; `rearing` tells whether a replacement is being raised.
    QueenLoss { rearing: bool },
    QueenEmerged,
    QueenMated,
}

/// Entry of the append-only event log.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Event {
    pub day: usize,
    pub kind: EventKind,
    pub description: String,
}

/// Snapshot of the colony at the end of one simulated day.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Simulation day, starting at 0.
    pub day: usize,

    pub adult_bees: u64,
    pub total_brood: u64,
    pub stages: StageCounts,

    pub eggs_laid: u64,
    pub bees_emerged: u64,
    pub bees_died: u64,

    pub brood_frames: u32,
    pub max_brood_cells: u64,
    /// Share of the brood capacity in use, 0 when the capacity is 0.
    pub brood_occupancy_pct: f64,

    pub queen: QueenStatus,

    /// Egg laying rate the step was given.
    pub effective_egg_rate: u64,
    /// Attrition rate the step was given.
    pub effective_attrition: u64,

    /// Events applied on this day.
    pub events: Vec<Event>,

    /// Seasonal data, present only for calendar driven runs.
    pub season: Option<SeasonDay>,
}

/// Calendar, weather and honey figures of one seasonal day.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SeasonDay {
    pub day_of_year: u32,
    pub date: String,
    pub active_flows: Vec<String>,

    pub nectar_availability: f64,
    pub pollen_availability: f64,
    pub egg_rate_modifier: f64,
    pub attrition_modifier: f64,

    pub weather: Option<WeatherDay>,

    pub honey: HoneyFlow,
    pub supering: Option<Supering>,
}
