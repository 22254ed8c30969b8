use crate::brood::BroodPipeline;
use crate::hive::{HiveConfig, max_brood_cells};
use crate::model::{DailyRecord, Event, EventKind};
use crate::queen::{QueenStatus, QueenTransition};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Base daily rates of a colony.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Rates {
    /// Eggs the queen lays per day when there is room.
    pub egg_laying: u64,
    /// Adult bees dying per day.
    pub attrition: u64,
}

impl Default for Rates {
    fn default() -> Self {
        Self {
            egg_laying: 1100,
            attrition: 300,
        }
    }
}

/// Frames added to the brood chamber on a given day.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrameAddition {
    pub day: usize,
    pub frames: u32,
}

/// Run length and the external events applied before each day's step.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Schedule {
    pub num_days: usize,
    #[serde(default)]
    pub frame_additions: Vec<FrameAddition>,
    #[serde(default)]
    pub queen_loss_day: Option<usize>,
    /// Whether the colony rears a replacement after losing its queen.
    #[serde(default = "default_queen_rearing")]
    pub queen_rearing: bool,
}

fn default_queen_rearing() -> bool {
    true
}

impl Schedule {
    pub fn new(num_days: usize) -> Self {
        Self {
            num_days,
            frame_additions: Vec::new(),
            queen_loss_day: None,
            queen_rearing: true,
        }
    }

    pub fn with_frames(mut self, day: usize, frames: u32) -> Self {
        self.frame_additions.push(FrameAddition { day, frames });
        self
    }

    pub fn with_queen_loss(mut self, day: usize) -> Self {
        self.queen_loss_day = Some(day);
        self
    }

    pub fn without_queen_rearing(mut self) -> Self {
        self.queen_rearing = false;
        self
    }

    /// Total frames scheduled for `day`.
    pub fn frames_on(&self, day: usize) -> u32 {
        self.frame_additions
            .iter()
            .filter(|addition| addition.day == day)
            .map(|addition| addition.frames)
            .sum()
    }

    /// Apply the events scheduled for the engine's current day.
    pub fn apply_events(&self, engine: &mut Engine) {
        let day = engine.day();
        let frames = self.frames_on(day);
        if frames > 0 {
            engine.add_frames(frames);
        }
        if self.queen_loss_day == Some(day) {
            if self.queen_rearing {
                engine.trigger_queen_loss();
            } else {
                engine.trigger_queen_loss_without_rearing();
            }
        }
    }
}

/// Daily colony simulation engine.
///
/// Owns the colony state and advances it one day at a time. Rates are passed
/// to every step, so callers may rescale them each day.
#[derive(Debug, Clone)]
pub struct Engine {
    cfg: HiveConfig,
    rates: Rates,

    day: usize,
    brood_frames: u32,
    adult_bees: u64,
    brood: BroodPipeline,
    queen: QueenStatus,

    events: Vec<Event>,
    first_event_today: usize,
}

impl Engine {
    /// Create a colony with a laying queen, no brood and an adult population
    /// estimated from the initial brood frames.
    pub fn new(cfg: HiveConfig, rates: Rates) -> Result<Self> {
        cfg.validate().context("invalid hive configuration")?;

        let brood = BroodPipeline::new(cfg.worker_development_days, cfg.stage_bands());
        Ok(Self {
            day: 0,
            brood_frames: cfg.initial_brood_frames,
            adult_bees: cfg.initial_adult_bees(),
            brood,
            queen: QueenStatus::Laying,
            events: Vec::new(),
            first_event_today: 0,
            cfg,
            rates,
        })
    }

    pub fn rates(&self) -> &Rates {
        &self.rates
    }

    /// Index of the next day to simulate.
    pub fn day(&self) -> usize {
        self.day
    }

    pub fn adult_bees(&self) -> u64 {
        self.adult_bees
    }

    pub fn brood_frames(&self) -> u32 {
        self.brood_frames
    }

    pub fn queen(&self) -> QueenStatus {
        self.queen
    }

    /// Every event applied so far, oldest first.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn max_brood_cells(&self) -> u64 {
        max_brood_cells(&self.cfg, self.brood_frames)
    }

    /// Share of the brood capacity currently filled, in percent.
    pub fn brood_occupancy_pct(&self) -> f64 {
        occupancy_pct(self.brood.total_count(), self.max_brood_cells())
    }

    /// Add frames to the brood chamber before today's step.
    ///
    /// Requests beyond the free slots are truncated. Returns the number of
    /// frames actually added.
    pub fn add_frames(&mut self, requested: u32) -> u32 {
        let free_slots = self.cfg.total_frames - self.brood_frames;
        let added = requested.min(free_slots);
        self.brood_frames += added;

        let description = if added < requested {
            log::warn!(
                "day {}: only {free_slots} free frame slot(s) for {requested} requested",
                self.day
            );
            format!(
                "Added {added} of {requested} requested frame(s), chamber full with {} brood frames",
                self.brood_frames
            )
        } else {
            format!(
                "Added {added} frame(s), total brood frames: {}",
                self.brood_frames
            )
        };

        let kind = EventKind::FrameAddition {
            requested,
            added,
            brood_frames: self.brood_frames,
        };
        self.log_event(kind, description);

        added
    }

    /// Lose the laying queen and start rearing a replacement today.
    ///
    /// Returns `false` when there is no laying queen to lose.
    pub fn trigger_queen_loss(&mut self) -> bool {
        self.lose_queen(true)
    }

    /// Lose the laying queen without rearing a replacement.
    pub fn trigger_queen_loss_without_rearing(&mut self) -> bool {
        self.lose_queen(false)
    }

    fn lose_queen(&mut self, rearing: bool) -> bool {
        if !self.queen.lose_queen(rearing) {
            log::warn!(
                "day {}: ignoring queen loss, queen is {}",
                self.day,
                self.queen
            );
            return false;
        }

        let description = if rearing {
            "Queen lost, emergency queen rearing started"
        } else {
            "Queen lost, no replacement reared"
        };
        self.log_event(EventKind::QueenLoss { rearing }, description.to_string());
        true
    }

    /// Advance the colony by one day with the given effective rates.
    pub fn advance_one_day(&mut self, egg_rate: u64, attrition_rate: u64) -> DailyRecord {
        // Mortality.
        let bees_died = attrition_rate.min(self.adult_bees);
        self.adult_bees -= bees_died;

        // Emergence of the oldest cohort.
        let bees_emerging = self.brood.emerging();
        self.adult_bees += bees_emerging;

        // Egg laying into the space left after emergence.
        let max_brood_cells = self.max_brood_cells();
        let eggs_laid = if self.queen.is_laying() {
            let occupied = self.brood.total_count() - bees_emerging;
            egg_rate.min(max_brood_cells.saturating_sub(occupied))
        } else {
            0
        };
        let bees_emerged = self.brood.advance(eggs_laid);
        assert_eq!(bees_emerged, bees_emerging, "emerging cohort changed");

        // Replacement queen development.
        let transition = self
            .queen
            .tick(self.cfg.queen_development_days, self.cfg.queen_replacement_days());
        match transition {
            Some(QueenTransition::Emerged) => {
                self.log_event(EventKind::QueenEmerged, "Virgin queen emerged".to_string())
            }
            Some(QueenTransition::Mated) => self.log_event(
                EventKind::QueenMated,
                "Queen mated and started laying eggs".to_string(),
            ),
            None => (),
        }

        let total_brood = self.brood.total_count();
        let record = DailyRecord {
            day: self.day,
            adult_bees: self.adult_bees,
            total_brood,
            stages: self.brood.stage_breakdown(),
            eggs_laid,
            bees_emerged,
            bees_died,
            brood_frames: self.brood_frames,
            max_brood_cells,
            brood_occupancy_pct: self.brood_occupancy_pct(),
            queen: self.queen,
            effective_egg_rate: egg_rate,
            effective_attrition: attrition_rate,
            events: self.events[self.first_event_today..].to_vec(),
            season: None,
        };
        log::debug!(
            "day {}: died {bees_died}, emerged {bees_emerged}, laid {eggs_laid}, adults {}, brood {total_brood}",
            self.day,
            self.adult_bees
        );

        self.first_event_today = self.events.len();
        self.day += 1;

        record
    }

    /// Run the schedule with the base rates.
    pub fn run(&mut self, schedule: &Schedule) -> Vec<DailyRecord> {
        let mut records = Vec::with_capacity(schedule.num_days);
        for _ in 0..schedule.num_days {
            schedule.apply_events(self);

            let record = self.advance_one_day(self.rates.egg_laying, self.rates.attrition);
            if record.day % 10 == 0 {
                log::info!(
                    "day {:3}: adult bees {:6}, brood {:6}, capacity {:6}",
                    record.day,
                    record.adult_bees,
                    record.total_brood,
                    record.max_brood_cells
                );
            }
            records.push(record);
        }
        records
    }

    fn log_event(&mut self, kind: EventKind, description: String) {
        log::info!("day {}: {description}", self.day);
        self.events.push(Event {
            day: self.day,
            kind,
            description,
        });
    }
}

/// Occupied brood cells as a percentage of capacity, 0 without capacity.
pub fn occupancy_pct(total_brood: u64, max_brood_cells: u64) -> f64 {
    if max_brood_cells == 0 {
        return 0.0;
    }
    total_brood as f64 / max_brood_cells as f64 * 100.0
}
