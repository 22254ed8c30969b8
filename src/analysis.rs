use crate::model::DailyRecord;
use crate::stats::{Accumulator, Peak};
use anyhow::{Context, Result};
use rmp_serde::decode;
use std::{
    collections::BTreeSet,
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

/// Quantity computed from a stream of daily records.
pub trait Obs {
    fn update(&mut self, record: &DailyRecord);
    fn report(&self) -> serde_json::Value;
}

pub struct AdultBees {
    acc: Accumulator,
    peak: Peak,
    last: Option<u64>,
}

impl AdultBees {
    pub fn new() -> Self {
        Self {
            acc: Accumulator::new(),
            peak: Peak::default(),
            last: None,
        }
    }
}

impl Obs for AdultBees {
    fn update(&mut self, record: &DailyRecord) {
        let adult_bees = record.adult_bees as f64;
        self.acc.add(adult_bees);
        self.peak.add(record.day, adult_bees);
        self.last = Some(record.adult_bees);
    }

    fn report(&self) -> serde_json::Value {
        serde_json::json!({
            "adult_bees": {
                "stats": self.acc.report(),
                "peak": self.peak,
                "final": self.last,
            }
        })
    }
}

pub struct Brood {
    peak: Peak,
    occupancy: Accumulator,
    last: Option<u64>,
}

impl Brood {
    pub fn new() -> Self {
        Self {
            peak: Peak::default(),
            occupancy: Accumulator::new(),
            last: None,
        }
    }
}

impl Obs for Brood {
    fn update(&mut self, record: &DailyRecord) {
        self.peak.add(record.day, record.total_brood as f64);
        self.occupancy.add(record.brood_occupancy_pct);
        self.last = Some(record.total_brood);
    }

    fn report(&self) -> serde_json::Value {
        serde_json::json!({
            "brood": {
                "peak": self.peak,
                "final": self.last,
                "occupancy_pct": self.occupancy.report(),
            }
        })
    }
}

/// Daily egg laying, emergence and mortality.
pub struct Turnover {
    eggs_laid: Accumulator,
    bees_emerged: Accumulator,
    bees_died: Accumulator,
    days_without_laying: usize,
}

impl Turnover {
    pub fn new() -> Self {
        Self {
            eggs_laid: Accumulator::new(),
            bees_emerged: Accumulator::new(),
            bees_died: Accumulator::new(),
            days_without_laying: 0,
        }
    }
}

impl Obs for Turnover {
    fn update(&mut self, record: &DailyRecord) {
        self.eggs_laid.add(record.eggs_laid as f64);
        self.bees_emerged.add(record.bees_emerged as f64);
        self.bees_died.add(record.bees_died as f64);
        if record.eggs_laid == 0 {
            self.days_without_laying += 1;
        }
    }

    fn report(&self) -> serde_json::Value {
        serde_json::json!({
            "turnover": {
                "eggs_laid": self.eggs_laid.report(),
                "bees_emerged": self.bees_emerged.report(),
                "bees_died": self.bees_died.report(),
                "days_without_laying": self.days_without_laying,
            }
        })
    }
}

pub struct Events {
    descriptions: Vec<(usize, String)>,
}

impl Events {
    pub fn new() -> Self {
        Self {
            descriptions: Vec::new(),
        }
    }
}

impl Obs for Events {
    fn update(&mut self, record: &DailyRecord) {
        for event in &record.events {
            self.descriptions
                .push((event.day, event.description.clone()));
        }
    }

    fn report(&self) -> serde_json::Value {
        let events: Vec<_> = self
            .descriptions
            .iter()
            .map(|(day, description)| serde_json::json!({ "day": day, "description": description }))
            .collect();
        serde_json::json!({ "events": events })
    }
}

/// Honey balance and supering advice of seasonal runs.
pub struct Honey {
    production: Accumulator,
    consumption: Accumulator,
    stores_peak: Peak,
    final_stores: Option<f64>,
    supering_days: Vec<usize>,
    flows: BTreeSet<String>,
}

impl Honey {
    pub fn new() -> Self {
        Self {
            production: Accumulator::new(),
            consumption: Accumulator::new(),
            stores_peak: Peak::default(),
            final_stores: None,
            supering_days: Vec::new(),
            flows: BTreeSet::new(),
        }
    }
}

impl Obs for Honey {
    fn update(&mut self, record: &DailyRecord) {
        let Some(season) = &record.season else {
            return;
        };
        self.production.add(season.honey.production_kg);
        self.consumption.add(season.honey.consumption_kg);
        self.stores_peak.add(record.day, season.honey.stores_kg);
        self.final_stores = Some(season.honey.stores_kg);
        if season.supering.is_some() {
            self.supering_days.push(record.day);
        }
        self.flows.extend(season.active_flows.iter().cloned());
    }

    fn report(&self) -> serde_json::Value {
        if self.final_stores.is_none() {
            return serde_json::json!({ "honey": null });
        }
        let produced_kg = self.production.report().sum;
        let consumed_kg = self.consumption.report().sum;
        serde_json::json!({
            "honey": {
                "produced_kg": produced_kg,
                "consumed_kg": consumed_kg,
                "net_kg": produced_kg - consumed_kg,
                "stores_peak": self.stores_peak,
                "final_stores_kg": self.final_stores,
                "supering_days": self.supering_days,
                "flows": self.flows,
            }
        })
    }
}

pub struct Analyzer {
    obs_ptr_vec: Vec<Box<dyn Obs>>,
}

impl Analyzer {
    pub fn new() -> Self {
        let obs_ptr_vec: Vec<Box<dyn Obs>> = vec![
            Box::new(AdultBees::new()),
            Box::new(Brood::new()),
            Box::new(Turnover::new()),
            Box::new(Events::new()),
            Box::new(Honey::new()),
        ];
        Self { obs_ptr_vec }
    }

    pub fn add_record(&mut self, record: &DailyRecord) {
        for obs in &mut self.obs_ptr_vec {
            obs.update(record);
        }
    }

    /// Read `n_records` records from a trajectory file.
    pub fn add_file<P: AsRef<Path>>(&mut self, file: P, n_records: usize) -> Result<()> {
        let file = file.as_ref();
        let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
        let mut reader = BufReader::new(file);

        for i_record in 0..n_records {
            let record: DailyRecord = decode::from_read(&mut reader)
                .with_context(|| format!("failed to read record {i_record}"))?;
            self.add_record(&record);
        }
        Ok(())
    }

    pub fn report(&self) -> Vec<serde_json::Value> {
        self.obs_ptr_vec.iter().map(|obs| obs.report()).collect()
    }

    pub fn save_results<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let writer = BufWriter::new(file);

        serde_json::to_writer_pretty(writer, &self.report())
            .context("failed to serialize results")?;
        Ok(())
    }
}
