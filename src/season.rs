use crate::calendar::{Calendar, DAYS_PER_YEAR, date_label, next_day_of_year};
use crate::engine::{Engine, Schedule};
use crate::honey::{HoneyLedger, supering_recommendation};
use crate::model::{DailyRecord, SeasonDay};
use crate::weather::{WeatherFactors, WeatherTable};

/// Calendar driven simulation.
///
/// Wraps an [`Engine`] and, each day, scales its base rates by the calendar
/// and weather before calling the unmodified daily step. Honey is booked
/// from the step's results afterwards.
pub struct SeasonalSim {
    engine: Engine,
    calendar: Calendar,
    weather: Option<WeatherTable>,
    ledger: HoneyLedger,
    day_of_year: u32,
}

impl SeasonalSim {
    pub fn new(
        engine: Engine,
        calendar: Calendar,
        weather: Option<WeatherTable>,
        ledger: HoneyLedger,
        start_day_of_year: u32,
    ) -> Self {
        assert!(
            (1..=DAYS_PER_YEAR).contains(&start_day_of_year),
            "start day of year must be in 1..={DAYS_PER_YEAR}, but is {start_day_of_year}"
        );
        Self {
            engine,
            calendar,
            weather,
            ledger,
            day_of_year: start_day_of_year,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn ledger(&self) -> &HoneyLedger {
        &self.ledger
    }

    /// Day of year of the next day to simulate.
    pub fn day_of_year(&self) -> u32 {
        self.day_of_year
    }

    pub fn advance_one_day(&mut self) -> DailyRecord {
        let day = self.engine.day();
        let factors = self.calendar.daily_factors(self.day_of_year);
        let weather_day = self
            .weather
            .as_ref()
            .and_then(|weather| weather.day(day))
            .cloned();
        let weather_factors = weather_day
            .as_ref()
            .map(|weather| weather.factors())
            .unwrap_or_default();

        let rates = self.engine.rates();
        let egg_rate = scale_rate(
            rates.egg_laying,
            factors.egg_rate_modifier * weather_factors.brood_rearing,
        );
        let attrition = scale_rate(
            rates.attrition,
            factors.attrition_modifier * weather_factors.attrition,
        );

        let mut record = self.engine.advance_one_day(egg_rate, attrition);

        let honey = self.ledger.settle(
            record.adult_bees,
            record.total_brood,
            effective_nectar(factors.nectar, &weather_factors),
        );
        let supering = supering_recommendation(
            &self.calendar,
            self.day_of_year,
            &factors,
            record.brood_occupancy_pct,
            honey.stores_kg,
        );
        if let Some(supering) = &supering {
            log::info!("day {day} ({}): {supering}", date_label(self.day_of_year));
        }

        record.season = Some(SeasonDay {
            day_of_year: self.day_of_year,
            date: date_label(self.day_of_year),
            active_flows: factors.active_flows,
            nectar_availability: factors.nectar,
            pollen_availability: factors.pollen,
            egg_rate_modifier: factors.egg_rate_modifier,
            attrition_modifier: factors.attrition_modifier,
            weather: weather_day,
            honey,
            supering,
        });

        self.day_of_year = next_day_of_year(self.day_of_year);

        record
    }

    /// Run the schedule, applying its events before each day's step.
    pub fn run(&mut self, schedule: &Schedule) -> Vec<DailyRecord> {
        let mut records = Vec::with_capacity(schedule.num_days);
        for _ in 0..schedule.num_days {
            schedule.apply_events(&mut self.engine);

            let record = self.advance_one_day();
            if let Some(season) = record.season.as_ref().filter(|_| record.day % 30 == 0) {
                log::info!(
                    "day {:3} ({}): adult bees {:6}, brood {:6}, occupancy {:5.1}%, honey {:5.1} kg",
                    record.day,
                    season.date,
                    record.adult_bees,
                    record.total_brood,
                    record.brood_occupancy_pct,
                    season.honey.stores_kg
                );
            }
            records.push(record);
        }
        records
    }
}

/// Base rate times modifier, floored and never negative.
pub fn scale_rate(base: u64, modifier: f64) -> u64 {
    (base as f64 * modifier).max(0.0).floor() as u64
}

fn effective_nectar(nectar: f64, weather: &WeatherFactors) -> f64 {
    nectar * weather.foraging
}
