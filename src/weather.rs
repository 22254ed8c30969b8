//! Daily weather and its effect on foraging and brood rearing.
//!
//! [`WeatherModel`] draws a year of weather from a seeded generator; the
//! resulting [`WeatherTable`] is then a plain lookup by simulation day.

use crate::calendar::{DAYS_PER_YEAR, Location, offset_day_of_year};
use crate::config::check_num;
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::{Exp, Normal, Uniform};
use serde::{Deserialize, Serialize};

const MIN_FORAGING_TEMP: f64 = 15.0;
const MIN_BROOD_TEMP: f64 = 10.0;
const MAX_FORAGING_HOURS: f64 = 10.0;
const MAX_PRECIPITATION_MM: f64 = 50.0;
const ANNUAL_RAINY_DAYS: f64 = 120.0;

/// Weather observed on one simulation day.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct WeatherDay {
    pub day_of_year: u32,
    pub temp_min: f64,
    pub temp_max: f64,
    pub temp_avg: f64,
    pub is_rainy: bool,
    pub precipitation_mm: f64,
    pub daylight_hours: f64,
    pub useful_sunlight_hours: f64,
    pub foraging_modifier: f64,
    pub brood_rearing_modifier: f64,
}

impl WeatherDay {
    pub fn factors(&self) -> WeatherFactors {
        WeatherFactors {
            foraging: self.foraging_modifier,
            brood_rearing: self.brood_rearing_modifier,
            attrition: if self.foraging_modifier < 0.3 { 1.1 } else { 1.0 },
        }
    }
}

/// Multipliers the weather applies to one day.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct WeatherFactors {
    /// Scales nectar collection.
    pub foraging: f64,
    /// Scales egg laying.
    pub brood_rearing: f64,
    /// Scales attrition; bees still fly out in bad weather and more are lost.
    pub attrition: f64,
}

impl Default for WeatherFactors {
    fn default() -> Self {
        Self {
            foraging: 1.0,
            brood_rearing: 1.0,
            attrition: 1.0,
        }
    }
}

/// Pre-generated weather, indexed by simulation day.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct WeatherTable {
    days: Vec<WeatherDay>,
}

impl WeatherTable {
    pub fn new(days: Vec<WeatherDay>) -> Self {
        Self { days }
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn day(&self, day: usize) -> Option<&WeatherDay> {
        self.days.get(day)
    }

    /// Factors for `day`, neutral past the end of the table.
    pub fn factors(&self, day: usize) -> WeatherFactors {
        self.day(day).map(WeatherDay::factors).unwrap_or_default()
    }
}

/// Climate of a location.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Climate {
    pub name: String,
    pub latitude: f64,
    pub altitude: f64,
    pub annual_avg_temp: f64,
    pub temp_amplitude: f64,
    pub temp_daily_spread: f64,
}

impl Climate {
    pub fn for_location(location: Location) -> Self {
        let (name, latitude, altitude) = match location {
            Location::BaiaMare => ("Baia Mare", 47.66, 220.0),
            Location::Chiuzbaia => ("Chiuzbaia", 47.60, 575.0),
        };
        Self {
            name: name.to_string(),
            latitude,
            altitude,
            annual_avg_temp: 8.5,
            temp_amplitude: 22.0,
            temp_daily_spread: 8.0,
        }
    }

    /// Seasonal mean temperature for a day of year, corrected for altitude.
    pub fn seasonal_temp(&self, day_of_year: u32) -> f64 {
        let phase = (360.0 / 365.0 * (f64::from(day_of_year) - 105.0)).to_radians();
        let altitude_correction = -self.altitude / 100.0 * 0.6;
        self.annual_avg_temp + self.temp_amplitude * phase.sin() + altitude_correction
    }
}

/// Seeded weather generator.
pub struct WeatherModel {
    climate: Climate,
    start_day_of_year: u32,
    rng: ChaCha12Rng,
}

impl WeatherModel {
    /// Create a generator starting on `start_day_of_year`.
    ///
    /// Without a seed the generator is seeded from the operating system.
    pub fn new(climate: Climate, start_day_of_year: u32, seed: Option<u64>) -> Result<Self> {
        check_num(start_day_of_year, 1..=DAYS_PER_YEAR).context("invalid start day of year")?;

        let rng = match seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::try_from_os_rng().context("failed to seed weather rng")?,
        };
        Ok(Self {
            climate,
            start_day_of_year,
            rng,
        })
    }

    /// Draw the weather of the next `num_days` days.
    pub fn generate(&mut self, num_days: usize) -> Result<WeatherTable> {
        let temp_noise_dist = Normal::new(0.0, 2.0)?;
        let spread_noise_dist = Normal::new(0.0, 1.5)?;
        let precipitation_dist = Exp::<f64>::new(1.0 / 8.0)?;
        let cloud_cover_dist = Uniform::new(0.1, 0.4)?;

        let mut days = Vec::with_capacity(num_days);
        for day in 0..num_days {
            let day_of_year = offset_day_of_year(self.start_day_of_year, day);

            let temp_avg =
                self.climate.seasonal_temp(day_of_year) + temp_noise_dist.sample(&mut self.rng);
            let spread = self.climate.temp_daily_spread + spread_noise_dist.sample(&mut self.rng);
            let temp_min = temp_avg - spread / 2.0;
            let temp_max = temp_avg + spread / 2.0;

            let is_rainy = self.rng.random::<f64>() < rain_probability(day_of_year);
            let precipitation_mm = if is_rainy {
                precipitation_dist
                    .sample(&mut self.rng)
                    .min(MAX_PRECIPITATION_MM)
            } else {
                0.0
            };

            let daylight_hours = day_length(self.climate.latitude, day_of_year);
            let cloud_cover = if is_rainy {
                0.7
            } else {
                cloud_cover_dist.sample(&mut self.rng)
            };
            let useful_sunlight_hours = useful_sunlight(daylight_hours, cloud_cover);

            days.push(WeatherDay {
                day_of_year,
                temp_min,
                temp_max,
                temp_avg,
                is_rainy,
                precipitation_mm,
                daylight_hours,
                useful_sunlight_hours,
                foraging_modifier: foraging_modifier(
                    temp_avg,
                    temp_max,
                    is_rainy,
                    useful_sunlight_hours,
                ),
                brood_rearing_modifier: brood_rearing_modifier(temp_avg),
            });
        }

        log::info!(
            "generated {num_days} days of {} weather, {} rainy",
            self.climate.name,
            days.iter().filter(|day| day.is_rainy).count()
        );

        Ok(WeatherTable::new(days))
    }
}

fn rain_probability(day_of_year: u32) -> f64 {
    let season_factor = match day_of_year {
        60..152 => 1.2,
        152..244 => 1.3,
        244..335 => 1.1,
        _ => 0.8,
    };
    ANNUAL_RAINY_DAYS / 365.0 * season_factor
}

/// Hours between sunrise and sunset.
pub fn day_length(latitude: f64, day_of_year: u32) -> f64 {
    let declination =
        23.45 * (360.0 / 365.0 * (f64::from(day_of_year) - 81.0)).to_radians().sin();
    let cos_hour_angle =
        (-latitude.to_radians().tan() * declination.to_radians().tan()).clamp(-1.0, 1.0);
    2.0 / 15.0 * cos_hour_angle.acos().to_degrees()
}

/// Hours bees can forage: the middle of the day, shortened by clouds.
pub fn useful_sunlight(daylight_hours: f64, cloud_cover: f64) -> f64 {
    (daylight_hours * 0.7 * (1.0 - cloud_cover * 0.4)).min(MAX_FORAGING_HOURS)
}

/// Foraging activity in `[0, 1]`.
pub fn foraging_modifier(temp_avg: f64, temp_max: f64, is_rainy: bool, useful_sun: f64) -> f64 {
    if is_rainy {
        return 0.0;
    }

    let temp_modifier = if temp_max < MIN_FORAGING_TEMP {
        0.0
    } else if temp_max < 18.0 {
        (temp_max - MIN_FORAGING_TEMP) / 3.0 * 0.5
    } else if temp_avg < 20.0 {
        0.5 + (temp_avg - 18.0) / 2.0 * 0.3
    } else if temp_avg <= 30.0 {
        1.0
    } else {
        (1.0 - (temp_avg - 30.0) / 10.0 * 0.2).max(0.8)
    };
    let sunlight_modifier = (useful_sun / MAX_FORAGING_HOURS).min(1.0);

    (temp_modifier * sunlight_modifier).clamp(0.0, 1.0)
}

/// Brood rearing activity in `[0, 1]`; the queen stops laying in the cold.
pub fn brood_rearing_modifier(temp_avg: f64) -> f64 {
    if temp_avg < MIN_BROOD_TEMP {
        0.0
    } else if temp_avg < 12.0 {
        (temp_avg - MIN_BROOD_TEMP) / 2.0 * 0.3
    } else if temp_avg < 15.0 {
        0.3 + (temp_avg - 12.0) / 3.0 * 0.4
    } else {
        1.0
    }
}
