use crate::calendar::{Location, day_of_year};
use crate::engine::{Rates, Schedule};
use crate::hive::HiveConfig;
use crate::honey::HoneyParams;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Simulation configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Hive geometry and development times.
    #[serde(default)]
    pub hive: HiveConfig,
    /// Base daily rates.
    #[serde(default)]
    pub rates: Rates,
    /// Run length and external events.
    pub schedule: Schedule,
    /// Calendar, honey and supering (optional).
    pub season: Option<SeasonConfig>,
    /// Generated weather (optional, requires `season`).
    pub weather: Option<WeatherConfig>,
}

/// Seasonal extension parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeasonConfig {
    pub location: Location,
    pub start_month: u32,
    pub start_day: u32,
    pub honey: HoneyParams,
}

impl Default for SeasonConfig {
    fn default() -> Self {
        Self {
            location: Location::BaiaMare,
            start_month: 3,
            start_day: 1,
            honey: HoneyParams::default(),
        }
    }
}

/// Weather generator parameters.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeatherConfig {
    /// Climate to draw from; defaults to the season's location.
    pub location: Option<Location>,
    /// Seed for reproducible weather; random when absent.
    pub seed: Option<u64>,
}

impl SeasonConfig {
    pub fn start_day_of_year(&self) -> Result<u32> {
        day_of_year(self.start_month, self.start_day)
    }
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded and contain a serialized [`Config`].
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;
        Self::from_toml(&contents)
    }

    /// Parse and validate a [`Config`] from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.hive.validate().context("invalid hive")?;

        let num_days = self.schedule.num_days;
        check_num(num_days, 1..=100_000).context("invalid number of days")?;
        for addition in &self.schedule.frame_additions {
            check_num(addition.day, 0..num_days).context("invalid frame addition day")?;
        }
        if let Some(day) = self.schedule.queen_loss_day {
            check_num(day, 0..num_days).context("invalid queen loss day")?;
        }

        if let Some(season) = &self.season {
            season
                .start_day_of_year()
                .context("invalid season start date")?;
            season.honey.validate().context("invalid honey parameters")?;
        }
        if self.weather.is_some() && self.season.is_none() {
            bail!("weather requires a [season] table");
        }

        Ok(())
    }

    /// Climate location for the weather generator, if weather is enabled.
    pub fn weather_location(&self) -> Option<Location> {
        let weather = self.weather.as_ref()?;
        let season = self.season.as_ref()?;
        Some(weather.location.unwrap_or(season.location))
    }
}

pub fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}
