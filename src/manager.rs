use crate::analysis::Analyzer;
use crate::config::Config;
use crate::engine::Engine;
use crate::honey::HoneyLedger;
use crate::model::DailyRecord;
use crate::season::SeasonalSim;
use crate::weather::{Climate, WeatherModel};
use anyhow::{Context, Result};
use glob::glob;
use rmp_serde::encode;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Simulation directory holding `config.toml` and one directory per run.
pub struct Manager {
    sim_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(sim_dir: P) -> Result<Self> {
        let sim_dir = sim_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(sim_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { sim_dir, cfg })
    }

    pub fn create_run(&self) -> Result<()> {
        let run_idx = self.count_run_dirs().context("failed to count run dirs")?;

        let run_dir = self.run_dir(run_idx);
        fs::create_dir_all(&run_dir).with_context(|| format!("failed to create {run_dir:?}"))?;
        log::info!("created {run_dir:?}");

        let records = simulate(&self.cfg).context("failed to run simulation")?;

        let trajectory_file = self.trajectory_file(run_idx);
        write_trajectory(&trajectory_file, &records)
            .with_context(|| format!("failed to write {trajectory_file:?}"))?;
        log::info!("wrote {} records to {trajectory_file:?}", records.len());

        Ok(())
    }

    pub fn analyze_sim(&self) -> Result<()> {
        let n_runs = self.count_run_dirs().context("failed to count run dirs")?;
        for run_idx in 0..n_runs {
            let mut analyzer = Analyzer::new();

            analyzer
                .add_file(self.trajectory_file(run_idx), self.cfg.schedule.num_days)
                .context("failed to add file")?;

            let results_file = self.results_file(run_idx);
            analyzer
                .save_results(&results_file)
                .context("failed to save results")?;
            log::info!("wrote {results_file:?}");
        }

        Ok(())
    }

    pub fn clean_sim(&self) -> Result<()> {
        let n_runs = self.count_run_dirs().context("failed to count run dirs")?;
        for run_idx in 0..n_runs {
            let run_dir = self.run_dir(run_idx);
            fs::remove_dir_all(&run_dir)
                .with_context(|| format!("failed to remove {run_dir:?}"))?;
            log::info!("removed {run_dir:?}");
        }

        Ok(())
    }

    fn count_run_dirs(&self) -> Result<usize> {
        let pattern = self.sim_dir.join("run-*");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let count = glob(pattern)
            .context("failed to glob run dirs")?
            .filter_map(Result::ok)
            .filter(|p| p.is_dir())
            .count();
        Ok(count)
    }

    fn run_dir(&self, run_idx: usize) -> PathBuf {
        self.sim_dir.join(format!("run-{run_idx:04}"))
    }

    fn trajectory_file(&self, run_idx: usize) -> PathBuf {
        self.run_dir(run_idx).join("trajectory.msgpack")
    }

    fn results_file(&self, run_idx: usize) -> PathBuf {
        self.run_dir(run_idx).join("results.json")
    }
}

/// Run the simulation a configuration describes.
///
/// Uses the seasonal simulation when the configuration has a `[season]`
/// table and draws fresh weather when it has a `[weather]` table.
pub fn simulate(cfg: &Config) -> Result<Vec<DailyRecord>> {
    let mut engine = Engine::new(cfg.hive.clone(), cfg.rates.clone())
        .context("failed to construct engine")?;

    let Some(season) = &cfg.season else {
        return Ok(engine.run(&cfg.schedule));
    };

    let start_day_of_year = season.start_day_of_year()?;
    let weather = match cfg.weather_location() {
        Some(location) => {
            let seed = cfg.weather.as_ref().and_then(|weather| weather.seed);
            let mut model = WeatherModel::new(Climate::for_location(location), start_day_of_year, seed)
                .context("failed to construct weather model")?;
            let table = model
                .generate(cfg.schedule.num_days)
                .context("failed to generate weather")?;
            Some(table)
        }
        None => None,
    };

    let mut sim = SeasonalSim::new(
        engine,
        season.location.calendar(),
        weather,
        HoneyLedger::new(season.honey.clone()),
        start_day_of_year,
    );
    Ok(sim.run(&cfg.schedule))
}

fn write_trajectory(file: &Path, records: &[DailyRecord]) -> Result<()> {
    let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    let mut writer = BufWriter::new(file);

    for record in records {
        encode::write(&mut writer, record).context("failed to serialize record")?;
    }

    writer.flush().context("failed to flush writer stream")?;

    Ok(())
}
