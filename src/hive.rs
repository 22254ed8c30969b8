use crate::config::check_num;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Physical and biological parameters of one hive.
///
/// Immutable for the lifetime of a simulation. Every field has a default,
/// so a `[hive]` table may list only the values it wants to change.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HiveConfig {
    /// Frame slots available in the brood chamber.
    pub total_frames: u32,
    /// Frames holding brood when the simulation starts.
    pub initial_brood_frames: u32,
    /// Cells on one frame.
    pub cells_per_frame: u32,
    /// Fraction of cells usable for brood (the rest hold pollen and nectar).
    pub brood_cell_utilization: f64,
    /// Adult bees per brood frame used to estimate the initial population.
    pub bees_per_frame: u64,

    /// Days from egg to emerging worker.
    pub worker_development_days: usize,
    /// Days from queen loss to an emerged virgin queen.
    pub queen_development_days: u32,
    /// Days from virgin emergence to a mated, laying queen.
    pub queen_mating_days: u32,

    /// First age (in days) counted as larva.
    pub larva_start_day: usize,
    /// First age (in days) counted as pupa.
    pub pupa_start_day: usize,
}

impl Default for HiveConfig {
    fn default() -> Self {
        Self {
            total_frames: 10,
            initial_brood_frames: 6,
            cells_per_frame: 7000,
            brood_cell_utilization: 0.85,
            bees_per_frame: 3500,
            worker_development_days: 21,
            queen_development_days: 16,
            queen_mating_days: 10,
            larva_start_day: 3,
            pupa_start_day: 8,
        }
    }
}

impl HiveConfig {
    /// Check every parameter, failing on the first invalid one.
    pub fn validate(&self) -> Result<()> {
        check_num(self.initial_brood_frames, 0..=self.total_frames)
            .context("invalid initial number of brood frames")?;
        check_num(self.cells_per_frame, 1..).context("invalid number of cells per frame")?;
        if !(self.brood_cell_utilization > 0.0 && self.brood_cell_utilization <= 1.0) {
            bail!(
                "brood cell utilization must be in (0, 1], but is {}",
                self.brood_cell_utilization
            );
        }

        check_num(self.worker_development_days, 1..)
            .context("invalid number of worker development days")?;
        check_num(self.queen_development_days, 1..)
            .context("invalid number of queen development days")?;
        check_num(self.queen_mating_days, 1..).context("invalid number of queen mating days")?;

        check_num(self.larva_start_day, 1..=self.worker_development_days)
            .context("invalid larva start day")?;
        check_num(
            self.pupa_start_day,
            self.larva_start_day..=self.worker_development_days,
        )
        .context("invalid pupa start day")?;

        Ok(())
    }

    /// Age bands used to split the brood into eggs, larvae and pupae.
    pub fn stage_bands(&self) -> StageBands {
        StageBands {
            larva_start: self.larva_start_day,
            pupa_start: self.pupa_start_day,
        }
    }

    /// Adult population estimated from the initial brood frames.
    pub fn initial_adult_bees(&self) -> u64 {
        u64::from(self.initial_brood_frames) * self.bees_per_frame
    }

    /// Days a replacement queen needs before she starts laying.
    pub fn queen_replacement_days(&self) -> u32 {
        self.queen_development_days + self.queen_mating_days
    }
}

/// Contiguous age ranges of the brood stages.
///
/// Eggs are ages `[0, larva_start)`, larvae `[larva_start, pupa_start)` and
/// pupae `[pupa_start, worker_development_days)`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub struct StageBands {
    pub larva_start: usize,
    pub pupa_start: usize,
}

impl Default for StageBands {
    fn default() -> Self {
        Self {
            larva_start: 3,
            pupa_start: 8,
        }
    }
}

/// Maximum number of cells the colony can fill with brood on `brood_frames` frames.
///
/// Frame counts are clamped where they are mutated, never here.
pub fn max_brood_cells(cfg: &HiveConfig, brood_frames: u32) -> u64 {
    let cells = u64::from(brood_frames) * u64::from(cfg.cells_per_frame);
    (cells as f64 * cfg.brood_cell_utilization).floor() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_floors_fractional_cells() {
        let cfg = HiveConfig {
            cells_per_frame: 1001,
            brood_cell_utilization: 0.5,
            ..HiveConfig::default()
        };
        assert_eq!(max_brood_cells(&cfg, 1), 500);
        assert_eq!(max_brood_cells(&cfg, 2), 1001);
        assert_eq!(max_brood_cells(&cfg, 0), 0);
    }

    #[test]
    fn default_config_is_valid() {
        let cfg = HiveConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.initial_adult_bees(), 21_000);
        assert_eq!(cfg.queen_replacement_days(), 26);
        assert_eq!(cfg.stage_bands(), StageBands::default());
    }

    #[test]
    fn rejects_invalid_parameters() {
        let invalid = [
            HiveConfig {
                cells_per_frame: 0,
                ..HiveConfig::default()
            },
            HiveConfig {
                brood_cell_utilization: 0.0,
                ..HiveConfig::default()
            },
            HiveConfig {
                brood_cell_utilization: 1.5,
                ..HiveConfig::default()
            },
            HiveConfig {
                worker_development_days: 0,
                ..HiveConfig::default()
            },
            HiveConfig {
                queen_mating_days: 0,
                ..HiveConfig::default()
            },
            HiveConfig {
                initial_brood_frames: 11,
                ..HiveConfig::default()
            },
            HiveConfig {
                larva_start_day: 9,
                ..HiveConfig::default()
            },
            HiveConfig {
                pupa_start_day: 22,
                ..HiveConfig::default()
            },
        ];
        for cfg in invalid {
            assert!(cfg.validate().is_err(), "{cfg:?} should be rejected");
        }
    }
}
