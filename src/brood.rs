use crate::hive::StageBands;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Brood counts split by development stage.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub struct StageCounts {
    pub eggs: u64,
    pub larvae: u64,
    pub pupae: u64,
}

impl StageCounts {
    pub fn total(&self) -> u64 {
        self.eggs + self.larvae + self.pupae
    }
}

/// Brood in development, one cohort per day of age.
///
/// Index 0 holds the cohort laid today and the last index the cohort that
/// emerges on the next call to [`BroodPipeline::advance`]. The number of
/// cohorts never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroodPipeline {
    cohorts: VecDeque<u64>,
    bands: StageBands,
}

impl BroodPipeline {
    /// Create an empty pipeline with `n_days` cohorts.
    pub fn new(n_days: usize, bands: StageBands) -> Self {
        assert!(n_days > 0, "pipeline must have at least one cohort");
        Self {
            cohorts: VecDeque::from(vec![0; n_days]),
            bands,
        }
    }

    /// Number of cohorts, equal to the worker development days.
    pub fn n_days(&self) -> usize {
        self.cohorts.len()
    }

    pub fn total_count(&self) -> u64 {
        self.cohorts.iter().sum()
    }

    /// Size of the cohort that emerges on the next advance.
    pub fn emerging(&self) -> u64 {
        self.cohorts.back().copied().unwrap_or(0)
    }

    pub fn stage_breakdown(&self) -> StageCounts {
        let n_days = self.cohorts.len();
        let larva_start = self.bands.larva_start.min(n_days);
        let pupa_start = self.bands.pupa_start.clamp(larva_start, n_days);
        let band_sum = |start: usize, end: usize| self.cohorts.range(start..end).sum::<u64>();
        StageCounts {
            eggs: band_sum(0, larva_start),
            larvae: band_sum(larva_start, pupa_start),
            pupae: band_sum(pupa_start, n_days),
        }
    }

    /// Age every cohort by one day.
    ///
    /// Removes and returns the oldest cohort, then inserts `new_layings` as
    /// the age-0 cohort.
    pub fn advance(&mut self, new_layings: u64) -> u64 {
        let n_days = self.cohorts.len();
        let emerged = self.cohorts.pop_back().unwrap_or(0);
        self.cohorts.push_front(new_layings);
        assert_eq!(self.cohorts.len(), n_days, "cohort count changed");
        emerged
    }
}
