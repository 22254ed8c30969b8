use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of the colony's queen.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum QueenStatus {
    /// A mated queen is present and lays eggs.
    Laying,
    /// No queen and no replacement being reared. Nothing leaves this state.
    Queenless,
    /// A replacement queen is being reared; `days_elapsed` counts days since the loss.
    Developing { days_elapsed: u32 },
}

/// Milestone reached by a replacement queen during a daily tick.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum QueenTransition {
    /// The virgin queen left her cell.
    Emerged,
    /// The queen mated and lays from the next day on.
    Mated,
}

impl QueenStatus {
    pub fn is_laying(&self) -> bool {
        matches!(self, Self::Laying)
    }

    /// Remove the laying queen.
    ///
    /// With `rearing` the colony starts an emergency replacement the same day,
    /// otherwise it stays queenless. Returns `false` and leaves the state
    /// untouched when there is no laying queen to lose.
    pub fn lose_queen(&mut self, rearing: bool) -> bool {
        if !self.is_laying() {
            return false;
        }
        *self = if rearing {
            Self::Developing { days_elapsed: 0 }
        } else {
            Self::Queenless
        };
        true
    }

    /// Advance a replacement queen by one day.
    ///
    /// She emerges after `development_days` and lays from `replacement_days`
    /// (development plus mating) on.
    pub fn tick(&mut self, development_days: u32, replacement_days: u32) -> Option<QueenTransition> {
        let Self::Developing { days_elapsed } = self else {
            return None;
        };
        *days_elapsed += 1;
        let days_elapsed = *days_elapsed;

        assert!(
            days_elapsed <= replacement_days,
            "queen development overshot {replacement_days} days"
        );

        if days_elapsed == replacement_days {
            *self = Self::Laying;
            Some(QueenTransition::Mated)
        } else if days_elapsed == development_days {
            Some(QueenTransition::Emerged)
        } else {
            None
        }
    }
}

impl fmt::Display for QueenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Laying => write!(f, "laying"),
            Self::Queenless => write!(f, "queenless"),
            Self::Developing { days_elapsed } => write!(f, "developing (day {days_elapsed})"),
        }
    }
}
