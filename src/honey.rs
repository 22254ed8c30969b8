use crate::calendar::{Calendar, DailyFactors, offset_day_of_year};
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;

const SUPERING_MIN_STORES_KG: f64 = 8.0;
const SUPERING_MIN_OCCUPANCY_PCT: f64 = 70.0;
const SUPERING_MIN_NECTAR: f64 = 0.6;
const LOOKAHEAD_MIN_OCCUPANCY_PCT: f64 = 65.0;
const LOOKAHEAD_MIN_NECTAR: f64 = 0.8;
const LOOKAHEAD_DAYS: usize = 5;
const WINTER_END_DAY: u32 = 60;
const WINTER_START_DAY: u32 = 305;

/// Honey production and consumption parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HoneyParams {
    /// Stores at the start of the simulation.
    pub initial_stores_kg: f64,
    /// Share of adults foraging without any nectar flow.
    pub forager_fraction_base: f64,
    /// Extra forager share at full nectar availability.
    pub forager_fraction_span: f64,
    /// Nectar one forager brings in per day at full availability.
    pub nectar_per_forager_kg: f64,
    /// Kilograms of nectar per kilogram of honey.
    pub nectar_to_honey_ratio: f64,
    /// Honey eaten by one adult per day.
    pub adult_consumption_kg: f64,
    /// Honey fed to one brood cell per day.
    pub brood_consumption_kg: f64,
}

impl Default for HoneyParams {
    fn default() -> Self {
        Self {
            initial_stores_kg: 15.0,
            forager_fraction_base: 0.25,
            forager_fraction_span: 0.10,
            nectar_per_forager_kg: 0.00015,
            nectar_to_honey_ratio: 2.5,
            adult_consumption_kg: 0.00001,
            brood_consumption_kg: 0.000001,
        }
    }
}

impl HoneyParams {
    pub fn validate(&self) -> Result<()> {
        let values = [
            ("initial stores", self.initial_stores_kg),
            ("forager fraction base", self.forager_fraction_base),
            ("forager fraction span", self.forager_fraction_span),
            ("nectar per forager", self.nectar_per_forager_kg),
            ("adult consumption", self.adult_consumption_kg),
            ("brood consumption", self.brood_consumption_kg),
        ];
        for (name, value) in values {
            if !value.is_finite() || value < 0.0 {
                bail!("{name} must be finite and non-negative, but is {value}");
            }
        }
        if self.forager_fraction_base + self.forager_fraction_span > 1.0 {
            bail!("forager fraction must not exceed 1");
        }
        if !(self.nectar_to_honey_ratio.is_finite() && self.nectar_to_honey_ratio > 0.0) {
            bail!(
                "nectar to honey ratio must be positive, but is {}",
                self.nectar_to_honey_ratio
            );
        }
        Ok(())
    }

    /// Share of adults foraging; rises with nectar availability.
    pub fn forager_fraction(&self, nectar: f64) -> f64 {
        self.forager_fraction_base + nectar * self.forager_fraction_span
    }

    pub fn production_kg(&self, adult_bees: u64, nectar: f64) -> f64 {
        let foragers = adult_bees as f64 * self.forager_fraction(nectar);
        let nectar_kg = foragers * self.nectar_per_forager_kg * nectar;
        nectar_kg / self.nectar_to_honey_ratio
    }

    pub fn consumption_kg(&self, adult_bees: u64, total_brood: u64) -> f64 {
        adult_bees as f64 * self.adult_consumption_kg
            + total_brood as f64 * self.brood_consumption_kg
    }
}

/// Honey balance of one day.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct HoneyFlow {
    pub production_kg: f64,
    pub consumption_kg: f64,
    pub net_kg: f64,
    /// Stores after the day's balance.
    pub stores_kg: f64,
}

/// Running honey stores of the colony.
///
/// Stores never drop below zero and an empty store has no effect on the
/// colony.
#[derive(Debug, Clone)]
pub struct HoneyLedger {
    params: HoneyParams,
    stores_kg: f64,
}

impl HoneyLedger {
    pub fn new(params: HoneyParams) -> Self {
        Self {
            stores_kg: params.initial_stores_kg,
            params,
        }
    }

    pub fn stores_kg(&self) -> f64 {
        self.stores_kg
    }

    /// Book one day of foraging and feeding.
    pub fn settle(&mut self, adult_bees: u64, total_brood: u64, nectar: f64) -> HoneyFlow {
        let production_kg = self.params.production_kg(adult_bees, nectar.max(0.0));
        let consumption_kg = self.params.consumption_kg(adult_bees, total_brood);
        let net_kg = production_kg - consumption_kg;
        self.stores_kg = (self.stores_kg + net_kg).max(0.0);
        HoneyFlow {
            production_kg,
            consumption_kg,
            net_kg,
            stores_kg: self.stores_kg,
        }
    }
}

/// Advice to add honey supers.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum Supering {
    /// A strong flow is on now.
    FlowActive {
        flows: Vec<String>,
        occupancy_pct: f64,
    },
    /// A major flow starts within the next few days.
    FlowImminent { occupancy_pct: f64 },
}

impl fmt::Display for Supering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FlowActive {
                flows,
                occupancy_pct,
            } => write!(
                f,
                "SUPER NOW! {} flow active, {occupancy_pct:.0}% brood occupancy",
                flows.join(", ")
            ),
            Self::FlowImminent { occupancy_pct } => write!(
                f,
                "SUPER NOW! Major flow starting in <{LOOKAHEAD_DAYS} days, {occupancy_pct:.0}% occupancy"
            ),
        }
    }
}

/// Whether today calls for supering.
///
/// Looks at today's factors and the calendar of the following days; never
/// recommends supering in winter.
pub fn supering_recommendation(
    calendar: &Calendar,
    day_of_year: u32,
    factors: &DailyFactors,
    occupancy_pct: f64,
    stores_kg: f64,
) -> Option<Supering> {
    if !(WINTER_END_DAY..=WINTER_START_DAY).contains(&day_of_year) {
        return None;
    }
    if stores_kg < SUPERING_MIN_STORES_KG {
        return None;
    }

    if occupancy_pct >= SUPERING_MIN_OCCUPANCY_PCT && factors.nectar >= SUPERING_MIN_NECTAR {
        return Some(Supering::FlowActive {
            flows: factors.active_flows.iter().take(2).cloned().collect(),
            occupancy_pct,
        });
    }

    let strong_flow_ahead = (1..=LOOKAHEAD_DAYS).any(|offset| {
        let future_day = offset_day_of_year(day_of_year, offset);
        calendar.daily_factors(future_day).nectar >= LOOKAHEAD_MIN_NECTAR
    });
    if occupancy_pct >= LOOKAHEAD_MIN_OCCUPANCY_PCT && strong_flow_ahead {
        return Some(Supering::FlowImminent { occupancy_pct });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn production_scales_with_nectar() {
        let params = HoneyParams::default();
        assert_eq!(params.production_kg(40_000, 0.0), 0.0);
        // 40000 * 0.35 foragers * 0.00015 kg / 2.5
        assert_close(params.production_kg(40_000, 1.0), 0.84);
        assert_close(params.consumption_kg(40_000, 30_000), 0.43);
    }

    #[test]
    fn stores_never_go_negative() {
        let params = HoneyParams {
            initial_stores_kg: 0.1,
            ..HoneyParams::default()
        };
        let mut ledger = HoneyLedger::new(params);
        let flow = ledger.settle(50_000, 40_000, 0.0);
        assert_close(flow.net_kg, -0.54);
        assert_eq!(flow.stores_kg, 0.0);
        assert_eq!(ledger.stores_kg(), 0.0);

        let flow = ledger.settle(50_000, 0, 1.0);
        assert!(flow.stores_kg > 0.0);
    }

    #[test]
    fn rejects_invalid_params() {
        assert!(HoneyParams::default().validate().is_ok());
        let params = HoneyParams {
            nectar_to_honey_ratio: 0.0,
            ..HoneyParams::default()
        };
        assert!(params.validate().is_err());
        let params = HoneyParams {
            adult_consumption_kg: -1.0,
            ..HoneyParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn recommends_supering_during_strong_flow() {
        let calendar = Calendar::baia_mare();
        let day = 130;
        let factors = calendar.daily_factors(day);

        let recommendation = supering_recommendation(&calendar, day, &factors, 75.0, 10.0);
        assert_eq!(
            recommendation,
            Some(Supering::FlowActive {
                flows: vec!["Acacia (Salcâm)".to_string()],
                occupancy_pct: 75.0,
            })
        );

        assert_eq!(supering_recommendation(&calendar, day, &factors, 75.0, 7.9), None);
        assert_eq!(supering_recommendation(&calendar, day, &factors, 60.0, 10.0), None);
    }

    #[test]
    fn recommends_supering_before_strong_flow() {
        let calendar = Calendar::baia_mare();
        // Acacia starts on day 125.
        let day = 122;
        let factors = calendar.daily_factors(day);
        assert!(factors.nectar < SUPERING_MIN_NECTAR + 0.1);

        let recommendation = supering_recommendation(&calendar, day, &factors, 66.0, 9.0);
        assert_eq!(
            recommendation,
            Some(Supering::FlowImminent {
                occupancy_pct: 66.0
            })
        );
        assert_eq!(supering_recommendation(&calendar, day, &factors, 64.0, 9.0), None);
        assert_eq!(supering_recommendation(&calendar, 110, &factors, 66.0, 9.0), None);
    }

    #[test]
    fn never_recommends_supering_in_winter() {
        let calendar = Calendar::new(
            "always flowing",
            vec![crate::calendar::FlowPeriod::new("Everything", (1, 365), 1.0, 1.0, 1.0, 1.0)],
        );
        for day in [1, 59, 306, 365] {
            let factors = calendar.daily_factors(day);
            assert_eq!(supering_recommendation(&calendar, day, &factors, 100.0, 50.0), None);
        }
        let factors = calendar.daily_factors(60);
        assert!(supering_recommendation(&calendar, 60, &factors, 100.0, 50.0).is_some());
    }
}
