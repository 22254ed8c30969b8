//! Seasonal forage calendar.
//!
//! A [`Calendar`] holds the nectar and pollen flow periods of a location and
//! turns a day of the year into the modifiers applied to the colony's base
//! rates. Lookups are pure, so the calendar can be consulted for any day,
//! including days ahead of the simulation.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

pub const DAYS_PER_YEAR: u32 = 365;

const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A named period of nectar and pollen availability.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct FlowPeriod {
    pub name: String,
    /// First day of year of the flow (inclusive).
    pub start_day: u32,
    /// Last day of year of the flow (inclusive).
    pub end_day: u32,
    /// Relative nectar availability in `[0, 1]`.
    pub nectar: f64,
    /// Relative pollen availability in `[0, 1]`.
    pub pollen: f64,
    /// Multiplier of the base egg laying rate.
    pub egg_rate_modifier: f64,
    /// Multiplier of the base attrition rate.
    pub attrition_modifier: f64,
}

impl FlowPeriod {
    pub fn new(
        name: &str,
        (start_day, end_day): (u32, u32),
        nectar: f64,
        pollen: f64,
        egg_rate_modifier: f64,
        attrition_modifier: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            start_day,
            end_day,
            nectar,
            pollen,
            egg_rate_modifier,
            attrition_modifier,
        }
    }

    pub fn is_active(&self, day_of_year: u32) -> bool {
        (self.start_day..=self.end_day).contains(&day_of_year)
    }
}

/// Modifiers for one day of the year.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct DailyFactors {
    pub nectar: f64,
    pub pollen: f64,
    pub egg_rate_modifier: f64,
    pub attrition_modifier: f64,
    pub active_flows: Vec<String>,
}

impl DailyFactors {
    /// Factors of a day without any active flow.
    pub fn dearth() -> Self {
        Self {
            nectar: 0.1,
            pollen: 0.2,
            egg_rate_modifier: 0.4,
            attrition_modifier: 0.3,
            active_flows: Vec::new(),
        }
    }
}

/// Location with a built-in calendar and climate.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Location {
    /// Baia Mare, 220 m.
    BaiaMare,
    /// Chiuzbaia, 350-800 m, flowering about two weeks later.
    Chiuzbaia,
}

impl Location {
    pub fn calendar(self) -> Calendar {
        match self {
            Self::BaiaMare => Calendar::baia_mare(),
            Self::Chiuzbaia => Calendar::chiuzbaia(),
        }
    }
}

/// Flow periods of one location.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Calendar {
    pub name: String,
    pub flows: Vec<FlowPeriod>,
}

impl Calendar {
    pub fn new(name: &str, flows: Vec<FlowPeriod>) -> Self {
        Self {
            name: name.to_string(),
            flows,
        }
    }

    pub fn active_flows(&self, day_of_year: u32) -> impl Iterator<Item = &FlowPeriod> {
        self.flows.iter().filter(move |flow| flow.is_active(day_of_year))
    }

    /// Modifiers for `day_of_year`.
    ///
    /// With overlapping flows the colony follows the best resource, so each
    /// factor is the maximum over the active flows.
    pub fn daily_factors(&self, day_of_year: u32) -> DailyFactors {
        let active: Vec<_> = self.active_flows(day_of_year).collect();
        if active.is_empty() {
            return DailyFactors::dearth();
        }

        fn max_of(flows: &[&FlowPeriod], factor: impl Fn(&FlowPeriod) -> f64) -> f64 {
            flows
                .iter()
                .map(|&flow| factor(flow))
                .fold(f64::NEG_INFINITY, f64::max)
        }
        DailyFactors {
            nectar: max_of(&active, |flow| flow.nectar),
            pollen: max_of(&active, |flow| flow.pollen),
            egg_rate_modifier: max_of(&active, |flow| flow.egg_rate_modifier),
            attrition_modifier: max_of(&active, |flow| flow.attrition_modifier),
            active_flows: active.iter().map(|flow| flow.name.clone()).collect(),
        }
    }

    pub fn baia_mare() -> Self {
        let flows = vec![
            FlowPeriod::new("Winter Dormancy", (1, 50), 0.0, 0.0, 0.05, 0.10),
            FlowPeriod::new("Hazelnut/Alder", (51, 60), 0.1, 0.7, 0.6, 0.15),
            FlowPeriod::new("Willow (Salcia)", (79, 93), 0.4, 0.8, 0.8, 0.18),
            FlowPeriod::new("Early Spring Buildup", (94, 99), 0.3, 0.6, 1.0, 0.20),
            FlowPeriod::new("Plum (Prun)", (100, 109), 0.7, 0.9, 1.3, 0.20),
            FlowPeriod::new("Late Fruit Trees", (110, 124), 0.6, 0.8, 1.3, 0.22),
            FlowPeriod::new("Acacia (Salcâm)", (125, 139), 1.0, 0.5, 1.4, 0.25),
            FlowPeriod::new("May Gap", (140, 151), 0.2, 0.4, 0.8, 0.30),
            FlowPeriod::new("Raspberry (Zmeur)", (152, 181), 0.8, 0.7, 1.2, 1.2),
            FlowPeriod::new("Linden (Tei) - Large-leaved", (161, 170), 0.95, 0.6, 1.1, 1.5),
            FlowPeriod::new("Linden - Small/Silver", (171, 185), 0.95, 0.6, 1.0, 1.8),
            FlowPeriod::new("Meadow Flora", (152, 241), 0.5, 0.7, 1.0, 1.5),
            FlowPeriod::new("Fireweed (High Alt)", (166, 240), 0.6, 0.5, 1.0, 2.0),
            FlowPeriod::new("Honeydew (Mană)", (196, 240), 0.7, 0.3, 0.9, 2.3),
            FlowPeriod::new("Summer Dearth", (213, 232), 0.3, 0.3, 0.8, 2.7),
            FlowPeriod::new("Goldenrod", (233, 252), 0.4, 0.5, 0.7, 2.0),
            FlowPeriod::new("Fall Aster/Ivy", (244, 273), 0.3, 0.5, 0.4, 1.5),
            FlowPeriod::new("Late Fall", (274, 304), 0.1, 0.2, 0.2, 1.0),
            FlowPeriod::new("Pre-Winter", (305, 334), 0.0, 0.0, 0.05, 0.25),
            FlowPeriod::new("Winter Cluster", (335, 365), 0.0, 0.0, 0.0, 0.10),
        ];
        Self::new("Baia Mare (220m)", flows)
    }

    pub fn chiuzbaia() -> Self {
        let flows = vec![
            FlowPeriod::new("Winter Dormancy", (1, 65), 0.0, 0.0, 0.05, 0.10),
            FlowPeriod::new("Hazelnut/Alder", (66, 75), 0.1, 0.7, 0.6, 0.15),
            FlowPeriod::new("Willow (Salcia)", (94, 108), 0.4, 0.8, 0.8, 0.18),
            FlowPeriod::new("Early Spring Buildup", (109, 114), 0.3, 0.6, 1.0, 0.20),
            FlowPeriod::new("Plum (Prun)", (115, 124), 0.7, 0.9, 1.3, 0.20),
            FlowPeriod::new("Late Fruit Trees", (125, 139), 0.6, 0.8, 1.3, 0.22),
            FlowPeriod::new("Acacia (Salcâm)", (135, 150), 0.8, 0.5, 1.3, 0.25),
            FlowPeriod::new("May-June Transition", (151, 161), 0.3, 0.5, 0.9, 0.30),
            FlowPeriod::new("Raspberry (Zmeur)", (145, 181), 0.9, 0.8, 1.2, 1.2),
            FlowPeriod::new("Linden (Tei) - Large-leaved", (175, 184), 0.95, 0.6, 1.1, 1.5),
            FlowPeriod::new("Linden - Small/Silver", (185, 200), 0.95, 0.6, 1.0, 1.8),
            FlowPeriod::new("Meadow Flora (Fânețe)", (152, 258), 0.6, 0.8, 1.0, 1.5),
            FlowPeriod::new("Fireweed (Zburătoare)", (166, 253), 0.8, 0.6, 1.0, 2.0),
            FlowPeriod::new("Honeydew (Mană)", (196, 258), 0.8, 0.3, 0.9, 2.3),
            FlowPeriod::new("Goldenrod", (244, 263), 0.4, 0.5, 0.7, 2.0),
            FlowPeriod::new("Fall Aster/Ivy/Crocus", (253, 283), 0.3, 0.5, 0.4, 1.5),
            FlowPeriod::new("Late Fall", (284, 314), 0.1, 0.2, 0.2, 1.0),
            FlowPeriod::new("Pre-Winter", (315, 334), 0.0, 0.0, 0.05, 0.25),
            FlowPeriod::new("Winter Cluster", (335, 365), 0.0, 0.0, 0.0, 0.10),
        ];
        Self::new("Chiuzbaia (575m avg)", flows)
    }
}

/// Day of a non-leap year (1-365) for a month (1-12) and day of month.
pub fn day_of_year(month: u32, day: u32) -> Result<u32> {
    if !(1..=12).contains(&month) {
        bail!("month must be in 1..=12, but is {month}");
    }
    let i_month = (month - 1) as usize;
    let days_in_month = DAYS_IN_MONTH[i_month];
    if !(1..=days_in_month).contains(&day) {
        bail!("day of {} must be in 1..={days_in_month}, but is {day}", MONTH_NAMES[i_month]);
    }
    Ok(DAYS_IN_MONTH[..i_month].iter().sum::<u32>() + day)
}

/// Day of year following `day_of_year`, wrapping from 365 to 1.
pub fn next_day_of_year(day_of_year: u32) -> u32 {
    day_of_year % DAYS_PER_YEAR + 1
}

/// Day of year `offset` days after `day_of_year`.
pub fn offset_day_of_year(day_of_year: u32, offset: usize) -> u32 {
    assert!(
        (1..=DAYS_PER_YEAR).contains(&day_of_year),
        "day of year must be in 1..={DAYS_PER_YEAR}, but is {day_of_year}"
    );
    let offset = (offset % DAYS_PER_YEAR as usize) as u32;
    (day_of_year - 1 + offset) % DAYS_PER_YEAR + 1
}

/// Label such as `"Mar 01"` for a day of year.
pub fn date_label(day_of_year: u32) -> String {
    let mut day = day_of_year.clamp(1, DAYS_PER_YEAR);
    for (i_month, &days_in_month) in DAYS_IN_MONTH.iter().enumerate() {
        if day <= days_in_month {
            return format!("{} {day:02}", MONTH_NAMES[i_month]);
        }
        day -= days_in_month;
    }
    unreachable!("day of year is clamped to a single year")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_dates() {
        assert_eq!(day_of_year(1, 1).unwrap(), 1);
        assert_eq!(day_of_year(3, 1).unwrap(), 60);
        assert_eq!(day_of_year(12, 31).unwrap(), 365);
        assert!(day_of_year(2, 29).is_err());
        assert!(day_of_year(13, 1).is_err());

        assert_eq!(date_label(60), "Mar 01");
        assert_eq!(date_label(125), "May 05");
        assert_eq!(date_label(365), "Dec 31");
    }

    #[test]
    fn wraps_days_of_year() {
        assert_eq!(next_day_of_year(1), 2);
        assert_eq!(next_day_of_year(365), 1);
        assert_eq!(offset_day_of_year(363, 4), 2);
        assert_eq!(offset_day_of_year(60, 365), 60);
    }

    #[test]
    fn overlapping_flows_take_maximum() {
        let calendar = Calendar::baia_mare();
        // Jun 15: Raspberry, Linden large-leaved, Meadow Flora, Fireweed.
        let factors = calendar.daily_factors(166);
        assert_eq!(factors.nectar, 0.95);
        assert_eq!(factors.pollen, 0.7);
        assert_eq!(factors.egg_rate_modifier, 1.2);
        assert_eq!(factors.attrition_modifier, 2.0);
        assert_eq!(factors.active_flows.len(), 4);
        assert_eq!(factors.active_flows[0], "Raspberry (Zmeur)");
    }

    #[test]
    fn gaps_fall_back_to_dearth() {
        let calendar = Calendar::baia_mare();
        // Mar 10 lies between Hazelnut/Alder and Willow.
        assert_eq!(calendar.daily_factors(69), DailyFactors::dearth());
        assert_eq!(calendar.daily_factors(125).nectar, 1.0);
    }

    #[test]
    fn mountain_calendar_blooms_later() {
        let lowland = Calendar::baia_mare();
        let mountain = Calendar::chiuzbaia();
        let plum = day_of_year(4, 10).unwrap();
        assert_eq!(lowland.daily_factors(plum).egg_rate_modifier, 1.3);
        assert_eq!(mountain.daily_factors(plum).active_flows, ["Willow (Salcia)"]);
    }
}
