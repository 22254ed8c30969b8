use alveus::calendar::{Calendar, Location, day_of_year};
use alveus::engine::{Engine, Rates, Schedule};
use alveus::hive::HiveConfig;
use alveus::honey::{HoneyLedger, HoneyParams};
use alveus::season::{SeasonalSim, scale_rate};
use alveus::weather::{Climate, WeatherModel};

fn seasonal_sim(calendar: Calendar, start_day_of_year: u32) -> SeasonalSim {
    let engine =
        Engine::new(HiveConfig::default(), Rates::default()).expect("failed to construct engine");
    SeasonalSim::new(
        engine,
        calendar,
        None,
        HoneyLedger::new(HoneyParams::default()),
        start_day_of_year,
    )
}

#[test]
fn scales_base_rates_by_the_calendar() {
    let start = day_of_year(4, 10).expect("invalid date");
    let mut sim = seasonal_sim(Location::BaiaMare.calendar(), start);

    let record = sim.advance_one_day();
    assert_eq!(record.effective_egg_rate, 1430);
    assert_eq!(record.effective_attrition, 60);
    assert_eq!(record.eggs_laid, 1430);
    assert_eq!(record.bees_died, 60);

    let season = record.season.expect("missing season data");
    assert_eq!(season.day_of_year, 100);
    assert_eq!(season.date, "Apr 10");
    assert_eq!(season.active_flows, ["Plum (Prun)"]);
    assert!(season.weather.is_none());

    // Base rates are untouched by the scaling.
    assert_eq!(sim.engine().rates(), &Rates::default());
}

#[test]
fn wraps_day_of_year_at_the_end_of_the_year() {
    let mut sim = seasonal_sim(Location::BaiaMare.calendar(), 365);
    let records = sim.run(&Schedule::new(3));

    let days: Vec<_> = records
        .iter()
        .map(|record| record.season.as_ref().map(|season| season.day_of_year))
        .collect();
    assert_eq!(days, [Some(365), Some(1), Some(2)]);
    assert_eq!(sim.day_of_year(), 3);

    assert_eq!(records[0].effective_egg_rate, 0);
    assert_eq!(records[1].effective_egg_rate, 55);
    assert_eq!(records[1].effective_attrition, 30);
}

#[test]
fn dearth_applies_outside_any_flow() {
    // Mar 01 to Mar 19 has no flow in the lowland calendar.
    let start = day_of_year(3, 5).expect("invalid date");
    let mut sim = seasonal_sim(Location::BaiaMare.calendar(), start);

    let record = sim.advance_one_day();
    let season = record.season.expect("missing season data");
    assert!(season.active_flows.is_empty());
    assert_eq!(record.effective_egg_rate, scale_rate(1100, 0.4));
    assert_eq!(record.effective_attrition, scale_rate(300, 0.3));
}

#[test]
fn honey_stores_stay_non_negative() {
    let engine =
        Engine::new(HiveConfig::default(), Rates::default()).expect("failed to construct engine");
    let params = HoneyParams {
        initial_stores_kg: 0.0,
        ..HoneyParams::default()
    };
    let mut sim = SeasonalSim::new(
        engine,
        Location::Chiuzbaia.calendar(),
        None,
        HoneyLedger::new(params),
        1,
    );

    let records = sim.run(&Schedule::new(365));
    for record in &records {
        let season = record.season.as_ref().expect("missing season data");
        assert!(season.honey.stores_kg >= 0.0);
        assert!(season.honey.production_kg >= 0.0);
    }
    let last = records[364].season.as_ref().expect("missing season data");
    assert_eq!(sim.ledger().stores_kg(), last.honey.stores_kg);
}

#[test]
fn seeded_weather_is_reproducible() {
    let start = day_of_year(5, 1).expect("invalid date");

    let run = || {
        let mut model = WeatherModel::new(Climate::for_location(Location::BaiaMare), start, Some(11))
            .expect("failed to construct weather model");
        let weather = model.generate(90).expect("failed to generate weather");
        assert_eq!(weather.len(), 90);

        let engine = Engine::new(HiveConfig::default(), Rates::default())
            .expect("failed to construct engine");
        let mut sim = SeasonalSim::new(
            engine,
            Location::BaiaMare.calendar(),
            Some(weather),
            HoneyLedger::new(HoneyParams::default()),
            start,
        );
        sim.run(&Schedule::new(120))
    };

    let records = run();
    assert_eq!(records, run());

    for record in &records[..90] {
        let season = record.season.as_ref().expect("missing season data");
        let weather = season.weather.as_ref().expect("missing weather");
        assert_eq!(weather.day_of_year, season.day_of_year);
        assert!((0.0..=1.0).contains(&weather.foraging_modifier));
    }
    // Past the generated table the weather is neutral.
    for record in &records[90..] {
        let season = record.season.as_ref().expect("missing season data");
        assert!(season.weather.is_none());
        assert_eq!(
            record.effective_egg_rate,
            scale_rate(1100, season.egg_rate_modifier)
        );
    }
}

#[test]
#[should_panic(expected = "start day of year")]
fn rejects_start_day_outside_the_year() {
    seasonal_sim(Location::BaiaMare.calendar(), 0);
}
