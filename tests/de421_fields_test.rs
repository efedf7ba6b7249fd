#![cfg(feature = "jpl-download")]

mod common;

use celestial::{fields::names::*, units::UnitSystem};
use common::{assert_close_minutes, de421_service, metric_cycle, utc};

#[test]
fn test_station_scenario_has_every_field() {
    let service = de421_service(40.0, -88.0, 220.0, -300);
    let record = service
        .compute(utc(2024, 3, 21, 14, 0), UnitSystem::Metric, Some(18.4), Some(1020.25))
        .unwrap();

    for name in NUMERIC_FIELDS {
        assert!(record.get_f64(name).is_some(), "missing {name}");
    }
    assert!(record.get(MOON_PHASE).and_then(|v| v.as_str()).is_some());
    for name in [EARTH_SUN_DISTANCE, EARTH_MOON_DISTANCE, EARTH_MARS_DISTANCE, EARTH_PLUTO_DISTANCE] {
        assert!(record.get_f64(name).unwrap() > 0.0);
    }
    let fullness = record.get_f64(MOON_FULLNESS).unwrap();
    assert!((0.0..=100.0).contains(&fullness));

    // the day after the March equinox
    let declination = record.get_f64(SUN_DECLINATION).unwrap();
    assert!(declination > 0.2 && declination < 0.8, "{declination}");
    let distance = record.get_f64(EARTH_SUN_DISTANCE).unwrap();
    assert!((distance / 1.49e8 - 1.0).abs() < 0.01);
}

#[test]
fn test_known_events_of_2024() {
    let service = de421_service(40.0, -88.0, 220.0, -300);
    let record = metric_cycle(&service, utc(2024, 3, 21, 14, 0));

    assert_close_minutes(record.get_f64(NEXT_SOLSTICE).unwrap(), utc(2024, 6, 20, 20, 51), 10.0);
    assert_close_minutes(record.get_f64(NEXT_EQUINOX).unwrap(), utc(2024, 9, 22, 12, 44), 10.0);
    assert_close_minutes(record.get_f64(NEXT_FULL_MOON).unwrap(), utc(2024, 3, 25, 7, 0), 10.0);
    assert_close_minutes(record.get_f64(NEXT_NEW_MOON).unwrap(), utc(2024, 4, 8, 18, 21), 10.0);
}

#[test]
fn test_day_ordering() {
    let service = de421_service(40.0, -88.0, 220.0, -300);
    let record = metric_cycle(&service, utc(2024, 5, 2, 18, 0));

    let times: Vec<f64> = [
        ASTRONOMICAL_TWILIGHT_START,
        NAUTICAL_TWILIGHT_START,
        CIVIL_TWILIGHT_START,
        SUNRISE,
        SUN_TRANSIT,
        SUNSET,
        CIVIL_TWILIGHT_END,
        NAUTICAL_TWILIGHT_END,
        ASTRONOMICAL_TWILIGHT_END,
    ]
    .iter()
    .map(|name| record.get_f64(name).unwrap())
    .collect();
    assert!(times.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_unit_systems_agree() {
    let service = de421_service(40.0, -88.0, 220.0, -300);
    let unix = utc(2024, 3, 21, 14, 0);
    let metric = metric_cycle(&service, unix);
    let us = service.compute(unix, UnitSystem::Us, None, None).unwrap();

    let ratio = metric.get_f64(EARTH_SUN_DISTANCE).unwrap() / us.get_f64(EARTH_SUN_DISTANCE).unwrap();
    assert!((ratio - 1.496e8 / 9.296e7).abs() < 1e-12);
}

#[test]
fn test_shifted_days_agree() {
    let service = de421_service(40.0, -88.0, 220.0, -300);
    let today = metric_cycle(&service, utc(2024, 5, 2, 18, 0));
    let next_day = metric_cycle(&service, utc(2024, 5, 3, 18, 0));

    assert_eq!(today.get_f64(TOMORROW_SUNRISE), next_day.get_f64(SUNRISE));
    assert_eq!(today.get_f64(TOMORROW_SUNSET), next_day.get_f64(SUNSET));
    assert_eq!(next_day.get_f64(YESTERDAY_SUNSHINE_DUR), today.get_f64(DAY_SUNSHINE_DUR));
}

#[test]
fn test_polar_night_and_day() {
    let service = de421_service(80.0, 15.0, 0.0, 60);

    let winter = metric_cycle(&service, utc(2024, 12, 21, 12, 0));
    assert!(!winter.contains(SUNRISE) && !winter.contains(SUNSET));
    assert_eq!(winter.get_f64(DAY_SUNSHINE_DUR), Some(0.0));

    let summer = metric_cycle(&service, utc(2024, 6, 21, 12, 0));
    assert!(!summer.contains(SUNRISE) && !summer.contains(SUNSET));
    assert_eq!(summer.get_f64(DAY_SUNSHINE_DUR), Some(86400.0));
}
