use celestial::{
    celestial::{Celestial, Status},
    config::CelestialConfig,
    fields::OutputRecord,
    units::UnitSystem,
};
use chrono::{TimeZone, Utc};

/// Service on the DE421 kernel, downloaded into the cache when missing.
pub fn de421_service(latitude: f64, longitude: f64, altitude: f64, utc_offset_minutes: i32) -> Celestial {
    let config = CelestialConfig {
        enable: true,
        latitude: Some(latitude),
        longitude: Some(longitude),
        altitude: Some(altitude),
        ephemeris: "DE421".to_string(),
        utc_offset_minutes: Some(utc_offset_minutes),
        ..CelestialConfig::default()
    };
    let service = Celestial::start(config);
    assert_eq!(service.status(), Status::Ready);
    service
}

pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> f64 {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap()
        .timestamp() as f64
}

pub fn metric_cycle(service: &Celestial, unix: f64) -> OutputRecord {
    service.compute(unix, UnitSystem::Metric, None, None).unwrap()
}

/// Assert `actual` is within `minutes` of `expected` (both Unix seconds).
pub fn assert_close_minutes(actual: f64, expected: f64, minutes: f64) {
    assert!(
        (actual - expected).abs() <= minutes * 60.0,
        "{actual} differs from {expected} by {:.1} min",
        (actual - expected) / 60.0
    );
}
