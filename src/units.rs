//! Unit systems of the host packets and the unit group of each added field.
use std::{collections::HashMap, fmt, str::FromStr};

use once_cell::sync::Lazy;

use crate::{
    celestial_errors::CelestialError,
    constants::{AstronomicalUnit, AU_TO_KM, AU_TO_MILES, MBAR_PER_INHG},
    fields::names::*,
};

/// Unit system tag carried by every packet (`usUnits`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitSystem {
    Us = 0x01,
    Metric = 0x10,
    MetricWx = 0x11,
}

impl UnitSystem {
    pub fn code(&self) -> i64 {
        *self as i64
    }

    /// Packet distance (km or miles) of a distance in AU.
    pub fn distance_from_au(&self, au: AstronomicalUnit) -> f64 {
        match self {
            UnitSystem::Us => au * AU_TO_MILES,
            UnitSystem::Metric | UnitSystem::MetricWx => au * AU_TO_KM,
        }
    }

    /// Packet `outTemp` to degrees Celsius.
    pub fn temperature_to_celsius(&self, value: f64) -> f64 {
        match self {
            UnitSystem::Us => (value - 32.0) * 5.0 / 9.0,
            UnitSystem::Metric | UnitSystem::MetricWx => value,
        }
    }

    /// Packet `barometer` to millibars.
    pub fn pressure_to_mbar(&self, value: f64) -> f64 {
        match self {
            UnitSystem::Us => value * MBAR_PER_INHG,
            UnitSystem::Metric | UnitSystem::MetricWx => value,
        }
    }
}

impl TryFrom<i64> for UnitSystem {
    type Error = CelestialError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0x01 => Ok(UnitSystem::Us),
            0x10 => Ok(UnitSystem::Metric),
            0x11 => Ok(UnitSystem::MetricWx),
            _ => Err(CelestialError::InvalidConfig(format!("unknown unit system {code:#04x}"))),
        }
    }
}

impl FromStr for UnitSystem {
    type Err = CelestialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "us" => Ok(UnitSystem::Us),
            "metric" => Ok(UnitSystem::Metric),
            "metricwx" => Ok(UnitSystem::MetricWx),
            other => Err(CelestialError::InvalidConfig(format!("unknown unit system {other}"))),
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitSystem::Us => "US",
            UnitSystem::Metric => "METRIC",
            UnitSystem::MetricWx => "METRICWX",
        };
        f.write_str(name)
    }
}

/// Physical category of an observation, used by the host to format it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitGroup {
    Direction,
    Distance,
    Percent,
    Time,
    DeltaTime,
    Data,
}

impl UnitGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitGroup::Direction => "group_direction",
            UnitGroup::Distance => "group_distance",
            UnitGroup::Percent => "group_percent",
            UnitGroup::Time => "group_time",
            UnitGroup::DeltaTime => "group_deltatime",
            UnitGroup::Data => "group_data",
        }
    }
}

impl fmt::Display for UnitGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit group of every field added to the packet.
pub static OBSERVATION_GROUPS: Lazy<HashMap<&'static str, UnitGroup>> = Lazy::new(|| {
    use UnitGroup::*;
    let mut groups = HashMap::new();
    for name in [
        SUN_AZIMUTH,
        SUN_ALTITUDE,
        SUN_RIGHT_ASCENSION,
        SUN_DECLINATION,
        MOON_AZIMUTH,
        MOON_ALTITUDE,
        MOON_RIGHT_ASCENSION,
        MOON_DECLINATION,
    ] {
        groups.insert(name, Direction);
    }
    for name in [
        EARTH_SUN_DISTANCE,
        EARTH_MOON_DISTANCE,
        EARTH_MERCURY_DISTANCE,
        EARTH_VENUS_DISTANCE,
        EARTH_MARS_DISTANCE,
        EARTH_JUPITER_DISTANCE,
        EARTH_SATURN_DISTANCE,
        EARTH_URANUS_DISTANCE,
        EARTH_NEPTUNE_DISTANCE,
        EARTH_PLUTO_DISTANCE,
    ] {
        groups.insert(name, Distance);
    }
    groups.insert(MOON_FULLNESS, Percent);
    groups.insert(MOON_PHASE, Data);
    for name in [
        SUNRISE,
        SUN_TRANSIT,
        SUNSET,
        TOMORROW_SUNRISE,
        TOMORROW_SUNSET,
        MOONRISE,
        MOON_TRANSIT,
        MOONSET,
        ASTRONOMICAL_TWILIGHT_START,
        ASTRONOMICAL_TWILIGHT_END,
        NAUTICAL_TWILIGHT_START,
        NAUTICAL_TWILIGHT_END,
        CIVIL_TWILIGHT_START,
        CIVIL_TWILIGHT_END,
        NEXT_EQUINOX,
        NEXT_SOLSTICE,
        NEXT_FULL_MOON,
        NEXT_NEW_MOON,
    ] {
        groups.insert(name, Time);
    }
    groups.insert(DAY_SUNSHINE_DUR, DeltaTime);
    groups.insert(YESTERDAY_SUNSHINE_DUR, DeltaTime);
    groups
});

pub fn observation_group(field: &str) -> Option<UnitGroup> {
    OBSERVATION_GROUPS.get(field).copied()
}
