//! Packet field names.
//!
//! Inputs read from the host packet are in lower camel case, the fields this
//! crate adds follow the host's naming for celestial observations.

// inputs
pub const DATE_TIME: &str = "dateTime";
pub const US_UNITS: &str = "usUnits";
pub const OUT_TEMP: &str = "outTemp";
pub const BAROMETER: &str = "barometer";

// sun_position
pub const SUN_AZIMUTH: &str = "SunAzimuth";
pub const SUN_ALTITUDE: &str = "SunAltitude";
pub const SUN_RIGHT_ASCENSION: &str = "SunRightAscension";
pub const SUN_DECLINATION: &str = "SunDeclination";

// moon_position
pub const MOON_AZIMUTH: &str = "MoonAzimuth";
pub const MOON_ALTITUDE: &str = "MoonAltitude";
pub const MOON_RIGHT_ASCENSION: &str = "MoonRightAscension";
pub const MOON_DECLINATION: &str = "MoonDeclination";

// planet_distances
pub const EARTH_SUN_DISTANCE: &str = "EarthSunDistance";
pub const EARTH_MOON_DISTANCE: &str = "EarthMoonDistance";
pub const EARTH_MERCURY_DISTANCE: &str = "EarthMercuryDistance";
pub const EARTH_VENUS_DISTANCE: &str = "EarthVenusDistance";
pub const EARTH_MARS_DISTANCE: &str = "EarthMarsDistance";
pub const EARTH_JUPITER_DISTANCE: &str = "EarthJupiterDistance";
pub const EARTH_SATURN_DISTANCE: &str = "EarthSaturnDistance";
pub const EARTH_URANUS_DISTANCE: &str = "EarthUranusDistance";
pub const EARTH_NEPTUNE_DISTANCE: &str = "EarthNeptuneDistance";
pub const EARTH_PLUTO_DISTANCE: &str = "EarthPlutoDistance";

// moon_phase
pub const MOON_FULLNESS: &str = "MoonFullness";
pub const MOON_PHASE: &str = "MoonPhase";

// sun_events
pub const SUNRISE: &str = "Sunrise";
pub const SUN_TRANSIT: &str = "SunTransit";
pub const SUNSET: &str = "Sunset";
pub const DAY_SUNSHINE_DUR: &str = "daySunshineDur";
pub const YESTERDAY_SUNSHINE_DUR: &str = "yesterdaySunshineDur";
pub const TOMORROW_SUNRISE: &str = "tomorrowSunrise";
pub const TOMORROW_SUNSET: &str = "tomorrowSunset";

// moon_events
pub const MOONRISE: &str = "Moonrise";
pub const MOON_TRANSIT: &str = "MoonTransit";
pub const MOONSET: &str = "Moonset";

// twilight
pub const ASTRONOMICAL_TWILIGHT_START: &str = "AstronomicalTwilightStart";
pub const ASTRONOMICAL_TWILIGHT_END: &str = "AstronomicalTwilightEnd";
pub const NAUTICAL_TWILIGHT_START: &str = "NauticalTwilightStart";
pub const NAUTICAL_TWILIGHT_END: &str = "NauticalTwilightEnd";
pub const CIVIL_TWILIGHT_START: &str = "CivilTwilightStart";
pub const CIVIL_TWILIGHT_END: &str = "CivilTwilightEnd";

// seasons and lunar_events
pub const NEXT_EQUINOX: &str = "NextEquinox";
pub const NEXT_SOLSTICE: &str = "NextSolstice";
pub const NEXT_FULL_MOON: &str = "NextFullMoon";
pub const NEXT_NEW_MOON: &str = "NextNewMoon";

/// Every numeric field this crate can add.
pub const NUMERIC_FIELDS: [&str; 39] = [
    SUN_AZIMUTH,
    SUN_ALTITUDE,
    SUN_RIGHT_ASCENSION,
    SUN_DECLINATION,
    MOON_AZIMUTH,
    MOON_ALTITUDE,
    MOON_RIGHT_ASCENSION,
    MOON_DECLINATION,
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
    MOON_FULLNESS,
    SUNRISE,
    SUN_TRANSIT,
    SUNSET,
    DAY_SUNSHINE_DUR,
    YESTERDAY_SUNSHINE_DUR,
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
];

/// Every text field this crate can add.
pub const TEXT_FIELDS: [&str; 1] = [MOON_PHASE];
