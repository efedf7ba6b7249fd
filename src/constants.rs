//! # Constants and type definitions for Celestial
//!
//! This module centralizes the **physical constants**, **conversion factors** and
//! **type aliases** shared by the ephemeris reader, the observer frame, the event
//! search and the field computations.
//!
//! ## Overview
//!
//! - Astronomical and geophysical constants (AU, Earth ellipsoid, speed of light)
//! - Unit conversions (degrees ↔ radians, days ↔ seconds, AU ↔ km/miles)
//! - Standard rise/set and twilight thresholds
//! - Core type aliases used across the crate

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Astronomical Unit in kilometers (IAU 2012)
pub const AU: f64 = 149_597_870.7;

/// MJD epoch of J2000.0 (2000-01-01 12:00:00 TT)
pub const T2000: f64 = 51544.5;

/// MJD of the Unix epoch (1970-01-01T00:00:00 UTC)
pub const MJD_UNIX_EPOCH: f64 = 40587.0;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Arcseconds → radians
pub const RADSEC: f64 = std::f64::consts::PI / 648000.0;

/// Earth equatorial radius in meters (GRS1980/WGS84)
pub const EARTH_MAJOR_AXIS: f64 = 6_378_137.0;

/// Earth polar radius in meters (GRS1980/WGS84)
pub const EARTH_MINOR_AXIS: f64 = 6_356_752.3;

/// Earth equatorial radius in kilometers
pub const EARTH_RADIUS_KM: f64 = EARTH_MAJOR_AXIS / 1000.;

/// Mean radius of the Moon in kilometers
pub const MOON_RADIUS_KM: f64 = 1737.1;

/// Speed of light in km/s
pub const VLIGHT: f64 = 2.99792458e5;

/// Ratio of the sidereal to the solar day rate
pub const SIDEREAL_RATE: f64 = 1.00273790934;

/// AU → kilometers, as reported in the packet
pub const AU_TO_KM: f64 = 1.496e+8;

/// AU → statute miles, as reported in the packet
pub const AU_TO_MILES: f64 = 9.296e+7;

/// Millibars per inch of mercury
pub const MBAR_PER_INHG: f64 = 33.8639;

// -------------------------------------------------------------------------------------------------
// Horizon and twilight thresholds (degrees)
// -------------------------------------------------------------------------------------------------

/// Standard atmospheric refraction at the horizon (34 arcminutes)
pub const REFRACTION_DEGREES: Degree = -34.0 / 60.0;

/// Sun's upper limb on the refracted horizon (refraction + solar semi-diameter)
pub const SUN_HORIZON_DEGREES: Degree = -0.8333;

/// Sun depression at the civil / nautical / astronomical twilight boundaries
pub const CIVIL_TWILIGHT_DEGREES: Degree = -6.0;
pub const NAUTICAL_TWILIGHT_DEGREES: Degree = -12.0;
pub const ASTRONOMICAL_TWILIGHT_DEGREES: Degree = -18.0;

// -------------------------------------------------------------------------------------------------
// Standard atmosphere
// -------------------------------------------------------------------------------------------------

/// Air temperature assumed when the packet carries none (°C)
pub const DEFAULT_TEMPERATURE_C: f64 = 10.0;

/// Sea-level pressure of the default atmosphere (mbar)
pub const SEA_LEVEL_PRESSURE_MBAR: f64 = 1010.0;

/// Scale height used to reduce the default pressure with altitude (m)
pub const PRESSURE_SCALE_HEIGHT_M: f64 = 9100.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in arcseconds
pub type ArcSec = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Distance in meters
pub type Meter = f64;
/// Distance in astronomical units
pub type AstronomicalUnit = f64;
/// Modified Julian Date (days)
pub type MJD = f64;
/// Seconds since 1970-01-01T00:00:00 UTC
pub type UnixSeconds = f64;
