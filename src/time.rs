//! Instants and time scales.
//!
//! The host hands over Unix timestamps (UTC). Searches run on UTC Modified
//! Julian Dates, the ephemeris wants TDB seconds past J2000 and Earth orientation
//! wants TT and UT1 MJDs. [`TimeScales`] bundles all of them for one instant.
use hifitime::Epoch;

use crate::{
    celestial_errors::CelestialError,
    constants::{UnixSeconds, DPI, MJD, MJD_UNIX_EPOCH, SECONDS_PER_DAY, SIDEREAL_RATE, T2000},
};

/// Convert a Unix timestamp to a UTC Modified Julian Date.
pub fn unix_to_mjd(unix: UnixSeconds) -> MJD {
    unix / SECONDS_PER_DAY + MJD_UNIX_EPOCH
}

/// Convert a UTC Modified Julian Date to a Unix timestamp.
pub fn mjd_to_unix(mjd: MJD) -> UnixSeconds {
    (mjd - MJD_UNIX_EPOCH) * SECONDS_PER_DAY
}

/// Build a hifitime [`Epoch`] from a Unix timestamp, rejecting non-finite values.
pub fn epoch_from_unix(unix: UnixSeconds) -> Result<Epoch, CelestialError> {
    if !unix.is_finite() {
        return Err(CelestialError::InvalidTimestamp(format!("{unix}")));
    }
    Ok(Epoch::from_unix_seconds(unix))
}

/// One instant expressed in every time scale the computations need.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScales {
    /// UTC MJD, also used as the UT1 argument of sidereal time
    pub mjd_utc: MJD,
    /// TT MJD for precession and nutation
    pub mjd_tt: MJD,
    /// TDB seconds past J2000 for ephemeris lookups
    pub et_seconds: f64,
}

impl TimeScales {
    pub fn from_mjd_utc(mjd_utc: MJD) -> Self {
        let epoch = Epoch::from_mjd_utc(mjd_utc);
        TimeScales {
            mjd_utc,
            mjd_tt: epoch.to_mjd_tt_days(),
            et_seconds: epoch.to_et_seconds(),
        }
    }

    /// Time scales of a host timestamp; NaN and infinities are rejected.
    pub fn from_unix(unix: UnixSeconds) -> Result<Self, CelestialError> {
        let epoch = epoch_from_unix(unix)?;
        Ok(TimeScales {
            mjd_utc: unix_to_mjd(unix),
            ..Self::from_epoch(&epoch)
        })
    }

    pub fn from_epoch(epoch: &Epoch) -> Self {
        TimeScales {
            mjd_utc: epoch.to_mjd_utc_days(),
            mjd_tt: epoch.to_mjd_tt_days(),
            et_seconds: epoch.to_et_seconds(),
        }
    }
}

/// Compute the Greenwich Mean Sidereal Time (GMST) in radians
/// for a given Modified Julian Date (UT1 time scale).
///
/// This function implements the IAU 1982 polynomial formula
/// for the mean sidereal time at 0h UT1, plus the fractional-day
/// correction term due to Earth's rotation rate.
///
/// # Arguments
/// * `tjm` - Modified Julian Date (MJD, UT1 time scale)
///
/// # Returns
/// * GMST angle in radians, normalized to the interval [0, 2π).
pub fn gmst(tjm: f64) -> f64 {
    // Polynomial coefficients for GMST at 0h UT1 (in seconds)
    const C0: f64 = 24110.54841;
    const C1: f64 = 8640184.812866;
    const C2: f64 = 9.3104e-2;
    const C3: f64 = -6.2e-6;

    let itjm = tjm.floor();
    let t = (itjm - T2000) / 36525.0;

    let gmst0 = (((C3 * t + C2) * t + C1) * t + C0) * DPI / SECONDS_PER_DAY;

    // Sidereal rotation accumulated since 0h UT1
    let h = (tjm - itjm) * DPI;

    (gmst0 + h * SIDEREAL_RATE).rem_euclid(DPI)
}
