use thiserror::Error;

use crate::{jpl_ephem::ResolutionError, observers::FrameError};

#[derive(Error, Debug)]
pub enum CelestialError {
    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "jpl-download")]
    #[error("HTTP reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("Base dir creation error for JPL ephemeris file: {0}")]
    UnableToCreateBaseDir(String),

    #[error("UTF-8 Path error: {0}")]
    Utf8PathError(String),

    #[error("JPL File not found at: {0}")]
    JPLFileNotFound(String),

    #[error("Invalid JPL ephemeris file version: {0}")]
    InvalidJPLEphemFileVersion(String),

    #[error("Error during the nom parsing: {0}")]
    NomParsingError(String),

    #[error("Invalid SPK data type: {0}")]
    InvalidSpkDataType(i32),

    #[error("Unsupported DAF binary format: {0} (only LTL-IEEE kernels are read)")]
    UnsupportedBinaryFormat(String),

    #[error("No ephemeris segment {target} -> {center} covers ET {et_seconds} s")]
    EpochOutOfRange {
        target: i32,
        center: i32,
        et_seconds: f64,
    },

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("Light-time iteration did not converge for NAIF body {0}")]
    LightTimeDiverged(i32),

    #[error("Invalid search window: start {start} must be earlier than end {end}")]
    InvalidSearchWindow { start: f64, end: f64 },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unable to parse configuration file: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    #[error("Celestial service is not running: {0}")]
    ServiceUnavailable(String),

    #[error("Loop packet field {0} is missing or has the wrong type")]
    MissingPacketField(String),
}

impl PartialEq for CelestialError {
    fn eq(&self, other: &Self) -> bool {
        use CelestialError::*;
        match (self, other) {
            // I/O-like errors carry no comparable payload: same variant is enough
            (IoError(_), IoError(_)) => true,
            #[cfg(feature = "jpl-download")]
            (ReqwestError(_), ReqwestError(_)) => true,
            (ConfigParseError(_), ConfigParseError(_)) => true,

            (UnableToCreateBaseDir(a), UnableToCreateBaseDir(b)) => a == b,
            (Utf8PathError(a), Utf8PathError(b)) => a == b,
            (JPLFileNotFound(a), JPLFileNotFound(b)) => a == b,
            (InvalidJPLEphemFileVersion(a), InvalidJPLEphemFileVersion(b)) => a == b,
            (NomParsingError(a), NomParsingError(b)) => a == b,
            (InvalidSpkDataType(a), InvalidSpkDataType(b)) => a == b,
            (UnsupportedBinaryFormat(a), UnsupportedBinaryFormat(b)) => a == b,
            (
                EpochOutOfRange {
                    target: t1,
                    center: c1,
                    et_seconds: e1,
                },
                EpochOutOfRange {
                    target: t2,
                    center: c2,
                    et_seconds: e2,
                },
            ) => t1 == t2 && c1 == c2 && e1 == e2,
            (Resolution(a), Resolution(b)) => a == b,
            (Frame(a), Frame(b)) => a == b,
            (LightTimeDiverged(a), LightTimeDiverged(b)) => a == b,
            (
                InvalidSearchWindow { start: s1, end: e1 },
                InvalidSearchWindow { start: s2, end: e2 },
            ) => s1 == s2 && e1 == e2,
            (InvalidTimestamp(a), InvalidTimestamp(b)) => a == b,
            (InvalidConfig(a), InvalidConfig(b)) => a == b,
            (ServiceUnavailable(a), ServiceUnavailable(b)) => a == b,
            (MissingPacketField(a), MissingPacketField(b)) => a == b,

            _ => false,
        }
    }
}

impl CelestialError {
    /// Whether this error means the ephemeris dataset is not in place yet
    /// (as opposed to being present but unusable).
    pub fn is_not_ready(&self) -> bool {
        match self {
            CelestialError::JPLFileNotFound(_) => true,
            CelestialError::IoError(err) => err.kind() == std::io::ErrorKind::NotFound,
            // the kernel download may succeed on a later attempt
            #[cfg(feature = "jpl-download")]
            CelestialError::ReqwestError(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod celestial_errors_test {
    use super::*;

    #[test]
    fn test_missing_kernel_is_not_ready() {
        assert!(CelestialError::JPLFileNotFound("de421.bsp".into()).is_not_ready());
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "de421.bsp");
        assert!(CelestialError::from(missing).is_not_ready());

        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "de421.bsp");
        assert!(!CelestialError::from(denied).is_not_ready());
        assert!(!CelestialError::InvalidSpkDataType(13).is_not_ready());
        assert!(!CelestialError::UnsupportedBinaryFormat("BIG-IEEE".into()).is_not_ready());
    }

    #[cfg(feature = "jpl-download")]
    #[test]
    fn test_failed_download_is_not_ready() {
        let err = reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();
        assert!(CelestialError::from(err).is_not_ready());
    }
}
