//! Service configuration file support.
//!
//! The `[celestial]` section of a TOML file holds the station and the
//! ephemeris settings:
//!
//! ```toml
//! [celestial]
//! enable = true
//! latitude = 40.0
//! longitude = -88.0
//! altitude = 220.0
//! ephemeris = "de421.bsp"
//! ```
use std::fs;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::{celestial_errors::CelestialError, constants::Meter, day_window::LocalZone};

/// Phase names, one per 45° of phase angle starting at new moon.
pub const DEFAULT_MOON_PHASES: [&str; 8] = [
    "new (totally dark)",
    "increasing to full",
    "first quarter",
    "increasing to full",
    "full (totally lit)",
    "decreasing to new",
    "last quarter",
    "decreasing to new",
];

/// Whole configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub celestial: CelestialConfig,
}

/// `[celestial]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CelestialConfig {
    #[serde(default)]
    pub enable: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// meters above sea level
    pub altitude: Option<Meter>,
    /// kernel path, or a NAIF version name such as `DE440`
    #[serde(default = "default_ephemeris")]
    pub ephemeris: String,
    /// offset of the station's civil time from UTC; system zone when absent
    pub utc_offset_minutes: Option<i32>,
    #[serde(default = "default_max_init_attempts")]
    pub max_init_attempts: u32,
    #[serde(default = "default_moon_phases")]
    pub moon_phases: Vec<String>,
}

fn default_ephemeris() -> String {
    "de421.bsp".to_string()
}

fn default_max_init_attempts() -> u32 {
    5
}

fn default_moon_phases() -> Vec<String> {
    DEFAULT_MOON_PHASES.iter().map(|s| s.to_string()).collect()
}

impl Default for CelestialConfig {
    fn default() -> Self {
        CelestialConfig {
            enable: false,
            latitude: None,
            longitude: None,
            altitude: None,
            ephemeris: default_ephemeris(),
            utc_offset_minutes: None,
            max_init_attempts: default_max_init_attempts(),
            moon_phases: default_moon_phases(),
        }
    }
}

/// Station settings once every required value is present.
#[derive(Debug, Clone, PartialEq)]
pub struct StationSettings {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Meter,
    pub zone: LocalZone,
    pub moon_phases: [String; 8],
}

impl CelestialConfig {
    pub fn from_toml(content: &str) -> Result<Self, CelestialError> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.celestial)
    }

    /// Load the `[celestial]` section of a TOML file.
    pub fn from_file(path: &Utf8Path) -> Result<Self, CelestialError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Check the station part of the configuration.
    pub fn station(&self) -> Result<StationSettings, CelestialError> {
        let required = |value: Option<f64>, name: &str| {
            value.ok_or_else(|| CelestialError::InvalidConfig(format!("station {name} is missing")))
        };

        let moon_phases: [String; 8] = self.moon_phases.clone().try_into().map_err(|names: Vec<String>| {
            CelestialError::InvalidConfig(format!(
                "moon_phases must list exactly 8 names, found {}",
                names.len()
            ))
        })?;

        let zone = match self.utc_offset_minutes {
            Some(minutes) => LocalZone::from_offset_minutes(minutes)?,
            None => LocalZone::System,
        };

        Ok(StationSettings {
            latitude: required(self.latitude, "latitude")?,
            longitude: required(self.longitude, "longitude")?,
            altitude: required(self.altitude, "altitude")?,
            zone,
            moon_phases,
        })
    }
}

#[cfg(test)]
mod config_test {
    use super::*;

    const STATION: &str = r#"
        [celestial]
        enable = true
        latitude = 40.0
        longitude = -88.0
        altitude = 220.0
        utc_offset_minutes = -300
    "#;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let config = CelestialConfig::from_toml(STATION).unwrap();
        assert!(config.enable);
        assert_eq!(config.ephemeris, "de421.bsp");
        assert_eq!(config.max_init_attempts, 5);
        assert_eq!(config.moon_phases.len(), 8);

        let station = config.station().unwrap();
        assert_eq!(station.latitude, 40.0);
        assert_eq!(station.zone, LocalZone::from_offset_minutes(-300).unwrap());
        assert_eq!(station.moon_phases[4], "full (totally lit)");
    }

    #[test]
    fn test_missing_section_is_disabled() {
        let config = CelestialConfig::from_toml("[station]\nname = \"x\"\n").unwrap();
        assert!(!config.enable);
        assert_eq!(config, CelestialConfig::default());
    }

    #[test]
    fn test_missing_altitude_is_rejected() {
        let config = CelestialConfig::from_toml("[celestial]\nlatitude = 1.0\nlongitude = 2.0\n").unwrap();
        assert_eq!(
            config.station(),
            Err(CelestialError::InvalidConfig("station altitude is missing".into()))
        );
    }

    #[test]
    fn test_moon_phase_count_is_checked() {
        let mut config = CelestialConfig::from_toml(STATION).unwrap();
        config.moon_phases.pop();
        assert!(matches!(config.station(), Err(CelestialError::InvalidConfig(_))));
    }

    #[test]
    fn test_parse_error_and_file() {
        assert!(matches!(
            CelestialConfig::from_toml("[celestial]\nlatitude = \"north\""),
            Err(CelestialError::ConfigParseError(_))
        ));

        let dir = tempfile::tempdir().unwrap();
        let path = camino::Utf8PathBuf::from_path_buf(dir.path().join("celestial.toml")).unwrap();
        fs::write(&path, STATION).unwrap();
        assert!(CelestialConfig::from_file(&path).unwrap().enable);
        assert!(CelestialConfig::from_file(&path.with_file_name("absent.toml")).is_err());
    }
}
