//! # Celestial: the loop-packet service
//!
//! [`Celestial`] wires together the configuration, the ephemeris, the
//! resolved bodies and the observer, then adds the celestial fields to each
//! loop packet handed to [`on_new_loop_packet`](Celestial::on_new_loop_packet).
//!
//! ## Lifecycle
//!
//! Startup is two-phase:
//!
//! - the configuration and the station are checked once; any problem there
//!   disables the service for good,
//! - the ephemeris is then loaded. A file that is not in place yet leaves the
//!   service [`Status::NotReady`] and loading is retried on the following
//!   packets, up to `max_init_attempts`. A file that is present but unusable,
//!   or a body missing from it, disables the service.
//!
//! Once [`Status::Ready`], the ephemeris, bodies and observer are read-only.
//!
//! ## Typical usage
//!
//! ```rust, no_run
//! use camino::Utf8Path;
//! use celestial::{celestial::Celestial, config::CelestialConfig, fields::OutputRecord};
//!
//! let config = CelestialConfig::from_file(Utf8Path::new("celestial.toml")).unwrap();
//! let mut service = Celestial::start(config);
//!
//! let mut packet = OutputRecord::new();
//! packet.insert("dateTime", 1_710_892_800_i64);
//! packet.insert("usUnits", 0x10_i64);
//! service.on_new_loop_packet(&mut packet);
//! ```
use std::fmt;

use log::{debug, error, info, warn};

use crate::{
    celestial_errors::CelestialError,
    config::{CelestialConfig, StationSettings},
    constants::UnixSeconds,
    fields::{names, FieldContext, OutputRecord, Sample},
    jpl_ephem::{
        download_jpl_file::get_ephemeris_file, naif::naif_data::NaifData, resolve_all, Ephemeris,
        ResolvedBodies,
    },
    observers::{frame::Atmosphere, frame::Frame, GeoObserver},
    time::epoch_from_unix,
    units::UnitSystem,
};

/// Opens the ephemeris named in the configuration.
pub type EphemerisLoader = Box<dyn FnMut(&str) -> Result<Box<dyn Ephemeris>, CelestialError>>;

/// Externally visible state of the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Never does any work; the reason was logged once.
    Disabled(String),
    /// Ephemeris not in place yet, after `attempts` tries.
    NotReady { attempts: u32 },
    Ready,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Disabled(reason) => write!(f, "disabled ({reason})"),
            Status::NotReady { attempts } => write!(f, "waiting for the ephemeris ({attempts} attempt(s))"),
            Status::Ready => f.write_str("ready"),
        }
    }
}

struct Loaded {
    ephem: Box<dyn Ephemeris>,
    bodies: ResolvedBodies,
}

enum State {
    Disabled(String),
    NotReady { attempts: u32 },
    Ready(Loaded),
}

pub struct Celestial {
    config: CelestialConfig,
    station: Option<(StationSettings, GeoObserver)>,
    loader: EphemerisLoader,
    state: State,
}

/// Load a NAIF kernel from a path or a version name.
pub fn load_naif_ephemeris(entry: &str) -> Result<Box<dyn Ephemeris>, CelestialError> {
    let path = get_ephemeris_file(entry)?;
    let data = NaifData::read_naif_file(&path)?;
    info!(
        "Loaded ephemeris {path} ({})",
        data.version().unwrap_or("unknown version")
    );
    Ok(Box::new(data))
}

impl Celestial {
    /// Start the service, reading NAIF kernels from disk.
    pub fn start(config: CelestialConfig) -> Self {
        Self::with_loader(config, Box::new(load_naif_ephemeris))
    }

    /// Start the service with a custom ephemeris source.
    pub fn with_loader(config: CelestialConfig, loader: EphemerisLoader) -> Self {
        let mut service = Celestial {
            config,
            station: None,
            loader,
            state: State::NotReady { attempts: 0 },
        };

        if !service.config.enable {
            info!("Celestial is disabled. Enable it in the [celestial] section of the configuration.");
            service.state = State::Disabled("not enabled".to_string());
            return service;
        }
        info!("Celestial {} is enabled...continuing.", env!("CARGO_PKG_VERSION"));

        match Self::check_station(&service.config) {
            Ok(station) => service.station = Some(station),
            Err(err) => {
                error!("Celestial disabled: {err}");
                service.state = State::Disabled(err.to_string());
                return service;
            }
        }

        service.try_load();
        service
    }

    fn check_station(config: &CelestialConfig) -> Result<(StationSettings, GeoObserver), CelestialError> {
        let station = config.station()?;
        let observer = GeoObserver::new(station.latitude, station.longitude, station.altitude)?;
        info!("Station {observer}");
        Ok((station, observer))
    }

    /// One more attempt at loading the ephemeris and resolving every body.
    fn try_load(&mut self) {
        let attempts = match self.state {
            State::NotReady { attempts } => attempts + 1,
            _ => return,
        };

        let loaded = (self.loader)(&self.config.ephemeris).and_then(|ephem| {
            let bodies = resolve_all(ephem.as_ref())?;
            Ok(Loaded { ephem, bodies })
        });

        self.state = match loaded {
            Ok(loaded) => {
                info!("Celestial is ready.");
                State::Ready(loaded)
            }
            Err(err) if err.is_not_ready() && attempts < self.config.max_init_attempts => {
                warn!(
                    "Ephemeris {} not ready ({err}), attempt {attempts}/{}",
                    self.config.ephemeris, self.config.max_init_attempts
                );
                State::NotReady { attempts }
            }
            Err(err) => {
                error!("Celestial disabled: {err}");
                State::Disabled(err.to_string())
            }
        };
    }

    pub fn status(&self) -> Status {
        match &self.state {
            State::Disabled(reason) => Status::Disabled(reason.clone()),
            State::NotReady { attempts } => Status::NotReady { attempts: *attempts },
            State::Ready(_) => Status::Ready,
        }
    }

    pub fn observer(&self) -> Option<&GeoObserver> {
        self.station.as_ref().map(|(_, observer)| observer)
    }

    /// Celestial fields for one instant.
    ///
    /// `temperature_c` and `pressure_mbar` feed the refraction model; a
    /// standard atmosphere at the station altitude replaces missing values.
    pub fn compute(
        &self,
        unix: UnixSeconds,
        units: UnitSystem,
        temperature_c: Option<f64>,
        pressure_mbar: Option<f64>,
    ) -> Result<OutputRecord, CelestialError> {
        let (loaded, (station, observer)) = match (&self.state, &self.station) {
            (State::Ready(loaded), Some(station)) => (loaded, station),
            _ => return Err(CelestialError::ServiceUnavailable(self.status().to_string())),
        };
        epoch_from_unix(unix)?;

        let ctx = FieldContext {
            frame: Frame::new(loaded.ephem.as_ref(), &loaded.bodies.earth, observer),
            bodies: &loaded.bodies,
            moon_phases: &station.moon_phases,
            zone: station.zone,
        };
        let sample = Sample {
            unix,
            units,
            atmosphere: Atmosphere::from_measurements(observer, temperature_c, pressure_mbar),
        };

        let (record, failures) = ctx.compute_all(&sample);
        if !failures.is_empty() {
            warn!("{} field group(s) skipped at {unix}", failures.len());
        }
        Ok(record)
    }

    /// Add the celestial fields to a loop packet.
    ///
    /// Does nothing while the service is disabled or not ready; a packet
    /// without a usable `dateTime` or `usUnits` is logged and left untouched.
    pub fn on_new_loop_packet(&mut self, packet: &mut OutputRecord) {
        if matches!(self.state, State::NotReady { .. }) {
            self.try_load();
        }
        if !matches!(self.state, State::Ready(_)) {
            return;
        }
        debug!("loop packet: {packet:?}");

        match self.packet_fields(packet) {
            Ok(fields) => packet.merge(fields),
            Err(err) => error!("Celestial skipped a loop packet: {err}"),
        }
    }

    fn packet_fields(&self, packet: &OutputRecord) -> Result<OutputRecord, CelestialError> {
        let unix = packet
            .get_f64(names::DATE_TIME)
            .ok_or_else(|| CelestialError::MissingPacketField(names::DATE_TIME.into()))?;
        let units = packet
            .get(names::US_UNITS)
            .and_then(|v| v.as_i64())
            .ok_or_else(|| CelestialError::MissingPacketField(names::US_UNITS.into()))
            .and_then(UnitSystem::try_from)?;

        let temperature = packet
            .get_f64(names::OUT_TEMP)
            .map(|t| units.temperature_to_celsius(t));
        let pressure = packet
            .get_f64(names::BAROMETER)
            .map(|p| units.pressure_to_mbar(p));

        self.compute(unix, units, temperature, pressure)
    }
}
