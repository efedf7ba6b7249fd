//! Observer on the Earth's surface and the frame in which bodies are seen.
use std::fmt;

use nalgebra::Vector3;
use ordered_float::NotNan;
use thiserror::Error;

use crate::constants::{
    Degree, Meter, EARTH_MAJOR_AXIS, EARTH_MINOR_AXIS, EARTH_RADIUS_KM, PRESSURE_SCALE_HEIGHT_M,
    SEA_LEVEL_PRESSURE_MBAR,
};

pub mod frame;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    #[error("Observer {0} is not a finite number")]
    NonFinite(&'static str),

    #[error("Observer latitude {0}° is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("Observer longitude {0}° is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// Geodetic position of the station. Immutable once built.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct GeoObserver {
    latitude: NotNan<f64>,
    longitude: NotNan<f64>,
    altitude: NotNan<f64>,

    /// ρ·cos φ' (Earth radii)
    pub rho_cos_phi: NotNan<f64>,

    /// ρ·sin φ' (Earth radii)
    pub rho_sin_phi: NotNan<f64>,
}

fn finite(value: f64, field: &'static str) -> Result<NotNan<f64>, FrameError> {
    if !value.is_finite() {
        return Err(FrameError::NonFinite(field));
    }
    NotNan::new(value).map_err(|_| FrameError::NonFinite(field))
}

impl GeoObserver {
    /// Build an observer from geodetic latitude and longitude (degrees, east
    /// positive) and altitude above the ellipsoid (meters).
    pub fn new(latitude: Degree, longitude: Degree, altitude: Meter) -> Result<Self, FrameError> {
        let latitude = finite(latitude, "latitude")?;
        let longitude = finite(longitude, "longitude")?;
        let altitude = finite(altitude, "altitude")?;

        if !(-90.0..=90.0).contains(&latitude.into_inner()) {
            return Err(FrameError::LatitudeOutOfRange(latitude.into_inner()));
        }
        if !(-180.0..=180.0).contains(&longitude.into_inner()) {
            return Err(FrameError::LongitudeOutOfRange(longitude.into_inner()));
        }

        let (rho_cos_phi, rho_sin_phi) =
            geodetic_to_parallax(latitude.into_inner(), altitude.into_inner());

        Ok(GeoObserver {
            latitude,
            longitude,
            altitude,
            rho_cos_phi: finite(rho_cos_phi, "rho_cos_phi")?,
            rho_sin_phi: finite(rho_sin_phi, "rho_sin_phi")?,
        })
    }

    pub fn latitude(&self) -> Degree {
        self.latitude.into_inner()
    }

    pub fn longitude(&self) -> Degree {
        self.longitude.into_inner()
    }

    pub fn altitude(&self) -> Meter {
        self.altitude.into_inner()
    }

    /// Position in the Earth-fixed frame, kilometers.
    pub fn body_fixed_coord(&self) -> Vector3<f64> {
        let lon_radians = self.longitude.to_radians();

        Vector3::new(
            EARTH_RADIUS_KM * self.rho_cos_phi.into_inner() * lon_radians.cos(),
            EARTH_RADIUS_KM * self.rho_cos_phi.into_inner() * lon_radians.sin(),
            EARTH_RADIUS_KM * self.rho_sin_phi.into_inner(),
        )
    }

    /// Pressure of the standard atmosphere at the station altitude, mbar.
    pub fn default_pressure_mbar(&self) -> f64 {
        SEA_LEVEL_PRESSURE_MBAR * (-self.altitude() / PRESSURE_SCALE_HEIGHT_M).exp()
    }
}

impl fmt::Display for GeoObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lat = self.latitude();
        let lon = self.longitude();
        let ns = if lat >= 0.0 { "N" } else { "S" };
        let ew = if lon >= 0.0 { "E" } else { "W" };
        write!(
            f,
            "{:.4}° {ns}, {:.4}° {ew}, {:.1} m",
            lat.abs(),
            lon.abs(),
            self.altitude()
        )
    }
}

/// Convert geodetic latitude (radians) and height (meters) to the
/// parallax constants `(ρ·cos φ', ρ·sin φ')` on the WGS84 ellipsoid.
pub fn lat_alt_to_parallax(lat: f64, height: f64) -> (f64, f64) {
    let axis_ratio = EARTH_MINOR_AXIS / EARTH_MAJOR_AXIS;

    // reduced latitude
    let u = (lat.sin() * axis_ratio).atan2(lat.cos());

    let rho_sin_phi = axis_ratio * u.sin() + (height / EARTH_MAJOR_AXIS) * lat.sin();
    let rho_cos_phi = u.cos() + (height / EARTH_MAJOR_AXIS) * lat.cos();

    (rho_cos_phi, rho_sin_phi)
}

/// Same as [`lat_alt_to_parallax`] with the latitude in degrees.
pub fn geodetic_to_parallax(lat: Degree, height: Meter) -> (f64, f64) {
    lat_alt_to_parallax(lat.to_radians(), height)
}

#[cfg(test)]
mod observer_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_observer_constructor() {
        let observer = GeoObserver::new(0.0, 0.0, 0.0).unwrap();
        assert_eq!(observer.rho_cos_phi, 1.0);
        assert_eq!(observer.rho_sin_phi, 0.0);

        let observer = GeoObserver::new(40.0, -88.0, 220.0).unwrap();
        assert_eq!(observer.latitude(), 40.0);
        assert_eq!(observer.longitude(), -88.0);
        assert_eq!(observer.to_string(), "40.0000° N, 88.0000° W, 220.0 m");
    }

    #[test]
    fn test_invalid_geodetic_input() {
        assert_eq!(
            GeoObserver::new(f64::NAN, 0.0, 0.0),
            Err(FrameError::NonFinite("latitude"))
        );
        assert_eq!(
            GeoObserver::new(0.0, f64::INFINITY, 0.0),
            Err(FrameError::NonFinite("longitude"))
        );
        assert_eq!(
            GeoObserver::new(91.0, 0.0, 0.0),
            Err(FrameError::LatitudeOutOfRange(91.0))
        );
        assert_eq!(
            GeoObserver::new(0.0, -181.0, 0.0),
            Err(FrameError::LongitudeOutOfRange(-181.0))
        );
    }

    #[test]
    fn geodetic_to_parallax_test() {
        let (pxy1, pz1) = geodetic_to_parallax(20.707233557, 3067.694);
        assert_eq!(pxy1, 0.9362410003211518);
        assert_eq!(pz1, 0.35154299856304305);
    }

    #[test]
    fn test_body_fixed_coord() {
        let equator = GeoObserver::new(0.0, 90.0, 0.0).unwrap();
        let xyz = equator.body_fixed_coord();
        assert_relative_eq!(xyz.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(xyz.y, EARTH_RADIUS_KM, epsilon = 1e-9);

        let pole = GeoObserver::new(90.0, 0.0, 0.0).unwrap();
        assert_relative_eq!(pole.body_fixed_coord().z, EARTH_MINOR_AXIS / 1000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_default_pressure() {
        let sea = GeoObserver::new(40.0, -88.0, 0.0).unwrap();
        assert_relative_eq!(sea.default_pressure_mbar(), 1010.0);
        let high = GeoObserver::new(40.0, -88.0, 9100.0).unwrap();
        assert_relative_eq!(high.default_pressure_mbar(), 1010.0 / std::f64::consts::E, epsilon = 1e-9);
    }
}
