//! Topocentric observer frame.
//!
//! A [`Frame`] ties an [`Ephemeris`], the resolved Earth and a [`GeoObserver`]
//! together. For a body and an instant it computes the apparent place seen from
//! the station:
//!
//! 1. observer barycentric state (Earth state + rotated station vector),
//! 2. light-time iteration on the target,
//! 3. first-order annual and diurnal aberration,
//! 4. rotation to the true equator and equinox of date (IAU 1976/1980),
//! 5. horizon coordinates on the geodetic zenith, and optionally refraction.
//!
//! Searches use the geometric altitudes of [`Frame::topocentric`]; packet fields
//! use [`Frame::position_of`].
use nalgebra::{Matrix3, Vector3};

use crate::{
    celestial_errors::CelestialError,
    constants::{
        AstronomicalUnit, Degree, Radian, AU, DEFAULT_TEMPERATURE_C, DPI, MOON_RADIUS_KM,
        SECONDS_PER_DAY, SIDEREAL_RATE, VLIGHT,
    },
    earth_orientation::{gast, j2000_to_true_of_date, rotmt, true_obliquity, Axis},
    jpl_ephem::{BodyHandle, Ephemeris},
    observers::GeoObserver,
    time::TimeScales,
};

/// Light-time loop stops when successive delays differ by less than this (s).
const LIGHT_TIME_TOLERANCE: f64 = 1e-12 * SECONDS_PER_DAY;
const MAX_LIGHT_TIME_ITERATIONS: usize = 10;

/// Air conditions used for refraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Atmosphere {
    pub temperature_c: f64,
    pub pressure_mbar: f64,
}

impl Atmosphere {
    /// Standard atmosphere at the station altitude.
    pub fn standard(observer: &GeoObserver) -> Self {
        Atmosphere {
            temperature_c: DEFAULT_TEMPERATURE_C,
            pressure_mbar: observer.default_pressure_mbar(),
        }
    }

    /// Measured conditions, each falling back to the standard atmosphere.
    pub fn from_measurements(
        observer: &GeoObserver,
        temperature_c: Option<f64>,
        pressure_mbar: Option<f64>,
    ) -> Self {
        let standard = Self::standard(observer);
        Atmosphere {
            temperature_c: temperature_c
                .filter(|t| t.is_finite())
                .unwrap_or(standard.temperature_c),
            pressure_mbar: pressure_mbar
                .filter(|p| p.is_finite() && *p >= 0.0)
                .unwrap_or(standard.pressure_mbar),
        }
    }
}

/// Apparent place of a body as reported in a packet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApparentPosition {
    /// 0..360, north through east
    pub azimuth: Degree,
    /// refracted altitude
    pub altitude: Degree,
    /// 0..360, true equator and equinox of date
    pub right_ascension: Degree,
    pub declination: Degree,
    /// geocentric, light-time corrected
    pub earth_distance: AstronomicalUnit,
}

/// Unrefracted topocentric place, as used by the event searches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Topocentric {
    pub azimuth: Degree,
    pub altitude: Degree,
    pub right_ascension: Degree,
    pub declination: Degree,
    /// local hour angle in [0, 2π)
    pub hour_angle: Radian,
    pub distance_km: f64,
}

/// Refraction (degrees) for an observed altitude, Bennett's formula.
///
/// Zero outside `[-1°, 89.9°]`.
pub fn refraction(alt_degrees: Degree, temperature_c: f64, pressure_mbar: f64) -> Degree {
    if !(-1.0..=89.9).contains(&alt_degrees) {
        return 0.0;
    }
    let r = 0.016667 / (alt_degrees + 7.31 / (alt_degrees + 4.4)).to_radians().tan();
    r * (0.28 * pressure_mbar / (temperature_c + 273.0))
}

/// Observed altitude of a body whose geometric altitude is `alt_degrees`.
pub fn refract(alt_degrees: Degree, atmosphere: &Atmosphere) -> Degree {
    let mut refracted = alt_degrees;
    for _ in 0..10 {
        let new = alt_degrees
            + refraction(refracted, atmosphere.temperature_c, atmosphere.pressure_mbar);
        if (new - refracted).abs() < 3.0e-5 {
            return new;
        }
        refracted = new;
    }
    refracted
}

/// Apply first-order aberration to a relative position.
///
/// `vrel` is the target velocity relative to the observer; passing the negated
/// observer velocity corrects for aberration alone.
pub(crate) fn correct_aberration(xrel: Vector3<f64>, vrel: Vector3<f64>) -> Vector3<f64> {
    let dt = xrel.norm() / VLIGHT;
    xrel - dt * vrel
}

/// Right ascension, declination (radians) and norm of a Cartesian vector.
pub(crate) fn cartesian_to_radec(cartesian_position: Vector3<f64>) -> (f64, f64, f64) {
    let pos_norm = cartesian_position.norm();
    if pos_norm == 0. {
        return (0.0, 0.0, pos_norm);
    }
    let alpha = cartesian_position.y.atan2(cartesian_position.x).rem_euclid(DPI);
    let delta = (cartesian_position.z / pos_norm).asin();
    (alpha, delta, pos_norm)
}

struct OriginState {
    position: Vector3<f64>,
    velocity: Vector3<f64>,
    to_true_of_date: Matrix3<f64>,
    gast: Radian,
}

pub struct Frame<'a, E: Ephemeris + ?Sized> {
    ephem: &'a E,
    earth: &'a BodyHandle,
    observer: &'a GeoObserver,
}

impl<'a, E: Ephemeris + ?Sized> Frame<'a, E> {
    pub fn new(ephem: &'a E, earth: &'a BodyHandle, observer: &'a GeoObserver) -> Self {
        Frame {
            ephem,
            earth,
            observer,
        }
    }

    pub fn observer(&self) -> &GeoObserver {
        self.observer
    }

    /// Barycentric state of the geocenter, or of the station when `topocentric`.
    fn origin_state(&self, ts: &TimeScales, topocentric: bool) -> Result<OriginState, CelestialError> {
        let (earth_pos, earth_vel) = self.ephem.barycentric_state(self.earth, ts.et_seconds)?;
        let to_true_of_date = j2000_to_true_of_date(ts.mjd_tt);
        let gast = gast(ts.mjd_utc, ts.mjd_tt);

        if !topocentric {
            return Ok(OriginState {
                position: earth_pos,
                velocity: earth_vel,
                to_true_of_date,
                gast,
            });
        }

        // station vector on the true equator of date, then back to ICRF axes
        let omega = Vector3::new(0.0, 0.0, DPI * SIDEREAL_RATE / SECONDS_PER_DAY);
        let station_tod = rotmt(gast, Axis::Z) * self.observer.body_fixed_coord();
        let station_vel_tod = omega.cross(&station_tod);
        let from_tod = to_true_of_date.transpose();

        Ok(OriginState {
            position: earth_pos + from_tod * station_tod,
            velocity: earth_vel + from_tod * station_vel_tod,
            to_true_of_date,
            gast,
        })
    }

    /// Light-time corrected vector from `origin` to the target (ICRF axes, km).
    fn light_time_vector(
        &self,
        handle: &BodyHandle,
        et_seconds: f64,
        origin: &Vector3<f64>,
    ) -> Result<Vector3<f64>, CelestialError> {
        let mut tau = 0.0;
        for _ in 0..MAX_LIGHT_TIME_ITERATIONS {
            let (target, _) = self.ephem.barycentric_state(handle, et_seconds - tau)?;
            let rel = target - origin;
            let new_tau = rel.norm() / VLIGHT;
            if (new_tau - tau).abs() < LIGHT_TIME_TOLERANCE {
                return Ok(rel);
            }
            tau = new_tau;
        }
        Err(CelestialError::LightTimeDiverged(handle.naif_id))
    }

    /// Apparent vector on the true equator of date (km) plus the origin state.
    fn apparent_vector(
        &self,
        handle: &BodyHandle,
        ts: &TimeScales,
        topocentric: bool,
    ) -> Result<(Vector3<f64>, OriginState), CelestialError> {
        let origin = self.origin_state(ts, topocentric)?;
        let rel = self.light_time_vector(handle, ts.et_seconds, &origin.position)?;
        let apparent = correct_aberration(rel, -origin.velocity);
        Ok((origin.to_true_of_date * apparent, origin))
    }

    /// Geometric (unrefracted) topocentric place of a body.
    pub fn topocentric(&self, handle: &BodyHandle, ts: &TimeScales) -> Result<Topocentric, CelestialError> {
        let (tod, origin) = self.apparent_vector(handle, ts, true)?;
        let (ra, dec, distance_km) = cartesian_to_radec(tod);

        let itrs = rotmt(-origin.gast, Axis::Z) * tod;
        let (altitude, azimuth) = self.itrs_to_horizon(&itrs);

        let hour_angle = (origin.gast + self.observer.longitude().to_radians() - ra).rem_euclid(DPI);

        Ok(Topocentric {
            azimuth: azimuth.to_degrees(),
            altitude: altitude.to_degrees(),
            right_ascension: ra.to_degrees(),
            declination: dec.to_degrees(),
            hour_angle,
            distance_km,
        })
    }

    /// Geometric altitude in degrees.
    pub fn altitude(&self, handle: &BodyHandle, ts: &TimeScales) -> Result<Degree, CelestialError> {
        Ok(self.topocentric(handle, ts)?.altitude)
    }

    /// Apparent place with refraction for the given air conditions.
    pub fn position_of(
        &self,
        handle: &BodyHandle,
        ts: &TimeScales,
        atmosphere: &Atmosphere,
    ) -> Result<ApparentPosition, CelestialError> {
        let topo = self.topocentric(handle, ts)?;
        Ok(ApparentPosition {
            azimuth: topo.azimuth,
            altitude: refract(topo.altitude, atmosphere),
            right_ascension: topo.right_ascension,
            declination: topo.declination,
            earth_distance: self.earth_distance(handle, ts)?,
        })
    }

    /// Geocentric apparent vector on the true equator of date (km).
    pub fn geocentric_apparent(&self, handle: &BodyHandle, ts: &TimeScales) -> Result<Vector3<f64>, CelestialError> {
        Ok(self.apparent_vector(handle, ts, false)?.0)
    }

    /// Light-time corrected distance from the geocenter, AU.
    pub fn earth_distance(&self, handle: &BodyHandle, ts: &TimeScales) -> Result<AstronomicalUnit, CelestialError> {
        let origin = self.origin_state(ts, false)?;
        Ok(self.light_time_vector(handle, ts.et_seconds, &origin.position)?.norm() / AU)
    }

    /// Geocentric apparent ecliptic longitude of date, degrees in [0, 360).
    pub fn ecliptic_longitude(&self, handle: &BodyHandle, ts: &TimeScales) -> Result<Degree, CelestialError> {
        let tod = self.geocentric_apparent(handle, ts)?;
        let ecliptic = rotmt(-true_obliquity(ts.mjd_tt), Axis::X) * tod;
        Ok(ecliptic.y.atan2(ecliptic.x).to_degrees().rem_euclid(360.0))
    }

    /// Sun-target-Earth angle at the target, radians.
    pub fn phase_angle(&self, target: &BodyHandle, sun: &BodyHandle, ts: &TimeScales) -> Result<Radian, CelestialError> {
        let t = self.geocentric_apparent(target, ts)?;
        let s = self.geocentric_apparent(sun, ts)?;
        Ok((s - t).angle(&(-t)))
    }

    /// Illuminated percentage of the target's disk (0..100).
    pub fn fraction_illuminated(&self, target: &BodyHandle, sun: &BodyHandle, ts: &TimeScales) -> Result<f64, CelestialError> {
        Ok(50.0 * (1.0 + self.phase_angle(target, sun, ts)?.cos()))
    }

    /// Rotate an Earth-fixed direction into `(altitude, azimuth)` radians.
    fn itrs_to_horizon(&self, itrs_direction: &Vector3<f64>) -> (f64, f64) {
        let (slat, clat) = self.observer.latitude().to_radians().sin_cos();
        let (slon, clon) = self.observer.longitude().to_radians().sin_cos();

        // south, east, up
        let south = slat * clon * itrs_direction.x + slat * slon * itrs_direction.y
            - clat * itrs_direction.z;
        let east = -slon * itrs_direction.x + clon * itrs_direction.y;
        let up = clat * clon * itrs_direction.x + clat * slon * itrs_direction.y + slat * itrs_direction.z;

        let alt = up.atan2((south * south + east * east).sqrt());
        let az = east.atan2(-south).rem_euclid(DPI);
        (alt, az)
    }
}

/// Apparent angular radius of the Moon at a given distance, degrees.
pub fn moon_semi_diameter(distance_km: f64) -> Degree {
    (MOON_RADIUS_KM / distance_km).clamp(-1.0, 1.0).asin().to_degrees()
}

#[cfg(test)]
mod frame_test {
    use super::*;
    use crate::{
        jpl_ephem::{resolve_all, CelestialBody},
        time::unix_to_mjd,
        unit_test_global::{analytic_ephemeris, utc_unix},
    };
    use approx::assert_relative_eq;

    #[test]
    fn test_refraction_at_horizon() {
        let r = refraction(0.0, 10.0, 1010.0);
        // about 34 arcminutes, the standard horizon refraction
        assert!(r > 0.55 && r < 0.60, "refraction at horizon {r}");
        assert_eq!(refraction(90.0, 10.0, 1010.0), 0.0);
        assert_eq!(refraction(-5.0, 10.0, 1010.0), 0.0);

        let atmosphere = Atmosphere { temperature_c: 10.0, pressure_mbar: 1010.0 };
        assert!(refract(10.0, &atmosphere) > 10.0);
        assert_relative_eq!(refract(-10.0, &atmosphere), -10.0);
        // no pressure, no refraction
        let vacuum = Atmosphere { temperature_c: 10.0, pressure_mbar: 0.0 };
        assert_relative_eq!(refract(5.0, &vacuum), 5.0);
    }

    #[test]
    fn test_atmosphere_fallbacks() {
        let observer = GeoObserver::new(40.0, -88.0, 220.0).unwrap();
        let standard = Atmosphere::standard(&observer);
        assert_eq!(standard.temperature_c, 10.0);
        assert_relative_eq!(standard.pressure_mbar, 1010.0 * (-220.0f64 / 9100.0).exp());

        let measured = Atmosphere::from_measurements(&observer, Some(18.4), Some(1020.25));
        assert_eq!(measured, Atmosphere { temperature_c: 18.4, pressure_mbar: 1020.25 });

        let partial = Atmosphere::from_measurements(&observer, None, Some(f64::NAN));
        assert_eq!(partial, standard);
    }

    #[test]
    fn test_cartesian_to_radec() {
        let (ra, dec, r) = cartesian_to_radec(Vector3::new(0.0, -1.0, 1.0));
        assert_relative_eq!(ra, 1.5 * std::f64::consts::PI);
        assert_relative_eq!(dec, std::f64::consts::FRAC_PI_4);
        assert_relative_eq!(r, 2f64.sqrt());
        assert_eq!(cartesian_to_radec(Vector3::zeros()), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_sun_near_equinox() {
        let ephem = analytic_ephemeris();
        let bodies = resolve_all(&ephem).unwrap();
        let observer = GeoObserver::new(0.0, 0.0, 0.0).unwrap();
        let frame = Frame::new(&ephem, &bodies.earth, &observer);
        let sun = bodies.get(CelestialBody::Sun);

        // noon on the prime meridian, day of the March equinox; the equation
        // of time keeps the Sun about 7 minutes from transit
        let ts = TimeScales::from_mjd_utc(unix_to_mjd(utc_unix(2024, 3, 20, 12, 0)));
        let topo = frame.topocentric(sun, &ts).unwrap();
        assert!(topo.declination.abs() < 0.6, "declination {}", topo.declination);
        assert!(topo.altitude > 88.0, "altitude {}", topo.altitude);

        let distance = frame.earth_distance(sun, &ts).unwrap();
        assert_relative_eq!(distance, 1.0, epsilon = 1e-3);

        let lon = frame.ecliptic_longitude(sun, &ts).unwrap();
        assert!(lon < 1.0 || lon > 359.0, "ecliptic longitude {lon}");
    }

    #[test]
    fn test_position_of_refracts_altitude() {
        let ephem = analytic_ephemeris();
        let bodies = resolve_all(&ephem).unwrap();
        let observer = GeoObserver::new(40.0, -88.0, 220.0).unwrap();
        let frame = Frame::new(&ephem, &bodies.earth, &observer);
        let sun = bodies.get(CelestialBody::Sun);

        let ts = TimeScales::from_mjd_utc(unix_to_mjd(utc_unix(2024, 3, 21, 14, 0)));
        let topo = frame.topocentric(sun, &ts).unwrap();
        let apparent = frame.position_of(sun, &ts, &Atmosphere::standard(&observer)).unwrap();

        assert!(apparent.altitude >= topo.altitude);
        assert!(apparent.altitude - topo.altitude < 0.6);
        assert_eq!(apparent.azimuth, topo.azimuth);
        assert!((0.0..360.0).contains(&apparent.azimuth));
        assert!((0.0..360.0).contains(&apparent.right_ascension));
    }

    #[test]
    fn test_moon_illumination_range() {
        let ephem = analytic_ephemeris();
        let bodies = resolve_all(&ephem).unwrap();
        let observer = GeoObserver::new(40.0, -88.0, 220.0).unwrap();
        let frame = Frame::new(&ephem, &bodies.earth, &observer);
        let moon = bodies.get(CelestialBody::Moon);
        let sun = bodies.get(CelestialBody::Sun);

        // new moon of the analytic model, then a week later
        let new_moon = TimeScales::from_mjd_utc(unix_to_mjd(utc_unix(2024, 3, 10, 9, 0)));
        let lit = frame.fraction_illuminated(moon, sun, &new_moon).unwrap();
        assert!(lit < 1.0, "new moon illumination {lit}");

        let full = TimeScales::from_mjd_utc(new_moon.mjd_utc + 29.530589 / 2.0);
        let lit = frame.fraction_illuminated(moon, sun, &full).unwrap();
        assert!(lit > 99.0, "full moon illumination {lit}");

        let semi = moon_semi_diameter(frame.topocentric(moon, &full).unwrap().distance_km);
        assert!(semi > 0.24 && semi < 0.27);
    }
}
