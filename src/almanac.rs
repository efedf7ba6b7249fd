//! Almanac: when does X happen?
//!
//! State functions over a [`Frame`] for the seasons, the lunar quarters, the
//! twilight bands, horizon crossings and meridian transits, fed to the
//! [`searchlib`](crate::searchlib) engine. The raw integer states of the engine
//! are translated into [`SeasonEvent`], [`MoonPhaseEvent`] and [`TwilightBand`]
//! here and nowhere else.
use crate::{
    celestial_errors::CelestialError,
    constants::{
        Degree, ASTRONOMICAL_TWILIGHT_DEGREES, CIVIL_TWILIGHT_DEGREES, MJD,
        NAUTICAL_TWILIGHT_DEGREES, REFRACTION_DEGREES, SUN_HORIZON_DEGREES,
    },
    jpl_ephem::{BodyHandle, CelestialBody, Ephemeris},
    observers::frame::{moon_semi_diameter, Frame, Topocentric},
    searchlib::{find_discrete, find_maxima, find_minima},
    time::TimeScales,
};

/// Sampling step for horizon crossings and transits (one hour).
pub const RISE_SET_STEP_DAYS: f64 = 1.0 / 24.0;
/// Sampling step for twilight bands (15 minutes).
pub const TWILIGHT_STEP_DAYS: f64 = 15.0 / 1440.0;
pub const MOON_PHASE_STEP_DAYS: f64 = 1.0;
pub const SEASON_STEP_DAYS: f64 = 30.0;

/// Lunar quarter entered at a phase event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoonPhaseEvent {
    NewMoon,
    FirstQuarter,
    FullMoon,
    LastQuarter,
}

impl MoonPhaseEvent {
    fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(MoonPhaseEvent::NewMoon),
            1 => Some(MoonPhaseEvent::FirstQuarter),
            2 => Some(MoonPhaseEvent::FullMoon),
            3 => Some(MoonPhaseEvent::LastQuarter),
            _ => None,
        }
    }
}

/// Equinox or solstice, named for the northern hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeasonEvent {
    SpringEquinox,
    SummerSolstice,
    FallEquinox,
    WinterSolstice,
}

impl SeasonEvent {
    fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(SeasonEvent::SpringEquinox),
            1 => Some(SeasonEvent::SummerSolstice),
            2 => Some(SeasonEvent::FallEquinox),
            3 => Some(SeasonEvent::WinterSolstice),
            _ => None,
        }
    }

    pub fn is_equinox(&self) -> bool {
        matches!(self, SeasonEvent::SpringEquinox | SeasonEvent::FallEquinox)
    }
}

/// Sky brightness band set by the Sun's altitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TwilightBand {
    Night,
    AstronomicalTwilight,
    NauticalTwilight,
    CivilTwilight,
    Day,
}

impl TwilightBand {
    pub fn from_sun_altitude(alt: Degree) -> Self {
        if alt >= SUN_HORIZON_DEGREES {
            TwilightBand::Day
        } else if alt >= CIVIL_TWILIGHT_DEGREES {
            TwilightBand::CivilTwilight
        } else if alt >= NAUTICAL_TWILIGHT_DEGREES {
            TwilightBand::NauticalTwilight
        } else if alt >= ASTRONOMICAL_TWILIGHT_DEGREES {
            TwilightBand::AstronomicalTwilight
        } else {
            TwilightBand::Night
        }
    }

    fn code(&self) -> i64 {
        *self as i64
    }

    fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(TwilightBand::Night),
            1 => Some(TwilightBand::AstronomicalTwilight),
            2 => Some(TwilightBand::NauticalTwilight),
            3 => Some(TwilightBand::CivilTwilight),
            4 => Some(TwilightBand::Day),
            _ => None,
        }
    }
}

/// Twilight band bounded by two Sun depressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TwilightKind {
    Astronomical,
    Nautical,
    Civil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TwilightEdge {
    Start,
    End,
}

/// A change of twilight band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwilightTransition {
    pub time: MJD,
    pub from: TwilightBand,
    pub to: TwilightBand,
}

impl TwilightTransition {
    /// Twilight boundaries crossed by this transition.
    ///
    /// Brightening starts a twilight, darkening ends it. The civil/day
    /// boundary is sunrise or sunset and yields nothing.
    pub fn boundaries(&self) -> Vec<(TwilightKind, TwilightEdge)> {
        let edge = if self.to > self.from {
            TwilightEdge::Start
        } else {
            TwilightEdge::End
        };
        let (low, high) = (self.from.min(self.to).code(), self.from.max(self.to).code());
        (low..high)
            .filter_map(|lower_band| match lower_band {
                0 => Some(TwilightKind::Astronomical),
                1 => Some(TwilightKind::Nautical),
                2 => Some(TwilightKind::Civil),
                _ => None,
            })
            .map(|kind| (kind, edge))
            .collect()
    }
}

fn time_scales(mjd: &[MJD]) -> impl Iterator<Item = TimeScales> + '_ {
    mjd.iter().map(|&t| TimeScales::from_mjd_utc(t))
}

/// Altitude (degrees) a body's center has when its upper limb touches the
/// refracted horizon.
pub fn horizon_degrees(body: CelestialBody, topo: &Topocentric) -> Degree {
    match body {
        CelestialBody::Sun => SUN_HORIZON_DEGREES,
        CelestialBody::Moon => REFRACTION_DEGREES - moon_semi_diameter(topo.distance_km),
        _ => REFRACTION_DEGREES,
    }
}

/// Sun-season state: `floor(λ☉ / 90°)`.
pub fn seasons<'f, E: Ephemeris + ?Sized>(
    frame: &'f Frame<'f, E>,
    sun: &'f BodyHandle,
) -> impl FnMut(&[MJD]) -> Result<Vec<i64>, CelestialError> + 'f {
    move |mjd: &[MJD]| -> Result<Vec<i64>, CelestialError> {
        time_scales(mjd)
            .map(|ts| Ok((frame.ecliptic_longitude(sun, &ts)? / 90.0).floor() as i64 % 4))
            .collect()
    }
}

/// Moon phase angle: `(λ☾ − λ☉) mod 360°`.
pub fn moon_phase_angle<E: Ephemeris + ?Sized>(
    frame: &Frame<'_, E>,
    sun: &BodyHandle,
    moon: &BodyHandle,
    ts: &TimeScales,
) -> Result<Degree, CelestialError> {
    let sun_lon = frame.ecliptic_longitude(sun, ts)?;
    let moon_lon = frame.ecliptic_longitude(moon, ts)?;
    Ok((moon_lon - sun_lon).rem_euclid(360.0))
}

/// Lunar quarter state: `floor(phase angle / 90°)`.
pub fn moon_phases<'f, E: Ephemeris + ?Sized>(
    frame: &'f Frame<'f, E>,
    sun: &'f BodyHandle,
    moon: &'f BodyHandle,
) -> impl FnMut(&[MJD]) -> Result<Vec<i64>, CelestialError> + 'f {
    move |mjd: &[MJD]| -> Result<Vec<i64>, CelestialError> {
        time_scales(mjd)
            .map(|ts| Ok((moon_phase_angle(frame, sun, moon, &ts)? / 90.0).floor() as i64 % 4))
            .collect()
    }
}

/// Twilight band state of the Sun (0 night .. 4 day).
pub fn dark_twilight_day<'f, E: Ephemeris + ?Sized>(
    frame: &'f Frame<'f, E>,
    sun: &'f BodyHandle,
) -> impl FnMut(&[MJD]) -> Result<Vec<i64>, CelestialError> + 'f {
    move |mjd: &[MJD]| -> Result<Vec<i64>, CelestialError> {
        time_scales(mjd)
            .map(|ts| Ok(TwilightBand::from_sun_altitude(frame.altitude(sun, &ts)?).code()))
            .collect()
    }
}

/// Altitude above the body's rise/set threshold, degrees.
fn horizon_margin<E: Ephemeris + ?Sized>(
    frame: &Frame<'_, E>,
    body: CelestialBody,
    handle: &BodyHandle,
    ts: &TimeScales,
) -> Result<Degree, CelestialError> {
    let topo = frame.topocentric(handle, ts)?;
    Ok(topo.altitude - horizon_degrees(body, &topo))
}

/// 1 while the body is above its rise/set threshold.
pub fn risings_and_settings<'f, E: Ephemeris + ?Sized>(
    frame: &'f Frame<'f, E>,
    body: CelestialBody,
    handle: &'f BodyHandle,
) -> impl FnMut(&[MJD]) -> Result<Vec<i64>, CelestialError> + 'f {
    move |mjd: &[MJD]| -> Result<Vec<i64>, CelestialError> {
        time_scales(mjd)
            .map(|ts| Ok(i64::from(horizon_margin(frame, body, handle, &ts)? >= 0.0)))
            .collect()
    }
}

/// 1 while the body is west of the meridian (hour angle in [0, 12h)).
pub fn meridian_transits<'f, E: Ephemeris + ?Sized>(
    frame: &'f Frame<'f, E>,
    handle: &'f BodyHandle,
) -> impl FnMut(&[MJD]) -> Result<Vec<i64>, CelestialError> + 'f {
    move |mjd: &[MJD]| -> Result<Vec<i64>, CelestialError> {
        time_scales(mjd)
            .map(|ts| {
                let hour_angle = frame.topocentric(handle, &ts)?.hour_angle;
                Ok(i64::from(hour_angle < std::f64::consts::PI))
            })
            .collect()
    }
}

/// Equinoxes and solstices in `[start, end]`.
pub fn find_seasons<E: Ephemeris + ?Sized>(
    frame: &Frame<'_, E>,
    sun: &BodyHandle,
    start: MJD,
    end: MJD,
) -> Result<Vec<(MJD, SeasonEvent)>, CelestialError> {
    Ok(find_discrete(start, end, SEASON_STEP_DAYS, &mut seasons(frame, sun))?
        .into_iter()
        .filter_map(|(t, code)| SeasonEvent::from_code(code).map(|event| (t, event)))
        .collect())
}

/// Lunar quarters in `[start, end]`.
pub fn find_moon_phases<E: Ephemeris + ?Sized>(
    frame: &Frame<'_, E>,
    sun: &BodyHandle,
    moon: &BodyHandle,
    start: MJD,
    end: MJD,
) -> Result<Vec<(MJD, MoonPhaseEvent)>, CelestialError> {
    Ok(
        find_discrete(start, end, MOON_PHASE_STEP_DAYS, &mut moon_phases(frame, sun, moon))?
            .into_iter()
            .filter_map(|(t, code)| MoonPhaseEvent::from_code(code).map(|event| (t, event)))
            .collect(),
    )
}

/// Twilight band changes in `[start, end]`, each with the band it leaves.
pub fn find_twilight<E: Ephemeris + ?Sized>(
    frame: &Frame<'_, E>,
    sun: &BodyHandle,
    start: MJD,
    end: MJD,
) -> Result<Vec<TwilightTransition>, CelestialError> {
    let events = find_discrete(start, end, TWILIGHT_STEP_DAYS, &mut dark_twilight_day(frame, sun))?;

    let mut from =
        TwilightBand::from_sun_altitude(frame.altitude(sun, &TimeScales::from_mjd_utc(start))?);
    let mut transitions = Vec::with_capacity(events.len());
    for (time, to) in events
        .into_iter()
        .filter_map(|(t, code)| TwilightBand::from_code(code).map(|band| (t, band)))
    {
        transitions.push(TwilightTransition { time, from, to });
        from = to;
    }
    Ok(transitions)
}

/// Instant where the body comes closest to its threshold without crossing it.
fn closest_approach<E: Ephemeris + ?Sized>(
    frame: &Frame<'_, E>,
    body: CelestialBody,
    handle: &BodyHandle,
    start: MJD,
    end: MJD,
) -> Result<MJD, CelestialError> {
    let mut margin = |mjd: &[MJD]| -> Result<Vec<f64>, CelestialError> {
        time_scales(mjd)
            .map(|ts| horizon_margin(frame, body, handle, &ts))
            .collect()
    };

    let ends = margin(&[start, end])?;
    let (at_start, at_end) = (ends[0], ends[1]);

    // stays below: highest point; stays above: lowest point
    let extrema = if at_start < 0.0 {
        find_maxima(start, end, RISE_SET_STEP_DAYS, &mut margin)?
    } else {
        find_minima(start, end, RISE_SET_STEP_DAYS, &mut margin)?
    };

    let edges = [(start, at_start), (end, at_end)];
    let closest = extrema
        .into_iter()
        .chain(edges)
        .min_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
        .map(|(t, _)| t)
        .unwrap_or(start);
    Ok(closest)
}

fn find_crossings<E: Ephemeris + ?Sized>(
    frame: &Frame<'_, E>,
    body: CelestialBody,
    handle: &BodyHandle,
    start: MJD,
    end: MJD,
    target_state: i64,
) -> Result<Vec<(MJD, bool)>, CelestialError> {
    let crossings: Vec<(MJD, bool)> = find_discrete(
        start,
        end,
        RISE_SET_STEP_DAYS,
        &mut risings_and_settings(frame, body, handle),
    )?
    .into_iter()
    .filter(|(_, state)| *state == target_state)
    .map(|(t, _)| (t, true))
    .collect();

    if crossings.is_empty() {
        return Ok(vec![(closest_approach(frame, body, handle, start, end)?, false)]);
    }
    Ok(crossings)
}

/// Risings in `[start, end]`.
///
/// When the body never rises, a single `(instant, false)` entry gives the
/// moment it comes closest to its threshold.
pub fn find_risings<E: Ephemeris + ?Sized>(
    frame: &Frame<'_, E>,
    body: CelestialBody,
    handle: &BodyHandle,
    start: MJD,
    end: MJD,
) -> Result<Vec<(MJD, bool)>, CelestialError> {
    find_crossings(frame, body, handle, start, end, 1)
}

/// Settings in `[start, end]`, same conventions as [`find_risings`].
pub fn find_settings<E: Ephemeris + ?Sized>(
    frame: &Frame<'_, E>,
    body: CelestialBody,
    handle: &BodyHandle,
    start: MJD,
    end: MJD,
) -> Result<Vec<(MJD, bool)>, CelestialError> {
    find_crossings(frame, body, handle, start, end, 0)
}

/// Upper meridian transits in `[start, end]`.
pub fn find_transits<E: Ephemeris + ?Sized>(
    frame: &Frame<'_, E>,
    handle: &BodyHandle,
    start: MJD,
    end: MJD,
) -> Result<Vec<MJD>, CelestialError> {
    Ok(find_discrete(start, end, RISE_SET_STEP_DAYS, &mut meridian_transits(frame, handle))?
        .into_iter()
        .filter(|(_, state)| *state == 1)
        .map(|(t, _)| t)
        .collect())
}

#[cfg(test)]
mod almanac_test {
    use super::*;
    use crate::{
        jpl_ephem::resolve_all,
        observers::GeoObserver,
        time::unix_to_mjd,
        unit_test_global::{analytic_ephemeris, utc_unix},
    };
    use approx::assert_abs_diff_eq;
    use itertools::Itertools;

    fn mjd(y: i32, m: u32, d: u32, h: u32, min: u32) -> MJD {
        unix_to_mjd(utc_unix(y, m, d, h, min))
    }

    #[test]
    fn test_twilight_band_thresholds() {
        assert_eq!(TwilightBand::from_sun_altitude(10.0), TwilightBand::Day);
        assert_eq!(TwilightBand::from_sun_altitude(-0.8333), TwilightBand::Day);
        assert_eq!(TwilightBand::from_sun_altitude(-1.0), TwilightBand::CivilTwilight);
        assert_eq!(TwilightBand::from_sun_altitude(-6.5), TwilightBand::NauticalTwilight);
        assert_eq!(TwilightBand::from_sun_altitude(-12.5), TwilightBand::AstronomicalTwilight);
        assert_eq!(TwilightBand::from_sun_altitude(-30.0), TwilightBand::Night);
        assert!(TwilightBand::Night < TwilightBand::Day);
        assert_eq!(TwilightBand::from_code(7), None);
    }

    #[test]
    fn test_twilight_boundaries() {
        use TwilightBand::*;
        let at = |from, to| TwilightTransition { time: 0.0, from, to };
        assert_eq!(
            at(Night, AstronomicalTwilight).boundaries(),
            vec![(TwilightKind::Astronomical, TwilightEdge::Start)]
        );
        assert_eq!(
            at(CivilTwilight, NauticalTwilight).boundaries(),
            vec![(TwilightKind::Civil, TwilightEdge::End)]
        );
        assert!(at(CivilTwilight, Day).boundaries().is_empty());
        // a jump over two boundaries labels both
        assert_eq!(
            at(NauticalTwilight, Night).boundaries(),
            vec![
                (TwilightKind::Astronomical, TwilightEdge::End),
                (TwilightKind::Nautical, TwilightEdge::End)
            ]
        );
    }

    #[test]
    fn test_event_code_translation() {
        assert_eq!(MoonPhaseEvent::from_code(2), Some(MoonPhaseEvent::FullMoon));
        assert_eq!(MoonPhaseEvent::from_code(4), None);
        assert_eq!(SeasonEvent::from_code(1), Some(SeasonEvent::SummerSolstice));
        assert!(SeasonEvent::FallEquinox.is_equinox());
        assert!(!SeasonEvent::WinterSolstice.is_equinox());
    }

    #[test]
    fn test_sun_rises_and_sets_once_at_mid_latitude() {
        let ephem = analytic_ephemeris();
        let bodies = resolve_all(&ephem).unwrap();
        let observer = GeoObserver::new(40.0, -88.0, 220.0).unwrap();
        let frame = Frame::new(&ephem, &bodies.earth, &observer);
        let sun = bodies.get(CelestialBody::Sun);

        // local midnight at 88°W is about 06:00 UTC
        let start = mjd(2024, 3, 21, 6, 0);
        let rises = find_risings(&frame, CelestialBody::Sun, sun, start, start + 1.0).unwrap();
        let sets = find_settings(&frame, CelestialBody::Sun, sun, start, start + 1.0).unwrap();
        let transits = find_transits(&frame, sun, start, start + 1.0).unwrap();

        assert_eq!(rises.len(), 1);
        assert_eq!(sets.len(), 1);
        assert_eq!(transits.len(), 1);
        assert!(rises[0].1 && sets[0].1);
        assert!(rises[0].0 < transits[0] && transits[0] < sets[0].0);

        // roughly twelve hours of daylight at the equinox
        let daylight_hours = (sets[0].0 - rises[0].0) * 24.0;
        assert!(daylight_hours > 11.8 && daylight_hours < 12.5, "{daylight_hours}");

        // transit near 12:00 local mean time, 88°W
        assert_abs_diff_eq!(transits[0], mjd(2024, 3, 21, 17, 52), epsilon = 0.01);
    }

    #[test]
    fn test_polar_night_has_no_crossing() {
        let ephem = analytic_ephemeris();
        let bodies = resolve_all(&ephem).unwrap();
        let observer = GeoObserver::new(80.0, 15.0, 0.0).unwrap();
        let frame = Frame::new(&ephem, &bodies.earth, &observer);
        let sun = bodies.get(CelestialBody::Sun);

        let start = mjd(2024, 12, 20, 23, 0);
        let rises = find_risings(&frame, CelestialBody::Sun, sun, start, start + 1.0).unwrap();
        assert_eq!(rises.len(), 1);
        assert!(!rises[0].1);
        // closest approach is local noon, about 11:00 UTC at 15°E
        assert_abs_diff_eq!(rises[0].0, mjd(2024, 12, 21, 11, 0), epsilon = 0.05);
    }

    #[test]
    fn test_twilight_transitions_are_symmetric() {
        let ephem = analytic_ephemeris();
        let bodies = resolve_all(&ephem).unwrap();
        let observer = GeoObserver::new(40.0, -88.0, 220.0).unwrap();
        let frame = Frame::new(&ephem, &bodies.earth, &observer);
        let sun = bodies.get(CelestialBody::Sun);

        let start = mjd(2024, 3, 21, 6, 0);
        let transitions = find_twilight(&frame, sun, start, start + 1.0).unwrap();
        let path: Vec<(TwilightBand, TwilightBand)> =
            transitions.iter().map(|t| (t.from, t.to)).collect();

        use TwilightBand::*;
        assert_eq!(
            path,
            vec![
                (Night, AstronomicalTwilight),
                (AstronomicalTwilight, NauticalTwilight),
                (NauticalTwilight, CivilTwilight),
                (CivilTwilight, Day),
                (Day, CivilTwilight),
                (CivilTwilight, NauticalTwilight),
                (NauticalTwilight, AstronomicalTwilight),
                (AstronomicalTwilight, Night),
            ]
        );
        assert!(transitions.iter().tuple_windows().all(|(a, b)| a.time < b.time));
    }

    #[test]
    fn test_seasons_and_moon_phases() {
        let ephem = analytic_ephemeris();
        let bodies = resolve_all(&ephem).unwrap();
        let observer = GeoObserver::new(40.0, -88.0, 220.0).unwrap();
        let frame = Frame::new(&ephem, &bodies.earth, &observer);
        let sun = bodies.get(CelestialBody::Sun);
        let moon = bodies.get(CelestialBody::Moon);

        let start = mjd(2024, 3, 1, 0, 0);
        let seasons = find_seasons(&frame, sun, start, start + 366.0).unwrap();
        assert_eq!(seasons.len(), 4);
        assert_eq!(seasons[0].1, SeasonEvent::SpringEquinox);
        assert_abs_diff_eq!(seasons[0].0, mjd(2024, 3, 20, 3, 6), epsilon = 0.5);

        let phases = find_moon_phases(&frame, sun, moon, start, start + 60.0).unwrap();
        let new_moon = phases.iter().find(|(_, e)| *e == MoonPhaseEvent::NewMoon).unwrap();
        assert_abs_diff_eq!(new_moon.0, mjd(2024, 3, 10, 9, 0), epsilon = 0.1);
        assert!(phases.iter().any(|(_, e)| *e == MoonPhaseEvent::FullMoon));

        let angle = moon_phase_angle(&frame, sun, moon, &TimeScales::from_mjd_utc(new_moon.0 + 14.765)).unwrap();
        assert_abs_diff_eq!(angle, 180.0, epsilon = 1.0);
    }
}
