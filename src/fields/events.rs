//! Day-relative events: rise, set, transit, daylight, twilight, seasons and
//! lunar phases, all searched from the local midnight of the sample's day.
use crate::{
    almanac::{
        find_moon_phases, find_risings, find_seasons, find_settings, find_transits,
        find_twilight, MoonPhaseEvent, TwilightEdge, TwilightKind,
    },
    celestial_errors::CelestialError,
    constants::{MJD, SECONDS_PER_DAY, SUN_HORIZON_DEGREES},
    day_window::DayWindow,
    jpl_ephem::{CelestialBody, Ephemeris},
    time::{mjd_to_unix, TimeScales},
};

use super::{names::*, FieldContext, FieldValue, GroupFields, GroupResult};

/// Moonrise can fall after the end of the calendar day.
const MOON_WINDOW_DAYS: f64 = 2.0;
const LUNAR_WINDOW_DAYS: f64 = 60.0;
const SEASON_WINDOW_DAYS: f64 = 366.0;

/// Sun events of one day window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunDay {
    pub rise: Option<MJD>,
    pub transit: Option<MJD>,
    pub set: Option<MJD>,
    /// seconds, in [0, 86400]
    pub daylight: f64,
}

fn first_crossing(events: &[(MJD, bool)]) -> Option<MJD> {
    events.iter().find(|(_, crossed)| *crossed).map(|(t, _)| *t)
}

/// Days spent above the horizon in `[start, end]`, given every horizon
/// crossing in time order (`true` for a rising).
fn time_above(start: MJD, end: MJD, crossings: &[(MJD, bool)], above_at_start: bool) -> f64 {
    let mut total = 0.0;
    let mut since = above_at_start.then_some(start);
    for &(t, rising) in crossings {
        match (rising, since) {
            (true, None) => since = Some(t),
            (false, Some(from)) => {
                total += t - from;
                since = None;
            }
            _ => {}
        }
    }
    if let Some(from) = since {
        total += end - from;
    }
    total
}

/// Rise, transit, set and daylight duration of the Sun within `window`.
///
/// `rise` and `set` are the first crossings of the day; the daylight sums
/// every above-horizon stretch, so a set in the morning followed by a rise
/// counts `(set - start) + (end - rise)`.
pub fn sun_day<E: Ephemeris + ?Sized>(
    ctx: &FieldContext<'_, E>,
    window: &DayWindow,
) -> Result<SunDay, CelestialError> {
    let sun = ctx.bodies.get(CelestialBody::Sun);
    let (start, end) = (window.start(), window.end());

    let risings = find_risings(&ctx.frame, CelestialBody::Sun, sun, start, end)?;
    let settings = find_settings(&ctx.frame, CelestialBody::Sun, sun, start, end)?;
    let transit = find_transits(&ctx.frame, sun, start, end)?.first().copied();

    let mut crossings: Vec<(MJD, bool)> = risings
        .iter()
        .filter(|(_, crossed)| *crossed)
        .map(|(t, _)| (*t, true))
        .chain(settings.iter().filter(|(_, crossed)| *crossed).map(|(t, _)| (*t, false)))
        .collect();
    crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

    let above_at_start = match crossings.first() {
        // a day that starts with a setting starts above the horizon
        Some(&(_, rising)) => !rising,
        None => ctx.frame.altitude(sun, &TimeScales::from_mjd_utc(start))? > SUN_HORIZON_DEGREES,
    };
    let days = time_above(start, end, &crossings, above_at_start);

    Ok(SunDay {
        rise: first_crossing(&risings),
        transit,
        set: first_crossing(&settings),
        daylight: (days * SECONDS_PER_DAY).clamp(0.0, window.length_seconds()),
    })
}

fn push_time(fields: &mut GroupFields, name: &'static str, time: Option<MJD>) {
    if let Some(t) = time {
        fields.push((name, FieldValue::Float(mjd_to_unix(t))));
    }
}

pub(super) fn sun_events<E: Ephemeris + ?Sized>(ctx: &FieldContext<'_, E>, window: &DayWindow) -> GroupResult {
    let day = sun_day(ctx, window)?;
    let mut fields = Vec::with_capacity(4);
    push_time(&mut fields, SUNRISE, day.rise);
    push_time(&mut fields, SUN_TRANSIT, day.transit);
    push_time(&mut fields, SUNSET, day.set);
    fields.push((DAY_SUNSHINE_DUR, day.daylight.into()));
    Ok(fields)
}

pub(super) fn sun_events_yesterday<E: Ephemeris + ?Sized>(
    ctx: &FieldContext<'_, E>,
    yesterday: &DayWindow,
) -> GroupResult {
    Ok(vec![(YESTERDAY_SUNSHINE_DUR, sun_day(ctx, yesterday)?.daylight.into())])
}

pub(super) fn sun_events_tomorrow<E: Ephemeris + ?Sized>(
    ctx: &FieldContext<'_, E>,
    tomorrow: &DayWindow,
) -> GroupResult {
    let day = sun_day(ctx, tomorrow)?;
    let mut fields = Vec::with_capacity(2);
    push_time(&mut fields, TOMORROW_SUNRISE, day.rise);
    push_time(&mut fields, TOMORROW_SUNSET, day.set);
    Ok(fields)
}

pub(super) fn moon_events<E: Ephemeris + ?Sized>(ctx: &FieldContext<'_, E>, window: &DayWindow) -> GroupResult {
    let moon = ctx.bodies.get(CelestialBody::Moon);
    let (start, end) = (window.start(), window.start() + MOON_WINDOW_DAYS);

    let rise = first_crossing(&find_risings(&ctx.frame, CelestialBody::Moon, moon, start, end)?);
    let set = first_crossing(&find_settings(&ctx.frame, CelestialBody::Moon, moon, start, end)?);
    let transit = find_transits(&ctx.frame, moon, start, end)?.first().copied();

    let mut fields = Vec::with_capacity(3);
    push_time(&mut fields, MOONRISE, rise);
    push_time(&mut fields, MOON_TRANSIT, transit);
    push_time(&mut fields, MOONSET, set);
    Ok(fields)
}

fn twilight_field(kind: TwilightKind, edge: TwilightEdge) -> &'static str {
    match (kind, edge) {
        (TwilightKind::Astronomical, TwilightEdge::Start) => ASTRONOMICAL_TWILIGHT_START,
        (TwilightKind::Astronomical, TwilightEdge::End) => ASTRONOMICAL_TWILIGHT_END,
        (TwilightKind::Nautical, TwilightEdge::Start) => NAUTICAL_TWILIGHT_START,
        (TwilightKind::Nautical, TwilightEdge::End) => NAUTICAL_TWILIGHT_END,
        (TwilightKind::Civil, TwilightEdge::Start) => CIVIL_TWILIGHT_START,
        (TwilightKind::Civil, TwilightEdge::End) => CIVIL_TWILIGHT_END,
    }
}

pub(super) fn twilight<E: Ephemeris + ?Sized>(ctx: &FieldContext<'_, E>, window: &DayWindow) -> GroupResult {
    let sun = ctx.bodies.get(CelestialBody::Sun);
    let transitions = find_twilight(&ctx.frame, sun, window.start(), window.end())?;

    let mut fields: GroupFields = Vec::with_capacity(6);
    for transition in &transitions {
        for (kind, edge) in transition.boundaries() {
            let name = twilight_field(kind, edge);
            // first occurrence wins
            if fields.iter().all(|(n, _)| *n != name) {
                fields.push((name, FieldValue::Float(mjd_to_unix(transition.time))));
            }
        }
    }
    Ok(fields)
}

pub(super) fn seasons<E: Ephemeris + ?Sized>(ctx: &FieldContext<'_, E>, window: &DayWindow) -> GroupResult {
    let sun = ctx.bodies.get(CelestialBody::Sun);
    let events = find_seasons(&ctx.frame, sun, window.start(), window.start() + SEASON_WINDOW_DAYS)?;

    let equinox = events.iter().find(|(_, e)| e.is_equinox()).map(|(t, _)| *t);
    let solstice = events.iter().find(|(_, e)| !e.is_equinox()).map(|(t, _)| *t);

    let mut fields = Vec::with_capacity(2);
    push_time(&mut fields, NEXT_EQUINOX, equinox);
    push_time(&mut fields, NEXT_SOLSTICE, solstice);
    Ok(fields)
}

pub(super) fn lunar_events<E: Ephemeris + ?Sized>(ctx: &FieldContext<'_, E>, window: &DayWindow) -> GroupResult {
    let sun = ctx.bodies.get(CelestialBody::Sun);
    let moon = ctx.bodies.get(CelestialBody::Moon);
    let events = find_moon_phases(&ctx.frame, sun, moon, window.start(), window.start() + LUNAR_WINDOW_DAYS)?;

    let first = |wanted: MoonPhaseEvent| events.iter().find(|(_, e)| *e == wanted).map(|(t, _)| *t);

    let mut fields = Vec::with_capacity(2);
    push_time(&mut fields, NEXT_FULL_MOON, first(MoonPhaseEvent::FullMoon));
    push_time(&mut fields, NEXT_NEW_MOON, first(MoonPhaseEvent::NewMoon));
    Ok(fields)
}

#[cfg(test)]
mod events_test {
    use super::*;
    use crate::{
        fields::{fields_test::Fixture, OutputRecord},
        unit_test_global::utc_unix,
        units::UnitSystem,
    };
    use approx::assert_abs_diff_eq;

    fn record_of(fields: GroupFields) -> OutputRecord {
        fields.into_iter().collect()
    }

    #[test]
    fn test_mid_latitude_day_ordering() {
        let fixture = Fixture::at(40.0, -88.0, 220.0);
        let ctx = fixture.context(-300);
        let window = DayWindow::containing(utc_unix(2024, 3, 21, 14, 0), ctx.zone).unwrap();

        let mut record = record_of(sun_events(&ctx, &window).unwrap());
        record.merge(record_of(twilight(&ctx, &window).unwrap()));

        let order = [
            ASTRONOMICAL_TWILIGHT_START,
            NAUTICAL_TWILIGHT_START,
            CIVIL_TWILIGHT_START,
            SUNRISE,
            SUN_TRANSIT,
            SUNSET,
            CIVIL_TWILIGHT_END,
            NAUTICAL_TWILIGHT_END,
            ASTRONOMICAL_TWILIGHT_END,
        ];
        let times: Vec<f64> = order.iter().map(|n| record.get_f64(n).unwrap()).collect();
        assert!(times.windows(2).all(|w| w[0] < w[1]), "{record}");

        let daylight = record.get_f64(DAY_SUNSHINE_DUR).unwrap();
        assert_abs_diff_eq!(
            daylight,
            record.get_f64(SUNSET).unwrap() - record.get_f64(SUNRISE).unwrap(),
            epsilon = 1e-3
        );
        // sunrise already passed at 14:00 UTC is still reported
        assert!(record.get_f64(SUNRISE).unwrap() < utc_unix(2024, 3, 21, 14, 0));
    }

    #[test]
    fn test_shifted_windows_agree() {
        let fixture = Fixture::at(40.0, -88.0, 220.0);
        let ctx = fixture.context(-300);
        let today = DayWindow::containing(utc_unix(2024, 5, 2, 18, 0), ctx.zone).unwrap();
        let tomorrow = today.shift(1).unwrap();

        let from_today = sun_day(&ctx, &tomorrow.shift(-1).unwrap()).unwrap();
        let direct = sun_day(&ctx, &today).unwrap();
        assert_eq!(from_today, direct);

        let yesterday = record_of(sun_events_yesterday(&ctx, &tomorrow.shift(-1).unwrap()).unwrap());
        assert_eq!(yesterday.get_f64(YESTERDAY_SUNSHINE_DUR), Some(direct.daylight));

        let next = record_of(sun_events_tomorrow(&ctx, &today.shift(1).unwrap()).unwrap());
        let tomorrow_day = sun_day(&ctx, &tomorrow).unwrap();
        assert_eq!(next.get_f64(TOMORROW_SUNRISE), tomorrow_day.rise.map(mjd_to_unix));
        // sunrise moves earlier by about a minute a day in May
        let shift = tomorrow_day.rise.unwrap() - direct.rise.unwrap();
        assert_abs_diff_eq!(shift, 1.0, epsilon = 3.0 / 1440.0);
    }

    #[test]
    fn test_polar_night_and_polar_day() {
        let night = Fixture::at(80.0, 15.0, 0.0);
        let ctx = night.context(60);
        let window = DayWindow::containing(utc_unix(2024, 12, 21, 12, 0), ctx.zone).unwrap();
        let record = record_of(sun_events(&ctx, &window).unwrap());
        assert!(!record.contains(SUNRISE));
        assert!(!record.contains(SUNSET));
        assert_eq!(record.get_f64(DAY_SUNSHINE_DUR), Some(0.0));

        let day = Fixture::at(80.0, 15.0, 0.0);
        let ctx = day.context(60);
        let window = DayWindow::containing(utc_unix(2024, 6, 21, 12, 0), ctx.zone).unwrap();
        let record = record_of(sun_events(&ctx, &window).unwrap());
        assert!(!record.contains(SUNRISE));
        assert!(!record.contains(SUNSET));
        assert_eq!(record.get_f64(DAY_SUNSHINE_DUR), Some(86400.0));
        // no darkness at all: no twilight boundary either
        assert!(twilight(&ctx, &window).unwrap().is_empty());
    }

    #[test]
    fn test_daylight_bounds_across_latitudes() {
        for latitude in [-89.0, -66.0, -30.0, 0.0, 45.0, 67.0, 89.0] {
            let fixture = Fixture::at(latitude, 0.0, 0.0);
            let ctx = fixture.context(0);
            for (month, day) in [(3, 20), (6, 21), (12, 21)] {
                let window = DayWindow::containing(utc_unix(2024, month, day, 12, 0), ctx.zone).unwrap();
                let daylight = sun_day(&ctx, &window).unwrap().daylight;
                assert!((0.0..=86400.0).contains(&daylight), "{latitude} {month}/{day}: {daylight}");
            }
        }
    }

    #[test]
    fn test_time_above_pairs_every_crossing() {
        let (start, end) = (100.0, 101.0);
        // plain day
        assert_abs_diff_eq!(time_above(start, end, &[(100.25, true), (100.75, false)], false), 0.5, epsilon = 1e-9);
        // rose and never set
        assert_abs_diff_eq!(time_above(start, end, &[(100.1, true)], false), 0.9, epsilon = 1e-9);
        // set and never rose
        assert_abs_diff_eq!(time_above(start, end, &[(100.9, false)], true), 0.9, epsilon = 1e-9);
        // set in the morning, rose again later
        assert_abs_diff_eq!(time_above(start, end, &[(100.1, false), (100.2, true)], true), 0.9, epsilon = 1e-9);
        // set, rise, set: the second setting closes the afternoon stretch
        assert_abs_diff_eq!(
            time_above(start, end, &[(100.1, false), (100.2, true), (100.95, false)], true),
            0.1 + 0.75,
            epsilon = 1e-9
        );
        // no crossing
        assert_eq!(time_above(start, end, &[], true), 1.0);
        assert_eq!(time_above(start, end, &[], false), 0.0);
    }

    /// Run `sun_day` for every day of a date range at 80°N 15°E.
    fn high_latitude_days(utc_offset_minutes: i32, first: (u32, u32), days: i64) -> Vec<(DayWindow, SunDay)> {
        let fixture = Fixture::at(80.0, 15.0, 0.0);
        let ctx = fixture.context(utc_offset_minutes);
        let window = DayWindow::containing(utc_unix(2024, first.0, first.1, 12, 0), ctx.zone).unwrap();
        (0..days)
            .map(|d| {
                let day = window.shift(d).unwrap();
                let sun = sun_day(&ctx, &day).unwrap();
                (day, sun)
            })
            .collect()
    }

    #[test]
    fn test_daylight_of_first_and_last_sunrise() {
        // local midnight close to solar midnight: the last dip below the
        // horizon in April straddles midnight, and so does the first in August
        let spring = high_latitude_days(60, (4, 1), 30);
        let rose_only: Vec<_> = spring
            .iter()
            .filter(|(_, sun)| sun.rise.is_some() && sun.set.is_none())
            .collect();
        assert!(!rose_only.is_empty());
        for (window, sun) in rose_only {
            let expected = (window.end() - sun.rise.unwrap()) * SECONDS_PER_DAY;
            assert_abs_diff_eq!(sun.daylight, expected, epsilon = 1e-3);
        }

        let summer_end = high_latitude_days(60, (8, 10), 30);
        let set_only: Vec<_> = summer_end
            .iter()
            .filter(|(_, sun)| sun.rise.is_none() && sun.set.is_some())
            .collect();
        assert!(!set_only.is_empty());
        for (window, sun) in set_only {
            let expected = (sun.set.unwrap() - window.start()) * SECONDS_PER_DAY;
            assert_abs_diff_eq!(sun.daylight, expected, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_daylight_when_set_comes_before_rise() {
        // local midnight three hours ahead of the sun: the short night dip
        // falls around 02:00 local, inside the window
        let spring = high_latitude_days(180, (4, 1), 30);
        let dipping: Vec<_> = spring
            .iter()
            .filter(|(_, sun)| matches!((sun.rise, sun.set), (Some(rise), Some(set)) if set < rise))
            .collect();
        assert!(!dipping.is_empty());
        for (window, sun) in dipping {
            let (rise, set) = (sun.rise.unwrap(), sun.set.unwrap());
            let expected = ((set - window.start()) + (window.end() - rise)) * SECONDS_PER_DAY;
            assert_abs_diff_eq!(sun.daylight, expected, epsilon = 1e-3);
            assert!(sun.daylight > 0.5 * 86400.0 && sun.daylight < 86400.0);
        }
    }

    #[test]
    fn test_next_events_persist_through_the_day() {
        let fixture = Fixture::at(40.0, -88.0, 220.0);
        let ctx = fixture.context(-300);
        // the equinox falls at 22:06 local on March 19; an hour later it is
        // still that day's next equinox
        let sample = utc_unix(2024, 3, 20, 4, 6);
        let window = DayWindow::containing(sample, ctx.zone).unwrap();
        let record = record_of(seasons(&ctx, &window).unwrap());
        let equinox = record.get_f64(NEXT_EQUINOX).unwrap();
        assert!(equinox < sample);
        assert_abs_diff_eq!(equinox, utc_unix(2024, 3, 20, 3, 6), epsilon = 0.5 * 86400.0);
        assert!(record.get_f64(NEXT_SOLSTICE).unwrap() > equinox);

        let lunar = record_of(lunar_events(&ctx, &window).unwrap());
        let full = lunar.get_f64(NEXT_FULL_MOON).unwrap();
        let new = lunar.get_f64(NEXT_NEW_MOON).unwrap();
        assert!(full > window.start_unix() && new > window.start_unix());
        assert!((new - full).abs() < 30.0 * 86400.0);
    }

    #[test]
    fn test_moon_events_within_two_days() {
        let fixture = Fixture::at(40.0, -88.0, 220.0);
        let ctx = fixture.context(-300);
        let window = DayWindow::containing(utc_unix(2024, 3, 21, 14, 0), ctx.zone).unwrap();
        let record = record_of(moon_events(&ctx, &window).unwrap());
        for name in [MOONRISE, MOON_TRANSIT, MOONSET] {
            let t = record.get_f64(name).unwrap();
            assert!(t >= window.start_unix() && t <= window.start_unix() + 2.0 * 86400.0);
        }
    }

    #[test]
    fn test_full_cycle_scenario() {
        let fixture = Fixture::at(40.0, -88.0, 220.0);
        let ctx = fixture.context(-300);
        let mut sample = fixture.sample(utc_unix(2024, 3, 21, 14, 0), UnitSystem::Metric);
        sample.atmosphere = crate::observers::frame::Atmosphere::from_measurements(
            &fixture.observer,
            Some(18.4),
            Some(1020.25),
        );

        let (record, failures) = ctx.compute_all(&sample);
        assert!(failures.is_empty());
        for name in NUMERIC_FIELDS {
            assert!(record.get_f64(name).is_some(), "missing {name}");
        }
        assert!(record.get(MOON_PHASE).and_then(FieldValue::as_str).is_some());
        let fullness = record.get_f64(MOON_FULLNESS).unwrap();
        assert!((0.0..=100.0).contains(&fullness));
        for name in [EARTH_SUN_DISTANCE, EARTH_MOON_DISTANCE, EARTH_PLUTO_DISTANCE] {
            assert!(record.get_f64(name).unwrap() > 0.0);
        }

        // a pure function of its inputs
        let (again, _) = ctx.compute_all(&sample);
        assert_eq!(record, again);
    }
}
