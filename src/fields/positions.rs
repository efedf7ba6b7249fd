use crate::{
    celestial_errors::CelestialError,
    constants::Degree,
    jpl_ephem::{CelestialBody, Ephemeris},
    time::TimeScales,
};

use super::{names::*, FieldContext, FieldValue, GroupResult, Sample};

fn body_position<E: Ephemeris + ?Sized>(
    ctx: &FieldContext<'_, E>,
    body: CelestialBody,
    ts: &TimeScales,
    sample: &Sample,
    names: [&'static str; 5],
) -> GroupResult {
    let position = ctx
        .frame
        .position_of(ctx.bodies.get(body), ts, &sample.atmosphere)?;
    let [azimuth, altitude, right_ascension, declination, distance] = names;
    Ok(vec![
        (azimuth, position.azimuth.into()),
        (altitude, position.altitude.into()),
        (right_ascension, position.right_ascension.into()),
        (declination, position.declination.into()),
        (distance, sample.units.distance_from_au(position.earth_distance).into()),
    ])
}

pub(super) fn sun_position<E: Ephemeris + ?Sized>(
    ctx: &FieldContext<'_, E>,
    ts: &TimeScales,
    sample: &Sample,
) -> GroupResult {
    body_position(
        ctx,
        CelestialBody::Sun,
        ts,
        sample,
        [SUN_AZIMUTH, SUN_ALTITUDE, SUN_RIGHT_ASCENSION, SUN_DECLINATION, EARTH_SUN_DISTANCE],
    )
}

pub(super) fn moon_position<E: Ephemeris + ?Sized>(
    ctx: &FieldContext<'_, E>,
    ts: &TimeScales,
    sample: &Sample,
) -> GroupResult {
    body_position(
        ctx,
        CelestialBody::Moon,
        ts,
        sample,
        [MOON_AZIMUTH, MOON_ALTITUDE, MOON_RIGHT_ASCENSION, MOON_DECLINATION, EARTH_MOON_DISTANCE],
    )
}

fn planet_distance_field(body: CelestialBody) -> &'static str {
    match body {
        CelestialBody::Sun => EARTH_SUN_DISTANCE,
        CelestialBody::Moon => EARTH_MOON_DISTANCE,
        CelestialBody::Mercury => EARTH_MERCURY_DISTANCE,
        CelestialBody::Venus => EARTH_VENUS_DISTANCE,
        CelestialBody::Mars => EARTH_MARS_DISTANCE,
        CelestialBody::Jupiter => EARTH_JUPITER_DISTANCE,
        CelestialBody::Saturn => EARTH_SATURN_DISTANCE,
        CelestialBody::Uranus => EARTH_URANUS_DISTANCE,
        CelestialBody::Neptune => EARTH_NEPTUNE_DISTANCE,
        CelestialBody::Pluto => EARTH_PLUTO_DISTANCE,
    }
}

pub(super) fn planet_distances<E: Ephemeris + ?Sized>(
    ctx: &FieldContext<'_, E>,
    ts: &TimeScales,
    sample: &Sample,
) -> GroupResult {
    CelestialBody::PLANETS
        .iter()
        .map(|&planet| -> Result<(&'static str, FieldValue), CelestialError> {
            let au = ctx.frame.earth_distance(ctx.bodies.get(planet), ts)?;
            Ok((planet_distance_field(planet), sample.units.distance_from_au(au).into()))
        })
        .collect()
}

/// Index into the 8 phase names; 360° wraps back to 0.
pub fn moon_phase_index(phase_angle: Degree) -> usize {
    ((phase_angle / 360.0 * 8.0).round() as i64).rem_euclid(8) as usize
}

pub(super) fn moon_phase<E: Ephemeris + ?Sized>(ctx: &FieldContext<'_, E>, ts: &TimeScales) -> GroupResult {
    let sun = ctx.bodies.get(CelestialBody::Sun);
    let moon = ctx.bodies.get(CelestialBody::Moon);

    let angle = crate::almanac::moon_phase_angle(&ctx.frame, sun, moon, ts)?;
    let fullness = ctx.frame.fraction_illuminated(moon, sun, ts)?;
    let name = &ctx.moon_phases[moon_phase_index(angle)];

    Ok(vec![
        (MOON_FULLNESS, fullness.into()),
        (MOON_PHASE, FieldValue::Text(name.clone())),
    ])
}

#[cfg(test)]
mod positions_test {
    use super::*;
    use crate::{
        fields::fields_test::Fixture,
        time::unix_to_mjd,
        unit_test_global::utc_unix,
        units::UnitSystem,
    };
    use approx::assert_relative_eq;

    #[test]
    fn test_moon_phase_index_wraps() {
        assert_eq!(moon_phase_index(0.0), 0);
        assert_eq!(moon_phase_index(22.4), 0);
        assert_eq!(moon_phase_index(22.6), 1);
        assert_eq!(moon_phase_index(180.0), 4);
        assert_eq!(moon_phase_index(337.6), 0);
        assert_eq!(moon_phase_index(359.999), 0);
        assert_eq!(moon_phase_index(360.0), 0);
        for tenth in 0..3600 {
            assert!(moon_phase_index(tenth as f64 / 10.0) < 8);
        }
    }

    #[test]
    fn test_distances_follow_unit_system() {
        let fixture = Fixture::at(40.0, -88.0, 220.0);
        let ctx = fixture.context(-300);
        let unix = utc_unix(2024, 3, 21, 14, 0);
        let ts = TimeScales::from_mjd_utc(unix_to_mjd(unix));

        let metric = sun_position(&ctx, &ts, &fixture.sample(unix, UnitSystem::Metric)).unwrap();
        let us = sun_position(&ctx, &ts, &fixture.sample(unix, UnitSystem::Us)).unwrap();
        let distance = |fields: &[(&str, FieldValue)]| {
            fields.iter().find(|(n, _)| *n == EARTH_SUN_DISTANCE).unwrap().1.as_f64().unwrap()
        };
        assert_relative_eq!(distance(&metric) / distance(&us), 1.496e8 / 9.296e7, epsilon = 1e-12);
        assert_relative_eq!(distance(&metric), 1.496e8, max_relative = 1e-3);

        let planets = planet_distances(&ctx, &ts, &fixture.sample(unix, UnitSystem::Metric)).unwrap();
        assert_eq!(planets.len(), 8);
        assert!(planets.iter().all(|(_, v)| v.as_f64().unwrap() > 0.0));
    }

    #[test]
    fn test_full_moon_phase_name() {
        let fixture = Fixture::at(40.0, -88.0, 220.0);
        let ctx = fixture.context(-300);
        let full = unix_to_mjd(utc_unix(2024, 3, 10, 9, 0)) + 29.530589 / 2.0;
        let fields = moon_phase(&ctx, &TimeScales::from_mjd_utc(full)).unwrap();

        assert_eq!(fields[1], (MOON_PHASE, FieldValue::from("full (totally lit)")));
        let fullness = fields[0].1.as_f64().unwrap();
        assert!((99.0..=100.0).contains(&fullness));
    }
}
