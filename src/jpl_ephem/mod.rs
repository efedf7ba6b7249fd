//! Ephemeris provider.
//!
//! Bodies are resolved once into a [`BodyHandle`], the chain of SPK segments
//! leading from the body down to the solar-system barycenter. Any
//! [`Ephemeris`] can then sum that chain into a barycentric state.
use std::fmt;

use nalgebra::Vector3;
use thiserror::Error;

use naif::naif_ids::{
    NaifIds, PlanetMassCenter, PlanetaryBary, SatelliteMassCenter, SolarSystemBary,
};

use crate::celestial_errors::CelestialError;

pub mod download_jpl_file;
pub mod naif;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("Cannot resolve {body}: ephemeris has no segment {target} -> {center}")]
    MissingSegment {
        body: String,
        target: i32,
        center: i32,
    },
}

/// Bodies whose positions are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CelestialBody {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

impl CelestialBody {
    pub const ALL: [CelestialBody; 10] = [
        CelestialBody::Sun,
        CelestialBody::Moon,
        CelestialBody::Mercury,
        CelestialBody::Venus,
        CelestialBody::Mars,
        CelestialBody::Jupiter,
        CelestialBody::Saturn,
        CelestialBody::Uranus,
        CelestialBody::Neptune,
        CelestialBody::Pluto,
    ];

    pub const PLANETS: [CelestialBody; 8] = [
        CelestialBody::Mercury,
        CelestialBody::Venus,
        CelestialBody::Mars,
        CelestialBody::Jupiter,
        CelestialBody::Saturn,
        CelestialBody::Uranus,
        CelestialBody::Neptune,
        CelestialBody::Pluto,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CelestialBody::Sun => "Sun",
            CelestialBody::Moon => "Moon",
            CelestialBody::Mercury => "Mercury",
            CelestialBody::Venus => "Venus",
            CelestialBody::Mars => "Mars",
            CelestialBody::Jupiter => "Jupiter",
            CelestialBody::Saturn => "Saturn",
            CelestialBody::Uranus => "Uranus",
            CelestialBody::Neptune => "Neptune",
            CelestialBody::Pluto => "Pluto",
        }
    }

    /// Segment chains to try, best first. Each chain lists the bodies to walk
    /// through before reaching the solar-system barycenter.
    fn chains(&self) -> Vec<Vec<NaifIds>> {
        use PlanetMassCenter as PMC;
        use PlanetaryBary as PB;

        let inner = |center: PMC, bary: PB| {
            vec![
                vec![NaifIds::PMC(center), NaifIds::PB(bary)],
                vec![NaifIds::PB(bary)],
            ]
        };

        match self {
            CelestialBody::Sun => vec![vec![NaifIds::SSB(SolarSystemBary::Sun)]],
            CelestialBody::Moon => vec![vec![
                NaifIds::SMC(SatelliteMassCenter::Moon),
                NaifIds::PB(PB::EarthMoon),
            ]],
            CelestialBody::Mercury => inner(PMC::Mercury, PB::Mercury),
            CelestialBody::Venus => inner(PMC::Venus, PB::Venus),
            CelestialBody::Mars => inner(PMC::Mars, PB::Mars),
            // giant planets are always taken at their system barycenter
            CelestialBody::Jupiter => vec![vec![NaifIds::PB(PB::Jupiter)]],
            CelestialBody::Saturn => vec![vec![NaifIds::PB(PB::Saturn)]],
            CelestialBody::Uranus => vec![vec![NaifIds::PB(PB::Uranus)]],
            CelestialBody::Neptune => vec![vec![NaifIds::PB(PB::Neptune)]],
            CelestialBody::Pluto => vec![vec![NaifIds::PB(PB::Pluto)]],
        }
    }
}

impl fmt::Display for CelestialBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A body resolved against a particular ephemeris.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyHandle {
    pub name: &'static str,
    pub naif_id: i32,
    /// `(target, center)` pairs whose states add up to the barycentric state
    pub(crate) links: Vec<(i32, i32)>,
}

impl BodyHandle {
    pub fn links(&self) -> &[(i32, i32)] {
        &self.links
    }
}

/// Source of barycentric states (ICRF, km and km/s, TDB seconds past J2000).
pub trait Ephemeris {
    /// Whether a `(target, center)` segment exists at all.
    fn has_segment(&self, target: i32, center: i32) -> bool;

    /// State of `target` relative to `center`.
    fn state(
        &self,
        target: i32,
        center: i32,
        et_seconds: f64,
    ) -> Result<(Vector3<f64>, Vector3<f64>), CelestialError>;

    /// State of a resolved body relative to the solar-system barycenter.
    fn barycentric_state(
        &self,
        handle: &BodyHandle,
        et_seconds: f64,
    ) -> Result<(Vector3<f64>, Vector3<f64>), CelestialError> {
        handle.links.iter().try_fold(
            (Vector3::zeros(), Vector3::zeros()),
            |(pos, vel), &(target, center)| {
                let (p, v) = self.state(target, center, et_seconds)?;
                Ok((pos + p, vel + v))
            },
        )
    }
}

impl Ephemeris for naif::naif_data::NaifData {
    fn has_segment(&self, target: i32, center: i32) -> bool {
        naif::naif_data::NaifData::has_segment(self, target, center)
    }

    fn state(
        &self,
        target: i32,
        center: i32,
        et_seconds: f64,
    ) -> Result<(Vector3<f64>, Vector3<f64>), CelestialError> {
        naif::naif_data::NaifData::state(self, target, center, et_seconds)
    }
}

fn resolve_chains<E: Ephemeris + ?Sized>(
    ephem: &E,
    name: &'static str,
    chains: &[Vec<NaifIds>],
) -> Result<BodyHandle, ResolutionError> {
    let mut missing = None;
    for chain in chains {
        let ids: Vec<i32> = chain
            .iter()
            .map(NaifIds::to_id)
            .chain(std::iter::once(SolarSystemBary::SSB.to_id()))
            .collect();
        let links: Vec<(i32, i32)> = ids.windows(2).map(|w| (w[0], w[1])).collect();

        match links.iter().find(|(t, c)| !ephem.has_segment(*t, *c)) {
            None => {
                return Ok(BodyHandle {
                    name,
                    naif_id: ids[0],
                    links,
                })
            }
            Some(&(target, center)) => missing = Some((target, center)),
        }
    }

    let (target, center) = missing.unwrap_or((0, 0));
    Err(ResolutionError::MissingSegment {
        body: name.to_string(),
        target,
        center,
    })
}

/// Resolve a body to its segment chain.
pub fn resolve<E: Ephemeris + ?Sized>(
    ephem: &E,
    body: CelestialBody,
) -> Result<BodyHandle, ResolutionError> {
    resolve_chains(ephem, body.name(), &body.chains())
}

/// Resolve the Earth (399 through the Earth-Moon barycenter).
pub fn resolve_earth<E: Ephemeris + ?Sized>(ephem: &E) -> Result<BodyHandle, ResolutionError> {
    resolve_chains(
        ephem,
        "Earth",
        &[vec![
            NaifIds::PMC(PlanetMassCenter::Earth),
            NaifIds::PB(PlanetaryBary::EarthMoon),
        ]],
    )
}

/// Handles for the Earth and every reported body, resolved up front.
#[derive(Debug, Clone)]
pub struct ResolvedBodies {
    pub earth: BodyHandle,
    bodies: Vec<(CelestialBody, BodyHandle)>,
}

impl ResolvedBodies {
    pub fn get(&self, body: CelestialBody) -> &BodyHandle {
        // every body is resolved in `resolve_all`, so the lookup always hits
        &self.bodies[body as usize].1
    }
}

/// Resolve the Earth and all of [`CelestialBody::ALL`], failing on the first gap.
pub fn resolve_all<E: Ephemeris + ?Sized>(ephem: &E) -> Result<ResolvedBodies, ResolutionError> {
    let earth = resolve_earth(ephem)?;
    let bodies = CelestialBody::ALL
        .iter()
        .map(|&body| resolve(ephem, body).map(|handle| (body, handle)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ResolvedBodies { earth, bodies })
}
