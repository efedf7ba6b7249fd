//! NAIF integer codes of the bodies and barycenters found in planetary SPK kernels.
//!
//! [`NaifIds`] groups the codes by kind: the solar-system barycenter and the Sun
//! (`SSB`), planetary-system barycenters (`PB`, codes 1–9), planet mass centers
//! (`PMC`, codes `n99`) and natural satellites (`SMC`).
use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorId {
    #[error("Invalid Planetary Barycenter ID: {0}")]
    InvalidPlanetBaryId(i32),

    #[error("Invalid Planet Mass Center ID: {0}")]
    InvalidPlanetMassCenterId(i32),

    #[error("Invalid Satellite Mass Center ID: {0}")]
    InvalidSatelliteMassCenterId(i32),

    #[error("Invalid NAIF ID: {0}")]
    InvalidNaifId(i32),
}

/// Declare a NAIF code enum with its integer conversions and display names.
macro_rules! naif_code_enum {
    ($name:ident, $err:ident, { $($variant:ident = $id:literal => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant = $id),+
        }

        impl $name {
            pub fn from_id(id: i32) -> Result<Self, ErrorId> {
                match id {
                    $($id => Ok($name::$variant),)+
                    _ => Err(ErrorId::$err(id)),
                }
            }

            pub fn to_id(&self) -> i32 {
                *self as i32
            }
        }

        impl From<$name> for i32 {
            fn from(code: $name) -> Self {
                code.to_id()
            }
        }

        impl TryFrom<i32> for $name {
            type Error = ErrorId;

            fn try_from(id: i32) -> Result<Self, Self::Error> {
                $name::from_id(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let s = match self {
                    $($name::$variant => $label,)+
                };
                write!(f, "{s}")
            }
        }
    };
}

naif_code_enum!(SolarSystemBary, InvalidNaifId, {
    SSB = 0 => "Solar System Barycenter",
    Sun = 10 => "Sun",
});

naif_code_enum!(PlanetaryBary, InvalidPlanetBaryId, {
    Mercury = 1 => "Mercury Barycenter",
    Venus = 2 => "Venus Barycenter",
    EarthMoon = 3 => "Earth-Moon Barycenter",
    Mars = 4 => "Mars Barycenter",
    Jupiter = 5 => "Jupiter Barycenter",
    Saturn = 6 => "Saturn Barycenter",
    Uranus = 7 => "Uranus Barycenter",
    Neptune = 8 => "Neptune Barycenter",
    Pluto = 9 => "Pluto Barycenter",
});

naif_code_enum!(PlanetMassCenter, InvalidPlanetMassCenterId, {
    Mercury = 199 => "Mercury",
    Venus = 299 => "Venus",
    Earth = 399 => "Earth",
    Mars = 499 => "Mars",
    Jupiter = 599 => "Jupiter",
    Saturn = 699 => "Saturn",
    Uranus = 799 => "Uranus",
    Neptune = 899 => "Neptune",
    Pluto = 999 => "Pluto",
});

naif_code_enum!(SatelliteMassCenter, InvalidSatelliteMassCenterId, {
    Moon = 301 => "Moon",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NaifIds {
    SSB(SolarSystemBary),
    PB(PlanetaryBary),
    PMC(PlanetMassCenter),
    SMC(SatelliteMassCenter),
}

impl NaifIds {
    pub fn from_id(id: i32) -> Result<Self, ErrorId> {
        match id {
            0 | 10 => SolarSystemBary::from_id(id).map(NaifIds::SSB),
            1..=9 => PlanetaryBary::from_id(id).map(NaifIds::PB),
            _ if id % 100 == 99 => PlanetMassCenter::from_id(id).map(NaifIds::PMC),
            _ => SatelliteMassCenter::from_id(id)
                .map(NaifIds::SMC)
                .map_err(|_| ErrorId::InvalidNaifId(id)),
        }
    }

    pub fn to_id(&self) -> i32 {
        match self {
            NaifIds::SSB(code) => code.to_id(),
            NaifIds::PB(code) => code.to_id(),
            NaifIds::PMC(code) => code.to_id(),
            NaifIds::SMC(code) => code.to_id(),
        }
    }
}

impl From<NaifIds> for i32 {
    fn from(naif_id: NaifIds) -> Self {
        naif_id.to_id()
    }
}

impl TryFrom<i32> for NaifIds {
    type Error = ErrorId;

    fn try_from(id: i32) -> Result<Self, Self::Error> {
        NaifIds::from_id(id)
    }
}

impl fmt::Display for NaifIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NaifIds::SSB(code) => write!(f, "{code}"),
            NaifIds::PB(code) => write!(f, "{code}"),
            NaifIds::PMC(code) => write!(f, "{code}"),
            NaifIds::SMC(code) => write!(f, "{code}"),
        }
    }
}
