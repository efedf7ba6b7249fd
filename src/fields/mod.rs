//! Field computation layer.
//!
//! Each [`FieldGroup`] is computed on its own and yields a [`GroupResult`]. A
//! failed group is logged and its fields are simply missing from the
//! [`OutputRecord`]; the other groups are unaffected.
use std::{collections::BTreeMap, fmt};

use log::{debug, error};

use crate::{
    celestial_errors::CelestialError,
    constants::UnixSeconds,
    day_window::{DayWindow, LocalZone},
    jpl_ephem::{Ephemeris, ResolvedBodies},
    observers::frame::{Atmosphere, Frame},
    time::TimeScales,
    units::UnitSystem,
};

pub mod events;
pub mod names;
pub mod positions;

/// Value of one packet field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Int(i64),
    Text(String),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            FieldValue::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Text(s) => write!(f, "{s:?}"),
        }
    }
}

/// A loop packet: field name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl OutputRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FieldValue::as_f64)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy every field of `other` into this record.
    pub fn merge(&mut self, other: OutputRecord) {
        self.fields.extend(other.fields);
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for OutputRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        OutputRecord {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl fmt::Display for OutputRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.fields {
            writeln!(f, "{name:<28} {value}")?;
        }
        Ok(())
    }
}

/// Fields produced by one group.
pub type GroupFields = Vec<(&'static str, FieldValue)>;

/// Outcome of one group: its fields, or why none could be computed.
pub type GroupResult = Result<GroupFields, CelestialError>;

/// Independently computed sets of fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldGroup {
    SunPosition,
    MoonPosition,
    PlanetDistances,
    MoonPhase,
    SunEvents,
    SunEventsYesterday,
    SunEventsTomorrow,
    MoonEvents,
    Twilight,
    Seasons,
    LunarEvents,
}

impl FieldGroup {
    pub const ALL: [FieldGroup; 11] = [
        FieldGroup::SunPosition,
        FieldGroup::MoonPosition,
        FieldGroup::PlanetDistances,
        FieldGroup::MoonPhase,
        FieldGroup::SunEvents,
        FieldGroup::SunEventsYesterday,
        FieldGroup::SunEventsTomorrow,
        FieldGroup::MoonEvents,
        FieldGroup::Twilight,
        FieldGroup::Seasons,
        FieldGroup::LunarEvents,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FieldGroup::SunPosition => "sun_position",
            FieldGroup::MoonPosition => "moon_position",
            FieldGroup::PlanetDistances => "planet_distances",
            FieldGroup::MoonPhase => "moon_phase",
            FieldGroup::SunEvents => "sun_events",
            FieldGroup::SunEventsYesterday => "sun_events_yesterday",
            FieldGroup::SunEventsTomorrow => "sun_events_tomorrow",
            FieldGroup::MoonEvents => "moon_events",
            FieldGroup::Twilight => "twilight",
            FieldGroup::Seasons => "seasons",
            FieldGroup::LunarEvents => "lunar_events",
        }
    }
}

impl fmt::Display for FieldGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything one cycle needs to know about the sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub unix: UnixSeconds,
    pub units: UnitSystem,
    pub atmosphere: Atmosphere,
}

/// Read-only state shared by every cycle.
pub struct FieldContext<'a, E: Ephemeris + ?Sized> {
    pub frame: Frame<'a, E>,
    pub bodies: &'a ResolvedBodies,
    pub moon_phases: &'a [String; 8],
    pub zone: LocalZone,
}

impl<E: Ephemeris + ?Sized> FieldContext<'_, E> {
    /// Fields of one group for one sample.
    pub fn compute_group(&self, group: FieldGroup, sample: &Sample) -> GroupResult {
        let ts = TimeScales::from_unix(sample.unix)?;
        let window = || DayWindow::containing(sample.unix, self.zone);
        match group {
            FieldGroup::SunPosition => positions::sun_position(self, &ts, sample),
            FieldGroup::MoonPosition => positions::moon_position(self, &ts, sample),
            FieldGroup::PlanetDistances => positions::planet_distances(self, &ts, sample),
            FieldGroup::MoonPhase => positions::moon_phase(self, &ts),
            FieldGroup::SunEvents => events::sun_events(self, &window()?),
            FieldGroup::SunEventsYesterday => events::sun_events_yesterday(self, &window()?.shift(-1)?),
            FieldGroup::SunEventsTomorrow => events::sun_events_tomorrow(self, &window()?.shift(1)?),
            FieldGroup::MoonEvents => events::moon_events(self, &window()?),
            FieldGroup::Twilight => events::twilight(self, &window()?),
            FieldGroup::Seasons => events::seasons(self, &window()?),
            FieldGroup::LunarEvents => events::lunar_events(self, &window()?),
        }
    }

    /// Every group for one sample; failed groups are logged and left out.
    pub fn compute_all(&self, sample: &Sample) -> (OutputRecord, Vec<(FieldGroup, CelestialError)>) {
        let mut record = OutputRecord::new();
        let mut failures = Vec::new();

        for group in FieldGroup::ALL {
            match self.compute_group(group, sample) {
                Ok(fields) => {
                    debug!("{group}: {} field(s)", fields.len());
                    for (name, value) in fields {
                        record.insert(name, value);
                    }
                }
                Err(err) => {
                    error!(
                        "Unable to compute {group} at {} for observer {}: {err}",
                        sample.unix,
                        self.frame.observer()
                    );
                    failures.push((group, err));
                }
            }
        }
        (record, failures)
    }
}
