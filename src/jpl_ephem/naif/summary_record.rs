//! SPK array summaries.
//!
//! Each segment of an SPK kernel is described by `nd = 2` doubles (coverage in
//! TDB seconds past J2000) followed by `ni = 6` integers: target, center,
//! reference frame, data type and the first and last double-precision addresses
//! of the segment data.
use std::fmt;

use hifitime::Epoch;
use nom::{
    number::complete::{le_f64, le_i32},
    IResult,
};

use crate::{celestial_errors::CelestialError, jpl_ephem::naif::naif_ids::NaifIds};

/// SPK segment representations this reader knows by name.
///
/// Only [`SpkDataType::ChebyshevPositionOnly`] (type 2, used by the DE kernels)
/// can be interpolated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum SpkDataType {
    ModifiedDifferenceArray = 1,
    ChebyshevPositionOnly = 2,
    ChebyshevPositionVelocity = 3,
    TwoBodyDiscreteStates = 5,
    EquallySpacedLagrange = 8,
    UnequallySpacedLagrange = 9,
    HermiteUniform = 12,
    HermiteNonUniform = 13,
    ChebyshevNonUniform = 14,
    ExtendedModifiedDifferenceArray = 21,
}

impl TryFrom<i32> for SpkDataType {
    type Error = CelestialError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        use SpkDataType::*;
        match value {
            1 => Ok(ModifiedDifferenceArray),
            2 => Ok(ChebyshevPositionOnly),
            3 => Ok(ChebyshevPositionVelocity),
            5 => Ok(TwoBodyDiscreteStates),
            8 => Ok(EquallySpacedLagrange),
            9 => Ok(UnequallySpacedLagrange),
            12 => Ok(HermiteUniform),
            13 => Ok(HermiteNonUniform),
            14 => Ok(ChebyshevNonUniform),
            21 => Ok(ExtendedModifiedDifferenceArray),
            _ => Err(CelestialError::InvalidSpkDataType(value)),
        }
    }
}

impl fmt::Display for SpkDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?} (type {})", *self as i32)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Summary {
    pub start_epoch: f64,
    pub end_epoch: f64,
    pub target: i32,
    pub center: i32,
    pub frame_id: i32,
    pub data_type: i32,
    pub initial_addr: i32,
    pub final_addr: i32,
}

impl Summary {
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, start_epoch) = le_f64(input)?;
        let (input, end_epoch) = le_f64(input)?;
        let (input, target) = le_i32(input)?;
        let (input, center) = le_i32(input)?;
        let (input, frame_id) = le_i32(input)?;
        let (input, data_type) = le_i32(input)?;
        let (input, initial_addr) = le_i32(input)?;
        let (input, final_addr) = le_i32(input)?;
        Ok((
            input,
            Summary {
                start_epoch,
                end_epoch,
                target,
                center,
                frame_id,
                data_type,
                initial_addr,
                final_addr,
            },
        ))
    }

    /// Fail unless the segment holds type 2 Chebyshev records.
    pub fn ensure_chebyshev(&self) -> Result<(), CelestialError> {
        match SpkDataType::try_from(self.data_type)? {
            SpkDataType::ChebyshevPositionOnly => Ok(()),
            _ => Err(CelestialError::InvalidSpkDataType(self.data_type)),
        }
    }

    pub fn covers(&self, et_seconds: f64) -> bool {
        et_seconds >= self.start_epoch && et_seconds <= self.end_epoch
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = |id: i32| match NaifIds::from_id(id) {
            Ok(naif) => format!("{naif} ({id})"),
            Err(_) => id.to_string(),
        };
        let data_type = match SpkDataType::try_from(self.data_type) {
            Ok(data_type) => data_type.to_string(),
            Err(_) => format!("unknown (type {})", self.data_type),
        };

        let fields = [
            ("start_epoch", Epoch::from_et_seconds(self.start_epoch).to_string()),
            ("end_epoch", Epoch::from_et_seconds(self.end_epoch).to_string()),
            ("target", name(self.target)),
            ("center", name(self.center)),
            ("frame_id", self.frame_id.to_string()),
            ("data_type", data_type),
            ("initial_addr", self.initial_addr.to_string()),
            ("final_addr", self.final_addr.to_string()),
        ];

        let label_width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(10);
        let value_width = fields.iter().map(|(_, v)| v.len()).max().unwrap_or(10);

        let border = format!(
            "+{:-<label$}+{:-<value$}+",
            "",
            "",
            label = label_width + 2,
            value = value_width + 2
        );

        writeln!(f, "{border}")?;
        for (label, value) in fields {
            writeln!(f, "| {label:<label_width$} | {value:<value_width$} |")?;
        }
        writeln!(f, "{border}")
    }
}
