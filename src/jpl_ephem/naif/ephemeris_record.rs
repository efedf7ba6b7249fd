//! Chebyshev records of a type 2 SPK segment.
//!
//! A record holds a midpoint and half-width (TDB seconds) followed by
//! `ncoeff` coefficients for each of X, Y and Z. Positions come out in
//! kilometers and velocities in km/s.
use std::{
    fmt,
    io::{Read, Seek, SeekFrom},
};

use hifitime::{Duration, Epoch};
use nalgebra::Vector3;
use nom::{
    multi::count,
    number::complete::le_f64,
    IResult, Parser,
};

use crate::celestial_errors::CelestialError;

#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisRecord {
    pub mid: f64,
    pub radius: f64,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl EphemerisRecord {
    fn parse_record(input: &[u8], ncoeff: usize) -> IResult<&[u8], EphemerisRecord> {
        let (input, (mid, radius)) = (le_f64, le_f64).parse(input)?;
        let (input, x) = count(le_f64, ncoeff).parse(input)?;
        let (input, y) = count(le_f64, ncoeff).parse(input)?;
        let (input, z) = count(le_f64, ncoeff).parse(input)?;
        Ok((
            input,
            EphemerisRecord {
                mid,
                radius,
                x,
                y,
                z,
            },
        ))
    }

    /// Read one record of `rsize` words at index `index` of the segment starting at
    /// `segment_start_addr`.
    pub fn read_at<R: Read + Seek>(
        reader: &mut R,
        segment_start_addr: usize,
        rsize: usize,
        index: usize,
    ) -> Result<Self, CelestialError> {
        let record_byte_size = rsize * 8;
        let byte_offset = (segment_start_addr.saturating_sub(1)) * 8 + index * record_byte_size;

        let mut buf = vec![0u8; record_byte_size];
        reader.seek(SeekFrom::Start(byte_offset as u64))?;
        reader.read_exact(&mut buf)?;

        let (_, record) = Self::parse_record(&buf, (rsize - 2) / 3)
            .map_err(|e| CelestialError::NomParsingError(format!("ephemeris record: {e}")))?;
        Ok(record)
    }

    /// Read all `n_records` records of a segment.
    pub fn parse<R: Read + Seek>(
        reader: &mut R,
        segment_start_addr: usize,
        rsize: usize,
        n_records: usize,
    ) -> Result<Vec<Self>, CelestialError> {
        (0..n_records)
            .map(|i| Self::read_at(reader, segment_start_addr, rsize, i))
            .collect()
    }

    /// Evaluate position (km) and velocity (km/s) at `ephem_time` (TDB seconds past J2000).
    pub fn interpolate(&self, ephem_time: f64) -> (Vector3<f64>, Vector3<f64>) {
        let t = ((ephem_time - self.mid) / self.radius).clamp(-1.0, 1.0);

        let n = self.x.len();
        let mut polynomials = vec![0.0; n.max(2)];
        polynomials[0] = 1.0;
        polynomials[1] = t;
        for degree in 2..n {
            polynomials[degree] = 2.0 * t * polynomials[degree - 1] - polynomials[degree - 2];
        }

        // dT_n/dt = 2 T_{n-1} + 2t dT_{n-1}/dt - dT_{n-2}/dt
        let mut derivatives = vec![0.0; n.max(2)];
        derivatives[1] = 1.0;
        for degree in 2..n {
            derivatives[degree] = 2.0 * polynomials[degree - 1] + 2.0 * t * derivatives[degree - 1]
                - derivatives[degree - 2];
        }

        let eval = |coeffs: &[f64], basis: &[f64]| -> f64 {
            coeffs.iter().zip(basis).map(|(c, p)| c * p).sum()
        };

        let position = Vector3::new(
            eval(&self.x, &polynomials),
            eval(&self.y, &polynomials),
            eval(&self.z, &polynomials),
        );

        let velocity = Vector3::new(
            eval(&self.x, &derivatives),
            eval(&self.y, &derivatives),
            eval(&self.z, &derivatives),
        ) / self.radius;

        (position, velocity)
    }
}

impl fmt::Display for EphemerisRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mid_str = Epoch::from_et_seconds(self.mid).to_string();
        let radius_str = Duration::from_seconds(self.radius).to_string();

        let label_width = 16;
        let value_width = mid_str.len().max(radius_str.len()).max(55);

        let border = format!(
            "+{:-<label$}+{:-<value$}+",
            "",
            "",
            label = label_width + 2,
            value = value_width + 2
        );

        writeln!(f, "{border}")?;
        writeln!(f, "| {:<label_width$} | {:<value_width$} |", "Midpoint", mid_str)?;
        writeln!(f, "| {:<label_width$} | {:<value_width$} |", "Radius", radius_str)?;
        writeln!(f, "{border}")?;

        for (axis, coeffs) in [("X", &self.x), ("Y", &self.y), ("Z", &self.z)] {
            for (i, chunk) in coeffs.chunks(4).enumerate() {
                let line = chunk
                    .iter()
                    .map(|c| format!("{c:>12.4e}"))
                    .collect::<Vec<_>>()
                    .join(" ");
                let label = if i == 0 { axis } else { "" };
                writeln!(f, "| {label:<label_width$} | {line:<value_width$} |")?;
            }
        }
        writeln!(f, "{border}")
    }
}
