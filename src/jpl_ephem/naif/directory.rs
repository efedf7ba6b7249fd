//! Segment directory of a type 2 SPK segment.
//!
//! The last four double-precision words of every type 2 segment describe how its
//! Chebyshev records are laid out:
//!
//! * `init` is the start epoch of the first record (TDB seconds past J2000),
//! * `intlen` is the time span covered by each record (seconds),
//! * `rsize` is the record size in double-precision words,
//! * `n_records` is the number of records in the segment.
//!
//! DAF addresses count 8-byte words starting at 1, so the footer of a segment
//! ending at `end_addr` starts at byte `(end_addr - 4) * 8`.
use std::io::{Read, Seek, SeekFrom};

use hifitime::{Duration, Epoch};
use nom::{number::complete::le_f64, IResult, Parser};

use crate::celestial_errors::CelestialError;

#[derive(Debug, PartialEq, Clone)]
pub struct DirectoryData {
    pub init: f64,
    pub intlen: f64,
    pub rsize: usize,
    pub n_records: usize,
}

impl DirectoryData {
    fn parse_words(input: &[u8]) -> IResult<&[u8], (f64, f64, f64, f64)> {
        (le_f64, le_f64, le_f64, le_f64).parse(input)
    }

    /// Read the directory of the segment whose last word is at `end_addr`.
    pub fn parse<R: Read + Seek>(
        reader: &mut R,
        end_addr: usize,
    ) -> Result<Self, CelestialError> {
        if end_addr < 4 {
            return Err(CelestialError::NomParsingError(format!(
                "segment end address {end_addr} too small for a directory"
            )));
        }

        let mut dir_buf = [0u8; 32];
        reader.seek(SeekFrom::Start(((end_addr - 4) * 8) as u64))?;
        reader.read_exact(&mut dir_buf)?;

        let (_, (init, intlen, rsize, n_records)) = Self::parse_words(&dir_buf)
            .map_err(|e| CelestialError::NomParsingError(format!("segment directory: {e}")))?;

        if intlen <= 0.0 || rsize < 5.0 || n_records < 1.0 {
            return Err(CelestialError::NomParsingError(format!(
                "inconsistent segment directory (intlen={intlen}, rsize={rsize}, n={n_records})"
            )));
        }

        Ok(DirectoryData {
            init,
            intlen,
            rsize: rsize as usize,
            n_records: n_records as usize,
        })
    }

    /// Number of Chebyshev coefficients per axis in each record.
    pub fn ncoeff(&self) -> usize {
        (self.rsize - 2) / 3
    }

    /// Index of the record covering `et_seconds`, clamped to the segment.
    pub fn record_index(&self, et_seconds: f64) -> usize {
        let idx = ((et_seconds - self.init) / self.intlen).floor();
        if idx <= 0.0 {
            0
        } else {
            (idx as usize).min(self.n_records - 1)
        }
    }
}

impl std::fmt::Display for DirectoryData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let epoch = Epoch::from_et_seconds(self.init);
        let record_length = Duration::from_seconds(self.intlen);

        writeln!(f, "+----------------+----------------------------+")?;
        writeln!(f, "| {:<14} | {:<26} |", "Field", "Value")?;
        writeln!(f, "+----------------+----------------------------+")?;
        writeln!(f, "| {:<14} | {:<26} |", "init (epoch)", epoch.to_string())?;
        writeln!(f, "| {:<14} | {:<26} |", "intlen", record_length.to_string())?;
        writeln!(f, "| {:<14} | {:<26} |", "rsize", self.rsize)?;
        writeln!(f, "| {:<14} | {:<26} |", "n_records", self.n_records)?;
        writeln!(f, "+----------------+----------------------------+")
    }
}
