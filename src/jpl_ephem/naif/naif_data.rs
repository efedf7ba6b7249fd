//! Loader for NAIF SPK kernels.
//!
//! Reading a kernel goes through the DAF layout in order:
//! 1. the file record gives `ND`/`NI`, the first summary record and the byte order,
//! 2. the comment area may hold the JPL text header,
//! 3. the summary records are followed through their forward pointers,
//! 4. each summary points at a type 2 segment whose directory and Chebyshev
//!    records are loaded into memory.
//!
//! Times are TDB seconds past J2000, positions are kilometers and velocities km/s.
use std::{
    collections::HashMap,
    fmt,
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
};

use camino::Utf8Path;
use itertools::Itertools;
use log::debug;
use nalgebra::Vector3;
use nom::number::complete::le_f64;

use crate::celestial_errors::CelestialError;

use super::{
    daf_header::{DAFHeader, DAF_RECORD_BYTES},
    directory::DirectoryData,
    ephemeris_record::EphemerisRecord,
    jpl_ephem_header::JPLEphemHeader,
    summary_record::Summary,
};

/// One type 2 segment: its summary, layout and Chebyshev records.
#[derive(Debug, Clone, PartialEq)]
pub struct SpkSegment {
    pub summary: Summary,
    pub directory: DirectoryData,
    pub records: Vec<EphemerisRecord>,
}

impl SpkSegment {
    fn state(&self, et_seconds: f64) -> (Vector3<f64>, Vector3<f64>) {
        let idx = self
            .directory
            .record_index(et_seconds)
            .min(self.records.len().saturating_sub(1));
        self.records[idx].interpolate(et_seconds)
    }
}

/// A fully loaded SPK kernel, keyed by `(target, center)` NAIF ids.
#[derive(Debug, Clone)]
pub struct NaifData {
    pub(crate) daf_header: DAFHeader,
    pub(crate) header: Option<JPLEphemHeader>,
    pub(crate) segments: HashMap<(i32, i32), Vec<SpkSegment>>,
}

fn nom_error(context: &str) -> impl Fn(nom::Err<nom::error::Error<&[u8]>>) -> CelestialError + '_ {
    move |e| CelestialError::NomParsingError(format!("{context}: {e}"))
}

impl NaifData {
    /// Open and load the kernel at `path`.
    pub fn read_naif_file(path: &Utf8Path) -> Result<Self, CelestialError> {
        if !path.is_file() {
            return Err(CelestialError::JPLFileNotFound(path.to_string()));
        }
        let mut reader = BufReader::new(File::open(path)?);
        let data = Self::from_reader(&mut reader)?;
        debug!(
            "Loaded {} SPK segments from {path}",
            data.segments.values().map(Vec::len).sum::<usize>()
        );
        Ok(data)
    }

    /// Load a kernel from any seekable byte source.
    pub fn from_reader<R: Read + Seek>(reader: &mut R) -> Result<Self, CelestialError> {
        let mut buffer = [0u8; DAF_RECORD_BYTES];
        reader.seek(SeekFrom::Start(0))?;
        reader.read_exact(&mut buffer)?;
        let (_, daf_header) = DAFHeader::parse(&buffer).map_err(nom_error("DAF file record"))?;
        daf_header.ensure_little_endian()?;

        if daf_header.nd != 2 || daf_header.ni != 6 || daf_header.fward < 2 {
            return Err(CelestialError::NomParsingError(format!(
                "not an SPK layout (ND={}, NI={}, FWARD={})",
                daf_header.nd, daf_header.ni, daf_header.fward
            )));
        }

        let comment_len = (daf_header.fward as usize - 2) * DAF_RECORD_BYTES;
        let mut comment = vec![0u8; comment_len];
        reader.read_exact(&mut comment)?;
        let comment = String::from_utf8_lossy(&comment).replace('\0', "\n");
        let header = JPLEphemHeader::from_comment(&comment);

        let summary_size = daf_header.summary_words() * 8;
        let max_summaries = (DAF_RECORD_BYTES - 24) / summary_size;

        let mut segments: HashMap<(i32, i32), Vec<SpkSegment>> = HashMap::new();
        let mut record_number = daf_header.fward as usize;
        let mut visited = 0usize;

        while record_number != 0 {
            visited += 1;
            if visited > daf_header.free.max(1) as usize / 128 + 1 {
                return Err(CelestialError::NomParsingError(
                    "summary record chain does not terminate".to_string(),
                ));
            }

            reader.seek(SeekFrom::Start(((record_number - 1) * DAF_RECORD_BYTES) as u64))?;
            reader.read_exact(&mut buffer)?;

            let (input, next) = le_f64(buffer.as_slice()).map_err(nom_error("summary control"))?;
            let (input, _prev) = le_f64(input).map_err(nom_error("summary control"))?;
            let (_, nsum) = le_f64(input).map_err(nom_error("summary control"))?;

            let nsum = nsum as usize;
            if nsum > max_summaries {
                return Err(CelestialError::NomParsingError(format!(
                    "summary record {record_number} claims {nsum} summaries"
                )));
            }

            for i in 0..nsum {
                let start = 24 + i * summary_size;
                let (_, summary) = Summary::parse(&buffer[start..start + summary_size])
                    .map_err(nom_error("segment summary"))?;
                summary.ensure_chebyshev()?;

                let directory = DirectoryData::parse(reader, summary.final_addr as usize)?;
                let records = EphemerisRecord::parse(
                    reader,
                    summary.initial_addr as usize,
                    directory.rsize,
                    directory.n_records,
                )?;

                segments
                    .entry((summary.target, summary.center))
                    .or_default()
                    .push(SpkSegment {
                        summary,
                        directory,
                        records,
                    });
            }

            record_number = next as usize;
        }

        Ok(NaifData {
            daf_header,
            header,
            segments,
        })
    }

    /// Whether the kernel holds any segment for this pair.
    pub fn has_segment(&self, target: i32, center: i32) -> bool {
        self.segments.contains_key(&(target, center))
    }

    fn segment(&self, target: i32, center: i32, et_seconds: f64) -> Result<&SpkSegment, CelestialError> {
        self.segments
            .get(&(target, center))
            .and_then(|segments| segments.iter().find(|s| s.summary.covers(et_seconds)))
            .filter(|segment| !segment.records.is_empty())
            .ok_or(CelestialError::EpochOutOfRange {
                target,
                center,
                et_seconds,
            })
    }

    /// Position (km) and velocity (km/s) of `target` relative to `center`.
    pub fn state(
        &self,
        target: i32,
        center: i32,
        et_seconds: f64,
    ) -> Result<(Vector3<f64>, Vector3<f64>), CelestialError> {
        Ok(self.segment(target, center, et_seconds)?.state(et_seconds))
    }

    pub fn version(&self) -> Option<&str> {
        self.header.as_ref().map(|h| h.version.as_str())
    }
}

impl fmt::Display for NaifData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "+{:-^78}+", " Ephemeris File Information ")?;
        writeln!(f, "{}", self.daf_header)?;
        if let Some(header) = &self.header {
            writeln!(f, "{header}")?;
        }
        writeln!(f, "+{:-^78}+", " Available Segments ")?;

        for (target, center) in self.segments.keys().sorted() {
            for segment in &self.segments[&(*target, *center)] {
                writeln!(f, "+{:-^78}+", format!(" Target: {target}, Center: {center} "))?;
                write!(f, "{}", segment.summary)?;
                write!(f, "{}", segment.directory)?;
            }
        }
        writeln!(f, "+{:-^78}+", "")
    }
}
