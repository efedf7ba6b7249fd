//! DAF (Double precision Array File) file record.
//!
//! The first 1024-byte record of an SPK kernel describes the layout of the
//! rest of the file:
//!
//! * **`idword`**: format identifier, `"DAF/SPK"` for planetary kernels.
//! * **`nd`** / **`ni`**: number of double / integer components of each array
//!   summary (`2` and `6` for SPK).
//! * **`fward`** / **`bward`**: 1-based record numbers of the first and last
//!   summary records.
//! * **`free`**: first free double-precision address.
//! * **`locfmt`**: binary format tag, `"LTL-IEEE"` or `"BIG-IEEE"`.
//!
//! Integers are read little-endian; [`DAFHeader::ensure_little_endian`] rejects
//! kernels written in another format before any of their numbers are trusted.
use std::fmt;

use nom::{bytes::complete::take, number::complete::le_i32, IResult};

use crate::celestial_errors::CelestialError;

/// Size in bytes of one DAF physical record.
pub const DAF_RECORD_BYTES: usize = 1024;

#[derive(Debug, PartialEq, Clone)]
pub struct DAFHeader {
    pub idword: String,
    pub internal_filename: String,
    pub nd: i32,
    pub ni: i32,
    pub fward: i32,
    pub bward: i32,
    pub free: i32,
    pub locfmt: String,
}

impl DAFHeader {
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, id_word) = take(8usize)(input)?;
        let (input, nd) = le_i32(input)?;
        let (input, ni) = le_i32(input)?;
        let (input, ifname) = take(60usize)(input)?;
        let (input, fward) = le_i32(input)?;
        let (input, bward) = le_i32(input)?;
        let (input, free) = le_i32(input)?;
        let (input, locfmt) = take(8usize)(input)?;

        let text = |bytes: &[u8]| String::from_utf8_lossy(bytes).trim().to_string();
        Ok((
            input,
            DAFHeader {
                idword: text(id_word),
                internal_filename: text(ifname),
                nd,
                ni,
                fward,
                bward,
                free,
                locfmt: text(locfmt),
            },
        ))
    }

    pub fn ensure_little_endian(&self) -> Result<(), CelestialError> {
        if self.locfmt == "LTL-IEEE" {
            Ok(())
        } else {
            Err(CelestialError::UnsupportedBinaryFormat(self.locfmt.clone()))
        }
    }

    /// Number of double-precision words taken by one array summary.
    pub fn summary_words(&self) -> usize {
        self.nd as usize + (self.ni as usize).div_ceil(2)
    }
}

impl fmt::Display for DAFHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const LABEL_WIDTH: usize = 18;
        const VALUE_WIDTH: usize = 50;

        let rows = [
            ("ID Word", self.idword.clone()),
            ("Internal Name", self.internal_filename.clone()),
            ("ND (doubles)", format!("{} double precision components", self.nd)),
            ("NI (integers)", format!("{} integer components", self.ni)),
            ("Forward Ptr", format!("first summary record: {}", self.fward)),
            ("Backward Ptr", format!("last summary record: {}", self.bward)),
            ("Free Addr", format!("next free address: {}", self.free)),
            ("Binary Format", self.locfmt.clone()),
        ];

        let border = format!(
            "+{:-<label$}+{:-<value$}+",
            "",
            "",
            label = LABEL_WIDTH + 1,
            value = VALUE_WIDTH + 1
        );

        writeln!(f, "{border}")?;
        writeln!(
            f,
            "| {:<label$}| {:<value$}|",
            "DAF File Header",
            "",
            label = LABEL_WIDTH,
            value = VALUE_WIDTH
        )?;
        writeln!(f, "{border}")?;
        for (label, value) in rows {
            writeln!(
                f,
                "| {:<label$}| {:<value$}|",
                label,
                value,
                label = LABEL_WIDTH,
                value = VALUE_WIDTH
            )?;
        }
        writeln!(f, "{border}")
    }
}

#[cfg(test)]
pub(crate) mod daf_header_test {
    use super::*;

    /// Build a DAF file record with the given layout fields.
    pub(crate) fn file_record(nd: i32, ni: i32, fward: i32, bward: i32, free: i32, locfmt: &[u8; 8]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(DAF_RECORD_BYTES);
        buf.extend_from_slice(b"DAF/SPK ");
        buf.extend_from_slice(&nd.to_le_bytes());
        buf.extend_from_slice(&ni.to_le_bytes());
        let mut name = [b' '; 60];
        name[..9].copy_from_slice(b"SYNTHETIC");
        buf.extend_from_slice(&name);
        buf.extend_from_slice(&fward.to_le_bytes());
        buf.extend_from_slice(&bward.to_le_bytes());
        buf.extend_from_slice(&free.to_le_bytes());
        buf.extend_from_slice(locfmt);
        buf.resize(DAF_RECORD_BYTES, 0);
        buf
    }

    #[test]
    fn test_parse_daf_header() {
        let record = file_record(2, 6, 4, 4, 1234, b"LTL-IEEE");
        let (_, header) = DAFHeader::parse(&record).unwrap();
        assert_eq!(
            header,
            DAFHeader {
                idword: "DAF/SPK".to_string(),
                internal_filename: "SYNTHETIC".to_string(),
                nd: 2,
                ni: 6,
                fward: 4,
                bward: 4,
                free: 1234,
                locfmt: "LTL-IEEE".to_string(),
            }
        );
        assert_eq!(header.summary_words(), 5);
        assert!(header.ensure_little_endian().is_ok());
    }

    #[test]
    fn test_big_endian_rejected() {
        let record = file_record(2, 6, 4, 4, 1234, b"BIG-IEEE");
        let (_, header) = DAFHeader::parse(&record).unwrap();
        assert_eq!(
            header.ensure_little_endian(),
            Err(CelestialError::UnsupportedBinaryFormat("BIG-IEEE".into()))
        );
    }

    #[test]
    fn test_truncated_header() {
        assert!(DAFHeader::parse(&[0u8; 40]).is_err());
    }
}
