//! Text header that JPL writes into the comment area of DE kernels.
//!
//! Only newer kernels carry it, so [`JPLEphemHeader::from_comment`] returns
//! `None` rather than an error when the expected lines are not there.
use std::fmt;

use nom::{
    bytes::complete::{tag, take_until},
    character::complete::{line_ending, multispace0, not_line_ending, space1},
    number::complete::double,
    IResult, Parser,
};

#[derive(Debug, PartialEq, Clone)]
pub struct JPLEphemHeader {
    pub version: String,
    pub creation_date: String,
    pub start_ephem: String,
    pub end_ephem: String,
    pub start_jd: f64,
    pub end_jd: f64,
}

fn rest_of_line_after<'a>(marker: &'static str, input: &'a str) -> IResult<&'a str, &'a str> {
    let (input, _) = take_until(marker)(input)?;
    let (input, _) = tag(marker)(input)?;
    let (input, value) = not_line_ending(input)?;
    Ok((input, value.trim()))
}

impl JPLEphemHeader {
    fn parse_date_range(input: &str) -> IResult<&str, (&str, &str)> {
        let (input, _) = take_until("Time span covered by ephemeris:")(input)?;
        let (input, _) = tag("Time span covered by ephemeris:")(input)?;
        let (input, _) = multispace0(input)?;
        let (input, start) = take_until(" to ")(input)?;
        let (input, _) = tag(" to ")(input)?;
        let (input, end) = not_line_ending(input)?;
        Ok((input, (start.trim(), end.trim())))
    }

    fn parse_jd_range(input: &str) -> IResult<&str, (f64, f64)> {
        let (input, _) = (line_ending, multispace0, tag("JD"), space1).parse(input)?;
        let (input, start_jd) = double(input)?;
        let (input, _) = (space1, tag("to"), space1, tag("JD"), space1).parse(input)?;
        let (input, end_jd) = double(input)?;
        Ok((input, (start_jd, end_jd)))
    }

    pub fn parse(input: &str) -> IResult<&str, Self> {
        let (input, version) = rest_of_line_after("JPL planetary and lunar ephemeris ", input)?;
        let (input, creation_date) = rest_of_line_after("Integrated ", input)?;
        let (input, (start_ephem, end_ephem)) = Self::parse_date_range(input)?;
        let (input, (start_jd, end_jd)) = Self::parse_jd_range(input)?;
        Ok((
            input,
            JPLEphemHeader {
                version: version.to_string(),
                creation_date: creation_date.to_string(),
                start_ephem: start_ephem.to_string(),
                end_ephem: end_ephem.to_string(),
                start_jd,
                end_jd,
            },
        ))
    }

    /// Look for the header in the (NUL-stripped) comment area of a kernel.
    pub fn from_comment(comment: &str) -> Option<Self> {
        Self::parse(comment).ok().map(|(_, header)| header)
    }
}

impl fmt::Display for JPLEphemHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const LABEL_WIDTH: usize = 20;
        const VALUE_WIDTH: usize = 30;

        let border = format!(
            "+{:-<label$}+{:-<value$}+",
            "",
            "",
            label = LABEL_WIDTH + 2,
            value = VALUE_WIDTH + 2
        );
        let rows = [
            ("Version", self.version.clone()),
            ("Creation Date", self.creation_date.clone()),
            ("Start Ephem", self.start_ephem.clone()),
            ("End Ephem", self.end_ephem.clone()),
            ("Start JD", format!("{:.6}", self.start_jd)),
            ("End JD", format!("{:.6}", self.end_jd)),
        ];

        writeln!(f, "{border}")?;
        for (label, value) in rows {
            writeln!(f, "| {label:<LABEL_WIDTH$} | {value:<VALUE_WIDTH$} |")?;
        }
        writeln!(f, "{border}")
    }
}
