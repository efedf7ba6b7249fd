use std::{fmt, str::FromStr};

/// DE kernels published under the NAIF generic kernels directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NaifVersion {
    #[default]
    DE421,
    DE430,
    DE432,
    DE435,
    DE438,
    DE440,
    DE440s,
    DE442,
}

impl NaifVersion {
    pub fn get_filename(&self) -> &'static str {
        match self {
            NaifVersion::DE421 => "de421.bsp",
            NaifVersion::DE430 => "de430.bsp",
            NaifVersion::DE432 => "de432.bsp",
            NaifVersion::DE435 => "de435.bsp",
            NaifVersion::DE438 => "de438.bsp",
            NaifVersion::DE440 => "de440.bsp",
            NaifVersion::DE440s => "de440s.bsp",
            NaifVersion::DE442 => "de442.bsp",
        }
    }

    /// Recognize either a version name (`DE421`) or its file name (`de421.bsp`).
    fn parse_name(s: &str) -> Option<Self> {
        let name = s.trim();
        let name = name.strip_suffix(".bsp").unwrap_or(name);
        match name.to_ascii_uppercase().as_str() {
            "DE421" => Some(NaifVersion::DE421),
            "DE430" => Some(NaifVersion::DE430),
            "DE432" => Some(NaifVersion::DE432),
            "DE435" => Some(NaifVersion::DE435),
            "DE438" => Some(NaifVersion::DE438),
            "DE440" => Some(NaifVersion::DE440),
            "DE440S" => Some(NaifVersion::DE440s),
            "DE442" => Some(NaifVersion::DE442),
            _ => None,
        }
    }
}

impl FromStr for NaifVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaifVersion::parse_name(s).ok_or_else(|| format!("Invalid NAIF version: {s}"))
    }
}

impl fmt::Display for NaifVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.get_filename())
    }
}
