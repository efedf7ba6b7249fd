//! NAIF SPK kernel reader (DAF container, type 2 Chebyshev segments).
pub(crate) mod daf_header;
pub(crate) mod directory;
pub(crate) mod ephemeris_record;
pub(crate) mod jpl_ephem_header;
pub mod naif_data;
pub mod naif_ids;
pub mod naif_version;
pub(crate) mod summary_record;
