pub mod almanac;
pub mod celestial;
pub mod celestial_errors;
pub mod config;
pub mod constants;
pub mod day_window;
pub mod earth_orientation;
pub mod fields;
pub mod jpl_ephem;
pub mod observers;
pub mod searchlib;
pub mod time;
pub mod units;
