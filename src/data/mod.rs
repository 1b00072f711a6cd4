//! External depth data (NOAA Atlas 14).

pub mod atlas14;

pub use atlas14::{Atlas14Client, Atlas14Table, parse_atlas14_csv, read_atlas14_file};
