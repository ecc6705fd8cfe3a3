//! Append-only daily journal. Lines follow a fixed `|`-delimited shape and
//! are partitioned into one text file per calendar day.

pub mod line;
pub mod store;
