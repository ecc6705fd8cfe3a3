//! Command line journal and activity tracker.
//! Keeps daily journal logs, tracks projects and focus cycles, and periodically
//! analyzes screen activity through an external vision model.
//!

pub mod analysis;
pub mod cli;
pub mod config;
pub mod fs;
pub mod journal;
pub mod monitor;
pub mod projects;
pub mod usage;
pub mod utils;
