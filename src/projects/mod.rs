//! Project and task tracking backed by a single JSON file with
//! backup-before-overwrite durability.

pub mod model;
pub mod store;
pub mod view;
