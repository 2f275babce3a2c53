//! Sea-ORM entities for the catalog tables

pub mod company;
pub mod metric_snapshot;
