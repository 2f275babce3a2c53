//! Sea-ORM entities for the outreach tables

pub mod list;
pub mod membership_event;
pub mod status_change;
