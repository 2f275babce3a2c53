//! Outreach Domain
//!
//! Named lists of companies (the outreach pipeline stages) backed by an
//! append-only event log. Membership is never stored as mutable state:
//! the latest event per (list, company) decides it, so the full history
//! of adds and removes stays queryable forever.
//!
//! Promotion from "interested" to "reached out" is a single transaction
//! that moves the company between lists and records the status change.

pub mod entity;
pub mod error;
pub mod keylock;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{OutreachError, OutreachResult};
pub use keylock::KeyedLocks;
pub use models::{
    INTERESTED, ListMember, MembershipAction, MembershipEvent, MembershipPage, OutreachList,
    PromoteOutcome, REACHED_OUT, StatusChange, current_membership,
};
pub use postgres::PgMembershipStore;
pub use repository::MembershipStore;
pub use service::ListService;
