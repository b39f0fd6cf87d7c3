//! Core data types
//!
//! # Types
//!
//! - [`Observation`] - One time-stamped position of one entity
//! - [`GroupId`] - Entity identifier used to partition a table
//! - [`ObservationTable`] - Canonical `{time, x, y, id}` record collection

pub mod observation;

pub use observation::{GroupId, Observation, ObservationTable};
