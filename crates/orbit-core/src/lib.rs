//! Core types and rules for the orbit relationship tracker.
//!
//! Everything here is a pure re-derivation from stored timestamps: health and
//! drift are recomputed on demand, never maintained incrementally. The only
//! mutable entry point is [`tracker::Tracker`], which owns the persisted
//! [`document::Document`] for the lifetime of a session.
//!
//! No database or terminal dependencies live here.

pub mod clock;
pub mod contact;
pub mod document;
pub mod drift;
pub mod error;
pub mod health;
pub mod interaction;
pub mod stats;
pub mod store;
pub mod timestamp;
pub mod tracker;

pub use error::{Error, Result};
