//! Future helpers shared by the content crates.
//!
//! Runtime-agnostic: everything here is built on [`futures`] alone, so the
//! loader can be driven by whichever executor the caller is running.

mod dedupe;

pub use crate::dedupe::{Deduplicator, InFlight};
