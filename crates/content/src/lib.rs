//! Typed wiki content.
//!
//! Eleven content types share a common shape ([`RecordMeta`](models::RecordMeta)
//! plus the [`Content`] view) and are parsed from CSV or JSON sources through
//! [`parse()`]. Rows that fail validation are dropped and reported rather
//! than failing the whole source.

pub mod error;
mod kind;
pub mod models;
mod parse;
mod record;
pub mod records;
mod row;

pub use crate::kind::{Collection, ContentKind};
pub use crate::parse::{Parsed, Rejected, SourceFormat, parse};
pub use crate::record::{Content, Record};
pub use crate::row::{Row, parse_bool, parse_date};
