//! Data transfer objects for the dispatcher wire contract
//!
//! Field names in this module are the wire contract: they match the
//! dispatcher API exactly and must not be renamed without a protocol
//! change on the dispatcher side.

pub mod poll;
pub mod register;
pub mod report;
