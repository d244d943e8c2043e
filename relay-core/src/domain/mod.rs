//! Core domain types
//!
//! This module contains the domain structures shared across the worker.
//! These types represent the fundamental entities of the worker lifecycle
//! and are used by both the client crate (wire conversion) and the worker
//! binary (execution).

pub mod metrics;
pub mod request;
pub mod session;
