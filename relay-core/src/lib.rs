//! Relay Core
//!
//! Core types for the relay worker pool.
//!
//! This crate contains:
//! - Domain types: Core business entities (Session, WorkRequest, metrics)
//! - DTOs: Data transfer objects for the dispatcher wire contract

pub mod domain;
pub mod dto;
