//! Scheduler layer for the worker
//!
//! This layer owns the poll loop: it computes the adaptive cadence,
//! asks the dispatcher for work, and hands assignments to the request
//! processor without blocking on their completion.

pub mod poller;

pub use poller::PollScheduler;
