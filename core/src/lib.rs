//! Scheduling core for the representative portal: time-slot store access,
//! draft range selection, weekly statistics, attendance aggregation and
//! heuristic gig scoring.

pub mod attendance;
pub mod clock;
pub mod command;
pub mod config;
pub mod draft;
pub mod error;
pub mod event;
pub mod model;
pub mod planner;
pub mod rng;
pub mod scoring;
pub mod session;
pub mod stats;
pub mod store;
pub mod types;
pub mod views;
