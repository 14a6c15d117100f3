//! Reviewer weighting and consensus classification for staged application review.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
