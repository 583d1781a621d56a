//! Pacing module
//!
//! Turns the configured delays into humanized pauses:
//! - Random variance around each base delay
//! - Occasional hesitation before a placement
//!
//! Pacing only decides when a step is reported, never what is decided.

pub mod humanize;

pub use humanize::Pacer;
