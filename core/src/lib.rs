//! Multi-touch marketing attribution engine.
//!
//! Credits each conversion's value across the channels a user touched
//! before converting, under several rule-based models, and sums the
//! credits per channel across a population of journeys.

pub mod aggregate;
pub mod config;
pub mod credit;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod journey;
pub mod models;
pub mod navigation;
pub mod normalize;
pub mod rng;
pub mod synth;
pub mod types;
