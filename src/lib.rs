//! Condition-driven vital-sign waveform simulation.
//!
//! A free-text condition resolves to per-channel profiles, each channel ticks
//! on its own timer into a fixed-length history, and an aggregator turns the
//! newest values into a snapshot plus the summary line consumed by the
//! Q&A and diagnosis prompts.
pub mod records;
pub mod types;
pub mod vitals;

pub use types::{BloodPressure, MonitorEvent, VitalChannel, VitalsSnapshot};
pub use vitals::{MonitorConfig, VitalsMonitor};
