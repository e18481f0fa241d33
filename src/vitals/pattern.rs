//! Fixed one-cycle waveform templates, one per vital channel.
//!
//! Values are normalized (roughly -1.5..3) and scaled by the channel profile at
//! tick time. The tables are built once and shared; every accessor hands out a
//! cheap clone of the same samples.
use std::f64::consts::PI;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::types::VitalChannel;

/// PQRST-like pulse: small P bump, sharp QRS spike, then a long flat tail.
const ECG_CYCLE: [f64; 44] = [
    0.0, 0.0, 0.0, 0.1, 0.2, 0.1, 0.0, -0.5, 2.8, -1.5, 0.3, 0.1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
];

/// Arterial pressure with a dicrotic notch after the systolic peak.
const ARTERIAL_CYCLE: [f64; 20] = [
    0.7, 0.8, 0.9, 1.0, 0.95, 0.85, 0.8, 0.75, 0.78, 0.72, 0.6, 0.5, 0.4, 0.3, 0.2, 0.2, 0.3,
    0.4, 0.5, 0.6,
];

/// Plethysmograph pulse settling onto a plateau.
const PLETH_CYCLE: [f64; 24] = [
    0.5, 0.6, 0.8, 0.95, 1.0, 0.9, 0.7, 0.6, 0.55, 0.52, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5,
    0.5, 0.5, 0.5, 0.5, 0.5, 0.5,
];

const RESPIRATION_SAMPLES: usize = 40;

static HEART_RATE: Lazy<WaveformPattern> = Lazy::new(|| WaveformPattern::from_table(&ECG_CYCLE));
static BLOOD_PRESSURE: Lazy<WaveformPattern> =
    Lazy::new(|| WaveformPattern::from_table(&ARTERIAL_CYCLE));
static SPO2: Lazy<WaveformPattern> = Lazy::new(|| WaveformPattern::from_table(&PLETH_CYCLE));
static RESPIRATION: Lazy<WaveformPattern> = Lazy::new(|| {
    let last = (RESPIRATION_SAMPLES - 1) as f64;
    let samples = (0..RESPIRATION_SAMPLES)
        .map(|i| (i as f64 / last * PI).sin() * 0.8 + 0.1)
        .collect::<Vec<_>>();
    WaveformPattern {
        samples: samples.into(),
    }
});

#[derive(Clone, Debug, PartialEq)]
pub struct WaveformPattern {
    samples: Arc<[f64]>,
}

impl WaveformPattern {
    /// Builds a custom pattern. An empty cycle has no phase to advance through.
    pub fn from_samples(samples: Vec<f64>) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        Some(Self {
            samples: samples.into(),
        })
    }

    fn from_table(table: &[f64]) -> Self {
        Self {
            samples: table.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Value at a cursor position; the cursor wraps around the cycle.
    pub fn at(&self, cursor: usize) -> f64 {
        self.samples[cursor % self.samples.len()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }
}

pub fn heart_rate_pattern() -> WaveformPattern {
    HEART_RATE.clone()
}

pub fn blood_pressure_pattern() -> WaveformPattern {
    BLOOD_PRESSURE.clone()
}

pub fn spo2_pattern() -> WaveformPattern {
    SPO2.clone()
}

pub fn respiration_pattern() -> WaveformPattern {
    RESPIRATION.clone()
}

pub fn pattern_for(channel: VitalChannel) -> WaveformPattern {
    match channel {
        VitalChannel::HeartRate => heart_rate_pattern(),
        VitalChannel::BloodPressure => blood_pressure_pattern(),
        VitalChannel::SpO2 => spo2_pattern(),
        VitalChannel::Respiration => respiration_pattern(),
    }
}
