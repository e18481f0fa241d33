// src/types.rs
use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

// 生理信号通道
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VitalChannel {
    HeartRate,
    BloodPressure,
    SpO2,
    Respiration,
}

impl VitalChannel {
    /// Display order used by the monitor grid and the summary line.
    pub const ALL: [VitalChannel; 4] = [
        VitalChannel::HeartRate,
        VitalChannel::BloodPressure,
        VitalChannel::SpO2,
        VitalChannel::Respiration,
    ];

    pub fn title(self) -> &'static str {
        match self {
            VitalChannel::HeartRate => "Heart Rate",
            VitalChannel::BloodPressure => "Systolic BP",
            VitalChannel::SpO2 => "SpO2",
            VitalChannel::Respiration => "Respiration",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            VitalChannel::HeartRate => "bpm",
            VitalChannel::BloodPressure => "mmHg",
            VitalChannel::SpO2 => "%",
            VitalChannel::Respiration => "/min",
        }
    }

    /// Short identifier for thread names and log lines.
    pub fn key(self) -> &'static str {
        match self {
            VitalChannel::HeartRate => "hr",
            VitalChannel::BloodPressure => "bp",
            VitalChannel::SpO2 => "spo2",
            VitalChannel::Respiration => "resp",
        }
    }

    /// Multiplier applied to the pattern so the shape stands out above the noise.
    /// The QRS spike gets more headroom than the smoother channels.
    pub fn shape_gain(self) -> f64 {
        match self {
            VitalChannel::HeartRate => 6.0,
            _ => 4.0,
        }
    }

    fn index(self) -> u64 {
        match self {
            VitalChannel::HeartRate => 0,
            VitalChannel::BloodPressure => 1,
            VitalChannel::SpO2 => 2,
            VitalChannel::Respiration => 3,
        }
    }

    /// Mixes a base seed with the channel so the four noise streams differ.
    pub fn derive_seed(self, base: u64) -> u64 {
        base ^ (self.index() + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }
}

/// Systolic/diastolic pair. Only the systolic value is simulated.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BloodPressure {
    pub systolic: f64,
    pub diastolic: f64,
}

impl BloodPressure {
    /// 140 systolic maps to 90 diastolic.
    pub const DIASTOLIC_RATIO: f64 = 9.0 / 14.0;

    pub fn from_systolic(systolic: f64) -> Self {
        Self {
            systolic,
            diastolic: systolic * Self::DIASTOLIC_RATIO,
        }
    }
}

/// Latest reading of every channel at one sampling instant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VitalsSnapshot {
    pub taken_at: SystemTime,
    pub hr: f64,
    pub bp: BloodPressure,
    pub spo2: f64,
    pub resp: f64,
}

impl VitalsSnapshot {
    pub fn new(hr: f64, systolic: f64, spo2: f64, resp: f64) -> Self {
        Self {
            taken_at: SystemTime::now(),
            hr,
            bp: BloodPressure::from_systolic(systolic),
            spo2,
            resp,
        }
    }

    /// Scalar reading for one channel (systolic for blood pressure).
    pub fn value(&self, channel: VitalChannel) -> f64 {
        match channel {
            VitalChannel::HeartRate => self.hr,
            VitalChannel::BloodPressure => self.bp.systolic,
            VitalChannel::SpO2 => self.spo2,
            VitalChannel::Respiration => self.resp,
        }
    }
}

// 下游 (问答 / 诊断) 直接读取这一行文字，字段顺序和单位不可更改
impl fmt::Display for VitalsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Heart Rate: {:.0} bpm, Blood Pressure: {:.0}/{:.0} mmHg, SpO2: {:.0}%, Respiration Rate: {:.0}/min",
            self.hr, self.bp.systolic, self.bp.diastolic, self.spo2, self.resp
        )
    }
}

// 监护仪发给界面的消息
#[derive(Clone, Debug)]
pub enum MonitorEvent {
    Started {
        generation: u64,
        condition: String,
        profile_name: &'static str,
    },
    Vitals {
        generation: u64,
        snapshot: VitalsSnapshot,
        summary: String,
    },
    Stopped {
        generation: u64,
    },
}

impl MonitorEvent {
    pub fn generation(&self) -> u64 {
        match self {
            MonitorEvent::Started { generation, .. }
            | MonitorEvent::Vitals { generation, .. }
            | MonitorEvent::Stopped { generation } => *generation,
        }
    }
}
