// src/vitals/mod.rs
// 生命体征模拟引擎：波形模板 -> 病情参数 -> 通道模拟 -> 汇总
pub mod aggregator;
pub mod buffer;
pub mod config;
pub mod error;
pub mod monitor;
pub mod pattern;
pub mod plot;
pub mod profile;
pub mod simulator;
// 公开导出常用类型，方便外部调用
pub use aggregator::{describe, sample, Aggregator, VitalSource};
pub use buffer::RollingBuffer;
pub use config::MonitorConfig;
pub use error::{ConfigError, PlotError};
pub use monitor::VitalsMonitor;
pub use pattern::{
    blood_pressure_pattern, heart_rate_pattern, pattern_for, respiration_pattern, spo2_pattern,
    WaveformPattern,
};
pub use plot::{render_monitor_png, ChartSeries, PlotStyle};
pub use profile::{resolve, resolve_named, ChannelProfile, ProfileSet, ResolvedCondition};
pub use simulator::{ChannelReader, ChannelSimulator, ChannelState};
