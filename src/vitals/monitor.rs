use std::sync::mpsc::Sender;

use log::info;

use crate::types::{MonitorEvent, VitalChannel, VitalsSnapshot};
use crate::vitals::aggregator::{self, Aggregator};
use crate::vitals::config::MonitorConfig;
use crate::vitals::error::ConfigError;
use crate::vitals::pattern::pattern_for;
use crate::vitals::plot::ChartSeries;
use crate::vitals::profile::{resolve_named, ProfileSet};
use crate::vitals::simulator::ChannelSimulator;

/// Four channel simulators plus the aggregator for one patient on screen.
///
/// Switching the condition tears down the whole generation before the next
/// one starts; events carry the generation so stale ones can be dropped.
pub struct VitalsMonitor {
    config: MonitorConfig,
    condition: String,
    profile_name: &'static str,
    profiles: ProfileSet,
    generation: u64,
    channels: Vec<ChannelSimulator>,
    aggregator: Option<Aggregator>,
    events: Option<Sender<MonitorEvent>>,
}

impl VitalsMonitor {
    pub fn start(
        condition: &str,
        config: MonitorConfig,
        events: Option<Sender<MonitorEvent>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut monitor = Self {
            config,
            condition: String::new(),
            profile_name: "",
            profiles: ProfileSet::STABLE_ADULT,
            generation: 0,
            channels: Vec::new(),
            aggregator: None,
            events,
        };
        monitor.launch(condition);
        Ok(monitor)
    }

    /// Replaces every running timer with a fresh set for `condition`.
    pub fn switch_condition(&mut self, condition: &str) {
        let previous = self.generation;
        self.stop();
        self.generation += 1;
        info!(
            "monitor generation {previous} -> {}: {:?} -> {condition:?}",
            self.generation, self.condition
        );
        self.launch(condition);
    }

    pub fn stop(&mut self) {
        if self.channels.is_empty() && self.aggregator.is_none() {
            return;
        }
        if let Some(mut aggregator) = self.aggregator.take() {
            aggregator.stop();
        }
        for channel in &mut self.channels {
            channel.stop();
        }
        self.channels.clear();
        self.emit(MonitorEvent::Stopped {
            generation: self.generation,
        });
    }

    pub fn is_running(&self) -> bool {
        !self.channels.is_empty()
    }

    fn launch(&mut self, condition: &str) {
        let resolved = resolve_named(condition);
        let profiles = resolved.profiles.with_clamping(self.config.clamp_to_domain);
        self.channels = VitalChannel::ALL
            .iter()
            .map(|&ch| ChannelSimulator::start(ch, *profiles.channel(ch), pattern_for(ch), &self.config))
            .collect();
        let readers = self.channels.iter().map(ChannelSimulator::reader).collect();
        self.aggregator = Some(Aggregator::start(
            readers,
            profiles,
            self.config.sample_cadence(),
            self.generation,
            self.events.clone(),
        ));
        self.condition = condition.to_owned();
        self.profile_name = resolved.name;
        self.profiles = profiles;
        info!(
            "monitor generation {} running {:?} as {}",
            self.generation, condition, resolved.name
        );
        self.emit(MonitorEvent::Started {
            generation: self.generation,
            condition: self.condition.clone(),
            profile_name: self.profile_name,
        });
    }

    fn emit(&mut self, event: MonitorEvent) {
        if let Some(tx) = &self.events {
            if tx.send(event).is_err() {
                self.events = None;
            }
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn condition(&self) -> &str {
        &self.condition
    }

    pub fn profile_name(&self) -> &'static str {
        self.profile_name
    }

    pub fn profiles(&self) -> &ProfileSet {
        &self.profiles
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn channel(&self, channel: VitalChannel) -> Option<&ChannelSimulator> {
        self.channels.iter().find(|sim| sim.channel() == channel)
    }

    /// Rolling history of one channel; empty once the monitor is stopped.
    pub fn read(&self, channel: VitalChannel) -> Vec<f64> {
        self.channel(channel)
            .map(ChannelSimulator::read)
            .unwrap_or_default()
    }

    /// Snapshot published by the aggregator on its last cadence.
    pub fn latest_snapshot(&self) -> Option<VitalsSnapshot> {
        self.aggregator.as_ref().and_then(Aggregator::latest)
    }

    /// Samples all channels right now, outside the cadence.
    pub fn snapshot_now(&self) -> VitalsSnapshot {
        aggregator::sample(&self.channels, &self.profiles)
    }

    /// Current summary line: the last published snapshot, or a fresh sample
    /// before the first cadence has elapsed.
    pub fn summary(&self) -> String {
        let snapshot = self
            .latest_snapshot()
            .unwrap_or_else(|| self.snapshot_now());
        aggregator::describe(&snapshot)
    }

    pub fn chart_series(&self) -> Vec<ChartSeries> {
        self.channels
            .iter()
            .map(|sim| ChartSeries::new(sim.channel(), sim.read(), sim.profile()))
            .collect()
    }
}

impl Drop for VitalsMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    fn quick_config() -> MonitorConfig {
        MonitorConfig {
            tick_period_ms: 5,
            sample_cadence_ms: 10,
            buffer_length: 40,
            clamp_to_domain: false,
            seed: Some(1),
        }
    }

    #[test]
    fn rejects_invalid_config() {
        let config = MonitorConfig {
            buffer_length: 0,
            ..MonitorConfig::default()
        };
        assert!(VitalsMonitor::start("sepsis", config, None).is_err());
    }

    #[test]
    fn starts_with_resolved_baselines() {
        let config = MonitorConfig {
            tick_period_ms: 60_000,
            ..quick_config()
        };
        let monitor = VitalsMonitor::start("Acute Myocardial Infarction", config, None).unwrap();
        assert_eq!(monitor.profile_name(), "myocardial infarction");
        for ch in VitalChannel::ALL {
            let baseline = monitor.profiles().channel(ch).baseline;
            assert_eq!(monitor.read(ch), vec![baseline; 40]);
        }
        assert_eq!(
            monitor.summary(),
            "Heart Rate: 110 bpm, Blood Pressure: 95/61 mmHg, SpO2: 93%, Respiration Rate: 24/min"
        );
    }

    #[test]
    fn switching_condition_retires_the_old_generation() {
        let (tx, rx) = mpsc::channel();
        let mut monitor = VitalsMonitor::start("stable", quick_config(), Some(tx)).unwrap();
        let old_reader = monitor
            .channel(VitalChannel::HeartRate)
            .map(ChannelSimulator::reader)
            .unwrap();
        thread::sleep(Duration::from_millis(30));

        monitor.switch_condition("sepsis");
        let frozen = old_reader.read();
        thread::sleep(Duration::from_millis(40));
        assert_eq!(old_reader.read(), frozen);

        assert_eq!(monitor.generation(), 1);
        assert_eq!(monitor.profile_name(), "sepsis");
        assert_eq!(monitor.read(VitalChannel::HeartRate).len(), 40);

        let events: Vec<MonitorEvent> = rx.try_iter().collect();
        let stopped_at = events
            .iter()
            .position(|e| matches!(e, MonitorEvent::Stopped { generation: 0 }))
            .unwrap();
        // Nothing from generation 0 follows its Stopped marker.
        assert!(events[stopped_at..].iter().skip(1).all(|e| e.generation() == 1));
        assert!(events
            .iter()
            .any(|e| matches!(e, MonitorEvent::Started { generation: 1, .. })));
        // A switch only ever reports the retired generation as stopped.
        assert!(events
            .iter()
            .filter(|e| matches!(e, MonitorEvent::Stopped { .. }))
            .all(|e| e.generation() < monitor.generation()));
    }

    #[test]
    fn stop_releases_everything() {
        let mut monitor = VitalsMonitor::start("sepsis", quick_config(), None).unwrap();
        let reader = monitor
            .channel(VitalChannel::SpO2)
            .map(ChannelSimulator::reader)
            .unwrap();
        monitor.stop();
        assert!(!monitor.is_running());
        assert!(monitor.read(VitalChannel::SpO2).is_empty());
        let frozen = reader.read();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(reader.read(), frozen);
    }

    #[test]
    fn dropping_the_monitor_freezes_every_channel() {
        let (tx, rx) = mpsc::channel();
        let monitor = VitalsMonitor::start("sepsis", quick_config(), Some(tx)).unwrap();
        let readers: Vec<_> = monitor
            .channels
            .iter()
            .map(ChannelSimulator::reader)
            .collect();
        thread::sleep(Duration::from_millis(20));
        drop(monitor);

        let frozen: Vec<Vec<f64>> = readers.iter().map(|r| r.read()).collect();
        thread::sleep(Duration::from_millis(40));
        for (reader, before) in readers.iter().zip(&frozen) {
            assert_eq!(&reader.read(), before, "{:?} kept ticking", reader.channel());
        }
        assert!(rx
            .try_iter()
            .any(|e| matches!(e, MonitorEvent::Stopped { generation: 0 })));
    }

    #[test]
    fn config_clamp_reaches_every_channel() {
        let config = MonitorConfig {
            tick_period_ms: 2,
            clamp_to_domain: true,
            ..quick_config()
        };
        let monitor = VitalsMonitor::start("sepsis", config, None).unwrap();
        thread::sleep(Duration::from_millis(150));
        for series in monitor.chart_series() {
            assert!(series.clamped);
            let (lo, hi) = series.domain;
            assert!(
                series.values.iter().all(|v| (lo..=hi).contains(v)),
                "{:?} left {lo}..={hi}",
                series.channel
            );
        }
    }

    #[test]
    fn chart_series_cover_all_channels() {
        let monitor = VitalsMonitor::start("chest pain", quick_config(), None).unwrap();
        let series = monitor.chart_series();
        assert_eq!(series.len(), 4);
        for (s, ch) in series.iter().zip(VitalChannel::ALL) {
            assert_eq!(s.channel, ch);
            assert_eq!(s.values.len(), 40);
            assert_eq!(s.domain, monitor.profiles().channel(ch).domain());
        }
    }
}
