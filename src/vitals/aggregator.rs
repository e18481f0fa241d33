use std::sync::mpsc::{self, RecvTimeoutError, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};

use crate::types::{MonitorEvent, VitalChannel, VitalsSnapshot};
use crate::vitals::profile::ProfileSet;
use crate::vitals::simulator::{ChannelReader, ChannelSimulator};

/// Anything that can report the newest value of one channel.
pub trait VitalSource {
    fn channel(&self) -> VitalChannel;
    fn latest(&self) -> Option<f64>;
}

impl VitalSource for ChannelReader {
    fn channel(&self) -> VitalChannel {
        ChannelReader::channel(self)
    }
    fn latest(&self) -> Option<f64> {
        ChannelReader::latest(self)
    }
}

impl VitalSource for ChannelSimulator {
    fn channel(&self) -> VitalChannel {
        ChannelSimulator::channel(self)
    }
    fn latest(&self) -> Option<f64> {
        ChannelSimulator::latest(self)
    }
}

/// Takes the newest value of every channel. A channel that is missing or has
/// produced nothing reads as its profile baseline.
pub fn sample<S: VitalSource>(channels: &[S], profiles: &ProfileSet) -> VitalsSnapshot {
    let value = |kind: VitalChannel| {
        channels
            .iter()
            .find(|source| source.channel() == kind)
            .and_then(|source| source.latest())
            .unwrap_or(profiles.channel(kind).baseline)
    };
    VitalsSnapshot::new(
        value(VitalChannel::HeartRate),
        value(VitalChannel::BloodPressure),
        value(VitalChannel::SpO2),
        value(VitalChannel::Respiration),
    )
}

/// Summary line handed verbatim to the Q&A and diagnosis prompts.
pub fn describe(snapshot: &VitalsSnapshot) -> String {
    snapshot.to_string()
}

/// Samples the channels on its own, slower timer.
pub struct Aggregator {
    cadence: Duration,
    latest: Arc<Mutex<Option<VitalsSnapshot>>>,
    stop_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl Aggregator {
    pub fn start(
        readers: Vec<ChannelReader>,
        profiles: ProfileSet,
        cadence: Duration,
        generation: u64,
        events: Option<Sender<MonitorEvent>>,
    ) -> Self {
        let latest = Arc::new(Mutex::new(None));
        let (stop_tx, stop_rx) = mpsc::channel();
        let job = SampleJob {
            readers,
            profiles,
            generation,
            events,
            latest: Arc::clone(&latest),
        };
        let worker = thread::spawn(move || job.run(stop_rx, cadence));
        info!("aggregator started (generation {generation}, cadence {cadence:?})");
        Self {
            cadence,
            latest,
            stop_tx: Some(stop_tx),
            worker: Some(worker),
        }
    }

    /// Most recent published snapshot; `None` until the first cadence elapses.
    pub fn latest(&self) -> Option<VitalsSnapshot> {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn cadence(&self) -> Duration {
        self.cadence
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        if let Some(tx) = self.stop_tx.take() {
            tx.send(()).ok();
        }
        if worker.join().is_err() {
            warn!("aggregator thread panicked");
        }
        info!("aggregator stopped");
    }
}

impl Drop for Aggregator {
    fn drop(&mut self) {
        self.stop();
    }
}

struct SampleJob {
    readers: Vec<ChannelReader>,
    profiles: ProfileSet,
    generation: u64,
    events: Option<Sender<MonitorEvent>>,
    latest: Arc<Mutex<Option<VitalsSnapshot>>>,
}

impl SampleJob {
    fn run(mut self, stop_rx: Receiver<()>, cadence: Duration) {
        loop {
            match stop_rx.recv_timeout(cadence) {
                Err(RecvTimeoutError::Timeout) => self.publish(),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }

    fn publish(&mut self) {
        let snapshot = sample(&self.readers, &self.profiles);
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
        let Some(tx) = &self.events else {
            return;
        };
        let event = MonitorEvent::Vitals {
            generation: self.generation,
            summary: describe(&snapshot),
            snapshot,
        };
        if tx.send(event).is_err() {
            // 接收端已关闭，之后只更新 latest
            debug!("vitals subscriber gone, generation {}", self.generation);
            self.events = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vitals::config::MonitorConfig;
    use crate::vitals::pattern::pattern_for;

    struct Fixed(VitalChannel, Option<f64>);

    impl VitalSource for Fixed {
        fn channel(&self) -> VitalChannel {
            self.0
        }
        fn latest(&self) -> Option<f64> {
            self.1
        }
    }

    #[test]
    fn describe_matches_the_prompt_format() {
        let snapshot = sample(
            &[
                Fixed(VitalChannel::HeartRate, Some(95.0)),
                Fixed(VitalChannel::BloodPressure, Some(140.0)),
                Fixed(VitalChannel::SpO2, Some(94.0)),
                Fixed(VitalChannel::Respiration, Some(22.0)),
            ],
            &ProfileSet::STABLE_ADULT,
        );
        assert_eq!(
            describe(&snapshot),
            "Heart Rate: 95 bpm, Blood Pressure: 140/90 mmHg, SpO2: 94%, Respiration Rate: 22/min"
        );
    }

    #[test]
    fn empty_or_missing_channels_read_as_baseline() {
        let profiles = ProfileSet::STABLE_ADULT;
        let snapshot = sample(
            &[
                Fixed(VitalChannel::HeartRate, None),
                Fixed(VitalChannel::SpO2, Some(91.0)),
            ],
            &profiles,
        );
        assert_eq!(snapshot.hr, profiles.hr.baseline);
        assert_eq!(snapshot.bp.systolic, profiles.bp.baseline);
        assert_eq!(snapshot.spo2, 91.0);
        assert_eq!(snapshot.resp, profiles.resp.baseline);
    }

    #[test]
    fn publishes_on_its_own_cadence_and_stops() {
        let profiles = ProfileSet::STABLE_ADULT;
        let config = MonitorConfig {
            tick_period_ms: 60_000,
            ..MonitorConfig::default()
        };
        let sims: Vec<ChannelSimulator> = VitalChannel::ALL
            .iter()
            .map(|&ch| {
                ChannelSimulator::start(ch, *profiles.channel(ch), pattern_for(ch), &config)
            })
            .collect();
        let readers = sims.iter().map(ChannelSimulator::reader).collect();
        let (tx, rx) = mpsc::channel();
        let mut aggregator =
            Aggregator::start(readers, profiles, Duration::from_millis(10), 7, Some(tx));
        let event = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        match event {
            MonitorEvent::Vitals {
                generation,
                snapshot,
                summary,
            } => {
                assert_eq!(generation, 7);
                assert_eq!(snapshot.hr, profiles.hr.baseline);
                assert!(summary.starts_with("Heart Rate: 75 bpm"));
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(aggregator.latest().is_some());
        aggregator.stop();
        while rx.try_recv().is_ok() {}
        thread::sleep(Duration::from_millis(40));
        assert!(rx.try_recv().is_err());
    }
}
