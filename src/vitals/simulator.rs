use std::sync::mpsc::{self, RecvTimeoutError, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{info, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::VitalChannel;
use crate::vitals::buffer::RollingBuffer;
use crate::vitals::config::MonitorConfig;
use crate::vitals::pattern::WaveformPattern;
use crate::vitals::profile::ChannelProfile;

/// Tick state of one channel: pattern cursor, history and noise source.
pub struct ChannelState {
    channel: VitalChannel,
    profile: ChannelProfile,
    pattern: WaveformPattern,
    cursor: usize,
    buffer: RollingBuffer,
    rng: StdRng,
    ticks: u64,
}

impl ChannelState {
    pub fn new(
        channel: VitalChannel,
        profile: ChannelProfile,
        pattern: WaveformPattern,
        buffer_length: usize,
        rng: StdRng,
    ) -> Self {
        Self {
            channel,
            profile,
            pattern,
            cursor: 0,
            buffer: RollingBuffer::filled(buffer_length, profile.baseline),
            rng,
            ticks: 0,
        }
    }

    /// Produces one sample and appends it to the history.
    pub fn tick(&mut self) -> f64 {
        let pattern_value = self.pattern.at(self.cursor);
        let noise = self.rng.gen_range(-0.5_f64..0.5) * self.profile.fluctuation;
        let raw = self.profile.baseline
            + pattern_value * self.profile.fluctuation * self.channel.shape_gain()
            + noise;
        let value = self.profile.apply_domain(raw);
        self.buffer.push(value);
        self.cursor = (self.cursor + 1) % self.pattern.len();
        self.ticks += 1;
        value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn buffer(&self) -> &RollingBuffer {
        &self.buffer
    }

    pub fn profile(&self) -> &ChannelProfile {
        &self.profile
    }
}

fn lock_state(state: &Mutex<ChannelState>) -> MutexGuard<'_, ChannelState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn rng_for(config: &MonitorConfig, channel: VitalChannel) -> StdRng {
    match config.channel_seed(channel) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// One channel ticking on its own worker thread.
///
/// The profile is fixed for the simulator's lifetime; a new condition means a
/// new simulator. Dropping the simulator stops it.
pub struct ChannelSimulator {
    channel: VitalChannel,
    profile: ChannelProfile,
    period: Duration,
    state: Arc<Mutex<ChannelState>>,
    stop_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl ChannelSimulator {
    pub fn start(
        channel: VitalChannel,
        profile: ChannelProfile,
        pattern: WaveformPattern,
        config: &MonitorConfig,
    ) -> Self {
        let state = ChannelState::new(
            channel,
            profile,
            pattern,
            config.buffer_length,
            rng_for(config, channel),
        );
        let state = Arc::new(Mutex::new(state));
        let period = config.tick_period_for(&profile);
        let (stop_tx, stop_rx) = mpsc::channel();
        let worker_state = Arc::clone(&state);
        let worker = thread::spawn(move || run_ticks(worker_state, stop_rx, period));
        info!(
            "{} simulator started (baseline {}, period {:?})",
            channel.key(),
            profile.baseline,
            period
        );
        Self {
            channel,
            profile,
            period,
            state,
            stop_tx: Some(stop_tx),
            worker: Some(worker),
        }
    }

    /// Halts the worker and waits for it, so no tick lands after this returns.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        if let Some(tx) = self.stop_tx.take() {
            tx.send(()).ok();
        }
        if worker.join().is_err() {
            warn!("{} ticker thread panicked", self.channel.key());
        }
        info!("{} simulator stopped", self.channel.key());
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// History oldest to newest; always `buffer_length` entries long.
    pub fn read(&self) -> Vec<f64> {
        lock_state(&self.state).buffer.to_vec()
    }

    pub fn latest(&self) -> Option<f64> {
        lock_state(&self.state).buffer.latest()
    }

    pub fn cursor(&self) -> usize {
        lock_state(&self.state).cursor
    }

    /// Runs one tick immediately, outside the timer.
    pub fn step(&self) -> Option<f64> {
        debug_assert!(
            self.is_running(),
            "tick requested on stopped {} simulator",
            self.channel.key()
        );
        if !self.is_running() {
            warn!("ignoring tick on stopped {} simulator", self.channel.key());
            return None;
        }
        Some(lock_state(&self.state).tick())
    }

    pub fn channel(&self) -> VitalChannel {
        self.channel
    }

    pub fn profile(&self) -> &ChannelProfile {
        &self.profile
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Read-only view that stays valid after the simulator stops.
    pub fn reader(&self) -> ChannelReader {
        ChannelReader {
            channel: self.channel,
            state: Arc::clone(&self.state),
        }
    }
}

impl Drop for ChannelSimulator {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_ticks(state: Arc<Mutex<ChannelState>>, stop_rx: Receiver<()>, period: Duration) {
    loop {
        match stop_rx.recv_timeout(period) {
            Err(RecvTimeoutError::Timeout) => {
                let mut guard = lock_state(&state);
                let value = guard.tick();
                trace!("{} tick {} -> {value:.2}", guard.channel.key(), guard.ticks);
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

#[derive(Clone)]
pub struct ChannelReader {
    channel: VitalChannel,
    state: Arc<Mutex<ChannelState>>,
}

impl ChannelReader {
    pub fn channel(&self) -> VitalChannel {
        self.channel
    }

    pub fn read(&self) -> Vec<f64> {
        lock_state(&self.state).buffer.to_vec()
    }

    pub fn latest(&self) -> Option<f64> {
        lock_state(&self.state).buffer.latest()
    }
}
