use std::collections::VecDeque;

/// Fixed-length history of one channel, oldest first.
#[derive(Clone, Debug)]
pub struct RollingBuffer {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl RollingBuffer {
    /// Pre-fills every slot so readers never see a short trace.
    pub fn filled(capacity: usize, value: f64) -> Self {
        let mut samples = VecDeque::with_capacity(capacity);
        samples.extend(std::iter::repeat(value).take(capacity));
        Self { samples, capacity }
    }

    /// Appends a sample, evicting the oldest once full.
    pub fn push(&mut self, value: f64) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    pub fn latest(&self) -> Option<f64> {
        self.samples.back().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }
}
