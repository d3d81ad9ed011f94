//! Sliding-window mean for noisy sensor channels
//!
//! Each channel gets its own buffer. Until the window fills, the mean is
//! taken over however many samples have arrived, so the first few outputs
//! after startup follow the raw readings more closely.

use std::collections::VecDeque;

use crate::error::{Error, Result};

/// Fixed-capacity FIFO of recent samples with a running mean
#[derive(Debug, Clone)]
pub struct SmoothingBuffer {
    capacity: usize,
    samples: VecDeque<f64>,
}

impl SmoothingBuffer {
    /// Create a buffer holding at most `capacity` samples
    ///
    /// # Errors
    /// `InvalidConfig` if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity < 1 {
            return Err(Error::InvalidConfig(
                "smoothing window must hold at least one sample".to_string(),
            ));
        }

        Ok(Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        })
    }

    /// Append a sample, evicting the oldest one when full, and return the
    /// mean of the samples now held
    pub fn add(&mut self, sample: f64) -> f64 {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);

        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    /// Mean of the samples held, or `None` before the first sample
    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            None
        } else {
            Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
