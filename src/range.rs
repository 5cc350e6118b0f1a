// src/range.rs

//! Evenly spaced sample points between two inclusive endpoints.

use crate::error::VectorError;

/// `count` points from `start` to `stop`, both included.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRange {
    start: f32,
    stop: f32,
    count: usize,
}

impl SampleRange {
    pub fn new(start: f32, stop: f32, count: usize) -> Result<Self, VectorError> {
        if count == 0 {
            return Err(VectorError::EmptyRange);
        }
        Ok(Self { start, stop, count })
    }

    pub fn start(&self) -> f32 {
        self.start
    }

    pub fn stop(&self) -> f32 {
        self.stop
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Distance between neighbouring samples. Zero for a single-point range.
    pub fn step(&self) -> f64 {
        if self.count == 1 {
            0.0
        } else {
            (self.stop as f64 - self.start as f64) / (self.count - 1) as f64
        }
    }

    /// Samples in ascending index order.
    ///
    /// Interpolation runs in f64 and each point is narrowed to f32 once. The
    /// last point is exactly `stop` rather than an accumulated approximation.
    pub fn samples(&self) -> impl ExactSizeIterator<Item = f32> + '_ {
        let step = self.step();
        let last = self.count - 1;
        (0..self.count).map(move |i| {
            if i == last && i != 0 {
                self.stop
            } else {
                (self.start as f64 + i as f64 * step) as f32
            }
        })
    }
}
