//! Elevation profile of a whole route

use serde::Serialize;

use super::route::Route;
use crate::core::{math, Error, Result};

/// Upper bound on the samples of one profile.
pub const MAX_PROFILE_SAMPLES: usize = 1 << 20;

/// Elevation sampled at regular intervals along a route, without gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationProfile {
    length: f64,
    samples: Vec<f32>,
}

/// Aggregate figures of an [`ElevationProfile`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ElevationStats {
    pub min_elevation: f64,
    pub max_elevation: f64,
    pub total_ascent: f64,
    pub total_descent: f64,
}

impl ElevationProfile {
    pub fn new(length: f64, samples: Vec<f32>) -> Result<Self> {
        if length.is_nan() || length < 0.0 || samples.len() < 2 {
            return Err(Error::invalid(format!(
                "profile needs a length >= 0 and two samples (length {length}, {} samples)",
                samples.len()
            )));
        }
        Ok(Self { length, samples })
    }

    /// Sample `route` at most every `max_step_length` metres.
    ///
    /// Stretches without elevation data take the nearest known value at the
    /// ends and are interpolated in between; a route with no data at all gets
    /// a flat profile at zero.
    pub fn of_route(route: &Route, max_step_length: f64) -> Result<Self> {
        if max_step_length.is_nan() || max_step_length <= 0.0 {
            return Err(Error::invalid(format!(
                "profile step must be positive, got {max_step_length}"
            )));
        }
        let length = route.length();
        let steps = (length / max_step_length).ceil();
        if steps >= MAX_PROFILE_SAMPLES as f64 {
            return Err(Error::invalid(format!(
                "profile of {length} m every {max_step_length} m needs more than \
                 {MAX_PROFILE_SAMPLES} samples"
            )));
        }
        let count = (steps as usize + 1).max(2);
        let step = length / (count - 1) as f64;

        let mut samples: Vec<f32> = (0..count)
            .map(|i| route.elevation_at(i as f64 * step) as f32)
            .collect();
        fill_gaps(&mut samples);
        Self::new(length, samples)
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn min_elevation(&self) -> f64 {
        f64::from(self.samples.iter().copied().fold(f32::INFINITY, f32::min))
    }

    pub fn max_elevation(&self) -> f64 {
        f64::from(self.samples.iter().copied().fold(f32::NEG_INFINITY, f32::max))
    }

    /// Sum of the rises between consecutive samples.
    pub fn total_ascent(&self) -> f64 {
        self.samples
            .windows(2)
            .map(|w| f64::from(w[1]) - f64::from(w[0]))
            .filter(|&d| d > 0.0)
            .sum()
    }

    /// Sum of the drops between consecutive samples, as a positive number.
    pub fn total_descent(&self) -> f64 {
        self.samples
            .windows(2)
            .map(|w| f64::from(w[0]) - f64::from(w[1]))
            .filter(|&d| d > 0.0)
            .sum()
    }

    /// Elevation at `position`, clamped to the profile.
    pub fn elevation_at(&self, position: f64) -> f64 {
        math::sampled_at(&self.samples, self.length, position)
    }

    pub fn stats(&self) -> ElevationStats {
        ElevationStats {
            min_elevation: self.min_elevation(),
            max_elevation: self.max_elevation(),
            total_ascent: self.total_ascent(),
            total_descent: self.total_descent(),
        }
    }
}

fn fill_gaps(samples: &mut [f32]) {
    let Some(first) = samples.iter().position(|s| !s.is_nan()) else {
        samples.fill(0.0);
        return;
    };
    // position() found a value, so rposition() does too
    let last = samples.iter().rposition(|s| !s.is_nan()).unwrap_or(first);

    let head = samples[first];
    samples[..first].fill(head);
    let tail = samples[last];
    samples[last + 1..].fill(tail);

    let mut i = first;
    while i < last {
        if !samples[i + 1].is_nan() {
            i += 1;
            continue;
        }
        let gap_end = (i + 1..=last)
            .find(|&j| !samples[j].is_nan())
            .unwrap_or(last);
        let (y0, y1) = (f64::from(samples[i]), f64::from(samples[gap_end]));
        let span = (gap_end - i) as f64;
        for (k, sample) in samples[i + 1..gap_end].iter_mut().enumerate() {
            *sample = math::interpolate(y0, y1, (k + 1) as f64 / span) as f32;
        }
        i = gap_end;
    }
}
