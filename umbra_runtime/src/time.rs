// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-loop clocks.

/// Raw and scaled time for one loop.
///
/// ```
/// use umbra_runtime::TimeContext;
///
/// let mut time = TimeContext::new();
/// time.time_scale = 0.5;
/// time.advance(0.2);
/// assert_eq!(time.raw_delta(), 0.2);
/// assert_eq!(time.delta(), 0.1);
/// assert_eq!(time.time(), 0.1);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeContext {
    /// Multiplier applied to raw deltas.
    pub time_scale: f64,
    raw_delta: f64,
    raw_time: f64,
    delta: f64,
    time: f64,
}

impl Default for TimeContext {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            raw_delta: 0.0,
            raw_time: 0.0,
            delta: 0.0,
            time: 0.0,
        }
    }
}

impl TimeContext {
    /// Zeroed, unscaled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tick of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        let dt = dt.max(0.0);
        self.raw_delta = dt;
        self.raw_time += dt;
        self.delta = dt * self.time_scale;
        self.time += self.delta;
    }

    /// Last unscaled delta.
    pub fn raw_delta(&self) -> f64 {
        self.raw_delta
    }

    /// Unscaled time since start.
    pub fn raw_time(&self) -> f64 {
        self.raw_time
    }

    /// Last scaled delta.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Scaled time since start.
    pub fn time(&self) -> f64 {
        self.time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates() {
        let mut time = TimeContext::new();
        time.advance(0.25);
        time.time_scale = 2.0;
        time.advance(0.25);
        assert_eq!(time.raw_time(), 0.5);
        assert_eq!(time.time(), 0.75);
        assert_eq!(time.delta(), 0.5);
    }

    #[test]
    fn negative_deltas_are_ignored() {
        let mut time = TimeContext::new();
        time.advance(-1.0);
        assert_eq!(time.raw_delta(), 0.0);
        assert_eq!(time.time(), 0.0);
    }
}
