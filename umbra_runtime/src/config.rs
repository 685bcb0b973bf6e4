// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loop rates and threading mode.

/// Lowest accepted tick rate, in hertz.
pub const MIN_FREQUENCY: f64 = 1.0;

/// Where the update and render ticks run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Threading {
    /// Both ticks run inline from [`DualLoop::frame`](crate::DualLoop::frame).
    Single,
    /// Dedicated update and render threads.
    #[default]
    Multi,
}

/// Target rates and threading mode for a [`DualLoop`](crate::DualLoop).
///
/// Rates are clamped to at least [`MIN_FREQUENCY`]; non-finite values fall back to it.
///
/// ```
/// use umbra_runtime::{LoopConfig, Threading};
///
/// let config = LoopConfig::new()
///     .with_update_frequency(60.0)
///     .with_render_frequency(0.0)
///     .with_threading(Threading::Single);
/// assert_eq!(config.update_frequency(), 60.0);
/// assert_eq!(config.render_frequency(), 1.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoopConfig {
    update_frequency: f64,
    render_frequency: f64,
    threading: Threading,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            update_frequency: 144.0,
            render_frequency: 144.0,
            threading: Threading::Multi,
        }
    }
}

impl LoopConfig {
    /// 144 Hz for both loops, multi-threaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the update rate.
    #[must_use]
    pub fn with_update_frequency(mut self, hz: f64) -> Self {
        self.update_frequency = clamp_frequency(hz);
        self
    }

    /// Set the render rate.
    #[must_use]
    pub fn with_render_frequency(mut self, hz: f64) -> Self {
        self.render_frequency = clamp_frequency(hz);
        self
    }

    /// Set the threading mode.
    #[must_use]
    pub fn with_threading(mut self, threading: Threading) -> Self {
        self.threading = threading;
        self
    }

    /// Update rate in hertz.
    pub fn update_frequency(&self) -> f64 {
        self.update_frequency
    }

    /// Render rate in hertz.
    pub fn render_frequency(&self) -> f64 {
        self.render_frequency
    }

    /// Threading mode.
    pub fn threading(&self) -> Threading {
        self.threading
    }
}

pub(crate) fn clamp_frequency(hz: f64) -> f64 {
    if hz.is_finite() {
        hz.max(MIN_FREQUENCY)
    } else {
        MIN_FREQUENCY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_are_clamped() {
        assert_eq!(clamp_frequency(-5.0), MIN_FREQUENCY);
        assert_eq!(clamp_frequency(f64::NAN), MIN_FREQUENCY);
        assert_eq!(clamp_frequency(f64::INFINITY), MIN_FREQUENCY);
        assert_eq!(clamp_frequency(30.0), 30.0);
    }

    #[test]
    fn defaults() {
        let config = LoopConfig::default();
        assert_eq!(config.update_frequency(), 144.0);
        assert_eq!(config.render_frequency(), 144.0);
        assert_eq!(config.threading(), Threading::Multi);
    }
}
