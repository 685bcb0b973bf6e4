// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A single time-driven animation.

use alloc::{boxed::Box, vec::Vec};

/// Which way progress moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Direction {
    /// Progress increases toward the duration.
    #[default]
    Forward,
    /// Progress decreases toward zero.
    Backward,
}

impl Direction {
    /// The other direction.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

/// What happens when progress reaches an end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LoopMode {
    /// Clamp, stop playing and complete.
    #[default]
    None,
    /// Restart from zero, going forward.
    Forward,
    /// Restart from the duration, going backward.
    Backward,
    /// Reverse direction.
    PingPong,
    /// Reverse direction, and mirror the easing curve on the backward leg.
    Mirror,
}

type Easing = Box<dyn Fn(f64) -> f64 + Send + Sync>;
type UpdateFn<C> = Box<dyn FnMut(&mut C, f64) + Send>;
type LoopFn<C> = Box<dyn FnMut(&mut C, Direction) + Send>;
type CompleteFn<C> = Box<dyn FnMut(&mut C) + Send>;
type StopFn = Box<dyn FnMut() + Send>;

/// A value animation advanced by [`Animation::update`].
///
/// Progress runs between `0` and `duration` (seconds, or whatever unit the caller's `dt`
/// uses). Each advancing tick computes `t = progress / duration`, passes it through the
/// easing hook (identity when unset) and hands the result to the update callbacks, which
/// receive a mutable context `C`.
///
/// ```
/// use umbra_animation::{Animation, LoopMode};
///
/// let mut anim: Animation<Vec<f64>> = Animation::new(1.0)
///     .with_loop_mode(LoopMode::PingPong)
///     .on_update(|values: &mut Vec<f64>, v| values.push(v));
///
/// let mut values = Vec::new();
/// for _ in 0..4 {
///     anim.update(&mut values, 0.5);
/// }
/// assert_eq!(values, [0.5, 1.0, 0.5, 0.0]);
/// ```
pub struct Animation<C = ()> {
    /// Length of one leg.
    pub duration: f64,
    /// Time to wait before progress starts moving.
    pub delay: f64,
    /// Current position within `0..=duration`.
    pub progress: f64,
    /// Which way progress moves.
    pub direction: Direction,
    /// Behavior at the ends.
    pub loop_mode: LoopMode,
    /// Stopped animations ignore `update`.
    pub playing: bool,
    easing: Option<Easing>,
    update_fns: Vec<UpdateFn<C>>,
    loop_fns: Vec<LoopFn<C>>,
    complete_fns: Vec<CompleteFn<C>>,
    stop_fns: Vec<StopFn>,
}

impl<C> core::fmt::Debug for Animation<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Animation")
            .field("duration", &self.duration)
            .field("delay", &self.delay)
            .field("progress", &self.progress)
            .field("direction", &self.direction)
            .field("loop_mode", &self.loop_mode)
            .field("playing", &self.playing)
            .field("easing", &self.easing.is_some())
            .finish_non_exhaustive()
    }
}

impl<C> Default for Animation<C> {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl<C> Animation<C> {
    /// A playing, forward, non-looping animation of `duration`.
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            delay: 0.0,
            progress: 0.0,
            direction: Direction::Forward,
            loop_mode: LoopMode::None,
            playing: true,
            easing: None,
            update_fns: Vec::new(),
            loop_fns: Vec::new(),
            complete_fns: Vec::new(),
            stop_fns: Vec::new(),
        }
    }

    /// Wait `delay` before starting.
    #[must_use]
    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    /// Set the loop mode.
    #[must_use]
    pub fn with_loop_mode(mut self, loop_mode: LoopMode) -> Self {
        self.loop_mode = loop_mode;
        self
    }

    /// Start in `direction`. Backward animations usually also want `progress == duration`.
    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Map normalized progress through `easing`.
    #[must_use]
    pub fn with_easing(mut self, easing: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        self.easing = Some(Box::new(easing));
        self
    }

    /// Subscribe to eased values.
    #[must_use]
    pub fn on_update(mut self, f: impl FnMut(&mut C, f64) + Send + 'static) -> Self {
        self.update_fns.push(Box::new(f));
        self
    }

    /// Subscribe to loop boundaries; receives the direction of the leg that just ended.
    #[must_use]
    pub fn on_loop(mut self, f: impl FnMut(&mut C, Direction) + Send + 'static) -> Self {
        self.loop_fns.push(Box::new(f));
        self
    }

    /// Subscribe to completion of a non-looping animation.
    #[must_use]
    pub fn on_complete(mut self, f: impl FnMut(&mut C) + Send + 'static) -> Self {
        self.complete_fns.push(Box::new(f));
        self
    }

    /// Subscribe to [`Animation::stop`], which also runs when the animation is replaced.
    #[must_use]
    pub fn on_stop(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.stop_fns.push(Box::new(f));
        self
    }

    /// Stop playing and run the stop hooks.
    pub fn stop(&mut self) {
        self.playing = false;
        for f in &mut self.stop_fns {
            f();
        }
    }

    /// Whether a non-looping animation has run to its end.
    pub fn is_finished(&self) -> bool {
        !self.playing
    }

    /// Advance by `dt`.
    pub fn update(&mut self, cx: &mut C, dt: f64) {
        if !self.playing {
            return;
        }
        if self.delay > 0.0 {
            self.delay -= dt;
            return;
        }
        if self.delay < 0.0 {
            self.delay = 0.0;
        }

        self.progress += match self.direction {
            Direction::Forward => dt,
            Direction::Backward => -dt,
        };
        let crossed = match self.direction {
            Direction::Forward => self.progress >= self.duration,
            Direction::Backward => self.progress <= 0.0,
        };
        if crossed {
            self.on_boundary(cx);
        }

        let t = if self.duration > 0.0 {
            (self.progress / self.duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let value = if self.loop_mode == LoopMode::Mirror && self.direction == Direction::Backward
        {
            1.0 - self.ease(1.0 - t)
        } else {
            self.ease(t)
        };
        for f in &mut self.update_fns {
            f(cx, value);
        }
    }

    fn ease(&self, t: f64) -> f64 {
        self.easing.as_ref().map_or(t, |e| e(t))
    }

    fn on_boundary(&mut self, cx: &mut C) {
        if self.loop_mode == LoopMode::None {
            self.playing = false;
            self.progress = match self.direction {
                Direction::Forward => self.duration,
                Direction::Backward => 0.0,
            };
            for f in &mut self.complete_fns {
                f(cx);
            }
            return;
        }

        let finished = self.direction;
        self.direction = match self.loop_mode {
            LoopMode::Forward => Direction::Forward,
            LoopMode::Backward => Direction::Backward,
            _ => self.direction.flipped(),
        };
        self.progress = match self.direction {
            Direction::Forward => 0.0,
            Direction::Backward => self.duration,
        };
        for f in &mut self.loop_fns {
            f(cx, finished);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::{sync::Arc, vec};
    use core::sync::atomic::{AtomicUsize, Ordering};

    fn recorder() -> Animation<Vec<f64>> {
        Animation::new(1.0).on_update(|out: &mut Vec<f64>, v| out.push(v))
    }

    #[test]
    fn completes_in_one_step() {
        let mut completed = 0_u32;
        let mut anim: Animation<u32> =
            Animation::new(0.5).on_complete(|count: &mut u32| *count += 1);
        anim.update(&mut completed, 0.5);
        assert!(!anim.playing);
        assert_eq!(anim.progress, anim.duration);
        assert_eq!(completed, 1);

        // Finished animations ignore further updates.
        anim.update(&mut completed, 0.5);
        assert_eq!(completed, 1);
    }

    #[test]
    fn overshoot_clamps() {
        let mut out = Vec::new();
        let mut anim = recorder();
        anim.update(&mut out, 3.0);
        assert_eq!(out, vec![1.0]);
        assert_eq!(anim.progress, 1.0);
    }

    #[test]
    fn delay_consumes_ticks() {
        let mut out = Vec::new();
        let mut anim = recorder().with_delay(0.3);
        anim.update(&mut out, 0.25);
        anim.update(&mut out, 0.25);
        assert!(out.is_empty());
        anim.update(&mut out, 0.25);
        assert_eq!(anim.delay, 0.0);
        assert_eq!(out, vec![0.25]);
    }

    #[test]
    fn forward_loop_restarts() {
        let loops = Arc::new(AtomicUsize::new(0));
        let counter = loops.clone();
        let mut out = Vec::new();
        let mut anim = recorder()
            .with_loop_mode(LoopMode::Forward)
            .on_loop(move |_, dir| {
                assert_eq!(dir, Direction::Forward);
                counter.fetch_add(1, Ordering::Relaxed);
            });
        for _ in 0..3 {
            anim.update(&mut out, 0.5);
        }
        assert_eq!(out, vec![0.5, 0.0, 0.5]);
        assert_eq!(loops.load(Ordering::Relaxed), 1);
        assert!(anim.playing);
    }

    #[test]
    fn backward_loop_restarts_from_end() {
        let mut out = Vec::new();
        let mut anim = recorder().with_loop_mode(LoopMode::Backward);
        for _ in 0..4 {
            anim.update(&mut out, 0.5);
        }
        assert_eq!(out, vec![0.5, 1.0, 0.5, 1.0]);
        assert_eq!(anim.direction, Direction::Backward);
    }

    #[test]
    fn mirror_inverts_easing_on_the_way_back() {
        let square = |t: f64| t * t;
        let mut plain = Vec::new();
        let mut ping = recorder()
            .with_loop_mode(LoopMode::PingPong)
            .with_easing(square);
        let mut mirrored = Vec::new();
        let mut mirror = recorder()
            .with_loop_mode(LoopMode::Mirror)
            .with_easing(square);
        for _ in 0..3 {
            ping.update(&mut plain, 0.5);
            mirror.update(&mut mirrored, 0.5);
        }
        // Forward legs agree.
        assert_eq!(plain[0], 0.25);
        assert_eq!(mirrored[0], 0.25);
        // Backward at t = 0.5: ping-pong retraces the curve, mirror flips it.
        assert_eq!(plain[2], 0.25);
        assert_eq!(mirrored[2], 0.75);
    }

    #[test]
    fn zero_duration_finishes_at_one() {
        let mut out = Vec::new();
        let mut anim = Animation::new(0.0).on_update(|out: &mut Vec<f64>, v| out.push(v));
        anim.update(&mut out, 0.016);
        assert_eq!(out, vec![1.0]);
        assert!(anim.is_finished());
    }

    #[test]
    fn stop_runs_hooks() {
        let stopped = Arc::new(AtomicUsize::new(0));
        let counter = stopped.clone();
        let mut anim: Animation = Animation::new(1.0).on_stop(move || {
            counter.fetch_add(1, Ordering::Relaxed);
        });
        anim.stop();
        assert!(!anim.playing);
        assert_eq!(stopped.load(Ordering::Relaxed), 1);
        anim.update(&mut (), 1.0);
        assert_eq!(anim.progress, 0.0);
    }
}
