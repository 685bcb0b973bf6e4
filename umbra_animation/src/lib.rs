// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Umbra Animation: keyed, time-driven value animations.
//!
//! An [`Animation`] moves a progress value between `0` and its duration as the caller feeds
//! it time deltas, reacting at the ends according to its [`LoopMode`]. Each tick it maps
//! the normalized progress through an optional easing function and hands the result to its
//! update callbacks together with a caller-chosen context `C`, so callbacks can write
//! straight into the state being animated.
//!
//! [`AnimationScheduler`] keeps animations under string keys and advances all of them once
//! per update tick. Registering under a taken key stops the previous animation.
//!
//! Easing curves are plain `Fn(f64) -> f64` closures; this crate ships none.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod animation;
mod scheduler;

pub use animation::{Animation, Direction, LoopMode};
pub use scheduler::AnimationScheduler;
