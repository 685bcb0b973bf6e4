// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Umbra Runtime: drives an Umbra scene tree with an update loop and a render loop.
//!
//! ## Overview
//!
//! An [`Application`] owns the scene tree, its animations, and its input state. Each update
//! tick applies queued platform input, advances animations, runs the tree's update
//! traversal and re-evaluates hover, in that order. Rendering works from a
//! [`DisplayList`](umbra_scene::DisplayList) recorded at the end of the tick, so the render
//! side never reads the tree while it is being written.
//!
//! [`DualLoop`] schedules the two ticks, either on dedicated threads or inline from a
//! platform frame callback, and moves the single graphics context binding between threads
//! when the mode changes.
//!
//! The windowing and graphics layers plug in through [`PlatformHandler`] and
//! [`GraphicsBackend`]. [`HeadlessHandler`] and [`HeadlessBackend`] stand in for them in
//! tests and tools.
//!
//! ## Logging
//!
//! Mode switches, context handoff and surface rebuilds are reported through `tracing`.
//! Install a subscriber to see them.

mod app;
mod backend;
mod config;
mod error;
mod platform;
mod runner;
mod time;

pub use app::Application;
pub use backend::{ContextError, GraphicsBackend, HeadlessBackend};
pub use config::{LoopConfig, MIN_FREQUENCY, Threading};
pub use error::LoopError;
pub use platform::{HeadlessHandler, PlatformEvent, PlatformEvents, PlatformHandler};
pub use runner::DualLoop;
pub use time::TimeContext;
