// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Umbra Input: pointer and keyboard input for Umbra scene trees.
//!
//! ## Overview
//!
//! [`InputDispatcher`] turns raw pointer positions and button transitions into
//! [`PointerEvent`](umbra_scene::PointerEvent)s delivered to node hooks. It hit tests the
//! tree front to back, tracks which nodes are hovered, and keeps a per-button press stack so
//! pressed nodes stay captured (receiving moves and drags) until release.
//!
//! [`InputState`] is the keyboard side: held keys and buttons plus the transitions seen
//! during the current update tick.
//!
//! [`Draggable`] is a small ready-made element built on the capture semantics.
//!
//! ## Masking
//!
//! A node flagged [`NodeFlags::MASK_MOUSE_EVENTS`](umbra_scene::NodeFlags::MASK_MOUSE_EVENTS)
//! is opaque: lower-z siblings behind it never see the pointer. Independently, a pointer
//! hook returning [`Outcome::Stop`](umbra_scene::Outcome::Stop) on `Down` ends that press
//! walk.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod dispatcher;
mod draggable;
mod state;

pub use dispatcher::{Hovered, InputDispatcher};
pub use draggable::Draggable;
pub use state::{InputState, Key};
