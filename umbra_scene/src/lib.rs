// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Umbra Scene: a retained-mode 2D scene tree with relative layout.
//!
//! Nodes form a parent-child tree stored in an arena. Every node embeds a [`Transform`]
//! that places it relative to its parent using an anchor (a fraction of the parent's size),
//! an offset (a fraction of its own size), a local position, a rotation about a configurable
//! center, and optional per-axis inheritance of the parent's size.
//!
//! - Derived values (pivot, world position, world rotation, world matrix) are recomputed
//!   eagerly for the whole subtree whenever a setter runs.
//! - Children are ordered by z-index. Higher z draws later and is hit first.
//! - Parent assignment is checked for cycles; a rejected assignment changes nothing.
//! - A node loads exactly once, the first time it becomes reachable from a bound root.
//!
//! ## Hooks
//!
//! Per-node behavior is an [`Element`] trait object followed by ordered lists of
//! subscribed closures (`on_load`, `on_update`, `on_resize`, `on_pointer`, ...). Hooks get
//! `&mut Tree` and may freely edit the tree, including removing their own node.
//!
//! ## Rendering
//!
//! Painting goes through the [`Canvas`] trait. [`DisplayList::record`] captures a frame
//! (save, rotate about the rotation center, translate to the pivot, draw, recurse into
//! children, restore) so it can be replayed later, possibly on another thread.
//! [`RecordingCanvas`] is an in-memory canvas useful for tests and headless runs.
//!
//! ## API overview
//!
//! - [`Tree`]: the arena, structure edits, transform setters, traversals and hit testing.
//! - [`LocalNode`]: insertion data (transform, z-index, flags, drawable, element).
//! - [`NodeFlags`]: visibility, interactivity, input masking and culling.
//! - [`NodeId`]: generational handle of a node.
//! - [`Stack`]: an element that lines its children up in a row or column.
//! - [`QueryFilter`] and [`Hit`]: hit-test filtering and results.
//! - [`SceneError`]: structural errors.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod canvas;
mod display;
mod element;
mod error;
mod stack;
mod transform;
mod tree;
mod types;
mod util;

pub use canvas::{Canvas, Color, DrawOp, RecordingCanvas};
pub use display::{DisplayItem, DisplayList};
pub use element::{
    ChildListener, Drawable, Element, MouseButton, NodeListener, Outcome, PointerEvent,
    PointerListener, ResizeListener, TransformListener,
};
pub use error::SceneError;
pub use stack::{Stack, StackDirection};
pub use transform::Transform;
pub use tree::{Hit, QueryFilter, Tree};
pub use types::{LocalNode, NodeFlags, NodeId};
