// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene tree: node identifiers, flags, and insertion data.

use alloc::{boxed::Box, sync::Arc};

use crate::{Drawable, Element, Transform};

/// Identifier for a node in the tree (generational).
///
/// A removed node's slot may be reused, but the new occupant gets a newer generation, so
/// stale identifiers are detected rather than aliased.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Node flags controlling rendering and input.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node and its subtree are rendered and hit tested.
        const VISIBLE           = 0b0000_0001;
        /// Node itself receives pointer events. Children are tested either way.
        const INTERACTIVE       = 0b0000_0010;
        /// Node is opaque to input: a hit on it hides lower-z siblings and their subtrees.
        const MASK_MOUSE_EVENTS = 0b0000_0100;
        /// Skip the drawable when the node's rectangle is outside the canvas clip.
        const CULL              = 0b0000_1000;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::INTERACTIVE | Self::CULL
    }
}

/// Everything needed to create a node.
#[derive(Default)]
pub struct LocalNode {
    /// Relative layout.
    pub transform: Transform,
    /// Sibling order key. Higher is drawn on top and hit first.
    pub z_index: i32,
    /// Rendering and input flags.
    pub flags: NodeFlags,
    /// Optional painter.
    pub drawable: Option<Arc<dyn Drawable>>,
    /// Optional behavior.
    pub element: Option<Box<dyn Element>>,
}

impl LocalNode {
    /// A node with `transform` and default everything else.
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            ..Self::default()
        }
    }

    /// Set the z-index.
    #[must_use]
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Set the flags.
    #[must_use]
    pub fn with_flags(mut self, flags: NodeFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the drawable.
    #[must_use]
    pub fn with_drawable(mut self, drawable: impl Drawable + 'static) -> Self {
        self.drawable = Some(Arc::new(drawable));
        self
    }

    /// Set the element.
    #[must_use]
    pub fn with_element(mut self, element: impl Element + 'static) -> Self {
        self.element = Some(Box::new(element));
        self
    }
}

impl core::fmt::Debug for LocalNode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LocalNode")
            .field("transform", &self.transform)
            .field("z_index", &self.z_index)
            .field("flags", &self.flags)
            .field("drawable", &self.drawable.is_some())
            .field("element", &self.element.is_some())
            .finish()
    }
}
