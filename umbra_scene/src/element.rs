// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node behavior: the [`Element`] capability, subscribed closures, and pointer events.

use alloc::{boxed::Box, vec::Vec};
use kurbo::{Point, Vec2};

use crate::{Canvas, NodeId, Transform, Tree};

/// Whether an event should continue to the nodes behind the current one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Outcome {
    /// Keep delivering.
    #[default]
    Continue,
    /// Stop delivering to nodes further back.
    Stop,
}

impl Outcome {
    /// Combine two outcomes; `Stop` wins.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        if self == Self::Stop || other == Self::Stop {
            Self::Stop
        } else {
            Self::Continue
        }
    }
}

/// Physical mouse buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Secondary button.
    Right,
    /// Wheel button.
    Middle,
    /// Extra button 4.
    Button4,
    /// Extra button 5.
    Button5,
    /// Extra button 6.
    Button6,
    /// Extra button 7.
    Button7,
    /// Extra button 8.
    Button8,
}

/// Pointer event delivered to a node. Positions are in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// The pointer started hovering the node.
    Enter {
        /// Pointer position.
        position: Point,
    },
    /// The pointer stopped hovering the node.
    Leave {
        /// Pointer position.
        position: Point,
    },
    /// A button was pressed over the node.
    Down {
        /// The button.
        button: MouseButton,
        /// Pointer position.
        position: Point,
    },
    /// A button pressed on the node was released.
    Up {
        /// The button.
        button: MouseButton,
        /// Pointer position.
        position: Point,
    },
    /// The pointer moved while hovering or capturing the node.
    Move {
        /// Pointer position.
        position: Point,
    },
    /// The pointer moved while a button pressed on the node is held.
    Drag {
        /// The held button.
        button: MouseButton,
        /// Pointer position.
        position: Point,
    },
}

impl PointerEvent {
    /// Pointer position carried by the event.
    pub fn position(&self) -> Point {
        match *self {
            Self::Enter { position }
            | Self::Leave { position }
            | Self::Down { position, .. }
            | Self::Up { position, .. }
            | Self::Move { position }
            | Self::Drag { position, .. } => position,
        }
    }
}

/// Node-specific behavior.
///
/// All methods have empty defaults. Each receives the tree and the node's own id, so an
/// element can read and write transforms, attach children or remove itself.
pub trait Element: Send {
    /// The node became live for the first time.
    fn load(&mut self, tree: &mut Tree, id: NodeId) {
        let _ = (tree, id);
    }

    /// Once per update tick.
    fn update(&mut self, tree: &mut Tree, id: NodeId) {
        let _ = (tree, id);
    }

    /// The root was resized to `size`.
    fn resize(&mut self, tree: &mut Tree, id: NodeId, size: Vec2) {
        let _ = (tree, id, size);
    }

    /// `child` was attached under this node.
    fn child_added(&mut self, tree: &mut Tree, id: NodeId, child: NodeId) {
        let _ = (tree, id, child);
    }

    /// `child` was detached from this node.
    fn child_removed(&mut self, tree: &mut Tree, id: NodeId, child: NodeId) {
        let _ = (tree, id, child);
    }

    /// The size or local position of `child` changed.
    ///
    /// Not called for edits made by this node's own hooks while they run.
    fn child_transform_changed(&mut self, tree: &mut Tree, id: NodeId, child: NodeId) {
        let _ = (tree, id, child);
    }

    /// A pointer event reached this node.
    fn pointer(&mut self, tree: &mut Tree, id: NodeId, event: &PointerEvent) -> Outcome {
        let _ = (tree, id, event);
        Outcome::Continue
    }
}

/// Something that can paint a node's rectangle.
///
/// Called with the canvas already transformed into the node's local space, so `(0, 0)` is
/// the node's top-left corner and `size` its extent.
pub trait Drawable: Send + Sync {
    /// Paint into `canvas`.
    fn draw(&self, canvas: &mut dyn Canvas, size: Vec2);
}

impl<F> Drawable for F
where
    F: Fn(&mut dyn Canvas, Vec2) + Send + Sync,
{
    fn draw(&self, canvas: &mut dyn Canvas, size: Vec2) {
        self(canvas, size);
    }
}

/// Closure run on load and on update.
pub type NodeListener = Box<dyn FnMut(&mut Tree, NodeId) + Send>;
/// Closure run on resize.
pub type ResizeListener = Box<dyn FnMut(&mut Tree, NodeId, Vec2) + Send>;
/// Closure run when a child is attached or detached.
pub type ChildListener = Box<dyn FnMut(&mut Tree, NodeId, NodeId) + Send>;
/// Closure run for pointer events.
pub type PointerListener = Box<dyn FnMut(&mut Tree, NodeId, &PointerEvent) -> Outcome + Send>;
/// Closure run after a node's derived transform values changed.
pub type TransformListener = Box<dyn FnMut(NodeId, &Transform) + Send>;

/// The element of a node followed by its subscribed closures, per hook.
#[derive(Default)]
pub(crate) struct Hooks {
    pub(crate) element: Option<Box<dyn Element>>,
    pub(crate) load: Vec<NodeListener>,
    pub(crate) update: Vec<NodeListener>,
    pub(crate) resize: Vec<ResizeListener>,
    pub(crate) child_added: Vec<ChildListener>,
    pub(crate) child_removed: Vec<ChildListener>,
    pub(crate) pointer: Vec<PointerListener>,
    pub(crate) transform: Vec<TransformListener>,
}

impl core::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hooks")
            .field("element", &self.element.is_some())
            .field("load", &self.load.len())
            .field("update", &self.update.len())
            .field("resize", &self.resize.len())
            .field("child_added", &self.child_added.len())
            .field("child_removed", &self.child_removed.len())
            .field("pointer", &self.pointer.len())
            .field("transform", &self.transform.len())
            .finish()
    }
}

impl Hooks {
    /// Fold in hooks that were registered on the node while `self` was taken out.
    ///
    /// An element set in the meantime replaces the current one.
    pub(crate) fn absorb(&mut self, added: Self) {
        if added.element.is_some() {
            self.element = added.element;
        }
        self.load.extend(added.load);
        self.update.extend(added.update);
        self.resize.extend(added.resize);
        self.child_added.extend(added.child_added);
        self.child_removed.extend(added.child_removed);
        self.pointer.extend(added.pointer);
        self.transform.extend(added.transform);
    }

    pub(crate) fn run_load(&mut self, tree: &mut Tree, id: NodeId) {
        if let Some(e) = self.element.as_mut() {
            e.load(tree, id);
        }
        for f in &mut self.load {
            f(tree, id);
        }
    }

    pub(crate) fn run_update(&mut self, tree: &mut Tree, id: NodeId) {
        if let Some(e) = self.element.as_mut() {
            e.update(tree, id);
        }
        for f in &mut self.update {
            f(tree, id);
        }
    }

    pub(crate) fn run_resize(&mut self, tree: &mut Tree, id: NodeId, size: Vec2) {
        if let Some(e) = self.element.as_mut() {
            e.resize(tree, id, size);
        }
        for f in &mut self.resize {
            f(tree, id, size);
        }
    }

    pub(crate) fn run_child_added(&mut self, tree: &mut Tree, id: NodeId, child: NodeId) {
        if let Some(e) = self.element.as_mut() {
            e.child_added(tree, id, child);
        }
        for f in &mut self.child_added {
            f(tree, id, child);
        }
    }

    pub(crate) fn run_child_removed(&mut self, tree: &mut Tree, id: NodeId, child: NodeId) {
        if let Some(e) = self.element.as_mut() {
            e.child_removed(tree, id, child);
        }
        for f in &mut self.child_removed {
            f(tree, id, child);
        }
    }

    pub(crate) fn run_child_transform(&mut self, tree: &mut Tree, id: NodeId, child: NodeId) {
        if let Some(e) = self.element.as_mut() {
            e.child_transform_changed(tree, id, child);
        }
    }

    /// Every subscriber sees the event; the result is `Stop` if any of them asked for it.
    pub(crate) fn run_pointer(
        &mut self,
        tree: &mut Tree,
        id: NodeId,
        event: &PointerEvent,
    ) -> Outcome {
        let mut outcome = match self.element.as_mut() {
            Some(e) => e.pointer(tree, id, event),
            None => Outcome::Continue,
        };
        for f in &mut self.pointer {
            outcome = outcome.or(f(tree, id, event));
        }
        outcome
    }

    pub(crate) fn run_transform(&mut self, id: NodeId, transform: &Transform) {
        for f in &mut self.transform {
            f(id, transform);
        }
    }
}
