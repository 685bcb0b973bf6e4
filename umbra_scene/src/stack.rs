// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simple stacking layout.

use alloc::vec::Vec;
use kurbo::Vec2;

use crate::{Element, NodeId, Tree};

/// Main axis of a [`Stack`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StackDirection {
    /// Left to right along x.
    Row,
    /// Top to bottom along y.
    #[default]
    Column,
}

/// An [`Element`] that places its children one after another along an axis.
///
/// Children are laid out in z order, each starting where the previous one ended plus
/// `margin`. On the cross axis a child is moved to 0, or keeps its local position when
/// `reset_axis` is off.
///
/// The stack is redone whenever a child is attached or detached, and whenever a child's
/// size or local position changes.
///
/// ## Example
///
/// ```rust
/// use kurbo::Vec2;
/// use umbra_scene::{LocalNode, Stack, Transform, Tree};
///
/// let mut tree = Tree::new();
/// let list = tree.insert(None, LocalNode::new(Transform::new()).with_element(Stack::column()));
/// let item = |h| LocalNode::new(Transform::new().with_size(Vec2::new(50.0, h)));
/// let a = tree.insert_child(list, item(10.0));
/// let b = tree.insert_child(list, item(20.0));
/// assert_eq!(tree.transform(b).unwrap().local_position(), Vec2::new(0.0, 10.0));
///
/// tree.set_size(a, Vec2::new(50.0, 30.0));
/// assert_eq!(tree.transform(b).unwrap().local_position(), Vec2::new(0.0, 30.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stack {
    direction: StackDirection,
    margin: f64,
    reset_axis: bool,
}

impl Default for Stack {
    fn default() -> Self {
        Self::new(StackDirection::default())
    }
}

impl Stack {
    /// A stack along `direction` with no margin that resets the cross axis.
    pub fn new(direction: StackDirection) -> Self {
        Self {
            direction,
            margin: 0.0,
            reset_axis: true,
        }
    }

    /// A left-to-right stack.
    pub fn row() -> Self {
        Self::new(StackDirection::Row)
    }

    /// A top-to-bottom stack.
    pub fn column() -> Self {
        Self::new(StackDirection::Column)
    }

    /// Set the gap between consecutive children.
    #[must_use]
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Set whether children are moved to 0 on the cross axis.
    #[must_use]
    pub fn with_reset_axis(mut self, reset: bool) -> Self {
        self.reset_axis = reset;
        self
    }

    /// Main axis.
    pub fn direction(&self) -> StackDirection {
        self.direction
    }

    /// Gap between consecutive children.
    pub fn margin(&self) -> f64 {
        self.margin
    }

    /// Whether children are moved to 0 on the cross axis.
    pub fn reset_axis(&self) -> bool {
        self.reset_axis
    }

    /// Make this the element of `id` and lay out its current children.
    ///
    /// Use this to change the direction or margin of a node that is already stacking.
    pub fn apply(self, tree: &mut Tree, id: NodeId) {
        if !tree.is_alive(id) {
            return;
        }
        tree.set_element(id, self);
        self.restack(tree, id);
    }

    /// Position the children of `id`.
    pub fn restack(&self, tree: &mut Tree, id: NodeId) {
        let children: Vec<NodeId> = tree.children_of(id).to_vec();
        let mut along = 0.0;
        for child in children {
            let Some(tf) = tree.transform(child) else {
                continue;
            };
            let cross = if self.reset_axis {
                Vec2::ZERO
            } else {
                tf.local_position()
            };
            let (position, extent) = match self.direction {
                StackDirection::Row => (Vec2::new(along, cross.y), tf.size().x),
                StackDirection::Column => (Vec2::new(cross.x, along), tf.size().y),
            };
            tree.set_local_position(child, position);
            along += extent + self.margin;
        }
    }
}

impl Element for Stack {
    fn load(&mut self, tree: &mut Tree, id: NodeId) {
        self.restack(tree, id);
    }

    fn child_added(&mut self, tree: &mut Tree, id: NodeId, _child: NodeId) {
        self.restack(tree, id);
    }

    fn child_removed(&mut self, tree: &mut Tree, id: NodeId, _child: NodeId) {
        self.restack(tree, id);
    }

    fn child_transform_changed(&mut self, tree: &mut Tree, id: NodeId, _child: NodeId) {
        self.restack(tree, id);
    }
}
