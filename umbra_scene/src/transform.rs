// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Relative layout state embedded in every node.

use kurbo::{Affine, Point, Rect, Vec2};

use crate::util::mul;

/// Per-node 2D layout expressed relative to the parent.
///
/// The local fields (position, anchor, offset, size offset, parent scale, rotation and
/// rotation offset) are the source of truth. Pivot, world position, world rotation and the
/// world matrix are derived from them and from the parent's derived values:
///
/// ```text
/// pivot = parent_size * anchor - size * offset + local_position
/// world = parent_world + pivot
/// world_rotation = parent_rotation + local_rotation
/// ```
///
/// A node without a parent treats the parent size, position and rotation as zero.
///
/// Values are edited through the [`Tree`](crate::Tree) setters, which recompute the whole
/// subtree before returning. The `with_*` builders are for describing a node before it is
/// inserted.
///
/// ```rust
/// use kurbo::Vec2;
/// use umbra_scene::{LocalNode, Transform, Tree};
///
/// let mut tree = Tree::new();
/// let root = tree.insert(
///     None,
///     LocalNode::new(Transform::new().with_size(Vec2::new(300.0, 300.0))),
/// );
/// let centered = tree.insert_child(
///     root,
///     LocalNode::new(
///         Transform::new()
///             .with_size(Vec2::new(100.0, 100.0))
///             .with_anchor_position(Vec2::new(0.5, 0.5))
///             .with_offset_position(Vec2::new(0.5, 0.5)),
///     ),
/// );
/// let tf = tree.transform(centered).unwrap();
/// assert_eq!(tf.world_position(), Vec2::new(100.0, 100.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    local_position: Vec2,
    anchor_position: Vec2,
    offset_position: Vec2,
    size: Vec2,
    local_size_offset: Vec2,
    parent_scale: Vec2,
    /// Degrees.
    local_rotation: f64,
    rotation_offset: Vec2,

    pivot_position: Vec2,
    world_position: Vec2,
    world_rotation: f64,
    world_transform: Affine,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            local_position: Vec2::ZERO,
            anchor_position: Vec2::ZERO,
            offset_position: Vec2::ZERO,
            size: Vec2::ZERO,
            local_size_offset: Vec2::ZERO,
            parent_scale: Vec2::ZERO,
            local_rotation: 0.0,
            rotation_offset: Vec2::ZERO,
            pivot_position: Vec2::ZERO,
            world_position: Vec2::ZERO,
            world_rotation: 0.0,
            world_transform: Affine::IDENTITY,
        }
    }
}

impl Transform {
    /// A transform at the parent's origin with zero size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the local position.
    #[must_use]
    pub fn with_local_position(mut self, value: Vec2) -> Self {
        self.local_position = value;
        self
    }

    /// Set the anchor, as a fraction of the parent's size.
    #[must_use]
    pub fn with_anchor_position(mut self, value: Vec2) -> Self {
        self.anchor_position = value;
        self
    }

    /// Set the offset, as a fraction of the node's own size.
    #[must_use]
    pub fn with_offset_position(mut self, value: Vec2) -> Self {
        self.offset_position = value;
        self
    }

    /// Set the size.
    ///
    /// On axes that inherit the parent's size, the value is replaced by
    /// `parent_size + local_size_offset` as soon as the node is placed under a parent.
    #[must_use]
    pub fn with_size(mut self, value: Vec2) -> Self {
        self.size = value;
        self
    }

    /// Set the size contribution that is independent of the parent.
    #[must_use]
    pub fn with_local_size_offset(mut self, value: Vec2) -> Self {
        self.local_size_offset = value;
        self
    }

    /// Set the per-axis parent scale (`0` or `1` on each axis).
    #[must_use]
    pub fn with_parent_scale(mut self, value: Vec2) -> Self {
        self.parent_scale = value;
        self
    }

    /// Inherit (or stop inheriting) the parent's width.
    #[must_use]
    pub fn with_scale_width(mut self, inherit: bool) -> Self {
        self.parent_scale.x = if inherit { 1.0 } else { 0.0 };
        self
    }

    /// Inherit (or stop inheriting) the parent's height.
    #[must_use]
    pub fn with_scale_height(mut self, inherit: bool) -> Self {
        self.parent_scale.y = if inherit { 1.0 } else { 0.0 };
        self
    }

    /// Set the local rotation in degrees.
    #[must_use]
    pub fn with_local_rotation(mut self, degrees: f64) -> Self {
        self.local_rotation = degrees;
        self
    }

    /// Set the rotation center, as a fraction of the node's own size.
    #[must_use]
    pub fn with_rotation_offset(mut self, value: Vec2) -> Self {
        self.rotation_offset = value;
        self
    }

    /// Position relative to the anchor point.
    pub fn local_position(&self) -> Vec2 {
        self.local_position
    }

    /// Anchor as a fraction of the parent's size.
    pub fn anchor_position(&self) -> Vec2 {
        self.anchor_position
    }

    /// Offset as a fraction of the node's own size.
    pub fn offset_position(&self) -> Vec2 {
        self.offset_position
    }

    /// Current size.
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Size contribution independent of the parent.
    pub fn local_size_offset(&self) -> Vec2 {
        self.local_size_offset
    }

    /// Per-axis parent scale.
    pub fn parent_scale(&self) -> Vec2 {
        self.parent_scale
    }

    /// Whether the width tracks the parent's width.
    pub fn scale_width(&self) -> bool {
        self.parent_scale.x != 0.0
    }

    /// Whether the height tracks the parent's height.
    pub fn scale_height(&self) -> bool {
        self.parent_scale.y != 0.0
    }

    /// Local rotation in degrees.
    pub fn local_rotation(&self) -> f64 {
        self.local_rotation
    }

    /// Rotation center as a fraction of the node's own size.
    pub fn rotation_offset(&self) -> Vec2 {
        self.rotation_offset
    }

    /// Resolved position in the parent's space.
    pub fn pivot_position(&self) -> Vec2 {
        self.pivot_position
    }

    /// Position in world space, ignoring rotation.
    pub fn world_position(&self) -> Vec2 {
        self.world_position
    }

    /// World rotation in degrees.
    pub fn world_rotation(&self) -> f64 {
        self.world_rotation
    }

    /// Maps the node's local space (origin at the top-left of its rectangle) to world space.
    ///
    /// This is the matrix a canvas holds while the node's drawable runs.
    pub fn world_transform(&self) -> Affine {
        self.world_transform
    }

    /// Point in the parent's space that the node rotates around.
    pub fn rotation_center(&self) -> Point {
        (self.pivot_position + mul(self.size, self.rotation_offset)).to_point()
    }

    /// The node's rectangle in its own local space.
    pub fn local_rect(&self) -> Rect {
        Rect::from_origin_size(Point::ORIGIN, self.size.to_size())
    }

    /// Whether `point` (world space) falls inside the node's rectangle.
    ///
    /// Zero-area nodes never contain anything.
    pub fn contains(&self, point: Point) -> bool {
        if self.size.x <= 0.0 || self.size.y <= 0.0 {
            return false;
        }
        let local = self.world_transform.inverse() * point;
        self.local_rect().contains(local)
    }

    pub(crate) fn set_local_position(&mut self, value: Vec2) {
        self.local_position = value;
    }

    pub(crate) fn set_anchor_position(&mut self, value: Vec2) {
        self.anchor_position = value;
    }

    pub(crate) fn set_offset_position(&mut self, value: Vec2) {
        self.offset_position = value;
    }

    pub(crate) fn set_world_position(&mut self, value: Vec2) {
        self.local_position += value - self.world_position;
    }

    pub(crate) fn set_pivot_position(&mut self, value: Vec2) {
        self.local_position += value - self.pivot_position;
    }

    /// Stores the literal size and back-solves the size offset on inheriting axes.
    pub(crate) fn set_size(&mut self, value: Vec2, parent_size: Vec2) {
        self.size = value;
        let inherited = mul(parent_size, self.parent_scale);
        if self.parent_scale.x != 0.0 {
            self.local_size_offset.x = value.x - inherited.x;
        }
        if self.parent_scale.y != 0.0 {
            self.local_size_offset.y = value.y - inherited.y;
        }
    }

    pub(crate) fn set_local_size_offset(&mut self, value: Vec2) {
        self.local_size_offset = value;
    }

    pub(crate) fn set_parent_scale(&mut self, value: Vec2) {
        self.parent_scale = value;
    }

    pub(crate) fn set_local_rotation(&mut self, degrees: f64) {
        self.local_rotation = degrees;
    }

    pub(crate) fn set_world_rotation(&mut self, degrees: f64) {
        self.local_rotation += degrees - self.world_rotation;
    }

    pub(crate) fn set_rotation_offset(&mut self, value: Vec2) {
        self.rotation_offset = value;
    }

    /// Recompute every derived value from the local fields and the parent's derived values.
    pub(crate) fn recompute(&mut self, parent: Option<&Self>) {
        let (parent_size, parent_world, parent_rotation, parent_matrix) = match parent {
            Some(p) => (
                p.size,
                p.world_position,
                p.world_rotation,
                p.world_transform,
            ),
            None => (Vec2::ZERO, Vec2::ZERO, 0.0, Affine::IDENTITY),
        };

        if self.parent_scale.x != 0.0 {
            self.size.x = parent_size.x * self.parent_scale.x + self.local_size_offset.x;
        }
        if self.parent_scale.y != 0.0 {
            self.size.y = parent_size.y * self.parent_scale.y + self.local_size_offset.y;
        }

        self.pivot_position = mul(parent_size, self.anchor_position)
            - mul(self.size, self.offset_position)
            + self.local_position;
        self.world_position = parent_world + self.pivot_position;
        self.world_rotation = parent_rotation + self.local_rotation;
        self.world_transform = parent_matrix
            * Affine::rotate_about(self.local_rotation.to_radians(), self.rotation_center())
            * Affine::translate(self.pivot_position);
    }
}
