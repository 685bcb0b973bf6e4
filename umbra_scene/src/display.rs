// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A recorded render traversal that can be replayed on any canvas.

use alloc::{sync::Arc, vec::Vec};
use kurbo::{Point, Rect, Vec2};

use crate::{Canvas, Drawable, NodeFlags, NodeId, Tree};

/// One step of a recorded frame.
#[derive(Clone)]
pub enum DisplayItem {
    /// Save canvas state.
    Save,
    /// Rotate about `center`, then translate to `pivot`.
    Transform {
        /// Local rotation in degrees.
        rotation: f64,
        /// Rotation center in the parent's space.
        center: Point,
        /// Pivot position in the parent's space.
        pivot: Vec2,
    },
    /// Paint a node's drawable.
    Draw {
        /// The painter.
        drawable: Arc<dyn Drawable>,
        /// Node size.
        size: Vec2,
        /// Skip when the node's rectangle is outside the clip.
        cull: bool,
    },
    /// Restore to the matching `Save`.
    Restore,
}

impl core::fmt::Debug for DisplayItem {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Save => f.write_str("Save"),
            Self::Transform {
                rotation,
                center,
                pivot,
            } => f
                .debug_struct("Transform")
                .field("rotation", rotation)
                .field("center", center)
                .field("pivot", pivot)
                .finish(),
            Self::Draw { size, cull, .. } => f
                .debug_struct("Draw")
                .field("size", size)
                .field("cull", cull)
                .finish_non_exhaustive(),
            Self::Restore => f.write_str("Restore"),
        }
    }
}

/// A frame snapshot: the render traversal of a subtree, detached from the tree.
///
/// Recording happens wherever the tree lives (the update thread); replay only needs the
/// list, so the tree is never read while a frame is painted.
///
/// ```rust
/// use kurbo::{Size, Vec2};
/// use umbra_scene::{Canvas, Color, DisplayList, LocalNode, RecordingCanvas, Transform, Tree};
///
/// let mut tree = Tree::new();
/// let root = tree.insert(
///     None,
///     LocalNode::new(Transform::new().with_size(Vec2::new(10.0, 10.0))).with_drawable(
///         |canvas: &mut dyn Canvas, size: Vec2| {
///             canvas.fill_rect(size.to_size().to_rect(), Color::WHITE);
///         },
///     ),
/// );
/// let list = DisplayList::record(&tree, root);
/// let mut canvas = RecordingCanvas::new(Size::new(100.0, 100.0));
/// list.replay(&mut canvas);
/// assert_eq!(canvas.ops().len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct DisplayList {
    items: Vec<DisplayItem>,
}

impl DisplayList {
    /// Record the visible subtree of `root`, children in ascending z order.
    ///
    /// Invisible nodes are skipped together with their descendants. Stale roots record an
    /// empty list.
    pub fn record(tree: &Tree, root: NodeId) -> Self {
        let mut list = Self::default();
        if tree.is_alive(root) {
            list.record_node(tree, root);
        }
        list
    }

    fn record_node(&mut self, tree: &Tree, id: NodeId) {
        let (Some(flags), Some(tf)) = (tree.flags(id), tree.transform(id)) else {
            return;
        };
        if !flags.contains(NodeFlags::VISIBLE) {
            return;
        }
        self.items.push(DisplayItem::Save);
        self.items.push(DisplayItem::Transform {
            rotation: tf.local_rotation(),
            center: tf.rotation_center(),
            pivot: tf.pivot_position(),
        });
        if let Some(drawable) = tree.drawable(id) {
            self.items.push(DisplayItem::Draw {
                drawable: drawable.clone(),
                size: tf.size(),
                cull: flags.contains(NodeFlags::CULL),
            });
        }
        for &child in tree.children_of(id) {
            self.record_node(tree, child);
        }
        self.items.push(DisplayItem::Restore);
    }

    /// Recorded items in order.
    pub fn items(&self) -> &[DisplayItem] {
        &self.items
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Paint the list onto `canvas`.
    ///
    /// Culled drawables are skipped, but their children are still painted.
    pub fn replay(&self, canvas: &mut dyn Canvas) {
        let mut saves = Vec::new();
        for item in &self.items {
            match item {
                DisplayItem::Save => saves.push(canvas.save()),
                DisplayItem::Transform {
                    rotation,
                    center,
                    pivot,
                } => {
                    canvas.rotate_degrees(*rotation, *center);
                    canvas.translate(*pivot);
                }
                DisplayItem::Draw {
                    drawable,
                    size,
                    cull,
                } => {
                    let rect = Rect::from_origin_size(Point::ORIGIN, size.to_size());
                    if *cull && canvas.quick_reject(rect) {
                        continue;
                    }
                    drawable.draw(canvas, *size);
                }
                DisplayItem::Restore => {
                    if let Some(count) = saves.pop() {
                        canvas.restore_to_count(count);
                    }
                }
            }
        }
    }
}

impl Tree {
    /// Render the subtree of `root` directly onto `canvas`.
    pub fn render(&self, root: NodeId, canvas: &mut dyn Canvas) {
        DisplayList::record(self, root).replay(canvas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use crate::{Color, DrawOp, LocalNode, RecordingCanvas, Transform};
    use kurbo::{Affine, Size};

    fn filled(tf: Transform) -> LocalNode {
        LocalNode::new(tf).with_drawable(|canvas: &mut dyn Canvas, size: Vec2| {
            canvas.fill_rect(size.to_size().to_rect(), Color::BLACK);
        })
    }

    fn draw_transforms(canvas: &RecordingCanvas) -> Vec<Affine> {
        canvas
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillRect { transform, .. } => Some(*transform),
                DrawOp::Clear(_) => None,
            })
            .collect()
    }

    #[test]
    fn canvas_matrix_matches_world_transform() {
        let mut tree = Tree::new();
        let root = tree.insert(
            None,
            filled(
                Transform::new()
                    .with_size(Vec2::new(200.0, 200.0))
                    .with_local_position(Vec2::new(10.0, 20.0)),
            ),
        );
        let child = tree.insert_child(
            root,
            filled(
                Transform::new()
                    .with_size(Vec2::new(40.0, 20.0))
                    .with_anchor_position(Vec2::new(0.5, 0.5))
                    .with_offset_position(Vec2::new(0.5, 0.5))
                    .with_rotation_offset(Vec2::new(0.5, 0.5))
                    .with_local_rotation(30.0),
            ),
        );

        let mut canvas = RecordingCanvas::new(Size::new(400.0, 400.0));
        tree.render(root, &mut canvas);
        let drawn = draw_transforms(&canvas);
        assert_eq!(drawn.len(), 2);
        assert_eq!(drawn[0], tree.transform(root).unwrap().world_transform());
        let expected = tree.transform(child).unwrap().world_transform().as_coeffs();
        for (a, b) in drawn[1].as_coeffs().iter().zip(expected) {
            assert!((a - b).abs() < 1e-9);
        }
        assert_eq!(canvas.save_count(), 0);
    }

    #[test]
    fn children_draw_in_ascending_z() {
        let mut tree = Tree::new();
        let root = tree.insert(None, LocalNode::default());
        let top = tree.insert_child(
            root,
            filled(Transform::new().with_size(Vec2::new(1.0, 1.0))).with_z_index(5),
        );
        let bottom = tree.insert_child(
            root,
            filled(
                Transform::new()
                    .with_size(Vec2::new(1.0, 1.0))
                    .with_local_position(Vec2::new(2.0, 0.0)),
            )
            .with_z_index(-1),
        );
        let mut canvas = RecordingCanvas::new(Size::new(10.0, 10.0));
        tree.render(root, &mut canvas);
        let drawn = draw_transforms(&canvas);
        assert_eq!(drawn[0], tree.transform(bottom).unwrap().world_transform());
        assert_eq!(drawn[1], tree.transform(top).unwrap().world_transform());
    }

    #[test]
    fn culled_parent_still_draws_children() {
        let mut tree = Tree::new();
        let root = tree.insert(None, LocalNode::default());
        let offscreen = tree.insert_child(
            root,
            filled(
                Transform::new()
                    .with_size(Vec2::new(10.0, 10.0))
                    .with_local_position(Vec2::new(500.0, 0.0)),
            ),
        );
        let back = tree.insert_child(
            offscreen,
            filled(
                Transform::new()
                    .with_size(Vec2::new(10.0, 10.0))
                    .with_local_position(Vec2::new(-495.0, 0.0)),
            ),
        );
        let mut canvas = RecordingCanvas::new(Size::new(100.0, 100.0));
        tree.render(root, &mut canvas);
        let drawn = draw_transforms(&canvas);
        assert_eq!(drawn, vec![tree.transform(back).unwrap().world_transform()]);

        // Without culling the offscreen drawable runs too.
        tree.set_flags(offscreen, NodeFlags::VISIBLE);
        canvas.reset();
        tree.render(root, &mut canvas);
        assert_eq!(draw_transforms(&canvas).len(), 2);
    }

    #[test]
    fn invisible_hides_subtree() {
        let mut tree = Tree::new();
        let root = tree.insert(None, LocalNode::default());
        let hidden = tree.insert_child(root, filled(Transform::new().with_size(Vec2::new(5.0, 5.0))));
        tree.insert_child(hidden, filled(Transform::new().with_size(Vec2::new(5.0, 5.0))));
        tree.set_flags(hidden, NodeFlags::INTERACTIVE);

        let list = DisplayList::record(&tree, root);
        assert!(
            !list
                .items()
                .iter()
                .any(|item| matches!(item, DisplayItem::Draw { .. }))
        );
        assert!(DisplayList::record(&tree, NodeId::new(99, 1)).is_empty());
    }
}
