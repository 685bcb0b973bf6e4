// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer dragging for a single node.

use kurbo::{Point, Vec2};
use umbra_scene::{Element, MouseButton, NodeId, Outcome, PointerEvent, Tree};

/// An [`Element`] that moves its node with the pointer while `button` is held on it.
///
/// The node keeps the offset between its world position and the pointer at press time.
#[derive(Clone, Debug)]
pub struct Draggable {
    button: MouseButton,
    grab: Option<(Vec2, Point)>,
}

impl Draggable {
    /// Drag with `button`.
    pub fn new(button: MouseButton) -> Self {
        Self { button, grab: None }
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.grab.is_some()
    }
}

impl Default for Draggable {
    fn default() -> Self {
        Self::new(MouseButton::Left)
    }
}

impl Element for Draggable {
    fn pointer(&mut self, tree: &mut Tree, id: NodeId, event: &PointerEvent) -> Outcome {
        match *event {
            PointerEvent::Down { button, position } if button == self.button => {
                if let Some(tf) = tree.transform(id) {
                    self.grab = Some((tf.world_position(), position));
                }
            }
            PointerEvent::Drag { button, position } if button == self.button => {
                if let Some((start, pointer)) = self.grab {
                    tree.set_world_position(id, start + (position - pointer));
                }
            }
            PointerEvent::Up { button, .. } if button == self.button => self.grab = None,
            _ => {}
        }
        Outcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InputDispatcher;
    use umbra_scene::{LocalNode, Transform};

    #[test]
    fn follows_pointer_while_held() {
        let mut tree = Tree::new();
        let root = tree.insert(
            None,
            LocalNode::new(Transform::new().with_size(Vec2::new(400.0, 400.0))),
        );
        let handle = tree.insert_child(
            root,
            LocalNode::new(
                Transform::new()
                    .with_local_position(Vec2::new(10.0, 10.0))
                    .with_size(Vec2::new(20.0, 20.0)),
            )
            .with_z_index(1)
            .with_element(Draggable::default()),
        );

        let mut input = InputDispatcher::new();
        input.pointer_moved(&mut tree, root, Point::new(15.0, 15.0));
        input.button_down(&mut tree, root, MouseButton::Left);
        input.pointer_moved(&mut tree, root, Point::new(115.0, 65.0));
        assert_eq!(
            tree.transform(handle).unwrap().world_position(),
            Vec2::new(110.0, 60.0)
        );

        input.button_up(&mut tree, root, MouseButton::Left);
        input.pointer_moved(&mut tree, root, Point::new(300.0, 300.0));
        assert_eq!(
            tree.transform(handle).unwrap().world_position(),
            Vec2::new(110.0, 60.0)
        );
    }

    #[test]
    fn other_buttons_are_ignored() {
        let mut tree = Tree::new();
        let node = tree.insert(
            None,
            LocalNode::new(Transform::new().with_size(Vec2::new(10.0, 10.0)))
                .with_element(Draggable::new(MouseButton::Right)),
        );
        let mut input = InputDispatcher::new();
        input.pointer_moved(&mut tree, node, Point::new(5.0, 5.0));
        input.button_down(&mut tree, node, MouseButton::Left);
        input.pointer_moved(&mut tree, node, Point::new(50.0, 50.0));
        assert_eq!(tree.transform(node).unwrap().world_position(), Vec2::ZERO);
    }
}
