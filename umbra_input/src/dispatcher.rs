// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer hover, press and capture state machine.
//!
//! The dispatcher keeps three pieces of session state between calls:
//!
//! - the last pointer position,
//! - the hovered list: nodes that received `Enter` and have not yet received `Leave`, in
//!   front-to-back order, each with the masking flag read when it was hit,
//! - one press stack per held button: the nodes that received `Down` for that button.
//!
//! ## Semantics
//!
//! - Hit testing uses [`Tree::hit_test_point`], so the order is front to back and a node
//!   with [`NodeFlags::MASK_MOUSE_EVENTS`](umbra_scene::NodeFlags::MASK_MOUSE_EVENTS)
//!   hides its lower-z siblings. The flag is read at hit-test time.
//! - `Enter` fires once when a node starts being hit; `Leave` fires once when it stops.
//! - A node in any press stack is captured: it keeps receiving `Move`, and `Drag` for each
//!   held button, even outside its bounds. Its `Leave` is deferred until the last button
//!   capturing it is released.
//! - `Down` walks the fresh hits front to back, recording each visited node. A node whose
//!   hooks return [`Outcome::Stop`] ends the walk.
//! - `Up` goes to the recorded nodes in the same front-to-back order, then hover is
//!   re-evaluated. A second `Down` for a held button releases the old stack first.
//!
//! ## Example
//!
//! ```
//! use kurbo::{Point, Vec2};
//! use umbra_input::InputDispatcher;
//! use umbra_scene::{LocalNode, MouseButton, Transform, Tree};
//!
//! let mut tree = Tree::new();
//! let root = tree.insert(
//!     None,
//!     LocalNode::new(Transform::new().with_size(Vec2::new(100.0, 100.0))),
//! );
//! let mut input = InputDispatcher::new();
//! input.pointer_moved(&mut tree, root, Point::new(10.0, 10.0));
//! assert!(input.is_hovered(root));
//!
//! input.button_down(&mut tree, root, MouseButton::Left);
//! input.pointer_moved(&mut tree, root, Point::new(500.0, 10.0));
//! // Still captured, so still hovered.
//! assert!(input.is_captured(root));
//! assert!(input.is_hovered(root));
//!
//! input.button_up(&mut tree, root, MouseButton::Left);
//! assert!(!input.is_hovered(root));
//! ```

use alloc::vec::Vec;
use kurbo::Point;
use smallvec::SmallVec;
use umbra_scene::{Hit, MouseButton, NodeId, Outcome, PointerEvent, QueryFilter, Tree};

/// A node currently under (or captured by) the pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hovered {
    /// The node.
    pub node: NodeId,
    /// Whether the node was opaque to input when it was last hit.
    pub blocking: bool,
}

type PressStack = SmallVec<[NodeId; 4]>;

/// Pointer session state for one tree.
#[derive(Clone, Debug)]
pub struct InputDispatcher {
    pointer: Option<Point>,
    hovered: Vec<Hovered>,
    /// Held buttons in press order.
    presses: SmallVec<[(MouseButton, PressStack); 2]>,
    filter: QueryFilter,
}

impl Default for InputDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl InputDispatcher {
    /// A dispatcher testing visible, interactive nodes.
    pub fn new() -> Self {
        Self::with_filter(QueryFilter::new().visible().interactive())
    }

    /// A dispatcher with a custom hit-test filter.
    pub fn with_filter(filter: QueryFilter) -> Self {
        Self {
            pointer: None,
            hovered: Vec::new(),
            presses: SmallVec::new(),
            filter,
        }
    }

    /// Last known pointer position.
    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    /// Hovered nodes, front to back, followed by captured nodes the pointer has left.
    pub fn hovered(&self) -> &[Hovered] {
        &self.hovered
    }

    /// Whether `node` has received `Enter` without a matching `Leave`.
    pub fn is_hovered(&self, node: NodeId) -> bool {
        self.hovered.iter().any(|h| h.node == node)
    }

    /// Nodes that received `Down` for `button`, in delivery order. Empty when not held.
    pub fn pressed(&self, button: MouseButton) -> &[NodeId] {
        self.presses
            .iter()
            .find(|(b, _)| *b == button)
            .map(|(_, stack)| stack.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `button` is held.
    pub fn is_button_held(&self, button: MouseButton) -> bool {
        self.presses.iter().any(|(b, _)| *b == button)
    }

    /// Whether any held button's press stack contains `node`.
    pub fn is_captured(&self, node: NodeId) -> bool {
        self.presses
            .iter()
            .any(|(_, stack)| stack.contains(&node))
    }

    /// The pointer moved to `position`.
    ///
    /// Re-evaluates hover (firing `Leave`, then `Enter`), then sends `Move` to every hovered
    /// or captured node and `Drag` to every node in each held button's press stack.
    pub fn pointer_moved(&mut self, tree: &mut Tree, root: NodeId, position: Point) {
        self.pointer = Some(position);
        self.rehover(tree, root, position);

        let targets: SmallVec<[NodeId; 8]> = self.hovered.iter().map(|h| h.node).collect();
        for node in targets {
            tree.dispatch_pointer(node, &PointerEvent::Move { position });
        }

        let drags: SmallVec<[(MouseButton, NodeId); 8]> = self
            .presses
            .iter()
            .flat_map(|(button, stack)| stack.iter().map(move |node| (*button, *node)))
            .collect();
        for (button, node) in drags {
            tree.dispatch_pointer(node, &PointerEvent::Drag { button, position });
        }
    }

    /// Re-run hit testing at the last pointer position.
    ///
    /// Nodes may have moved, appeared or disappeared since the last pointer event; this
    /// brings enter/leave state up to date without sending `Move`.
    pub fn refresh(&mut self, tree: &mut Tree, root: NodeId) {
        if let Some(position) = self.pointer {
            self.rehover(tree, root, position);
        } else {
            self.prune(tree);
        }
    }

    /// `button` went down at the last pointer position.
    ///
    /// Returns the nodes that received `Down`, front to back. Pressing a button that is
    /// already held first releases its old press stack, sending `Up` as [`Self::button_up`]
    /// would.
    pub fn button_down(&mut self, tree: &mut Tree, root: NodeId, button: MouseButton) -> &[NodeId] {
        self.release(tree, button);
        let Some(position) = self.pointer else {
            return &[];
        };
        let hits = self.rehover(tree, root, position);

        let mut stack = PressStack::new();
        for hit in hits {
            if !tree.is_alive(hit.node) {
                continue;
            }
            stack.push(hit.node);
            let outcome = tree.dispatch_pointer(hit.node, &PointerEvent::Down { button, position });
            if outcome == Outcome::Stop {
                break;
            }
        }
        tracing::trace!(?button, stack = ?stack.as_slice(), "press");
        self.presses.push((button, stack));
        self.pressed(button)
    }

    /// `button` was released.
    ///
    /// Sends `Up` to the button's press stack in the order recorded at press time, clears
    /// the stack, then re-evaluates hover so deferred `Leave` events fire.
    pub fn button_up(&mut self, tree: &mut Tree, root: NodeId, button: MouseButton) {
        if self.release(tree, button) {
            self.refresh(tree, root);
        }
    }

    /// Remove the press stack for `button` and send it `Up`. Returns false if not held.
    fn release(&mut self, tree: &mut Tree, button: MouseButton) -> bool {
        let Some(idx) = self.presses.iter().position(|(b, _)| *b == button) else {
            return false;
        };
        let (_, stack) = self.presses.remove(idx);
        let position = self.pointer.unwrap_or(Point::ORIGIN);
        tracing::trace!(?button, stack = ?stack.as_slice(), "release");
        for node in stack {
            tree.dispatch_pointer(node, &PointerEvent::Up { button, position });
        }
        true
    }

    /// Drop stale nodes from the session state.
    fn prune(&mut self, tree: &Tree) {
        self.hovered.retain(|h| tree.is_alive(h.node));
        for (_, stack) in &mut self.presses {
            stack.retain(|node| tree.is_alive(*node));
        }
    }

    /// Hit test at `position`, fire `Leave` then `Enter`, and return the fresh hits.
    fn rehover(&mut self, tree: &mut Tree, root: NodeId, position: Point) -> Vec<Hit> {
        self.prune(tree);
        let hits = tree.hit_test_point(root, position, self.filter);

        let mut next: Vec<Hovered> = hits
            .iter()
            .map(|h| Hovered {
                node: h.node,
                blocking: h.masks,
            })
            .collect();
        let mut left: SmallVec<[NodeId; 8]> = SmallVec::new();
        for old in &self.hovered {
            if hits.iter().any(|h| h.node == old.node) {
                continue;
            }
            if self.is_captured(old.node) {
                next.push(*old);
            } else {
                left.push(old.node);
            }
        }
        let entered: SmallVec<[NodeId; 8]> = hits
            .iter()
            .map(|h| h.node)
            .filter(|node| !self.is_hovered(*node))
            .collect();
        self.hovered = next;

        for node in left {
            tracing::trace!(?node, "pointer leave");
            tree.dispatch_pointer(node, &PointerEvent::Leave { position });
        }
        for node in entered {
            tracing::trace!(?node, "pointer enter");
            tree.dispatch_pointer(node, &PointerEvent::Enter { position });
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use alloc::{sync::Arc, vec};
    use kurbo::Vec2;
    use std::sync::Mutex;
    use umbra_scene::{LocalNode, NodeFlags, Transform};

    type Log = Arc<Mutex<Vec<(NodeId, &'static str)>>>;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> LocalNode {
        LocalNode::new(
            Transform::new()
                .with_local_position(Vec2::new(x, y))
                .with_size(Vec2::new(w, h)),
        )
    }

    fn record(tree: &mut Tree, log: &Log, node: NodeId) {
        let log = log.clone();
        tree.on_pointer(node, move |_, id, event| {
            let name = match event {
                PointerEvent::Enter { .. } => "enter",
                PointerEvent::Leave { .. } => "leave",
                PointerEvent::Down { .. } => "down",
                PointerEvent::Up { .. } => "up",
                PointerEvent::Move { .. } => "move",
                PointerEvent::Drag { .. } => "drag",
            };
            log.lock().unwrap().push((id, name));
            Outcome::Continue
        });
    }

    fn take(log: &Log, kind: &str) -> Vec<NodeId> {
        let mut log = log.lock().unwrap();
        let out = log.iter().filter(|(_, k)| *k == kind).map(|(n, _)| *n).collect();
        log.clear();
        out
    }

    /// A non-interactive root with two overlapping siblings at z 1 and 2.
    fn siblings() -> (Tree, NodeId, NodeId, NodeId) {
        let mut tree = Tree::new();
        let root = tree.insert(
            None,
            rect(0.0, 0.0, 300.0, 300.0).with_flags(NodeFlags::VISIBLE),
        );
        let low = tree.insert_child(root, rect(0.0, 0.0, 100.0, 100.0).with_z_index(1));
        let high = tree.insert_child(root, rect(50.0, 50.0, 100.0, 100.0).with_z_index(2));
        (tree, root, low, high)
    }

    #[test]
    fn press_reaches_both_siblings_highest_z_first() {
        let (mut tree, root, low, high) = siblings();
        let log = Log::default();
        record(&mut tree, &log, low);
        record(&mut tree, &log, high);

        let mut input = InputDispatcher::new();
        input.pointer_moved(&mut tree, root, Point::new(75.0, 75.0));
        log.lock().unwrap().clear();
        input.button_down(&mut tree, root, MouseButton::Left);
        assert_eq!(take(&log, "down"), vec![high, low]);
    }

    #[test]
    fn masking_sibling_stops_press() {
        let (mut tree, root, low, high) = siblings();
        tree.set_flags(high, NodeFlags::default() | NodeFlags::MASK_MOUSE_EVENTS);
        let log = Log::default();
        record(&mut tree, &log, low);
        record(&mut tree, &log, high);

        let mut input = InputDispatcher::new();
        input.pointer_moved(&mut tree, root, Point::new(75.0, 75.0));
        assert_eq!(
            input.hovered(),
            &[Hovered {
                node: high,
                blocking: true
            }]
        );
        log.lock().unwrap().clear();
        input.button_down(&mut tree, root, MouseButton::Left);
        assert_eq!(take(&log, "down"), vec![high]);
    }

    #[test]
    fn masked_child_does_not_hide_parent_siblings() {
        let (mut tree, root, low, high) = siblings();
        tree.set_local_position(high, Vec2::new(0.0, 0.0));
        let top = tree.insert_child(high, rect(0.0, 0.0, 100.0, 100.0));
        tree.set_flags(top, NodeFlags::default() | NodeFlags::MASK_MOUSE_EVENTS);
        let log = Log::default();
        record(&mut tree, &log, low);

        let mut input = InputDispatcher::new();
        input.pointer_moved(&mut tree, root, Point::new(10.0, 10.0));
        let pressed = input.button_down(&mut tree, root, MouseButton::Left).to_vec();
        assert_eq!(pressed, vec![top, high, low]);
        assert_eq!(take(&log, "down"), vec![low]);
    }

    #[test]
    fn stop_outcome_halts_press() {
        let (mut tree, root, low, high) = siblings();
        let log = Log::default();
        record(&mut tree, &log, low);
        tree.on_pointer(high, |_, _, event| match event {
            PointerEvent::Down { .. } => Outcome::Stop,
            _ => Outcome::Continue,
        });

        let mut input = InputDispatcher::new();
        input.pointer_moved(&mut tree, root, Point::new(75.0, 75.0));
        log.lock().unwrap().clear();
        let pressed = input.button_down(&mut tree, root, MouseButton::Left).to_vec();
        assert_eq!(pressed, vec![high]);
        assert!(take(&log, "down").is_empty());
        // Hover is unaffected by the stop.
        assert!(input.is_hovered(low));
    }

    #[test]
    fn enter_and_leave_fire_once() {
        let (mut tree, root, low, high) = siblings();
        let log = Log::default();
        record(&mut tree, &log, low);
        record(&mut tree, &log, high);

        let mut input = InputDispatcher::new();
        input.pointer_moved(&mut tree, root, Point::new(10.0, 10.0));
        input.pointer_moved(&mut tree, root, Point::new(20.0, 20.0));
        input.pointer_moved(&mut tree, root, Point::new(75.0, 75.0));
        {
            let log = log.lock().unwrap();
            let enters: Vec<_> = log.iter().filter(|(_, k)| *k == "enter").collect();
            assert_eq!(enters, vec![&(low, "enter"), &(high, "enter")]);
        }
        log.lock().unwrap().clear();

        input.pointer_moved(&mut tree, root, Point::new(140.0, 140.0));
        assert_eq!(take(&log, "leave"), vec![low]);
        input.pointer_moved(&mut tree, root, Point::new(280.0, 280.0));
        assert_eq!(take(&log, "leave"), vec![high]);
        assert!(input.hovered().is_empty());
    }

    #[test]
    fn capture_defers_leave_and_keeps_dragging() {
        let (mut tree, root, low, high) = siblings();
        let log = Log::default();
        record(&mut tree, &log, low);
        record(&mut tree, &log, high);

        let mut input = InputDispatcher::new();
        input.pointer_moved(&mut tree, root, Point::new(20.0, 20.0));
        input.button_down(&mut tree, root, MouseButton::Left);
        assert_eq!(input.pressed(MouseButton::Left), &[low]);
        log.lock().unwrap().clear();

        input.pointer_moved(&mut tree, root, Point::new(250.0, 250.0));
        {
            let log = log.lock().unwrap();
            assert!(!log.contains(&(low, "leave")));
            assert!(log.contains(&(low, "move")));
            assert!(log.contains(&(low, "drag")));
            assert!(!log.contains(&(high, "drag")));
        }
        assert!(input.is_hovered(low));
        log.lock().unwrap().clear();

        input.button_up(&mut tree, root, MouseButton::Left);
        assert_eq!(*log.lock().unwrap(), vec![(low, "up"), (low, "leave")]);
        assert!(!input.is_hovered(low));
        assert!(input.pressed(MouseButton::Left).is_empty());
    }

    #[test]
    fn recapture_does_not_re_enter() {
        let (mut tree, root, low, _) = siblings();
        let log = Log::default();
        record(&mut tree, &log, low);

        let mut input = InputDispatcher::new();
        input.pointer_moved(&mut tree, root, Point::new(20.0, 20.0));
        input.button_down(&mut tree, root, MouseButton::Right);
        input.pointer_moved(&mut tree, root, Point::new(250.0, 250.0));
        log.lock().unwrap().clear();
        input.pointer_moved(&mut tree, root, Point::new(30.0, 30.0));
        assert!(take(&log, "enter").is_empty());
        input.button_up(&mut tree, root, MouseButton::Right);
        assert!(take(&log, "leave").is_empty());
        assert!(input.is_hovered(low));
    }

    #[test]
    fn up_follows_press_order() {
        let (mut tree, root, low, high) = siblings();
        let log = Log::default();
        record(&mut tree, &log, low);
        record(&mut tree, &log, high);

        let mut input = InputDispatcher::new();
        input.pointer_moved(&mut tree, root, Point::new(75.0, 75.0));
        input.button_down(&mut tree, root, MouseButton::Middle);
        log.lock().unwrap().clear();
        input.button_up(&mut tree, root, MouseButton::Middle);
        assert_eq!(take(&log, "up"), vec![high, low]);

        // Releasing a button that is not held does nothing.
        input.button_up(&mut tree, root, MouseButton::Middle);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn repeated_down_releases_the_old_press() {
        let (mut tree, root, low, high) = siblings();
        let log = Log::default();
        record(&mut tree, &log, low);
        record(&mut tree, &log, high);

        let mut input = InputDispatcher::new();
        input.pointer_moved(&mut tree, root, Point::new(75.0, 75.0));
        input.button_down(&mut tree, root, MouseButton::Left);
        input.pointer_moved(&mut tree, root, Point::new(20.0, 20.0));
        log.lock().unwrap().clear();

        // The second press reaches only `low`, but both earlier targets are released first.
        let pressed = input.button_down(&mut tree, root, MouseButton::Left).to_vec();
        assert_eq!(pressed, vec![low]);
        let log = log.lock().unwrap();
        assert_eq!(
            log.iter().filter(|(_, k)| *k != "enter").copied().collect::<Vec<_>>(),
            vec![(high, "up"), (low, "up"), (high, "leave"), (low, "down")]
        );
    }

    #[test]
    fn refresh_tracks_moving_nodes() {
        let (mut tree, root, low, _) = siblings();
        let log = Log::default();
        record(&mut tree, &log, low);

        let mut input = InputDispatcher::new();
        input.pointer_moved(&mut tree, root, Point::new(20.0, 20.0));
        log.lock().unwrap().clear();
        tree.set_local_position(low, Vec2::new(200.0, 200.0));
        input.refresh(&mut tree, root);
        assert_eq!(*log.lock().unwrap(), vec![(low, "leave")]);
    }

    #[test]
    fn removed_nodes_are_forgotten() {
        let (mut tree, root, low, _) = siblings();
        let mut input = InputDispatcher::new();
        input.pointer_moved(&mut tree, root, Point::new(20.0, 20.0));
        input.button_down(&mut tree, root, MouseButton::Left);
        tree.remove(low);
        input.refresh(&mut tree, root);
        assert!(!input.is_hovered(low));
        assert!(input.pressed(MouseButton::Left).is_empty());
        input.button_up(&mut tree, root, MouseButton::Left);
    }

    #[test]
    fn no_pointer_means_no_press() {
        let (mut tree, root, _, _) = siblings();
        let mut input = InputDispatcher::new();
        assert!(input.button_down(&mut tree, root, MouseButton::Left).is_empty());
        assert!(!input.is_button_held(MouseButton::Left));
    }
}
