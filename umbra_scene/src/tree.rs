// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, liveness, transforms, traversals, queries.

use alloc::{boxed::Box, sync::Arc, vec, vec::Vec};
use kurbo::{Point, Vec2};

use crate::element::Hooks;
use crate::types::{LocalNode, NodeFlags, NodeId};
use crate::{Drawable, Element, Outcome, PointerEvent, SceneError, Transform};

/// Arena-backed scene tree.
///
/// Nodes live in a flat slab and refer to each other by [`NodeId`]. Each node embeds its
/// [`Transform`]; children are kept sorted by z-index (ties keep attachment order).
///
/// Every transform setter recomputes the derived values of the node and all of its
/// descendants before returning, so reads are never stale.
///
/// ## Example
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
/// let child = tree.insert_child(
///     root,
///     LocalNode::new(Transform::new().with_scale_width(true)),
/// );
/// assert_eq!(tree.transform(child).unwrap().size().x, 300.0);
///
/// tree.set_size(root, Vec2::new(120.0, 120.0));
/// assert_eq!(tree.transform(child).unwrap().size().x, 120.0);
/// ```
pub struct Tree {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

impl core::fmt::Debug for Tree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let free = self.free_list.len();
        f.debug_struct("Tree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &free)
            .finish_non_exhaustive()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

/// One node under a hit-tested point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hit {
    /// The matched node.
    pub node: NodeId,
    /// Whether the node is opaque to input ([`NodeFlags::MASK_MOUSE_EVENTS`]).
    pub masks: bool,
}

/// Filters applied during hit testing.
#[derive(Clone, Copy, Debug)]
pub struct QueryFilter {
    /// Bitfield of required node flags. Only nodes containing all these flags will be included.
    pub required_flags: NodeFlags,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self {
            required_flags: NodeFlags::empty(),
        }
    }
}

impl QueryFilter {
    /// Create a new empty filter (includes all nodes).
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter to only visible nodes. Invisible nodes hide their whole subtree.
    pub fn visible(mut self) -> Self {
        self.required_flags |= NodeFlags::VISIBLE;
        self
    }

    /// Filter to only interactive nodes.
    pub fn interactive(mut self) -> Self {
        self.required_flags |= NodeFlags::INTERACTIVE;
        self
    }

    /// Check if a node's flags satisfy this filter.
    pub fn matches(&self, node_flags: NodeFlags) -> bool {
        node_flags.contains(self.required_flags)
    }
}

pub(crate) struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    transform: Transform,
    z_index: i32,
    flags: NodeFlags,
    drawable: Option<Arc<dyn Drawable>>,
    /// Bound to an application as a root.
    bound: bool,
    /// Reachable from a bound root.
    live: bool,
    loaded: bool,
    hooks: Hooks,
}

impl Node {
    fn new(generation: u32, local: LocalNode) -> Self {
        let LocalNode {
            transform,
            z_index,
            flags,
            drawable,
            element,
        } = local;
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            transform,
            z_index,
            flags,
            drawable,
            bound: false,
            live: false,
            loaded: false,
            hooks: Hooks {
                element,
                ..Hooks::default()
            },
        }
    }
}

impl Tree {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Insert a new node as a child of `parent` (or as a detached root if `None`).
    ///
    /// Attaching under a parent behaves like [`Tree::add_child`]: the node is placed by
    /// z-index, its transform is resolved against the parent, and it loads if the parent is
    /// live. A stale `parent` inserts a detached root.
    pub fn insert(&mut self, parent: Option<NodeId>, local: LocalNode) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, local));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, local)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = NodeId::new(idx, generation);
        match parent {
            Some(p) if self.is_alive(p) => self.attach(id, p),
            _ => {
                let before = self.node(id).transform;
                self.propagate(id, before);
            }
        }
        id
    }

    /// Insert a new node under `parent`.
    pub fn insert_child(&mut self, parent: NodeId, local: LocalNode) -> NodeId {
        self.insert(Some(parent), local)
    }

    /// Remove a node and its whole subtree.
    ///
    /// The node is detached from its parent first (firing the parent's child-removed hooks).
    /// Removing a stale id is a no-op.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if self.node(id).parent.is_some() {
            self.detach(id);
        }
        // A child-removed hook may already have removed it.
        if self.is_alive(id) {
            tracing::debug!(?id, "removing subtree");
            self.destroy(id);
        }
    }

    /// Attach `child` under `parent`.
    ///
    /// A no-op if `child` is already a child of `parent` or either id is stale. Fails without
    /// touching the tree if `parent` is `child` or one of its descendants.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.set_parent(child, Some(parent))
    }

    /// Detach `child` from `parent`. A no-op unless `parent` is its current parent.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if self.is_alive(parent) && self.parent_of(child) == Some(parent) {
            self.detach(child);
        }
    }

    /// Move `id` under `new_parent`, or detach it when `None`.
    ///
    /// The ancestry of `new_parent` is checked before anything changes, so a rejected
    /// assignment leaves the tree exactly as it was.
    pub fn set_parent(&mut self, id: NodeId, new_parent: Option<NodeId>) -> Result<(), SceneError> {
        if !self.is_alive(id) {
            return Ok(());
        }
        if let Some(parent) = new_parent {
            if !self.is_alive(parent) || self.node(id).parent == Some(parent) {
                return Ok(());
            }
            if self.is_ancestor_or_self(id, parent) {
                return Err(SceneError::CircularReference { child: id, parent });
            }
        }
        if self.node(id).parent.is_some() {
            self.detach(id);
        }
        if let Some(parent) = new_parent
            && self.is_alive(parent)
            && self.is_alive(id)
        {
            self.attach(id, parent);
        }
        Ok(())
    }

    /// Update the z-index and re-sort the parent's children.
    pub fn set_z_index(&mut self, id: NodeId, z: i32) {
        let Some(n) = self.node_opt_mut(id) else {
            return;
        };
        if n.z_index == z {
            return;
        }
        n.z_index = z;
        if let Some(parent) = n.parent {
            let mut children = core::mem::take(&mut self.node_mut(parent).children);
            children.sort_by_key(|c| self.node(*c).z_index);
            self.node_mut(parent).children = children;
        }
    }

    /// Update node flags.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        if let Some(n) = self.node_opt_mut(id) {
            n.flags = flags;
        }
    }

    /// Replace the node's drawable.
    pub fn set_drawable(&mut self, id: NodeId, drawable: Option<Arc<dyn Drawable>>) {
        if let Some(n) = self.node_opt_mut(id) {
            n.drawable = drawable;
        }
    }

    /// Replace the node's element. Subscribed closures are kept.
    ///
    /// Called from one of the node's own hooks, the new element takes over once the hook
    /// returns.
    pub fn set_element(&mut self, id: NodeId, element: impl Element + 'static) {
        if let Some(n) = self.node_opt_mut(id) {
            n.hooks.element = Some(Box::new(element));
        }
    }

    /// Mark a parentless node as a live root, loading every not-yet-loaded node beneath it.
    ///
    /// Nodes attached under a live node become live (and load) during the attach call.
    pub fn bind_root(&mut self, id: NodeId) {
        let Some(n) = self.node_opt_mut(id) else {
            return;
        };
        if n.parent.is_some() || n.bound {
            return;
        }
        n.bound = true;
        tracing::debug!(?id, "root bound");
        self.make_live(id);
    }

    /// Undo [`Tree::bind_root`]; the subtree stops being live. Loaded nodes stay loaded.
    pub fn unbind_root(&mut self, id: NodeId) {
        let Some(n) = self.node_opt_mut(id) else {
            return;
        };
        if !n.bound {
            return;
        }
        n.bound = false;
        tracing::debug!(?id, "root unbound");
        self.set_subtree_dead(id);
    }

    // --- transform setters ---

    /// Set the local position.
    pub fn set_local_position(&mut self, id: NodeId, value: Vec2) {
        self.edit_transform(id, |t, _| t.set_local_position(value));
    }

    /// Set the anchor (fraction of the parent's size).
    pub fn set_anchor_position(&mut self, id: NodeId, value: Vec2) {
        self.edit_transform(id, |t, _| t.set_anchor_position(value));
    }

    /// Set the offset (fraction of the node's own size).
    pub fn set_offset_position(&mut self, id: NodeId, value: Vec2) {
        self.edit_transform(id, |t, _| t.set_offset_position(value));
    }

    /// Move the node so its world position becomes `value`, by adjusting its local position.
    pub fn set_world_position(&mut self, id: NodeId, value: Vec2) {
        self.edit_transform(id, |t, _| t.set_world_position(value));
    }

    /// Move the node so its pivot becomes `value`, by adjusting its local position.
    pub fn set_pivot_position(&mut self, id: NodeId, value: Vec2) {
        self.edit_transform(id, |t, _| t.set_pivot_position(value));
    }

    /// Set the size. On inheriting axes the local size offset is back-solved so the size
    /// holds until the parent's size next changes.
    pub fn set_size(&mut self, id: NodeId, value: Vec2) {
        self.edit_transform(id, |t, parent_size| t.set_size(value, parent_size));
    }

    /// Set the size contribution that is independent of the parent.
    pub fn set_local_size_offset(&mut self, id: NodeId, value: Vec2) {
        self.edit_transform(id, |t, _| t.set_local_size_offset(value));
    }

    /// Set the per-axis parent scale.
    pub fn set_parent_scale(&mut self, id: NodeId, value: Vec2) {
        self.edit_transform(id, |t, _| t.set_parent_scale(value));
    }

    /// Inherit (or stop inheriting) the parent's width.
    pub fn set_scale_width(&mut self, id: NodeId, inherit: bool) {
        self.edit_transform(id, |t, _| {
            let mut scale = t.parent_scale();
            scale.x = if inherit { 1.0 } else { 0.0 };
            t.set_parent_scale(scale);
        });
    }

    /// Inherit (or stop inheriting) the parent's height.
    pub fn set_scale_height(&mut self, id: NodeId, inherit: bool) {
        self.edit_transform(id, |t, _| {
            let mut scale = t.parent_scale();
            scale.y = if inherit { 1.0 } else { 0.0 };
            t.set_parent_scale(scale);
        });
    }

    /// Set the local rotation in degrees.
    pub fn set_local_rotation(&mut self, id: NodeId, degrees: f64) {
        self.edit_transform(id, |t, _| t.set_local_rotation(degrees));
    }

    /// Rotate the node so its world rotation becomes `degrees`.
    pub fn set_world_rotation(&mut self, id: NodeId, degrees: f64) {
        self.edit_transform(id, |t, _| t.set_world_rotation(degrees));
    }

    /// Set the rotation center (fraction of the node's own size).
    pub fn set_rotation_offset(&mut self, id: NodeId, value: Vec2) {
        self.edit_transform(id, |t, _| t.set_rotation_offset(value));
    }

    // --- subscriptions ---

    /// Run `f` after the element's load hook.
    pub fn on_load(&mut self, id: NodeId, f: impl FnMut(&mut Self, NodeId) + Send + 'static) {
        if let Some(n) = self.node_opt_mut(id) {
            n.hooks.load.push(Box::new(f));
        }
    }

    /// Run `f` after the element's update hook, every update tick.
    pub fn on_update(&mut self, id: NodeId, f: impl FnMut(&mut Self, NodeId) + Send + 'static) {
        if let Some(n) = self.node_opt_mut(id) {
            n.hooks.update.push(Box::new(f));
        }
    }

    /// Run `f` after the element's resize hook.
    pub fn on_resize(
        &mut self,
        id: NodeId,
        f: impl FnMut(&mut Self, NodeId, Vec2) + Send + 'static,
    ) {
        if let Some(n) = self.node_opt_mut(id) {
            n.hooks.resize.push(Box::new(f));
        }
    }

    /// Run `f(tree, id, child)` after a child is attached.
    pub fn on_child_added(
        &mut self,
        id: NodeId,
        f: impl FnMut(&mut Self, NodeId, NodeId) + Send + 'static,
    ) {
        if let Some(n) = self.node_opt_mut(id) {
            n.hooks.child_added.push(Box::new(f));
        }
    }

    /// Run `f(tree, id, child)` after a child is detached.
    pub fn on_child_removed(
        &mut self,
        id: NodeId,
        f: impl FnMut(&mut Self, NodeId, NodeId) + Send + 'static,
    ) {
        if let Some(n) = self.node_opt_mut(id) {
            n.hooks.child_removed.push(Box::new(f));
        }
    }

    /// Run `f` for every pointer event reaching the node.
    pub fn on_pointer(
        &mut self,
        id: NodeId,
        f: impl FnMut(&mut Self, NodeId, &PointerEvent) -> Outcome + Send + 'static,
    ) {
        if let Some(n) = self.node_opt_mut(id) {
            n.hooks.pointer.push(Box::new(f));
        }
    }

    /// Run `f` whenever the node's transform values change.
    pub fn on_transform_changed(
        &mut self,
        id: NodeId,
        f: impl FnMut(NodeId, &Transform) + Send + 'static,
    ) {
        if let Some(n) = self.node_opt_mut(id) {
            n.hooks.transform.push(Box::new(f));
        }
    }

    // --- traversals ---

    /// Run update hooks on `root` and then, recursively, on its children in list order.
    pub fn update(&mut self, root: NodeId) {
        if !self.is_alive(root) {
            return;
        }
        self.with_hooks(root, |hooks, tree| hooks.run_update(tree, root));
        let mut i = 0;
        while let Some(&child) = self.children_of(root).get(i) {
            self.update(child);
            i += 1;
        }
    }

    /// Run resize hooks with `size` on every node of the subtree, parents first.
    pub fn resize(&mut self, root: NodeId, size: Vec2) {
        if !self.is_alive(root) {
            return;
        }
        self.with_hooks(root, |hooks, tree| hooks.run_resize(tree, root, size));
        let mut i = 0;
        while let Some(&child) = self.children_of(root).get(i) {
            self.resize(child, size);
            i += 1;
        }
    }

    /// Deliver a pointer event to a single node's element and pointer closures.
    pub fn dispatch_pointer(&mut self, id: NodeId, event: &PointerEvent) -> Outcome {
        self.with_hooks(id, |hooks, tree| hooks.run_pointer(tree, id, event))
            .unwrap_or(Outcome::Continue)
    }

    // --- queries ---

    /// Every node under `point` in the subtree of `root`, front to back.
    ///
    /// Children come before their parent, and higher z-index children before lower ones.
    /// Once a node with [`NodeFlags::MASK_MOUSE_EVENTS`] is hit, the remaining lower-z
    /// siblings at that level (and everything behind them) are skipped; its ancestors are
    /// still tested. Zero-area nodes never match.
    pub fn hit_test_point(&self, root: NodeId, point: Point, filter: QueryFilter) -> Vec<Hit> {
        let mut out = Vec::new();
        if self.is_alive(root) {
            self.hit_walk(root, point, filter, &mut out);
        }
        out
    }

    /// Returns true if `id` itself was hit and masks the siblings behind it.
    fn hit_walk(&self, id: NodeId, point: Point, filter: QueryFilter, out: &mut Vec<Hit>) -> bool {
        let node = self.node(id);
        if filter.required_flags.contains(NodeFlags::VISIBLE)
            && !node.flags.contains(NodeFlags::VISIBLE)
        {
            return false;
        }
        for &child in node.children.iter().rev() {
            if self.hit_walk(child, point, filter, out) {
                break;
            }
        }
        if filter.matches(node.flags) && node.transform.contains(point) {
            let masks = node.flags.contains(NodeFlags::MASK_MOUSE_EVENTS);
            out.push(Hit { node: id, masks });
            return masks;
        }
        false
    }

    /// Returns true if `id` refers to a live node.
    ///
    /// A `NodeId` is considered live if its slot exists and its generation matches
    /// the current generation stored in that slot.
    /// See [`NodeId`] docs for the generational semantics.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// Whether the node is reachable from a bound root.
    pub fn is_live(&self, id: NodeId) -> bool {
        self.node_opt(id).is_some_and(|n| n.live)
    }

    /// Whether the node's load hooks have run.
    pub fn is_loaded(&self, id: NodeId) -> bool {
        self.node_opt(id).is_some_and(|n| n.loaded)
    }

    /// The node's transform, or `None` for stale ids.
    pub fn transform(&self, id: NodeId) -> Option<Transform> {
        self.node_opt(id).map(|n| n.transform)
    }

    /// Returns the z-index of a node if the identifier is live.
    pub fn z_index(&self, id: NodeId) -> Option<i32> {
        self.node_opt(id).map(|n| n.z_index)
    }

    /// Returns the parent of a node if live, or `None` for roots or stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// Returns the flags of a node if the identifier is live.
    pub fn flags(&self, id: NodeId) -> Option<NodeFlags> {
        self.node_opt(id).map(|n| n.flags)
    }

    /// The node's drawable, if any.
    pub fn drawable(&self, id: NodeId) -> Option<&Arc<dyn Drawable>> {
        self.node_opt(id).and_then(|n| n.drawable.as_ref())
    }

    /// Get the children of a node in z order, or empty slice if node is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        if !self.is_alive(id) {
            return &[];
        }
        &self.node(id).children
    }

    /// Get the next node in depth-first traversal order.
    ///
    /// Returns `None` if no next node exists or if the current node is stale.
    /// This is a standard tree traversal that does not wrap around.
    pub fn next_depth_first(&self, current: NodeId) -> Option<NodeId> {
        if !self.is_alive(current) {
            return None;
        }
        if let Some(&first_child) = self.node(current).children.first() {
            return Some(first_child);
        }
        let mut node = current;
        while let Some(parent) = self.parent_of(node) {
            if let Some(next_sibling) = self.next_sibling(node) {
                return Some(next_sibling);
            }
            node = parent;
        }
        None
    }

    // --- internals ---

    /// Access a node; panics if `id` is stale.
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent_of(node)?;
        let siblings = &self.node(parent).children;
        let pos = siblings.iter().position(|&id| id == node)?;
        siblings.get(pos + 1).copied()
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.node(node).parent {
                Some(p) => node = p,
                None => return false,
            }
        }
    }

    /// Temporarily take a node's hooks out so they can borrow the tree mutably.
    ///
    /// Hooks registered on the node while `f` runs are appended afterwards. Returns `None`
    /// for stale ids.
    fn with_hooks<R>(&mut self, id: NodeId, f: impl FnOnce(&mut Hooks, &mut Self) -> R) -> Option<R> {
        let mut hooks = core::mem::take(&mut self.node_opt_mut(id)?.hooks);
        let out = f(&mut hooks, self);
        if let Some(n) = self.node_opt_mut(id) {
            let added = core::mem::replace(&mut n.hooks, hooks);
            n.hooks.absorb(added);
        }
        Some(out)
    }

    fn attach(&mut self, id: NodeId, parent: NodeId) {
        let z = self.node(id).z_index;
        let pos = {
            let siblings = &self.node(parent).children;
            siblings.partition_point(|c| self.node(*c).z_index <= z)
        };
        self.node_mut(parent).children.insert(pos, id);
        let parent_live = self.node(parent).live;
        let node = self.node_mut(id);
        node.parent = Some(parent);
        node.bound = false;
        let before = node.transform;
        self.propagate(id, before);
        if parent_live {
            self.make_live(id);
        }
        if self.is_alive(parent) && self.is_alive(id) {
            self.with_hooks(parent, |hooks, tree| hooks.run_child_added(tree, parent, id));
        }
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).parent else {
            return;
        };
        self.node_mut(parent).children.retain(|c| *c != id);
        self.with_hooks(parent, |hooks, tree| hooks.run_child_removed(tree, parent, id));
        if let Some(node) = self.node_opt_mut(id)
            && node.parent == Some(parent)
        {
            node.parent = None;
            let before = node.transform;
            self.set_subtree_dead(id);
            self.propagate(id, before);
        }
    }

    fn destroy(&mut self, id: NodeId) {
        let children = core::mem::take(&mut self.node_mut(id).children);
        for child in children {
            if self.is_alive(child) {
                self.destroy(child);
            }
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    fn make_live(&mut self, id: NodeId) {
        let mut to_load = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let node = self.node_mut(cur);
            node.live = true;
            if !node.loaded {
                node.loaded = true;
                to_load.push(cur);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        for cur in to_load {
            tracing::debug!(id = ?cur, "node loaded");
            self.with_hooks(cur, |hooks, tree| hooks.run_load(tree, cur));
        }
    }

    fn set_subtree_dead(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let node = self.node_mut(cur);
            node.live = false;
            stack.extend(node.children.iter().copied());
        }
    }

    /// Apply `f` to the node's transform (with the parent's size), then propagate.
    fn edit_transform(&mut self, id: NodeId, f: impl FnOnce(&mut Transform, Vec2)) {
        let Some(parent) = self.node_opt(id).map(|n| n.parent) else {
            return;
        };
        let parent_size = parent.map_or(Vec2::ZERO, |p| self.node(p).transform.size());
        let node = self.node_mut(id);
        let before = node.transform;
        f(&mut node.transform, parent_size);
        self.propagate(id, before);
    }

    /// Recompute derived transform values for `id` and all descendants, parents first,
    /// then notify transform listeners of every node whose values changed.
    ///
    /// A parent element is told when a child's size or local position changed, unless the
    /// parent's hooks are running (and therefore taken out) at the time.
    fn propagate(&mut self, id: NodeId, before: Transform) {
        let mut changed = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let parent_tf = self.node(cur).parent.map(|p| self.node(p).transform);
            let node = self.node_mut(cur);
            let prev = if cur == id { before } else { node.transform };
            node.transform.recompute(parent_tf.as_ref());
            if node.transform != prev {
                changed.push((cur, prev));
            }
            stack.extend(node.children.iter().rev().copied());
        }
        for (cur, prev) in changed {
            let Some(n) = self.node_opt_mut(cur) else {
                continue;
            };
            let tf = n.transform;
            if !n.hooks.transform.is_empty() {
                n.hooks.run_transform(cur, &tf);
            }
            let moved = tf.size() != prev.size() || tf.local_position() != prev.local_position();
            if let Some(parent) = n.parent
                && moved
                && self.node(parent).hooks.element.is_some()
            {
                self.with_hooks(parent, |hooks, tree| {
                    hooks.run_child_transform(tree, parent, cur);
                });
            }
        }
    }
}
