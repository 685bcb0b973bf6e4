// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The state owned by the update loop.

use std::sync::mpsc;

use kurbo::Vec2;
use umbra_animation::AnimationScheduler;
use umbra_input::{InputDispatcher, InputState, Key};
use umbra_scene::{DisplayList, LocalNode, NodeFlags, NodeId, Transform, Tree};

use crate::{PlatformEvent, PlatformEvents, PlatformHandler, TimeContext};

type KeyListener = Box<dyn FnMut(&mut Tree, Key) + Send>;

/// A scene tree bound to a window, plus everything the update tick drives.
///
/// The root node is created live and sized to the platform window. Platform input arrives
/// through [`Application::events`] and is applied at the start of the next
/// [`Application::update_tick`], never in the middle of a traversal.
///
/// ```
/// use kurbo::Vec2;
/// use umbra_runtime::{Application, HeadlessHandler};
/// use umbra_scene::{LocalNode, Transform};
///
/// let mut app = Application::new(HeadlessHandler::new(Vec2::new(300.0, 300.0)));
/// let child = app.insert(LocalNode::new(
///     Transform::new().with_scale_width(true).with_size(Vec2::new(0.0, 20.0)),
/// ));
/// assert!(app.tree().is_loaded(child));
///
/// app.events().resize(500.0, 400.0);
/// app.update_tick(1.0 / 60.0);
/// assert_eq!(app.tree().transform(child).unwrap().size().x, 500.0);
/// ```
pub struct Application {
    tree: Tree,
    root: NodeId,
    animations: AnimationScheduler<Tree>,
    dispatcher: InputDispatcher,
    input: InputState,
    time: TimeContext,
    handler: Box<dyn PlatformHandler>,
    events_tx: mpsc::Sender<PlatformEvent>,
    events_rx: mpsc::Receiver<PlatformEvent>,
    key_down: Vec<KeyListener>,
    key_up: Vec<KeyListener>,
}

impl core::fmt::Debug for Application {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Application")
            .field("tree", &self.tree)
            .field("root", &self.root)
            .field("animations", &self.animations)
            .field("dispatcher", &self.dispatcher)
            .field("input", &self.input)
            .field("time", &self.time)
            .finish_non_exhaustive()
    }
}

impl Application {
    /// An application with an empty live root sized to `handler`.
    ///
    /// The root is visible but not interactive, so it never takes pointer input itself.
    pub fn new(handler: impl PlatformHandler + 'static) -> Self {
        let mut tree = Tree::new();
        let root = tree.insert(
            None,
            LocalNode::new(Transform::new().with_size(handler.size()))
                .with_flags(NodeFlags::VISIBLE),
        );
        tree.bind_root(root);
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            tree,
            root,
            animations: AnimationScheduler::new(),
            dispatcher: InputDispatcher::new(),
            input: InputState::new(),
            time: TimeContext::new(),
            handler: Box::new(handler),
            events_tx,
            events_rx,
            key_down: Vec::new(),
            key_up: Vec::new(),
        }
    }

    /// The scene tree.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// The scene tree, mutably.
    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    /// The bound root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Insert `local` under the root.
    pub fn insert(&mut self, local: LocalNode) -> NodeId {
        self.tree.insert_child(self.root, local)
    }

    /// Animations advanced each tick with the tree as context.
    pub fn animations(&self) -> &AnimationScheduler<Tree> {
        &self.animations
    }

    /// Animations, mutably.
    pub fn animations_mut(&mut self) -> &mut AnimationScheduler<Tree> {
        &mut self.animations
    }

    /// Hover and press state.
    pub fn dispatcher(&self) -> &InputDispatcher {
        &self.dispatcher
    }

    /// Keyboard and button state for the current tick.
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Update clock.
    pub fn time(&self) -> &TimeContext {
        &self.time
    }

    /// Update clock, mutably (for `time_scale`).
    pub fn time_mut(&mut self) -> &mut TimeContext {
        &mut self.time
    }

    /// A handle for enqueuing platform events.
    pub fn events(&self) -> PlatformEvents {
        PlatformEvents::new(self.events_tx.clone())
    }

    /// Current window size, as reported by the platform.
    pub fn window_size(&self) -> Vec2 {
        self.handler.size()
    }

    /// Set the window title.
    pub fn set_title(&mut self, title: &str) {
        self.handler.set_title(title);
    }

    /// Ask the platform to close the window.
    pub fn close(&mut self) {
        tracing::info!("close requested");
        self.handler.close();
    }

    /// Run `f` when a key goes down.
    pub fn on_key_down(&mut self, f: impl FnMut(&mut Tree, Key) + Send + 'static) {
        self.key_down.push(Box::new(f));
    }

    /// Run `f` when a key goes up.
    pub fn on_key_up(&mut self, f: impl FnMut(&mut Tree, Key) + Send + 'static) {
        self.key_up.push(Box::new(f));
    }

    /// One update tick.
    ///
    /// Queued platform events are applied first, then animations advance, then the tree's
    /// update traversal runs, then hover and capture are re-evaluated against the last
    /// pointer position. Finished animations are dropped and the per-tick keyboard
    /// transitions are cleared last.
    pub fn update_tick(&mut self, dt: f64) {
        self.time.advance(dt);
        self.drain_events();

        let delta = self.time.delta();
        self.animations.update(&mut self.tree, delta);
        self.animations.remove_finished();
        self.tree.update(self.root);
        self.dispatcher.refresh(&mut self.tree, self.root);

        self.input.end_tick();
    }

    /// Snapshot the visible tree for rendering.
    pub fn record_frame(&self) -> DisplayList {
        DisplayList::record(&self.tree, self.root)
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: PlatformEvent) {
        tracing::trace!(?event, "platform event");
        match event {
            PlatformEvent::Resize(size) => {
                self.tree.set_size(self.root, size);
                self.tree.resize(self.root, size);
            }
            PlatformEvent::KeyDown(key) => {
                self.input.key_down(key);
                for f in &mut self.key_down {
                    f(&mut self.tree, key);
                }
            }
            PlatformEvent::KeyUp(key) => {
                self.input.key_up(key);
                for f in &mut self.key_up {
                    f(&mut self.tree, key);
                }
            }
            PlatformEvent::MouseDown(button) => {
                self.input.button_down(button);
                self.dispatcher
                    .button_down(&mut self.tree, self.root, button);
            }
            PlatformEvent::MouseUp(button) => {
                self.input.button_up(button);
                self.dispatcher.button_up(&mut self.tree, self.root, button);
            }
            PlatformEvent::MouseMove(position) => {
                self.dispatcher
                    .pointer_moved(&mut self.tree, self.root, position);
            }
        }
    }
}
