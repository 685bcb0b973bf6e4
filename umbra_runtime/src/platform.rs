// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The boundary between the windowing layer and the core.

use std::sync::mpsc;

use kurbo::{Point, Vec2};
use umbra_input::Key;
use umbra_scene::MouseButton;

/// Window services the core calls into.
pub trait PlatformHandler: Send {
    /// Current window size.
    fn size(&self) -> Vec2;

    /// Set the window title.
    fn set_title(&mut self, title: &str) {
        let _ = title;
    }

    /// Request that the window close.
    fn close(&mut self) {}
}

/// A window that does not exist.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeadlessHandler {
    size: Vec2,
    title: String,
    closed: bool,
}

impl HeadlessHandler {
    /// A handler reporting `size`.
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Last title set.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Whether `close` was requested.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl PlatformHandler for HeadlessHandler {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn set_title(&mut self, title: &str) {
        title.clone_into(&mut self.title);
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// Input and window notifications, applied at the start of the next update tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlatformEvent {
    /// The window was resized.
    Resize(Vec2),
    /// A key went down.
    KeyDown(Key),
    /// A key went up.
    KeyUp(Key),
    /// A mouse button went down.
    MouseDown(MouseButton),
    /// A mouse button went up.
    MouseUp(MouseButton),
    /// The pointer moved, in window coordinates.
    MouseMove(Point),
}

/// Sending half of an application's event queue.
///
/// Cheap to clone and usable from any thread. Events sent after the application is dropped
/// are discarded.
#[derive(Clone, Debug)]
pub struct PlatformEvents {
    tx: mpsc::Sender<PlatformEvent>,
}

impl PlatformEvents {
    pub(crate) fn new(tx: mpsc::Sender<PlatformEvent>) -> Self {
        Self { tx }
    }

    /// Enqueue `event`.
    pub fn send(&self, event: PlatformEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!(?event, "application gone, dropping event");
        }
    }

    /// Resize the scene root.
    ///
    /// This does not touch the drawing surface; platforms that own one should call
    /// [`DualLoop::resize`](crate::DualLoop::resize) instead.
    pub fn resize(&self, width: f64, height: f64) {
        self.send(PlatformEvent::Resize(Vec2::new(width, height)));
    }

    /// A key went down.
    pub fn key_down(&self, key: Key) {
        self.send(PlatformEvent::KeyDown(key));
    }

    /// A key went up.
    pub fn key_up(&self, key: Key) {
        self.send(PlatformEvent::KeyUp(key));
    }

    /// A mouse button went down.
    pub fn mouse_down(&self, button: MouseButton) {
        self.send(PlatformEvent::MouseDown(button));
    }

    /// A mouse button went up.
    pub fn mouse_up(&self, button: MouseButton) {
        self.send(PlatformEvent::MouseUp(button));
    }

    /// The pointer moved.
    pub fn mouse_move(&self, position: Point) {
        self.send(PlatformEvent::MouseMove(position));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_records_requests() {
        let mut handler = HeadlessHandler::new(Vec2::new(640.0, 480.0));
        handler.set_title("demo");
        handler.close();
        assert_eq!(handler.size(), Vec2::new(640.0, 480.0));
        assert_eq!(handler.title(), "demo");
        assert!(handler.is_closed());
    }

    #[test]
    fn events_queue_in_order() {
        let (tx, rx) = mpsc::channel();
        let events = PlatformEvents::new(tx);
        let other = events.clone();
        events.key_down(Key(1));
        other.mouse_move(Point::new(2.0, 3.0));
        events.resize(4.0, 5.0);
        let got: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            got,
            [
                PlatformEvent::KeyDown(Key(1)),
                PlatformEvent::MouseMove(Point::new(2.0, 3.0)),
                PlatformEvent::Resize(Vec2::new(4.0, 5.0)),
            ]
        );
    }

    #[test]
    fn sending_after_drop_is_silent() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        PlatformEvents::new(tx).key_up(Key(9));
    }
}
