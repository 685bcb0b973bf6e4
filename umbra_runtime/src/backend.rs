// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Graphics context and drawing surface abstraction.

use std::thread::{self, ThreadId};

use kurbo::Vec2;
use umbra_scene::{Canvas, DrawOp, RecordingCanvas};

/// A context bind or unbind the backend refused.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// Another thread holds the context.
    #[error("graphics context is current on another thread")]
    Busy,
    /// The calling thread does not hold the context.
    #[error("graphics context is not current on this thread")]
    NotCurrent,
    /// The driver rejected the request.
    #[error("graphics backend refused the request: {0}")]
    Refused(String),
}

/// A graphics API binding with a single thread-affine context.
///
/// At most one thread may have the context current. A surface belongs to the binding that
/// created it and must be recreated after the context moves to another thread.
pub trait GraphicsBackend: Send + 'static {
    /// Drawing surface handed to the render traversal.
    type Surface: Canvas + Send;

    /// Bind the context to the calling thread.
    fn make_current(&mut self) -> Result<(), ContextError>;

    /// Unbind the context from the calling thread.
    fn make_none_current(&mut self) -> Result<(), ContextError>;

    /// Create a surface of `size` for the bound context.
    fn create_surface(&mut self, size: Vec2) -> Result<Self::Surface, ContextError>;

    /// Flush and present a finished frame.
    fn present(&mut self, surface: &mut Self::Surface) -> Result<(), ContextError>;
}

/// A backend that renders into [`RecordingCanvas`]es and enforces thread affinity.
///
/// Every call checks which thread holds the context, so handoff bugs surface as
/// [`ContextError`]s rather than silent corruption.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    holder: Option<ThreadId>,
    refuse_binds: bool,
    binds: usize,
    releases: usize,
    surfaces: usize,
    presents: usize,
    surface_size: Option<Vec2>,
    last_frame: Vec<DrawOp>,
}

impl HeadlessBackend {
    /// An unbound backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `make_current` calls fail.
    pub fn refuse_binds(&mut self, refuse: bool) {
        self.refuse_binds = refuse;
    }

    /// Thread currently holding the context.
    pub fn holder(&self) -> Option<ThreadId> {
        self.holder
    }

    /// Successful binds so far.
    pub fn binds(&self) -> usize {
        self.binds
    }

    /// Successful unbinds so far.
    pub fn releases(&self) -> usize {
        self.releases
    }

    /// Surfaces created so far.
    pub fn surfaces_created(&self) -> usize {
        self.surfaces
    }

    /// Frames presented so far.
    pub fn frames_presented(&self) -> usize {
        self.presents
    }

    /// Size of the most recent surface.
    pub fn surface_size(&self) -> Option<Vec2> {
        self.surface_size
    }

    /// Draw calls of the most recently presented frame.
    pub fn last_frame(&self) -> &[DrawOp] {
        &self.last_frame
    }

    fn ensure_current(&self) -> Result<(), ContextError> {
        if self.holder == Some(thread::current().id()) {
            Ok(())
        } else {
            Err(ContextError::NotCurrent)
        }
    }
}

impl GraphicsBackend for HeadlessBackend {
    type Surface = RecordingCanvas;

    fn make_current(&mut self) -> Result<(), ContextError> {
        let me = thread::current().id();
        match self.holder {
            Some(holder) if holder != me => return Err(ContextError::Busy),
            _ => {}
        }
        if self.refuse_binds {
            return Err(ContextError::Refused("binds disabled".into()));
        }
        self.holder = Some(me);
        self.binds += 1;
        Ok(())
    }

    fn make_none_current(&mut self) -> Result<(), ContextError> {
        self.ensure_current()?;
        self.holder = None;
        self.releases += 1;
        Ok(())
    }

    fn create_surface(&mut self, size: Vec2) -> Result<Self::Surface, ContextError> {
        self.ensure_current()?;
        self.surfaces += 1;
        self.surface_size = Some(size);
        Ok(RecordingCanvas::new(size.to_size()))
    }

    fn present(&mut self, surface: &mut Self::Surface) -> Result<(), ContextError> {
        self.ensure_current()?;
        self.last_frame.clear();
        self.last_frame.extend_from_slice(surface.ops());
        surface.reset();
        self.presents += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_scene::Color;

    #[test]
    fn context_is_thread_affine() {
        let mut backend = HeadlessBackend::new();
        assert_eq!(
            backend.create_surface(Vec2::new(1.0, 1.0)).unwrap_err(),
            ContextError::NotCurrent
        );
        backend.make_current().unwrap();
        assert_eq!(backend.holder(), Some(thread::current().id()));

        let backend = thread::spawn(move || {
            let mut backend = backend;
            assert_eq!(backend.make_current(), Err(ContextError::Busy));
            assert_eq!(backend.make_none_current(), Err(ContextError::NotCurrent));
            backend
        })
        .join()
        .unwrap();
        assert_eq!(backend.binds(), 1);
        assert_eq!(backend.releases(), 0);
    }

    #[test]
    fn present_snapshots_and_resets() {
        let mut backend = HeadlessBackend::new();
        backend.make_current().unwrap();
        let mut surface = backend.create_surface(Vec2::new(8.0, 8.0)).unwrap();
        surface.clear(Color::BLACK);
        backend.present(&mut surface).unwrap();
        assert_eq!(backend.last_frame(), &[DrawOp::Clear(Color::BLACK)]);
        assert!(surface.ops().is_empty());
        assert_eq!(backend.frames_presented(), 1);
        assert_eq!(backend.surface_size(), Some(Vec2::new(8.0, 8.0)));
    }

    #[test]
    fn refused_binds_leave_context_free() {
        let mut backend = HeadlessBackend::new();
        backend.refuse_binds(true);
        assert!(matches!(backend.make_current(), Err(ContextError::Refused(_))));
        assert_eq!(backend.holder(), None);
    }
}
