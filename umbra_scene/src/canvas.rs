// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drawing surface interface consumed by the render traversal.

use alloc::vec::Vec;
use kurbo::{Affine, Point, Rect, Size, Vec2};

use crate::util::transform_rect_bbox;

/// Straight-alpha RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// An opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// A color with alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// A 2D drawing surface with a save/restore matrix stack and a device clip.
///
/// Matrix operations pre-concatenate, so a later `translate` happens in the space set up by
/// earlier calls.
pub trait Canvas {
    /// Push the current state; returns the save count before the push.
    fn save(&mut self) -> usize;
    /// Pop states until the save count equals `count`.
    fn restore_to_count(&mut self, count: usize);
    /// Rotate by `degrees` around `center` (in current coordinates).
    fn rotate_degrees(&mut self, degrees: f64, center: Point);
    /// Translate by `offset`.
    fn translate(&mut self, offset: Vec2);
    /// The current matrix.
    fn transform(&self) -> Affine;
    /// Whether `rect` (in current coordinates) lies entirely outside the clip.
    fn quick_reject(&self, rect: Rect) -> bool;
    /// Fill the whole surface.
    fn clear(&mut self, color: Color);
    /// Fill `rect` (in current coordinates).
    fn fill_rect(&mut self, rect: Rect, color: Color);
}

/// One call recorded by a [`RecordingCanvas`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawOp {
    /// A `clear`.
    Clear(Color),
    /// A `fill_rect`, with the matrix that was current.
    FillRect {
        /// Local rectangle.
        rect: Rect,
        /// Fill color.
        color: Color,
        /// Canvas matrix at the time of the call.
        transform: Affine,
    },
}

/// An in-memory [`Canvas`] that records draw calls.
///
/// The clip is the viewport rectangle `(0, 0, size)`.
///
/// ```rust
/// use kurbo::{Point, Rect, Size, Vec2};
/// use umbra_scene::{Canvas, Color, RecordingCanvas};
///
/// let mut canvas = RecordingCanvas::new(Size::new(100.0, 100.0));
/// let saved = canvas.save();
/// canvas.translate(Vec2::new(150.0, 0.0));
/// assert!(canvas.quick_reject(Rect::new(0.0, 0.0, 10.0, 10.0)));
/// canvas.restore_to_count(saved);
/// canvas.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::BLACK);
/// assert_eq!(canvas.ops().len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct RecordingCanvas {
    size: Size,
    current: Affine,
    stack: Vec<Affine>,
    ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    /// A canvas whose clip covers `size`.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            current: Affine::IDENTITY,
            stack: Vec::new(),
            ops: Vec::new(),
        }
    }

    /// Surface size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Recorded calls, oldest first.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Number of unrestored saves.
    pub fn save_count(&self) -> usize {
        self.stack.len()
    }

    /// Forget recorded calls and reset the matrix stack.
    pub fn reset(&mut self) {
        self.current = Affine::IDENTITY;
        self.stack.clear();
        self.ops.clear();
    }
}

impl Canvas for RecordingCanvas {
    fn save(&mut self) -> usize {
        let count = self.stack.len();
        self.stack.push(self.current);
        count
    }

    fn restore_to_count(&mut self, count: usize) {
        if let Some(&saved) = self.stack.get(count) {
            self.current = saved;
            self.stack.truncate(count);
        }
    }

    fn rotate_degrees(&mut self, degrees: f64, center: Point) {
        self.current *= Affine::rotate_about(degrees.to_radians(), center);
    }

    fn translate(&mut self, offset: Vec2) {
        self.current *= Affine::translate(offset);
    }

    fn transform(&self) -> Affine {
        self.current
    }

    fn quick_reject(&self, rect: Rect) -> bool {
        let clip = Rect::from_origin_size(Point::ORIGIN, self.size);
        let visible = transform_rect_bbox(self.current, rect).intersect(clip);
        visible.width() <= 0.0 || visible.height() <= 0.0
    }

    fn clear(&mut self, color: Color) {
        self.ops.push(DrawOp::Clear(color));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(DrawOp::FillRect {
            rect,
            color,
            transform: self.current,
        });
    }
}
