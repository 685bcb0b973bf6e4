// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless run of a small scene: a centered panel with a spinning badge and a draggable
//! handle, driven first inline and then on worker threads.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p umbra_demos --example headless`

use std::thread;
use std::time::Duration;

use kurbo::{Point, Vec2};
use tracing_subscriber::EnvFilter;
use umbra_animation::{Animation, LoopMode};
use umbra_input::{Draggable, Key};
use umbra_runtime::{
    Application, DualLoop, HeadlessBackend, HeadlessHandler, LoopConfig, LoopError, Threading,
};
use umbra_scene::{Canvas, Color, DrawOp, LocalNode, MouseButton, Transform, Tree};

fn paint_panel(canvas: &mut dyn Canvas, size: Vec2) {
    canvas.fill_rect(size.to_size().to_rect(), Color::rgb(40, 40, 48));
}

fn paint_badge(canvas: &mut dyn Canvas, size: Vec2) {
    canvas.fill_rect(size.to_size().to_rect(), Color::rgb(220, 90, 60));
}

fn paint_handle(canvas: &mut dyn Canvas, size: Vec2) {
    canvas.fill_rect(size.to_size().to_rect(), Color::WHITE);
}

fn main() -> Result<(), LoopError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut app = Application::new(HeadlessHandler::new(Vec2::new(800.0, 600.0)));
    app.set_title("umbra headless");

    let panel = app.insert(
        LocalNode::new(
            Transform::new()
                .with_anchor_position(Vec2::new(0.5, 0.5))
                .with_offset_position(Vec2::new(0.5, 0.5))
                .with_size(Vec2::new(400.0, 300.0)),
        )
        .with_drawable(paint_panel),
    );
    let badge = app.tree_mut().insert_child(
        panel,
        LocalNode::new(
            Transform::new()
                .with_size(Vec2::new(40.0, 40.0))
                .with_local_position(Vec2::new(20.0, 20.0))
                .with_rotation_offset(Vec2::new(0.5, 0.5)),
        )
        .with_z_index(1)
        .with_drawable(paint_badge),
    );
    let handle = app.tree_mut().insert_child(
        panel,
        LocalNode::new(
            Transform::new()
                .with_scale_width(true)
                .with_local_size_offset(Vec2::new(-40.0, 0.0))
                .with_size(Vec2::new(0.0, 24.0))
                .with_anchor_position(Vec2::new(0.5, 1.0))
                .with_offset_position(Vec2::new(0.5, 1.0)),
        )
        .with_drawable(paint_handle)
        .with_element(Draggable::new(MouseButton::Left)),
    );

    app.animations_mut().add(
        "spin",
        Animation::new(2.0)
            .with_loop_mode(LoopMode::Forward)
            .on_update(move |tree: &mut Tree, t| tree.set_local_rotation(badge, t * 360.0)),
    );
    app.animations_mut().add(
        "breathe",
        Animation::new(1.0)
            .with_loop_mode(LoopMode::Mirror)
            .with_easing(|t| t * t)
            .on_update(move |tree: &mut Tree, t| {
                tree.set_size(panel, Vec2::new(400.0 + 40.0 * t, 300.0));
            }),
    );
    app.on_key_down(move |tree, key| {
        if key == Key(27) {
            tree.set_local_rotation(badge, 0.0);
        }
    });

    let config = LoopConfig::new()
        .with_update_frequency(120.0)
        .with_render_frequency(60.0)
        .with_threading(Threading::Single);
    let mut runner = DualLoop::new(app, HeadlessBackend::new(), config);
    runner.start()?;

    // Inline: grab the handle and drag it 50 units to the right.
    let events = runner.events();
    let grab = Point::new(400.0, 430.0);
    events.mouse_move(grab);
    events.mouse_down(MouseButton::Left);
    for step in 1..=5 {
        events.mouse_move(grab + Vec2::new(10.0 * f64::from(step), 0.0));
        runner.frame(1.0 / 60.0)?;
    }
    events.mouse_up(MouseButton::Left);
    runner.frame(1.0 / 60.0)?;

    if let Some(app) = runner.app() {
        let handle_pos = app.tree().transform(handle).map(|t| t.world_position());
        tracing::info!(?handle_pos, "handle after drag");
    }

    // Threaded: let the loops run for a moment, then resize the window.
    runner.set_multithreaded(true)?;
    thread::sleep(Duration::from_millis(100));
    runner.resize(Vec2::new(1024.0, 768.0))?;
    events.key_down(Key(27));
    thread::sleep(Duration::from_millis(100));

    let presented = runner.with_backend(|b| {
        let fills = b
            .last_frame()
            .iter()
            .filter(|op| matches!(op, DrawOp::FillRect { .. }))
            .count();
        (b.frames_presented(), fills, b.surface_size())
    });
    tracing::info!(
        frames = presented.0,
        fills = presented.1,
        surface = ?presented.2,
        "render thread output"
    );

    let app = runner.shutdown()?;
    tracing::info!(
        update_time = app.time().raw_time(),
        panel = ?app.tree().transform(panel).map(|t| t.size()),
        "stopped"
    );
    Ok(())
}
