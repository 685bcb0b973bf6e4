// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end scenarios for the loop scheduler, run against the headless backend.

use std::thread;
use std::time::{Duration, Instant};

use kurbo::{Point, Vec2};
use umbra_input::Key;
use umbra_runtime::{
    Application, ContextError, DualLoop, HeadlessBackend, HeadlessHandler, LoopConfig, LoopError,
    Threading,
};
use umbra_scene::{Canvas, Color, DrawOp, LocalNode, MouseButton, Transform};

fn wait_until(mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    false
}

fn fill(canvas: &mut dyn Canvas, size: Vec2) {
    canvas.fill_rect(size.to_size().to_rect(), Color::WHITE);
}

fn fills(ops: &[DrawOp]) -> usize {
    ops.iter()
        .filter(|op| matches!(op, DrawOp::FillRect { .. }))
        .count()
}

fn centered_box_app() -> (Application, umbra_scene::NodeId, umbra_scene::NodeId) {
    let mut app = Application::new(HeadlessHandler::new(Vec2::new(300.0, 300.0)));
    let b = app.insert(
        LocalNode::new(
            Transform::new()
                .with_size(Vec2::new(100.0, 100.0))
                .with_anchor_position(Vec2::new(0.5, 0.5))
                .with_offset_position(Vec2::new(0.5, 0.5)),
        )
        .with_drawable(fill),
    );
    let c = app.tree_mut().insert_child(
        b,
        LocalNode::new(
            Transform::new()
                .with_scale_width(true)
                .with_size(Vec2::new(0.0, 50.0)),
        )
        .with_drawable(fill),
    );
    (app, b, c)
}

#[test]
fn centered_box_scenario_inline() {
    let (app, b, c) = centered_box_app();
    let config = LoopConfig::new().with_threading(Threading::Single);
    let mut runner = DualLoop::new(app, HeadlessBackend::new(), config);
    runner.start().unwrap();
    runner.frame(1.0 / 60.0).unwrap();

    let app = runner.app_mut().unwrap();
    assert!(app.tree().is_loaded(b));
    assert!(app.tree().is_loaded(c));
    assert_eq!(
        app.tree().transform(b).unwrap().world_position(),
        Vec2::new(100.0, 100.0)
    );

    app.tree_mut().set_size(b, Vec2::new(200.0, 200.0));
    assert_eq!(app.tree().transform(c).unwrap().size().x, 200.0);
    assert_eq!(
        app.tree().transform(b).unwrap().world_position(),
        Vec2::new(50.0, 50.0)
    );

    runner.frame(1.0 / 60.0).unwrap();
    runner.with_backend(|backend| {
        assert_eq!(backend.frames_presented(), 2);
        assert_eq!(backend.last_frame()[0], DrawOp::Clear(Color::BLACK));
        assert_eq!(fills(backend.last_frame()), 2);
        assert_eq!(backend.holder(), Some(thread::current().id()));
    });

    let app = runner.shutdown().unwrap();
    assert!(app.tree().is_alive(c));
}

#[test]
fn threaded_loops_render_off_the_calling_thread() {
    let (app, _, _) = centered_box_app();
    let mut runner = DualLoop::new(app, HeadlessBackend::new(), LoopConfig::new());
    runner.start().unwrap();
    assert!(runner.is_threaded());
    assert!(runner.app().is_none());

    assert!(wait_until(|| runner.with_backend(|b| fills(b.last_frame()) == 2)));
    let me = thread::current().id();
    runner.with_backend(|backend| {
        assert!(backend.holder().is_some());
        assert_ne!(backend.holder(), Some(me));
    });

    let app = runner.shutdown().unwrap();
    assert!(app.time().raw_time() > 0.0);
}

#[test]
fn switching_modes_moves_the_context() {
    let (app, _, _) = centered_box_app();
    let config = LoopConfig::new().with_threading(Threading::Single);
    let mut runner = DualLoop::new(app, HeadlessBackend::new(), config);
    runner.start().unwrap();
    let me = thread::current().id();
    assert_eq!(runner.with_backend(|b| b.holder()), Some(me));

    runner.set_multithreaded(true).unwrap();
    assert!(runner.is_threaded());
    assert!(wait_until(|| runner.with_backend(|b| b.frames_presented() > 0)));
    assert_ne!(runner.with_backend(|b| b.holder()), Some(me));

    runner.set_multithreaded(false).unwrap();
    assert!(!runner.is_threaded());
    runner.with_backend(|backend| {
        assert_eq!(backend.holder(), Some(me));
        // Inline, then the render thread, then inline again.
        assert_eq!(backend.binds(), 3);
        assert_eq!(backend.releases(), 2);
        // A new surface accompanies every bind.
        assert_eq!(backend.surfaces_created(), 3);
    });
    runner.frame(0.01).unwrap();

    runner.shutdown().unwrap();
}

#[test]
fn refused_bind_is_fatal_and_keeps_the_app() {
    let (app, _, _) = centered_box_app();
    let mut runner = DualLoop::new(app, HeadlessBackend::new(), LoopConfig::new());
    runner.with_backend(|b| b.refuse_binds(true));

    let err = runner.start().unwrap_err();
    assert!(matches!(err, LoopError::Context(ContextError::Refused(_))));
    assert!(!runner.is_threaded());
    assert!(runner.app().is_some());
    assert_eq!(runner.with_backend(|b| b.holder()), None);

    // Once the backend cooperates, starting again succeeds.
    runner.with_backend(|b| b.refuse_binds(false));
    runner.set_multithreaded(false).unwrap();
    runner.start().unwrap();
    runner.frame(0.01).unwrap();
    assert_eq!(runner.with_backend(|b| b.frames_presented()), 1);
}

#[test]
fn threaded_resize_rebuilds_surface_on_render_thread() {
    let (app, _, _) = centered_box_app();
    let mut runner = DualLoop::new(app, HeadlessBackend::new(), LoopConfig::new());
    runner.start().unwrap();
    assert!(wait_until(|| runner.with_backend(|b| b.frames_presented() > 0)));

    runner.resize(Vec2::new(640.0, 480.0)).unwrap();
    assert!(wait_until(|| runner.with_backend(|b| {
        b.surface_size() == Some(Vec2::new(640.0, 480.0))
    })));

    let mut app = runner.shutdown().unwrap();
    // The update thread may have stopped before seeing the event; it stays queued.
    app.update_tick(0.0);
    let root = app.root();
    assert_eq!(
        app.tree().transform(root).unwrap().size(),
        Vec2::new(640.0, 480.0)
    );
}

#[test]
fn inline_resize_applies_immediately() {
    let (app, b, _) = centered_box_app();
    let config = LoopConfig::new().with_threading(Threading::Single);
    let mut runner = DualLoop::new(app, HeadlessBackend::new(), config);
    runner.start().unwrap();

    runner.resize(Vec2::new(500.0, 500.0)).unwrap();
    assert_eq!(
        runner.with_backend(|b| b.surface_size()),
        Some(Vec2::new(500.0, 500.0))
    );
    // The scene follows at the next tick.
    runner.frame(0.0).unwrap();
    let tree = runner.app().unwrap().tree();
    assert_eq!(
        tree.transform(b).unwrap().world_position(),
        Vec2::new(200.0, 200.0)
    );
}

#[test]
fn input_crosses_threads() {
    let (mut app, b, _) = centered_box_app();
    app.on_key_down(move |tree, key| {
        if key == Key(32) {
            tree.set_local_rotation(b, 45.0);
        }
    });
    let mut runner = DualLoop::new(app, HeadlessBackend::new(), LoopConfig::new());
    let events = runner.events();
    runner.start().unwrap();

    // Sent from another thread while the loops run.
    thread::spawn(move || {
        events.mouse_move(Point::new(150.0, 175.0));
        events.mouse_down(MouseButton::Left);
        events.key_down(Key(32));
    })
    .join()
    .unwrap();

    let mut app = runner.shutdown().unwrap();
    // Whatever the update thread did not get to is applied here.
    app.update_tick(0.0);
    assert_eq!(app.tree().transform(b).unwrap().local_rotation(), 45.0);
    assert!(app.input().is_key_held(Key(32)));
    assert_eq!(app.dispatcher().pressed(MouseButton::Left).first(), Some(&b));
}

#[test]
fn frequencies_are_clamped() {
    let (app, _, _) = centered_box_app();
    let runner = DualLoop::new(app, HeadlessBackend::new(), LoopConfig::new());
    runner.set_update_frequency(0.25);
    runner.set_render_frequency(30.0);
    assert_eq!(runner.update_frequency(), 1.0);
    assert_eq!(runner.render_frequency(), 30.0);
}

#[test]
fn dropping_a_running_loop_joins_its_threads() {
    let (app, _, _) = centered_box_app();
    let mut runner = DualLoop::new(app, HeadlessBackend::new(), LoopConfig::new());
    runner.start().unwrap();
    drop(runner);
}
