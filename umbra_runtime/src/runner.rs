// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Update and render loops with graphics context handoff.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, mpsc};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use kurbo::Vec2;
use umbra_scene::{Canvas, Color, DisplayList};

use crate::config::clamp_frequency;
use crate::{
    Application, ContextError, GraphicsBackend, LoopConfig, LoopError, PlatformEvents,
    Threading, TimeContext,
};

/// Everything guarded by the render lock: the backend, its surface, and the surface size.
struct RenderState<G: GraphicsBackend> {
    backend: G,
    surface: Option<G::Surface>,
    size: Vec2,
    pending_size: Option<Vec2>,
    time: TimeContext,
}

impl<G: GraphicsBackend> RenderState<G> {
    /// Bind the context to the calling thread and build a fresh surface for it.
    fn acquire(&mut self) -> Result<(), ContextError> {
        self.backend.make_current()?;
        self.pending_size = None;
        match self.backend.create_surface(self.size) {
            Ok(surface) => {
                self.surface = Some(surface);
                Ok(())
            }
            Err(err) => {
                // Leave the context free so a later acquire on any thread can proceed.
                let _ = self.backend.make_none_current();
                Err(err)
            }
        }
    }

    /// Drop the surface and unbind the context from the calling thread.
    fn release(&mut self) -> Result<(), ContextError> {
        self.surface = None;
        self.backend.make_none_current()
    }

    fn render(&mut self, frame: &DisplayList) -> Result<(), ContextError> {
        if let Some(size) = self.pending_size.take() {
            tracing::debug!(?size, "recreating surface");
            self.surface = Some(self.backend.create_surface(size)?);
        }
        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };
        let base = surface.save();
        surface.clear(Color::BLACK);
        frame.replay(surface);
        surface.restore_to_count(base);
        self.backend.present(surface)
    }
}

struct Shared<G: GraphicsBackend> {
    render: Mutex<RenderState<G>>,
    frame: Mutex<Option<DisplayList>>,
    running: AtomicBool,
    update_hz: AtomicU64,
    render_hz: AtomicU64,
}

impl<G: GraphicsBackend> Shared<G> {
    fn lock_render(&self) -> MutexGuard<'_, RenderState<G>> {
        self.render.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, frame: DisplayList) {
        *self.frame.lock().unwrap_or_else(PoisonError::into_inner) = Some(frame);
    }

    fn take_frame(&self) -> Option<DisplayList> {
        self.frame
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

fn load_hz(cell: &AtomicU64) -> f64 {
    f64::from_bits(cell.load(Ordering::Relaxed))
}

/// Sleep out the rest of one period that started at `start`.
///
/// Parking lets [`DualLoop`] wake the loop early when it stops.
fn pace(hz: f64, start: Instant) {
    let period = Duration::from_secs_f64(1.0 / hz);
    if let Some(rest) = period.checked_sub(start.elapsed()) {
        thread::park_timeout(rest);
    }
}

struct Workers {
    update: JoinHandle<Option<Application>>,
    render: JoinHandle<Result<(), ContextError>>,
}

enum LoopState {
    /// Not started; the context is not held by anyone.
    Stopped(Application),
    /// Single-threaded; the thread driving [`DualLoop::frame`] holds the context.
    Inline(Application),
    /// Worker threads own the application and the context.
    Threaded(Workers),
    /// The application was lost to a panic, or was handed back.
    Gone,
}

/// Drives an [`Application`] with an update loop and a render loop.
///
/// In [`Threading::Multi`] the loops run on two named threads at their own rates: the update
/// thread owns the application and publishes a [`DisplayList`] after each tick, the render
/// thread holds the graphics context and paints the newest list. In [`Threading::Single`]
/// both ticks run inline from [`DualLoop::frame`], called by the platform's frame callback.
///
/// Surface creation, resizing and whole-frame rendering all happen under one render lock,
/// so a platform resize can never race a frame in flight. Switching modes releases the
/// context on its current thread before binding it on the next one.
///
/// ```
/// use kurbo::Vec2;
/// use umbra_runtime::{Application, DualLoop, HeadlessBackend, HeadlessHandler, LoopConfig, Threading};
///
/// let app = Application::new(HeadlessHandler::new(Vec2::new(64.0, 64.0)));
/// let config = LoopConfig::new().with_threading(Threading::Single);
/// let mut runner = DualLoop::new(app, HeadlessBackend::new(), config);
/// runner.start().unwrap();
/// runner.frame(1.0 / 60.0).unwrap();
/// assert_eq!(runner.with_backend(|b| b.frames_presented()), 1);
/// let app = runner.shutdown().unwrap();
/// assert!(app.time().time() > 0.0);
/// ```
pub struct DualLoop<G: GraphicsBackend> {
    shared: Arc<Shared<G>>,
    events: PlatformEvents,
    threading: Threading,
    state: LoopState,
}

impl<G: GraphicsBackend> core::fmt::Debug for DualLoop<G> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = match &self.state {
            LoopState::Stopped(_) => "stopped",
            LoopState::Inline(_) => "inline",
            LoopState::Threaded(_) => "threaded",
            LoopState::Gone => "gone",
        };
        f.debug_struct("DualLoop")
            .field("threading", &self.threading)
            .field("state", &state)
            .field("update_frequency", &self.update_frequency())
            .field("render_frequency", &self.render_frequency())
            .finish_non_exhaustive()
    }
}

impl<G: GraphicsBackend> DualLoop<G> {
    /// A stopped loop. Nothing binds the context until [`DualLoop::start`].
    pub fn new(app: Application, backend: G, config: LoopConfig) -> Self {
        let events = app.events();
        let size = app.window_size();
        let shared = Arc::new(Shared {
            render: Mutex::new(RenderState {
                backend,
                surface: None,
                size,
                pending_size: None,
                time: TimeContext::new(),
            }),
            frame: Mutex::new(None),
            running: AtomicBool::new(false),
            update_hz: AtomicU64::new(config.update_frequency().to_bits()),
            render_hz: AtomicU64::new(config.render_frequency().to_bits()),
        });
        Self {
            shared,
            events,
            threading: config.threading(),
            state: LoopState::Stopped(app),
        }
    }

    /// Bind the context and start ticking in the configured mode. A running loop is left
    /// alone.
    pub fn start(&mut self) -> Result<(), LoopError> {
        if !matches!(self.state, LoopState::Stopped(_)) {
            return Ok(());
        }
        let LoopState::Stopped(app) = core::mem::replace(&mut self.state, LoopState::Gone) else {
            return Ok(());
        };
        match self.threading {
            Threading::Single => self.start_inline(app),
            Threading::Multi => self.spawn_workers(app),
        }
    }

    /// One inline update tick of `dt` seconds followed by one render tick.
    ///
    /// Does nothing unless the loop runs single-threaded.
    pub fn frame(&mut self, dt: f64) -> Result<(), LoopError> {
        let LoopState::Inline(app) = &mut self.state else {
            return Ok(());
        };
        app.update_tick(dt);
        let frame = app.record_frame();
        let mut render = self.shared.lock_render();
        render.time.advance(dt);
        render.render(&frame)?;
        Ok(())
    }

    /// The platform resize callback.
    ///
    /// The new surface size is recorded under the render lock. Single-threaded, the surface
    /// is rebuilt immediately; threaded, the render thread rebuilds it before its next frame.
    /// The scene root is resized at the next update tick either way.
    pub fn resize(&mut self, size: Vec2) -> Result<(), LoopError> {
        {
            let mut render = self.shared.lock_render();
            render.size = size;
            match self.state {
                LoopState::Inline(_) => {
                    render.pending_size = None;
                    let surface = render.backend.create_surface(size)?;
                    render.surface = Some(surface);
                }
                LoopState::Threaded(_) => render.pending_size = Some(size),
                LoopState::Stopped(_) | LoopState::Gone => {}
            }
        }
        self.events.resize(size.x, size.y);
        Ok(())
    }

    /// Switch between inline and threaded ticking.
    ///
    /// Any failure to move the context is returned immediately and leaves the loop stopped.
    pub fn set_multithreaded(&mut self, multithreaded: bool) -> Result<(), LoopError> {
        let target = if multithreaded {
            Threading::Multi
        } else {
            Threading::Single
        };
        if target == self.threading {
            return Ok(());
        }
        tracing::info!(?target, "switching threading mode");
        self.threading = target;
        match core::mem::replace(&mut self.state, LoopState::Gone) {
            LoopState::Inline(app) => {
                if let Err(err) = self.shared.lock_render().release() {
                    self.state = LoopState::Stopped(app);
                    return Err(err.into());
                }
                self.spawn_workers(app)
            }
            LoopState::Threaded(workers) => {
                let app = self.join_workers(workers)?;
                self.start_inline(app)
            }
            state => {
                self.state = state;
                Ok(())
            }
        }
    }

    /// Set the update rate, clamped to at least 1 Hz. Takes effect from the next tick.
    pub fn set_update_frequency(&self, hz: f64) {
        self.shared
            .update_hz
            .store(clamp_frequency(hz).to_bits(), Ordering::Relaxed);
    }

    /// Set the render rate, clamped to at least 1 Hz. Takes effect from the next tick.
    pub fn set_render_frequency(&self, hz: f64) {
        self.shared
            .render_hz
            .store(clamp_frequency(hz).to_bits(), Ordering::Relaxed);
    }

    /// Update rate in hertz.
    pub fn update_frequency(&self) -> f64 {
        load_hz(&self.shared.update_hz)
    }

    /// Render rate in hertz.
    pub fn render_frequency(&self) -> f64 {
        load_hz(&self.shared.render_hz)
    }

    /// Current threading mode.
    pub fn threading(&self) -> Threading {
        self.threading
    }

    /// Whether worker threads are running.
    pub fn is_threaded(&self) -> bool {
        matches!(self.state, LoopState::Threaded(_))
    }

    /// A handle for enqueuing platform input.
    pub fn events(&self) -> PlatformEvents {
        self.events.clone()
    }

    /// The application, unless worker threads own it.
    pub fn app(&self) -> Option<&Application> {
        match &self.state {
            LoopState::Stopped(app) | LoopState::Inline(app) => Some(app),
            _ => None,
        }
    }

    /// The application, mutably, unless worker threads own it.
    pub fn app_mut(&mut self) -> Option<&mut Application> {
        match &mut self.state {
            LoopState::Stopped(app) | LoopState::Inline(app) => Some(app),
            _ => None,
        }
    }

    /// Run `f` on the backend under the render lock.
    pub fn with_backend<R>(&self, f: impl FnOnce(&mut G) -> R) -> R {
        f(&mut self.shared.lock_render().backend)
    }

    /// Render clock.
    pub fn render_time(&self) -> TimeContext {
        self.shared.lock_render().time
    }

    /// Stop ticking, release the context and hand the application back.
    pub fn shutdown(mut self) -> Result<Application, LoopError> {
        match core::mem::replace(&mut self.state, LoopState::Gone) {
            LoopState::Stopped(app) => Ok(app),
            LoopState::Inline(app) => {
                self.shared.lock_render().release()?;
                Ok(app)
            }
            LoopState::Threaded(workers) => self.join_workers(workers),
            LoopState::Gone => Err(LoopError::ApplicationLost),
        }
    }

    fn start_inline(&mut self, app: Application) -> Result<(), LoopError> {
        match self.shared.lock_render().acquire() {
            Ok(()) => {
                tracing::debug!("context bound inline");
                self.state = LoopState::Inline(app);
                Ok(())
            }
            Err(err) => {
                self.state = LoopState::Stopped(app);
                Err(err.into())
            }
        }
    }

    fn spawn_workers(&mut self, app: Application) -> Result<(), LoopError> {
        match self.try_spawn_workers(app) {
            Ok(workers) => {
                tracing::debug!("update and render threads started");
                self.state = LoopState::Threaded(workers);
                Ok(())
            }
            Err((app, err)) => {
                self.shared.running.store(false, Ordering::Release);
                self.state = LoopState::Stopped(app);
                Err(err)
            }
        }
    }

    /// Start the render thread, wait until it holds the context, then hand the application
    /// to a new update thread. On failure the application comes back with the error.
    fn try_spawn_workers(
        &self,
        app: Application,
    ) -> Result<Workers, (Application, LoopError)> {
        self.shared.running.store(true, Ordering::Release);

        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let shared = Arc::clone(&self.shared);
        let render = match thread::Builder::new()
            .name("umbra-render".to_string())
            .spawn(move || render_loop(&shared, &ready_tx))
        {
            Ok(handle) => handle,
            Err(source) => {
                let err = LoopError::Spawn {
                    name: "render",
                    source,
                };
                return Err((app, err));
            }
        };

        let bound = match ready_rx.recv() {
            Ok(result) => result.map_err(LoopError::from),
            Err(_) => Err(LoopError::ThreadPanicked("render")),
        };
        if let Err(err) = bound {
            self.shared.running.store(false, Ordering::Release);
            let _ = render.join();
            return Err((app, err));
        }

        let (app_tx, app_rx) = mpsc::sync_channel::<Application>(1);
        let shared = Arc::clone(&self.shared);
        let update = match thread::Builder::new()
            .name("umbra-update".to_string())
            .spawn(move || app_rx.recv().ok().map(|app| update_loop(&shared, app)))
        {
            Ok(handle) => handle,
            Err(source) => {
                self.shared.running.store(false, Ordering::Release);
                render.thread().unpark();
                let _ = render.join();
                let err = LoopError::Spawn {
                    name: "update",
                    source,
                };
                return Err((app, err));
            }
        };

        if let Err(mpsc::SendError(app)) = app_tx.send(app) {
            self.shared.running.store(false, Ordering::Release);
            render.thread().unpark();
            let _ = update.join();
            let _ = render.join();
            return Err((app, LoopError::ThreadPanicked("update")));
        }
        Ok(Workers { update, render })
    }

    /// Stop both threads and wait for them. The render thread releases the context on its
    /// way out.
    fn join_workers(&mut self, workers: Workers) -> Result<Application, LoopError> {
        self.shared.running.store(false, Ordering::Release);
        workers.update.thread().unpark();
        workers.render.thread().unpark();

        let app = workers.update.join();
        let rendered = workers.render.join();
        let app = match app {
            Ok(Some(app)) => app,
            Ok(None) => return Err(LoopError::ApplicationLost),
            Err(_) => return Err(LoopError::ThreadPanicked("update")),
        };
        // From here on the app survives whatever the render thread reports.
        self.state = LoopState::Stopped(app);
        match rendered {
            Ok(Ok(())) => {}
            Ok(Err(err)) => return Err(err.into()),
            Err(_) => return Err(LoopError::ThreadPanicked("render")),
        }
        match core::mem::replace(&mut self.state, LoopState::Gone) {
            LoopState::Stopped(app) => {
                tracing::debug!("update and render threads joined");
                Ok(app)
            }
            _ => Err(LoopError::ApplicationLost),
        }
    }
}

impl<G: GraphicsBackend> Drop for DualLoop<G> {
    fn drop(&mut self) {
        match core::mem::replace(&mut self.state, LoopState::Gone) {
            LoopState::Threaded(workers) => {
                if let Err(err) = self.join_workers(workers) {
                    tracing::warn!(%err, "error stopping loops on drop");
                }
            }
            LoopState::Inline(_) => {
                if let Err(err) = self.shared.lock_render().release() {
                    tracing::warn!(%err, "error releasing graphics context on drop");
                }
            }
            LoopState::Stopped(_) | LoopState::Gone => {}
        }
    }
}

fn update_loop<G: GraphicsBackend>(shared: &Shared<G>, mut app: Application) -> Application {
    let mut last = Instant::now();
    while shared.is_running() {
        let start = Instant::now();
        app.update_tick(start.duration_since(last).as_secs_f64());
        last = start;
        shared.publish(app.record_frame());
        pace(load_hz(&shared.update_hz), start);
    }
    app
}

fn render_loop<G: GraphicsBackend>(
    shared: &Shared<G>,
    ready: &mpsc::SyncSender<Result<(), ContextError>>,
) -> Result<(), ContextError> {
    let acquired = shared.lock_render().acquire();
    let _ = ready.send(acquired.clone());
    acquired?;

    let mut current = DisplayList::default();
    let mut last = Instant::now();
    while shared.is_running() {
        let start = Instant::now();
        if let Some(frame) = shared.take_frame() {
            current = frame;
        }
        let rendered = {
            let mut render = shared.lock_render();
            render.time.advance(start.duration_since(last).as_secs_f64());
            render.render(&current)
        };
        last = start;
        if let Err(err) = rendered {
            tracing::error!(%err, "render failed, stopping loops");
            shared.running.store(false, Ordering::Release);
            let _ = shared.lock_render().release();
            return Err(err);
        }
        pace(load_hz(&shared.render_hz), start);
    }
    shared.lock_render().release()
}
