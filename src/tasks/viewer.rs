pub mod cursor;

use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::{Context, Result};
use cursor::CursorAutoHide;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    keyboard::{Key, NamedKey},
    raw_window_handle::{HasWindowHandle, RawWindowHandle},
    window::{Fullscreen, Window, WindowAttributes, WindowLevel},
};

use crate::{
    config::Configuration,
    controller::PlaybackController,
    error::Error,
    events::PlaybackEvent,
    pipeline::PipelineFactory,
    platform::{
        gst_backend::{GstBackend, Notifier},
        surface::BlankSurface,
    },
    playlist::Playlist,
};

#[derive(Debug)]
pub enum ViewerEvent {
    Playback(PlaybackEvent),
    Cancelled,
}

struct ViewerApp {
    cfg: Configuration,
    playlist: Option<Playlist>,
    proxy: EventLoopProxy<ViewerEvent>,
    cancel: CancellationToken,
    window: Option<Arc<Window>>,
    controller: Option<PlaybackController<GstBackend>>,
    cursor: CursorAutoHide,
    failure: Option<anyhow::Error>,
}

impl ViewerApp {
    fn new(
        cfg: Configuration,
        playlist: Playlist,
        proxy: EventLoopProxy<ViewerEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            cfg,
            playlist: Some(playlist),
            proxy,
            cancel,
            window: None,
            controller: None,
            cursor: CursorAutoHide::default(),
            failure: None,
        }
    }

    fn ensure_window(&mut self, event_loop: &ActiveEventLoop) -> Option<Arc<Window>> {
        if let Some(window) = self.window.as_ref() {
            return Some(window.clone());
        }

        let attrs = WindowAttributes::default()
            .with_title("Media Slideshow")
            .with_decorations(false)
            .with_fullscreen(Some(Fullscreen::Borderless(None)))
            .with_window_level(WindowLevel::AlwaysOnTop)
            .with_active(true);
        match event_loop.create_window(attrs) {
            Ok(window) => {
                window.set_cursor_visible(false);
                window.focus_window();
                let window = Arc::new(window);
                self.window = Some(window.clone());
                Some(window)
            }
            Err(err) => {
                error!(error = %err, "failed to create slideshow window");
                self.failure = Some(anyhow::anyhow!("failed to create window: {err}"));
                None
            }
        }
    }

    fn init_playback(&mut self, window: Arc<Window>) -> Result<(), Error> {
        let Some(playlist) = self.playlist.take() else {
            return Ok(());
        };

        let surface = match BlankSurface::new(window.clone()) {
            Ok(mut surface) => {
                if let Err(err) = surface.fill_black() {
                    debug!(error = %err, "initial clear failed");
                }
                Some(surface)
            }
            Err(err) => {
                warn!(error = %err, "black fill unavailable");
                None
            }
        };

        let proxy = Mutex::new(self.proxy.clone());
        let notifier: Notifier = Arc::new(move |event| {
            if let Ok(proxy) = proxy.lock() {
                let _ = proxy.send_event(ViewerEvent::Playback(event));
            }
        });

        let backend = GstBackend::new(native_window_id(&window), notifier, surface);
        let factory = PipelineFactory::new(self.cfg.pipeline_options());
        let controller =
            PlaybackController::new(backend, factory, playlist, self.cfg.image_interval)
                .with_display_root(self.cfg.directory.clone(), self.cfg.recursive);
        let controller = self.controller.insert(controller);
        controller.start(Instant::now())
    }

    fn stop(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(controller) = self.controller.as_mut() {
            controller.shutdown();
        }
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: Error) {
        error!(error = %err, "slideshow cannot continue");
        self.failure = Some(err.into());
        self.stop(event_loop);
    }

    fn schedule_wakeup(&self, event_loop: &ActiveEventLoop) {
        let controller_deadline = self.controller.as_ref().and_then(|c| c.deadline());
        let wake = [controller_deadline, self.cursor.deadline()]
            .into_iter()
            .flatten()
            .min();
        event_loop.set_control_flow(match wake {
            Some(at) => ControlFlow::WaitUntil(at),
            None => ControlFlow::Wait,
        });
    }
}

impl ApplicationHandler<ViewerEvent> for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.cancel.is_cancelled() {
            event_loop.exit();
            return;
        }

        let Some(window) = self.ensure_window(event_loop) else {
            event_loop.exit();
            return;
        };

        if let Err(err) = self.init_playback(window) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        if window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                info!("slideshow window close requested");
                self.stop(event_loop);
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.logical_key == Key::Named(NamedKey::Escape) =>
            {
                info!("escape pressed; closing");
                self.stop(event_loop);
            }
            WindowEvent::CursorMoved { .. } => {
                if self.cursor.on_motion(Instant::now()) {
                    window.set_cursor_visible(true);
                }
            }
            WindowEvent::Resized(size) => {
                debug!(width = size.width, height = size.height, "slideshow window resized");
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.cancel.is_cancelled() {
            self.stop(event_loop);
            return;
        }

        let now = Instant::now();
        if let Some(controller) = self.controller.as_mut() {
            if let Err(err) = controller.on_tick(now) {
                self.fail(event_loop, err);
                return;
            }
        }
        if self.cursor.on_tick(now) {
            if let Some(window) = self.window.as_ref() {
                window.set_cursor_visible(false);
            }
        }
        self.schedule_wakeup(event_loop);
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::Playback(event) => {
                let Some(controller) = self.controller.as_mut() else {
                    return;
                };
                if let Err(err) = controller.on_playback_event(event, Instant::now()) {
                    self.fail(event_loop, err);
                }
            }
            ViewerEvent::Cancelled => {
                info!("viewer received cancellation event");
                self.stop(event_loop);
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Pipelines and the blank surface go before the window they draw into.
        if let Some(mut controller) = self.controller.take() {
            controller.shutdown();
        }
        self.window = None;
    }
}

fn native_window_id(window: &Window) -> Option<usize> {
    let handle = window.window_handle().ok()?;
    match handle.as_raw() {
        RawWindowHandle::Xlib(h) => usize::try_from(h.window).ok(),
        RawWindowHandle::Xcb(h) => usize::try_from(h.window.get()).ok(),
        _ => None,
    }
}

/// Run the slideshow window on the current thread until the user quits.
///
/// Returns an error when the window cannot be created or when no item in the
/// playlist can be played.
pub fn run_windowed(
    playlist: Playlist,
    cfg: Configuration,
    cancel: CancellationToken,
) -> Result<()> {
    let event_loop = EventLoop::<ViewerEvent>::with_user_event()
        .build()
        .context("failed to build viewer event loop")?;
    let proxy = event_loop.create_proxy();

    let cancel_task = {
        let cancel = cancel.clone();
        let proxy = proxy.clone();
        tokio::spawn(async move {
            cancel.cancelled().await;
            let _ = proxy.send_event(ViewerEvent::Cancelled);
        })
    };

    let mut app = ViewerApp::new(cfg, playlist, proxy, cancel);
    let run_result = event_loop.run_app(&mut app);
    cancel_task.abort();

    run_result.context("viewer event loop failed")?;
    match app.failure.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
