//! The event loop and the `App` that owns a widget tree (§4.6).

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, Receiver, Select, Sender};
use tracing::{debug, warn};

use crate::canvas::Canvas;
use crate::cell::Cell;
use crate::dimension::RenderSize;
use crate::error::LoomwidError;
use crate::event::{AfterRenderTask, AppHandle, Event};
use crate::style::{CellStyler, Palette, RenderContext};
use crate::widget::{Selector, Widget};
use crate::color::ColorMode;

/// A source of input events, decoupled from any particular terminal
/// backend so the event loop can be driven by a test double. Reading
/// blocks until an event is available or the source is closed.
pub trait TerminalSource: Send {
    /// Block for the next event, or `None` once the source is closed.
    fn next_event(&mut self) -> Option<Event>;
}

/// Where rendered canvases go. A real implementation draws to an
/// actual terminal; tests can capture frames instead.
pub trait ScreenSink {
    /// Present `canvas` as the current frame.
    fn present(&mut self, canvas: &Canvas) -> Result<(), LoomwidError>;

    /// The sink's current size in (cols, rows).
    fn size(&self) -> (usize, usize);
}

const INPUT_QUEUE_CAPACITY: usize = 256;
const AFTER_RENDER_QUEUE_CAPACITY: usize = 256;

/// Owns the root widget, palette, screen sink, and the event-loop
/// plumbing described in §4.6: a bounded input-event queue and a
/// bounded after-render-task queue, each drained once per loop
/// iteration, with an unconditional re-render and present at the end
/// of every iteration.
pub struct App {
    root: Box<dyn Widget>,
    palette: Palette,
    mode: ColorMode,
    ignore_base16: bool,
    sink: Box<dyn ScreenSink>,
    input_rx: Receiver<Event>,
    after_render_tx: Sender<AfterRenderTask>,
    after_render_rx: Receiver<AfterRenderTask>,
    closing: Arc<Mutex<bool>>,
    input_thread: Option<JoinHandle<()>>,
}

impl App {
    /// Build an app around `root`, driven by events from `source` and
    /// presenting frames to `sink`. Spawns a dedicated thread that pumps
    /// `source` into the bounded input queue.
    pub fn new(root: Box<dyn Widget>, palette: Palette, mode: ColorMode, sink: Box<dyn ScreenSink>, mut source: Box<dyn TerminalSource>) -> Self {
        let (input_tx, input_rx) = bounded(INPUT_QUEUE_CAPACITY);
        let (after_render_tx, after_render_rx) = bounded(AFTER_RENDER_QUEUE_CAPACITY);
        let input_thread = std::thread::spawn(move || {
            while let Some(event) = source.next_event() {
                if input_tx.send(event).is_err() {
                    break;
                }
            }
        });
        Self {
            root,
            palette,
            mode,
            ignore_base16: false,
            sink,
            input_rx,
            after_render_tx,
            after_render_rx,
            closing: Arc::new(Mutex::new(false)),
            input_thread: Some(input_thread),
        }
    }

    /// A handle callbacks and widgets can use to schedule after-render
    /// work or request a quit.
    pub fn handle(&self) -> AppHandle {
        AppHandle {
            after_render_tx: self.after_render_tx.clone(),
            closing: self.closing.clone(),
        }
    }

    fn is_closing(&self) -> bool {
        *self.closing.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run the main loop until `quit()` is called (via the handle) or
    /// the input source closes. Each iteration: wait on either queue,
    /// dispatch a terminal event to the root widget (falling back to
    /// nothing if unhandled), run any after-render tasks, then
    /// unconditionally re-render and present.
    pub fn run(&mut self) -> Result<(), LoomwidError> {
        self.render_root()?;
        loop {
            if self.is_closing() {
                break;
            }

            let mut sel = Select::new();
            let input_idx = sel.recv(&self.input_rx);
            let after_render_idx = sel.recv(&self.after_render_rx);
            let op = sel.select();

            match op.index() {
                i if i == input_idx => match op.recv(&self.input_rx) {
                    Ok(event) => self.dispatch(event),
                    Err(_) => break,
                },
                i if i == after_render_idx => {
                    if let Ok(task) = op.recv(&self.after_render_rx) {
                        let handle = self.handle();
                        task(&handle);
                    }
                }
                _ => unreachable!("Select only registered two receivers"),
            }

            self.drain_after_render();
            self.render_root()?;

            if self.is_closing() {
                break;
            }
        }
        self.drain_after_render();
        Ok(())
    }

    fn drain_after_render(&mut self) {
        while let Ok(task) = self.after_render_rx.try_recv() {
            let handle = self.handle();
            task(&handle);
        }
    }

    fn dispatch(&mut self, event: Event) {
        let (cols, rows) = self.sink.size();
        let size = RenderSize::Box(cols, rows);
        let handle = self.handle();
        let handled = self.root.user_input(&event, size, Selector::focused(), &handle);
        if !handled {
            debug!(?event, "unhandled input event");
        }
    }

    /// Render the root widget at the sink's current size, merge it over
    /// the palette's "default" base style, and present it.
    fn render_root(&mut self) -> Result<(), LoomwidError> {
        let (cols, rows) = self.sink.size();
        let size = RenderSize::Box(cols, rows);
        let handle = self.handle();
        let content = self.root.render(size, Selector::focused(), &handle);

        let ctx = RenderContext {
            palette: &self.palette,
            mode: self.mode,
            ignore_base16: self.ignore_base16,
        };
        let base_triple = self
            .palette
            .default_entry()
            .map(|s| s.resolve(&ctx))
            .unwrap_or_default();
        let base_cell = base_triple.apply(" ");
        let mut canvas = Canvas::blank(cols.max(content.width()), rows.max(content.height()));
        for y in 0..canvas.height() {
            for x in 0..canvas.width() {
                canvas.set_cell(x, y, base_cell.clone());
            }
        }
        canvas.merge_under(&content, 0, 0, false);

        if let Err(err) = self.sink.present(&canvas) {
            warn!(?err, "failed to present frame");
            return Err(err);
        }
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Some(handle) = self.input_thread.take() {
            let _ = handle.join();
        }
    }
}
