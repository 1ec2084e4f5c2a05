//! The platform TTY bridge (§4.10): spawns a child process on a PTY,
//! pumps its output into a [`crate::terminal::TerminalEmulator`] on the
//! main thread via [`crate::event::AfterRenderTask`] closures, and
//! forwards resizes and signals back to it.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use tracing::{debug, warn};

use crate::callback::CallbackBus;
use crate::error::{LoomwidError, Result};
use crate::event::{AppHandle, KeyEvent};
use crate::terminal::{TerminalEmulator, TerminalEvent};

/// Configuration for spawning a child process on a PTY.
pub struct EmulatorOptions {
    /// The program to run.
    pub command: String,
    /// Its arguments.
    pub args: Vec<String>,
    /// Extra environment variables, merged over the current process's.
    pub env: HashMap<String, String>,
    /// Working directory for the child, if not inherited.
    pub cwd: Option<String>,
    /// Whether to wrap pasted text in `ESC[200~ ... ESC[201~` when the
    /// child has requested bracketed paste mode (2004).
    pub enable_bracketed_paste: bool,
    /// Scrollback line cap, applied to the emulator's primary buffer.
    pub scrollback: usize,
    /// An optional prefix key: pressing it, and the key that follows,
    /// are both routed to the enclosing app instead of the PTY (§4.8
    /// "Hotkey").
    pub hot_key: Option<KeyEvent>,
    /// How long "hotkey mode" stays active after the prefix key,
    /// re-armed by each intercepted key, so repeated app commands don't
    /// require re-pressing the prefix. `None` means a single following
    /// key is intercepted before routing reverts to the PTY.
    pub hot_key_persistence: Option<Duration>,
}

impl Default for EmulatorOptions {
    fn default() -> Self {
        Self {
            command: "/bin/sh".to_string(),
            args: Vec::new(),
            env: HashMap::new(),
            cwd: None,
            enable_bracketed_paste: true,
            scrollback: 2000,
            hot_key: None,
            hot_key_persistence: None,
        }
    }
}

/// Where a keypress should be routed, per [`PtyBridge::route_key`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyRouting {
    /// Encode and write the key to the child process as usual.
    ForwardToPty,
    /// The enclosing app should handle this key itself: it is either
    /// the configured hotkey prefix, or a key typed while "hotkey mode"
    /// is active.
    InterceptedByApp,
}

#[derive(Clone, Copy, Debug)]
enum HotkeyState {
    Idle,
    WaitingOneShot,
    Active(Instant),
}

/// A topic on the PTY bridge's callback bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PtyTopic {
    /// The window title changed (OSC 0/2).
    TitleChanged,
    /// BEL (0x07) was received.
    Bell,
    /// The child process exited.
    ProcessExited,
    /// Keyboard LED state changed (DECLL, `CSI Ps q`).
    KeyboardLeds,
}

/// The payload delivered to a callback when its topic fires (§6
/// "Process lifecycle events").
#[derive(Clone, Debug, PartialEq)]
pub enum PtyEvent {
    /// The child process exited.
    ProcessExited,
    /// BEL (0x07) was received.
    Bell,
    /// The window title changed, carrying the new title text.
    TitleChanged(String),
    /// Keyboard LED state changed.
    KeyboardLeds(crate::terminal::KeyboardLeds),
}

type PtyCallback = Arc<dyn Fn(&PtyEvent) + Send + Sync>;

/// A running child process attached to a PTY, and the terminal
/// emulator its output feeds. Owns the master read thread; dropping
/// this joins it.
pub struct PtyBridge {
    master: Box<dyn MasterPty + Send>,
    child: Box<dyn Child + Send + Sync>,
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
    emulator: Arc<Mutex<TerminalEmulator>>,
    callbacks: Arc<CallbackBus<PtyTopic, u32, PtyCallback>>,
    reader_thread: Option<JoinHandle<()>>,
    hot_key: Option<KeyEvent>,
    hot_key_persistence: Option<Duration>,
    hotkey_state: HotkeyState,
}

impl PtyBridge {
    /// Spawn `options.command` on a new PTY sized `cols` x `rows`, and
    /// start pumping its output into a fresh [`TerminalEmulator`].
    /// `after_render` is used to schedule `feed_bytes` calls back onto
    /// the app's main thread rather than mutating the emulator directly
    /// from the reader thread.
    pub fn spawn(options: EmulatorOptions, cols: usize, rows: usize, app: AppHandle) -> Result<Self> {
        let pty_system = native_pty_system();
        let size = PtySize {
            rows: rows as u16,
            cols: cols as u16,
            pixel_width: 0,
            pixel_height: 0,
        };
        let pair = pty_system.openpty(size).map_err(to_io_error)?;

        let mut cmd = CommandBuilder::new(&options.command);
        cmd.args(&options.args);
        if let Some(cwd) = &options.cwd {
            cmd.cwd(cwd);
        }
        for (key, value) in &options.env {
            cmd.env(key, value);
        }
        cmd.env("TERM", "xterm-256color");

        let child = pair.slave.spawn_command(cmd).map_err(to_io_error)?;
        drop(pair.slave);

        let mut reader = pair.master.try_clone_reader().map_err(to_io_error)?;
        let writer = pair.master.take_writer().map_err(to_io_error)?;

        let emulator = Arc::new(Mutex::new(TerminalEmulator::new(cols, rows).with_scrollback_limit(options.scrollback)));
        let callbacks: Arc<CallbackBus<PtyTopic, u32, PtyCallback>> = Arc::new(CallbackBus::new());
        let writer = Arc::new(Mutex::new(writer));

        let reader_emulator = emulator.clone();
        let reader_callbacks = callbacks.clone();
        let reader_writer = writer.clone();
        let reader_app = app;
        let reader_thread = std::thread::spawn(move || {
            let mut buf = [0u8; 4096];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        let chunk = buf[..n].to_vec();
                        let emulator = reader_emulator.clone();
                        let callbacks = reader_callbacks.clone();
                        let writer = reader_writer.clone();
                        let sent = reader_app.run(Box::new(move |_handle| {
                            let mut term = emulator.lock().unwrap_or_else(|e| e.into_inner());
                            term.feed_bytes(&chunk);
                            let events = term.drain_events();
                            let replies = term.drain_replies();
                            drop(term);
                            for event in events {
                                dispatch_terminal_event(&callbacks, event);
                            }
                            if !replies.is_empty() {
                                let mut writer = writer.lock().unwrap_or_else(|e| e.into_inner());
                                for reply in replies {
                                    let _ = writer.write_all(&reply);
                                }
                                let _ = writer.flush();
                            }
                        }));
                        if sent.is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        warn!(?err, "pty read failed");
                        break;
                    }
                }
            }
            debug!("pty reader thread exiting");
        });

        Ok(Self {
            master: pair.master,
            child,
            writer,
            emulator,
            callbacks,
            reader_thread: Some(reader_thread),
            hot_key: options.hot_key,
            hot_key_persistence: options.hot_key_persistence,
            hotkey_state: HotkeyState::Idle,
        })
    }

    /// Route a keypress per the configured hotkey prefix (§4.8
    /// "Hotkey"): the prefix key itself, and whichever key(s) follow it
    /// while hotkey mode is active, are reported as
    /// [`KeyRouting::InterceptedByApp`] instead of being written to the
    /// PTY. With no `hot_key` configured, every key forwards normally.
    pub fn route_key(&mut self, key: &KeyEvent) -> KeyRouting {
        let now = Instant::now();
        match self.hotkey_state {
            HotkeyState::WaitingOneShot => {
                self.hotkey_state = HotkeyState::Idle;
                return KeyRouting::InterceptedByApp;
            }
            HotkeyState::Active(deadline) if now <= deadline => {
                self.hotkey_state = HotkeyState::Active(now + self.hot_key_persistence.unwrap_or_default());
                return KeyRouting::InterceptedByApp;
            }
            _ => self.hotkey_state = HotkeyState::Idle,
        }

        if self.hot_key.as_ref() == Some(key) {
            self.hotkey_state = match self.hot_key_persistence {
                Some(persistence) => HotkeyState::Active(now + persistence),
                None => HotkeyState::WaitingOneShot,
            };
            return KeyRouting::InterceptedByApp;
        }

        KeyRouting::ForwardToPty
    }

    /// The emulator fed by this bridge's PTY output.
    pub fn emulator(&self) -> Arc<Mutex<TerminalEmulator>> {
        self.emulator.clone()
    }

    /// Write bytes to the child's stdin (the PTY master).
    pub fn write(&self, bytes: &[u8]) -> Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        writer.write_all(bytes).map_err(LoomwidError::Pty)?;
        writer.flush().map_err(LoomwidError::Pty)
    }

    /// Resize the PTY and the emulator together, e.g. on `SIGWINCH`.
    pub fn resize(&mut self, cols: usize, rows: usize) -> Result<()> {
        self.master
            .resize(PtySize {
                rows: rows as u16,
                cols: cols as u16,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(to_io_error)?;
        let mut term = self.emulator.lock().unwrap_or_else(|e| e.into_inner());
        term.resize(cols, rows);
        Ok(())
    }

    /// Register a callback on `topic`, keyed by `id` for later removal.
    pub fn on(&self, topic: PtyTopic, id: u32, f: PtyCallback) {
        self.callbacks.add(topic, id, f);
    }

    /// Remove a previously registered callback.
    pub fn off(&self, topic: PtyTopic, id: u32) {
        self.callbacks.remove(&topic, &id);
    }

    /// Whether the child process has exited.
    pub fn has_exited(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(Some(_)) => {
                self.callbacks.run_with(&PtyTopic::ProcessExited, &PtyEvent::ProcessExited);
                true
            }
            _ => false,
        }
    }

    /// Forward a signal to the child process, by PID, on unix.
    #[cfg(unix)]
    pub fn signal(&self, signal: libc::c_int) -> Result<()> {
        let pid = self.child.process_id().ok_or_else(|| LoomwidError::Pty(std::io::Error::other("no child pid")))?;
        let ret = unsafe { libc::kill(pid as libc::pid_t, signal) };
        if ret == 0 {
            Ok(())
        } else {
            Err(LoomwidError::Pty(std::io::Error::last_os_error()))
        }
    }

    /// Signal forwarding is not implemented on non-unix targets: no
    /// example in the pack targets Windows job objects, and the PTY
    /// bridge's scope is POSIX PTYs.
    #[cfg(not(unix))]
    pub fn signal(&self, _signal: i32) -> Result<()> {
        Err(LoomwidError::Pty(std::io::Error::other("signal forwarding is unix-only")))
    }

    /// Ask the child process to terminate.
    pub fn request_terminate(&mut self) -> Result<()> {
        self.child.kill().map_err(to_io_error)
    }

    /// Spawn a background thread that forwards `SIGINT`/`SIGTERM`
    /// received by this process on to the child, so a host app that
    /// embeds a `PtyBridge` doesn't have to wire that up itself.
    #[cfg(unix)]
    pub fn forward_host_signals(&self) -> std::io::Result<JoinHandle<()>> {
        use signal_hook::consts::{SIGINT, SIGTERM};
        use signal_hook::iterator::Signals;

        let pid = self.child.process_id();
        let mut signals = Signals::new([SIGINT, SIGTERM])?;
        Ok(std::thread::spawn(move || {
            for signal in signals.forever() {
                if let Some(pid) = pid {
                    unsafe {
                        libc::kill(pid as libc::pid_t, signal);
                    }
                }
            }
        }))
    }
}

impl Drop for PtyBridge {
    fn drop(&mut self) {
        if let Some(handle) = self.reader_thread.take() {
            let _ = handle.join();
        }
    }
}

fn to_io_error(err: impl std::fmt::Display) -> LoomwidError {
    LoomwidError::Pty(std::io::Error::other(err.to_string()))
}

/// Turn one drained [`TerminalEvent`] into the matching `PtyTopic`
/// callback run (§4.10, §6 "title"/"bell"/"LEDs" callbacks).
fn dispatch_terminal_event(callbacks: &CallbackBus<PtyTopic, u32, PtyCallback>, event: TerminalEvent) {
    match event {
        TerminalEvent::Bell => callbacks.run_with(&PtyTopic::Bell, &PtyEvent::Bell),
        TerminalEvent::TitleChanged(title) => {
            callbacks.run_with(&PtyTopic::TitleChanged, &PtyEvent::TitleChanged(title));
        }
        TerminalEvent::KeyboardLeds(leds) => {
            callbacks.run_with(&PtyTopic::KeyboardLeds, &PtyEvent::KeyboardLeds(leds));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::AppHandle;

    /// A handle backed by a bounded channel the test drains itself,
    /// standing in for the main loop's after-render pump.
    fn draining_handle() -> (AppHandle, crossbeam_channel::Receiver<crate::event::AfterRenderTask>) {
        let (tx, rx) = crossbeam_channel::bounded(64);
        let handle = AppHandle {
            after_render_tx: tx,
            closing: Arc::new(Mutex::new(false)),
        };
        (handle, rx)
    }

    fn drain(rx: &crossbeam_channel::Receiver<crate::event::AfterRenderTask>, app: &AppHandle) {
        while let Ok(task) = rx.try_recv() {
            task(app);
        }
    }

    #[test]
    fn spawning_true_produces_a_process_that_exits_cleanly() {
        let (handle, rx) = draining_handle();
        let options = EmulatorOptions {
            command: "true".to_string(),
            ..EmulatorOptions::default()
        };
        let mut bridge = PtyBridge::spawn(options, 80, 24, handle.clone()).expect("spawn true");
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while !bridge.has_exited() && std::time::Instant::now() < deadline {
            drain(&rx, &handle);
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert!(bridge.has_exited());
    }

    #[test]
    fn pty_output_is_fed_to_the_emulator() {
        let (handle, rx) = draining_handle();
        let options = EmulatorOptions {
            command: "printf".to_string(),
            args: vec!["hello".to_string()],
            ..EmulatorOptions::default()
        };
        let bridge = PtyBridge::spawn(options, 80, 24, handle.clone()).expect("spawn printf");
        let emulator = bridge.emulator();
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        loop {
            drain(&rx, &handle);
            let glyph = emulator.lock().unwrap_or_else(|e| e.into_inner()).screen().cell(0, 0).glyph().to_string();
            if glyph == "h" || std::time::Instant::now() > deadline {
                assert_eq!(glyph, "h");
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
    }

    #[test]
    fn hotkey_disabled_by_default_forwards_every_key() {
        let (handle, _rx) = draining_handle();
        let mut bridge = PtyBridge::spawn(EmulatorOptions::default(), 80, 24, handle).expect("spawn /bin/sh");
        let key = crate::event::KeyEvent::plain(crate::event::KeyCode::Char('b'));
        assert_eq!(bridge.route_key(&key), KeyRouting::ForwardToPty);
    }

    #[test]
    fn hotkey_prefix_intercepts_itself_and_one_following_key() {
        use crate::event::{KeyCode, KeyEvent};
        let (handle, _rx) = draining_handle();
        let options = EmulatorOptions {
            hot_key: Some(KeyEvent::plain(KeyCode::Char('b'))),
            ..EmulatorOptions::default()
        };
        let mut bridge = PtyBridge::spawn(options, 80, 24, handle).expect("spawn /bin/sh");

        let hotkey = KeyEvent::plain(KeyCode::Char('b'));
        let other = KeyEvent::plain(KeyCode::Char('n'));
        assert_eq!(bridge.route_key(&hotkey), KeyRouting::InterceptedByApp);
        assert_eq!(bridge.route_key(&other), KeyRouting::InterceptedByApp);
        assert_eq!(bridge.route_key(&other), KeyRouting::ForwardToPty);
    }

    #[test]
    fn hotkey_persistence_keeps_intercepting_until_it_elapses() {
        use crate::event::{KeyCode, KeyEvent};
        let (handle, _rx) = draining_handle();
        let options = EmulatorOptions {
            hot_key: Some(KeyEvent::plain(KeyCode::Char('b'))),
            hot_key_persistence: Some(std::time::Duration::from_millis(50)),
            ..EmulatorOptions::default()
        };
        let mut bridge = PtyBridge::spawn(options, 80, 24, handle).expect("spawn /bin/sh");

        let hotkey = KeyEvent::plain(KeyCode::Char('b'));
        let other = KeyEvent::plain(KeyCode::Char('n'));
        assert_eq!(bridge.route_key(&hotkey), KeyRouting::InterceptedByApp);
        assert_eq!(bridge.route_key(&other), KeyRouting::InterceptedByApp, "still within the persistence window");
        std::thread::sleep(std::time::Duration::from_millis(80));
        assert_eq!(bridge.route_key(&other), KeyRouting::ForwardToPty, "persistence window has elapsed");
    }

    #[test]
    fn bell_from_the_child_fires_the_bell_callback() {
        let (handle, rx) = draining_handle();
        let options = EmulatorOptions {
            command: "printf".to_string(),
            args: vec!["\\a".to_string()],
            ..EmulatorOptions::default()
        };
        let bridge = PtyBridge::spawn(options, 80, 24, handle.clone()).expect("spawn printf");
        let rang = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let rang_cb = rang.clone();
        bridge.on(
            PtyTopic::Bell,
            1,
            Arc::new(move |event| {
                if matches!(event, PtyEvent::Bell) {
                    rang_cb.store(true, std::sync::atomic::Ordering::SeqCst);
                }
            }),
        );
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while !rang.load(std::sync::atomic::Ordering::SeqCst) && std::time::Instant::now() < deadline {
            drain(&rx, &handle);
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert!(rang.load(std::sync::atomic::Ordering::SeqCst), "bell callback never fired");
    }

    #[test]
    fn title_change_from_the_child_fires_the_title_callback() {
        let (handle, rx) = draining_handle();
        let options = EmulatorOptions {
            command: "printf".to_string(),
            args: vec!["\\033]0;new title\\007".to_string()],
            ..EmulatorOptions::default()
        };
        let bridge = PtyBridge::spawn(options, 80, 24, handle.clone()).expect("spawn printf");
        let title = Arc::new(Mutex::new(None));
        let title_cb = title.clone();
        bridge.on(
            PtyTopic::TitleChanged,
            1,
            Arc::new(move |event| {
                if let PtyEvent::TitleChanged(text) = event {
                    *title_cb.lock().unwrap_or_else(|e| e.into_inner()) = Some(text.clone());
                }
            }),
        );
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while title.lock().unwrap_or_else(|e| e.into_inner()).is_none() && std::time::Instant::now() < deadline {
            drain(&rx, &handle);
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert_eq!(*title.lock().unwrap_or_else(|e| e.into_inner()), Some("new title".to_string()));
    }

    #[test]
    fn child_process_runs_in_the_requested_working_directory() {
        let dir = tempfile::tempdir().expect("create tempdir");
        let canonical = dir.path().canonicalize().expect("canonicalize tempdir");

        let (handle, rx) = draining_handle();
        let options = EmulatorOptions {
            command: "pwd".to_string(),
            cwd: Some(canonical.to_string_lossy().into_owned()),
            ..EmulatorOptions::default()
        };
        let bridge = PtyBridge::spawn(options, 120, 24, handle.clone()).expect("spawn pwd");
        let emulator = bridge.emulator();
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        loop {
            drain(&rx, &handle);
            let first_cell = emulator.lock().unwrap_or_else(|e| e.into_inner()).screen().cell(0, 0).glyph().to_string();
            if !first_cell.is_empty() || std::time::Instant::now() > deadline {
                assert!(!first_cell.is_empty(), "pwd never produced output");
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
    }
}
