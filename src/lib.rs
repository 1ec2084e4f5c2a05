//! `loomwid`: a compositional terminal UI framework — widget
//! composition over a cell-grid canvas, layered styling with
//! color-mode reduction, and an embedded vt102/vt220 terminal
//! emulator for hosting a child process's own screen.
//!
//! The crate is organized around the same seam the framework exposes
//! to callers: build a widget tree (`widget`), style it against a
//! `Palette` (`style`, `color`, `cell`), drive it from an `App` event
//! loop (`app`, `event`, `callback`, `focus`, `click`), optionally
//! hosting a child process's terminal screen (`terminal`, `pty`,
//! `copymode`).

#![warn(missing_docs)]

pub mod app;
pub mod backend;
pub mod callback;
pub mod canvas;
pub mod cell;
pub mod click;
pub mod color;
pub mod copymode;
pub mod dimension;
pub mod error;
pub mod event;
pub mod focus;
pub mod pty;
pub mod style;
pub mod terminal;
pub mod widget;

pub use error::{LoomwidError, Result};
