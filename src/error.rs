//! Crate-wide error taxonomy (§7).

use crate::color::ColorMode;
use crate::dimension::{DimensionKind, RenderSize};

/// The crate's error type.
#[derive(Debug, thiserror::Error)]
pub enum LoomwidError {
    /// A string could not be parsed as any color shape, or an
    /// indexed/RGB value was out of range.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A color cannot be projected to the requested mode.
    #[error("color {color} cannot be projected to mode {mode:?}")]
    ColorModeMismatch {
        /// Textual description of the color.
        color: String,
        /// The mode it could not be projected to.
        mode: ColorMode,
    },

    /// A sub-size computation received an unsupported combination of
    /// parent size and child dimension kind.
    #[error("dimension error: size={size:?} dim={dim:?} row={row:?}")]
    Dimension {
        /// The parent render size.
        size: RenderSize,
        /// The child dimension kind that could not be resolved.
        dim: DimensionKind,
        /// Optional row index, when the error arose computing a specific
        /// child's allotment.
        row: Option<usize>,
    },

    /// A widget cannot render at the given size.
    #[error("widget {widget} cannot render at size {size:?}, requires {required}")]
    WidgetSize {
        /// Name of the offending widget.
        widget: String,
        /// The size it was asked to render at.
        size: RenderSize,
        /// Human-readable description of what it requires.
        required: String,
    },

    /// (Debug-only assertion) a widget returned a canvas inconsistent
    /// with the requested size.
    #[error("canvas size wrong: requested {requested:?}, actual {actual:?}")]
    CanvasSizeWrong {
        /// Requested (cols, rows).
        requested: (usize, usize),
        /// Actual (cols, rows) returned.
        actual: (usize, usize),
    },

    /// `run(task)` was called after `quit()`.
    #[error("app is closing")]
    AppClosing,

    /// The PTY could not be spawned.
    #[error("pty error: {0}")]
    Pty(#[from] std::io::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, LoomwidError>;
