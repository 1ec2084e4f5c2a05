//! Render sizes, child dimensions, and the `sub_size` algebra (§4.3).

/// The size a widget is asked to render at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderSize {
    /// The widget chooses its own size.
    Fixed,
    /// Width is fixed; height is chosen by the widget.
    FlowWith(usize),
    /// Both dimensions are fixed.
    Box(usize, usize),
}

impl RenderSize {
    /// The fixed column count, if this size specifies one.
    pub fn cols(&self) -> Option<usize> {
        match self {
            RenderSize::Fixed => None,
            RenderSize::FlowWith(c) => Some(*c),
            RenderSize::Box(c, _) => Some(*c),
        }
    }

    /// The fixed row count, if this size specifies one.
    pub fn rows(&self) -> Option<usize> {
        match self {
            RenderSize::Box(_, r) => Some(*r),
            _ => None,
        }
    }
}

/// A child layout descriptor used only within composite-multiple widgets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Dimension {
    /// A fixed number of units (rows or columns).
    Units(usize),
    /// A share of the remaining space, proportional to other `Weight`
    /// siblings.
    Weight(f64),
    /// A fraction (0.0..=1.0) of the parent's size on the constrained axis.
    Relative(f64),
    /// Like `Units` but capped — never exceeds the given ceiling.
    MaxUnits(usize),
    /// Like `Weight` but capped in absolute rows/cols by the given ceiling.
    WithWeight(f64, usize),
}

/// The kind of a [`Dimension`], used for error reporting without needing
/// to carry the dimension's payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DimensionKind {
    /// See [`Dimension::Units`].
    Units,
    /// See [`Dimension::Weight`].
    Weight,
    /// See [`Dimension::Relative`].
    Relative,
    /// See [`Dimension::MaxUnits`].
    MaxUnits,
    /// See [`Dimension::WithWeight`].
    WithWeight,
}

impl Dimension {
    fn kind(&self) -> DimensionKind {
        match self {
            Dimension::Units(_) => DimensionKind::Units,
            Dimension::Weight(_) => DimensionKind::Weight,
            Dimension::Relative(_) => DimensionKind::Relative,
            Dimension::MaxUnits(_) => DimensionKind::MaxUnits,
            Dimension::WithWeight(..) => DimensionKind::WithWeight,
        }
    }
}

use crate::error::LoomwidError;

/// Compute the render size a child should use on the horizontal axis,
/// given the parent's size and the child's dimension descriptor.
pub fn sub_size_horizontal(parent: RenderSize, dim: Dimension) -> Result<RenderSize, LoomwidError> {
    sub_size(parent, dim, Axis::Horizontal)
}

/// Compute the render size a child should use on the vertical axis.
pub fn sub_size_vertical(parent: RenderSize, dim: Dimension) -> Result<RenderSize, LoomwidError> {
    sub_size(parent, dim, Axis::Vertical)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

fn sub_size(parent: RenderSize, dim: Dimension, axis: Axis) -> Result<RenderSize, LoomwidError> {
    let parent_extent = match (parent, axis) {
        (RenderSize::Fixed, _) => None,
        (RenderSize::FlowWith(cols), Axis::Horizontal) => Some(cols),
        (RenderSize::FlowWith(_), Axis::Vertical) => None,
        (RenderSize::Box(cols, _), Axis::Horizontal) => Some(cols),
        (RenderSize::Box(_, rows), Axis::Vertical) => Some(rows),
    };

    match (dim, parent_extent) {
        (Dimension::Units(n), _) => Ok(units_to_size(n, axis)),
        (Dimension::MaxUnits(n), Some(max)) => Ok(units_to_size(n.min(max), axis)),
        (Dimension::MaxUnits(n), None) => Ok(units_to_size(n, axis)),
        (Dimension::Relative(r), Some(extent)) => {
            let n = (r * extent as f64).round() as usize;
            Ok(units_to_size(n, axis))
        }
        (Dimension::Relative(_), None) => Err(dim_err(parent, dim)),
        (Dimension::Weight(_), _) | (Dimension::WithWeight(..), _) => Err(dim_err(parent, dim)),
    }
}

fn units_to_size(n: usize, axis: Axis) -> RenderSize {
    match axis {
        Axis::Horizontal => RenderSize::FlowWith(n),
        Axis::Vertical => RenderSize::Box(0, n),
    }
}

fn dim_err(size: RenderSize, dim: Dimension) -> LoomwidError {
    LoomwidError::Dimension {
        size,
        dim: dim.kind(),
        row: None,
    }
}

/// Allot space among `Weight`/`Units`/`Ratio`/`MaxUnits` siblings inside a
/// box parent, per §4.3: units/ratio/max-units siblings are resolved
/// first, and the remainder is distributed among weighted siblings in
/// proportion to their weight.
pub fn allot_weights(total: usize, dims: &[Dimension]) -> Vec<usize> {
    let mut fixed = vec![0usize; dims.len()];
    let mut used = 0usize;
    let mut total_weight = 0.0f64;

    for (i, d) in dims.iter().enumerate() {
        match d {
            Dimension::Units(n) => {
                fixed[i] = *n;
                used += n;
            }
            Dimension::MaxUnits(n) => {
                fixed[i] = *n;
                used += n;
            }
            Dimension::Relative(r) => {
                let n = (r * total as f64).round() as usize;
                fixed[i] = n;
                used += n;
            }
            Dimension::Weight(w) => total_weight += w,
            Dimension::WithWeight(w, _) => total_weight += w,
        }
    }

    let remaining = total.saturating_sub(used);
    let mut out = fixed;
    if total_weight > 0.0 {
        let mut distributed = 0usize;
        let weighted_indices: Vec<usize> = dims
            .iter()
            .enumerate()
            .filter(|(_, d)| matches!(d, Dimension::Weight(_) | Dimension::WithWeight(..)))
            .map(|(i, _)| i)
            .collect();
        for (n, &i) in weighted_indices.iter().enumerate() {
            let w = match dims[i] {
                Dimension::Weight(w) => w,
                Dimension::WithWeight(w, _) => w,
                _ => 0.0,
            };
            let share = if n + 1 == weighted_indices.len() {
                remaining.saturating_sub(distributed)
            } else {
                ((w / total_weight) * remaining as f64).round() as usize
            };
            let share = match dims[i] {
                Dimension::WithWeight(_, cap) => share.min(cap),
                _ => share,
            };
            out[i] = share;
            distributed += share;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_parent_units_child_ok() {
        let r = sub_size_horizontal(RenderSize::Fixed, Dimension::Units(5)).unwrap();
        assert_eq!(r, RenderSize::FlowWith(5));
    }

    #[test]
    fn fixed_parent_weight_child_errors() {
        let r = sub_size_horizontal(RenderSize::Fixed, Dimension::Weight(1.0));
        assert!(r.is_err());
    }

    #[test]
    fn box_parent_ratio_child_rounds() {
        let r = sub_size_horizontal(RenderSize::Box(10, 4), Dimension::Relative(0.5)).unwrap();
        assert_eq!(r, RenderSize::FlowWith(5));
    }

    #[test]
    fn vertical_units_produces_box_with_zero_cols_placeholder() {
        let r = sub_size_vertical(RenderSize::Fixed, Dimension::Units(3)).unwrap();
        assert_eq!(r, RenderSize::Box(0, 3));
    }

    #[test]
    fn allot_weights_splits_proportionally() {
        let dims = [Dimension::Units(2), Dimension::Weight(1.0), Dimension::Weight(3.0)];
        let out = allot_weights(10, &dims);
        assert_eq!(out[0], 2);
        assert_eq!(out[1] + out[2], 8);
        assert!(out[2] > out[1]);
    }

    #[test]
    fn allot_weights_with_cap() {
        let dims = [Dimension::WithWeight(1.0, 3), Dimension::Weight(1.0)];
        let out = allot_weights(20, &dims);
        assert!(out[0] <= 3);
    }
}
