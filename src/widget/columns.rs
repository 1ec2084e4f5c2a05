//! A horizontally-arranged composite-multiple widget (§4.4).

use std::any::Any;

use crate::canvas::Canvas;
use crate::dimension::{allot_weights, sub_size_horizontal, Dimension, RenderSize};
use crate::event::{AppHandle, Event};
use crate::widget::{find_next_selectable, ChildSlot, CompositeMultiple, Selector, Widget};

/// Arranges children left to right, splitting the available columns
/// the same way [`crate::widget::Pile`] splits rows.
pub struct Columns {
    children: Vec<ChildSlot>,
    focus_index: Option<usize>,
}

impl Columns {
    /// Build from explicit child slots. The first selectable child, if
    /// any, starts focused.
    pub fn new(children: Vec<ChildSlot>) -> Self {
        let focus_index = find_next_selectable(&children, -1, 1, false);
        Self { children, focus_index }
    }
}

impl Widget for Columns {
    fn render(&self, size: RenderSize, focus: Selector, app: &AppHandle) -> Canvas {
        let height = size.rows().unwrap_or(1).max(1);
        let total_cols = size.cols();

        let mut canvas = Canvas::blank(0, height);
        let widths = total_cols.map(|total| {
            let dims: Vec<Dimension> = self.children.iter().map(|c| c.dimension).collect();
            allot_weights(total, &dims)
        });

        for (i, child) in self.children.iter().enumerate() {
            let child_size = match sub_size_horizontal(size, child.dimension) {
                Ok(RenderSize::FlowWith(_)) if widths.is_some() => {
                    RenderSize::Box(widths.as_ref().unwrap()[i], height)
                }
                Ok(RenderSize::FlowWith(cols)) => RenderSize::Box(cols, height),
                Ok(other) => other,
                Err(_) => RenderSize::Box(0, height),
            };
            let child_focus = Selector {
                focus: focus.focus && self.focus_index == Some(i),
                selected: self.focus_index == Some(i),
            };
            let child_canvas = child.widget.render(child_size, child_focus, app);
            let include_cursor = self.focus_index == Some(i);
            canvas.append_right(child_canvas, include_cursor);
        }
        canvas
    }

    fn user_input(&mut self, event: &Event, size: RenderSize, focus: Selector, app: &AppHandle) -> bool {
        if let Some(idx) = self.focus_index {
            let height = size.rows().unwrap_or(1).max(1);
            let child_size = sub_size_horizontal(size, self.children[idx].dimension).unwrap_or(RenderSize::Box(0, height));
            let child_focus = Selector { focus: focus.focus, selected: true };
            if self.children[idx].widget.user_input(event, child_size, child_focus, app) {
                return true;
            }
        }
        match event {
            Event::KeyPress(k) if matches!(k.code, crate::event::KeyCode::Right) => {
                if let Some(next) = find_next_selectable(&self.children, self.focus_index.map(|i| i as isize).unwrap_or(-1), 1, false) {
                    self.focus_index = Some(next);
                    return true;
                }
                false
            }
            Event::KeyPress(k) if matches!(k.code, crate::event::KeyCode::Left) => {
                if let Some(next) = find_next_selectable(&self.children, self.focus_index.map(|i| i as isize).unwrap_or(self.children.len() as isize), -1, false) {
                    self.focus_index = Some(next);
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    fn selectable(&self) -> bool {
        self.focus_index.is_some()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_composite_multiple(&self) -> Option<&dyn CompositeMultiple> {
        Some(self)
    }

    fn as_composite_multiple_mut(&mut self) -> Option<&mut dyn CompositeMultiple> {
        Some(self)
    }
}

impl CompositeMultiple for Columns {
    fn children(&self) -> &[ChildSlot] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut Vec<ChildSlot> {
        &mut self.children
    }

    fn focus_index(&self) -> Option<usize> {
        self.focus_index
    }

    fn set_focus_index(&mut self, index: Option<usize>) {
        self.focus_index = index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::text::Text;

    fn slot(text: &str, dim: Dimension) -> ChildSlot {
        ChildSlot {
            widget: Box::new(Text::new(text)),
            dimension: dim,
        }
    }

    #[test]
    fn columns_arranges_children_left_to_right() {
        let c = Columns::new(vec![slot("ab", Dimension::Units(2)), slot("cd", Dimension::Units(2))]);
        let canvas = c.render(RenderSize::Box(4, 1), Selector::none(), &crate::event::test_handle());
        assert_eq!(canvas.width(), 4);
    }
}
