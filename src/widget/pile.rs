//! A vertically-stacked composite-multiple widget (§4.4).

use std::any::Any;

use crate::canvas::Canvas;
use crate::dimension::{allot_weights, sub_size_vertical, Dimension, RenderSize};
use crate::event::{AppHandle, Event};
use crate::widget::text::Text;
use crate::widget::{find_next_selectable, ChildSlot, CompositeMultiple, Selector, Widget};

/// Stacks children top to bottom. Each child's height is resolved from
/// its [`Dimension`] against the available rows, with `Weight`/
/// `WithWeight` children sharing whatever rows the fixed children leave
/// behind.
pub struct Pile {
    children: Vec<ChildSlot>,
    focus_index: Option<usize>,
}

impl Pile {
    /// Build a pile from explicit child slots. The first selectable
    /// child, if any, starts focused.
    pub fn new(children: Vec<ChildSlot>) -> Self {
        let focus_index = find_next_selectable(&children, -1, 1, false);
        Self { children, focus_index }
    }

    /// Convenience constructor: one `Text` child per string, each given
    /// a single row.
    pub fn from_texts(texts: &[&str]) -> Self {
        let children = texts
            .iter()
            .map(|t| ChildSlot {
                widget: Box::new(Text::new(*t)),
                dimension: Dimension::Units(1),
            })
            .collect();
        Self::new(children)
    }
}

impl Widget for Pile {
    fn render(&self, size: RenderSize, focus: Selector, app: &AppHandle) -> Canvas {
        let width = size.cols().unwrap_or(0);
        let total_rows = size.rows();

        let mut canvas = Canvas::blank(width.max(1), 0);
        let heights = total_rows.map(|total| {
            let dims: Vec<Dimension> = self.children.iter().map(|c| c.dimension).collect();
            allot_weights(total, &dims)
        });

        for (i, child) in self.children.iter().enumerate() {
            let child_size = match sub_size_vertical(size, child.dimension) {
                Ok(RenderSize::Box(..)) if heights.is_some() => {
                    RenderSize::Box(width, heights.as_ref().unwrap()[i])
                }
                Ok(RenderSize::Box(_, rows)) => RenderSize::Box(width, rows),
                Ok(other) => other,
                Err(_) => RenderSize::Box(width, 0),
            };
            let child_focus = Selector {
                focus: focus.focus && self.focus_index == Some(i),
                selected: self.focus_index == Some(i),
            };
            let child_canvas = child.widget.render(child_size, child_focus, app);
            let include_cursor = self.focus_index == Some(i);
            canvas.append_below(child_canvas, include_cursor);
        }
        canvas
    }

    fn user_input(&mut self, event: &Event, size: RenderSize, focus: Selector, app: &AppHandle) -> bool {
        if let Some(idx) = self.focus_index {
            let width = size.cols().unwrap_or(0);
            let child_size = sub_size_vertical(size, self.children[idx].dimension).unwrap_or(RenderSize::Box(width, 0));
            let child_focus = Selector { focus: focus.focus, selected: true };
            if self.children[idx].widget.user_input(event, child_size, child_focus, app) {
                return true;
            }
        }
        match event {
            Event::KeyPress(k) if matches!(k.code, crate::event::KeyCode::Down) => {
                if let Some(next) = find_next_selectable(&self.children, self.focus_index.map(|i| i as isize).unwrap_or(-1), 1, false) {
                    self.focus_index = Some(next);
                    return true;
                }
                false
            }
            Event::KeyPress(k) if matches!(k.code, crate::event::KeyCode::Up) => {
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

impl CompositeMultiple for Pile {
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
