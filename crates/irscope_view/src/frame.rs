//! Rendered output and the containers that receive it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use irscope_ir::ElementId;

/// One line of a rendered view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameLine {
    pub text: String,
    /// Element the line stands for, if any.
    pub element: Option<ElementId>,
    pub highlighted: bool,
}

/// Everything a view draws in one render.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub title: String,
    pub lines: Vec<FrameLine>,
}

impl Frame {
    pub fn new(title: impl Into<String>) -> Self {
        Frame {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    /// Add a line not tied to an element.
    pub fn text(&mut self, text: impl Into<String>) {
        self.lines.push(FrameLine {
            text: text.into(),
            element: None,
            highlighted: false,
        });
    }

    pub fn element(&mut self, id: ElementId, text: impl Into<String>, highlighted: bool) {
        self.lines.push(FrameLine {
            text: text.into(),
            element: Some(id),
            highlighted,
        });
    }

    /// Add a highlightable line with no element, e.g. a source line.
    pub fn marked(&mut self, text: impl Into<String>, highlighted: bool) {
        self.lines.push(FrameLine {
            text: text.into(),
            element: None,
            highlighted,
        });
    }

    /// Elements drawn highlighted, in line order.
    pub fn highlighted_elements(&self) -> Vec<ElementId> {
        self.lines
            .iter()
            .filter(|l| l.highlighted)
            .filter_map(|l| l.element)
            .collect()
    }

    pub fn highlighted_count(&self) -> usize {
        self.lines.iter().filter(|l| l.highlighted).count()
    }
}

/// Title, then one line per entry; highlighted lines start with `*`.
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.title)?;
        for line in &self.lines {
            let marker = if line.highlighted { '*' } else { ' ' };
            writeln!(f, "{marker} {}", line.text)?;
        }
        Ok(())
    }
}

/// A page element provided to a view for its lifetime.
///
/// Views draw into containers but never create or destroy them; a
/// container goes back to its owner when the view is torn down.
pub trait Container {
    fn draw(&mut self, frame: &Frame);

    /// Remove whatever was drawn.
    fn clear(&mut self) {}
}

impl<C: Container> Container for Rc<RefCell<C>> {
    fn draw(&mut self, frame: &Frame) {
        self.borrow_mut().draw(frame);
    }

    fn clear(&mut self) {
        self.borrow_mut().clear();
    }
}

/// Container that keeps the last frame as plain text.
#[derive(Clone, Debug, Default)]
pub struct TextContainer {
    last: Option<Frame>,
    text: String,
    draws: usize,
}

impl TextContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle, so the owner can read what a view drew into it.
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.last.as_ref()
    }

    /// Number of frames drawn so far.
    pub fn draws(&self) -> usize {
        self.draws
    }
}

impl Container for TextContainer {
    fn draw(&mut self, frame: &Frame) {
        self.text = frame.to_string();
        self.last = Some(frame.clone());
        self.draws += 1;
    }

    fn clear(&mut self) {
        self.text.clear();
        self.last = None;
    }
}
