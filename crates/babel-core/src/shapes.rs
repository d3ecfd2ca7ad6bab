//! Input-passthrough region of the overlay window.
//!
//! The overlay is click-through everywhere except over its menu, selection and
//! text box. Each of the three reports its bounds on its own schedule; the region
//! is only rebuilt once all three are known.

use babel_types::{Rect, ShapePart};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ShapeSet {
    pub menu: Option<Rect>,
    pub selection: Option<Rect>,
    pub text_box: Option<Rect>,
}

impl ShapeSet {
    fn set(&mut self, part: ShapePart, rect: Rect) {
        match part {
            ShapePart::Menu => self.menu = Some(rect),
            ShapePart::Selection => self.selection = Some(rect),
            ShapePart::TextBox => self.text_box = Some(rect),
        }
    }

    /// All three rectangles, or `None` while any is missing.
    pub fn complete(&self) -> Option<[Rect; 3]> {
        match (self.menu, self.selection, self.text_box) {
            (Some(menu), Some(selection), Some(text_box)) => Some([menu, selection, text_box]),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct ShapeSynchronizer {
    shapes: ShapeSet,
    region: Vec<Rect>,
}

impl ShapeSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record new bounds for `part`.
    ///
    /// Returns the recomputed region when all three parts are present, so the
    /// caller can apply it to the window. `None` means the applied region is unchanged.
    pub fn update(&mut self, part: ShapePart, rect: Rect) -> Option<&[Rect]> {
        self.shapes.set(part, rect);

        let rects = self.shapes.complete()?;
        self.region = rects.to_vec();
        tracing::debug!(?part, "passthrough region recomputed");
        Some(&self.region)
    }

    /// Last applied region; empty means fully click-through.
    pub fn current_region(&self) -> &[Rect] {
        &self.region
    }

    /// Forget every part, used when an overlay is opened or closed.
    pub fn reset(&mut self) {
        self.shapes = ShapeSet::default();
        self.region.clear();
    }
}
