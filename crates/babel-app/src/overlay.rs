use babel_core::{SessionContext, ShapeSynchronizer};
use babel_types::{OverlaySession, Rect, ShapePart};

/// Everything tied to the overlay window's lifetime.
///
/// Created empty, filled on `new-overlay`, emptied on `close-overlay`. The
/// passthrough shapes start over with every overlay.
#[derive(Debug, Default)]
pub struct OverlayState {
    session: SessionContext,
    shapes: ShapeSynchronizer,
    work_area: Option<Rect>,
}

impl OverlayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the replaced session when an overlay was already open. The
    /// window stays as it is then, so its shapes and work area are kept.
    pub fn open(&mut self, session: OverlaySession, work_area: Rect) -> Option<OverlaySession> {
        if !self.session.is_open() {
            self.shapes.reset();
            self.work_area = Some(work_area);
        }
        self.session.open(session)
    }

    /// Returns whether an overlay was open.
    pub fn close(&mut self) -> bool {
        self.shapes.reset();
        self.work_area = None;
        self.session.close().is_some()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_open()
    }

    pub fn session(&self) -> Option<OverlaySession> {
        self.session.current().cloned()
    }

    pub fn work_area(&self) -> Option<Rect> {
        self.work_area
    }

    /// Region to apply to the overlay window, if this update completed the set
    /// and an overlay is there to receive it.
    pub fn update_bounds(&mut self, part: ShapePart, rect: Rect) -> Option<Vec<Rect>> {
        let region = self.shapes.update(part, rect)?.to_vec();
        self.is_open().then_some(region)
    }

    pub fn current_region(&self) -> &[Rect] {
        self.shapes.current_region()
    }

    pub fn summary(&self) -> String {
        let mut summary = self.session.summary();
        if let Some(area) = self.work_area {
            summary.push_str(&format!(
                "\nWork area: {}x{} at ({}, {})\nPassthrough regions: {}",
                area.width,
                area.height,
                area.x,
                area.y,
                self.current_region().len()
            ));
        }
        summary
    }
}
