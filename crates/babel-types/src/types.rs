use serde::{Deserialize, Serialize};

/// Plain integer rectangle, used for window bounds and the display work area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Rectangle drawn by the user, relative to the overlay window's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRegion {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Absolute screen rectangle used to crop the full-screen bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenRegion {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// One of the three overlay controls that must stay clickable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapePart {
    Menu,
    Selection,
    TextBox,
}

/// Language tags and target folder chosen when an overlay is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySession {
    /// OCR model code, e.g. `jpn`
    pub source_tag_ocr: String,
    /// Translation provider source code, e.g. `JA`
    pub source_tag_translate: String,
    /// Translation provider target code, e.g. `EN-US`
    pub target_tag_translate: String,
    pub folder_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,
}

/// Events pushed from the backend to every connected window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum AppEvent {
    /// Result of a take-shot for the main window. `translated` is `None` when
    /// the translation step failed after recognition succeeded.
    CapturedText {
        text: String,
        translated: Option<String>,
    },
    OverlayOpened {
        work_area: Rect,
        session: OverlaySession,
    },
    /// New input-passthrough region for the overlay window.
    OverlayShape { region: Vec<Rect> },
    OverlayClosed,
    ShotStatus { status: String, capturing: bool },
}
