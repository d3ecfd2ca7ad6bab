use babel_types::Rect;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct OverlayConfig {
    /// Work area of the primary display. When unset the monitor bounds are used,
    /// which is only correct without docks or taskbars.
    pub work_area: Option<Rect>,
}
