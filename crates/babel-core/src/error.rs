/// Failures before any pixels reach the OCR engine.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Invalid capture region: {0}")]
    InvalidRegion(String),

    #[error("No screen source available")]
    NoScreenSource,

    #[error("Region {region} lies outside the captured screen ({width}x{height})")]
    OutOfBounds {
        region: String,
        width: u32,
        height: u32,
    },

    #[error("Screen capture failed: {0}")]
    Capture(String),
}
