pub mod error;
pub mod geometry;
pub mod language;
pub mod normalize;
pub mod session;
pub mod shapes;

pub use error::CaptureError;
pub use normalize::{CjkWhitespaceNormalizer, TextNormalizer};
pub use session::SessionContext;
pub use shapes::{ShapeSet, ShapeSynchronizer};
