pub mod protocol;
pub mod types;

pub use protocol::{Command, ErrorPayload, ReadMode, Request, ServerMessage, SqlParams};
pub use types::*;
