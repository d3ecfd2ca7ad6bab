pub mod ws;

pub use ws::{Inbound, bind, serve};
