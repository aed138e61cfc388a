//! HTTP API module.
//!
//! The upload/preview/download surface and the message stream used to show
//! info, warning and error banners.

pub mod logs;
pub mod server;
pub mod types;

pub use logs::*;
pub use server::start_server;
pub use types::*;
