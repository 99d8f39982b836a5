// Library interface for the tweaknow CLI (also used by integration tests)
pub mod api;
pub mod config;

#[macro_use]
pub mod logging;

pub mod render;
pub mod server_config;
pub mod session;
pub mod source;
