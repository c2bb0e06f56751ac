#[macro_use]
extern crate slog;

pub mod config;
pub mod io;
pub mod logging;
pub mod preprocessing;
pub mod syntax;
