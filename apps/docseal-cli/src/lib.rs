//! Command-line front end for docseal
//!
//! One-shot `hash`, `sign` and `verify` commands plus an interactive
//! session that keeps a single engine (and key pair) alive.

pub mod commands;
pub mod config;
pub mod output;
pub mod picker;
pub mod session;

pub use config::Config;
pub use output::Format;
