#![forbid(unsafe_code)]

//! Terminal front end for the cspdash study dashboard.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod paint;
pub mod player;

pub use cli::{run, run_from_env};
