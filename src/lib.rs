//! mp4forge - encoding preset compiler and runner
//!
//! This library crate exposes the configuration and orchestration layers for
//! integration testing. The compiler itself lives in `mp4forge-encoder`.

pub mod config;
pub mod encode;
