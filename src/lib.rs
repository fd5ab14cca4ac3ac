//! Mediascope - streaming media analysis on top of MediaInfoLib
//!
//! This library crate exposes the CLI's building blocks for integration testing.

pub mod config;
pub mod input;
pub mod summary;
