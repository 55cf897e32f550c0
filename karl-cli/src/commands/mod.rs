//! CLI command implementations.

pub mod common;
pub mod config;
pub mod icons;
pub mod images;
