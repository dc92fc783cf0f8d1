// file: src/logging/mod.rs
// version: 2.0.0
// guid: 0b7e2d94-1c6a-4f83-9e55-a8d3c2f1b604

//! Logging setup for the installer

pub mod logger;

pub use logger::{init_logger, with_async_operation_span};
