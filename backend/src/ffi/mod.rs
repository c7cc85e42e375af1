//! FFI module for Python bindings
//!
//! This module is only compiled when the "pyo3" feature is enabled.

pub mod sequencer;
