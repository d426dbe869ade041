//! Python bindings
//!
//! Exposes [`crate::Market`] to a Python host. Times cross the boundary as
//! unix seconds and configs and checkpoints as JSON strings.

pub mod market;
