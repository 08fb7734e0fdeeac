//! Shared building blocks
//!
//! nalgebra math aliases, the sparse set behind component storage and log
//! setup. Nothing in here knows about entities or resources.

pub mod collections;
pub mod logging;
pub mod math;
