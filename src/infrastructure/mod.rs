//! Infrastructure layer - shared store backends and process setup

pub mod cache;
pub mod logging;
