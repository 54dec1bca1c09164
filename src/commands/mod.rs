//! Command handlers.

pub mod mapping;
pub mod run;
pub mod sample;
