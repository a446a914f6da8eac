//! Snapshot store access layer

pub mod records;

pub use records::*;
