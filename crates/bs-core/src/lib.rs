//! bs-core: Shared types for the BitSlot workspace
//!
//! Holds the error taxonomy every other crate reports through.

pub mod error;

pub use error::*;
