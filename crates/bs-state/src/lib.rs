//! bs-state: Player account and balance persistence
//!
//! The balance is the only value that outlives a session. It is stored as a
//! single keyed numeric record and written on every settled spin.

mod account;
mod store;

pub use account::*;
pub use store::*;
