//! # bs-slot-lab: BitSlot Spin Resolution Engine
//!
//! Resolves a slot/match-3 hybrid spin from bet to settled balance without
//! any presentation dependency. Given a symbol catalog and a board size, each
//! spin fills the board with weighted-random symbols, scans for 3-in-a-row
//! lines, cascades cleared cells until the board is quiet, applies multiplier
//! columns, grants bonus free spins, and credits the account.
//!
//! ## Architecture
//!
//! ```text
//! SpinEngine
//!     │
//!     ├── SymbolCatalog (values, weights, multiplier/bonus flags)
//!     ├── Board (rows × cols of occupants)
//!     ├── SymbolSource (WeightedSelector / ScriptedSource)
//!     ├── Account + BalanceStore (bs-state)
//!     └── StageSink (bs-stage)
//!           │
//!           v
//!     SpinResult + ordered StageEvents
//! ```
//!
//! ## State machine
//!
//! ```text
//! Idle → BetPlaced → BoardFilled → Matching ⇄ Cascading → Settled → Idle
//! ```

pub mod board;
pub mod config;
pub mod engine;
pub mod matcher;
pub mod selector;
pub mod spin;
pub mod symbols;

pub use board::*;
pub use config::*;
pub use engine::*;
pub use matcher::*;
pub use selector::*;
pub use spin::*;
pub use symbols::*;
