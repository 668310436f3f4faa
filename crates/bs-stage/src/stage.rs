//! Stage: The enum of everything a spin can report
//!
//! A Stage is NOT an animation and NOT a sound. It is the semantic meaning of
//! a moment in spin resolution. Presentation sequences its own tweens and
//! clips against the ordered stream.

use serde::{Deserialize, Serialize};

use crate::taxonomy::{LineKind, Position, RejectReason};

/// Canonical spin stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stage {
    // ═══════════════════════════════════════════════════════════════════════
    // SPIN LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════
    /// Bet accepted, board about to be filled
    SpinStart {
        bet: f64,
        /// Spin was paid for by the free-spin counter
        #[serde(default)]
        free_spin: bool,
    },

    /// Spin fully resolved and balance credited
    SpinSettled {
        final_winnings: f64,
        new_balance: f64,
        multiplier: u32,
    },

    /// Spin turned away, nothing was mutated
    SpinRejected { reason: RejectReason },

    // ═══════════════════════════════════════════════════════════════════════
    // RESOLUTION
    // ═══════════════════════════════════════════════════════════════════════
    /// A 3-cell window of identical ordinary symbols
    MatchFound {
        line: LineKind,
        cells: Vec<Position>,
        symbol_id: u32,
        symbol: String,
    },

    /// A full column of one multiplier symbol was applied to the running multiplier
    MultiplierTriggered {
        column: usize,
        value: u32,
        /// Running multiplier after this trigger
        total: u32,
    },

    /// Every column holds a bonus symbol; free spins granted
    BonusTriggered {
        /// First bonus cell of each column, left to right
        cells: Vec<Position>,
        free_spins_granted: u32,
    },

    /// Matched cells cleared and refilled; another matching pass follows
    CascadeStep {
        step_index: u32,
        cleared: Vec<Position>,
        refilled: Vec<Position>,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // ACCOUNT
    // ═══════════════════════════════════════════════════════════════════════
    /// Bet size changed by the player
    BetChanged { bet: f64 },
}

impl Stage {
    /// Upper-snake name used for routing and logs
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SpinStart { .. } => "SPIN_START",
            Self::SpinSettled { .. } => "SPIN_SETTLED",
            Self::SpinRejected { .. } => "SPIN_REJECTED",
            Self::MatchFound { .. } => "MATCH_FOUND",
            Self::MultiplierTriggered { .. } => "MULTIPLIER_TRIGGERED",
            Self::BonusTriggered { .. } => "BONUS_TRIGGERED",
            Self::CascadeStep { .. } => "CASCADE_STEP",
            Self::BetChanged { .. } => "BET_CHANGED",
        }
    }

    /// Stages that close a spin request
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::SpinSettled { .. } | Self::SpinRejected { .. })
    }
}
