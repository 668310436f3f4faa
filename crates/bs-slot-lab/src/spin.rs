//! Per-spin working state and the settled spin record

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use bs_stage::{Position, WinTier};

use crate::board::Board;
use crate::matcher::LineMatch;
use crate::symbols::SymbolCatalog;

/// Where the engine is in resolving a spin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinPhase {
    Idle,
    BetPlaced,
    BoardFilled,
    Matching,
    Cascading,
    Settled,
}

/// Accumulators for one spin, including all of its cascade passes
///
/// Created at BetPlaced, consumed at Settled.
#[derive(Debug, Clone)]
pub struct SpinState {
    pub bet: f64,
    /// Paid for by the free-spin counter rather than the balance
    pub free_spin: bool,
    /// Winnings before the multiplier
    pub winnings: f64,
    /// Running multiplier, product of distinct applied values
    pub multiplier: u32,
    applied_multipliers: BTreeSet<u32>,
    free_spins_granted: bool,
    /// Free spins awarded during this spin
    pub free_spins_awarded: u32,
    /// Every cell matched in any pass
    pub matched: BTreeSet<Position>,
    pub cascade_steps: u32,
}

impl SpinState {
    pub fn new(bet: f64, free_spin: bool) -> Self {
        Self {
            bet,
            free_spin,
            winnings: 0.0,
            multiplier: 1,
            applied_multipliers: BTreeSet::new(),
            free_spins_granted: false,
            free_spins_awarded: 0,
            matched: BTreeSet::new(),
            cascade_steps: 0,
        }
    }

    /// Add `value × bet` for every matched line of an ordinary symbol
    ///
    /// Returns the amount added.
    pub fn score(&mut self, lines: &[LineMatch], catalog: &SymbolCatalog) -> f64 {
        let mut delta = 0.0;
        for line in lines {
            self.matched.extend(line.cells);
            match catalog.get(line.symbol_id) {
                Some(symbol) if !symbol.is_special() => delta += symbol.value * self.bet,
                _ => {}
            }
        }
        self.winnings += delta;
        delta
    }

    /// Fold a multiplier column into the running multiplier
    ///
    /// A value already applied earlier in this spin does not stack again.
    /// Returns whether it was applied.
    pub fn apply_multiplier(&mut self, value: u32) -> bool {
        if !self.applied_multipliers.insert(value) {
            return false;
        }
        self.multiplier = self.multiplier.saturating_mul(value);
        true
    }

    pub fn multiplier_applied(&self, value: u32) -> bool {
        self.applied_multipliers.contains(&value)
    }

    /// Grant free spins once per spin; later triggers in the cascade are ignored
    pub fn grant_free_spins(&mut self, count: u32) -> bool {
        if self.free_spins_granted {
            return false;
        }
        self.free_spins_granted = true;
        self.free_spins_awarded += count;
        true
    }

    pub fn free_spins_granted(&self) -> bool {
        self.free_spins_granted
    }

    /// Winnings with the multiplier applied once
    pub fn final_winnings(&self) -> f64 {
        self.winnings * self.multiplier as f64
    }
}

/// A multiplier column that was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplierTrigger {
    pub column: usize,
    pub value: u32,
    /// Cascade pass it was found in (0 = initial board)
    pub pass: u32,
}

/// One clear-and-refill step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeResult {
    pub step_index: u32,
    /// Cells cleared and then refilled, row-major
    pub cells: Vec<Position>,
    /// Ordinary winnings found in the pass that caused this step
    pub win: f64,
    /// Board after the refill
    pub board: Board,
}

/// Complete spin result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinResult {
    pub spin_id: String,
    pub bet: f64,
    pub is_free_spin: bool,
    /// Board as filled at BoardFilled
    pub initial_board: Board,
    /// Board after the last cascade
    pub final_board: Board,
    /// Every line matched, across all passes
    pub line_matches: Vec<LineMatch>,
    pub cascades: Vec<CascadeResult>,
    pub multiplier_triggers: Vec<MultiplierTrigger>,
    /// Cells that triggered the bonus, one per column
    pub bonus_trigger: Option<Vec<Position>>,
    pub free_spins_awarded: u32,
    pub free_spins_remaining: u32,
    /// Winnings before the multiplier
    pub base_win: f64,
    pub multiplier: u32,
    pub total_win: f64,
    pub win_ratio: f64,
    pub win_tier: Option<WinTier>,
    pub balance_after: f64,
    /// Resolution stopped at the cascade cap rather than on a quiet board
    pub cascade_capped: bool,
}

impl SpinResult {
    /// Check if this is a win
    pub fn is_win(&self) -> bool {
        self.total_win > 0.0
    }

    pub fn cascade_count(&self) -> usize {
        self.cascades.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bs_stage::LineKind;

    use crate::symbols::Symbol;

    fn catalog() -> SymbolCatalog {
        SymbolCatalog::new(vec![
            Symbol::regular(0, "A", 2.0, 1.0),
            Symbol::regular(1, "B", 3.0, 1.0),
        ])
        .unwrap()
    }

    fn row_match(row: usize, start: usize, symbol_id: u32) -> LineMatch {
        LineMatch {
            line: LineKind::Row,
            cells: [
                Position::new(row, start),
                Position::new(row, start + 1),
                Position::new(row, start + 2),
            ],
            symbol_id,
        }
    }

    #[test]
    fn test_score_per_line() {
        let mut state = SpinState::new(10.0, false);
        let delta = state.score(&[row_match(0, 0, 0)], &catalog());
        assert_eq!(delta, 20.0);

        // Overlapping window pays again
        state.score(&[row_match(0, 1, 0)], &catalog());
        assert_eq!(state.winnings, 40.0);
        assert_eq!(state.matched.len(), 4);
    }

    #[test]
    fn test_multiplier_stacking() {
        let mut state = SpinState::new(5.0, false);
        assert!(state.apply_multiplier(3));
        assert!(!state.apply_multiplier(3));
        assert_eq!(state.multiplier, 3);

        assert!(state.apply_multiplier(2));
        assert_eq!(state.multiplier, 6);
        assert!(state.multiplier_applied(2));
    }

    #[test]
    fn test_multiplier_applied_once_at_finalization() {
        let mut state = SpinState::new(5.0, false);
        state.score(&[row_match(0, 0, 1)], &catalog());
        state.apply_multiplier(4);
        assert_eq!(state.winnings, 15.0);
        assert_eq!(state.final_winnings(), 60.0);
    }

    #[test]
    fn test_free_spins_granted_once() {
        let mut state = SpinState::new(1.0, true);
        assert!(state.grant_free_spins(5));
        assert!(!state.grant_free_spins(5));
        assert_eq!(state.free_spins_awarded, 5);
        assert!(state.free_spins_granted());
    }
}
