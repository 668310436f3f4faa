//! Detectors: line matches, multiplier columns, bonus trigger
//!
//! All three are pure reads of the board. Applying what they find (payout,
//! multiplier stacking, free-spin grants) belongs to [`crate::spin::SpinState`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use bs_stage::{LineKind, Position};

use crate::board::Board;
use crate::symbols::{SymbolCatalog, SymbolId};

/// Cells per line window, and the fewest cleared cells that start a cascade
pub const MATCH_LEN: usize = 3;

/// One matched 3-cell window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineMatch {
    pub line: LineKind,
    pub cells: [Position; MATCH_LEN],
    pub symbol_id: SymbolId,
}

/// Every window matched in one pass over the board
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    /// Windows in scan order: rows, columns, ↘, ↙
    pub lines: Vec<LineMatch>,
    /// Union of all matched cells
    pub cells: BTreeSet<Position>,
}

impl MatchSet {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Enough cells matched to clear and cascade
    pub fn triggers_cascade(&self) -> bool {
        self.cells.len() >= MATCH_LEN
    }
}

/// Scan every row, column and diagonal with a sliding 3-cell window
///
/// Overlapping windows are reported independently: five in a row yields
/// three matches ([0-2], [1-3], [2-4]).
pub fn find_matches(board: &Board, catalog: &SymbolCatalog) -> MatchSet {
    let mut set = MatchSet::default();

    for line in LineKind::ALL {
        for start in board.positions() {
            let Some(cells) = window(board, start, line) else {
                continue;
            };
            if let Some(symbol_id) = matching_symbol(board, catalog, &cells) {
                set.cells.extend(cells);
                set.lines.push(LineMatch {
                    line,
                    cells,
                    symbol_id,
                });
            }
        }
    }

    set
}

/// The window of `MATCH_LEN` cells starting at `start`, if it fits on the board
fn window(board: &Board, start: Position, line: LineKind) -> Option<[Position; MATCH_LEN]> {
    let (dr, dc) = line.step();
    let mut cells = [start; MATCH_LEN];
    for (i, cell) in cells.iter_mut().enumerate() {
        let row = start.row.checked_add_signed(dr * i as isize)?;
        let col = start.col.checked_add_signed(dc * i as isize)?;
        *cell = Position::new(row, col);
        if !board.contains(*cell) {
            return None;
        }
    }
    Some(cells)
}

/// Shared ordinary symbol of a window, if all cells agree
fn matching_symbol(
    board: &Board,
    catalog: &SymbolCatalog,
    cells: &[Position; MATCH_LEN],
) -> Option<SymbolId> {
    let first = board.occupant(cells[0])?;
    if catalog.get(first)?.is_special() {
        return None;
    }
    cells[1..]
        .iter()
        .all(|&p| board.occupant(p) == Some(first))
        .then_some(first)
}

/// Columns filled top to bottom by one multiplier symbol, as (column, value)
pub fn find_multiplier_columns(board: &Board, catalog: &SymbolCatalog) -> Vec<(usize, u32)> {
    (0..board.cols())
        .filter_map(|col| {
            let mut occupants = board.column(col);
            let first = occupants.next()??;
            let symbol = catalog.get(first)?;
            if !symbol.is_multiplier() {
                return None;
            }
            occupants
                .all(|o| o == Some(first))
                .then_some((col, symbol.multiplier_value))
        })
        .collect()
}

/// First bonus cell of each column, only if every column has one
pub fn find_bonus_trigger(board: &Board, catalog: &SymbolCatalog) -> Option<Vec<Position>> {
    (0..board.cols())
        .map(|col| {
            (0..board.rows())
                .map(|row| Position::new(row, col))
                .find(|&p| {
                    board
                        .occupant(p)
                        .and_then(|id| catalog.get(id))
                        .is_some_and(|s| s.is_bonus())
                })
        })
        .collect()
}
