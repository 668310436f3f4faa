//! The board: a fixed rows × cols grid of occupants

use serde::{Deserialize, Serialize};

use bs_core::{BsError, BsResult};
use bs_stage::Position;

use crate::config::GridSpec;
use crate::selector::SymbolSource;
use crate::symbols::{SymbolCatalog, SymbolId};

/// A cell view: where it is and what sits in it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub position: Position,
    pub occupant: Option<SymbolId>,
}

/// Fixed-size grid. Dimensions never change; only occupants do.
///
/// Cells are empty only between a clear and the refill that follows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    rows: usize,
    cols: usize,
    /// Row-major occupants
    cells: Vec<Option<SymbolId>>,
}

impl Board {
    /// Empty board
    pub fn new(grid: GridSpec) -> Self {
        Self {
            rows: grid.rows,
            cols: grid.cols,
            cells: vec![None; grid.total_positions()],
        }
    }

    /// Board from rows of ids (top row first)
    pub fn from_rows(rows: Vec<Vec<SymbolId>>) -> BsResult<Self> {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        if rows.is_empty() || cols == 0 {
            return Err(BsError::InvalidConfiguration("board must not be empty".into()));
        }
        if let Some(ragged) = rows.iter().position(|r| r.len() != cols) {
            return Err(BsError::InvalidConfiguration(format!(
                "row {} has {} cells, expected {}",
                ragged,
                rows[ragged].len(),
                cols
            )));
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            cells: rows.into_iter().flatten().map(Some).collect(),
        })
    }

    /// Board from rows of symbol names
    pub fn from_names(catalog: &SymbolCatalog, rows: &[&[&str]]) -> BsResult<Self> {
        let ids = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|name| catalog.id_of(name))
                    .collect::<BsResult<Vec<_>>>()
            })
            .collect::<BsResult<Vec<_>>>()?;
        Self::from_rows(ids)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn grid(&self) -> GridSpec {
        GridSpec::new(self.rows, self.cols)
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    fn index(&self, pos: Position) -> BsResult<usize> {
        if self.contains(pos) {
            Ok(pos.row * self.cols + pos.col)
        } else {
            Err(BsError::MissingGridReference {
                row: pos.row,
                col: pos.col,
            })
        }
    }

    /// Occupant at `pos`
    pub fn get(&self, pos: Position) -> BsResult<Option<SymbolId>> {
        Ok(self.cells[self.index(pos)?])
    }

    /// Occupant at `pos`, `None` when empty or off the board
    pub fn occupant(&self, pos: Position) -> Option<SymbolId> {
        self.get(pos).ok().flatten()
    }

    pub fn cell(&self, pos: Position) -> BsResult<Cell> {
        Ok(Cell {
            position: pos,
            occupant: self.get(pos)?,
        })
    }

    pub fn set(&mut self, pos: Position, id: SymbolId) -> BsResult<()> {
        let idx = self.index(pos)?;
        self.cells[idx] = Some(id);
        Ok(())
    }

    /// Empty the given cells
    pub fn clear(&mut self, positions: &[Position]) -> BsResult<()> {
        let indices = positions
            .iter()
            .map(|&p| self.index(p))
            .collect::<BsResult<Vec<_>>>()?;
        for idx in indices {
            self.cells[idx] = None;
        }
        Ok(())
    }

    /// Draw a fresh occupant for every cell, row-major
    pub fn fill(&mut self, source: &mut dyn SymbolSource) {
        for cell in &mut self.cells {
            *cell = Some(source.draw());
        }
    }

    /// Draw fresh occupants for `positions` only, in the order given
    ///
    /// Validates every position before touching the board.
    pub fn refill(
        &mut self,
        positions: &[Position],
        source: &mut dyn SymbolSource,
    ) -> BsResult<()> {
        let indices = positions
            .iter()
            .map(|&p| self.index(p))
            .collect::<BsResult<Vec<_>>>()?;
        for idx in indices {
            self.cells[idx] = Some(source.draw());
        }
        Ok(())
    }

    /// True when no cell is empty
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// All positions, row-major
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Position::new(row, col)))
    }

    /// All cells, row-major
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.positions().map(move |position| Cell {
            position,
            occupant: self.cells[position.row * self.cols + position.col],
        })
    }

    /// Occupants of one column, top to bottom
    pub fn column(&self, col: usize) -> impl Iterator<Item = Option<SymbolId>> + '_ {
        (0..self.rows).map(move |row| {
            if col < self.cols {
                self.cells[row * self.cols + col]
            } else {
                None
            }
        })
    }

    /// Snapshot as rows of occupants
    pub fn to_rows(&self) -> Vec<Vec<Option<SymbolId>>> {
        self.cells.chunks(self.cols).map(|r| r.to_vec()).collect()
    }

    /// Human-readable grid of symbol names, `.` for empty
    pub fn render(&self, catalog: &SymbolCatalog) -> String {
        self.to_rows()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| {
                        cell.and_then(|id| catalog.get(id))
                            .map(|s| s.name.as_str())
                            .unwrap_or(".")
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::ScriptedSource;

    #[test]
    fn test_fill_replaces_every_cell() {
        let mut board = Board::new(GridSpec::new(2, 3));
        assert!(!board.is_full());

        let mut source = ScriptedSource::new(vec![0, 1, 2, 3, 4, 5]).unwrap();
        board.fill(&mut source);

        assert!(board.is_full());
        assert_eq!(
            board.to_rows(),
            vec![
                vec![Some(0), Some(1), Some(2)],
                vec![Some(3), Some(4), Some(5)]
            ]
        );
    }

    #[test]
    fn test_refill_touches_only_given_cells() {
        let mut board = Board::from_rows(vec![vec![0, 0, 0], vec![1, 1, 1]]).unwrap();
        let targets = [Position::new(0, 1), Position::new(1, 2)];

        board.clear(&targets).unwrap();
        assert_eq!(board.get(Position::new(0, 1)).unwrap(), None);

        let mut source = ScriptedSource::new(vec![7, 8]).unwrap();
        board.refill(&targets, &mut source).unwrap();

        assert_eq!(
            board.to_rows(),
            vec![
                vec![Some(0), Some(7), Some(0)],
                vec![Some(1), Some(1), Some(8)]
            ]
        );
    }

    #[test]
    fn test_missing_grid_reference() {
        let mut board = Board::new(GridSpec::new(2, 2));
        let off = Position::new(2, 0);

        assert!(matches!(
            board.get(off),
            Err(BsError::MissingGridReference { row: 2, col: 0 })
        ));

        // A bad position aborts the refill before any cell changes
        let mut source = ScriptedSource::new(vec![9]).unwrap();
        assert!(
            board
                .refill(&[Position::new(0, 0), off], &mut source)
                .is_err()
        );
        assert_eq!(board.get(Position::new(0, 0)).unwrap(), None);
        assert_eq!(source.draws(), 0);
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        assert!(Board::from_rows(vec![vec![0, 1], vec![0]]).is_err());
        assert!(Board::from_rows(Vec::new()).is_err());
    }

    #[test]
    fn test_column_and_render() {
        let catalog = SymbolCatalog::standard();
        let board = Board::from_names(&catalog, &[&["Cherry", "Bell"], &["Lemon", "Bell"]]).unwrap();

        let col: Vec<_> = board.column(1).collect();
        assert_eq!(col, vec![Some(3), Some(3)]);
        assert_eq!(board.render(&catalog), "Cherry Bell\nLemon Bell");
        assert_eq!(board.cells().count(), 4);
    }
}
