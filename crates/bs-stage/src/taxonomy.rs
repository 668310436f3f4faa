//! Stage Taxonomy: Enums for board geometry and win classification

use serde::{Deserialize, Serialize};

/// A cell coordinate on the board (0-indexed, row 0 is the top row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.row, self.col)
    }
}

/// Scan direction of a matched line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// Left to right
    Row,
    /// Top to bottom
    Column,
    /// Top-left to bottom-right (↘)
    DiagonalDown,
    /// Top-right to bottom-left (↙)
    DiagonalUp,
}

impl LineKind {
    pub const ALL: [LineKind; 4] = [
        LineKind::Row,
        LineKind::Column,
        LineKind::DiagonalDown,
        LineKind::DiagonalUp,
    ];

    /// (row, col) step from one cell of the line to the next
    pub fn step(&self) -> (isize, isize) {
        match self {
            Self::Row => (0, 1),
            Self::Column => (1, 0),
            Self::DiagonalDown => (1, 1),
            Self::DiagonalUp => (1, -1),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Row => "Row",
            Self::Column => "Column",
            Self::DiagonalDown => "Diagonal ↘",
            Self::DiagonalUp => "Diagonal ↙",
        }
    }
}

/// Why a spin request was turned away before any state changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    InsufficientBalance,
    SpinInProgress,
    InvalidBet,
}

/// Win tier classification by win-to-bet ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinTier {
    Win,
    BigWin,
    MegaWin,
    EpicWin,
    UltraWin,
}

impl WinTier {
    /// Classify a win. Returns `None` when nothing was won.
    pub fn from_ratio(ratio: f64, thresholds: &WinTierThresholds) -> Option<Self> {
        match ratio {
            r if r <= 0.0 || r.is_nan() => None,
            r if r >= thresholds.ultra_win => Some(Self::UltraWin),
            r if r >= thresholds.epic_win => Some(Self::EpicWin),
            r if r >= thresholds.mega_win => Some(Self::MegaWin),
            r if r >= thresholds.big_win => Some(Self::BigWin),
            _ => Some(Self::Win),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Win => "WIN",
            Self::BigWin => "BIG WIN",
            Self::MegaWin => "MEGA WIN",
            Self::EpicWin => "EPIC WIN",
            Self::UltraWin => "ULTRA WIN",
        }
    }
}

/// Thresholds for categorizing wins (bet multiples)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WinTierThresholds {
    pub big_win: f64,
    pub mega_win: f64,
    pub epic_win: f64,
    pub ultra_win: f64,
}

impl Default for WinTierThresholds {
    fn default() -> Self {
        Self {
            big_win: 15.0,
            mega_win: 25.0,
            epic_win: 50.0,
            ultra_win: 100.0,
        }
    }
}
