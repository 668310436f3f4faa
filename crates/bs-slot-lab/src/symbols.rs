//! Symbol definitions and the catalog index

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use bs_core::{BsError, BsResult};

/// Dense index into a [`SymbolCatalog`]
pub type SymbolId = u32;

/// Symbol type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SymbolType {
    /// Ordinary paying symbol, matched in lines of 3
    Regular = 0,
    /// Multiplies the spin's winnings when it fills a column
    Multiplier = 1,
    /// Grants free spins when every column holds one
    Bonus = 2,
}

/// Display color, parsed from `#RRGGBB` or `#RRGGBBAA`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse a hex color string
    pub fn from_hex(hex: &str) -> BsResult<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let bad = || BsError::InvalidConfiguration(format!("invalid color '{}'", hex));

        if !(digits.len() == 6 || digits.len() == 8) || !digits.is_ascii() {
            return Err(bad());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| bad());

        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if digits.len() == 8 { channel(6)? } else { 255 },
        })
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl TryFrom<String> for Color {
    type Error = BsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// A symbol definition
///
/// Immutable once the catalog is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// Catalog index
    pub id: SymbolId,
    /// Unique identifier (e.g., "Cherry", "X3", "Bonus")
    pub name: String,
    /// Base payout per matched line, in bet multiples
    pub value: f64,
    /// Relative spawn probability
    pub weight: f64,
    pub symbol_type: SymbolType,
    /// Multiplier applied by a full column (1 for non-multipliers)
    pub multiplier_value: u32,
    pub color: Color,
}

impl Symbol {
    /// Create a regular symbol
    pub fn regular(id: SymbolId, name: impl Into<String>, value: f64, weight: f64) -> Self {
        Self {
            id,
            name: name.into(),
            value,
            weight,
            symbol_type: SymbolType::Regular,
            multiplier_value: 1,
            color: Color::WHITE,
        }
    }

    /// Create a multiplier symbol
    pub fn multiplier(id: SymbolId, name: impl Into<String>, multiplier: u32, weight: f64) -> Self {
        Self {
            id,
            name: name.into(),
            value: 0.0,
            weight,
            symbol_type: SymbolType::Multiplier,
            multiplier_value: multiplier,
            color: Color::WHITE,
        }
    }

    /// Create a bonus symbol
    pub fn bonus(id: SymbolId, name: impl Into<String>, weight: f64) -> Self {
        Self {
            id,
            name: name.into(),
            value: 0.0,
            weight,
            symbol_type: SymbolType::Bonus,
            multiplier_value: 1,
            color: Color::WHITE,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn is_multiplier(&self) -> bool {
        self.symbol_type == SymbolType::Multiplier
    }

    pub fn is_bonus(&self) -> bool {
        self.symbol_type == SymbolType::Bonus
    }

    /// Multiplier and bonus symbols never take part in line matches
    pub fn is_special(&self) -> bool {
        !matches!(self.symbol_type, SymbolType::Regular)
    }
}

/// The symbol catalog: dense ids plus a name index
#[derive(Debug, Clone)]
pub struct SymbolCatalog {
    symbols: Vec<Symbol>,
    by_name: HashMap<String, SymbolId>,
}

impl SymbolCatalog {
    /// Build a catalog, renumbering ids to match positions
    pub fn new(symbols: Vec<Symbol>) -> BsResult<Self> {
        if symbols.is_empty() {
            return Err(BsError::InvalidConfiguration(
                "symbol catalog is empty".into(),
            ));
        }

        let mut by_name = HashMap::with_capacity(symbols.len());
        let mut indexed = Vec::with_capacity(symbols.len());
        for (idx, mut symbol) in symbols.into_iter().enumerate() {
            let id = idx as SymbolId;
            if by_name.insert(symbol.name.clone(), id).is_some() {
                return Err(BsError::InvalidConfiguration(format!(
                    "duplicate symbol name '{}'",
                    symbol.name
                )));
            }
            symbol.id = id;
            indexed.push(symbol);
        }

        Ok(Self {
            symbols: indexed,
            by_name,
        })
    }

    /// Playable default set
    pub fn standard() -> Self {
        let symbols = vec![
            Symbol::regular(0, "Cherry", 1.0, 20.0).with_color(Color::rgb(0xD7, 0x26, 0x3D)),
            Symbol::regular(1, "Lemon", 1.0, 20.0).with_color(Color::rgb(0xF4, 0xD3, 0x5E)),
            Symbol::regular(2, "Grape", 2.0, 16.0).with_color(Color::rgb(0x6A, 0x4C, 0x93)),
            Symbol::regular(3, "Bell", 3.0, 12.0).with_color(Color::rgb(0xF5, 0xA6, 0x23)),
            Symbol::regular(4, "Clover", 4.0, 10.0).with_color(Color::rgb(0x2E, 0x8B, 0x57)),
            Symbol::regular(5, "Diamond", 6.0, 6.0).with_color(Color::rgb(0x4F, 0xC3, 0xF7)),
            Symbol::regular(6, "Seven", 10.0, 4.0).with_color(Color::rgb(0xE5, 0x39, 0x35)),
            Symbol::multiplier(7, "X2", 2, 3.0).with_color(Color::rgb(0xFF, 0xD7, 0x00)),
            Symbol::multiplier(8, "X3", 3, 2.0).with_color(Color::rgb(0xFF, 0xA5, 0x00)),
            Symbol::bonus(9, "Bonus", 3.0).with_color(Color::rgb(0x00, 0xE5, 0xFF)),
        ];
        Self {
            by_name: symbols
                .iter()
                .map(|s| (s.name.clone(), s.id))
                .collect(),
            symbols,
        }
    }

    /// Get symbol by ID
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id as usize)
    }

    /// Get symbol by name
    pub fn find(&self, name: &str) -> Option<&Symbol> {
        self.by_name.get(name).and_then(|&id| self.get(id))
    }

    /// Id for a name, or `InvalidConfiguration` when it is not in the catalog
    pub fn id_of(&self, name: &str) -> BsResult<SymbolId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| BsError::InvalidConfiguration(format!("unknown symbol '{}'", name)))
    }

    /// Spawn weights, parallel to ids
    pub fn weights(&self) -> Vec<f64> {
        self.symbols.iter().map(|s| s.weight).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Get all regular symbol IDs
    pub fn regular_ids(&self) -> Vec<SymbolId> {
        self.symbols
            .iter()
            .filter(|s| !s.is_special())
            .map(|s| s.id)
            .collect()
    }
}

impl Default for SymbolCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
