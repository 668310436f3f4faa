//! Engine configuration
//!
//! Everything the engine consumes at startup: board size, symbol catalog,
//! bet settings, and the cascade cap. Loadable from JSON or YAML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use bs_core::{BsError, BsResult};
use bs_stage::WinTierThresholds;

use crate::symbols::{Color, Symbol, SymbolCatalog, SymbolType};

/// Free spins granted by a bonus trigger
pub const DEFAULT_BONUS_FREE_SPINS: u32 = 5;

/// Cascade passes allowed per spin before resolution is forced to settle
pub const DEFAULT_MAX_CASCADE_DEPTH: u32 = 100;

/// Grid specification (rows × columns)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    pub rows: usize,
    pub cols: usize,
}

impl GridSpec {
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Standard 5×5
    pub const fn standard_5x5() -> Self {
        Self::new(5, 5)
    }

    /// Total grid positions
    pub fn total_positions(&self) -> usize {
        self.rows * self.cols
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::standard_5x5()
    }
}

/// One catalog entry as written in a config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolDef {
    pub name: String,
    #[serde(default)]
    pub value: f64,
    pub weight: f64,
    #[serde(default)]
    pub is_multiplier: bool,
    #[serde(default)]
    pub multiplier_value: Option<u32>,
    #[serde(default)]
    pub is_bonus: bool,
    #[serde(default)]
    pub color: Color,
}

impl SymbolDef {
    fn to_symbol(&self, id: u32) -> BsResult<Symbol> {
        let symbol_type = match (self.is_multiplier, self.is_bonus) {
            (false, false) => SymbolType::Regular,
            (true, false) => SymbolType::Multiplier,
            (false, true) => SymbolType::Bonus,
            (true, true) => {
                return Err(BsError::InvalidConfiguration(format!(
                    "symbol '{}' cannot be both multiplier and bonus",
                    self.name
                )));
            }
        };

        let multiplier_value = match symbol_type {
            SymbolType::Multiplier => match self.multiplier_value {
                Some(v) if v >= 1 => v,
                _ => {
                    return Err(BsError::InvalidConfiguration(format!(
                        "multiplier symbol '{}' needs multiplier_value >= 1",
                        self.name
                    )));
                }
            },
            _ => 1,
        };

        Ok(Symbol {
            id,
            name: self.name.clone(),
            value: self.value,
            weight: self.weight,
            symbol_type,
            multiplier_value,
            color: self.color,
        })
    }
}

impl From<&Symbol> for SymbolDef {
    fn from(symbol: &Symbol) -> Self {
        Self {
            name: symbol.name.clone(),
            value: symbol.value,
            weight: symbol.weight,
            is_multiplier: symbol.is_multiplier(),
            multiplier_value: symbol.is_multiplier().then_some(symbol.multiplier_value),
            is_bonus: symbol.is_bonus(),
            color: symbol.color,
        }
    }
}

/// Bet settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BetConfig {
    pub initial_bet: f64,
    pub min_bet: f64,
    pub bet_step: f64,
}

impl Default for BetConfig {
    fn default() -> Self {
        Self {
            initial_bet: 10.0,
            min_bet: 10.0,
            bet_step: 10.0,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotConfig {
    pub grid: GridSpec,
    pub symbols: Vec<SymbolDef>,
    pub bet: BetConfig,
    /// Balance used when nothing has been persisted yet
    pub initial_balance: f64,
    pub bonus_free_spins: u32,
    /// 0 = unlimited
    pub max_cascade_depth: u32,
    pub win_tiers: WinTierThresholds,
    /// Fixed RNG seed for reproducible sessions
    pub seed: Option<u64>,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            grid: GridSpec::default(),
            symbols: SymbolCatalog::standard().iter().map(SymbolDef::from).collect(),
            bet: BetConfig::default(),
            initial_balance: 1000.0,
            bonus_free_spins: DEFAULT_BONUS_FREE_SPINS,
            max_cascade_depth: DEFAULT_MAX_CASCADE_DEPTH,
            win_tiers: WinTierThresholds::default(),
            seed: None,
        }
    }
}

impl SlotConfig {
    /// Parse JSON config
    pub fn from_json(json: &str) -> BsResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| BsError::Serialization(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML config
    pub fn from_yaml(yaml: &str) -> BsResult<Self> {
        let config: Self = serde_yml::from_str(yaml)
            .map_err(|e| BsError::Serialization(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; `.yaml`/`.yml` parse as YAML, anything else as JSON
    pub fn load(path: impl AsRef<Path>) -> BsResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&text),
            _ => Self::from_json(&text),
        }
    }

    /// Export config as JSON
    pub fn to_json(&self) -> BsResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| BsError::Serialization(e.to_string()))
    }

    /// Check every startup invariant
    pub fn validate(&self) -> BsResult<()> {
        if self.grid.rows == 0 || self.grid.cols == 0 {
            return Err(BsError::InvalidConfiguration(format!(
                "grid must be at least 1×1, got {}×{}",
                self.grid.rows, self.grid.cols
            )));
        }

        let catalog = self.build_catalog()?;
        let mut total = 0.0;
        for symbol in catalog.iter() {
            if !symbol.weight.is_finite() || symbol.weight < 0.0 {
                return Err(BsError::InvalidConfiguration(format!(
                    "symbol '{}' has invalid weight {}",
                    symbol.name, symbol.weight
                )));
            }
            if !symbol.value.is_finite() || symbol.value < 0.0 {
                return Err(BsError::InvalidConfiguration(format!(
                    "symbol '{}' has invalid value {}",
                    symbol.name, symbol.value
                )));
            }
            total += symbol.weight;
        }
        if total <= 0.0 {
            return Err(BsError::InvalidConfiguration(
                "total symbol weight must be positive".into(),
            ));
        }

        let bet = &self.bet;
        if !bet.min_bet.is_finite() || bet.min_bet <= 0.0 {
            return Err(BsError::InvalidConfiguration(format!(
                "min_bet must be positive, got {}",
                bet.min_bet
            )));
        }
        if !bet.initial_bet.is_finite() || bet.initial_bet < bet.min_bet {
            return Err(BsError::InvalidConfiguration(format!(
                "initial_bet {} is below min_bet {}",
                bet.initial_bet, bet.min_bet
            )));
        }
        if !bet.bet_step.is_finite() || bet.bet_step <= 0.0 {
            return Err(BsError::InvalidConfiguration(format!(
                "bet_step must be positive, got {}",
                bet.bet_step
            )));
        }
        if !self.initial_balance.is_finite() || self.initial_balance < 0.0 {
            return Err(BsError::InvalidConfiguration(format!(
                "initial_balance must be non-negative, got {}",
                self.initial_balance
            )));
        }

        Ok(())
    }

    /// Build the indexed catalog from the symbol definitions
    pub fn build_catalog(&self) -> BsResult<SymbolCatalog> {
        let symbols = self
            .symbols
            .iter()
            .enumerate()
            .map(|(idx, def)| def.to_symbol(idx as u32))
            .collect::<BsResult<Vec<_>>>()?;
        SymbolCatalog::new(symbols)
    }
}
