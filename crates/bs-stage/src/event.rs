//! StageEvent: A stage occurrence with metadata
//!
//! Wraps a Stage with its position in the spin's event stream and a
//! payload snapshot of the account and spin accumulators.

use serde::{Deserialize, Serialize};

use crate::stage::Stage;

/// A stage event with full metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEvent {
    /// The canonical stage
    pub stage: Stage,

    /// Order within the spin (0 = first event of the spin)
    pub sequence: u32,

    /// Spin this event belongs to (`None` for events outside a spin)
    #[serde(default)]
    pub spin_id: Option<String>,

    /// Additional payload data
    #[serde(default)]
    pub payload: StagePayload,
}

impl StageEvent {
    pub fn new(stage: Stage, sequence: u32) -> Self {
        Self {
            stage,
            sequence,
            spin_id: None,
            payload: StagePayload::default(),
        }
    }

    pub fn with_payload(stage: Stage, sequence: u32, payload: StagePayload) -> Self {
        Self {
            stage,
            sequence,
            spin_id: None,
            payload,
        }
    }

    /// Tag with the owning spin
    pub fn for_spin(mut self, spin_id: impl Into<String>) -> Self {
        self.spin_id = Some(spin_id.into());
        self
    }

    /// Get stage type name
    pub fn type_name(&self) -> &'static str {
        self.stage.type_name()
    }

    /// Single-line JSON, one event per line in a log or pipe
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Snapshot of spin/account values at the moment a stage fired
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StagePayload {
    /// Winnings accumulated so far this spin (before multiplier)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub win_amount: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bet_amount: Option<f64>,

    /// Running multiplier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_spins_remaining: Option<u32>,
}

impl StagePayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set win amount
    pub fn win_amount(mut self, amount: f64) -> Self {
        self.win_amount = Some(amount);
        self
    }

    /// Builder: set bet amount
    pub fn bet_amount(mut self, amount: f64) -> Self {
        self.bet_amount = Some(amount);
        self
    }

    /// Builder: set multiplier
    pub fn multiplier(mut self, mult: u32) -> Self {
        self.multiplier = Some(mult);
        self
    }

    /// Builder: set balance
    pub fn balance(mut self, balance: f64) -> Self {
        self.balance = Some(balance);
        self
    }

    /// Builder: set free spins remaining
    pub fn free_spins_remaining(mut self, spins: u32) -> Self {
        self.free_spins_remaining = Some(spins);
        self
    }

    /// Win-to-bet ratio if both amounts are present
    pub fn calculate_ratio(&self) -> Option<f64> {
        match (self.win_amount, self.bet_amount) {
            (Some(win), Some(bet)) if bet > 0.0 => Some(win / bet),
            _ => None,
        }
    }
}
