//! Player account: balance and bet bookkeeping

use serde::{Deserialize, Serialize};

use bs_core::{BsError, BsResult};

use crate::store::{BalanceStore, PLAYER_BALANCE_KEY};

/// Persistent player state
///
/// Only `balance` is written to durable storage. Bet settings come from
/// configuration at every session start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    balance: f64,
    bet: f64,
    min_bet: f64,
    bet_step: f64,
}

impl Account {
    pub fn new(balance: f64, bet: f64, min_bet: f64, bet_step: f64) -> BsResult<Self> {
        if !balance.is_finite() || balance < 0.0 {
            return Err(BsError::InvalidConfiguration(format!(
                "balance must be finite and non-negative, got {}",
                balance
            )));
        }
        if !min_bet.is_finite() || min_bet <= 0.0 {
            return Err(BsError::InvalidConfiguration(format!(
                "min bet must be positive, got {}",
                min_bet
            )));
        }
        if !bet.is_finite() || bet < min_bet {
            return Err(BsError::InvalidConfiguration(format!(
                "initial bet {} is below min bet {}",
                bet, min_bet
            )));
        }
        if !bet_step.is_finite() || bet_step <= 0.0 {
            return Err(BsError::InvalidConfiguration(format!(
                "bet step must be positive, got {}",
                bet_step
            )));
        }

        Ok(Self {
            balance,
            bet,
            min_bet,
            bet_step,
        })
    }

    /// Open an account, taking the balance from `store` when one was saved
    ///
    /// A store that cannot be read falls back to `initial_balance`.
    pub fn load(
        store: &dyn BalanceStore,
        initial_balance: f64,
        bet: f64,
        min_bet: f64,
        bet_step: f64,
    ) -> BsResult<Self> {
        let balance = match store.load(PLAYER_BALANCE_KEY) {
            Ok(Some(saved)) if saved.is_finite() && saved >= 0.0 => saved,
            Ok(Some(saved)) => {
                log::warn!("Ignoring invalid persisted balance {}", saved);
                initial_balance
            }
            Ok(None) => initial_balance,
            Err(e) => {
                log::warn!("Failed to load balance, starting fresh: {}", e);
                initial_balance
            }
        };
        Self::new(balance, bet, min_bet, bet_step)
    }

    /// Write the balance record
    pub fn persist(&self, store: &dyn BalanceStore) -> BsResult<()> {
        store.save(PLAYER_BALANCE_KEY, self.balance)
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn bet(&self) -> f64 {
        self.bet
    }

    pub fn min_bet(&self) -> f64 {
        self.min_bet
    }

    pub fn bet_step(&self) -> f64 {
        self.bet_step
    }

    pub fn can_afford(&self, amount: f64) -> bool {
        self.balance >= amount
    }

    /// Take `amount` from the balance; fails without mutating if it does not cover it
    pub fn debit(&mut self, amount: f64) -> BsResult<()> {
        if !self.can_afford(amount) {
            return Err(BsError::InsufficientBalance {
                balance: self.balance,
                bet: amount,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    pub fn credit(&mut self, amount: f64) {
        self.balance += amount;
    }

    /// Raise the bet by `step`
    pub fn increase_bet(&mut self, step: f64) -> BsResult<f64> {
        validate_step(step)?;
        self.bet += step;
        Ok(self.bet)
    }

    /// Lower the bet by `step`, never below `floor` nor the account minimum
    ///
    /// Never raises the bet: a floor above the current bet leaves it unchanged.
    pub fn decrease_bet(&mut self, step: f64, floor: f64) -> BsResult<f64> {
        validate_step(step)?;
        let floor = if floor.is_finite() {
            floor.max(self.min_bet)
        } else {
            self.min_bet
        };
        self.bet = (self.bet - step).max(floor).min(self.bet);
        Ok(self.bet)
    }

    /// Set the bet directly (clamped up to the minimum)
    pub fn set_bet(&mut self, bet: f64) -> BsResult<f64> {
        if !bet.is_finite() || bet <= 0.0 {
            return Err(BsError::InvalidBet(format!("bet must be positive, got {}", bet)));
        }
        self.bet = bet.max(self.min_bet);
        Ok(self.bet)
    }
}

fn validate_step(step: f64) -> BsResult<()> {
    if !step.is_finite() || step <= 0.0 {
        return Err(BsError::InvalidBet(format!(
            "bet step must be positive, got {}",
            step
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBalanceStore;

    fn account() -> Account {
        Account::new(100.0, 10.0, 5.0, 5.0).unwrap()
    }

    #[test]
    fn test_debit_insufficient_leaves_balance() {
        let mut acc = Account::new(3.0, 10.0, 1.0, 1.0).unwrap();
        let err = acc.debit(10.0).unwrap_err();
        assert!(matches!(err, BsError::InsufficientBalance { .. }));
        assert_eq!(acc.balance(), 3.0);
    }

    #[test]
    fn test_debit_and_credit() {
        let mut acc = account();
        acc.debit(10.0).unwrap();
        acc.credit(25.0);
        assert_eq!(acc.balance(), 115.0);
    }

    #[test]
    fn test_bet_adjustment() {
        let mut acc = account();
        assert_eq!(acc.increase_bet(5.0).unwrap(), 15.0);
        assert_eq!(acc.decrease_bet(5.0, 0.0).unwrap(), 10.0);
        // Clamped at the minimum even when the caller passes a lower floor
        assert_eq!(acc.decrease_bet(100.0, 1.0).unwrap(), 5.0);
        // A higher floor wins
        acc.increase_bet(20.0).unwrap();
        assert_eq!(acc.decrease_bet(100.0, 8.0).unwrap(), 8.0);
        assert!(acc.increase_bet(0.0).is_err());
        assert!(acc.decrease_bet(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_decrease_never_raises_bet() {
        let mut acc = Account::new(100.0, 1.0, 1.0, 1.0).unwrap();
        assert_eq!(acc.decrease_bet(1.0, 50.0).unwrap(), 1.0);
        assert_eq!(acc.bet(), 1.0);

        let mut acc = account();
        assert_eq!(acc.decrease_bet(1.0, 12.0).unwrap(), 10.0);
    }

    #[test]
    fn test_invalid_accounts() {
        assert!(Account::new(-1.0, 1.0, 1.0, 1.0).is_err());
        assert!(Account::new(10.0, 0.5, 1.0, 1.0).is_err());
        assert!(Account::new(10.0, 1.0, 0.0, 1.0).is_err());
        assert!(Account::new(10.0, 1.0, 1.0, 0.0).is_err());
    }

    #[test]
    fn test_load_and_persist() {
        let store = MemoryBalanceStore::new();
        let acc = Account::load(&store, 500.0, 1.0, 1.0, 1.0).unwrap();
        assert_eq!(acc.balance(), 500.0);

        let mut acc = acc;
        acc.credit(20.0);
        acc.persist(&store).unwrap();

        let reloaded = Account::load(&store, 500.0, 1.0, 1.0, 1.0).unwrap();
        assert_eq!(reloaded.balance(), 520.0);
    }

    #[test]
    fn test_load_ignores_negative_record() {
        let store = MemoryBalanceStore::with_balance(-5.0);
        let acc = Account::load(&store, 50.0, 1.0, 1.0, 1.0).unwrap();
        assert_eq!(acc.balance(), 50.0);
    }
}
