//! Spin Engine: bet to settled balance
//!
//! Drives one spin through the phase machine:
//!
//! ```text
//! Idle → BetPlaced → BoardFilled → Matching ⇄ Cascading → Settled → Idle
//! ```
//!
//! Every observable moment is reported to the [`StageSink`] in order. The
//! balance is written to the [`BalanceStore`] at settle and at shutdown;
//! a failed write is logged and never aborts the spin.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use bs_core::{BsError, BsResult};
use bs_stage::{
    BoxedStageSink, NullSink, Position, RejectReason, Stage, StageEvent, StagePayload, StageSink,
    WinTier,
};
use bs_state::{Account, BalanceStore};

use crate::board::Board;
use crate::config::SlotConfig;
use crate::matcher::{find_bonus_trigger, find_matches, find_multiplier_columns};
use crate::selector::{BoxedSymbolSource, SymbolSource, WeightedSelector};
use crate::spin::{CascadeResult, MultiplierTrigger, SpinPhase, SpinResult, SpinState};
use crate::symbols::SymbolCatalog;

/// Session statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_spins: u64,
    /// Stakes actually debited; free spins contribute nothing
    pub total_bet: f64,
    pub total_win: f64,
    pub wins: u64,
    pub losses: u64,
    pub free_spins_played: u64,
    pub bonus_triggers: u64,
    pub multiplier_triggers: u64,
    pub cascade_steps: u64,
    pub max_win_ratio: f64,
}

impl SessionStats {
    /// Calculate RTP
    pub fn rtp(&self) -> f64 {
        if self.total_bet > 0.0 {
            (self.total_win / self.total_bet) * 100.0
        } else {
            0.0
        }
    }

    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        if self.total_spins > 0 {
            (self.wins as f64 / self.total_spins as f64) * 100.0
        } else {
            0.0
        }
    }

    fn record(&mut self, result: &SpinResult) {
        self.total_spins += 1;
        if result.is_free_spin {
            self.free_spins_played += 1;
        } else {
            self.total_bet += result.bet;
        }
        self.total_win += result.total_win;
        if result.is_win() {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        if result.bonus_trigger.is_some() {
            self.bonus_triggers += 1;
        }
        self.multiplier_triggers += result.multiplier_triggers.len() as u64;
        self.cascade_steps += result.cascades.len() as u64;
        self.max_win_ratio = self.max_win_ratio.max(result.win_ratio);
    }
}

/// Spin resolution engine
pub struct SpinEngine {
    config: SlotConfig,
    catalog: SymbolCatalog,
    board: Board,
    source: BoxedSymbolSource,
    sink: BoxedStageSink,
    store: Arc<dyn BalanceStore>,
    account: Account,
    free_spins_remaining: u32,
    phase: SpinPhase,
    spin_count: u64,
    /// Sequence number of the next event within the current spin
    sequence: u32,
    current_spin_id: Option<String>,
    stats: SessionStats,
}

impl SpinEngine {
    /// Validate `config`, open the account from `store` and fill the first board
    pub fn new(config: SlotConfig, store: Arc<dyn BalanceStore>) -> BsResult<Self> {
        config.validate()?;
        let catalog = config.build_catalog()?;
        let mut source: BoxedSymbolSource =
            Box::new(WeightedSelector::for_catalog(&catalog, config.seed)?);

        let account = Account::load(
            &*store,
            config.initial_balance,
            config.bet.initial_bet,
            config.bet.min_bet,
            config.bet.bet_step,
        )?;

        let mut board = Board::new(config.grid);
        board.fill(&mut *source);

        log::info!(
            "Spin engine ready: {}×{} board, {} symbols, balance {:.2}, bet {:.2}",
            config.grid.rows,
            config.grid.cols,
            catalog.len(),
            account.balance(),
            account.bet()
        );

        Ok(Self {
            config,
            catalog,
            board,
            source,
            sink: Box::new(NullSink),
            store,
            account,
            free_spins_remaining: 0,
            phase: SpinPhase::Idle,
            spin_count: 0,
            sequence: 0,
            current_spin_id: None,
            stats: SessionStats::default(),
        })
    }

    /// Route stage events to `sink`
    pub fn with_sink(mut self, sink: impl StageSink + Send + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Replace the symbol source used for fills and refills
    pub fn with_source(mut self, source: impl SymbolSource + Send + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn config(&self) -> &SlotConfig {
        &self.config
    }

    pub fn catalog(&self) -> &SymbolCatalog {
        &self.catalog
    }

    /// Board as left by the last spin
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn balance(&self) -> f64 {
        self.account.balance()
    }

    pub fn bet(&self) -> f64 {
        self.account.bet()
    }

    pub fn free_spins_remaining(&self) -> u32 {
        self.free_spins_remaining
    }

    pub fn phase(&self) -> SpinPhase {
        self.phase
    }

    pub fn spin_count(&self) -> u64 {
        self.spin_count
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Reset session stats
    pub fn reset_stats(&mut self) {
        self.stats = SessionStats::default();
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // BET CONTROLS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Raise the bet by `step`
    pub fn increase_bet(&mut self, step: f64) -> BsResult<f64> {
        let bet = self.account.increase_bet(step)?;
        self.emit_bet_changed(bet);
        Ok(bet)
    }

    /// Lower the bet by `step`, clamped at `floor` and the configured minimum
    pub fn decrease_bet(&mut self, step: f64, floor: f64) -> BsResult<f64> {
        let bet = self.account.decrease_bet(step, floor)?;
        self.emit_bet_changed(bet);
        Ok(bet)
    }

    /// One configured bet step up
    pub fn step_bet_up(&mut self) -> BsResult<f64> {
        self.increase_bet(self.account.bet_step())
    }

    /// One configured bet step down
    pub fn step_bet_down(&mut self) -> BsResult<f64> {
        let (step, floor) = (self.account.bet_step(), self.account.min_bet());
        self.decrease_bet(step, floor)
    }

    fn emit_bet_changed(&mut self, bet: f64) {
        log::debug!("Bet changed to {:.2}", bet);
        let payload = StagePayload::new()
            .bet_amount(bet)
            .balance(self.account.balance());
        self.emit(Stage::BetChanged { bet }, payload);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SPIN EXECUTION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Spin with the current bet on a freshly drawn board
    pub fn spin(&mut self) -> BsResult<SpinResult> {
        self.run_spin(None, None)
    }

    /// Spin with the current bet, starting from `board` instead of a fresh fill
    ///
    /// Cascade refills still draw from the engine's source. `board` must match
    /// the configured dimensions and hold a catalog symbol in every cell.
    pub fn spin_with_board(&mut self, board: Board) -> BsResult<SpinResult> {
        self.check_forced_board(&board)?;
        self.run_spin(None, Some(board))
    }

    /// Spin at `bet`, which becomes the current bet once the spin is accepted
    ///
    /// A rejected request leaves the current bet untouched.
    pub fn request_spin(&mut self, bet: f64) -> BsResult<SpinResult> {
        if !bet.is_finite() || bet < self.account.min_bet() {
            self.reject(RejectReason::InvalidBet);
            return Err(BsError::InvalidBet(format!(
                "bet {} is below the minimum {}",
                bet,
                self.account.min_bet()
            )));
        }
        self.run_spin(Some(bet), None)
    }

    fn check_forced_board(&self, board: &Board) -> BsResult<()> {
        if board.grid() != self.board.grid() {
            let missing = self
                .board
                .positions()
                .find(|&p| !board.contains(p))
                .or_else(|| board.positions().find(|&p| !self.board.contains(p)))
                .unwrap_or(Position::new(0, 0));
            return Err(BsError::MissingGridReference {
                row: missing.row,
                col: missing.col,
            });
        }

        for cell in board.cells() {
            match cell.occupant {
                Some(id) if self.catalog.get(id).is_some() => {}
                Some(id) => {
                    return Err(BsError::InvalidConfiguration(format!(
                        "unknown symbol id {} at {}",
                        id, cell.position
                    )));
                }
                None => {
                    return Err(BsError::InvalidConfiguration(format!(
                        "empty cell at {}",
                        cell.position
                    )));
                }
            }
        }
        Ok(())
    }

    fn run_spin(&mut self, requested_bet: Option<f64>, forced: Option<Board>) -> BsResult<SpinResult> {
        // Not Idle only after a spin unwound mid-resolution (a panicking sink)
        // with its debit unsettled
        if self.phase != SpinPhase::Idle {
            self.reject(RejectReason::SpinInProgress);
            return Err(BsError::SpinInProgress);
        }

        let bet = requested_bet.unwrap_or_else(|| self.account.bet());
        let free_spin = self.free_spins_remaining > 0;
        if !free_spin && !self.account.can_afford(bet) {
            self.reject(RejectReason::InsufficientBalance);
            return Err(BsError::InsufficientBalance {
                balance: self.account.balance(),
                bet,
            });
        }

        if bet != self.account.bet() {
            let bet = self.account.set_bet(bet)?;
            self.emit_bet_changed(bet);
        }

        // BetPlaced
        if free_spin {
            self.free_spins_remaining -= 1;
        } else {
            self.account.debit(bet)?;
        }
        self.spin_count += 1;
        let spin_id = format!("spin-{:06}", self.spin_count);
        self.current_spin_id = Some(spin_id.clone());
        self.sequence = 0;
        self.phase = SpinPhase::BetPlaced;
        log::debug!(
            "{}: bet {:.2}{} placed",
            spin_id,
            bet,
            if free_spin { " (free)" } else { "" }
        );

        let result = self.resolve(spin_id, bet, free_spin, forced);

        self.phase = SpinPhase::Idle;
        self.current_spin_id = None;
        result
    }

    fn resolve(
        &mut self,
        spin_id: String,
        bet: f64,
        free_spin: bool,
        forced: Option<Board>,
    ) -> BsResult<SpinResult> {
        let mut state = SpinState::new(bet, free_spin);
        let payload = StagePayload::new()
            .bet_amount(bet)
            .balance(self.account.balance())
            .free_spins_remaining(self.free_spins_remaining);
        self.emit(Stage::SpinStart { bet, free_spin }, payload);

        self.phase = SpinPhase::BoardFilled;
        match forced {
            Some(board) => self.board = board,
            None => self.board.fill(&mut *self.source),
        }
        let initial_board = self.board.clone();

        let mut line_matches = Vec::new();
        let mut cascades = Vec::new();
        let mut multiplier_triggers = Vec::new();
        let mut bonus_trigger = None;
        let mut cascade_capped = false;
        let mut pass = 0u32;

        loop {
            self.phase = SpinPhase::Matching;
            let matches = find_matches(&self.board, &self.catalog);

            let mut pass_win = 0.0;
            for line in &matches.lines {
                pass_win += state.score(std::slice::from_ref(line), &self.catalog);
                let symbol = self
                    .catalog
                    .get(line.symbol_id)
                    .map(|s| s.name.clone())
                    .unwrap_or_default();
                let payload = StagePayload::new().bet_amount(bet).win_amount(state.winnings);
                self.emit(
                    Stage::MatchFound {
                        line: line.line,
                        cells: line.cells.to_vec(),
                        symbol_id: line.symbol_id,
                        symbol,
                    },
                    payload,
                );
            }
            line_matches.extend(matches.lines.iter().cloned());

            for (column, value) in find_multiplier_columns(&self.board, &self.catalog) {
                if !state.apply_multiplier(value) {
                    continue;
                }
                multiplier_triggers.push(MultiplierTrigger {
                    column,
                    value,
                    pass,
                });
                let total = state.multiplier;
                self.emit(
                    Stage::MultiplierTriggered {
                        column,
                        value,
                        total,
                    },
                    StagePayload::new().multiplier(total),
                );
            }

            if let Some(cells) = find_bonus_trigger(&self.board, &self.catalog) {
                let granted = self.config.bonus_free_spins;
                if state.grant_free_spins(granted) {
                    self.free_spins_remaining += granted;
                    log::debug!("Bonus triggered: +{} free spins", granted);
                    let payload =
                        StagePayload::new().free_spins_remaining(self.free_spins_remaining);
                    self.emit(
                        Stage::BonusTriggered {
                            cells: cells.clone(),
                            free_spins_granted: granted,
                        },
                        payload,
                    );
                    bonus_trigger = Some(cells);
                }
            }

            if !matches.triggers_cascade() {
                break;
            }
            let max_depth = self.config.max_cascade_depth;
            if max_depth > 0 && state.cascade_steps >= max_depth {
                log::warn!(
                    "{}: cascade cap of {} reached, settling early",
                    spin_id,
                    max_depth
                );
                cascade_capped = true;
                break;
            }

            self.phase = SpinPhase::Cascading;
            let cells: Vec<Position> = matches.cells.iter().copied().collect();
            self.board.clear(&cells)?;
            self.board.refill(&cells, &mut *self.source)?;

            let step_index = state.cascade_steps;
            self.emit(
                Stage::CascadeStep {
                    step_index,
                    cleared: cells.clone(),
                    refilled: cells.clone(),
                },
                StagePayload::new().win_amount(state.winnings),
            );
            cascades.push(CascadeResult {
                step_index,
                cells,
                win: pass_win,
                board: self.board.clone(),
            });
            state.cascade_steps += 1;
            pass += 1;
        }

        // Settled
        self.phase = SpinPhase::Settled;
        let total_win = state.final_winnings();
        self.account.credit(total_win);
        self.persist_balance();

        let new_balance = self.account.balance();
        let win_ratio = if bet > 0.0 { total_win / bet } else { 0.0 };
        let win_tier = WinTier::from_ratio(win_ratio, &self.config.win_tiers);

        let payload = StagePayload::new()
            .win_amount(total_win)
            .bet_amount(bet)
            .multiplier(state.multiplier)
            .balance(new_balance)
            .free_spins_remaining(self.free_spins_remaining);
        self.emit(
            Stage::SpinSettled {
                final_winnings: total_win,
                new_balance,
                multiplier: state.multiplier,
            },
            payload,
        );

        log::info!(
            "{} settled: bet {:.2}, win {:.2} (x{}), {} cascades, balance {:.2}",
            spin_id,
            bet,
            total_win,
            state.multiplier,
            cascades.len(),
            new_balance
        );

        let result = SpinResult {
            spin_id,
            bet,
            is_free_spin: free_spin,
            initial_board,
            final_board: self.board.clone(),
            line_matches,
            cascades,
            multiplier_triggers,
            bonus_trigger,
            free_spins_awarded: state.free_spins_awarded,
            free_spins_remaining: self.free_spins_remaining,
            base_win: state.winnings,
            multiplier: state.multiplier,
            total_win,
            win_ratio,
            win_tier,
            balance_after: new_balance,
            cascade_capped,
        };
        self.stats.record(&result);
        Ok(result)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // EVENTS & PERSISTENCE
    // ═══════════════════════════════════════════════════════════════════════════

    fn emit(&mut self, stage: Stage, payload: StagePayload) {
        let event = match &self.current_spin_id {
            Some(id) => {
                let event =
                    StageEvent::with_payload(stage, self.sequence, payload).for_spin(id.clone());
                self.sequence += 1;
                event
            }
            None => StageEvent::with_payload(stage, 0, payload),
        };
        self.sink.emit(event);
    }

    fn reject(&mut self, reason: RejectReason) {
        log::debug!("Spin rejected: {:?}", reason);
        let payload = StagePayload::new()
            .bet_amount(self.account.bet())
            .balance(self.account.balance());
        self.emit(Stage::SpinRejected { reason }, payload);
    }

    fn persist_balance(&self) {
        if let Err(e) = self.account.persist(&*self.store) {
            log::warn!("Failed to persist balance: {}", e);
        }
    }

    /// Persist the balance one last time and hand back the session stats
    pub fn shutdown(self) -> SessionStats {
        self.persist_balance();
        log::info!(
            "Session closed: {} spins, RTP {:.2}%, hit rate {:.2}%, balance {:.2}",
            self.stats.total_spins,
            self.stats.rtp(),
            self.stats.hit_rate(),
            self.account.balance()
        );
        self.stats
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SHARED ENGINE
// ═══════════════════════════════════════════════════════════════════════════════

/// Thread-safe handle that admits one spin at a time
///
/// A spin requested while another holds the engine is turned away with
/// [`BsError::SpinInProgress`] instead of waiting.
#[derive(Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<SpinEngine>>,
}

impl SharedEngine {
    pub fn new(engine: SpinEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn spin(&self) -> BsResult<SpinResult> {
        self.inner.try_lock().ok_or(BsError::SpinInProgress)?.spin()
    }

    pub fn request_spin(&self, bet: f64) -> BsResult<SpinResult> {
        self.inner
            .try_lock()
            .ok_or(BsError::SpinInProgress)?
            .request_spin(bet)
    }

    pub fn increase_bet(&self, step: f64) -> BsResult<f64> {
        self.inner
            .try_lock()
            .ok_or(BsError::SpinInProgress)?
            .increase_bet(step)
    }

    pub fn decrease_bet(&self, step: f64, floor: f64) -> BsResult<f64> {
        self.inner
            .try_lock()
            .ok_or(BsError::SpinInProgress)?
            .decrease_bet(step, floor)
    }

    pub fn balance(&self) -> f64 {
        self.inner.lock().balance()
    }

    pub fn free_spins_remaining(&self) -> u32 {
        self.inner.lock().free_spins_remaining()
    }

    /// Run `f` with exclusive access, waiting for any spin to finish
    pub fn with<R>(&self, f: impl FnOnce(&mut SpinEngine) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BetConfig, GridSpec, SymbolDef};
    use crate::selector::ScriptedSource;
    use crate::symbols::Symbol;
    use bs_stage::{FnSink, StageCollector};
    use bs_state::MemoryBalanceStore;

    fn config(rows: usize, cols: usize, balance: f64) -> SlotConfig {
        let symbols = [
            Symbol::regular(0, "A", 2.0, 1.0),
            Symbol::regular(1, "B", 3.0, 1.0),
            Symbol::regular(2, "C", 1.0, 1.0),
            Symbol::regular(3, "D", 1.0, 1.0),
            Symbol::regular(4, "E", 1.0, 1.0),
            Symbol::multiplier(5, "X4", 4, 1.0),
            Symbol::bonus(6, "S", 1.0),
        ];
        SlotConfig {
            grid: GridSpec::new(rows, cols),
            symbols: symbols.iter().map(SymbolDef::from).collect(),
            bet: BetConfig {
                initial_bet: 10.0,
                min_bet: 1.0,
                bet_step: 1.0,
            },
            initial_balance: balance,
            seed: Some(42),
            ..SlotConfig::default()
        }
    }

    fn engine(balance: f64) -> (SpinEngine, Arc<Mutex<StageCollector>>) {
        let events = Arc::new(Mutex::new(StageCollector::new()));
        let engine = SpinEngine::new(config(3, 3, balance), Arc::new(MemoryBalanceStore::new()))
            .unwrap()
            .with_sink(events.clone());
        (engine, events)
    }

    fn quiet_board(engine: &SpinEngine) -> Board {
        Board::from_names(
            engine.catalog(),
            &[&["A", "B", "C"], &["D", "E", "A"], &["B", "C", "D"]],
        )
        .unwrap()
    }

    #[test]
    fn test_engine_creation() {
        let (engine, _) = engine(100.0);
        assert_eq!(engine.stats().total_spins, 0);
        assert_eq!(engine.phase(), SpinPhase::Idle);
        assert_eq!(engine.balance(), 100.0);
        assert!(engine.board().is_full());
    }

    #[test]
    fn test_basic_spin() {
        let (mut engine, events) = engine(100.0);
        let result = engine.spin().unwrap();

        assert_eq!(result.bet, 10.0);
        assert!(result.final_board.is_full());
        assert_eq!(engine.phase(), SpinPhase::Idle);
        assert_eq!(engine.balance(), 90.0 + result.total_win);

        let events = events.lock();
        assert_eq!(events.events().first().unwrap().type_name(), "SPIN_START");
        assert_eq!(events.events().last().unwrap().type_name(), "SPIN_SETTLED");
        assert_eq!(events.count("SPIN_SETTLED"), 1);
    }

    #[test]
    fn test_event_sequence_is_ordered() {
        let (mut engine, events) = engine(100.0);
        engine.spin().unwrap();
        engine.spin().unwrap();

        let events = events.lock();
        let second: Vec<_> = events
            .events()
            .iter()
            .filter(|e| e.spin_id.as_deref() == Some("spin-000002"))
            .map(|e| e.sequence)
            .collect();
        assert!(!second.is_empty());
        assert_eq!(second, (0..second.len() as u32).collect::<Vec<_>>());
    }

    #[test]
    fn test_spin_rejected_after_interrupted_resolution() {
        let (engine, _) = engine(100.0);
        let rejections = Arc::new(Mutex::new(0usize));
        let seen = rejections.clone();
        let mut engine = engine.with_sink(FnSink(move |e: StageEvent| match e.stage {
            Stage::MatchFound { .. } => panic!("presentation failed"),
            Stage::SpinRejected { .. } => *seen.lock() += 1,
            _ => {}
        }));
        let board = Board::from_names(
            engine.catalog(),
            &[&["A", "A", "A"], &["B", "C", "D"], &["C", "D", "B"]],
        )
        .unwrap();

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            engine.spin_with_board(board)
        }));
        assert!(outcome.is_err());
        assert_eq!(engine.phase(), SpinPhase::Matching);
        assert_eq!(engine.balance(), 90.0);

        assert!(matches!(engine.spin(), Err(BsError::SpinInProgress)));
        assert_eq!(engine.balance(), 90.0);
        assert_eq!(*rejections.lock(), 1);
    }

    #[test]
    fn test_forced_board_dimensions_checked() {
        let (mut engine, _) = engine(100.0);
        let before = engine.board().clone();
        let small = Board::from_names(engine.catalog(), &[&["A", "B"], &["C", "D"]]).unwrap();

        assert!(matches!(
            engine.spin_with_board(small),
            Err(BsError::MissingGridReference { row: 0, col: 2 })
        ));
        assert_eq!(engine.board(), &before);
        assert_eq!(engine.balance(), 100.0);
    }

    #[test]
    fn test_request_spin_sets_bet() {
        let (mut engine, events) = engine(100.0);
        let result = engine.request_spin(25.0).unwrap();
        assert_eq!(result.bet, 25.0);
        assert_eq!(engine.bet(), 25.0);

        assert!(matches!(engine.request_spin(0.5), Err(BsError::InvalidBet(_))));
        assert_eq!(events.lock().count("SPIN_REJECTED"), 1);
    }

    #[test]
    fn test_rejected_request_keeps_bet() {
        let (mut engine, events) = engine(3.0);
        engine.decrease_bet(9.0, 1.0).unwrap();
        let before = engine.board().clone();

        assert!(matches!(
            engine.request_spin(10.0),
            Err(BsError::InsufficientBalance { .. })
        ));
        assert_eq!(engine.bet(), 1.0);
        assert_eq!(engine.balance(), 3.0);
        assert_eq!(engine.board(), &before);

        let events = events.lock();
        assert_eq!(events.count("BET_CHANGED"), 1);
        assert_eq!(events.count("SPIN_REJECTED"), 1);
        assert_eq!(events.count("SPIN_START"), 0);
    }

    #[test]
    fn test_accepted_request_reports_bet_change() {
        let (mut engine, events) = engine(100.0);
        engine.request_spin(4.0).unwrap();
        engine.request_spin(4.0).unwrap();

        let events = events.lock();
        let changes: Vec<_> = events.of_type("BET_CHANGED");
        assert_eq!(changes.len(), 1);
        assert!(changes[0].spin_id.is_none());
        assert_eq!(events.events()[1].type_name(), "SPIN_START");
    }

    #[test]
    fn test_bet_controls_emit_changes() {
        let (mut engine, events) = engine(100.0);
        assert_eq!(engine.increase_bet(5.0).unwrap(), 15.0);
        assert_eq!(engine.step_bet_up().unwrap(), 16.0);
        assert_eq!(engine.decrease_bet(100.0, 2.0).unwrap(), 2.0);
        assert_eq!(engine.step_bet_down().unwrap(), 1.0);
        assert!(engine.increase_bet(-1.0).is_err());

        let events = events.lock();
        assert_eq!(events.count("BET_CHANGED"), 4);
        assert!(events.events().iter().all(|e| e.spin_id.is_none()));
    }

    #[test]
    fn test_free_spin_skips_debit() {
        let (mut engine, events) = engine(100.0);
        engine.free_spins_remaining = 2;
        let board = quiet_board(&engine);

        let result = engine.spin_with_board(board).unwrap();
        assert!(result.is_free_spin);
        assert_eq!(engine.balance(), 100.0);
        assert_eq!(engine.free_spins_remaining(), 1);
        assert_eq!(engine.stats().free_spins_played, 1);
        assert_eq!(engine.stats().total_bet, 0.0);

        let events = events.lock();
        assert!(matches!(
            events.events()[0].stage,
            Stage::SpinStart {
                free_spin: true,
                ..
            }
        ));
    }

    #[test]
    fn test_session_stats() {
        let (mut engine, _) = engine(10_000.0);
        for _ in 0..100 {
            engine.spin().unwrap();
        }

        let stats = engine.stats().clone();
        assert_eq!(stats.total_spins, 100);
        assert_eq!(stats.wins + stats.losses, 100);
        assert!(stats.total_bet > 0.0);
        assert!(stats.hit_rate() <= 100.0);

        engine.reset_stats();
        assert_eq!(engine.stats(), &SessionStats::default());
        assert_eq!(engine.shutdown(), SessionStats::default());
    }

    #[test]
    fn test_shared_engine_rejects_concurrent_spin() {
        let (engine, _) = engine(100.0);
        let shared = SharedEngine::new(engine);
        let other = shared.clone();

        let inner = shared.with(|_| other.spin());
        assert!(matches!(inner, Err(BsError::SpinInProgress)));
        assert_eq!(shared.balance(), 100.0);

        shared.spin().unwrap();
        assert_eq!(shared.with(|e| e.spin_count()), 1);
    }

    #[test]
    fn test_scripted_source_reproduces_board() {
        let (engine, _) = engine(100.0);
        let mut engine = engine.with_source(ScriptedSource::new(vec![0, 1, 2, 3, 4]).unwrap());
        let result = engine.spin().unwrap();
        assert_eq!(
            result.initial_board.render(engine.catalog()),
            "A B C\nD E A\nB C D"
        );
        assert!(!result.is_win());
    }
}
