//! Audio cues: one-shot sounds derived from stages
//!
//! The engine knows nothing about clips. [`CueMapper`] turns each stage into
//! the cues presentation should fire, and [`CueDispatcher`] plugs that mapping
//! into the event stream in front of an injected [`CuePlayer`].

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::event::StageEvent;
use crate::sink::StageSink;
use crate::stage::Stage;

/// Minimum spacing between two `Reward` cues
pub const DEFAULT_REWARD_COOLDOWN_MS: f64 = 200.0;

/// One-shot sound cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCue {
    SpinClick,
    MatchDisappear,
    Reward,
    MultiplierAppear,
    MultiplyReward,
    BonusSpin,
    Balance,
    EndingReward,
    BetChange,
}

/// Plays cues. Implemented by the presentation layer.
pub trait CuePlayer {
    fn play(&mut self, cue: AudioCue);
}

impl CuePlayer for Vec<AudioCue> {
    fn play(&mut self, cue: AudioCue) {
        self.push(cue);
    }
}

/// Maps stages to cues, throttling rapid reward sounds
#[derive(Debug, Clone)]
pub struct CueMapper {
    reward_cooldown_ms: f64,
    last_reward_ms: Option<f64>,
}

impl CueMapper {
    pub fn new() -> Self {
        Self::with_cooldown(DEFAULT_REWARD_COOLDOWN_MS)
    }

    pub fn with_cooldown(reward_cooldown_ms: f64) -> Self {
        Self {
            reward_cooldown_ms: reward_cooldown_ms.max(0.0),
            last_reward_ms: None,
        }
    }

    /// Cues for `event`, observed at `now_ms` on the caller's clock
    pub fn map(&mut self, event: &StageEvent, now_ms: f64) -> Vec<AudioCue> {
        match &event.stage {
            Stage::SpinStart { .. } => vec![AudioCue::SpinClick],
            Stage::MatchFound { .. } => {
                let mut cues = vec![AudioCue::MatchDisappear];
                if self.reward_ready(now_ms) {
                    self.last_reward_ms = Some(now_ms);
                    cues.push(AudioCue::Reward);
                }
                cues
            }
            Stage::MultiplierTriggered { .. } => vec![AudioCue::MultiplierAppear],
            Stage::BonusTriggered { .. } => vec![AudioCue::BonusSpin],
            Stage::SpinSettled {
                final_winnings,
                multiplier,
                ..
            } => {
                let mut cues = Vec::new();
                if *final_winnings > 0.0 {
                    if *multiplier > 1 {
                        cues.push(AudioCue::MultiplyReward);
                    }
                    cues.push(AudioCue::EndingReward);
                    cues.push(AudioCue::Balance);
                }
                cues
            }
            Stage::BetChanged { .. } => vec![AudioCue::BetChange],
            Stage::CascadeStep { .. } | Stage::SpinRejected { .. } => Vec::new(),
        }
    }

    fn reward_ready(&self, now_ms: f64) -> bool {
        match self.last_reward_ms {
            Some(last) => now_ms - last > self.reward_cooldown_ms,
            None => true,
        }
    }
}

impl Default for CueMapper {
    fn default() -> Self {
        Self::new()
    }
}

/// Stage sink that forwards mapped cues to a player, timed by wall clock
pub struct CueDispatcher<P: CuePlayer> {
    mapper: CueMapper,
    player: P,
    started: Instant,
}

impl<P: CuePlayer> CueDispatcher<P> {
    pub fn new(player: P) -> Self {
        Self::with_mapper(player, CueMapper::new())
    }

    pub fn with_mapper(player: P, mapper: CueMapper) -> Self {
        Self {
            mapper,
            player,
            started: Instant::now(),
        }
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn into_player(self) -> P {
        self.player
    }
}

impl<P: CuePlayer> StageSink for CueDispatcher<P> {
    fn emit(&mut self, event: StageEvent) {
        let now_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        for cue in self.mapper.map(&event, now_ms) {
            self.player.play(cue);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{LineKind, Position};

    fn match_event() -> StageEvent {
        StageEvent::new(
            Stage::MatchFound {
                line: LineKind::Row,
                cells: vec![Position::new(0, 0), Position::new(0, 1), Position::new(0, 2)],
                symbol_id: 0,
                symbol: "Cherry".into(),
            },
            1,
        )
    }

    #[test]
    fn test_reward_cooldown() {
        let mut mapper = CueMapper::new();

        let first = mapper.map(&match_event(), 0.0);
        assert_eq!(first, vec![AudioCue::MatchDisappear, AudioCue::Reward]);

        // Within 200ms: disappear only
        let second = mapper.map(&match_event(), 150.0);
        assert_eq!(second, vec![AudioCue::MatchDisappear]);

        let third = mapper.map(&match_event(), 250.0);
        assert!(third.contains(&AudioCue::Reward));
    }

    #[test]
    fn test_settled_cues() {
        let mut mapper = CueMapper::new();
        let win = StageEvent::new(
            Stage::SpinSettled {
                final_winnings: 60.0,
                new_balance: 160.0,
                multiplier: 4,
            },
            9,
        );
        assert_eq!(
            mapper.map(&win, 0.0),
            vec![
                AudioCue::MultiplyReward,
                AudioCue::EndingReward,
                AudioCue::Balance
            ]
        );

        let loss = StageEvent::new(
            Stage::SpinSettled {
                final_winnings: 0.0,
                new_balance: 90.0,
                multiplier: 1,
            },
            2,
        );
        assert!(mapper.map(&loss, 0.0).is_empty());
    }

    #[test]
    fn test_dispatcher_forwards_to_player() {
        let mut dispatcher = CueDispatcher::new(Vec::new());
        dispatcher.emit(StageEvent::new(
            Stage::SpinStart {
                bet: 1.0,
                free_spin: false,
            },
            0,
        ));
        dispatcher.emit(StageEvent::new(Stage::BetChanged { bet: 2.0 }, 0));

        assert_eq!(
            dispatcher.into_player(),
            vec![AudioCue::SpinClick, AudioCue::BetChange]
        );
    }
}
