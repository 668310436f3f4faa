//! # bs-stage: BitSlot Stage System
//!
//! Defines the stages a spin passes through, as seen from outside the engine.
//! The spin engine never talks to audio or animation directly. It emits
//! STAGES into an injected [`StageSink`], and presentation decides what to
//! play, tween, or count up.
//!
//! ```text
//! SpinEngine ──emit──> StageSink
//!                        ├── StageCollector   (tests, replays)
//!                        ├── CueDispatcher    (one-shot audio cues)
//!                        └── any presentation adapter
//! ```

pub mod cue;
pub mod event;
pub mod sink;
pub mod stage;
pub mod taxonomy;

pub use cue::*;
pub use event::*;
pub use sink::*;
pub use stage::*;
pub use taxonomy::*;
