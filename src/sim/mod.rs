//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Discrete unit steps only, driven one command at a time
//! - No randomness
//! - No rendering, audio, or interpreter dependencies
//!
//! The interpreter adapter (`crate::script`) drives it through
//! [`SimulationContext`]; playback only ever reads the event log it produces.

pub mod geometry;
pub mod level;
pub mod state;
pub mod step;

pub use geometry::Wall;
pub use level::{Level, LevelError, MAX_LEVEL, load_level};
pub use state::{DroneState, Event, RunOutcome, SimulationContext, SoundCue};
pub use step::{StepResult, apply_heading};
