//! Run state, the event log, and outcomes
//!
//! Everything a single run mutates lives in [`SimulationContext`]: the drone
//! pose, the append-only event log, the command counter, and the outcome.
//! The context is passed explicitly to every operation; whichever component
//! is active owns it (the script adapter during execution, then the playback
//! driver takes the log).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::level::Level;

/// Sound cues emitted into the event log. Playing them is the stage's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    /// Parcel delivered to the target
    Delivered,
    /// Parcel scooped up en route
    ParcelPickup,
    /// Drone clipped a wall
    WallHit,
}

/// A single entry in the replayable event log.
///
/// The log is append-only during execution and consumed strictly in order
/// during playback, so animation is independent of execution speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// One unit of advance under direct program command.
    /// `source` is the id of the block that issued it, for highlighting.
    Move {
        x: f32,
        y: f32,
        heading: f32,
        source: Option<String>,
    },
    /// One unit of advance in an automatic snap-to-point sequence
    Glide { x: f32, y: f32, heading: f32 },
    /// The parcel was collected
    ParcelCollected,
    /// Play a sound cue
    Sound(SoundCue),
    /// The run ended in a delivery. Always the last event when present.
    Finished,
}

/// How a run ended.
///
/// Exactly one outcome is produced per execution; the first transition out
/// of `Unset` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunOutcome {
    /// No run has finished yet
    #[default]
    Unset,
    /// The drone delivered the parcel to the target
    Success,
    /// The program ran to completion without ever issuing a command
    Failure,
    /// The step or instruction budget ran out
    Timeout,
    /// Wall collision, or a fault reported by the interpreter
    Error,
}

/// The drone's mutable pose and inventory
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DroneState {
    /// Position in world units
    pub position: Vec2,
    /// Heading in degrees, normalized to [0, 360)
    pub heading: f32,
    /// Whether the drone is carrying the parcel
    pub has_parcel: bool,
}

impl DroneState {
    fn at_start(level: &Level) -> Self {
        Self {
            position: level.start,
            heading: crate::normalize_angle(level.start_heading),
            has_parcel: level.parcel.is_none(),
        }
    }
}

/// All mutable state of one run
#[derive(Debug, Clone)]
pub struct SimulationContext {
    /// The level being played, boundary walls finalized
    pub level: Level,
    /// The drone. Only `sim::step` mutates its position.
    pub drone: DroneState,
    log: Vec<Event>,
    commands: u32,
    outcome: RunOutcome,
}

impl SimulationContext {
    /// Build a fresh context for `level`, finalizing its boundary walls and
    /// placing the drone at the start pose.
    pub fn new(mut level: Level) -> Self {
        level.add_boundary_walls();
        let drone = DroneState::at_start(&level);
        Self {
            level,
            drone,
            log: Vec::new(),
            commands: 0,
            outcome: RunOutcome::Unset,
        }
    }

    /// Return the drone to the start pose and discard the run's log,
    /// command count, and outcome.
    pub fn reset(&mut self) {
        self.drone = DroneState::at_start(&self.level);
        self.log.clear();
        self.commands = 0;
        self.outcome = RunOutcome::Unset;
    }

    pub(crate) fn push(&mut self, event: Event) {
        self.log.push(event);
    }

    pub(crate) fn count_command(&mut self) {
        self.commands += 1;
    }

    /// Events recorded so far, in execution order
    pub fn log(&self) -> &[Event] {
        &self.log
    }

    /// Move the event log out of the context for playback
    pub fn take_log(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.log)
    }

    /// Commands the program has issued this run
    pub fn commands_issued(&self) -> u32 {
        self.commands
    }

    pub fn outcome(&self) -> RunOutcome {
        self.outcome
    }

    /// Record the run's outcome. The first call wins; later calls are
    /// ignored so a terminated run can never change its outcome.
    pub fn finish(&mut self, outcome: RunOutcome) {
        if self.outcome == RunOutcome::Unset {
            self.outcome = outcome;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::load_level;

    #[test]
    fn context_starts_at_level_pose() {
        let ctx = SimulationContext::new(load_level(3).unwrap());
        assert_eq!(ctx.drone.position, Vec2::new(20.0, 70.0));
        assert_eq!(ctx.drone.heading, 270.0);
        assert!(!ctx.drone.has_parcel);
        assert!(ctx.log().is_empty());
        assert_eq!(ctx.outcome(), RunOutcome::Unset);
    }

    #[test]
    fn carrying_from_the_start_when_no_parcel() {
        let ctx = SimulationContext::new(load_level(4).unwrap());
        assert!(ctx.drone.has_parcel);
    }

    #[test]
    fn outcome_is_terminal_on_first_transition() {
        let mut ctx = SimulationContext::new(load_level(1).unwrap());
        ctx.finish(RunOutcome::Error);
        ctx.finish(RunOutcome::Success);
        assert_eq!(ctx.outcome(), RunOutcome::Error);
    }

    #[test]
    fn reset_clears_the_run() {
        let mut ctx = SimulationContext::new(load_level(1).unwrap());
        ctx.drone.position = Vec2::new(42.0, 42.0);
        ctx.push(Event::Finished);
        ctx.count_command();
        ctx.finish(RunOutcome::Timeout);

        ctx.reset();
        assert_eq!(ctx.drone.position, Vec2::new(20.0, 20.0));
        assert!(ctx.log().is_empty());
        assert_eq!(ctx.commands_issued(), 0);
        assert_eq!(ctx.outcome(), RunOutcome::Unset);
    }

    #[test]
    fn boundary_walls_finalized_on_construction() {
        let ctx = SimulationContext::new(load_level(1).unwrap());
        assert_eq!(ctx.level.walls.len(), 4);
    }

    #[test]
    fn event_log_round_trips_through_json() {
        let events = vec![
            Event::Move {
                x: 20.7,
                y: 20.7,
                heading: 45.0,
                source: Some("b1".into()),
            },
            Event::Sound(SoundCue::Delivered),
            Event::Glide {
                x: 80.0,
                y: 80.0,
                heading: 45.0,
            },
            Event::Finished,
        ];
        let json = serde_json::to_string(&events).unwrap();
        let back: Vec<Event> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, events);
    }
}
