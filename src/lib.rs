//! Skycourier - runtime core for a block-programming drone delivery puzzle
//!
//! Core modules:
//! - `sim`: Deterministic simulation (levels, collisions, event log)
//! - `script`: Executes block-compiled programs against the capability surface
//! - `playback`: Time-paced event log consumer driving a rendering stage
//! - `settings`: Run and playback preferences

pub mod playback;
pub mod script;
pub mod settings;
pub mod sim;

pub use playback::{Playback, Pose, Stage};
pub use script::{RunReport, run_program};
pub use settings::Settings;
pub use sim::{
    DroneState, Event, Level, LevelError, RunOutcome, SimulationContext, SoundCue, StepResult,
    Wall, load_level,
};

use glam::Vec2;

/// World and proximity constants
pub mod consts {
    /// Side length of the square play area in world units
    pub const WORLD_SIZE: f32 = 100.0;

    /// Side length of the rendered map in pixels
    pub const MAP_SIZE: f32 = 400.0;
    /// Rendered drone footprint in pixels
    pub const DRONE_ICON_SIZE: f32 = 120.0;
    /// Stroke width of walls, in world units
    pub const WALL_THICKNESS: f32 = 10.0;

    /// Arrival tolerance for the target and the parcel, in world units.
    /// Half the drone footprint mapped into world space.
    pub const REACH_RADIUS: f32 = 0.5 * DRONE_ICON_SIZE / MAP_SIZE * WORLD_SIZE;
    /// Collision tolerance for walls, in world units. Tighter than
    /// [`REACH_RADIUS`]: a graze that counts as "arrived" at the target
    /// does not count as hitting a wall.
    pub const WALL_RADIUS: f32 = 0.2 * DRONE_ICON_SIZE / MAP_SIZE * WORLD_SIZE;

    /// Commands a single run may execute before it is declared a timeout.
    /// 100k commands approximates a multi-minute animation.
    pub const STEP_BUDGET: u32 = 100_000;
    /// Interpreter instructions a single run may execute. Guards programs
    /// that loop without ever issuing a command.
    pub const INSTRUCTION_BUDGET: u64 = 10_000_000;
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_angle(degrees: f32) -> f32 {
    let mut a = degrees % 360.0;
    if a < 0.0 {
        a += 360.0;
    }
    // f32 rounding can land the wrap exactly on 360
    if a >= 360.0 {
        a = 0.0;
    }
    a
}

/// Unit direction vector for a heading in degrees (0 = east, 90 = north)
#[inline]
pub fn heading_vector(degrees: f32) -> Vec2 {
    let radians = degrees.to_radians();
    Vec2::new(radians.cos(), radians.sin())
}

/// Heading in degrees of the vector from `p1` to `p2`, normalized to [0, 360)
#[inline]
pub fn points_to_angle(p1: Vec2, p2: Vec2) -> f32 {
    normalize_angle((p2.y - p1.y).atan2(p2.x - p1.x).to_degrees())
}
