//! The per-command state transition
//!
//! One `heading` command moves the drone a single unit and then resolves, in
//! order: delivery, parcel pickup, wall collision. Delivery and collision
//! terminate the run through the returned [`StepResult`]; everything else
//! continues.

use glam::Vec2;

use super::state::{Event, RunOutcome, SimulationContext, SoundCue};
use crate::consts::{REACH_RADIUS, WALL_RADIUS};
use crate::{heading_vector, normalize_angle, points_to_angle};

/// What a single command did to the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// The run goes on; the program may issue further commands
    Continue,
    /// The run is over. `Success` for a delivery, `Error` for a collision.
    /// No further commands may execute.
    Terminated(RunOutcome),
}

/// Advance the drone one unit along `angle` and resolve the consequences.
///
/// `source` is the id of the program block that issued the command; it rides
/// along on the logged `Move` event so playback can highlight the block.
///
/// Arrival is checked before walls on the same step: a drone that reaches
/// the target while grazing a wall still delivers.
pub fn apply_heading(ctx: &mut SimulationContext, angle: f32, source: Option<&str>) -> StepResult {
    let angle = normalize_angle(angle);
    ctx.count_command();
    ctx.drone.position += heading_vector(angle);
    ctx.drone.heading = angle;
    ctx.push(Event::Move {
        x: ctx.drone.position.x,
        y: ctx.drone.position.y,
        heading: angle,
        source: source.map(str::to_owned),
    });

    if ctx.drone.has_parcel && near(ctx.drone.position, ctx.level.target, REACH_RADIUS) {
        let target = ctx.level.target;
        ctx.push(Event::Sound(SoundCue::Delivered));
        glide_to(ctx, target);
        ctx.push(Event::Finished);
        log::debug!("delivered after {} commands", ctx.commands_issued());
        return StepResult::Terminated(RunOutcome::Success);
    }

    if !ctx.drone.has_parcel {
        if let Some(parcel) = ctx.level.parcel {
            if near(ctx.drone.position, parcel, REACH_RADIUS) {
                glide_to(ctx, parcel);
                ctx.push(Event::ParcelCollected);
                ctx.push(Event::Sound(SoundCue::ParcelPickup));
                ctx.drone.has_parcel = true;
            }
        }
    }

    let pos = ctx.drone.position;
    if ctx.level.walls.iter().any(|w| w.distance_to(pos) < WALL_RADIUS) {
        ctx.push(Event::Sound(SoundCue::WallHit));
        log::debug!("wall hit at ({:.1}, {:.1})", pos.x, pos.y);
        return StepResult::Terminated(RunOutcome::Error);
    }

    StepResult::Continue
}

#[inline]
fn near(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance(b) < radius
}

/// Walk the drone in a straight line onto `dest`, one unit per `Glide`
/// event, snapping the final step exactly onto the destination so the
/// rendered endpoint is independent of the unit-step granularity.
///
/// Always emits at least one `Glide`.
fn glide_to(ctx: &mut SimulationContext, dest: Vec2) {
    let heading = points_to_angle(ctx.drone.position, dest);
    let dir = heading_vector(heading);
    ctx.drone.heading = heading;
    loop {
        if ctx.drone.position.distance(dest) <= 1.0 {
            ctx.drone.position = dest;
        } else {
            ctx.drone.position += dir;
        }
        ctx.push(Event::Glide {
            x: ctx.drone.position.x,
            y: ctx.drone.position.y,
            heading,
        });
        if ctx.drone.position == dest {
            return;
        }
    }
}
