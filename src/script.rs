//! Program execution adapter
//!
//! Runs a block-compiled program against the simulation's capability
//! surface. The program text is Lua; the interpreter sees exactly four
//! globals:
//!
//! - `heading(angle, blockId)` - advance one unit, may end the run
//! - `hasNoItem()` - true while the parcel has not been collected
//! - `getX()` / `getY()` - current drone position
//!
//! The visual block language has no looping construct at this level, so the
//! adapter owns the loop: the source is compiled once into a function and
//! called repeatedly until the run terminates. Delivery and collision
//! unwind the in-progress call through the interpreter's error channel as a
//! typed [`RunSignal`]; the adapter converts the signal into the run's
//! outcome. Two deterministic budgets bound every run: a command budget and
//! a VM instruction budget.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use mlua::{HookTriggers, Lua, LuaOptions, StdLib};
use thiserror::Error;

use crate::settings::Settings;
use crate::sim::{Event, Level, RunOutcome, SimulationContext, StepResult, apply_heading};

/// Instructions between hook invocations when counting VM work
const HOOK_INTERVAL: u32 = 1000;

/// Termination signals carried through the interpreter's error channel.
///
/// Successful delivery and collision are control-flow exits, not return
/// values: the compiled body never observes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
enum RunSignal {
    #[error("parcel delivered")]
    Delivered,
    #[error("wall collision")]
    Collision,
    #[error("step budget exhausted")]
    OutOfSteps,
}

/// Everything a run produced: its outcome, the replayable event log, and
/// any host-reported fault for diagnostic display.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// The event log, in execution order
    pub events: Vec<Event>,
    /// Present when `outcome` is `Error` for a reason other than a wall
    /// collision: a syntax error or runtime fault in the program
    pub fault: Option<String>,
}

/// Execute `source` against a fresh run of `level`.
///
/// Always returns a report; faults are surfaced in [`RunReport::fault`]
/// rather than swallowed. Exactly one outcome is produced per call.
pub fn run_program(level: Level, source: &str, settings: &Settings) -> RunReport {
    let ctx = Rc::new(RefCell::new(SimulationContext::new(level)));

    let (outcome, fault) = match execute(&ctx, source, settings) {
        Ok(outcome) => (outcome, None),
        Err(err) => {
            log::warn!("program fault: {err}");
            (RunOutcome::Error, Some(err.to_string()))
        }
    };

    let mut ctx = ctx.borrow_mut();
    ctx.finish(outcome);
    log::info!(
        "run finished: {:?} after {} commands, {} events",
        ctx.outcome(),
        ctx.commands_issued(),
        ctx.log().len()
    );
    RunReport {
        outcome: ctx.outcome(),
        events: ctx.take_log(),
        fault,
    }
}

fn execute(
    ctx: &Rc<RefCell<SimulationContext>>,
    source: &str,
    settings: &Settings,
) -> mlua::Result<RunOutcome> {
    // Only the math stdlib; the program needs nothing else
    let lua = Lua::new_with(StdLib::MATH, LuaOptions::default())?;
    install_capabilities(&lua, ctx, settings)?;
    install_instruction_budget(&lua, settings);

    let body = lua.load(source).into_function()?;

    loop {
        match body.call::<_, ()>(()) {
            Ok(()) => {
                if ctx.borrow().commands_issued() == 0 {
                    // One full pass without a single command: the program
                    // cannot make progress
                    return Ok(RunOutcome::Failure);
                }
            }
            Err(err) => {
                return match signal_of(&err) {
                    Some(RunSignal::Delivered) => Ok(RunOutcome::Success),
                    Some(RunSignal::Collision) => Ok(RunOutcome::Error),
                    Some(RunSignal::OutOfSteps) => Ok(RunOutcome::Timeout),
                    None => Err(err),
                };
            }
        }
    }
}

/// Bind the four capability functions into the interpreter's global scope.
fn install_capabilities(
    lua: &Lua,
    ctx: &Rc<RefCell<SimulationContext>>,
    settings: &Settings,
) -> mlua::Result<()> {
    let globals = lua.globals();
    let step_budget = settings.step_budget;

    let heading_ctx = ctx.clone();
    let heading = lua.create_function(move |_, (angle, block): (f64, Option<String>)| {
        let mut ctx = heading_ctx.borrow_mut();
        if ctx.commands_issued() >= step_budget {
            return Err(mlua::Error::external(RunSignal::OutOfSteps));
        }
        match apply_heading(&mut ctx, angle as f32, block.as_deref()) {
            StepResult::Continue => Ok(()),
            StepResult::Terminated(RunOutcome::Success) => {
                Err(mlua::Error::external(RunSignal::Delivered))
            }
            StepResult::Terminated(_) => Err(mlua::Error::external(RunSignal::Collision)),
        }
    })?;
    globals.set("heading", heading)?;

    let item_ctx = ctx.clone();
    let has_no_item =
        lua.create_function(move |_, ()| Ok(!item_ctx.borrow().drone.has_parcel))?;
    globals.set("hasNoItem", has_no_item)?;

    let x_ctx = ctx.clone();
    let get_x = lua.create_function(move |_, ()| Ok(f64::from(x_ctx.borrow().drone.position.x)))?;
    globals.set("getX", get_x)?;

    let y_ctx = ctx.clone();
    let get_y = lua.create_function(move |_, ()| Ok(f64::from(y_ctx.borrow().drone.position.y)))?;
    globals.set("getY", get_y)?;

    Ok(())
}

/// Abort execution once the VM has run more instructions than the budget
/// allows. Catches programs that loop without ever issuing a command; fires
/// at the same instruction count for identical programs.
fn install_instruction_budget(lua: &Lua, settings: &Settings) {
    let budget = settings.instruction_budget;
    let spent = Cell::new(0u64);
    lua.set_hook(
        HookTriggers::new().every_nth_instruction(HOOK_INTERVAL),
        move |_, _| {
            let used = spent.get() + u64::from(HOOK_INTERVAL);
            spent.set(used);
            if used > budget {
                Err(mlua::Error::external(RunSignal::OutOfSteps))
            } else {
                Ok(())
            }
        },
    );
}

/// Dig a [`RunSignal`] out of the interpreter's error chain, if one is
/// there. Anything else is a genuine program fault.
fn signal_of(err: &mlua::Error) -> Option<RunSignal> {
    match err {
        mlua::Error::CallbackError { cause, .. } => signal_of(cause),
        mlua::Error::ExternalError(inner) => inner.downcast_ref::<RunSignal>().copied(),
        _ => None,
    }
}
