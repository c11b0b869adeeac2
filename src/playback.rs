//! Time-paced playback of the event log
//!
//! Execution records everything up front; playback replays the log one
//! event per frame against a [`Stage`] collaborator, so the animation runs
//! at its own cadence regardless of how fast the program executed. At most
//! one playback is live at a time: starting a new run builds a fresh
//! [`Playback`], and [`Playback::cancel`] drops all pending work first.

use std::collections::VecDeque;
use std::time::Duration;

use crate::script::RunReport;
use crate::settings::Settings;
use crate::sim::{Event, SoundCue};

/// Drone pose for a playback frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pose {
    /// Gliding, wings still
    Soar,
    /// Under power, rotors working
    Flap,
    /// Landed
    Sit,
}

/// The rendering collaborator playback drives.
///
/// Implementations draw to whatever surface the host has; the core never
/// touches pixels or audio devices.
pub trait Stage {
    fn draw_drone(&mut self, x: f32, y: f32, heading: f32, pose: Pose);
    fn hide_parcel(&mut self);
    fn play_sound(&mut self, cue: SoundCue);
    fn show_success(&mut self);
    /// Highlight the program block that produced the current frame;
    /// `None` clears the highlight.
    fn highlight_source(&mut self, source: Option<&str>);
}

/// Events consumed per `advance` call at most, however much time has
/// accumulated
const MAX_FRAME_EVENTS: u32 = 8;

/// A cooperative, time-paced consumer of one run's event log
#[derive(Debug)]
pub struct Playback {
    queue: VecDeque<Event>,
    frame_delay: Duration,
    accumulator: Duration,
    /// Last drawn position and heading, for the landing frame
    cursor: Option<(f32, f32, f32)>,
    cleared_highlight: bool,
}

impl Playback {
    /// Take over a finished run's log, pacing frames by its outcome
    pub fn new(report: RunReport, settings: &Settings) -> Self {
        Self {
            queue: report.events.into(),
            frame_delay: settings.frame_delay(report.outcome),
            accumulator: Duration::ZERO,
            cursor: None,
            cleared_highlight: false,
        }
    }

    /// Delay between two playback frames
    pub fn frame_delay(&self) -> Duration {
        self.frame_delay
    }

    /// Whether every event has been rendered
    pub fn is_done(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop all pending events and accumulated time. After a cancel the
    /// playback renders nothing further; a new run starts from a fresh
    /// `Playback`.
    pub fn cancel(&mut self) {
        self.queue.clear();
        self.accumulator = Duration::ZERO;
    }

    /// Accumulate `dt` of real time and render however many frames it
    /// covers, capped per call.
    pub fn advance(&mut self, dt: Duration, stage: &mut dyn Stage) {
        // Clamp a stalled host's backlog to one second
        self.accumulator += dt.min(Duration::from_secs(1));

        let mut frames = 0;
        while self.accumulator >= self.frame_delay && frames < MAX_FRAME_EVENTS {
            self.accumulator -= self.frame_delay;
            if !self.step(stage) {
                self.accumulator = Duration::ZERO;
                break;
            }
            frames += 1;
        }
    }

    /// Render exactly one event. Returns false once the log is exhausted,
    /// clearing the block highlight the first time that happens.
    pub fn step(&mut self, stage: &mut dyn Stage) -> bool {
        let Some(event) = self.queue.pop_front() else {
            if !self.cleared_highlight {
                self.cleared_highlight = true;
                stage.highlight_source(None);
            }
            return false;
        };

        match event {
            Event::Move {
                x,
                y,
                heading,
                source,
            } => {
                stage.highlight_source(source.as_deref());
                stage.draw_drone(x, y, heading, Pose::Flap);
                self.cursor = Some((x, y, heading));
            }
            Event::Glide { x, y, heading } => {
                stage.highlight_source(None);
                stage.draw_drone(x, y, heading, Pose::Soar);
                self.cursor = Some((x, y, heading));
            }
            Event::ParcelCollected => {
                stage.highlight_source(None);
                stage.hide_parcel();
            }
            Event::Sound(cue) => {
                stage.highlight_source(None);
                stage.play_sound(cue);
            }
            Event::Finished => {
                stage.highlight_source(None);
                if let Some((x, y, heading)) = self.cursor {
                    stage.draw_drone(x, y, heading, Pose::Sit);
                }
                stage.show_success();
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::RunOutcome;

    /// Records every stage call for assertions
    #[derive(Default)]
    struct Recording {
        calls: Vec<String>,
    }

    impl Stage for Recording {
        fn draw_drone(&mut self, x: f32, y: f32, _heading: f32, pose: Pose) {
            self.calls.push(format!("draw {x} {y} {pose:?}"));
        }
        fn hide_parcel(&mut self) {
            self.calls.push("hide_parcel".into());
        }
        fn play_sound(&mut self, cue: SoundCue) {
            self.calls.push(format!("sound {cue:?}"));
        }
        fn show_success(&mut self) {
            self.calls.push("success".into());
        }
        fn highlight_source(&mut self, source: Option<&str>) {
            self.calls.push(format!("highlight {source:?}"));
        }
    }

    fn report(outcome: RunOutcome, events: Vec<Event>) -> RunReport {
        RunReport {
            outcome,
            events,
            fault: None,
        }
    }

    fn success_report() -> RunReport {
        report(
            RunOutcome::Success,
            vec![
                Event::Move {
                    x: 21.0,
                    y: 20.0,
                    heading: 0.0,
                    source: Some("b1".into()),
                },
                Event::Sound(SoundCue::Delivered),
                Event::Glide {
                    x: 80.0,
                    y: 80.0,
                    heading: 45.0,
                },
                Event::Finished,
            ],
        )
    }

    #[test]
    fn renders_events_in_order() {
        let settings = Settings::default();
        let mut playback = Playback::new(success_report(), &settings);
        let mut stage = Recording::default();

        while playback.step(&mut stage) {}

        assert_eq!(
            stage.calls,
            vec![
                "highlight Some(\"b1\")",
                "draw 21 20 Flap",
                "highlight None",
                "sound Delivered",
                "highlight None",
                "draw 80 80 Soar",
                "highlight None",
                "draw 80 80 Sit",
                "success",
                // Log exhausted: the final highlight clear
                "highlight None",
            ]
        );
    }

    #[test]
    fn advance_paces_by_frame_delay() {
        let settings = Settings::default();
        let delay = settings.frame_delay(RunOutcome::Success);
        let mut playback = Playback::new(success_report(), &settings);
        let mut stage = Recording::default();

        // Not enough time for a frame
        playback.advance(delay / 2, &mut stage);
        assert!(stage.calls.is_empty());

        // Now past one frame boundary
        playback.advance(delay / 2, &mut stage);
        assert_eq!(
            stage.calls,
            vec!["highlight Some(\"b1\")", "draw 21 20 Flap"]
        );
    }

    #[test]
    fn advance_caps_frames_per_call() {
        let settings = Settings::default();
        let mut events = Vec::new();
        for i in 0..40 {
            events.push(Event::Glide {
                x: i as f32,
                y: 0.0,
                heading: 0.0,
            });
        }
        let mut playback = Playback::new(report(RunOutcome::Error, events), &settings);
        let mut stage = Recording::default();

        playback.advance(Duration::from_secs(60), &mut stage);
        let draws = stage.calls.iter().filter(|c| c.starts_with("draw")).count();
        assert_eq!(draws as u32, MAX_FRAME_EVENTS);
    }

    #[test]
    fn failed_runs_play_back_slower() {
        let settings = Settings::default();
        let fast = Playback::new(success_report(), &settings);
        let slow = Playback::new(report(RunOutcome::Error, vec![]), &settings);
        assert!(fast.frame_delay() < slow.frame_delay());
    }

    #[test]
    fn cancel_drops_all_pending_work() {
        let settings = Settings::default();
        let events = (0..10)
            .map(|i| Event::Glide {
                x: i as f32,
                y: 0.0,
                heading: 0.0,
            })
            .collect();
        let mut playback = Playback::new(report(RunOutcome::Success, events), &settings);
        let mut stage = Recording::default();

        playback.advance(Duration::from_millis(100), &mut stage);
        let rendered = stage.calls.len();
        assert!(rendered > 0);
        assert!(!playback.is_done());

        playback.cancel();
        assert!(playback.is_done());
        playback.advance(Duration::from_secs(10), &mut stage);
        // Only the end-of-log highlight clear may follow a cancel
        assert_eq!(stage.calls.len(), rendered + 1);
        assert!(!stage.calls[rendered..].iter().any(|c| c.starts_with("draw")));
    }
}
