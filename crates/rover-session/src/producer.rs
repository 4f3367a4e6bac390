//! The frame producer: one engine step rendered into one outcome.
//!
//! The producer owns the navigation engine and the renderer for the
//! lifetime of a session. Each call to [`FrameProducer::step`] advances
//! the simulation by exactly one discrete step and reports one of three
//! outcomes: a rendered frame, clean completion, or failure. Engine and
//! renderer errors never escape this boundary -- they are converted to
//! a `Failed` outcome once, after which the producer is inert.

use tracing::{info, warn};

use rover_sim::{FrameRenderer, NavigationEngine, SimError};

/// One rendered frame: a monotonic step index and PNG bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Step index, starting at 0 and strictly increasing.
    pub step: u64,
    /// Encoded PNG payload.
    pub png: Vec<u8>,
}

/// Result of one producer step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The simulation advanced and rendered one frame.
    Frame(Frame),
    /// The simulation is finished: all goals reached or the step
    /// ceiling was hit.
    Completed,
    /// The engine or renderer failed; the reason is final.
    Failed(String),
}

/// The outcome a finished producer keeps repeating.
#[derive(Debug, Clone)]
enum Settled {
    Completed,
    Failed(String),
}

/// Steps the engine and renders frames until a terminal outcome.
#[derive(Debug)]
pub struct FrameProducer {
    engine: NavigationEngine,
    renderer: FrameRenderer,
    next_step: u64,
    step_ceiling: u64,
    settled: Option<Settled>,
}

impl FrameProducer {
    /// Create a producer over an engine and renderer with a hard step
    /// ceiling.
    pub const fn new(
        engine: NavigationEngine,
        renderer: FrameRenderer,
        step_ceiling: u64,
    ) -> Self {
        Self {
            engine,
            renderer,
            next_step: 0,
            step_ceiling,
            settled: None,
        }
    }

    /// Advance the simulation by one step and report the outcome.
    ///
    /// Called at most once per tick while the session is `Running`; the
    /// state machine gates further calls once a terminal outcome is
    /// reported. Calling anyway is a programming error: the producer
    /// logs a warning and repeats its terminal outcome without stepping.
    pub fn step(&mut self) -> FrameOutcome {
        if let Some(settled) = &self.settled {
            warn!("frame producer stepped after terminal outcome");
            return match settled {
                Settled::Completed => FrameOutcome::Completed,
                Settled::Failed(reason) => FrameOutcome::Failed(reason.clone()),
            };
        }

        if self.next_step >= self.step_ceiling {
            info!(ceiling = self.step_ceiling, "step ceiling reached");
            self.settled = Some(Settled::Completed);
            return FrameOutcome::Completed;
        }

        if self.engine.done() {
            info!(steps = self.engine.steps_taken(), "all goals reached");
            self.settled = Some(Settled::Completed);
            return FrameOutcome::Completed;
        }

        if let Err(err) = self.engine.step() {
            return self.settle_failure(&err);
        }

        match self.renderer.render(&self.engine) {
            Ok(png) => {
                let frame = Frame {
                    step: self.next_step,
                    png,
                };
                self.next_step = self.next_step.saturating_add(1);
                FrameOutcome::Frame(frame)
            }
            Err(err) => self.settle_failure(&err),
        }
    }

    /// Record a failure and report it once.
    fn settle_failure(&mut self, err: &SimError) -> FrameOutcome {
        let reason = err.to_string();
        warn!(reason, "frame producer failed");
        self.settled = Some(Settled::Failed(reason.clone()));
        FrameOutcome::Failed(reason)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use rover_sim::robot::{Robot, RobotParams};
    use rover_types::{WorldFrame, WorldPoint};

    fn frame() -> WorldFrame {
        WorldFrame {
            width_px: 40,
            height_px: 30,
            px_per_metre: 10.0,
        }
    }

    fn producer(goals: Vec<WorldPoint>, ceiling: u64) -> FrameProducer {
        let robot = Robot::new(
            WorldPoint { x: 1.0, y: 1.0 },
            0.0,
            RobotParams::default(),
            [0, 217, 255],
        );
        let engine = NavigationEngine::new(frame(), vec![robot], goals, 0.1).unwrap();
        let background = RgbaImage::from_pixel(40, 30, Rgba([0, 0, 0, 0xff]));
        let renderer = FrameRenderer::new(background, frame()).unwrap();
        FrameProducer::new(engine, renderer, ceiling)
    }

    #[test]
    fn frames_carry_monotonic_indices() {
        let mut producer = producer(Vec::new(), 100);
        for expected in 0..5 {
            match producer.step() {
                FrameOutcome::Frame(frame) => assert_eq!(frame.step, expected),
                other => panic!("expected frame, got {other:?}"),
            }
        }
    }

    #[test]
    fn ceiling_forces_completion() {
        let mut producer = producer(Vec::new(), 3);
        assert!(matches!(producer.step(), FrameOutcome::Frame(_)));
        assert!(matches!(producer.step(), FrameOutcome::Frame(_)));
        assert!(matches!(producer.step(), FrameOutcome::Frame(_)));
        assert_eq!(producer.step(), FrameOutcome::Completed);
    }

    #[test]
    fn goal_arrival_completes_before_ceiling() {
        // Goal within one arrival radius of the start: the first step
        // consumes it, the second observes done.
        let mut producer = producer(vec![WorldPoint { x: 1.05, y: 1.0 }], 1000);
        assert!(matches!(producer.step(), FrameOutcome::Frame(_)));
        assert_eq!(producer.step(), FrameOutcome::Completed);
    }

    #[test]
    fn producer_is_inert_after_completion() {
        let mut producer = producer(Vec::new(), 1);
        assert!(matches!(producer.step(), FrameOutcome::Frame(_)));
        assert_eq!(producer.step(), FrameOutcome::Completed);
        // Stepping past the terminal outcome repeats it without
        // advancing anything.
        assert_eq!(producer.step(), FrameOutcome::Completed);
        assert_eq!(producer.step(), FrameOutcome::Completed);
    }

    #[test]
    fn zero_ceiling_completes_immediately() {
        let mut producer = producer(Vec::new(), 0);
        assert_eq!(producer.step(), FrameOutcome::Completed);
    }
}
