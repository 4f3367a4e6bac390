//! The navigation engine: advances every robot by one discrete step.
//!
//! The engine owns the robots and the shared, ordered goal list. Each
//! call to [`NavigationEngine::step`] moves every robot once;
//! [`NavigationEngine::done`] reports whether every robot has exhausted
//! the goal list. With zero goals the engine is never done -- the
//! session's step ceiling is then the only terminator.

use rover_types::{WorldFrame, WorldPoint};
use tracing::debug;

use crate::error::SimError;
use crate::robot::Robot;

/// Discrete-step navigation simulation over a fixed world frame.
#[derive(Debug)]
pub struct NavigationEngine {
    frame: WorldFrame,
    robots: Vec<Robot>,
    goals: Vec<WorldPoint>,
    step_time: f64,
    steps_taken: u64,
}

impl NavigationEngine {
    /// Create an engine from robots, goals, and a step time in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidStepTime`] if `step_time` is not a
    /// positive finite number.
    pub fn new(
        frame: WorldFrame,
        robots: Vec<Robot>,
        goals: Vec<WorldPoint>,
        step_time: f64,
    ) -> Result<Self, SimError> {
        if !(step_time.is_finite() && step_time > 0.0) {
            return Err(SimError::InvalidStepTime { value: step_time });
        }
        Ok(Self {
            frame,
            robots,
            goals,
            step_time,
            steps_taken: 0,
        })
    }

    /// Advance every robot by one discrete step.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::NumericDivergence`] if any robot pose becomes
    /// non-finite, which indicates corrupted input rather than a
    /// recoverable condition.
    pub fn step(&mut self) -> Result<(), SimError> {
        for robot in &mut self.robots {
            robot.step(&self.goals, &self.frame, self.step_time);
            if !(robot.position.x.is_finite()
                && robot.position.y.is_finite()
                && robot.heading.is_finite())
            {
                return Err(SimError::NumericDivergence {
                    step: self.steps_taken,
                });
            }
        }
        self.steps_taken = self.steps_taken.saturating_add(1);
        debug!(step = self.steps_taken, "engine advanced");
        Ok(())
    }

    /// Whether every robot has visited every goal.
    ///
    /// Always `false` with an empty goal list so a goalless session runs
    /// until its step ceiling.
    pub fn done(&self) -> bool {
        if self.goals.is_empty() {
            return false;
        }
        self.robots
            .iter()
            .all(|robot| robot.goals_exhausted(self.goals.len()))
    }

    /// The robots, in spawn order.
    pub fn robots(&self) -> &[Robot] {
        &self.robots
    }

    /// The shared goal list, in visit order.
    pub fn goals(&self) -> &[WorldPoint] {
        &self.goals
    }

    /// The world frame this engine runs in.
    pub const fn frame(&self) -> WorldFrame {
        self.frame
    }

    /// Number of steps executed so far.
    pub const fn steps_taken(&self) -> u64 {
        self.steps_taken
    }
}
