//! Robot kinematic parameters and per-step pose updates.
//!
//! Robots use a differential-drive "dash" behavior: each step they
//! rotate toward the current goal bounded by the maximum turn rate,
//! then advance bounded by the maximum speed. There is no planning and
//! no obstacle avoidance -- the goal list is chased point-to-point in
//! order.

use serde::{Deserialize, Serialize};

use rover_types::{WorldFrame, WorldPoint};

/// Per-robot kinematic limits, all in world units (metres, seconds,
/// radians).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RobotParams {
    /// Maximum linear speed in m/s.
    pub max_speed: f64,
    /// Maximum turn rate in rad/s.
    pub max_turn_rate: f64,
    /// Sensor range in metres (reported to clients; not used for
    /// planning since dash behavior is blind).
    pub sensor_range: f64,
    /// Body radius in metres, used for rendering.
    pub radius: f64,
    /// Distance at which a goal counts as reached, in metres.
    pub arrival_radius: f64,
}

impl Default for RobotParams {
    fn default() -> Self {
        Self {
            max_speed: 0.5,
            max_turn_rate: 2.0,
            sensor_range: 1.5,
            radius: 0.15,
            arrival_radius: 0.1,
        }
    }
}

/// One robot in the simulation: pose, limits, display color, and its
/// progress through the shared goal list.
#[derive(Debug, Clone)]
pub struct Robot {
    /// Current position in world metres.
    pub position: WorldPoint,
    /// Current heading in radians (0 = +x, counter-clockwise).
    pub heading: f64,
    /// Kinematic limits.
    pub params: RobotParams,
    /// Display color (RGB) for rendering.
    pub color: [u8; 3],
    /// Index of the next goal to visit in the shared goal list.
    next_goal: usize,
}

impl Robot {
    /// Create a robot at the given start pose.
    pub const fn new(
        position: WorldPoint,
        heading: f64,
        params: RobotParams,
        color: [u8; 3],
    ) -> Self {
        Self {
            position,
            heading,
            params,
            color,
            next_goal: 0,
        }
    }

    /// Index of the next unreached goal.
    pub const fn next_goal(&self) -> usize {
        self.next_goal
    }

    /// Whether this robot has visited every goal in a list of the given
    /// length.
    pub const fn goals_exhausted(&self, goal_count: usize) -> bool {
        self.next_goal >= goal_count
    }

    /// Advance the robot by one discrete step of `dt` seconds toward the
    /// current goal, clamped into the world frame.
    ///
    /// A goal is consumed when the robot is within its arrival radius;
    /// the robot then chases the next goal on the following step. With
    /// an exhausted goal list the robot holds position.
    pub fn step(&mut self, goals: &[WorldPoint], frame: &WorldFrame, dt: f64) {
        let Some(goal) = goals.get(self.next_goal) else {
            return;
        };

        let distance = self.position.distance_to(*goal);
        if distance <= self.params.arrival_radius {
            self.next_goal = self.next_goal.saturating_add(1);
            return;
        }

        // Rotate toward the goal, bounded by the turn rate.
        let desired = (goal.y - self.position.y).atan2(goal.x - self.position.x);
        let error = normalize_angle(desired - self.heading);
        let max_turn = self.params.max_turn_rate * dt;
        self.heading = normalize_angle(self.heading + error.clamp(-max_turn, max_turn));

        // Advance, never overshooting the goal.
        let advance = (self.params.max_speed * dt).min(distance);
        let moved = WorldPoint {
            x: self.position.x + advance * self.heading.cos(),
            y: self.position.y + advance * self.heading.sin(),
        };
        self.position = frame.clamp(moved);
    }
}

/// Normalize an angle into `[-pi, pi]`.
fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(std::f64::consts::TAU);
    if wrapped > std::f64::consts::PI {
        wrapped - std::f64::consts::TAU
    } else {
        wrapped
    }
}
