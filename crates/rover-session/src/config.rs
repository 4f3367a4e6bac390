//! Configuration for the Rover backend and for individual sessions.
//!
//! Two layers live here:
//!
//! - [`RoverConfig`] -- the process-wide runtime configuration loaded
//!   from `rover-config.yaml` (server address, maps directory, scenario
//!   output path, session limits, world geometry and robot defaults).
//!   Every field has a default so the backend runs without a file.
//! - [`SessionConfig`] -- the immutable per-session record built from an
//!   operator's start request against the runtime configuration. It is
//!   validated once, converted to world coordinates, persisted as a
//!   scenario YAML document, and never mutated afterward -- a new
//!   session replaces it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use rover_sim::render::ROBOT_PALETTE;
use rover_sim::robot::{Robot, RobotParams};
use rover_types::{PixelPoint, WorldFrame, WorldPoint};

/// Errors that can occur when loading configuration or building a
/// session from a start request.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse or serialize YAML content.
    #[error("failed to process config YAML: {source}")]
    Yaml {
        /// The underlying YAML error.
        source: serde_yml::Error,
    },

    /// The requested robot count is outside the allowed range.
    #[error("robot count must be between 1 and {max}, got {requested}")]
    RobotCountOutOfRange {
        /// The rejected count.
        requested: u32,
        /// The configured upper bound.
        max: u32,
    },

    /// The request carries more goals than the configured bound.
    #[error("at most {max} goals are allowed, got {requested}")]
    TooManyGoals {
        /// The rejected goal count.
        requested: usize,
        /// The configured upper bound.
        max: usize,
    },

    /// A coordinate is NaN or infinite.
    #[error("{field} must be finite")]
    NonFiniteCoordinate {
        /// Which request field carried the value.
        field: &'static str,
    },

    /// A coordinate lies outside the map canvas.
    #[error("{field} ({x}, {y}) is outside the {width}x{height} px map")]
    CoordinateOutOfBounds {
        /// Which request field carried the point.
        field: &'static str,
        /// Horizontal pixel coordinate.
        x: f64,
        /// Vertical pixel coordinate.
        y: f64,
        /// Map width in pixels.
        width: u32,
        /// Map height in pixels.
        height: u32,
    },

    /// The configured world scale is unusable.
    #[error("px_per_metre must be a positive finite number, got {value}")]
    InvalidScale {
        /// The rejected scale.
        value: f64,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

// ---------------------------------------------------------------------------
// Runtime configuration (rover-config.yaml)
// ---------------------------------------------------------------------------

/// Top-level runtime configuration.
///
/// Mirrors the structure of `rover-config.yaml`. All fields have
/// defaults matching the reference deployment.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RoverConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// Map asset settings.
    #[serde(default)]
    pub maps: MapSettings,

    /// Generated scenario file settings.
    #[serde(default)]
    pub scenario: ScenarioSettings,

    /// Session pacing and bounds.
    #[serde(default)]
    pub session: SessionSettings,

    /// World geometry and robot parameter defaults.
    #[serde(default)]
    pub world: WorldSettings,
}

impl RoverConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// The canvas-to-world mapping described by the world settings.
    pub const fn world_frame(&self) -> WorldFrame {
        WorldFrame {
            width_px: self.world.width_px,
            height_px: self.world.height_px,
            px_per_metre: self.world.px_per_metre,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// The host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Map asset settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MapSettings {
    /// Directory holding map images, keyed by file name.
    #[serde(default = "default_maps_dir")]
    pub dir: PathBuf,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            dir: default_maps_dir(),
        }
    }
}

/// Generated scenario file settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScenarioSettings {
    /// Where the per-session scenario YAML is written. Each start
    /// request overwrites the previous scenario.
    #[serde(default = "default_scenario_path")]
    pub path: PathBuf,
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        Self {
            path: default_scenario_path(),
        }
    }
}

/// Session pacing and bounds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionSettings {
    /// Minimum wall-clock spacing between frame deliveries, in
    /// milliseconds.
    #[serde(default = "default_pacing_interval_ms")]
    pub pacing_interval_ms: u64,

    /// Hard step ceiling: the session completes when this many steps
    /// have been produced even if the engine never reports done.
    #[serde(default = "default_step_ceiling")]
    pub step_ceiling: u64,

    /// Upper bound on robots per session.
    #[serde(default = "default_max_robots")]
    pub max_robots: u32,

    /// Upper bound on goals per session.
    #[serde(default = "default_max_goals")]
    pub max_goals: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            pacing_interval_ms: default_pacing_interval_ms(),
            step_ceiling: default_step_ceiling(),
            max_robots: default_max_robots(),
            max_goals: default_max_goals(),
        }
    }
}

/// World geometry and robot parameter defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldSettings {
    /// Map width in pixels.
    #[serde(default = "default_width_px")]
    pub width_px: u32,

    /// Map height in pixels.
    #[serde(default = "default_height_px")]
    pub height_px: u32,

    /// Pixels per metre (100 px = 1 m in the reference maps).
    #[serde(default = "default_px_per_metre")]
    pub px_per_metre: f64,

    /// Simulated seconds per discrete step.
    #[serde(default = "default_step_time_s")]
    pub step_time_s: f64,

    /// Kinematic limits applied to every robot.
    #[serde(default)]
    pub robot: RobotParams,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            width_px: default_width_px(),
            height_px: default_height_px(),
            px_per_metre: default_px_per_metre(),
            step_time_s: default_step_time_s(),
            robot: RobotParams::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Session configuration
// ---------------------------------------------------------------------------

/// An operator's start request, in canvas pixel coordinates.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionRequest {
    /// Name of the map asset to run on.
    pub map_name: String,

    /// Number of robots to spawn.
    #[serde(default = "default_robot_count")]
    pub robot_count: u32,

    /// Robot start point on the canvas.
    pub robot_position: PixelPoint,

    /// Ordered goal points on the canvas.
    #[serde(default)]
    pub goals: Vec<PixelPoint>,
}

/// Immutable per-session record: the validated request converted into
/// world coordinates plus every derived knob the session needs.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Name of the map asset.
    pub map_name: String,
    /// Number of robots.
    pub robot_count: u32,
    /// Robot start in world metres.
    pub start: WorldPoint,
    /// Ordered goals in world metres.
    pub goals: Vec<WorldPoint>,
    /// The canvas-to-world mapping.
    pub frame: WorldFrame,
    /// Simulated seconds per step.
    pub step_time: f64,
    /// Kinematic limits applied to every robot.
    pub robot_params: RobotParams,
    /// Minimum spacing between frame deliveries.
    pub pacing: Duration,
    /// Hard step ceiling.
    pub step_ceiling: u64,
}

impl SessionConfig {
    /// Validate a start request against the runtime configuration and
    /// build the immutable session record.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first violated
    /// constraint; no side effects occur on failure.
    pub fn build(request: SessionRequest, config: &RoverConfig) -> Result<Self, ConfigError> {
        let scale = config.world.px_per_metre;
        if !(scale.is_finite() && scale > 0.0) {
            return Err(ConfigError::InvalidScale { value: scale });
        }

        if request.robot_count == 0 || request.robot_count > config.session.max_robots {
            return Err(ConfigError::RobotCountOutOfRange {
                requested: request.robot_count,
                max: config.session.max_robots,
            });
        }

        if request.goals.len() > config.session.max_goals {
            return Err(ConfigError::TooManyGoals {
                requested: request.goals.len(),
                max: config.session.max_goals,
            });
        }

        let frame = config.world_frame();
        check_point(request.robot_position, "robot_position", frame)?;
        for goal in &request.goals {
            check_point(*goal, "goals", frame)?;
        }

        let start = frame.to_world(request.robot_position);
        let goals = request.goals.iter().map(|g| frame.to_world(*g)).collect();

        Ok(Self {
            map_name: request.map_name,
            robot_count: request.robot_count,
            start,
            goals,
            frame,
            step_time: config.world.step_time_s,
            robot_params: config.world.robot,
            pacing: Duration::from_millis(config.session.pacing_interval_ms),
            step_ceiling: config.session.step_ceiling,
        })
    }

    /// Spawn the session's robots at the start point.
    ///
    /// Robots after the first are offset along +x by one body diameter
    /// per index (clamped to the world) so they do not render stacked.
    pub fn spawn_robots(&self) -> Vec<Robot> {
        let diameter = self.robot_params.radius * 2.0;
        (0..self.robot_count)
            .map(|index| {
                let offset = f64::from(index) * diameter;
                let position = self.frame.clamp(WorldPoint {
                    x: self.start.x + offset,
                    y: self.start.y,
                });
                Robot::new(position, 0.0, self.robot_params, palette_color(index))
            })
            .collect()
    }
}

/// Reject points that are non-finite or outside the canvas.
fn check_point(
    point: PixelPoint,
    field: &'static str,
    frame: WorldFrame,
) -> Result<(), ConfigError> {
    if !(point.x.is_finite() && point.y.is_finite()) {
        return Err(ConfigError::NonFiniteCoordinate { field });
    }
    let inside = point.x >= 0.0
        && point.x <= f64::from(frame.width_px)
        && point.y >= 0.0
        && point.y <= f64::from(frame.height_px);
    if !inside {
        return Err(ConfigError::CoordinateOutOfBounds {
            field,
            x: point.x,
            y: point.y,
            width: frame.width_px,
            height: frame.height_px,
        });
    }
    Ok(())
}

/// Display color for a robot by spawn index, cycling the palette.
fn palette_color(index: u32) -> [u8; 3] {
    let len = u32::try_from(ROBOT_PALETTE.len()).unwrap_or(1);
    let slot = usize::try_from(index.checked_rem(len).unwrap_or(0)).unwrap_or(0);
    ROBOT_PALETTE.get(slot).copied().unwrap_or([0xff, 0xff, 0xff])
}

// ---------------------------------------------------------------------------
// Scenario file
// ---------------------------------------------------------------------------

/// The generated scenario document persisted on every session start.
///
/// The structure follows the simulator configuration format the
/// reference deployment used: a `world` block, one `robot` entry per
/// robot with differential-drive kinematics and dash behavior, and one
/// `obstacle` marker per goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioFile {
    /// World block: dimensions, timing, and the map asset name.
    pub world: ScenarioWorld,
    /// One entry per robot.
    pub robot: Vec<ScenarioRobot>,
    /// One marker per goal.
    pub obstacle: Vec<ScenarioObstacle>,
}

/// The scenario's world block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioWorld {
    /// World height in metres.
    pub height: f64,
    /// World width in metres.
    pub width: f64,
    /// Simulated seconds per step.
    pub step_time: f64,
    /// Render/data extraction interval in simulated seconds.
    pub sample_time: f64,
    /// World offset on x and y.
    pub offset: [f64; 2],
    /// Collision handling mode.
    pub collision_mode: String,
    /// Map asset the scenario runs on.
    pub obstacle_map: String,
}

/// One robot entry in the scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRobot {
    /// Kinematics block (`diff` for differential drive).
    pub kinematics: ScenarioName,
    /// Shape block (circle with body radius).
    pub shape: ScenarioShape,
    /// Start state `[x, y, theta]`.
    pub state: [f64; 3],
    /// Goal states `[x, y, theta]`, in visit order.
    pub goal: Vec<[f64; 3]>,
    /// Behavior block (`dash` moves directly toward the goal).
    pub behavior: ScenarioName,
    /// Display color as a hex string.
    pub color: String,
}

/// One goal marker entry in the scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioObstacle {
    /// Shape block (small circle).
    pub shape: ScenarioShape,
    /// Marker state `[x, y, theta]`.
    pub state: [f64; 3],
}

/// A named block (`{name: ...}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioName {
    /// The block name.
    pub name: String,
}

/// A circular shape block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioShape {
    /// The shape name.
    pub name: String,
    /// The radius in metres.
    pub radius: f64,
}

/// Goal marker radius in metres.
const GOAL_MARKER_RADIUS: f64 = 0.1;

impl ScenarioFile {
    /// Build the scenario document for a session.
    pub fn from_config(config: &SessionConfig) -> Self {
        let world = ScenarioWorld {
            height: config.frame.height_metres(),
            width: config.frame.width_metres(),
            step_time: config.step_time,
            sample_time: config.step_time,
            offset: [0.0, 0.0],
            collision_mode: String::from("stop"),
            obstacle_map: config.map_name.clone(),
        };

        let goal_states: Vec<[f64; 3]> =
            config.goals.iter().map(|g| [g.x, g.y, 0.0]).collect();

        let robot = config
            .spawn_robots()
            .iter()
            .map(|r| ScenarioRobot {
                kinematics: ScenarioName {
                    name: String::from("diff"),
                },
                shape: ScenarioShape {
                    name: String::from("circle"),
                    radius: r.params.radius,
                },
                state: [r.position.x, r.position.y, r.heading],
                goal: goal_states.clone(),
                behavior: ScenarioName {
                    name: String::from("dash"),
                },
                color: hex_color(r.color),
            })
            .collect();

        let obstacle = config
            .goals
            .iter()
            .map(|g| ScenarioObstacle {
                shape: ScenarioShape {
                    name: String::from("circle"),
                    radius: GOAL_MARKER_RADIUS,
                },
                state: [g.x, g.y, 0.0],
            })
            .collect();

        Self {
            world,
            robot,
            obstacle,
        }
    }

    /// Serialize and write the scenario to the given path, creating
    /// parent directories and replacing any previous scenario.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] on filesystem failures and
    /// [`ConfigError::Yaml`] if serialization fails.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yml::to_string(self)?;
        std::fs::write(path, yaml)?;
        info!(
            path = %path.display(),
            robots = self.robot.len(),
            goals = self.obstacle.len(),
            "scenario written"
        );
        Ok(())
    }
}

/// Format an RGB triple as `#rrggbb`.
fn hex_color(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    5000
}

fn default_maps_dir() -> PathBuf {
    PathBuf::from("maps")
}

fn default_scenario_path() -> PathBuf {
    PathBuf::from("config/scenario.yaml")
}

const fn default_pacing_interval_ms() -> u64 {
    50
}

const fn default_step_ceiling() -> u64 {
    1000
}

const fn default_max_robots() -> u32 {
    10
}

const fn default_max_goals() -> usize {
    16
}

const fn default_width_px() -> u32 {
    800
}

const fn default_height_px() -> u32 {
    600
}

const fn default_px_per_metre() -> f64 {
    100.0
}

const fn default_step_time_s() -> f64 {
    0.1
}

const fn default_robot_count() -> u32 {
    1
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request() -> SessionRequest {
        SessionRequest {
            map_name: String::from("warehouse.png"),
            robot_count: 2,
            robot_position: PixelPoint { x: 100.0, y: 500.0 },
            goals: vec![
                PixelPoint { x: 700.0, y: 100.0 },
                PixelPoint { x: 400.0, y: 300.0 },
            ],
        }
    }

    #[test]
    fn defaults_match_reference_deployment() {
        let config = RoverConfig::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.session.pacing_interval_ms, 50);
        assert_eq!(config.session.step_ceiling, 1000);
        assert_eq!(config.world.width_px, 800);
        assert_eq!(config.world.height_px, 600);
    }

    #[test]
    fn parse_overrides_selected_fields() {
        let config = RoverConfig::parse(
            "server:\n  port: 8080\nsession:\n  step_ceiling: 100\n",
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.session.step_ceiling, 100);
        // Untouched sections keep their defaults.
        assert!((config.world.px_per_metre - 100.0).abs() < 1e-9);
    }

    #[test]
    fn parse_rejects_invalid_yaml() {
        assert!(RoverConfig::parse("server: [not a map").is_err());
    }

    #[test]
    fn build_converts_to_world_coordinates() {
        let session = SessionConfig::build(request(), &RoverConfig::default()).unwrap();
        // (100, 500) px on a 600 px tall map at 100 px/m -> (1.0, 1.0) m.
        assert!((session.start.x - 1.0).abs() < 1e-9);
        assert!((session.start.y - 1.0).abs() < 1e-9);
        // First goal (700, 100) -> (7.0, 5.0) m.
        let goal = session.goals.first().copied().unwrap();
        assert!((goal.x - 7.0).abs() < 1e-9);
        assert!((goal.y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn build_rejects_zero_robots() {
        let mut req = request();
        req.robot_count = 0;
        let err = SessionConfig::build(req, &RoverConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::RobotCountOutOfRange { .. }));
    }

    #[test]
    fn build_rejects_excessive_robots() {
        let mut req = request();
        req.robot_count = 99;
        let err = SessionConfig::build(req, &RoverConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::RobotCountOutOfRange { .. }));
    }

    #[test]
    fn build_rejects_out_of_bounds_start() {
        let mut req = request();
        req.robot_position = PixelPoint { x: 900.0, y: 100.0 };
        let err = SessionConfig::build(req, &RoverConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::CoordinateOutOfBounds { .. }));
    }

    #[test]
    fn build_rejects_non_finite_goal() {
        let mut req = request();
        req.goals = vec![PixelPoint {
            x: f64::NAN,
            y: 10.0,
        }];
        let err = SessionConfig::build(req, &RoverConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::NonFiniteCoordinate { .. }));
    }

    #[test]
    fn build_rejects_too_many_goals() {
        let mut req = request();
        req.goals = vec![PixelPoint { x: 10.0, y: 10.0 }; 17];
        let err = SessionConfig::build(req, &RoverConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::TooManyGoals { .. }));
    }

    #[test]
    fn spawned_robots_are_offset_and_colored() {
        let session = SessionConfig::build(request(), &RoverConfig::default()).unwrap();
        let robots = session.spawn_robots();
        assert_eq!(robots.len(), 2);
        let first = robots.first().unwrap();
        let second = robots.get(1).unwrap();
        assert!(second.position.x > first.position.x);
        assert_ne!(first.color, second.color);
    }

    #[test]
    fn scenario_file_mirrors_session() {
        let session = SessionConfig::build(request(), &RoverConfig::default()).unwrap();
        let scenario = ScenarioFile::from_config(&session);
        assert_eq!(scenario.world.obstacle_map, "warehouse.png");
        assert!((scenario.world.width - 8.0).abs() < 1e-9);
        assert!((scenario.world.height - 6.0).abs() < 1e-9);
        assert_eq!(scenario.robot.len(), 2);
        assert_eq!(scenario.obstacle.len(), 2);
        let robot = scenario.robot.first().unwrap();
        assert_eq!(robot.kinematics.name, "diff");
        assert_eq!(robot.behavior.name, "dash");
        assert_eq!(robot.goal.len(), 2);
        assert_eq!(robot.color, "#00d9ff");
    }

    #[test]
    fn scenario_yaml_round_trips() {
        let session = SessionConfig::build(request(), &RoverConfig::default()).unwrap();
        let scenario = ScenarioFile::from_config(&session);
        let yaml = serde_yml::to_string(&scenario).unwrap();
        let parsed: ScenarioFile = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed.robot.len(), scenario.robot.len());
        assert_eq!(parsed.world.collision_mode, "stop");
    }

    #[test]
    fn scenario_save_writes_file() {
        let session = SessionConfig::build(request(), &RoverConfig::default()).unwrap();
        let scenario = ScenarioFile::from_config(&session);
        let path = std::env::temp_dir()
            .join("rover-config-test")
            .join("scenario.yaml");
        scenario.save(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("obstacle_map: warehouse.png"));
    }
}
