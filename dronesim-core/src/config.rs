//! Tunable parameters for the simulator.
//!
//! Every section deserializes with `#[serde(default)]`, so a JSON document
//! only needs the values it overrides.

use crate::camera::CameraConfig;
use crate::mesh::TerrainPlacement;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// What happens to the tilt when a step is vetoed by the terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VetoPolicy {
    /// Attitude goes back to exactly what it was before the call.
    #[default]
    Restore,
    /// Keep the heading, drop pitch and roll.
    Level,
}

/// Drone flight model parameters. Angles are radians, speeds world units/second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    pub initial_position: Vec3,
    /// Camera position relative to the drone at spawn.
    pub camera_offset: Vec3,
    pub drone_scale: f32,

    pub fan_min_speed: f32,
    pub fan_max_speed: f32,
    pub fan_acceleration_rate: f32,
    pub fan_deceleration_rate: f32,
    pub min_fan_speed_to_move: f32,

    pub drone_max_speed: f32,
    pub drone_acceleration_rate: f32,
    pub drone_deceleration_rate: f32,

    pub inclination_speed: f32,
    pub leveling_speed: f32,
    pub max_inclination: f32,
    pub rotation_speed: f32,

    pub min_distance_to_terrain: f32,
    /// Point on the drone mesh, in model space, measured against the terrain.
    pub clearance_probe: Vec3,
    pub veto_policy: VetoPolicy,

    /// Rotor hub positions relative to the drone origin, already in world scale.
    pub fan_offsets: [Vec3; 4],
}

impl Default for FlightConfig {
    fn default() -> Self {
        let inclination_speed = 45f32.to_radians();
        Self {
            initial_position: Vec3::new(40.0, 5.0, -5.0),
            camera_offset: Vec3::new(0.0, 1.6, 3.0),
            drone_scale: 0.015,

            fan_min_speed: 10.0,
            fan_max_speed: 30.0,
            fan_acceleration_rate: 0.5,
            fan_deceleration_rate: 0.5,
            min_fan_speed_to_move: 18.0,

            drone_max_speed: 15.0,
            drone_acceleration_rate: 0.5,
            drone_deceleration_rate: 0.1,

            inclination_speed,
            leveling_speed: 2.0 * inclination_speed,
            max_inclination: 15f32.to_radians(),
            rotation_speed: 60f32.to_radians(),

            min_distance_to_terrain: 0.7,
            clearance_probe: Vec3::new(0.0, -10.0, 0.0),
            veto_policy: VetoPolicy::Restore,

            fan_offsets: [
                Vec3::new(0.54, 0.26, -0.4),
                Vec3::new(-0.54, 0.26, -0.4),
                Vec3::new(-0.54, 0.11, 0.4),
                Vec3::new(0.54, 0.11, 0.4),
            ],
        }
    }
}

impl FlightConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fan_min_speed > self.fan_max_speed {
            return Err(invalid(format!(
                "fan_min_speed {} exceeds fan_max_speed {}",
                self.fan_min_speed, self.fan_max_speed
            )));
        }

        let non_negative = [
            ("fan_acceleration_rate", self.fan_acceleration_rate),
            ("fan_deceleration_rate", self.fan_deceleration_rate),
            ("min_fan_speed_to_move", self.min_fan_speed_to_move),
            ("drone_max_speed", self.drone_max_speed),
            ("drone_acceleration_rate", self.drone_acceleration_rate),
            ("drone_deceleration_rate", self.drone_deceleration_rate),
            ("inclination_speed", self.inclination_speed),
            ("leveling_speed", self.leveling_speed),
            ("max_inclination", self.max_inclination),
            ("rotation_speed", self.rotation_speed),
        ];
        if let Some((name, value)) = non_negative
            .iter()
            .find(|(_, value)| !value.is_finite() || *value < 0.0)
        {
            return Err(invalid(format!("{name} must be a non-negative number, got {value}")));
        }

        if self.drone_scale <= 0.0 {
            return Err(invalid("drone_scale must be positive"));
        }

        Ok(())
    }
}

/// Terrain placement and nearest-vertex search parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub placement: TerrainPlacement,
    /// Max x/z difference for a vertex to count as under the query point.
    pub vertex_offset: f32,
    pub search_window: usize,
    /// OBJ asset to load; procedural terrain is generated when absent.
    pub mesh_path: Option<String>,
    pub seed: u64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            placement: TerrainPlacement::default(),
            vertex_offset: 0.8,
            search_window: 3000,
            mesh_path: None,
            seed: 42,
        }
    }
}

impl TerrainConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vertex_offset <= 0.0 {
            return Err(invalid("vertex_offset must be positive"));
        }
        if self.search_window == 0 {
            return Err(invalid("search_window must be at least 1"));
        }
        if self.placement.scale <= 0.0 {
            return Err(invalid("terrain scale must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub flight: FlightConfig,
    pub terrain: TerrainConfig,
    pub camera: CameraConfig,
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.flight.validate()?;
        self.terrain.validate()?;
        self.camera.validate()
    }
}

pub(crate) fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        SimConfig::default().validate().unwrap();
    }

    #[test]
    fn leveling_is_twice_inclination_by_default() {
        let flight = FlightConfig::default();
        assert_eq!(flight.leveling_speed, 2.0 * flight.inclination_speed);
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let config = SimConfig::from_json_str(
            r#"{ "flight": { "drone_max_speed": 4.0 }, "terrain": { "seed": 7 } }"#,
        )
        .unwrap();

        assert_eq!(config.flight.drone_max_speed, 4.0);
        assert_eq!(
            config.flight.fan_max_speed,
            FlightConfig::default().fan_max_speed
        );
        assert_eq!(config.terrain.seed, 7);
        assert_eq!(config.terrain.search_window, 3000);
    }

    #[test]
    fn json_round_trip() {
        let mut config = SimConfig::default();
        config.flight.veto_policy = VetoPolicy::Level;
        config.terrain.mesh_path = Some("assets/terrain.obj".to_string());

        let json = config.to_json_pretty().unwrap();
        assert!(json.contains("\"level\""));
        assert_eq!(SimConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn rejects_inverted_fan_bounds() {
        let err = SimConfig::from_json_str(
            r#"{ "flight": { "fan_min_speed": 40.0, "fan_max_speed": 30.0 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_negative_rates() {
        let mut flight = FlightConfig::default();
        flight.drone_deceleration_rate = -0.1;
        let err = flight.validate().unwrap_err();
        assert!(err.to_string().contains("drone_deceleration_rate"));
    }

    #[test]
    fn rejects_empty_search_window() {
        let mut terrain = TerrainConfig::default();
        terrain.search_window = 0;
        assert!(terrain.validate().is_err());
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = SimConfig::from_json_str("{ flight: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dronesim.json");
        std::fs::write(&path, r#"{ "camera": { "far": 80.0 } }"#).unwrap();

        let config = SimConfig::load(&path).unwrap();
        assert_eq!(config.camera.far, 80.0);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SimConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
