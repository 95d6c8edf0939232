//! Effect configuration: defaults, partial overrides and validation.

use serde::{Deserialize, Serialize};

use crate::{color::Rgb, error::ConfigError, range::Range};

/// Direction particles travel across the surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Fall from the top edge to the bottom edge.
    #[default]
    Down,
    /// Rise from the bottom edge to the top edge.
    Up,
}

impl Direction {
    /// Vertical sign applied to speed: `+1` for down, `-1` for up.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Down => 1.0,
            Direction::Up => -1.0,
        }
    }

    /// Return the opposite direction.
    pub fn toggle(self) -> Self {
        match self {
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Down => "down",
            Direction::Up => "up",
        }
    }
}

/// How the particle path is filled each frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMode {
    /// One path, one fill. Global alpha ends up as the last particle's opacity.
    #[default]
    Batched,
    /// One fill per particle so every particle keeps its own opacity.
    PerParticle,
}

impl FillMode {
    pub fn toggle(self) -> Self {
        match self {
            FillMode::Batched => FillMode::PerParticle,
            FillMode::PerParticle => FillMode::Batched,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FillMode::Batched => "batched",
            FillMode::PerParticle => "per particle",
        }
    }
}

/// Fully resolved configuration of one snowfall effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectConfig {
    /// Fill color for every particle in a pass.
    pub color: Rgb,
    /// Per-particle fixed radius range, in surface pixels.
    pub radius: Range,
    /// Vertical speed range, pixels per nominal frame.
    pub speed: Range,
    /// Horizontal velocity range, pixels per nominal frame.
    pub wind: Range,
    /// Frames between velocity retargets.
    pub change_frequency: u32,
    /// Angular velocity range, degrees per frame.
    pub rotation_speed: Range,
    /// Per-particle alpha range.
    pub opacity: Range,
    /// Target population size.
    pub snowflake_count: usize,
    pub direction: Direction,
    pub fill_mode: FillMode,
    /// Layering hint for the host: positive values paint above host content.
    pub z_index: i32,
    /// Host region the surface attaches to.
    pub anchor_id: Option<String>,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            color: Rgb::new(0xde, 0xe4, 0xfd),
            radius: Range::new(0.5, 1.6),
            speed: Range::new(0.5, 2.0),
            wind: Range::new(-0.5, 4.0),
            change_frequency: 250,
            rotation_speed: Range::new(-1.0, 1.0),
            opacity: Range::fixed(1.0),
            snowflake_count: 250,
            direction: Direction::Down,
            fill_mode: FillMode::Batched,
            z_index: 99999,
            anchor_id: None,
        }
    }
}

impl EffectConfig {
    /// Shallow-merge `overrides` on top of this config, returning the result.
    pub fn merge(&self, overrides: &ConfigOverrides) -> Self {
        Self {
            color: overrides.color.unwrap_or(self.color),
            radius: overrides.radius.unwrap_or(self.radius),
            speed: overrides.speed.unwrap_or(self.speed),
            wind: overrides.wind.unwrap_or(self.wind),
            change_frequency: overrides.change_frequency.unwrap_or(self.change_frequency),
            rotation_speed: overrides.rotation_speed.unwrap_or(self.rotation_speed),
            opacity: overrides.opacity.unwrap_or(self.opacity),
            snowflake_count: overrides.snowflake_count.unwrap_or(self.snowflake_count),
            direction: overrides.direction.unwrap_or(self.direction),
            fill_mode: overrides.fill_mode.unwrap_or(self.fill_mode),
            z_index: overrides.z_index.unwrap_or(self.z_index),
            anchor_id: overrides
                .anchor_id
                .clone()
                .or_else(|| self.anchor_id.clone()),
        }
    }

    /// Reject ranges and counts that would make sampling meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.radius.validate_non_negative("radius")?;
        self.speed.validate("speed")?;
        self.wind.validate("wind")?;
        self.rotation_speed.validate("rotation_speed")?;
        self.opacity.validate_non_negative("opacity")?;
        if self.change_frequency == 0 {
            return Err(ConfigError::invalid(
                "change_frequency",
                "must be a positive number of frames",
            ));
        }
        Ok(())
    }

    /// Whether the effect should paint above host content.
    pub fn paints_above(&self) -> bool {
        self.z_index > 0
    }
}

/// Caller-supplied partial configuration. Unset fields keep their current value.
///
/// Keys also accept the camelCase spelling used by the browser API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind: Option<Range>,
    #[serde(alias = "changeFrequency", skip_serializing_if = "Option::is_none")]
    pub change_frequency: Option<u32>,
    #[serde(alias = "rotationSpeed", skip_serializing_if = "Option::is_none")]
    pub rotation_speed: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<Range>,
    #[serde(alias = "snowflakeCount", skip_serializing_if = "Option::is_none")]
    pub snowflake_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(alias = "fillMode", skip_serializing_if = "Option::is_none")]
    pub fill_mode: Option<FillMode>,
    #[serde(alias = "zIndex", skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    #[serde(alias = "anchorId", skip_serializing_if = "Option::is_none")]
    pub anchor_id: Option<String>,
}

impl ConfigOverrides {
    /// Overrides that only change the population size.
    pub fn count(snowflake_count: usize) -> Self {
        Self {
            snowflake_count: Some(snowflake_count),
            ..Default::default()
        }
    }

    /// Layer `other` on top of `self`; fields set in `other` win.
    pub fn overlay(self, other: ConfigOverrides) -> Self {
        Self {
            color: other.color.or(self.color),
            radius: other.radius.or(self.radius),
            speed: other.speed.or(self.speed),
            wind: other.wind.or(self.wind),
            change_frequency: other.change_frequency.or(self.change_frequency),
            rotation_speed: other.rotation_speed.or(self.rotation_speed),
            opacity: other.opacity.or(self.opacity),
            snowflake_count: other.snowflake_count.or(self.snowflake_count),
            direction: other.direction.or(self.direction),
            fill_mode: other.fill_mode.or(self.fill_mode),
            z_index: other.z_index.or(self.z_index),
            anchor_id: other.anchor_id.or(self.anchor_id),
        }
    }

    /// Capture every field of `config` as an explicit override.
    pub fn from_config(config: &EffectConfig) -> Self {
        Self {
            color: Some(config.color),
            radius: Some(config.radius),
            speed: Some(config.speed),
            wind: Some(config.wind),
            change_frequency: Some(config.change_frequency),
            rotation_speed: Some(config.rotation_speed),
            opacity: Some(config.opacity),
            snowflake_count: Some(config.snowflake_count),
            direction: Some(config.direction),
            fill_mode: Some(config.fill_mode),
            z_index: Some(config.z_index),
            anchor_id: config.anchor_id.clone(),
        }
    }
}
