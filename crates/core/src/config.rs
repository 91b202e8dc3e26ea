//! Tunable constants of the particle field.
//!
//! [`FieldConfig::default`] reproduces the landing-page look. Hosts may
//! override any subset from JSON with [`FieldConfig::from_json`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BackdropError;
use crate::params::{param_f64, param_string, param_usize};

/// Canvas area (px²) per particle.
const DEFAULT_DENSITY_DIVISOR: f64 = 10_000.0;
/// Every n-th particle (by creation index) is forced to a hexagon.
const DEFAULT_HEXAGON_EVERY: usize = 5;
const DEFAULT_SIZE_MIN: f64 = 8.0;
const DEFAULT_SIZE_MAX: f64 = 18.0;
const DEFAULT_MAX_SPEED: f64 = 1.0;
const DEFAULT_MAX_SPIN: f64 = 0.1;
/// Upper bound of the initial angle; a hair under 2π.
const DEFAULT_ANGLE_MAX: f64 = 6.2;
const DEFAULT_OPACITY_MIN: f64 = 0.1;
const DEFAULT_OPACITY_MAX: f64 = 0.6;
const DEFAULT_WOBBLE: f64 = 0.5;
const DEFAULT_REPULSION_RADIUS: f64 = 150.0;
const DEFAULT_REPULSION_STRENGTH: f64 = 5.0;
const DEFAULT_WRAP_MARGIN: f64 = 20.0;
/// Links form below `(w / n) * (h / n)` squared distance.
const DEFAULT_LINK_DIVISOR: f64 = 7.0;
/// Squared distance at which link opacity reaches zero.
const DEFAULT_LINK_FALLOFF: f64 = 20_000.0;
const DEFAULT_LINK_ALPHA: f64 = 0.2;
const DEFAULT_LINE_WIDTH: f64 = 1.0;
/// Glyph font size is the particle size plus this padding.
const DEFAULT_GLYPH_PADDING: f64 = 4.0;
const DEFAULT_FONT_FAMILY: &str = "monospace";
const DEFAULT_SETTLE_DELAY_MS: f64 = 100.0;

/// How particles react when the accent color changes after spawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccentPolicy {
    /// Particles keep the accent they were spawned with until the next rebuild.
    #[default]
    Snapshot,
    /// Particles are recolored whenever the accent changes.
    Follow,
}

impl AccentPolicy {
    pub fn from_name(name: &str) -> Result<Self, BackdropError> {
        match name {
            "snapshot" => Ok(AccentPolicy::Snapshot),
            "follow" => Ok(AccentPolicy::Follow),
            other => Err(BackdropError::InvalidConfig(format!(
                "accent_policy must be \"snapshot\" or \"follow\", got {other:?}"
            ))),
        }
    }
}

/// Field tuning parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub density_divisor: f64,
    pub hexagon_every: usize,
    pub size_min: f64,
    pub size_max: f64,
    pub max_speed: f64,
    pub max_spin: f64,
    pub angle_max: f64,
    pub opacity_min: f64,
    pub opacity_max: f64,
    pub wobble: f64,
    pub repulsion_radius: f64,
    pub repulsion_strength: f64,
    pub wrap_margin: f64,
    pub link_divisor: f64,
    pub link_falloff: f64,
    pub link_alpha: f64,
    pub line_width: f64,
    pub glyph_padding: f64,
    pub font_family: String,
    pub settle_delay_ms: f64,
    pub accent_policy: AccentPolicy,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            density_divisor: DEFAULT_DENSITY_DIVISOR,
            hexagon_every: DEFAULT_HEXAGON_EVERY,
            size_min: DEFAULT_SIZE_MIN,
            size_max: DEFAULT_SIZE_MAX,
            max_speed: DEFAULT_MAX_SPEED,
            max_spin: DEFAULT_MAX_SPIN,
            angle_max: DEFAULT_ANGLE_MAX,
            opacity_min: DEFAULT_OPACITY_MIN,
            opacity_max: DEFAULT_OPACITY_MAX,
            wobble: DEFAULT_WOBBLE,
            repulsion_radius: DEFAULT_REPULSION_RADIUS,
            repulsion_strength: DEFAULT_REPULSION_STRENGTH,
            wrap_margin: DEFAULT_WRAP_MARGIN,
            link_divisor: DEFAULT_LINK_DIVISOR,
            link_falloff: DEFAULT_LINK_FALLOFF,
            link_alpha: DEFAULT_LINK_ALPHA,
            line_width: DEFAULT_LINE_WIDTH,
            glyph_padding: DEFAULT_GLYPH_PADDING,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            accent_policy: AccentPolicy::Snapshot,
        }
    }
}

impl FieldConfig {
    /// Builds a config from a JSON object, defaulting every missing key.
    ///
    /// The result is validated before it is returned.
    pub fn from_json(params: &Value) -> Result<Self, BackdropError> {
        let d = Self::default();
        let config = Self {
            density_divisor: param_f64(params, "density_divisor", d.density_divisor)?,
            hexagon_every: param_usize(params, "hexagon_every", d.hexagon_every)?,
            size_min: param_f64(params, "size_min", d.size_min)?,
            size_max: param_f64(params, "size_max", d.size_max)?,
            max_speed: param_f64(params, "max_speed", d.max_speed)?,
            max_spin: param_f64(params, "max_spin", d.max_spin)?,
            angle_max: param_f64(params, "angle_max", d.angle_max)?,
            opacity_min: param_f64(params, "opacity_min", d.opacity_min)?,
            opacity_max: param_f64(params, "opacity_max", d.opacity_max)?,
            wobble: param_f64(params, "wobble", d.wobble)?,
            repulsion_radius: param_f64(params, "repulsion_radius", d.repulsion_radius)?,
            repulsion_strength: param_f64(params, "repulsion_strength", d.repulsion_strength)?,
            wrap_margin: param_f64(params, "wrap_margin", d.wrap_margin)?,
            link_divisor: param_f64(params, "link_divisor", d.link_divisor)?,
            link_falloff: param_f64(params, "link_falloff", d.link_falloff)?,
            link_alpha: param_f64(params, "link_alpha", d.link_alpha)?,
            line_width: param_f64(params, "line_width", d.line_width)?,
            glyph_padding: param_f64(params, "glyph_padding", d.glyph_padding)?,
            font_family: param_string(params, "font_family", &d.font_family)?,
            settle_delay_ms: param_f64(params, "settle_delay_ms", d.settle_delay_ms)?,
            accent_policy: AccentPolicy::from_name(&param_string(
                params,
                "accent_policy",
                "snapshot",
            )?)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks ranges that the simulation relies on.
    pub fn validate(&self) -> Result<(), BackdropError> {
        let positive = [
            ("density_divisor", self.density_divisor),
            ("link_divisor", self.link_divisor),
            ("link_falloff", self.link_falloff),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(BackdropError::InvalidConfig(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        let non_negative = [
            ("max_speed", self.max_speed),
            ("max_spin", self.max_spin),
            ("angle_max", self.angle_max),
            ("wobble", self.wobble),
            ("repulsion_radius", self.repulsion_radius),
            ("repulsion_strength", self.repulsion_strength),
            ("wrap_margin", self.wrap_margin),
            ("link_alpha", self.link_alpha),
            ("line_width", self.line_width),
            ("glyph_padding", self.glyph_padding),
            ("settle_delay_ms", self.settle_delay_ms),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(BackdropError::InvalidConfig(format!(
                    "{name} must be non-negative and finite, got {value}"
                )));
            }
        }
        if !(self.size_min > 0.0 && self.size_min < self.size_max) {
            return Err(BackdropError::InvalidConfig(format!(
                "size range [{}, {}) must be positive and non-empty",
                self.size_min, self.size_max
            )));
        }
        if !(0.0..=1.0).contains(&self.opacity_min)
            || !(0.0..=1.0).contains(&self.opacity_max)
            || self.opacity_min >= self.opacity_max
        {
            return Err(BackdropError::InvalidConfig(format!(
                "opacity range [{}, {}) must lie in [0, 1] and be non-empty",
                self.opacity_min, self.opacity_max
            )));
        }
        if self.font_family.trim().is_empty() {
            return Err(BackdropError::InvalidConfig(
                "font_family must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
