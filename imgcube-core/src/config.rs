/// Runtime configuration loaded from TOML
use crate::animator::StepSchedule;
use crate::error::{Error, Result};
use crate::matrix::Mat4;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Initial viewer orientation of the assembly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Screen position of the assembly centre, in pixels
    pub origin: [f64; 2],
    /// Tilt about X, degrees
    pub pitch: f64,
    /// Turn about Y, degrees
    pub yaw: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            origin: [200.0, 150.0],
            pitch: -25.0,
            yaw: -35.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Edge length of one piece, in pixels
    pub cell_size: f64,
    /// Turns in a default shuffle
    pub shuffle_moves: usize,
    /// Idle frames between consecutive turns of a sequence
    pub pause_ticks: u32,
    /// Fraction of each step the whole assembly turns back by
    pub ambient_ratio: f64,
    /// Fixed shuffle seed; entropy when absent
    pub seed: Option<u64>,
    pub view: ViewConfig,
    pub schedule: StepSchedule,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cell_size: 90.0,
            shuffle_moves: 100,
            pause_ticks: 15,
            ambient_ratio: 0.2,
            seed: None,
            view: ViewConfig::default(),
            schedule: StepSchedule::default(),
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Fails when a value has no TOML form, such as a seed above `i64::MAX`
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(Error::Config(format!(
                "cell_size must be positive, got {}",
                self.cell_size
            )));
        }
        if !self.ambient_ratio.is_finite() {
            return Err(Error::Config("ambient_ratio must be finite".to_string()));
        }
        let view = &self.view;
        if !(view.origin.iter().all(|v| v.is_finite()) && view.pitch.is_finite() && view.yaw.is_finite()) {
            return Err(Error::Config("view values must be finite".to_string()));
        }
        self.schedule.validate()
    }

    /// World transform for the configured view
    pub fn world_transform(&self) -> Mat4 {
        let half = self.cell_size / 2.0;
        Mat4::identity()
            .translate(self.view.origin[0] - half, self.view.origin[1] - half, 0.0)
            .rotate_x(self.view.pitch)
            .rotate_y(self.view.yaw)
    }
}
