//! TOML configuration for headless sessions.

use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use dice_defence_core::SessionConfig;
use serde::Deserialize;

/// Settings read from a configuration file.
///
/// Session keys live at the top level; autopilot settings live in an
/// `[autopilot]` table. Missing keys fall back to their defaults.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct CliConfig {
    #[serde(flatten)]
    pub(crate) session: SessionConfig,
    pub(crate) autopilot: AutopilotConfig,
}

/// Controls how the headless driver plays a session.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct AutopilotConfig {
    /// Simulated milliseconds per battle tick.
    pub(crate) frame_ms: u64,
    /// Hard cap on the number of commands issued.
    pub(crate) max_steps: usize,
    /// Stop after this many waves were cleared.
    pub(crate) max_waves: Option<u32>,
    /// Preferred index when a weapon choice is offered.
    pub(crate) choice: usize,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            frame_ms: 50,
            max_steps: 200_000,
            max_waves: None,
            choice: 0,
        }
    }
}

impl AutopilotConfig {
    pub(crate) fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }
}

/// Loads the configuration at `path`, or the defaults when no path is given.
pub(crate) fn load(path: Option<&Path>) -> Result<CliConfig> {
    let Some(path) = path else {
        return Ok(CliConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid configuration in {}", path.display()))
}

/// Parses and validates configuration file contents.
pub(crate) fn parse(contents: &str) -> Result<CliConfig> {
    let config: CliConfig =
        toml::from_str(contents).context("failed to parse configuration toml contents")?;
    validate(&config)?;
    Ok(config)
}

/// Rejects settings that would leave the session unable to progress.
pub(crate) fn validate(config: &CliConfig) -> Result<()> {
    let session = &config.session;
    if session.board_size == 0 {
        bail!("board_size must be at least 1");
    }
    if session.layout.columns == 0 {
        bail!("layout.columns must be at least 1");
    }
    if session.waves.is_empty() {
        bail!("the wave table must contain at least one wave");
    }
    for weapon in &session.weapons {
        if !weapon.range.is_finite() || weapon.range < 0.0 {
            bail!("weapon `{}` has an invalid range {}", weapon.name, weapon.range);
        }
    }
    let tuning = &session.enemy_tuning;
    for (name, value) in [
        ("speed_scale", tuning.speed_scale),
        ("damage_scale", tuning.damage_scale),
        ("attack_interval_multiplier", tuning.attack_interval_multiplier),
    ] {
        if !value.is_finite() || value < 0.0 {
            bail!("enemy_tuning.{name} must be a non-negative number, found {value}");
        }
    }
    if config.autopilot.frame_ms == 0 {
        bail!("autopilot.frame_ms must be at least 1");
    }
    Ok(())
}
