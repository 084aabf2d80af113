//! Headless driver that plays a session without player input.

use anyhow::{Context, Result};
use dice_defence_core::{Command, Event, Phase};
use dice_defence_world::{self as world, query, World};
use tracing::{debug, info};

use crate::config::AutopilotConfig;

/// Why the autopilot stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// The base fell during the given wave.
    BaseDestroyed { wave: u32 },
    /// The configured number of waves was cleared.
    WaveLimit,
    /// The step budget ran out first.
    StepLimit,
}

/// Final tallies of an autopiloted session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) outcome: Outcome,
    pub(crate) steps: usize,
    pub(crate) rolls: u32,
    pub(crate) waves_cleared: u32,
    pub(crate) enemies_defeated: u32,
    pub(crate) weapons_placed: usize,
    pub(crate) base_health: u32,
}

fn next_command(world: &World, settings: &AutopilotConfig) -> Command {
    match query::phase(world) {
        Phase::Explore if query::dice_left(world) > 0 => Command::Roll,
        Phase::ChoosingReward => {
            let available = query::pending_reward(world).map_or(0, |reward| reward.options().len());
            Command::ChooseWeapon {
                index: settings.choice.min(available.saturating_sub(1)),
            }
        }
        _ => Command::Tick {
            dt: settings.frame(),
        },
    }
}

/// Drives `world` until the base falls or a configured limit is reached.
pub(crate) fn run(world: &mut World, settings: &AutopilotConfig) -> Result<Summary> {
    let mut events = Vec::new();
    let mut rolls = 0;
    let mut waves_cleared = 0;
    let mut enemies_defeated = 0;
    let mut outcome = Outcome::StepLimit;
    let mut steps = 0;

    while steps < settings.max_steps {
        let command = next_command(world, settings);
        steps += 1;
        events.clear();
        world::apply(world, command.clone(), &mut events)
            .with_context(|| format!("autopilot command {command:?} rejected at step {steps}"))?;

        for event in &events {
            match event {
                Event::Rolled { value, dice_left } => {
                    rolls += 1;
                    debug!(value, dice_left, "rolled");
                }
                Event::TileResolved { message, .. } => debug!(text = %message, "tile resolved"),
                Event::EnemyDefeated { enemy } => {
                    enemies_defeated += 1;
                    debug!(enemy = enemy.get(), "enemy defeated");
                }
                Event::WaveCleared { .. } => waves_cleared += 1,
                Event::GameOver { wave } => outcome = Outcome::BaseDestroyed { wave: *wave },
                _ => {}
            }
        }

        if matches!(outcome, Outcome::BaseDestroyed { .. }) {
            break;
        }
        if settings
            .max_waves
            .is_some_and(|limit| waves_cleared >= limit)
        {
            outcome = Outcome::WaveLimit;
            break;
        }
    }

    let summary = Summary {
        outcome,
        steps,
        rolls,
        waves_cleared,
        enemies_defeated,
        weapons_placed: query::weapon_view(world).len(),
        base_health: query::base_health(world),
    };
    info!(
        outcome = ?summary.outcome,
        steps,
        waves_cleared,
        enemies_defeated,
        "autopilot finished"
    );
    Ok(summary)
}
