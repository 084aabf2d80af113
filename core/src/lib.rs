#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Dice Defence simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative session world, and the pure gameplay systems. Adapters submit
//! [`Command`] values describing player intent, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing what changed. Systems operate on the data types declared here and
//! never touch presentation concerns.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod board;
mod config;
mod random;
mod seconds;
mod stats;

pub use board::{Board, BoardLayout, Tile, TileKind, MAX_TILE_LEVEL};
pub use config::{default_waves, default_weapon_catalog, EnemyTuning, SessionConfig, WaveDefinition};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use stats::{
    PlayerStats, MAX_SHOP_DISCOUNT, MAX_STAT_LEVEL, MIN_ATTACK, MIN_ATTACK_SPEED, MIN_PLAYER_HP,
};

/// Canonical line written to the session log when exploration begins.
pub const WELCOME_LINE: &str = "Exploration started: roll the die to advance.";

/// Describes the active gameplay phase of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// The player rolls dice and resolves tile events.
    Explore,
    /// Progress is suspended until the player picks one of the offered weapons.
    ChoosingReward,
    /// Enemies spawn and weapons fire every tick until the wave is cleared.
    Battle,
    /// The base fell. Terminal; every command is rejected.
    GameOver,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Explore => "Explore",
            Self::ChoosingReward => "ChoosingReward",
            Self::Battle => "Battle",
            Self::GameOver => "GameOver",
        };
        f.write_str(label)
    }
}

/// Commands that express all permissible session mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Consumes one die and advances the player along the board.
    Roll,
    /// Advances every active timer by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Resolves a pending weapon reward by picking one of the offered options.
    ChooseWeapon {
        /// Zero-based index into the offered options.
        index: usize,
    },
}

impl Command {
    /// Builds a [`Command::Tick`] from a frame delta expressed in seconds.
    ///
    /// Negative, NaN and infinite inputs collapse to a zero-length tick.
    /// Values too large for a [`Duration`] saturate at [`Duration::MAX`].
    #[must_use]
    pub fn tick_seconds(seconds: f32) -> Self {
        let dt = if seconds.is_finite() && seconds > 0.0 {
            Duration::try_from_secs_f32(seconds).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        };
        Self::Tick { dt }
    }
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A die was consumed and produced the reported face.
    Rolled {
        /// Face value between one and six.
        value: u8,
        /// Dice remaining in the current exploration segment.
        dice_left: u32,
    },
    /// The player token moved along the board.
    Moved {
        /// Cell occupied before the roll.
        from: usize,
        /// Cell occupied after clamping to the final tile.
        to: usize,
    },
    /// A tile effect was applied.
    TileResolved {
        /// Cell whose tile was resolved.
        cell: usize,
        /// Kind of the resolved tile.
        kind: TileKind,
        /// Tile level after resolution, for upgradeable tiles.
        level: Option<u8>,
        /// Human-readable description of the outcome.
        message: String,
    },
    /// Bonus dice were credited to the current exploration segment.
    DiceGranted {
        /// Number of dice added.
        amount: u32,
        /// Dice remaining after the grant.
        dice_left: u32,
    },
    /// The base recovered health from a tile effect.
    BaseHealed {
        /// Health restored.
        amount: u32,
        /// Base health after healing.
        health: u32,
    },
    /// A weapon choice is pending and the session is suspended.
    RewardOffered {
        /// Cell the chosen weapon will be bound to.
        cell: usize,
        /// Weapon definitions the player may choose from.
        options: Vec<WeaponDefinition>,
    },
    /// A weapon was bound to a board cell.
    WeaponPlaced {
        /// Cell the weapon occupies.
        cell: usize,
        /// Display name of the placed weapon.
        name: String,
        /// Whether an existing weapon on the cell was replaced.
        replaced: bool,
    },
    /// The session moved between phases.
    PhaseChanged {
        /// Phase before the transition.
        from: Phase,
        /// Phase after the transition.
        to: Phase,
    },
    /// A wave began spawning enemies.
    WaveStarted {
        /// One-based wave number.
        wave: u32,
        /// Enemy kind spawned by the wave.
        kind: EnemyKind,
        /// Total number of enemies the wave will spawn.
        spawn_count: u32,
    },
    /// An enemy entered the battlefield.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Kind of the spawned enemy.
        kind: EnemyKind,
        /// Cell the enemy marches toward.
        target_cell: usize,
    },
    /// An enemy reached its target cell and started attacking.
    EnemyArrived {
        /// Identifier of the arriving enemy.
        enemy: EnemyId,
        /// Cell the enemy now attacks.
        target_cell: usize,
    },
    /// A weapon fired at an enemy.
    WeaponFired {
        /// Cell holding the weapon.
        cell: usize,
        /// Enemy that was targeted.
        enemy: EnemyId,
        /// Damage rolled for the shot.
        damage: u32,
    },
    /// An enemy lost health but survived.
    EnemyDamaged {
        /// Identifier of the damaged enemy.
        enemy: EnemyId,
        /// Damage applied.
        damage: u32,
        /// Health remaining after the hit.
        remaining_hp: u32,
    },
    /// An enemy's health reached zero and it was removed.
    EnemyDefeated {
        /// Identifier of the removed enemy.
        enemy: EnemyId,
    },
    /// An enemy attack landed on the base.
    BaseHit {
        /// Cell the attacking enemy stands on.
        cell: usize,
        /// Damage dealt by the attack.
        damage: u32,
        /// Base health after the hit.
        remaining_health: u32,
    },
    /// Every enemy of the wave was spawned and defeated.
    WaveCleared {
        /// One-based number of the cleared wave.
        wave: u32,
    },
    /// The base fell and the session ended.
    GameOver {
        /// Wave during which the base fell.
        wave: u32,
    },
}

/// Reasons a command may be rejected. Rejections never mutate session state.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimulationError {
    /// A roll was attempted with no dice left in the segment.
    #[error("no dice left")]
    NoDiceRemaining,
    /// The command is not valid in the current phase.
    #[error("not allowed during {actual}, expected {expected}")]
    InvalidPhase {
        /// Phase the command requires.
        expected: Phase,
        /// Phase the session was in.
        actual: Phase,
    },
    /// The weapon choice index does not match any offered option.
    #[error("choice {index} is out of range for {available} options")]
    InvalidChoice {
        /// Index supplied by the caller.
        index: usize,
        /// Number of options on offer.
        available: usize,
    },
    /// The board has no tiles, so movement and spawning are disabled.
    #[error("the board has no tiles")]
    DegenerateBoard,
}

/// Position in board world space, measured in layout units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    x: f32,
    y: f32,
}

impl WorldPoint {
    /// The board origin. Enemies spawn here and the base sits here.
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    /// Creates a new point from its components.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance(self, other: WorldPoint) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Unique identifier assigned to an enemy. Never reused within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Tiers of enemies a wave may spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    /// Baseline enemy.
    Normal,
    /// Sturdier enemy with a heavier hit.
    Elite,
    /// Single heavy enemy closing out the wave table.
    Boss,
}

impl EnemyKind {
    /// Returns the untuned stats for the enemy kind.
    #[must_use]
    pub const fn base_stats(self) -> EnemyStats {
        match self {
            Self::Normal => EnemyStats {
                max_hp: 12,
                damage: 1,
                attack_interval: Duration::from_millis(1300),
                speed: 220.0,
            },
            Self::Elite => EnemyStats {
                max_hp: 28,
                damage: 2,
                attack_interval: Duration::from_millis(1100),
                speed: 200.0,
            },
            Self::Boss => EnemyStats {
                max_hp: 80,
                damage: 4,
                attack_interval: Duration::from_millis(900),
                speed: 160.0,
            },
        }
    }

    /// Display label used in log lines.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Elite => "Elite",
            Self::Boss => "Boss",
        }
    }
}

/// Combat parameters of a spawned enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    /// Health at spawn.
    pub max_hp: u32,
    /// Damage dealt to the base per attack.
    pub damage: u32,
    /// Time between attacks once the enemy has arrived.
    pub attack_interval: Duration,
    /// Movement speed in world units per second.
    pub speed: f32,
}

/// Catalog entry describing a weapon that can be bound to a board cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeaponDefinition {
    /// Display name.
    pub name: String,
    /// Maximum damage roll per shot.
    pub damage: u32,
    /// Cooldown applied after each shot.
    #[serde(with = "crate::seconds")]
    pub interval: Duration,
    /// Targeting radius in world units.
    pub range: f32,
}

impl WeaponDefinition {
    /// Creates a new weapon definition.
    #[must_use]
    pub fn new(name: impl Into<String>, damage: u32, interval: Duration, range: f32) -> Self {
        Self {
            name: name.into(),
            damage,
            interval,
            range,
        }
    }
}

/// Result of applying damage to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageOutcome {
    /// Health remaining after the hit, floored at zero.
    pub remaining_hp: u32,
    /// Whether the enemy was removed by the hit.
    pub defeated: bool,
}

/// Query and mutation surface through which weapons reach live enemies.
pub trait EnemyTargets {
    /// Appends the identifier and position of every live enemy in spawn order.
    fn live_enemies(&self, out: &mut Vec<(EnemyId, WorldPoint)>);

    /// Applies damage to an enemy, removing it when its health reaches zero.
    ///
    /// Returns `None` when the enemy is no longer part of the battle.
    fn damage_enemy(&mut self, enemy: EnemyId, amount: u32) -> Option<DamageOutcome>;
}

/// Attack emitted by an arrived enemy against the base.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BaseHit {
    /// Cell the attacking enemy stands on.
    pub cell: usize,
    /// Damage dealt by the attack.
    pub damage: u32,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Tier of the enemy.
    pub kind: EnemyKind,
    /// Current health.
    pub hp: u32,
    /// Health at spawn.
    pub max_hp: u32,
    /// Cell the enemy marches toward or attacks.
    pub target_cell: usize,
    /// Current position in world space.
    pub position: WorldPoint,
    /// Whether the enemy reached its target cell.
    pub arrived: bool,
}

/// Read-only snapshot describing all live enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of live enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no enemies are alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a placed weapon used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct WeaponSnapshot {
    /// Cell the weapon is bound to.
    pub cell: usize,
    /// Display name of the weapon.
    pub name: String,
    /// Maximum damage roll per shot.
    pub damage: u32,
    /// Targeting radius in world units.
    pub range: f32,
    /// Time left before the weapon may fire again.
    pub cooldown_remaining: Duration,
}

/// Read-only snapshot describing all placed weapons in placement order.
#[derive(Clone, Debug, Default)]
pub struct WeaponView {
    snapshots: Vec<WeaponSnapshot>,
}

impl WeaponView {
    /// Creates a new weapon view from snapshots already in placement order.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<WeaponSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured weapon snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &WeaponSnapshot> {
        self.snapshots.iter()
    }

    /// Returns the weapon bound to the provided cell, if any.
    #[must_use]
    pub fn at_cell(&self, cell: usize) -> Option<&WeaponSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.cell == cell)
    }

    /// Number of placed weapons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no weapons are placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
