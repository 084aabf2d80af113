//! Session configuration and the default content tables.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{BoardLayout, EnemyKind, EnemyStats, PlayerStats, TileKind, WeaponDefinition};

const DEFAULT_SEED: u64 = 0x5eed_d1ce_0b0a_4d01;

/// One entry of the wave table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveDefinition {
    /// Enemy kind spawned throughout the wave.
    pub kind: EnemyKind,
    /// Number of enemies the wave spawns.
    pub spawn_count: u32,
    /// Time between consecutive spawns.
    #[serde(with = "crate::seconds")]
    pub spawn_interval: Duration,
}

impl WaveDefinition {
    /// Creates a new wave definition.
    #[must_use]
    pub const fn new(kind: EnemyKind, spawn_count: u32, spawn_interval: Duration) -> Self {
        Self {
            kind,
            spawn_count,
            spawn_interval,
        }
    }
}

/// Wave table used when no other is configured.
#[must_use]
pub fn default_waves() -> Vec<WaveDefinition> {
    vec![
        WaveDefinition::new(EnemyKind::Normal, 4, Duration::from_millis(1200)),
        WaveDefinition::new(EnemyKind::Normal, 7, Duration::from_millis(1000)),
        WaveDefinition::new(EnemyKind::Elite, 3, Duration::from_millis(1600)),
        WaveDefinition::new(EnemyKind::Boss, 1, Duration::from_millis(2400)),
    ]
}

/// Weapon catalog used when no other is configured.
#[must_use]
pub fn default_weapon_catalog() -> Vec<WeaponDefinition> {
    vec![
        WeaponDefinition::new("Short Sword", 3, Duration::from_millis(900), 220.0),
        WeaponDefinition::new("Spear", 5, Duration::from_millis(1300), 260.0),
        WeaponDefinition::new("Ballista", 4, Duration::from_millis(700), 180.0),
        WeaponDefinition::new("Staff", 6, Duration::from_millis(1600), 300.0),
        WeaponDefinition::new("Flying Blade", 2, Duration::from_millis(400), 160.0),
    ]
}

/// Global multipliers applied to enemy stats at spawn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    /// Multiplier applied to movement speed.
    pub speed_scale: f32,
    /// Multiplier applied to attack damage. Results round and never drop below one.
    pub damage_scale: f32,
    /// Multiplier applied to the time between attacks.
    pub attack_interval_multiplier: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            speed_scale: 1.0,
            damage_scale: 1.0,
            attack_interval_multiplier: 1.0,
        }
    }
}

impl EnemyTuning {
    /// Applies the tuning to the base stats of an enemy kind.
    #[must_use]
    pub fn apply(&self, base: EnemyStats) -> EnemyStats {
        let damage = (base.damage as f32 * self.damage_scale.max(0.0)).round();
        let multiplier = if self.attack_interval_multiplier.is_finite() {
            self.attack_interval_multiplier.max(0.0)
        } else {
            1.0
        };
        let interval_nanos = (base.attack_interval.as_nanos() as f64 * f64::from(multiplier)).round();
        EnemyStats {
            max_hp: base.max_hp,
            damage: (damage as u32).max(1),
            attack_interval: Duration::from_nanos(interval_nanos as u64),
            speed: base.speed * self.speed_scale.max(0.0),
        }
    }
}

/// Every tunable parameter of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of tiles on the generated board.
    pub board_size: usize,
    /// Tile kinds drawn uniformly when generating the board.
    pub palette: Vec<TileKind>,
    /// Geometry used to position tiles in world space.
    pub layout: BoardLayout,
    /// Dice granted at the start of every exploration segment.
    pub base_dice: u32,
    /// Starting health of the defended base.
    pub base_health: u32,
    /// Starting player statistics.
    pub player: PlayerStats,
    /// Number of lines kept in the player-facing log.
    pub log_capacity: usize,
    /// Seed for the session's random source.
    pub seed: u64,
    /// Ordered wave table. Waves beyond the table repeat the final entry.
    pub waves: Vec<WaveDefinition>,
    /// Multipliers applied to enemy stats.
    pub enemy_tuning: EnemyTuning,
    /// Weapons offered by weapon tiles.
    pub weapons: Vec<WeaponDefinition>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            board_size: 20,
            palette: TileKind::ALL.to_vec(),
            layout: BoardLayout::default(),
            base_dice: 3,
            base_health: 10,
            player: PlayerStats::default(),
            log_capacity: 12,
            seed: DEFAULT_SEED,
            waves: default_waves(),
            enemy_tuning: EnemyTuning::default(),
            weapons: default_weapon_catalog(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tuning_preserves_base_stats() {
        let base = EnemyKind::Elite.base_stats();
        let tuned = EnemyTuning::default().apply(base);
        assert_eq!(tuned, base);
    }

    #[test]
    fn damage_scaling_rounds_and_never_drops_below_one() {
        let tuning = EnemyTuning {
            damage_scale: 0.1,
            ..EnemyTuning::default()
        };
        assert_eq!(tuning.apply(EnemyKind::Boss.base_stats()).damage, 1);

        let tuning = EnemyTuning {
            damage_scale: 1.6,
            ..EnemyTuning::default()
        };
        assert_eq!(tuning.apply(EnemyKind::Elite.base_stats()).damage, 3);
    }

    #[test]
    fn interval_and_speed_scale() {
        let tuning = EnemyTuning {
            speed_scale: 0.5,
            attack_interval_multiplier: 2.0,
            ..EnemyTuning::default()
        };
        let tuned = tuning.apply(EnemyKind::Normal.base_stats());
        assert!((tuned.speed - 110.0).abs() < 1e-3);
        assert_eq!(tuned.attack_interval, Duration::from_millis(2600));
    }

    #[test]
    fn default_tables_match_content() {
        let waves = default_waves();
        assert_eq!(waves.len(), 4);
        assert_eq!(waves[3].kind, EnemyKind::Boss);
        assert_eq!(default_weapon_catalog().len(), 5);
        assert_eq!(SessionConfig::default().base_dice, 3);
    }
}
