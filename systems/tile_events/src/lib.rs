#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves board tile events against player state.
//!
//! The resolver mutates the landed tile and the player's statistics in place
//! and reports everything else (bonus dice, base healing, weapon offers) back
//! to the caller through a [`TileOutcome`]. It never touches dice or base
//! health directly.

use dice_defence_core::{PlayerStats, RandomSource, Tile, TileKind, WeaponDefinition};

/// Number of weapons offered by an upgradeable weapon tile.
pub const WEAPON_CHOICE_COUNT: usize = 3;
/// Gold granted when landing on a capped weapon or skill tile.
pub const CAPPED_TILE_GOLD: u32 = 5;
/// Base health restored by a heal tile.
pub const HEAL_AMOUNT: u32 = 2;
/// Dice granted by a buff tile.
pub const BUFF_DICE: u32 = 1;

/// Effect of resolving a tile that the session must apply.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TileOutcome {
    /// Human-readable description of what happened.
    pub message: String,
    /// Dice to add to the current exploration segment.
    pub bonus_dice: u32,
    /// Health to restore to the base.
    pub base_heal: u32,
    /// Weapons offered to the player. `Some` suspends exploration until one is chosen.
    pub reward: Option<Vec<WeaponDefinition>>,
}

impl TileOutcome {
    fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FortuneTier {
    Low,
    Mid,
    High,
}

impl FortuneTier {
    fn draw(random: &mut dyn RandomSource) -> Self {
        match random.below(3) {
            0 => Self::Low,
            1 => Self::Mid,
            _ => Self::High,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Mid => "middle",
            Self::High => "high",
        }
    }
}

/// Tile event resolver holding the weapon catalog offered by weapon tiles.
#[derive(Debug, Default)]
pub struct TileEvents {
    catalog: Vec<WeaponDefinition>,
    scratch: Vec<usize>,
}

impl TileEvents {
    /// Creates a resolver that samples weapon offers from `catalog`.
    #[must_use]
    pub fn new(catalog: Vec<WeaponDefinition>) -> Self {
        Self {
            catalog,
            scratch: Vec::new(),
        }
    }

    /// Applies the tile's effect, dispatching on its kind.
    pub fn resolve(
        &mut self,
        tile: &mut Tile,
        stats: &mut PlayerStats,
        random: &mut dyn RandomSource,
    ) -> TileOutcome {
        match tile.kind() {
            TileKind::Weapon => self.resolve_weapon(tile, stats, random),
            TileKind::Skill => resolve_skill(tile, stats, random),
            TileKind::Fortune => resolve_fortune(stats, random),
            TileKind::Shop => resolve_shop(stats, random),
            TileKind::Dice => resolve_dice(stats, random),
            TileKind::Heal => TileOutcome {
                message: format!("Heal: base health +{HEAL_AMOUNT}."),
                base_heal: HEAL_AMOUNT,
                ..TileOutcome::default()
            },
            TileKind::Buff => TileOutcome {
                message: format!("Buff: extra die +{BUFF_DICE}."),
                bonus_dice: BUFF_DICE,
                ..TileOutcome::default()
            },
            TileKind::Empty => TileOutcome::message("Empty: nothing happens here."),
        }
    }

    fn resolve_weapon(
        &mut self,
        tile: &mut Tile,
        stats: &mut PlayerStats,
        random: &mut dyn RandomSource,
    ) -> TileOutcome {
        let Some(level) = tile.upgrade() else {
            stats.earn_gold(CAPPED_TILE_GOLD);
            return TileOutcome::message(format!(
                "Weapon: tile is at max level, converted to {CAPPED_TILE_GOLD} gold."
            ));
        };

        stats.raise_weapon_level();
        let options = self.sample_weapons(random);
        if options.is_empty() {
            return TileOutcome::message(format!(
                "Weapon: tile upgraded to Lv.{level}, but no weapons are available."
            ));
        }

        TileOutcome {
            message: format!("Weapon: tile upgraded to Lv.{level}, choose a weapon."),
            reward: Some(options),
            ..TileOutcome::default()
        }
    }

    fn sample_weapons(&mut self, random: &mut dyn RandomSource) -> Vec<WeaponDefinition> {
        let total = self.catalog.len();
        let picks = WEAPON_CHOICE_COUNT.min(total);
        self.scratch.clear();
        self.scratch.extend(0..total);

        for slot in 0..picks {
            let offset = random.index(total - slot).unwrap_or(0);
            self.scratch.swap(slot, slot + offset);
        }

        self.scratch[..picks]
            .iter()
            .filter_map(|&index| self.catalog.get(index).cloned())
            .collect()
    }
}

fn resolve_skill(tile: &mut Tile, stats: &mut PlayerStats, random: &mut dyn RandomSource) -> TileOutcome {
    let Some(level) = tile.upgrade() else {
        stats.earn_gold(CAPPED_TILE_GOLD);
        return TileOutcome::message(format!(
            "Skill: tile is at max level, converted to {CAPPED_TILE_GOLD} gold."
        ));
    };

    stats.raise_skill_level();
    let message = match random.below(4) {
        0 => {
            stats.raise_atk(1);
            format!("Skill: upgraded to Lv.{level}, attack +1.")
        }
        1 => {
            stats.raise_atk_speed(0.1);
            format!("Skill: upgraded to Lv.{level}, attack speed +0.1.")
        }
        2 => {
            stats.raise_crit(0.05);
            format!("Skill: upgraded to Lv.{level}, crit +0.05.")
        }
        _ => {
            stats.raise_shop_discount(0.05);
            format!("Skill: upgraded to Lv.{level}, shop discount +5%.")
        }
    };
    TileOutcome::message(message)
}

fn resolve_fortune(stats: &mut PlayerStats, random: &mut dyn RandomSource) -> TileOutcome {
    let tier = FortuneTier::draw(random);
    let label = tier.label();
    let message = match random.below(6) {
        0 => {
            stats.raise_atk(if tier == FortuneTier::High { 4 } else { 2 });
            format!("Fortune: {label} draw, attack rises.")
        }
        1 => {
            stats.lower_atk(if tier == FortuneTier::Low { 2 } else { 1 });
            format!("Fortune: {label} draw, attack falls.")
        }
        2 => {
            stats.raise_atk_speed(if tier == FortuneTier::High { 0.2 } else { 0.1 });
            format!("Fortune: {label} draw, attack speed rises.")
        }
        3 => {
            stats.lower_atk_speed(0.1);
            format!("Fortune: {label} draw, attack speed falls.")
        }
        4 => {
            stats.raise_crit(if tier == FortuneTier::High { 0.1 } else { 0.05 });
            format!("Fortune: {label} draw, crit rises.")
        }
        _ => {
            stats.wound(if tier == FortuneTier::Low { 10 } else { 5 });
            format!("Fortune: {label} draw, vitality wavers.")
        }
    };
    TileOutcome::message(message)
}

fn resolve_shop(stats: &mut PlayerStats, random: &mut dyn RandomSource) -> TileOutcome {
    let message = match random.below(4) {
        0 => {
            stats.raise_atk(1);
            "Shop: bought an attack upgrade, attack +1."
        }
        1 => {
            stats.raise_atk_speed(0.1);
            "Shop: bought a speed upgrade, attack speed +0.1."
        }
        2 => {
            stats.raise_crit(0.05);
            "Shop: bought a crit upgrade, crit +0.05."
        }
        _ => {
            stats.heal(10);
            "Shop: bought a potion, health +10."
        }
    };
    TileOutcome::message(message)
}

fn resolve_dice(stats: &mut PlayerStats, random: &mut dyn RandomSource) -> TileOutcome {
    let extra = random.inclusive(1, 3);
    stats.earn_gold(1);
    TileOutcome {
        message: format!("Dice: gold +1, extra dice +{extra}."),
        bonus_dice: extra,
        ..TileOutcome::default()
    }
}
