#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that owns placed weapons, their cooldowns and target selection.

use std::time::Duration;

use dice_defence_core::{
    Board, EnemyId, EnemyTargets, Event, RandomSource, WeaponDefinition, WeaponSnapshot,
    WeaponView, WorldPoint,
};

#[derive(Clone, Debug, PartialEq)]
struct WeaponInstance {
    cell: usize,
    definition: WeaponDefinition,
    cooldown: Duration,
}

impl WeaponInstance {
    fn snapshot(&self) -> WeaponSnapshot {
        WeaponSnapshot {
            cell: self.cell,
            name: self.definition.name.clone(),
            damage: self.definition.damage,
            range: self.definition.range,
            cooldown_remaining: self.cooldown,
        }
    }
}

/// Weapon engine that reuses a scratch buffer for enemy candidates.
#[derive(Debug, Default)]
pub struct Weapons {
    weapons: Vec<WeaponInstance>,
    candidates: Vec<(EnemyId, WorldPoint)>,
}

impl Weapons {
    /// Creates an engine with no placed weapons.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a weapon to a board cell, replacing any weapon already there.
    ///
    /// A replacement keeps the original placement order slot. The new weapon
    /// is ready to fire immediately. Returns whether a weapon was replaced.
    pub fn add_weapon_to_cell(&mut self, cell: usize, definition: WeaponDefinition) -> bool {
        let placed = WeaponInstance {
            cell,
            definition,
            cooldown: Duration::ZERO,
        };

        if let Some(existing) = self.weapons.iter_mut().find(|weapon| weapon.cell == cell) {
            *existing = placed;
            return true;
        }

        self.weapons.push(placed);
        false
    }

    /// Number of placed weapons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.weapons.len()
    }

    /// Reports whether no weapons are placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty()
    }

    /// Captures a read-only view of every placed weapon in placement order.
    #[must_use]
    pub fn weapon_view(&self) -> WeaponView {
        WeaponView::from_snapshots(self.weapons.iter().map(WeaponInstance::snapshot).collect())
    }

    /// Cools every weapon down by `dt` and fires the ready ones.
    ///
    /// Weapons act in placement order. Each weapon queries the live enemies
    /// right before choosing a target, so an enemy defeated by an earlier
    /// weapon in the same tick is never targeted again. A weapon without a
    /// target in range stays ready.
    pub fn tick(
        &mut self,
        dt: Duration,
        board: &Board,
        enemies: &mut dyn EnemyTargets,
        random: &mut dyn RandomSource,
        out: &mut Vec<Event>,
    ) {
        let base = board.base_position();

        for weapon in &mut self.weapons {
            weapon.cooldown = weapon.cooldown.saturating_sub(dt);
            if !weapon.cooldown.is_zero() {
                continue;
            }

            let Some(origin) = board.tile_position(weapon.cell) else {
                continue;
            };

            self.candidates.clear();
            enemies.live_enemies(&mut self.candidates);
            let Some(target) =
                find_priority_enemy(&self.candidates, base, origin, weapon.definition.range)
            else {
                continue;
            };

            let damage = random.inclusive(1, weapon.definition.damage.max(1));
            let Some(outcome) = enemies.damage_enemy(target, damage) else {
                continue;
            };

            weapon.cooldown = weapon.definition.interval;
            out.push(Event::WeaponFired {
                cell: weapon.cell,
                enemy: target,
                damage,
            });
            if outcome.defeated {
                out.push(Event::EnemyDefeated { enemy: target });
            } else {
                out.push(Event::EnemyDamaged {
                    enemy: target,
                    damage,
                    remaining_hp: outcome.remaining_hp,
                });
            }
        }
    }
}

/// Picks the enemy a weapon at `weapon` should fire at.
///
/// Only enemies within `range` of the weapon are eligible. The enemy closest
/// to `base` wins; ties go to the enemy closest to the weapon, then to the
/// lowest identifier.
#[must_use]
pub fn find_priority_enemy(
    candidates: &[(EnemyId, WorldPoint)],
    base: WorldPoint,
    weapon: WorldPoint,
    range: f32,
) -> Option<EnemyId> {
    let mut best: Option<BestCandidate> = None;

    for &(enemy, position) in candidates {
        let weapon_distance = position.distance(weapon);
        if !weapon_distance.is_finite() || weapon_distance > range {
            continue;
        }

        let base_distance = position.distance(base);
        if !base_distance.is_finite() {
            continue;
        }

        let current = BestCandidate {
            base_distance,
            weapon_distance,
            enemy,
        };

        match &mut best {
            Some(existing) => {
                if current.precedes(existing) {
                    *existing = current;
                }
            }
            None => best = Some(current),
        }
    }

    best.map(|candidate| candidate.enemy)
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    base_distance: f32,
    weapon_distance: f32,
    enemy: EnemyId,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.base_distance != other.base_distance {
            return self.base_distance < other.base_distance;
        }

        if self.weapon_distance != other.weapon_distance {
            return self.weapon_distance < other.weapon_distance;
        }

        self.enemy < other.enemy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dice_defence_core::{BoardLayout, DamageOutcome, ScriptedRandom, Tile, TileKind};

    #[derive(Debug, Default)]
    struct Targets {
        enemies: Vec<(EnemyId, WorldPoint, u32)>,
    }

    impl EnemyTargets for Targets {
        fn live_enemies(&self, out: &mut Vec<(EnemyId, WorldPoint)>) {
            out.extend(self.enemies.iter().map(|&(id, position, _)| (id, position)));
        }

        fn damage_enemy(&mut self, enemy: EnemyId, amount: u32) -> Option<DamageOutcome> {
            let index = self.enemies.iter().position(|entry| entry.0 == enemy)?;
            let hp = self.enemies[index].2.saturating_sub(amount);
            self.enemies[index].2 = hp;
            if hp == 0 {
                let _ = self.enemies.remove(index);
            }
            Some(DamageOutcome {
                remaining_hp: hp,
                defeated: hp == 0,
            })
        }
    }

    fn board() -> Board {
        Board::from_tiles(vec![Tile::new(TileKind::Empty); 6], BoardLayout::default())
    }

    fn spear() -> WeaponDefinition {
        WeaponDefinition::new("Spear", 5, Duration::from_millis(1300), 10_000.0)
    }

    #[test]
    fn placing_on_occupied_cell_replaces_in_place() {
        let mut weapons = Weapons::new();
        assert!(!weapons.add_weapon_to_cell(3, spear()));
        assert!(!weapons.add_weapon_to_cell(1, spear()));
        let staff = WeaponDefinition::new("Staff", 6, Duration::from_millis(1600), 300.0);
        assert!(weapons.add_weapon_to_cell(3, staff));

        let view = weapons.weapon_view();
        let cells: Vec<usize> = view.iter().map(|weapon| weapon.cell).collect();
        assert_eq!(cells, vec![3, 1]);
        assert_eq!(view.at_cell(3).map(|weapon| weapon.name.as_str()), Some("Staff"));
        assert_eq!(weapons.len(), 2);
    }

    #[test]
    fn defeated_enemy_is_not_targeted_by_later_weapons() {
        let board = board();
        let mut weapons = Weapons::new();
        let _ = weapons.add_weapon_to_cell(0, spear());
        let _ = weapons.add_weapon_to_cell(1, spear());
        let mut targets = Targets {
            enemies: vec![
                (EnemyId::new(0), WorldPoint::new(1.0, 0.0), 1),
                (EnemyId::new(1), WorldPoint::new(50.0, 0.0), 20),
            ],
        };
        let mut random = ScriptedRandom::default();
        let mut out = Vec::new();

        weapons.tick(Duration::ZERO, &board, &mut targets, &mut random, &mut out);

        assert_eq!(
            out,
            vec![
                Event::WeaponFired {
                    cell: 0,
                    enemy: EnemyId::new(0),
                    damage: 1,
                },
                Event::EnemyDefeated {
                    enemy: EnemyId::new(0),
                },
                Event::WeaponFired {
                    cell: 1,
                    enemy: EnemyId::new(1),
                    damage: 1,
                },
                Event::EnemyDamaged {
                    enemy: EnemyId::new(1),
                    damage: 1,
                    remaining_hp: 19,
                },
            ]
        );
    }

    #[test]
    fn ties_prefer_weapon_distance_then_identifier() {
        let base = WorldPoint::ORIGIN;
        let weapon = WorldPoint::new(10.0, 0.0);
        let candidates = [
            (EnemyId::new(4), WorldPoint::new(-5.0, 0.0)),
            (EnemyId::new(2), WorldPoint::new(5.0, 0.0)),
        ];
        assert_eq!(
            find_priority_enemy(&candidates, base, weapon, 100.0),
            Some(EnemyId::new(2))
        );

        let mirrored = [
            (EnemyId::new(7), WorldPoint::new(0.0, 5.0)),
            (EnemyId::new(3), WorldPoint::new(0.0, -5.0)),
        ];
        assert_eq!(
            find_priority_enemy(&mirrored, base, weapon, 100.0),
            Some(EnemyId::new(3))
        );
    }
}
