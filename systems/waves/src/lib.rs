#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave simulation: spawn cadence, enemy movement and attack timers.
//!
//! Enemies live in an arena keyed by their monotonic [`EnemyId`], so removal is
//! by identity and iteration always follows spawn order. The simulation never
//! mutates base health itself; arrived enemies emit [`BaseHit`] values that the
//! owner of the base applies.

use std::{collections::BTreeMap, time::Duration};

use dice_defence_core::{
    BaseHit, Board, DamageOutcome, EnemyId, EnemyKind, EnemySnapshot, EnemyTargets, EnemyTuning,
    EnemyView, Event, RandomSource, WaveDefinition, WorldPoint,
};

/// Shortest attack interval an enemy may have.
pub const MIN_ATTACK_INTERVAL: Duration = Duration::from_millis(1);

/// Configuration parameters required to construct the wave simulation.
#[derive(Clone, Debug)]
pub struct Config {
    waves: Vec<WaveDefinition>,
    tuning: EnemyTuning,
}

impl Config {
    /// Creates a new configuration from a wave table and enemy tuning.
    #[must_use]
    pub fn new(waves: Vec<WaveDefinition>, tuning: EnemyTuning) -> Self {
        Self { waves, tuning }
    }
}

#[derive(Clone, Debug)]
struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    hp: u32,
    max_hp: u32,
    damage: u32,
    attack_interval: Duration,
    speed: f32,
    target_cell: usize,
    target_position: WorldPoint,
    position: WorldPoint,
    attack_timer: Duration,
    arrived: bool,
}

impl Enemy {
    fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            hp: self.hp,
            max_hp: self.max_hp,
            target_cell: self.target_cell,
            position: self.position,
            arrived: self.arrived,
        }
    }

    fn advance(&mut self, dt: Duration, hits: &mut Vec<BaseHit>, out: &mut Vec<Event>) {
        if !self.arrived {
            let step = self.speed * dt.as_secs_f32();
            let distance = self.position.distance(self.target_position);
            if distance <= step {
                self.position = self.target_position;
                self.arrived = true;
                self.attack_timer = Duration::ZERO;
                out.push(Event::EnemyArrived {
                    enemy: self.id,
                    target_cell: self.target_cell,
                });
            } else {
                self.position = step_toward(self.position, self.target_position, step / distance);
            }
        }

        if !self.arrived {
            return;
        }

        self.attack_timer = self.attack_timer.saturating_add(dt);
        while self.attack_timer >= self.attack_interval {
            self.attack_timer -= self.attack_interval;
            hits.push(BaseHit {
                cell: self.target_cell,
                damage: self.damage,
            });
        }
    }
}

/// Wave simulation owning the active enemies and the spawn schedule.
#[derive(Debug)]
pub struct Waves {
    table: Vec<WaveDefinition>,
    tuning: EnemyTuning,
    current: Option<WaveDefinition>,
    spawn_accumulator: Duration,
    spawn_enabled: bool,
    spawned: u32,
    enemies: BTreeMap<EnemyId, Enemy>,
    next_enemy_id: u32,
}

impl Waves {
    /// Creates a new wave simulation using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            table: config.waves,
            tuning: config.tuning,
            current: None,
            spawn_accumulator: Duration::ZERO,
            spawn_enabled: false,
            spawned: 0,
            enemies: BTreeMap::new(),
            next_enemy_id: 0,
        }
    }

    /// Looks up the definition for a one-based wave number.
    ///
    /// Numbers beyond the table reuse its final entry.
    #[must_use]
    pub fn definition_for(&self, wave_number: u32) -> Option<&WaveDefinition> {
        let last = self.table.len().checked_sub(1)?;
        let requested = usize::try_from(wave_number.saturating_sub(1)).unwrap_or(usize::MAX);
        self.table.get(requested.min(last))
    }

    /// Resets the simulation and begins spawning the given wave.
    ///
    /// Every live enemy from a previous wave is discarded. Returns the
    /// definition in effect, or `None` when the wave table is empty.
    pub fn start_wave(&mut self, wave_number: u32) -> Option<WaveDefinition> {
        self.current = self.definition_for(wave_number).copied();
        self.spawn_accumulator = Duration::ZERO;
        self.spawn_enabled = true;
        self.spawned = 0;
        self.enemies.clear();
        self.current
    }

    /// Stops any further spawning. Safe to call repeatedly.
    pub fn stop_spawning(&mut self) {
        self.spawn_enabled = false;
    }

    /// Reports whether the simulation may still spawn enemies.
    #[must_use]
    pub fn is_spawning(&self) -> bool {
        self.spawn_enabled && self.spawned < self.spawn_count()
    }

    /// Number of enemies the active wave spawns in total.
    #[must_use]
    pub fn spawn_count(&self) -> u32 {
        self.current.map_or(0, |wave| wave.spawn_count)
    }

    /// Number of enemies spawned so far in the active wave.
    #[must_use]
    pub fn spawned_count(&self) -> u32 {
        self.spawned
    }

    /// Number of live enemies.
    #[must_use]
    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    /// Reports whether every enemy of the wave was spawned and none remain.
    #[must_use]
    pub fn is_wave_cleared(&self) -> bool {
        self.spawned == self.spawn_count() && self.enemies.is_empty()
    }

    /// Snapshot of a single live enemy.
    #[must_use]
    pub fn enemy(&self, id: EnemyId) -> Option<EnemySnapshot> {
        self.enemies.get(&id).map(Enemy::snapshot)
    }

    /// Captures a read-only view of every live enemy.
    #[must_use]
    pub fn enemy_view(&self) -> EnemyView {
        EnemyView::from_snapshots(self.enemies.values().map(Enemy::snapshot).collect())
    }

    /// Advances spawn cadence, movement and attack timers by `dt`.
    ///
    /// Spawning happens first, so an enemy spawned in this tick also moves in
    /// it. Attacks by arrived enemies are appended to `hits` in spawn order.
    pub fn update(
        &mut self,
        dt: Duration,
        board: &Board,
        random: &mut dyn RandomSource,
        hits: &mut Vec<BaseHit>,
        out: &mut Vec<Event>,
    ) {
        self.advance_spawning(dt, board, random, out);

        for enemy in self.enemies.values_mut() {
            enemy.advance(dt, hits, out);
        }
    }

    fn advance_spawning(
        &mut self,
        dt: Duration,
        board: &Board,
        random: &mut dyn RandomSource,
        out: &mut Vec<Event>,
    ) {
        let Some(wave) = self.current else {
            return;
        };

        if !self.spawn_enabled || self.spawned >= wave.spawn_count || board.is_empty() {
            return;
        }

        self.spawn_accumulator = self.spawn_accumulator.saturating_add(dt);
        while self.spawn_accumulator >= wave.spawn_interval && self.spawned < wave.spawn_count {
            self.spawn_accumulator -= wave.spawn_interval;
            if !self.spawn(wave.kind, board, random, out) {
                break;
            }
        }
    }

    fn spawn(
        &mut self,
        kind: EnemyKind,
        board: &Board,
        random: &mut dyn RandomSource,
        out: &mut Vec<Event>,
    ) -> bool {
        let Some(target_cell) = random.index(board.len()) else {
            return false;
        };
        let Some(target_position) = board.tile_position(target_cell) else {
            return false;
        };

        let stats = self.tuning.apply(kind.base_stats());
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.saturating_add(1);

        let enemy = Enemy {
            id,
            kind,
            hp: stats.max_hp,
            max_hp: stats.max_hp,
            damage: stats.damage,
            attack_interval: stats.attack_interval.max(MIN_ATTACK_INTERVAL),
            speed: stats.speed,
            target_cell,
            target_position,
            position: board.base_position(),
            attack_timer: Duration::ZERO,
            arrived: false,
        };
        let _ = self.enemies.insert(id, enemy);
        self.spawned += 1;

        out.push(Event::EnemySpawned {
            enemy: id,
            kind,
            target_cell,
        });
        true
    }
}

impl EnemyTargets for Waves {
    fn live_enemies(&self, out: &mut Vec<(EnemyId, WorldPoint)>) {
        out.extend(
            self.enemies
                .values()
                .filter(|enemy| enemy.hp > 0)
                .map(|enemy| (enemy.id, enemy.position)),
        );
    }

    fn damage_enemy(&mut self, enemy: EnemyId, amount: u32) -> Option<DamageOutcome> {
        let entry = self.enemies.get_mut(&enemy)?;
        entry.hp = entry.hp.saturating_sub(amount);
        let remaining_hp = entry.hp;
        let defeated = remaining_hp == 0;
        if defeated {
            let _ = self.enemies.remove(&enemy);
        }
        Some(DamageOutcome {
            remaining_hp,
            defeated,
        })
    }
}

fn step_toward(from: WorldPoint, to: WorldPoint, fraction: f32) -> WorldPoint {
    WorldPoint::new(
        from.x() + (to.x() - from.x()) * fraction,
        from.y() + (to.y() - from.y()) * fraction,
    )
}
