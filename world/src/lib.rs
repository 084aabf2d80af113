#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state for Dice Defence.
//!
//! The world owns the phase state machine together with every collaborator a
//! session needs: the board, the dice budget, player statistics, base health,
//! the wave simulation and the placed weapons. All mutation flows through
//! [`apply`]; adapters observe state through the [`query`] module and the
//! events appended to their buffer.

mod dice;
mod log;

use std::time::Duration;

use dice_defence_core::{
    BaseHit, Board, Command, Event, Phase, PlayerStats, RandomSource, SeededRandom,
    SessionConfig, SimulationError, WeaponDefinition, WELCOME_LINE,
};
use dice_defence_system_tile_events::TileEvents;
use dice_defence_system_waves::{Config as WaveConfig, Waves};
use dice_defence_system_weapons::Weapons;
use tracing::{debug, info, warn};

pub use dice::DiceEconomy;

use crate::log::SessionLog;

/// Weapon choice awaiting a decision from the player.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingReward {
    cell: usize,
    options: Vec<WeaponDefinition>,
}

impl PendingReward {
    /// Cell the chosen weapon will be bound to.
    #[must_use]
    pub const fn cell(&self) -> usize {
        self.cell
    }

    /// Weapons on offer, indexed by [`Command::ChooseWeapon`].
    #[must_use]
    pub fn options(&self) -> &[WeaponDefinition] {
        &self.options
    }
}

/// Represents the authoritative Dice Defence session state.
#[derive(Debug)]
pub struct World {
    phase: Phase,
    board: Board,
    position: usize,
    dice: DiceEconomy,
    base_dice: u32,
    base_health: u32,
    wave_number: u32,
    player: PlayerStats,
    pending: Option<PendingReward>,
    tile_events: TileEvents,
    waves: Waves,
    weapons: Weapons,
    random: Box<dyn RandomSource>,
    log: SessionLog,
    hits: Vec<BaseHit>,
}

impl World {
    /// Creates a session whose board and random draws derive from the configured seed.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        let mut random = SeededRandom::new(config.seed);
        let board = Board::generate(
            config.board_size,
            &config.palette,
            config.layout,
            &mut random,
        );
        Self::with_board(config, board, Box::new(random))
    }

    /// Creates a session on an explicit board, drawing randomness from `random`.
    ///
    /// The configured board size, palette, layout and seed are ignored.
    #[must_use]
    pub fn with_board(config: SessionConfig, board: Board, random: Box<dyn RandomSource>) -> Self {
        let SessionConfig {
            base_dice,
            base_health,
            player,
            log_capacity,
            waves,
            enemy_tuning,
            weapons,
            ..
        } = config;

        let mut log = SessionLog::new(log_capacity);
        log.push(WELCOME_LINE);

        Self {
            phase: Phase::Explore,
            dice: DiceEconomy::new(base_dice.saturating_add(player.permanent_dice_bonus())),
            board,
            position: 0,
            base_dice,
            base_health,
            wave_number: 1,
            player,
            pending: None,
            tile_events: TileEvents::new(weapons),
            waves: Waves::new(WaveConfig::new(waves, enemy_tuning)),
            weapons: Weapons::new(),
            random,
            log,
            hits: Vec::new(),
        }
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), SimulationError> {
        if self.phase == expected {
            return Ok(());
        }
        Err(SimulationError::InvalidPhase {
            expected,
            actual: self.phase,
        })
    }

    fn transition(&mut self, to: Phase, out_events: &mut Vec<Event>) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        debug!(%from, %to, "phase changed");
        out_events.push(Event::PhaseChanged { from, to });
    }

    fn roll(&mut self, out_events: &mut Vec<Event>) -> Result<(), SimulationError> {
        self.expect_phase(Phase::Explore)?;
        if self.board.is_empty() {
            return Err(SimulationError::DegenerateBoard);
        }

        let value = self
            .dice
            .roll(self.random.as_mut())
            .ok_or(SimulationError::NoDiceRemaining)?;
        let dice_left = self.dice.dice_left();
        out_events.push(Event::Rolled { value, dice_left });
        self.log.push(format!("Rolled a {value}, {dice_left} dice left."));

        let from = self.position;
        let to = self
            .board
            .advance(from, usize::from(value))
            .map_or(from, |(landed, _)| landed);
        self.position = to;
        out_events.push(Event::Moved { from, to });

        self.resolve_tile(to, out_events);
        self.check_exhaustion(out_events);
        Ok(())
    }

    fn resolve_tile(&mut self, cell: usize, out_events: &mut Vec<Event>) {
        let Some(tile) = self.board.tile_mut(cell) else {
            return;
        };
        let outcome = self
            .tile_events
            .resolve(tile, &mut self.player, self.random.as_mut());
        let (kind, level) = (tile.kind(), tile.level());

        out_events.push(Event::TileResolved {
            cell,
            kind,
            level,
            message: outcome.message.clone(),
        });
        self.log.push(outcome.message);

        if outcome.bonus_dice > 0 {
            let dice_left = self.dice.add_dice(outcome.bonus_dice);
            out_events.push(Event::DiceGranted {
                amount: outcome.bonus_dice,
                dice_left,
            });
        }

        if outcome.base_heal > 0 {
            self.base_health = self.base_health.saturating_add(outcome.base_heal);
            out_events.push(Event::BaseHealed {
                amount: outcome.base_heal,
                health: self.base_health,
            });
        }

        if let Some(options) = outcome.reward {
            out_events.push(Event::RewardOffered {
                cell,
                options: options.clone(),
            });
            self.pending = Some(PendingReward { cell, options });
            self.transition(Phase::ChoosingReward, out_events);
        }
    }

    /// Starts the battle once the dice run out. A board without tiles has no
    /// spawn point, so it never leaves exploration.
    fn check_exhaustion(&mut self, out_events: &mut Vec<Event>) {
        if self.phase == Phase::Explore && self.dice.dice_left() == 0 && !self.board.is_empty() {
            self.start_battle(out_events);
        }
    }

    fn start_battle(&mut self, out_events: &mut Vec<Event>) {
        self.transition(Phase::Battle, out_events);
        let wave = self.wave_number;
        let Some(definition) = self.waves.start_wave(wave) else {
            warn!(wave, "wave table is empty");
            return;
        };

        info!(
            wave,
            kind = definition.kind.label(),
            spawn_count = definition.spawn_count,
            "wave started"
        );
        out_events.push(Event::WaveStarted {
            wave,
            kind: definition.kind,
            spawn_count: definition.spawn_count,
        });
        self.log.push(format!(
            "Wave {wave} begins: {} {} enemies approach.",
            definition.spawn_count,
            definition.kind.label()
        ));
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        match self.phase {
            Phase::Battle => {}
            Phase::Explore => {
                self.check_exhaustion(out_events);
                return;
            }
            Phase::ChoosingReward | Phase::GameOver => return,
        }

        self.hits.clear();
        self.waves.update(
            dt,
            &self.board,
            self.random.as_mut(),
            &mut self.hits,
            out_events,
        );

        let hits = std::mem::take(&mut self.hits);
        let fell = self.apply_hits(&hits, out_events);
        self.hits = hits;
        if fell {
            return;
        }

        self.weapons.tick(
            dt,
            &self.board,
            &mut self.waves,
            self.random.as_mut(),
            out_events,
        );

        if self.waves.is_wave_cleared() {
            self.finish_wave(out_events);
        }
    }

    /// Applies enemy attacks in order. Returns whether the base fell.
    fn apply_hits(&mut self, hits: &[BaseHit], out_events: &mut Vec<Event>) -> bool {
        for hit in hits {
            self.base_health = self.base_health.saturating_sub(hit.damage);
            out_events.push(Event::BaseHit {
                cell: hit.cell,
                damage: hit.damage,
                remaining_health: self.base_health,
            });

            if self.base_health == 0 {
                self.game_over(out_events);
                return true;
            }
        }
        false
    }

    fn game_over(&mut self, out_events: &mut Vec<Event>) {
        let wave = self.wave_number;
        self.waves.stop_spawning();
        self.transition(Phase::GameOver, out_events);
        out_events.push(Event::GameOver { wave });
        self.log.push(format!("The base has fallen during wave {wave}."));
        warn!(wave, "base destroyed, session over");
    }

    fn finish_wave(&mut self, out_events: &mut Vec<Event>) {
        let wave = self.wave_number;
        out_events.push(Event::WaveCleared { wave });
        self.log.push(format!("Wave {wave} cleared."));
        info!(wave, base_health = self.base_health, "wave cleared");

        self.wave_number = wave.saturating_add(1);
        self.dice
            .reset(self.base_dice.saturating_add(self.player.permanent_dice_bonus()));
        self.transition(Phase::Explore, out_events);
        self.check_exhaustion(out_events);
    }

    fn choose_weapon(
        &mut self,
        index: usize,
        out_events: &mut Vec<Event>,
    ) -> Result<(), SimulationError> {
        self.expect_phase(Phase::ChoosingReward)?;
        let (cell, definition) = {
            let pending = self.pending.as_ref();
            let available = pending.map_or(0, |reward| reward.options.len());
            let chosen = pending.and_then(|reward| {
                reward
                    .options
                    .get(index)
                    .map(|definition| (reward.cell, definition.clone()))
            });
            chosen.ok_or(SimulationError::InvalidChoice { index, available })?
        };

        self.pending = None;
        let name = definition.name.clone();
        let replaced = self.weapons.add_weapon_to_cell(cell, definition);
        out_events.push(Event::WeaponPlaced {
            cell,
            name: name.clone(),
            replaced,
        });
        self.log.push(if replaced {
            format!("Replaced the weapon on tile {cell} with {name}.")
        } else {
            format!("Placed {name} on tile {cell}.")
        });

        self.transition(Phase::Explore, out_events);
        self.check_exhaustion(out_events);
        Ok(())
    }

    fn reject(&mut self, command: &Command, error: SimulationError) {
        debug!(?command, %error, phase = %self.phase, "command rejected");
        self.log.push(format!("Rejected: {error}."));
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Ticks outside of battle only re-check dice exhaustion and never fail.
/// A rejected command leaves the session untouched apart from a log line.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), SimulationError> {
    let result = match command {
        Command::Roll => world.roll(out_events),
        Command::Tick { dt } => {
            world.tick(dt, out_events);
            Ok(())
        }
        Command::ChooseWeapon { index } => world.choose_weapon(index, out_events),
    };

    if let Err(error) = result {
        world.reject(&command, error);
    }
    result
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use dice_defence_core::{Board, EnemyView, Phase, PlayerStats, Tile, WeaponView};

    use super::{PendingReward, World};

    /// Active gameplay phase.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        world.phase
    }

    /// Dice remaining in the current exploration segment.
    #[must_use]
    pub fn dice_left(world: &World) -> u32 {
        world.dice.dice_left()
    }

    /// Health of the defended base.
    #[must_use]
    pub fn base_health(world: &World) -> u32 {
        world.base_health
    }

    /// One-based number of the current or upcoming wave.
    #[must_use]
    pub fn wave_number(world: &World) -> u32 {
        world.wave_number
    }

    /// Board index occupied by the player token.
    #[must_use]
    pub fn position(world: &World) -> usize {
        world.position
    }

    /// Tile stored at the provided board index.
    #[must_use]
    pub fn tile_at(world: &World, index: usize) -> Option<Tile> {
        world.board.tile(index).copied()
    }

    /// Provides read-only access to the board.
    #[must_use]
    pub fn board(world: &World) -> &Board {
        &world.board
    }

    /// Current player statistics.
    #[must_use]
    pub fn player_stats(world: &World) -> &PlayerStats {
        &world.player
    }

    /// Weapon choice awaiting a decision, present only while choosing a reward.
    #[must_use]
    pub fn pending_reward(world: &World) -> Option<&PendingReward> {
        world.pending.as_ref()
    }

    /// Captures a read-only view of the live enemies.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        world.waves.enemy_view()
    }

    /// Captures a read-only view of the placed weapons.
    #[must_use]
    pub fn weapon_view(world: &World) -> WeaponView {
        world.weapons.weapon_view()
    }

    /// Most recent player-facing log lines, oldest first.
    pub fn log_lines(world: &World) -> impl Iterator<Item = &str> + '_ {
        world.log.lines()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dice_defence_core::{BoardLayout, EnemyKind, ScriptedRandom, Tile, TileKind, WaveDefinition};

    fn board(kinds: &[TileKind]) -> Board {
        Board::from_tiles(
            kinds.iter().copied().map(Tile::new).collect(),
            BoardLayout::default(),
        )
    }

    fn world(config: SessionConfig, kinds: &[TileKind], draws: &[u32]) -> World {
        World::with_board(
            config,
            board(kinds),
            Box::new(ScriptedRandom::new(draws.iter().copied())),
        )
    }

    fn quick_wave_config() -> SessionConfig {
        SessionConfig {
            base_dice: 1,
            waves: vec![WaveDefinition::new(
                EnemyKind::Normal,
                1,
                Duration::from_millis(100),
            )],
            ..SessionConfig::default()
        }
    }

    #[test]
    fn new_session_starts_exploring() {
        let world = World::new(SessionConfig::default());
        assert_eq!(query::phase(&world), Phase::Explore);
        assert_eq!(query::dice_left(&world), 3);
        assert_eq!(query::wave_number(&world), 1);
        assert_eq!(query::position(&world), 0);
        assert_eq!(query::board(&world).len(), 20);
        assert_eq!(query::log_lines(&world).collect::<Vec<_>>(), vec![WELCOME_LINE]);
    }

    #[test]
    fn single_tile_board_clamps_any_roll() {
        let config = SessionConfig {
            base_dice: 2,
            ..SessionConfig::default()
        };
        let mut world = world(config, &[TileKind::Empty], &[5]);
        let mut events = Vec::new();

        apply(&mut world, Command::Roll, &mut events).expect("roll accepted");

        assert_eq!(query::position(&world), 0);
        assert_eq!(
            &events[..2],
            &[
                Event::Rolled {
                    value: 6,
                    dice_left: 1,
                },
                Event::Moved { from: 0, to: 0 },
            ]
        );
    }

    #[test]
    fn heal_applies_before_exhaustion_starts_battle() {
        let config = SessionConfig {
            base_dice: 1,
            ..SessionConfig::default()
        };
        let mut world = world(config, &[TileKind::Empty, TileKind::Heal], &[0]);
        let mut events = Vec::new();

        apply(&mut world, Command::Roll, &mut events).expect("roll accepted");

        assert_eq!(query::base_health(&world), 12);
        assert_eq!(query::phase(&world), Phase::Battle);
        let heal = events
            .iter()
            .position(|event| matches!(event, Event::BaseHealed { amount: 2, health: 12 }))
            .expect("heal event");
        let battle = events
            .iter()
            .position(|event| {
                *event
                    == Event::PhaseChanged {
                        from: Phase::Explore,
                        to: Phase::Battle,
                    }
            })
            .expect("battle transition");
        assert!(heal < battle);
        assert_eq!(
            events.last(),
            Some(&Event::WaveStarted {
                wave: 1,
                kind: EnemyKind::Normal,
                spawn_count: 4,
            })
        );
    }

    #[test]
    fn roll_outside_explore_is_rejected_without_side_effects() {
        let mut world = world(quick_wave_config(), &[TileKind::Empty], &[]);
        let mut events = Vec::new();
        apply(&mut world, Command::Roll, &mut events).expect("roll accepted");
        assert_eq!(query::phase(&world), Phase::Battle);
        events.clear();

        let result = apply(&mut world, Command::Roll, &mut events);

        assert_eq!(
            result,
            Err(SimulationError::InvalidPhase {
                expected: Phase::Explore,
                actual: Phase::Battle,
            })
        );
        assert!(events.is_empty());
        assert_eq!(query::dice_left(&world), 0);
        let last = query::log_lines(&world).last().expect("log line");
        assert!(last.starts_with("Rejected"));
    }

    #[test]
    fn weapon_tile_suspends_until_choice() {
        let mut world = world(quick_wave_config(), &[TileKind::Weapon], &[]);
        let mut events = Vec::new();
        apply(&mut world, Command::Roll, &mut events).expect("roll accepted");

        assert_eq!(query::phase(&world), Phase::ChoosingReward);
        assert_eq!(query::dice_left(&world), 0);
        let pending = query::pending_reward(&world).expect("reward pending");
        assert_eq!(pending.cell(), 0);
        assert_eq!(pending.options().len(), 3);

        let result = apply(&mut world, Command::ChooseWeapon { index: 7 }, &mut events);
        assert_eq!(
            result,
            Err(SimulationError::InvalidChoice {
                index: 7,
                available: 3,
            })
        );
        assert_eq!(query::phase(&world), Phase::ChoosingReward);
        assert!(query::pending_reward(&world).is_some());

        events.clear();
        apply(&mut world, Command::ChooseWeapon { index: 0 }, &mut events)
            .expect("choice accepted");

        assert!(query::pending_reward(&world).is_none());
        assert_eq!(query::weapon_view(&world).len(), 1);
        assert_eq!(query::phase(&world), Phase::Battle, "no dice left after choosing");
        assert!(matches!(
            events[0],
            Event::WeaponPlaced {
                cell: 0,
                replaced: false,
                ..
            }
        ));
    }

    #[test]
    fn choose_outside_reward_phase_is_rejected() {
        let mut world = world(SessionConfig::default(), &[TileKind::Empty], &[]);
        let mut events = Vec::new();
        let result = apply(&mut world, Command::ChooseWeapon { index: 0 }, &mut events);
        assert_eq!(
            result,
            Err(SimulationError::InvalidPhase {
                expected: Phase::ChoosingReward,
                actual: Phase::Explore,
            })
        );
    }

    #[test]
    fn fallen_base_ends_session() {
        let config = SessionConfig {
            base_health: 1,
            ..quick_wave_config()
        };
        let mut world = world(config, &[TileKind::Empty], &[]);
        let mut events = Vec::new();
        apply(&mut world, Command::Roll, &mut events).expect("roll accepted");
        events.clear();

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(10),
            },
            &mut events,
        )
        .expect("tick accepted");

        assert_eq!(query::phase(&world), Phase::GameOver);
        assert_eq!(query::base_health(&world), 0);
        let base_hits = events
            .iter()
            .filter(|event| matches!(event, Event::BaseHit { .. }))
            .count();
        assert_eq!(base_hits, 1, "hits after the fall are ignored");
        assert_eq!(events.last(), Some(&Event::GameOver { wave: 1 }));

        events.clear();
        assert_eq!(
            apply(&mut world, Command::Roll, &mut events),
            Err(SimulationError::InvalidPhase {
                expected: Phase::Explore,
                actual: Phase::GameOver,
            })
        );
        assert!(apply(&mut world, Command::ChooseWeapon { index: 0 }, &mut events).is_err());
        apply(&mut world, Command::tick_seconds(5.0), &mut events).expect("ticks are inert");
        assert!(events.is_empty());
        assert_eq!(query::enemy_view(&world).len(), 1);
    }

    #[test]
    fn cleared_wave_refills_dice_and_advances() {
        let config = SessionConfig {
            base_health: 100,
            ..quick_wave_config()
        };
        let mut world = world(config, &[TileKind::Weapon], &[]);
        let mut events = Vec::new();
        apply(&mut world, Command::Roll, &mut events).expect("roll accepted");
        apply(&mut world, Command::ChooseWeapon { index: 0 }, &mut events)
            .expect("choice accepted");
        assert_eq!(query::phase(&world), Phase::Battle);

        for _ in 0..600 {
            apply(&mut world, Command::tick_seconds(0.1), &mut events).expect("tick accepted");
            if query::phase(&world) != Phase::Battle {
                break;
            }
        }

        assert_eq!(query::phase(&world), Phase::Explore);
        assert_eq!(query::wave_number(&world), 2);
        assert_eq!(query::dice_left(&world), 1);
        assert!(query::enemy_view(&world).is_empty());
        assert!(events.contains(&Event::WaveCleared { wave: 1 }));
    }

    #[test]
    fn degenerate_board_rejects_roll_and_keeps_dice() {
        let mut world = world(SessionConfig::default(), &[], &[]);
        let mut events = Vec::new();
        assert_eq!(
            apply(&mut world, Command::Roll, &mut events),
            Err(SimulationError::DegenerateBoard)
        );
        assert_eq!(query::dice_left(&world), 3);
        assert!(query::tile_at(&world, 0).is_none());
    }

    #[test]
    fn exhausted_explore_enters_battle_on_tick() {
        let config = SessionConfig {
            base_dice: 0,
            ..SessionConfig::default()
        };
        let mut world = world(config, &[TileKind::Empty], &[]);
        let mut events = Vec::new();
        assert_eq!(
            apply(&mut world, Command::Roll, &mut events),
            Err(SimulationError::NoDiceRemaining)
        );
        apply(&mut world, Command::tick_seconds(0.016), &mut events).expect("tick accepted");
        assert_eq!(query::phase(&world), Phase::Battle);
    }

    #[test]
    fn degenerate_board_never_starts_a_battle() {
        let config = SessionConfig {
            base_dice: 0,
            ..SessionConfig::default()
        };
        let mut world = world(config, &[], &[]);
        let mut events = Vec::new();
        for _ in 0..100 {
            apply(&mut world, Command::tick_seconds(1.0), &mut events).expect("tick accepted");
        }
        assert_eq!(query::phase(&world), Phase::Explore);
        assert!(query::enemy_view(&world).is_empty());
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::WaveStarted { .. })));
    }

    #[test]
    fn cleared_wave_refills_with_permanent_bonus() {
        let mut player = PlayerStats::default();
        player.raise_permanent_dice_bonus(2);
        let config = SessionConfig {
            base_health: 100,
            player,
            ..quick_wave_config()
        };
        let mut world = world(config, &[TileKind::Weapon], &[]);
        assert_eq!(query::dice_left(&world), 3);

        let mut events = Vec::new();
        while query::phase(&world) == Phase::Explore {
            apply(&mut world, Command::Roll, &mut events).expect("roll accepted");
            if query::phase(&world) == Phase::ChoosingReward {
                apply(&mut world, Command::ChooseWeapon { index: 0 }, &mut events)
                    .expect("choice accepted");
            }
        }
        assert_eq!(query::phase(&world), Phase::Battle);

        for _ in 0..600 {
            apply(&mut world, Command::tick_seconds(0.1), &mut events).expect("tick accepted");
            if query::phase(&world) != Phase::Battle {
                break;
            }
        }

        assert_eq!(query::phase(&world), Phase::Explore);
        assert_eq!(query::wave_number(&world), 2);
        assert_eq!(query::dice_left(&world), 3);
    }
}
