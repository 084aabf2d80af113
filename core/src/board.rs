//! Linear board model shared by tile resolution, wave spawning and weapon placement.

use serde::{Deserialize, Serialize};

use crate::{RandomSource, WorldPoint};

/// Highest level an upgradeable tile may reach.
pub const MAX_TILE_LEVEL: u8 = 5;

/// Event attached to a board tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Offers a weapon that is bound to the tile's cell.
    Weapon,
    /// Restores base health.
    Heal,
    /// Grants an extra die.
    Buff,
    /// Rolls a random stat upgrade.
    Skill,
    /// Draws a fortune that may help or hurt.
    Fortune,
    /// Buys a random stat upgrade.
    Shop,
    /// Grants gold and bonus dice.
    Dice,
    /// Nothing happens.
    Empty,
}

impl TileKind {
    /// Every tile kind, in declaration order.
    pub const ALL: [TileKind; 8] = [
        TileKind::Weapon,
        TileKind::Heal,
        TileKind::Buff,
        TileKind::Skill,
        TileKind::Fortune,
        TileKind::Shop,
        TileKind::Dice,
        TileKind::Empty,
    ];

    /// Reports whether tiles of this kind carry an upgrade level.
    #[must_use]
    pub const fn is_upgradeable(self) -> bool {
        matches!(self, Self::Weapon | Self::Skill)
    }

    /// Display label used in log lines.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Weapon => "Weapon",
            Self::Heal => "Heal",
            Self::Buff => "Buff",
            Self::Skill => "Skill",
            Self::Fortune => "Fortune",
            Self::Shop => "Shop",
            Self::Dice => "Dice",
            Self::Empty => "Empty",
        }
    }
}

/// Single board cell with a typed event and an optional upgrade level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    kind: TileKind,
    level: Option<u8>,
}

impl Tile {
    /// Creates a tile of the provided kind. Upgradeable tiles start at level zero.
    #[must_use]
    pub const fn new(kind: TileKind) -> Self {
        let level = if kind.is_upgradeable() { Some(0) } else { None };
        Self { kind, level }
    }

    /// Kind of event attached to the tile.
    #[must_use]
    pub const fn kind(&self) -> TileKind {
        self.kind
    }

    /// Upgrade level, present only for upgradeable kinds.
    #[must_use]
    pub const fn level(&self) -> Option<u8> {
        self.level
    }

    /// Reports whether the tile reached [`MAX_TILE_LEVEL`].
    #[must_use]
    pub const fn is_capped(&self) -> bool {
        matches!(self.level, Some(level) if level >= MAX_TILE_LEVEL)
    }

    /// Raises the tile level by one and returns the new level.
    ///
    /// Returns `None` for tiles without a level and for capped tiles.
    pub fn upgrade(&mut self) -> Option<u8> {
        let level = self.level.as_mut()?;
        if *level >= MAX_TILE_LEVEL {
            return None;
        }
        *level += 1;
        Some(*level)
    }
}

/// Geometry used to place tiles in world space.
///
/// Tiles are laid out row-major on a grid centred on the board origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardLayout {
    /// Number of tiles per row.
    pub columns: u32,
    /// Edge length of a tile in world units.
    pub tile_size: f32,
    /// Gap between neighbouring tiles in world units.
    pub spacing: f32,
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self {
            columns: 6,
            tile_size: 90.0,
            spacing: 12.0,
        }
    }
}

impl BoardLayout {
    /// Computes the world position of the tile at `index` on a board of `tile_count` tiles.
    #[must_use]
    pub fn tile_position(&self, index: usize, tile_count: usize) -> Option<WorldPoint> {
        if self.columns == 0 || index >= tile_count {
            return None;
        }

        let columns = usize::try_from(self.columns).ok()?;
        let rows = tile_count.div_ceil(columns);
        let pitch = self.tile_size + self.spacing;
        let total_width = columns as f32 * pitch - self.spacing;
        let total_height = rows as f32 * pitch - self.spacing;
        let offset_x = -total_width / 2.0 + self.tile_size / 2.0;
        let offset_y = total_height / 2.0 - self.tile_size / 2.0;

        let column = (index % columns) as f32;
        let row = (index / columns) as f32;
        Some(WorldPoint::new(
            offset_x + column * pitch,
            offset_y - row * pitch,
        ))
    }
}

/// Fixed-length sequence of tiles. Only tile levels change after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Board {
    tiles: Vec<Tile>,
    layout: BoardLayout,
}

impl Board {
    /// Creates a board from explicit tiles.
    #[must_use]
    pub fn from_tiles(tiles: Vec<Tile>, layout: BoardLayout) -> Self {
        Self { tiles, layout }
    }

    /// Generates a board whose tile kinds are drawn uniformly from `palette`.
    ///
    /// An empty palette produces a board of empty tiles.
    pub fn generate(
        size: usize,
        palette: &[TileKind],
        layout: BoardLayout,
        random: &mut dyn RandomSource,
    ) -> Self {
        let tiles = (0..size)
            .map(|_| {
                let kind = random
                    .index(palette.len())
                    .and_then(|index| palette.get(index).copied())
                    .unwrap_or(TileKind::Empty);
                Tile::new(kind)
            })
            .collect();
        Self { tiles, layout }
    }

    /// Number of tiles on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Reports whether the board is degenerate.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tile stored at the provided index.
    #[must_use]
    pub fn tile(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    /// Mutable access to the tile stored at the provided index.
    pub fn tile_mut(&mut self, index: usize) -> Option<&mut Tile> {
        self.tiles.get_mut(index)
    }

    /// Iterator over all tiles in board order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Geometry used to position tiles in world space.
    #[must_use]
    pub const fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    /// Moves `steps` tiles forward from `current` without wrapping.
    ///
    /// Overshooting the final tile clamps to it. Returns the landed index and
    /// tile, or `None` when the board has no tiles.
    #[must_use]
    pub fn advance(&self, current: usize, steps: usize) -> Option<(usize, &Tile)> {
        let last = self.tiles.len().checked_sub(1)?;
        let landed = current.saturating_add(steps).min(last);
        self.tiles.get(landed).map(|tile| (landed, tile))
    }

    /// World position of the tile at `index`.
    #[must_use]
    pub fn tile_position(&self, index: usize) -> Option<WorldPoint> {
        self.layout.tile_position(index, self.tiles.len())
    }

    /// World position of the defended base, which is also where enemies spawn.
    #[must_use]
    pub const fn base_position(&self) -> WorldPoint {
        WorldPoint::ORIGIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptedRandom;

    fn board(kinds: &[TileKind]) -> Board {
        Board::from_tiles(
            kinds.iter().copied().map(Tile::new).collect(),
            BoardLayout::default(),
        )
    }

    #[test]
    fn advance_clamps_to_final_tile() {
        let board = board(&[TileKind::Empty; 5]);
        for current in 0..5 {
            for steps in 0..12 {
                let (landed, _) = board.advance(current, steps).expect("board has tiles");
                assert_eq!(landed, (current + steps).min(4));
            }
        }
    }

    #[test]
    fn advance_returns_landed_tile() {
        let board = board(&[TileKind::Empty, TileKind::Heal, TileKind::Weapon]);
        let (landed, tile) = board.advance(0, 1).expect("board has tiles");
        assert_eq!(landed, 1);
        assert_eq!(tile.kind(), TileKind::Heal);
    }

    #[test]
    fn single_tile_board_always_lands_on_first_tile() {
        let board = board(&[TileKind::Empty]);
        for steps in 1..=6 {
            assert_eq!(board.advance(0, steps).map(|(index, _)| index), Some(0));
        }
    }

    #[test]
    fn empty_board_fails_closed() {
        let board = board(&[]);
        assert!(board.advance(0, 3).is_none());
        assert!(board.tile_position(0).is_none());
    }

    #[test]
    fn upgradeable_tiles_start_at_level_zero() {
        assert_eq!(Tile::new(TileKind::Weapon).level(), Some(0));
        assert_eq!(Tile::new(TileKind::Skill).level(), Some(0));
        assert_eq!(Tile::new(TileKind::Heal).level(), None);
    }

    #[test]
    fn upgrade_stops_at_cap() {
        let mut tile = Tile::new(TileKind::Weapon);
        for expected in 1..=MAX_TILE_LEVEL {
            assert_eq!(tile.upgrade(), Some(expected));
        }
        assert!(tile.is_capped());
        assert_eq!(tile.upgrade(), None);
        assert_eq!(tile.level(), Some(MAX_TILE_LEVEL));

        let mut plain = Tile::new(TileKind::Empty);
        assert_eq!(plain.upgrade(), None);
    }

    #[test]
    fn layout_centres_grid_on_origin() {
        let layout = BoardLayout {
            columns: 2,
            tile_size: 10.0,
            spacing: 2.0,
        };
        let first = layout.tile_position(0, 4).expect("in range");
        let last = layout.tile_position(3, 4).expect("in range");
        assert!((first.x() + 6.0).abs() < 1e-4);
        assert!((first.y() - 6.0).abs() < 1e-4);
        assert!((last.x() - 6.0).abs() < 1e-4);
        assert!((last.y() + 6.0).abs() < 1e-4);
        assert!(layout.tile_position(4, 4).is_none());
    }

    #[test]
    fn generation_draws_from_palette() {
        let mut random = ScriptedRandom::new([0, 1, 2, 1]);
        let palette = [TileKind::Heal, TileKind::Buff, TileKind::Dice];
        let board = Board::generate(4, &palette, BoardLayout::default(), &mut random);
        let kinds: Vec<TileKind> = board.tiles().map(Tile::kind).collect();
        assert_eq!(
            kinds,
            vec![TileKind::Heal, TileKind::Buff, TileKind::Dice, TileKind::Buff]
        );
    }

    #[test]
    fn tile_round_trips_through_bincode() {
        let mut tile = Tile::new(TileKind::Skill);
        let _ = tile.upgrade();
        let bytes = bincode::serialize(&tile).expect("serialize");
        let restored: Tile = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, tile);
    }
}
