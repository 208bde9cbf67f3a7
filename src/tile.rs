//! Tiles ("spots"): kind, grid slot, connection flag, fall motion.

use std::time::Duration;

/// Spot colours. A board is configured with a subset of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Green,
    Yellow,
    Red,
    Blue,
    Magenta,
    Cyan,
}

impl Kind {
    pub const ALL: [Self; 6] = [
        Self::Green,
        Self::Yellow,
        Self::Red,
        Self::Blue,
        Self::Magenta,
        Self::Cyan,
    ];

    /// Colour index 0..6 for theme.spot_color().
    pub fn index(&self) -> u8 {
        match self {
            Self::Green => 0,
            Self::Yellow => 1,
            Self::Red => 2,
            Self::Blue => 3,
            Self::Magenta => 4,
            Self::Cyan => 5,
        }
    }
}

/// Grid slot. Column `x` from the left, row `y` from the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Exactly one step horizontally or vertically, never both.
    pub fn is_adjacent(&self, other: Position) -> bool {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        (dx == 1 && dy == 0) || (dx == 0 && dy == 1)
    }
}

/// Board-unique tile identity, assigned at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub u64);

/// In-flight slide from one display position to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub from: (f32, f32),
    pub to: (f32, f32),
    /// Board clock reading when the slide began.
    pub started: Duration,
}

impl Motion {
    /// Progress in 0.0..=1.0 at board time `now`.
    fn progress(&self, now: Duration, length: Duration) -> f32 {
        if length.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started).as_secs_f32();
        (elapsed / length.as_secs_f32()).min(1.0)
    }

    fn sample(&self, now: Duration, length: Duration) -> (f32, f32) {
        let t = self.progress(now, length);
        (
            self.from.0 + (self.to.0 - self.from.0) * t,
            self.from.1 + (self.to.1 - self.from.1) * t,
        )
    }
}

/// A grid cell's occupant. Its position always matches its grid slot;
/// only the board moves it.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    id: TileId,
    kind: Kind,
    position: Position,
    connected: bool,
    /// Where the host should draw the tile right now (column, row).
    display: (f32, f32),
    motion: Option<Motion>,
}

impl Tile {
    pub(crate) fn new(id: TileId, kind: Kind, position: Position) -> Self {
        Self {
            id,
            kind,
            position,
            connected: false,
            display: (position.x as f32, position.y as f32),
            motion: None,
        }
    }

    /// New tile whose slot is `position` but which starts drawn at `origin_row`
    /// and falls into place.
    pub(crate) fn falling(
        id: TileId,
        kind: Kind,
        position: Position,
        origin_row: usize,
        now: Duration,
        length: Duration,
    ) -> Self {
        let mut tile = Self::new(id, kind, position);
        tile.display = (position.x as f32, origin_row as f32);
        tile.slide_to_slot(now, length);
        tile
    }

    pub fn id(&self) -> TileId {
        self.id
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn x(&self) -> usize {
        self.position.x
    }

    pub fn y(&self) -> usize {
        self.position.y
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_animating(&self) -> bool {
        self.motion.is_some()
    }

    pub fn display_position(&self) -> (f32, f32) {
        self.display
    }

    pub fn motion(&self) -> Option<&Motion> {
        self.motion.as_ref()
    }

    pub(crate) fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    #[cfg(test)]
    pub(crate) fn set_kind(&mut self, kind: Kind) {
        self.kind = kind;
    }

    /// Change the logical slot and start sliding toward it.
    pub(crate) fn relocate(&mut self, position: Position, now: Duration, length: Duration) {
        self.position = position;
        self.slide_to_slot(now, length);
    }

    /// Start a fresh slide from wherever the tile is drawn now. Any previous
    /// slide is abandoned.
    fn slide_to_slot(&mut self, now: Duration, length: Duration) {
        let to = (self.position.x as f32, self.position.y as f32);
        if length.is_zero() || self.display == to {
            self.display = to;
            self.motion = None;
            return;
        }
        self.motion = Some(Motion {
            from: self.display,
            to,
            started: now,
        });
    }

    /// Advance the slide to board time `now`. Returns true while still moving.
    pub(crate) fn advance(&mut self, now: Duration, length: Duration) -> bool {
        let Some(motion) = self.motion else {
            return false;
        };
        self.display = motion.sample(now, length);
        if motion.progress(now, length) >= 1.0 {
            self.display = motion.to;
            self.motion = None;
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEN: Duration = Duration::from_millis(100);

    #[test]
    fn test_adjacency_is_orthogonal_only() {
        let p = Position::new(2, 2);
        assert!(p.is_adjacent(Position::new(3, 2)));
        assert!(p.is_adjacent(Position::new(1, 2)));
        assert!(p.is_adjacent(Position::new(2, 3)));
        assert!(p.is_adjacent(Position::new(2, 1)));
        assert!(!p.is_adjacent(p));
        assert!(!p.is_adjacent(Position::new(3, 3)));
        assert!(!p.is_adjacent(Position::new(4, 2)));
    }

    #[test]
    fn test_kind_indices_unique() {
        let mut seen: Vec<u8> = Kind::ALL.iter().map(Kind::index).collect();
        seen.dedup();
        assert_eq!(seen.len(), Kind::ALL.len());
    }

    #[test]
    fn test_falling_tile_interpolates_and_settles() {
        let mut tile = Tile::falling(
            TileId(1),
            Kind::Red,
            Position::new(0, 5),
            7,
            Duration::ZERO,
            LEN,
        );
        assert_eq!(tile.position(), Position::new(0, 5));
        assert_eq!(tile.display_position(), (0.0, 7.0));
        assert!(tile.is_animating());

        assert!(tile.advance(Duration::from_millis(50), LEN));
        let (_, row) = tile.display_position();
        assert!((row - 6.0).abs() < 1e-4, "row {}", row);

        assert!(!tile.advance(Duration::from_millis(100), LEN));
        assert_eq!(tile.display_position(), (0.0, 5.0));
        assert!(!tile.is_animating());
    }

    #[test]
    fn test_retarget_restarts_from_current_position() {
        let mut tile = Tile::new(TileId(1), Kind::Blue, Position::new(1, 4));
        tile.relocate(Position::new(1, 2), Duration::ZERO, LEN);
        tile.advance(Duration::from_millis(50), LEN);
        let (_, mid) = tile.display_position();
        assert!((mid - 3.0).abs() < 1e-4);

        tile.relocate(Position::new(1, 0), Duration::from_millis(50), LEN);
        let motion = tile.motion().copied();
        assert_eq!(
            motion,
            Some(Motion {
                from: (1.0, mid),
                to: (1.0, 0.0),
                started: Duration::from_millis(50),
            })
        );
        tile.advance(Duration::from_millis(150), LEN);
        assert_eq!(tile.display_position(), (1.0, 0.0));
    }

    #[test]
    fn test_zero_length_places_instantly() {
        let tile = Tile::falling(
            TileId(3),
            Kind::Cyan,
            Position::new(2, 6),
            8,
            Duration::ZERO,
            Duration::ZERO,
        );
        assert!(!tile.is_animating());
        assert_eq!(tile.display_position(), (2.0, 6.0));
    }
}
