//! Notifications the board sends to whoever renders it.

use crate::tile::{Kind, Position, Tile, TileId};

#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    /// `tile` joined the chain; `previous` is the old tail, if any, so the
    /// host can draw a link between the two.
    TileConnected {
        tile: TileId,
        position: Position,
        previous: Option<Position>,
    },
    /// The chain tail was popped.
    TileDisconnected { tile: TileId, position: Position },
    /// The chain closed a 2x2 loop; releasing now wipes every `kind` tile.
    SquareClosed { kind: Kind },
    /// The chain was dropped without clearing anything.
    SelectionCleared,
    /// Tiles removed from the grid, as they were just before removal.
    TilesCleared { tiles: Vec<Tile> },
    /// A surviving tile fell to a new slot.
    TileRelocated {
        tile: TileId,
        from: Position,
        to: Position,
    },
    /// A refill tile was created at `position` and should be drawn falling
    /// from `origin_row`.
    TileCreated {
        tile: TileId,
        position: Position,
        origin_row: usize,
    },
}

pub trait BoardObserver {
    fn notify(&mut self, event: &BoardEvent);
}

impl<F> BoardObserver for F
where
    F: FnMut(&BoardEvent),
{
    fn notify(&mut self, event: &BoardEvent) {
        self(event);
    }
}
