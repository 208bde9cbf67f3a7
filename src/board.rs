//! Board state: grid of tiles, selection chain, clear, collapse, refill.

use crate::config::{BoardConfig, ConfigError};
use crate::events::{BoardEvent, BoardObserver};
use crate::tile::{Kind, Position, Tile, TileId};
use log::{debug, error, info, trace};
use rand::Rng;
use rand::rngs::StdRng;
use std::fmt;
use std::time::Duration;

/// What a release did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Chain of one or none: selection dropped, nothing cleared.
    Cancelled,
    Cleared { count: usize, square: bool },
}

/// Grid of tiles plus the chain the player is dragging.
pub struct Board<R = StdRng> {
    config: BoardConfig,
    /// Column-major: index = x * height + y. `None` only between a clear and
    /// the collapse that follows it.
    slots: Vec<Option<Tile>>,
    /// Drag path, oldest first. A position appears twice only when the
    /// last append closed a square.
    chain: Vec<Position>,
    square_closed: bool,
    /// Chain length right after the square-closing append.
    square_closed_at: Option<usize>,
    next_id: u64,
    /// Sum of all tick deltas; motions are timed against it.
    clock: Duration,
    rng: R,
    observers: Vec<Box<dyn BoardObserver>>,
}

impl<R> fmt::Debug for Board<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("config", &self.config)
            .field("chain", &self.chain)
            .field("square_closed", &self.square_closed)
            .field("clock", &self.clock)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl<R: Rng> Board<R> {
    /// Validate `config` and fill every cell with a random tile.
    /// Nothing is built if the configuration is rejected.
    pub fn new(config: BoardConfig, rng: R) -> Result<Self, ConfigError> {
        Self::with_observers(config, rng, Vec::new())
    }

    /// Like [`Board::new`], but `observers` are attached before the fill and
    /// see a `TileCreated` for every initial tile, in its final slot.
    pub fn with_observers(
        config: BoardConfig,
        rng: R,
        observers: Vec<Box<dyn BoardObserver>>,
    ) -> Result<Self, ConfigError> {
        if let Err(err) = config.validate() {
            error!("board not initialised: {}", err);
            return Err(err);
        }
        let cells = config.width * config.height;
        let mut board = Self {
            config,
            slots: Vec::with_capacity(cells),
            chain: Vec::new(),
            square_closed: false,
            square_closed_at: None,
            next_id: 0,
            clock: Duration::ZERO,
            rng,
            observers,
        };
        for x in 0..board.config.width {
            for y in 0..board.config.height {
                let kind = board.random_kind();
                let id = board.next_tile_id();
                let position = Position::new(x, y);
                board.slots.push(Some(Tile::new(id, kind, position)));
                board.emit(BoardEvent::TileCreated {
                    tile: id,
                    position,
                    origin_row: y,
                });
            }
        }
        info!(
            "board {}x{} filled with {} kinds",
            board.config.width,
            board.config.height,
            board.config.kinds.len()
        );
        Ok(board)
    }

    fn random_kind(&mut self) -> Kind {
        let i = self.rng.gen_range(0..self.config.kinds.len());
        self.config.kinds[i]
    }

    /// Press on a tile. Starts a chain only when none exists and the tile is
    /// not still falling. Returns whether a chain was started.
    pub fn begin_selection(&mut self, pos: Position) -> bool {
        if self.has_chain() {
            return false;
        }
        match self.tile(pos) {
            Some(tile) if !tile.is_animating() => {
                self.connect(pos);
                true
            }
            _ => false,
        }
    }

    /// Drag over a tile: extend the chain, or back up one step.
    pub fn hover(&mut self, pos: Position) {
        if self.can_connect(pos) {
            self.connect(pos);
        } else if self.can_disconnect(pos) {
            self.disconnect_last();
        }
    }

    /// Let go of the drag. Chains of two or more are cleared and the board
    /// collapses; anything shorter just drops the selection.
    pub fn release(&mut self) -> Release {
        if self.chain.len() < 2 {
            self.disconnect_all();
            return Release::Cancelled;
        }
        let square = self.square_closed;
        let kind = self.chain_kind();
        let chain = std::mem::take(&mut self.chain);
        // Cleared tiles leave unlinked.
        for &pos in &chain {
            if let Some(tile) = self.tile_mut(pos) {
                tile.set_connected(false);
            }
        }
        let cleared = match kind {
            Some(kind) if square => self.remove_where(|tile| tile.kind() == kind),
            _ => chain.into_iter().filter_map(|pos| self.remove(pos)).collect(),
        };
        self.square_closed = false;
        self.square_closed_at = None;

        let count = cleared.len();
        debug!("cleared {} tiles (square: {})", count, square);
        self.emit(BoardEvent::TilesCleared { tiles: cleared });
        self.collapse();
        Release::Cleared { count, square }
    }

    /// Advance fall animations by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        self.clock = self.clock.saturating_add(dt);
        let (now, length) = (self.clock, self.config.fall_duration);
        for tile in self.slots.iter_mut().flatten() {
            tile.advance(now, length);
        }
    }

    /// Shift survivors down over empty slots and refill each column from
    /// the top, in one bottom-up pass per column.
    fn collapse(&mut self) {
        let (now, length) = (self.clock, self.config.fall_duration);
        for x in 0..self.config.width {
            let mut empty = 0;
            for y in 0..self.config.height {
                let from = Position::new(x, y);
                let i = self.index(from);
                if self.slots[i].is_none() {
                    empty += 1;
                    continue;
                }
                if empty == 0 {
                    continue;
                }
                let Some(mut tile) = self.slots[i].take() else {
                    continue;
                };
                let to = Position::new(x, y - empty);
                tile.relocate(to, now, length);
                let id = tile.id();
                let j = self.index(to);
                self.slots[j] = Some(tile);
                trace!("tile {:?} falls {:?} -> {:?}", id, from, to);
                self.emit(BoardEvent::TileRelocated { tile: id, from, to });
            }
            self.refill_column(x, empty);
        }
    }

    /// Create `count` tiles in the top rows of column `x`. Each starts drawn
    /// `count` rows above its slot.
    fn refill_column(&mut self, x: usize, count: usize) {
        if count == 0 {
            return;
        }
        let height = self.config.height;
        let (now, length) = (self.clock, self.config.fall_duration);
        for remaining in (1..=count).rev() {
            let position = Position::new(x, height - remaining);
            let origin_row = position.y + count;
            let kind = self.random_kind();
            let id = self.next_tile_id();
            let i = self.index(position);
            self.slots[i] = Some(Tile::falling(id, kind, position, origin_row, now, length));
            self.emit(BoardEvent::TileCreated {
                tile: id,
                position,
                origin_row,
            });
        }
        debug!("column {} refilled with {} tiles", x, count);
    }
}

impl<R> Board<R> {
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn width(&self) -> usize {
        self.config.width
    }

    pub fn height(&self) -> usize {
        self.config.height
    }

    pub fn subscribe(&mut self, observer: Box<dyn BoardObserver>) {
        self.observers.push(observer);
    }

    fn emit(&mut self, event: BoardEvent) {
        for observer in &mut self.observers {
            observer.notify(&event);
        }
    }

    fn next_tile_id(&mut self) -> TileId {
        self.next_id += 1;
        TileId(self.next_id)
    }

    fn in_bounds(&self, pos: Position) -> bool {
        pos.x < self.config.width && pos.y < self.config.height
    }

    fn index(&self, pos: Position) -> usize {
        pos.x * self.config.height + pos.y
    }

    pub fn tile(&self, pos: Position) -> Option<&Tile> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.slots[self.index(pos)].as_ref()
    }

    fn tile_mut(&mut self, pos: Position) -> Option<&mut Tile> {
        if !self.in_bounds(pos) {
            return None;
        }
        let i = self.index(pos);
        self.slots[i].as_mut()
    }

    /// Every tile, column by column from the bottom.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.slots.iter().flatten()
    }

    pub fn chain(&self) -> &[Position] {
        &self.chain
    }

    pub fn has_chain(&self) -> bool {
        !self.chain.is_empty()
    }

    /// Kind of the first chained tile.
    pub fn chain_kind(&self) -> Option<Kind> {
        self.chain
            .first()
            .and_then(|pos| self.tile(*pos))
            .map(Tile::kind)
    }

    pub fn is_square_closed(&self) -> bool {
        self.square_closed
    }

    /// True when no tile is mid-fall.
    pub fn is_settled(&self) -> bool {
        self.tiles().all(|tile| !tile.is_animating())
    }

    /// Appending `pos` would return to the tile three steps back. Judged by
    /// chain order alone, so the tail need not touch `pos`.
    fn completes_square(&self, pos: Position) -> bool {
        let len = self.chain.len();
        len >= 4 && self.chain.iter().position(|p| *p == pos) == Some(len - 4)
    }

    /// Whether `pos` may be appended: it closes a square, or it is a
    /// same-kind orthogonal neighbour of the tail that is not chained yet.
    /// Always false on an empty chain.
    pub fn can_connect(&self, pos: Position) -> bool {
        if self.tile(pos).is_none() {
            return false;
        }
        if self.completes_square(pos) {
            return true;
        }
        let Some(tail) = self.chain.last().copied() else {
            return false;
        };
        if self.chain.contains(&pos) {
            return false;
        }
        match (self.tile(tail), self.tile(pos)) {
            (Some(last), Some(tile)) => last.kind() == tile.kind() && tail.is_adjacent(pos),
            _ => false,
        }
    }

    /// Append `pos` to the chain. Callers check `can_connect` first (or
    /// start a chain); a tile already chained that does not close a square
    /// is ignored.
    pub fn connect(&mut self, pos: Position) {
        let closes_square = self.completes_square(pos);
        if !closes_square && self.chain.contains(&pos) {
            debug!("ignoring connect of already chained {:?}", pos);
            return;
        }
        let previous = self.chain.last().copied();
        let Some(tile) = self.tile_mut(pos) else {
            debug!("ignoring connect of empty slot {:?}", pos);
            return;
        };
        tile.set_connected(true);
        let (id, kind) = (tile.id(), tile.kind());
        self.chain.push(pos);
        debug!("connected {:?} (chain length {})", pos, self.chain.len());
        self.emit(BoardEvent::TileConnected {
            tile: id,
            position: pos,
            previous,
        });
        if closes_square {
            self.square_closed = true;
            self.square_closed_at = Some(self.chain.len());
            debug!("square closed on {:?}", kind);
            self.emit(BoardEvent::SquareClosed { kind });
        }
    }

    /// Backing up is only possible onto the tile right before the tail.
    pub fn can_disconnect(&self, pos: Position) -> bool {
        let len = self.chain.len();
        len >= 2 && self.chain[len - 2] == pos
    }

    /// Pop the chain tail.
    pub fn disconnect_last(&mut self) {
        let Some(pos) = self.chain.pop() else {
            return;
        };
        if self
            .square_closed_at
            .is_some_and(|at| self.chain.len() < at)
        {
            self.square_closed = false;
            self.square_closed_at = None;
        }
        let still_chained = self.chain.contains(&pos);
        let Some(tile) = self.tile_mut(pos) else {
            return;
        };
        if !still_chained {
            tile.set_connected(false);
        }
        let id = tile.id();
        debug!("disconnected {:?} (chain length {})", pos, self.chain.len());
        self.emit(BoardEvent::TileDisconnected {
            tile: id,
            position: pos,
        });
    }

    /// Drop the whole chain. No-op on an empty chain.
    pub fn disconnect_all(&mut self) {
        if self.chain.is_empty() {
            return;
        }
        let chain = std::mem::take(&mut self.chain);
        for pos in chain {
            if let Some(tile) = self.tile_mut(pos) {
                tile.set_connected(false);
            }
        }
        self.square_closed = false;
        self.square_closed_at = None;
        self.emit(BoardEvent::SelectionCleared);
    }

    fn remove(&mut self, pos: Position) -> Option<Tile> {
        if !self.in_bounds(pos) {
            return None;
        }
        let i = self.index(pos);
        self.slots[i].take()
    }

    fn remove_where(&mut self, pred: impl Fn(&Tile) -> bool) -> Vec<Tile> {
        let mut removed = Vec::new();
        for slot in &mut self.slots {
            if slot.as_ref().is_some_and(&pred) {
                removed.extend(slot.take());
            }
        }
        removed
    }
}
