//! Spotlink — connect-the-spots tile puzzle core.
//!
//! A [`Board`] owns a grid of coloured [`Tile`]s and the chain the player is
//! dragging. Hosts feed it press/drag/release events and a periodic tick, and
//! observe [`BoardEvent`]s to draw what happened.

pub mod board;
pub mod config;
pub mod events;
pub mod tile;

pub use board::{Board, Release};
pub use config::{BoardConfig, ConfigError};
pub use events::{BoardEvent, BoardObserver};
pub use tile::{Kind, Motion, Position, Tile, TileId};
