//! Board configuration: dimensions, kind set, fall animation length.

use crate::tile::Kind;
use std::time::Duration;
use thiserror::Error;

pub const MIN_WIDTH: usize = 4;
pub const MAX_WIDTH: usize = 15;
pub const MIN_HEIGHT: usize = 4;
pub const MAX_HEIGHT: usize = 8;

/// Default time a tile takes to slide into its slot after a collapse or refill.
pub const DEFAULT_FALL_DURATION: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error(
        "board dimensions {}x{} out of range (width {}..={}, height {}..={})",
        .width, .height, MIN_WIDTH, MAX_WIDTH, MIN_HEIGHT, MAX_HEIGHT
    )]
    InvalidDimensions { width: usize, height: usize },
    #[error("at least one tile kind must be configured")]
    EmptyKindSet,
    #[error("tile kind {0:?} configured more than once")]
    DuplicateKind(Kind),
}

/// Everything the host chooses before a board exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub width: usize,
    pub height: usize,
    /// Kinds new tiles are drawn from, uniformly.
    pub kinds: Vec<Kind>,
    pub fall_duration: Duration,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: 6,
            height: 6,
            kinds: Kind::ALL[..4].to_vec(),
            fall_duration: DEFAULT_FALL_DURATION,
        }
    }
}

impl BoardConfig {
    pub fn new(width: usize, height: usize, kinds: Vec<Kind>, fall_duration: Duration) -> Self {
        Self {
            width,
            height,
            kinds,
            fall_duration,
        }
    }

    /// Check dimensions and kind set. The first problem found is reported.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let width_ok = (MIN_WIDTH..=MAX_WIDTH).contains(&self.width);
        let height_ok = (MIN_HEIGHT..=MAX_HEIGHT).contains(&self.height);
        if !width_ok || !height_ok {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.kinds.is_empty() {
            return Err(ConfigError::EmptyKindSet);
        }
        for (i, kind) in self.kinds.iter().enumerate() {
            if self.kinds[..i].contains(kind) {
                return Err(ConfigError::DuplicateKind(*kind));
            }
        }
        Ok(())
    }
}
