use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which game a room plays.
///
/// Rooms carry this tag; the game layer maps it to a concrete engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Hanabi,
}

impl GameMode {
    /// The tag as it appears on the wire and in store keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hanabi => "hanabi",
        }
    }

    /// Largest table the mode's engine will start a game with. Rooms
    /// never allow more seats than this.
    pub fn max_players(self) -> usize {
        match self {
            Self::Hanabi => 5,
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a client names a mode this server doesn't run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported game mode `{0}`")]
pub struct UnsupportedMode(pub String);

impl FromStr for GameMode {
    type Err = UnsupportedMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hanabi" => Ok(Self::Hanabi),
            _ => Err(UnsupportedMode(s.to_owned())),
        }
    }
}
