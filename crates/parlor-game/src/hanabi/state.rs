//! The persisted Hanabi table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::card::{Card, Color, MAX_NUMBER};

pub const MAX_HINT_TOKENS: u8 = 8;
pub const MAX_MISS_TOKENS: u8 = 3;
/// Five colors, each stacked to 5.
pub const MAX_SCORE: u32 = 25;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 5;

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverReason {
    /// The third misplay used the last miss token.
    OutOfMisses,
    /// Every firework reached 5.
    AllFireworks,
    /// The draw pile ran out and the final round completed.
    DeckExhausted,
}

impl OverReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OutOfMisses => "out_of_misses",
            Self::AllFireworks => "all_fireworks",
            Self::DeckExhausted => "deck_exhausted",
        }
    }
}

/// Everything needed to resume a game.
///
/// `hands[i]` belongs to `players[i]`; seat `i` acts when `turn == i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HanabiState {
    pub players: Vec<String>,
    pub hands: Vec<Vec<Card>>,
    pub fireworks: BTreeMap<Color, u8>,
    pub hint_tokens: u8,
    pub miss_tokens: u8,
    pub deck: Vec<Card>,
    pub discard_pile: Vec<Card>,
    pub turn: usize,
    /// The seat whose turn closes the game once the deck is empty.
    pub last_player: usize,
    pub started: bool,
    pub over: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub over_reason: Option<OverReason>,
}

impl HanabiState {
    /// An undealt table for `players`.
    pub fn new(players: Vec<String>) -> Self {
        let hands = vec![Vec::new(); players.len()];
        Self {
            players,
            hands,
            fireworks: Color::ALL.into_iter().map(|c| (c, 0)).collect(),
            hint_tokens: MAX_HINT_TOKENS,
            miss_tokens: MAX_MISS_TOKENS,
            deck: Vec::new(),
            discard_pile: Vec::new(),
            turn: 0,
            last_player: 0,
            started: false,
            over: false,
            over_reason: None,
        }
    }

    /// 5 cards each for 2–3 players, 4 for more.
    pub fn hand_size(players: usize) -> usize {
        if players <= 3 { 5 } else { 4 }
    }

    /// Sum of all fireworks, 0..=25.
    pub fn score(&self) -> u32 {
        self.fireworks.values().map(|&n| u32::from(n.min(MAX_NUMBER))).sum()
    }

    pub fn firework(&self, color: Color) -> u8 {
        self.fireworks.get(&color).copied().unwrap_or(0)
    }

    pub fn seat_of(&self, player: &str) -> Option<usize> {
        self.players.iter().position(|p| p == player)
    }

    pub fn current_player(&self) -> Option<&str> {
        self.players.get(self.turn).map(String::as_str)
    }
}
