//! Per-player projections of the table.
//!
//! A Hanabi player never sees their own cards. Their view of their own
//! hand keeps the hint flags but blanks color and number, whatever the
//! flags say; the client renders hinted facts from its own hint log.
//! Everyone else's cards are shown as they are.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::card::{Card, Color};
use super::state::{HanabiState, OverReason};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub color: Option<Color>,
    pub number: Option<u8>,
    pub color_known: bool,
    pub number_known: bool,
}

impl CardView {
    fn hidden(card: &Card) -> Self {
        Self {
            color: None,
            number: None,
            color_known: card.color_known,
            number_known: card.number_known,
        }
    }

    fn shown(card: &Card) -> Self {
        Self {
            color: Some(card.color),
            number: Some(card.number),
            color_known: card.color_known,
            number_known: card.number_known,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandView {
    pub player_id: String,
    pub cards: Vec<CardView>,
}

/// The table as one player sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub viewer: String,
    pub hands: Vec<HandView>,
    pub fireworks: BTreeMap<Color, u8>,
    pub hint_tokens: u8,
    pub miss_tokens: u8,
    pub deck_count: usize,
    pub discard_pile: Vec<Card>,
    pub turn: usize,
    pub current_player: Option<String>,
    pub last_player: usize,
    pub started: bool,
    pub over: bool,
    pub over_reason: Option<OverReason>,
    pub score: u32,
}

impl PlayerView {
    /// Projects `state` for `viewer`. `None` if the viewer isn't seated.
    pub fn project(state: &HanabiState, viewer: &str) -> Option<Self> {
        state.seat_of(viewer)?;
        let hands = state
            .players
            .iter()
            .zip(&state.hands)
            .map(|(player, hand)| HandView {
                player_id: player.clone(),
                cards: hand
                    .iter()
                    .map(|card| {
                        if player == viewer {
                            CardView::hidden(card)
                        } else {
                            CardView::shown(card)
                        }
                    })
                    .collect(),
            })
            .collect();

        Some(Self {
            viewer: viewer.to_owned(),
            hands,
            fireworks: state.fireworks.clone(),
            hint_tokens: state.hint_tokens,
            miss_tokens: state.miss_tokens,
            deck_count: state.deck.len(),
            discard_pile: state.discard_pile.clone(),
            turn: state.turn,
            current_player: state.current_player().map(str::to_owned),
            last_player: state.last_player,
            started: state.started,
            over: state.over,
            over_reason: state.over_reason,
            score: state.score(),
        })
    }
}
