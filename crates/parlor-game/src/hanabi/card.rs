use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Yellow,
    Green,
    Blue,
    White,
}

impl Color {
    pub const ALL: [Color; 5] = [
        Color::Red,
        Color::Yellow,
        Color::Green,
        Color::Blue,
        Color::White,
    ];
}

/// Copies of each number per color. 3 + 2 + 2 + 2 + 1 = 10 cards a color.
pub const COPIES: [(u8, usize); 5] = [(1, 3), (2, 2), (3, 2), (4, 2), (5, 1)];

pub const MAX_NUMBER: u8 = 5;

/// A card in a hand, the deck or the discard pile.
///
/// The `*_known` flags record what the holder has been told by hints.
/// Everyone else can see the card regardless; the flags only ever go
/// from `false` to `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub color: Color,
    pub number: u8,
    #[serde(default)]
    pub color_known: bool,
    #[serde(default)]
    pub number_known: bool,
}

impl Card {
    pub fn new(color: Color, number: u8) -> Self {
        Self {
            color,
            number,
            color_known: false,
            number_known: false,
        }
    }
}

/// The 50-card deck, unshuffled.
pub fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(50);
    for color in Color::ALL {
        for (number, copies) in COPIES {
            deck.extend(std::iter::repeat_n(Card::new(color, number), copies));
        }
    }
    deck
}
