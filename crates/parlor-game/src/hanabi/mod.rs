//! Hanabi: cooperative fireworks with hidden hands.
//!
//! Players see everyone's cards except their own, and spend a shared pool
//! of hint tokens telling each other what they hold. Misplays burn miss
//! tokens; three and the game is lost.

mod action;
mod card;
mod engine;
mod state;
mod view;

pub use action::{HanabiAction, Hint};
pub use card::{COPIES, Card, Color, MAX_NUMBER, full_deck};
pub use engine::HanabiEngine;
pub use state::{
    HanabiState, MAX_HINT_TOKENS, MAX_MISS_TOKENS, MAX_PLAYERS, MAX_SCORE, MIN_PLAYERS,
    OverReason,
};
pub use view::{CardView, HandView, PlayerView};
