//! The Hanabi state machine.
//!
//! ```text
//!   Not started ──start_game──→ Playing ──(misses = 0
//!                                  │       | score = 25
//!                                  │       | deck empty and round done)──→ Over
//!                                  ↺ give_hint / play_card / discard / end_turn
//! ```
//!
//! Only the player whose turn it is may act. Hints, plays and discards do
//! not move the turn; `end_turn` does. The over conditions are checked
//! after every action.

use async_trait::async_trait;
use parlor_protocol::GameMode;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::action::{HanabiAction, Hint};
use super::card::{Card, MAX_NUMBER, full_deck};
use super::state::{
    HanabiState, MAX_HINT_TOKENS, MAX_MISS_TOKENS, MAX_PLAYERS, MAX_SCORE, MIN_PLAYERS,
    OverReason,
};
use super::view::PlayerView;
use crate::{GameEngine, GameError, GameInfo};

pub struct HanabiEngine {
    state: HanabiState,
    rng: StdRng,
}

impl HanabiEngine {
    /// A new, undealt game seated in `players` order.
    pub fn new(players: Vec<String>) -> Self {
        Self::with_rng(players, StdRng::from_os_rng())
    }

    /// Like [`new`](Self::new) with a caller-supplied shuffle source.
    pub fn with_rng(players: Vec<String>, rng: StdRng) -> Self {
        Self {
            state: HanabiState::new(players),
            rng,
        }
    }

    /// Resumes a persisted game.
    pub fn restore(state: HanabiState) -> Self {
        Self {
            state,
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn into_state(self) -> HanabiState {
        self.state
    }

    fn give_hint(&mut self, seat: usize, target: &str, hint: Hint) -> Result<(), GameError> {
        let target_seat = self
            .state
            .seat_of(target)
            .filter(|&t| t != seat)
            .ok_or_else(|| GameError::InvalidHintTarget(target.to_owned()))?;
        if let Hint::Number(n) = hint {
            if !(1..=MAX_NUMBER).contains(&n) {
                return Err(GameError::InvalidAction(format!("no cards numbered {n}")));
            }
        }

        for card in &mut self.state.hands[target_seat] {
            match hint {
                Hint::Color(c) if card.color == c => card.color_known = true,
                Hint::Number(n) if card.number == n => card.number_known = true,
                _ => {}
            }
        }
        self.state.hint_tokens = self.state.hint_tokens.saturating_sub(1);
        Ok(())
    }

    fn play_card(&mut self, seat: usize, index: usize) -> Result<(), GameError> {
        let card = self.take_card(seat, index)?;
        let stack = self.state.firework(card.color);
        if card.number == stack + 1 {
            self.state.fireworks.insert(card.color, card.number);
            if card.number == MAX_NUMBER {
                self.refund_hint();
            }
        } else {
            self.state.discard_pile.push(card);
            self.state.miss_tokens = self.state.miss_tokens.saturating_sub(1);
        }
        self.draw(seat);
        Ok(())
    }

    fn discard(&mut self, seat: usize, index: usize) -> Result<(), GameError> {
        let card = self.take_card(seat, index)?;
        self.state.discard_pile.push(card);
        self.refund_hint();
        self.draw(seat);
        Ok(())
    }

    fn end_turn(&mut self) {
        let n = self.state.players.len();
        self.state.turn = (self.state.turn + 1) % n;
        if self.state.deck.is_empty() && self.state.turn == (self.state.last_player + 1) % n {
            self.finish(OverReason::DeckExhausted);
        }
    }

    fn take_card(&mut self, seat: usize, index: usize) -> Result<Card, GameError> {
        let hand = &mut self.state.hands[seat];
        if index >= hand.len() {
            return Err(GameError::InvalidCardIndex(index));
        }
        Ok(hand.remove(index))
    }

    fn draw(&mut self, seat: usize) {
        if let Some(card) = self.state.deck.pop() {
            self.state.hands[seat].push(card);
        }
    }

    fn refund_hint(&mut self) {
        self.state.hint_tokens = (self.state.hint_tokens + 1).min(MAX_HINT_TOKENS);
    }

    fn check_over(&mut self) {
        if self.state.over {
            return;
        }
        if self.state.miss_tokens == 0 {
            self.finish(OverReason::OutOfMisses);
        } else if self.state.score() >= MAX_SCORE {
            self.finish(OverReason::AllFireworks);
        }
    }

    fn finish(&mut self, reason: OverReason) {
        self.state.over = true;
        self.state.over_reason = Some(reason);
        tracing::debug!(reason = reason.as_str(), score = self.state.score(), "hanabi game over");
    }
}

#[async_trait]
impl GameEngine for HanabiEngine {
    type State = HanabiState;
    type Action = HanabiAction;
    type View = PlayerView;

    fn mode(&self) -> GameMode {
        GameMode::Hanabi
    }

    fn players(&self) -> &[String] {
        &self.state.players
    }

    fn start_game(&mut self) -> Result<(), GameError> {
        if self.state.started {
            return Err(GameError::AlreadyStarted);
        }
        let n = self.state.players.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&n) {
            return Err(GameError::PlayerCount {
                mode: GameMode::Hanabi.as_str(),
                min: MIN_PLAYERS,
                max: MAX_PLAYERS,
                actual: n,
            });
        }

        let mut deck = full_deck();
        deck.shuffle(&mut self.rng);
        let hand_size = HanabiState::hand_size(n);
        let hands = (0..n)
            .map(|_| deck.split_off(deck.len() - hand_size))
            .collect();

        let players = std::mem::take(&mut self.state.players);
        self.state = HanabiState {
            hands,
            deck,
            hint_tokens: MAX_HINT_TOKENS,
            miss_tokens: MAX_MISS_TOKENS,
            turn: 0,
            last_player: n - 1,
            started: true,
            ..HanabiState::new(players)
        };
        Ok(())
    }

    fn handle_event(&mut self, actor: &str, action: HanabiAction) -> Result<(), GameError> {
        if !self.state.started {
            return Err(GameError::NotStarted);
        }
        if self.state.over {
            return Err(GameError::Over);
        }
        let seat = self
            .state
            .seat_of(actor)
            .ok_or_else(|| GameError::NotAPlayer(actor.to_owned()))?;
        if seat != self.state.turn {
            return Err(GameError::NotYourTurn {
                expected: self.state.players[self.state.turn].clone(),
                actual: actor.to_owned(),
            });
        }

        match action {
            HanabiAction::GiveHint { target_player, hint } => {
                self.give_hint(seat, &target_player, hint)?
            }
            HanabiAction::PlayCard { card_index } => self.play_card(seat, card_index)?,
            HanabiAction::Discard { card_index } => self.discard(seat, card_index)?,
            HanabiAction::EndTurn => self.end_turn(),
        }
        self.check_over();
        Ok(())
    }

    fn is_game_over(&self) -> bool {
        self.state.over
    }

    fn state(&self) -> &HanabiState {
        &self.state
    }

    fn view_for(&self, viewer: &str) -> Option<PlayerView> {
        PlayerView::project(&self.state, viewer)
    }

    fn info(&self) -> GameInfo {
        GameInfo {
            mode: GameMode::Hanabi,
            players: self.state.players.clone(),
            started: self.state.started,
            over: self.state.over,
            score: self.state.score(),
            current_player: self
                .state
                .started
                .then(|| self.state.current_player().map(str::to_owned))
                .flatten(),
            over_reason: self.state.over_reason.map(|r| r.as_str().to_owned()),
            table: serde_json::json!({
                "fireworks": self.state.fireworks,
                "hintTokens": self.state.hint_tokens,
                "missTokens": self.state.miss_tokens,
                "deckCount": self.state.deck.len(),
                "discardCount": self.state.discard_pile.len(),
                "turn": self.state.turn,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hanabi::card::Color;

    fn players(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("p{i}")).collect()
    }

    fn started(n: usize, seed: u64) -> HanabiEngine {
        let mut e = HanabiEngine::with_rng(players(n), StdRng::seed_from_u64(seed));
        e.start_game().unwrap();
        e
    }

    #[test]
    fn test_start_game_deals_by_player_count() {
        for (n, size) in [(2, 5), (3, 5), (4, 4), (5, 4)] {
            let e = started(n, 7);
            let s = e.state();
            assert!(s.hands.iter().all(|h| h.len() == size), "{n} players");
            assert_eq!(s.deck.len(), 50 - n * size);
            assert_eq!(s.last_player, n - 1);
        }
    }

    #[test]
    fn test_start_game_twice_fails() {
        let mut e = started(2, 1);
        assert!(matches!(e.start_game(), Err(GameError::AlreadyStarted)));
    }

    #[test]
    fn test_start_game_rejects_solo_and_crowds() {
        let mut solo = HanabiEngine::new(players(1));
        assert!(matches!(solo.start_game(), Err(GameError::PlayerCount { actual: 1, .. })));
        let mut crowd = HanabiEngine::new(players(6));
        assert!(matches!(crowd.start_game(), Err(GameError::PlayerCount { actual: 6, .. })));
    }

    #[test]
    fn test_room_seat_limit_matches_engine() {
        assert_eq!(GameMode::Hanabi.max_players(), MAX_PLAYERS);
        assert!(HanabiEngine::new(players(MAX_PLAYERS)).start_game().is_ok());
    }

    #[test]
    fn test_same_seed_same_deal() {
        assert_eq!(started(3, 42).state(), started(3, 42).state());
    }

    #[test]
    fn test_action_before_start_is_not_started() {
        let mut e = HanabiEngine::new(players(2));
        let err = e.handle_event("p0", HanabiAction::EndTurn).unwrap_err();
        assert!(matches!(err, GameError::NotStarted));
    }

    #[test]
    fn test_out_of_turn_action_is_rejected_without_change() {
        let mut e = started(2, 3);
        let before = e.state().clone();
        let err = e
            .handle_event("p1", HanabiAction::Discard { card_index: 0 })
            .unwrap_err();
        assert!(matches!(err, GameError::NotYourTurn { .. }));
        assert_eq!(e.state(), &before);
    }

    #[test]
    fn test_stranger_is_not_a_player() {
        let mut e = started(2, 3);
        let err = e.handle_event("zed", HanabiAction::EndTurn).unwrap_err();
        assert!(matches!(err, GameError::NotAPlayer(_)));
    }

    #[test]
    fn test_hint_self_is_invalid_target() {
        let mut e = started(2, 3);
        let err = e
            .handle_event(
                "p0",
                HanabiAction::GiveHint { target_player: "p0".into(), hint: Hint::Number(1) },
            )
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidHintTarget(_)));
        assert_eq!(e.state().hint_tokens, 8);
    }

    #[test]
    fn test_hint_number_out_of_range_is_invalid_action() {
        let mut e = started(2, 3);
        let err = e
            .handle_event(
                "p0",
                HanabiAction::GiveHint { target_player: "p1".into(), hint: Hint::Number(9) },
            )
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidAction(_)));
    }

    #[test]
    fn test_bad_card_index_leaves_hand_alone() {
        let mut e = started(2, 3);
        let err = e
            .handle_event("p0", HanabiAction::PlayCard { card_index: 5 })
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidCardIndex(5)));
        assert_eq!(e.state().hands[0].len(), 5);
    }

    #[test]
    fn test_end_turn_rotates() {
        let mut e = started(3, 3);
        e.handle_event("p0", HanabiAction::EndTurn).unwrap();
        assert_eq!(e.state().turn, 1);
        e.handle_event("p1", HanabiAction::EndTurn).unwrap();
        e.handle_event("p2", HanabiAction::EndTurn).unwrap();
        assert_eq!(e.state().turn, 0);
        assert!(!e.is_game_over());
    }

    #[test]
    fn test_discard_refunds_hint_and_draws() {
        let mut e = started(2, 3);
        e.state.hint_tokens = 5;
        let deck_before = e.state().deck.len();

        e.handle_event("p0", HanabiAction::Discard { card_index: 0 }).unwrap();

        assert_eq!(e.state().hint_tokens, 6);
        assert_eq!(e.state().discard_pile.len(), 1);
        assert_eq!(e.state().hands[0].len(), 5, "replacement drawn");
        assert_eq!(e.state().deck.len(), deck_before - 1);
    }

    #[test]
    fn test_discard_at_full_tokens_stays_capped() {
        let mut e = started(2, 3);
        e.handle_event("p0", HanabiAction::Discard { card_index: 0 }).unwrap();
        assert_eq!(e.state().hint_tokens, 8);
    }

    #[test]
    fn test_completing_a_five_refunds_hint() {
        let mut e = started(2, 3);
        e.state.fireworks.insert(Color::Blue, 4);
        e.state.hands[0][0] = Card::new(Color::Blue, 5);
        e.state.hint_tokens = 2;

        e.handle_event("p0", HanabiAction::PlayCard { card_index: 0 }).unwrap();

        assert_eq!(e.state().firework(Color::Blue), 5);
        assert_eq!(e.state().hint_tokens, 3);
        assert_eq!(e.state().miss_tokens, 3);
    }

    #[test]
    fn test_no_draw_from_empty_deck() {
        let mut e = started(2, 3);
        e.state.deck.clear();
        e.handle_event("p0", HanabiAction::Discard { card_index: 0 }).unwrap();
        assert_eq!(e.state().hands[0].len(), 4);
    }

    #[test]
    fn test_actions_after_over_are_rejected() {
        let mut e = started(2, 3);
        e.state.over = true;
        let err = e.handle_event("p0", HanabiAction::EndTurn).unwrap_err();
        assert!(matches!(err, GameError::Over));
    }

    #[test]
    fn test_info_hides_hands() {
        let e = started(2, 3);
        let info = serde_json::to_value(e.info()).unwrap();
        assert_eq!(info["currentPlayer"], "p0");
        assert_eq!(info["table"]["hintTokens"], 8);
        assert!(info.get("hands").is_none());
        assert!(info["table"].get("hands").is_none());
    }
}
