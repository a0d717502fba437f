use serde::{Deserialize, Serialize};

use super::card::Color;

/// What a hint names: every card of one color, or of one number.
///
/// Wire form: `{"color": "red"}` or `{"number": 3}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hint {
    Color(Color),
    Number(u8),
}

/// One player action, the `data` of a `game.action` event.
///
/// ```json
/// { "action": "give_hint", "targetPlayer": "s-2", "hint": { "color": "red" } }
/// { "action": "play_card", "cardIndex": 0 }
/// { "action": "discard", "cardIndex": 3 }
/// { "action": "end_turn" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum HanabiAction {
    GiveHint { target_player: String, hint: Hint },
    PlayCard { card_index: usize },
    Discard { card_index: usize },
    EndTurn,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_give_hint() {
        let a: HanabiAction = serde_json::from_value(json!({
            "action": "give_hint",
            "targetPlayer": "s2",
            "hint": { "color": "red" }
        }))
        .unwrap();
        assert_eq!(
            a,
            HanabiAction::GiveHint { target_player: "s2".into(), hint: Hint::Color(Color::Red) }
        );
    }

    #[test]
    fn test_decode_number_hint() {
        let a: HanabiAction = serde_json::from_value(json!({
            "action": "give_hint",
            "targetPlayer": "s2",
            "hint": { "number": 4 }
        }))
        .unwrap();
        assert!(matches!(a, HanabiAction::GiveHint { hint: Hint::Number(4), .. }));
    }

    #[test]
    fn test_decode_end_turn_ignores_room_hint() {
        let a: HanabiAction =
            serde_json::from_value(json!({ "action": "end_turn", "roomId": "r1" })).unwrap();
        assert_eq!(a, HanabiAction::EndTurn);
    }

    #[test]
    fn test_decode_unknown_action_fails() {
        let r: Result<HanabiAction, _> = serde_json::from_value(json!({ "action": "cheat" }));
        assert!(r.is_err());
    }

    #[test]
    fn test_decode_play_requires_index() {
        let r: Result<HanabiAction, _> = serde_json::from_value(json!({ "action": "play_card" }));
        assert!(r.is_err());
    }
}
