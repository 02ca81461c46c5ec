//! Rule-level integration tests for the game engine.
//!
//! Most tests arrange a known table with `GameSession::from_table` so the
//! outcome of each play is deterministic; the long-running invariant test
//! deals from a seeded deck instead.

use lastcard_game::{
    DECK_SIZE, DeckPiles, GameConfig, GameError, GameSession, PlayerHand, standard_deck,
};
use lastcard_protocol::{Card, CardColor, CardKind, GamePhase, PlayerId, RoomId};
use rand::SeedableRng;
use rand::rngs::StdRng;

// =========================================================================
// Helpers
// =========================================================================

fn pid(id: u64) -> PlayerId {
    PlayerId(id)
}

fn num(color: CardColor, n: u8) -> Card {
    Card::number(format!("{color}_NUMBER_{n}"), color, n)
}

fn action(color: CardColor, kind: CardKind) -> Card {
    Card::action(format!("{color}_{}", kind.as_str()), color, kind)
}

fn draw_pile(count: usize) -> Vec<Card> {
    (0..count)
        .map(|i| Card::number(format!("DRAW_{i}"), CardColor::Yellow, 1))
        .collect()
}

fn session_with(hands: Vec<Vec<Card>>, draw: Vec<Card>, discard: Vec<Card>) -> GameSession {
    let hands = hands
        .into_iter()
        .enumerate()
        .map(|(i, cards)| {
            let id = i as u64 + 1;
            PlayerHand::with_cards(pid(id), format!("Player{id}"), cards)
        })
        .collect();
    let piles = DeckPiles::from_piles(draw, discard, StdRng::seed_from_u64(99))
        .expect("discard is not empty");
    GameSession::from_table(RoomId(1), hands, piles, GameConfig::default())
        .expect("at least two seats")
}

/// A table with a red 5 showing and plenty to draw.
fn session(hands: Vec<Vec<Card>>) -> GameSession {
    session_with(hands, draw_pile(30), vec![num(CardColor::Red, 5)])
}

fn hand_len(session: &GameSession, id: u64) -> usize {
    session.hand(pid(id)).expect("player is seated").len()
}

fn all_card_ids(session: &GameSession) -> Vec<String> {
    let piles = session.piles();
    let mut ids: Vec<String> = piles
        .draw_pile()
        .iter()
        .chain(piles.discard_pile())
        .chain(session.hands().iter().flat_map(|h| h.cards()))
        .map(|c| c.id.clone())
        .collect();
    ids.sort();
    ids
}

// =========================================================================
// Deal
// =========================================================================

#[test]
fn test_two_player_deal_leaves_93_to_draw_and_1_discard() {
    let players = vec![(pid(1), "Player1".to_string()), (pid(2), "Player2".to_string())];

    let session = GameSession::new(RoomId(1), &players, GameConfig::default()).unwrap();

    assert_eq!(hand_len(&session, 1), 7);
    assert_eq!(hand_len(&session, 2), 7);
    assert_eq!(session.piles().draw_pile().len(), 93);
    assert_eq!(session.piles().discard_pile().len(), 1);
}

// =========================================================================
// Card conservation
// =========================================================================

#[test]
fn test_cards_are_conserved_through_a_long_game() {
    let mut expected: Vec<String> = standard_deck().into_iter().map(|c| c.id).collect();
    expected.sort();

    for seed in 0..8 {
        let players: Vec<(PlayerId, String)> =
            (1..=4).map(|i| (pid(i), format!("Player{i}"))).collect();
        let piles = DeckPiles::with_rng(StdRng::seed_from_u64(seed));
        let mut session =
            GameSession::deal(RoomId(1), &players, GameConfig::default(), piles).unwrap();

        for step in 0..500 {
            assert_eq!(all_card_ids(&session), expected, "seed {seed} step {step}");
            if session.is_finished() {
                break;
            }

            let player = session.current_player();
            let hand = session.hand(player).unwrap().cards().to_vec();
            if hand.len() == 2 && step % 3 != 0 {
                session.declare_last_card(player).unwrap();
            }

            let playable = hand
                .iter()
                .position(|c| session.can_play(c).unwrap());
            let result = match playable {
                Some(index) => session.play_card(player, index, Some(CardColor::Blue)),
                None => session.draw_card(player),
            };
            match result {
                Ok(()) => {}
                Err(GameError::DeckExhausted) => break,
                Err(other) => panic!("unexpected rejection: {other}"),
            }
        }

        assert_eq!(all_card_ids(&session).len(), DECK_SIZE);
    }
}

// =========================================================================
// Atomic rejection
// =========================================================================

#[test]
fn test_illegal_play_changes_nothing() {
    let mut session = session(vec![
        vec![
            action(CardColor::Green, CardKind::Skip),
            num(CardColor::Green, 2),
            num(CardColor::Red, 1),
        ],
        vec![num(CardColor::Blue, 1)],
    ]);
    let before = session.view().unwrap();
    let draw_before = session.piles().draw_pile().to_vec();

    let err = session.play_card(pid(1), 0, None).unwrap_err();

    assert_eq!(err.code(), "ILLEGAL_PLAY");
    assert_eq!(session.view().unwrap(), before);
    assert_eq!(session.piles().draw_pile(), draw_before.as_slice());
    assert_eq!(hand_len(&session, 1), 3);
    assert_eq!(session.current_player(), pid(1));
}

#[test]
fn test_play_that_would_exhaust_deck_changes_nothing() {
    // Two cards in hand and no declaration: the penalty needs two cards,
    // but nothing is left to draw.
    let mut session = session_with(
        vec![
            vec![num(CardColor::Red, 1), num(CardColor::Red, 2)],
            vec![num(CardColor::Blue, 1)],
        ],
        vec![],
        vec![num(CardColor::Red, 5)],
    );
    let before = session.view().unwrap();

    let err = session.play_card(pid(1), 0, None).unwrap_err();

    assert_eq!(err, GameError::DeckExhausted);
    assert_eq!(session.view().unwrap(), before);
    assert_eq!(session.draw_card(pid(1)), Err(GameError::DeckExhausted));
}

// =========================================================================
// Last-card declaration
// =========================================================================

#[test]
fn test_playing_to_one_card_without_declaring_draws_penalty() {
    let mut session = session(vec![
        vec![num(CardColor::Red, 1), num(CardColor::Blue, 2)],
        vec![num(CardColor::Blue, 1)],
    ]);

    session.play_card(pid(1), 0, None).unwrap();

    assert_eq!(hand_len(&session, 1), 3);
    assert!(!session.hand(pid(1)).unwrap().has_declared());
}

#[test]
fn test_playing_to_one_card_after_declaring_has_no_penalty() {
    let mut session = session(vec![
        vec![num(CardColor::Red, 1), num(CardColor::Blue, 2)],
        vec![num(CardColor::Blue, 1)],
    ]);

    session.declare_last_card(pid(1)).unwrap();
    session.play_card(pid(1), 0, None).unwrap();

    assert_eq!(hand_len(&session, 1), 1);
}

#[test]
fn test_declaring_without_two_cards_fails() {
    let mut session = session(vec![
        vec![num(CardColor::Red, 1), num(CardColor::Blue, 2), num(CardColor::Blue, 3)],
        vec![num(CardColor::Blue, 1)],
    ]);

    for id in [1, 2] {
        let err = session.declare_last_card(pid(id)).unwrap_err();
        assert_eq!(err.code(), "DECLARATION_NOT_ALLOWED");
    }
}

// =========================================================================
// Special cards
// =========================================================================

#[test]
fn test_skip_passes_turn_two_seats() {
    let mut session = session(vec![
        vec![
            action(CardColor::Red, CardKind::Skip),
            num(CardColor::Blue, 1),
            num(CardColor::Blue, 2),
        ],
        vec![num(CardColor::Blue, 3)],
        vec![num(CardColor::Blue, 4)],
    ]);

    session.play_card(pid(1), 0, None).unwrap();

    assert_eq!(session.current_player(), pid(3));
}

#[test]
fn test_reverse_with_two_players_acts_as_skip() {
    let hands = |first: Card| {
        vec![
            vec![first, num(CardColor::Blue, 1), num(CardColor::Blue, 2)],
            vec![num(CardColor::Blue, 3)],
        ]
    };
    let mut reversed = session(hands(action(CardColor::Red, CardKind::Reverse)));
    let mut skipped = session(hands(action(CardColor::Red, CardKind::Skip)));

    reversed.play_card(pid(1), 0, None).unwrap();
    skipped.play_card(pid(1), 0, None).unwrap();

    assert_eq!(reversed.current_player(), pid(1));
    assert_eq!(reversed.current_player(), skipped.current_player());
}

#[test]
fn test_draw_two_makes_next_player_draw_and_lose_turn() {
    let mut session = session(vec![
        vec![
            action(CardColor::Red, CardKind::DrawTwo),
            num(CardColor::Blue, 1),
            num(CardColor::Blue, 2),
        ],
        vec![num(CardColor::Blue, 3)],
        vec![num(CardColor::Blue, 4)],
    ]);

    session.play_card(pid(1), 0, None).unwrap();

    assert_eq!(hand_len(&session, 2), 3);
    assert_eq!(session.current_player(), pid(3));
}

#[test]
fn test_wild_draw_four_forces_four_cards_and_skips() {
    let mut session = session(vec![
        vec![
            Card::wild("WILD_DRAW_FOUR_1", CardKind::WildDrawFour),
            num(CardColor::Blue, 1),
            num(CardColor::Blue, 2),
        ],
        vec![num(CardColor::Blue, 3)],
        vec![num(CardColor::Blue, 4)],
    ]);

    session.play_card(pid(1), 0, Some(CardColor::Green)).unwrap();

    assert_eq!(hand_len(&session, 2), 5);
    assert_eq!(hand_len(&session, 3), 1);
    assert_eq!(session.current_player(), pid(3));
    assert_eq!(session.chosen_color(), Some(CardColor::Green));
}

#[test]
fn test_deferred_wild_draw_four_applies_after_color_choice() {
    let mut session = session(vec![
        vec![
            Card::wild("WILD_DRAW_FOUR_1", CardKind::WildDrawFour),
            num(CardColor::Blue, 1),
            num(CardColor::Blue, 2),
        ],
        vec![num(CardColor::Blue, 3)],
        vec![num(CardColor::Blue, 4)],
    ]);

    session.play_card(pid(1), 0, None).unwrap();
    assert_eq!(session.phase(), GamePhase::ChoosingColor);
    assert_eq!(hand_len(&session, 2), 1);

    session.choose_color(pid(1), CardColor::Yellow).unwrap();

    assert_eq!(hand_len(&session, 2), 5);
    assert_eq!(session.current_player(), pid(3));
}

// =========================================================================
// Reshuffle
// =========================================================================

#[test]
fn test_draw_from_empty_pile_reshuffles_discard_under_top() {
    let top = num(CardColor::Red, 5);
    let mut session = session_with(
        vec![vec![num(CardColor::Blue, 1)], vec![num(CardColor::Blue, 2)]],
        vec![],
        vec![num(CardColor::Green, 3), num(CardColor::Green, 4), top.clone()],
    );

    session.draw_card(pid(1)).unwrap();

    assert_eq!(hand_len(&session, 1), 2);
    assert_eq!(session.piles().discard_pile(), &[top]);
    assert_eq!(session.piles().draw_pile().len(), 1);
}
