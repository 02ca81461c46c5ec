//! Message router: one inbound line in, replies and broadcasts out.
//!
//! Every connection task hands its lines to [`Router::route`]. The router
//! decodes the envelope, works out who sent it, runs the room or game
//! operation and then pushes the resulting snapshots to everyone
//! affected. Nothing here waits on the network: outbound lines go into
//! each connection's [`Outbox`] and a writer task does the rest.
//!
//! # Locking
//!
//! Room operations hold the room's lock from validation through the
//! broadcast of the new snapshot, so members see updates in the order
//! they happened. Game operations take the room lock first and the
//! session lock second, never the other way round.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use lastcard_game::{GameConfig, SessionRegistry, TableView};
use lastcard_protocol::{
    CardColor, ChatKind, ChatMessage, Codec, CreateRoomRequest, Envelope, GameOver,
    GameSnapshot, HandUpdate, JoinRoomRequest, JoinRoomSuccess, JsonCodec, Message, Method,
    PlayerId, ProtocolError, RoomCreated, RoomId, RoomsList, Welcome, WireEnvelope,
};
use lastcard_room::{Room, RoomConfig, RoomDirectory, RoomError};
use lastcard_session::{Player, PlayerDirectory};
use lastcard_transport::{ConnectionId, Outbox};

use crate::LastcardError;

/// Display name on notices the server itself posts to a room.
const SERVER_NAME: &str = "Server";

/// A turn-based action forwarded to the player's game.
#[derive(Debug, Clone, Copy)]
enum GameAction {
    Play {
        index: usize,
        color: Option<CardColor>,
    },
    ChooseColor(CardColor),
    Draw,
    DeclareLastCard,
}

/// Shared state for every connection, plus the dispatch logic.
pub struct Router<C: Codec = JsonCodec> {
    players: PlayerDirectory,
    rooms: RoomDirectory,
    games: SessionRegistry,
    outboxes: DashMap<ConnectionId, Outbox>,
    next_message_id: AtomicU64,
    codec: C,
}

impl Router<JsonCodec> {
    pub fn new(rooms: RoomConfig, game: GameConfig) -> Self {
        Self::with_codec(JsonCodec, rooms, game)
    }
}

impl Default for Router<JsonCodec> {
    fn default() -> Self {
        Self::new(RoomConfig::default(), GameConfig::default())
    }
}

impl<C: Codec> Router<C> {
    pub fn with_codec(codec: C, rooms: RoomConfig, game: GameConfig) -> Self {
        Self {
            players: PlayerDirectory::new(),
            rooms: RoomDirectory::new(rooms),
            games: SessionRegistry::new(game),
            outboxes: DashMap::new(),
            next_message_id: AtomicU64::new(1),
            codec,
        }
    }

    pub fn players(&self) -> &PlayerDirectory {
        &self.players
    }

    pub fn rooms(&self) -> &RoomDirectory {
        &self.rooms
    }

    pub fn games(&self) -> &SessionRegistry {
        &self.games
    }

    /// Registers a connection so replies and broadcasts can reach it.
    pub fn attach(&self, outbox: Outbox) {
        tracing::debug!(conn_id = %outbox.connection_id(), "connection attached");
        self.outboxes.insert(outbox.connection_id(), outbox);
    }

    /// Handles one inbound line. Failures are answered with an `ERROR`
    /// message to the sender; they never escape.
    pub async fn route(&self, conn: ConnectionId, line: &[u8]) {
        if let Err(err) = self.dispatch(conn, line).await {
            tracing::debug!(conn_id = %conn, code = err.code(), error = %err, "request rejected");
            self.deliver(conn, Message::error(err.code(), err.to_string()));
        }
    }

    /// Forgets a connection: its player leaves their room and the
    /// identity is purged.
    pub async fn disconnect(&self, conn: ConnectionId) {
        self.outboxes.remove(&conn);

        let Some(player) = self.players.unbind(conn) else {
            tracing::debug!(conn_id = %conn, "connection closed before identifying");
            return;
        };

        if let Some(room_id) = player.room {
            if let Err(err) = self.depart(&player, room_id).await {
                tracing::debug!(player_id = %player.id, %room_id, error = %err, "cleanup on disconnect failed");
            }
        }
        tracing::info!(player_id = %player.id, conn_id = %conn, "player disconnected");
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    async fn dispatch(&self, conn: ConnectionId, line: &[u8]) -> Result<(), LastcardError> {
        let wire: WireEnvelope = self.codec.decode(line)?;
        let method: Method = wire.method.parse()?;
        if !method.is_client_method() {
            return Err(ProtocolError::UnsupportedMethod(wire.method).into());
        }
        let envelope = Envelope::from_wire(wire)?;
        tracing::debug!(conn_id = %conn, %method, id = envelope.id, "routing message");

        if let Message::Ping = envelope.message {
            self.deliver(conn, Message::Pong);
            return Ok(());
        }

        let player = self.identify(conn);

        match envelope.message {
            Message::CreateRoom(request) => self.create_room(conn, &player, request).await,
            Message::GetRooms => {
                let rooms = self.rooms.list().await;
                self.deliver(conn, Message::RoomsList(RoomsList { rooms }));
                Ok(())
            }
            Message::JoinRoom(request) => self.join_room(conn, &player, request).await,
            Message::LeaveRoom => self.leave_room(conn, &player).await,
            Message::SetReady(request) => self.set_ready(conn, &player, request.ready).await,
            Message::StartGame => self.start_game(conn, &player).await,
            Message::PlayCard(request) => {
                let action = GameAction::Play {
                    index: request.card_index,
                    color: request.chosen_color,
                };
                self.act(conn, &player, action).await
            }
            Message::ChooseColor(request) => {
                self.act(conn, &player, GameAction::ChooseColor(request.color))
                    .await
            }
            Message::DrawCard => self.act(conn, &player, GameAction::Draw).await,
            Message::SayUno => {
                self.act(conn, &player, GameAction::DeclareLastCard).await
            }
            Message::LobbyChat(chat) => self.chat(&player, chat.text, Method::LobbyChat).await,
            Message::GameChat(chat) => self.chat(&player, chat.text, Method::GameChat).await,
            other => Err(ProtocolError::UnsupportedMethod(other.method().to_string()).into()),
        }
    }

    /// The caller's identity, minted on first contact. A fresh identity
    /// is announced to its owner with `WELCOME`.
    fn identify(&self, conn: ConnectionId) -> Player {
        let (player, minted) = self.players.resolve_or_mint(conn);
        if minted {
            let welcome = Welcome {
                player_id: player.id,
                username: player.name.clone(),
            };
            self.deliver(conn, Message::Welcome(welcome));
        }
        player
    }

    // -----------------------------------------------------------------------
    // Lobby
    // -----------------------------------------------------------------------

    async fn create_room(
        &self,
        conn: ConnectionId,
        player: &Player,
        request: CreateRoomRequest,
    ) -> Result<(), LastcardError> {
        if let Some(current) = player.room {
            return Err(RoomError::AlreadyInRoom(player.id, current).into());
        }

        let info = self.rooms.create(
            &request.room_name,
            request.password,
            request.max_players,
            player.id,
            &player.name,
        )?;
        self.players.set_room(player.id, Some(info.room_id))?;

        self.deliver(
            conn,
            Message::RoomCreated(RoomCreated {
                room_id: info.room_id,
                room_name: info.room_name,
                success: true,
            }),
        );
        let room = self.rooms.lock(info.room_id).await?;
        self.publish_lobby(&room);
        Ok(())
    }

    async fn join_room(
        &self,
        conn: ConnectionId,
        player: &Player,
        request: JoinRoomRequest,
    ) -> Result<(), LastcardError> {
        if let Some(current) = player.room {
            return Err(RoomError::AlreadyInRoom(player.id, current).into());
        }

        let mut room = self.rooms.lock(request.room_id).await?;
        room.join(player.id, player.name.clone(), request.password.as_deref())?;
        self.players.set_room(player.id, Some(room.id()))?;
        tracing::info!(player_id = %player.id, room_id = %room.id(), "player joined room");

        self.deliver(
            conn,
            Message::JoinRoomSuccess(JoinRoomSuccess {
                room_id: room.id(),
                success: true,
            }),
        );
        self.publish_lobby(&room);
        Ok(())
    }

    async fn leave_room(&self, conn: ConnectionId, player: &Player) -> Result<(), LastcardError> {
        let room_id = player.room.ok_or(RoomError::NotInAnyRoom(player.id))?;

        let departed = self.depart(player, room_id).await;
        self.players.set_room(player.id, None)?;
        departed?;

        self.deliver(conn, Message::Ok);
        Ok(())
    }

    /// Removes `player` from `room_id`, tearing down the room if it
    /// empties and the game if one was running.
    async fn depart(&self, player: &Player, room_id: RoomId) -> Result<(), LastcardError> {
        let mut room = self.rooms.lock(room_id).await?;
        let departure = room.leave(player.id)?;

        if departure.emptied {
            self.games.remove_session(room_id);
            self.rooms.remove(room_id);
            return Ok(());
        }

        if departure.interrupted_game {
            self.games.remove_session(room_id);
            tracing::info!(%room_id, player_id = %player.id, "game abandoned");
            let notice = ChatMessage::stamped(
                PlayerId::default(),
                SERVER_NAME,
                format!("{} left, the game was abandoned", player.name),
                ChatKind::System,
            );
            self.broadcast(&room.member_ids(), Message::GameChat(notice));
        }
        self.publish_lobby(&room);
        Ok(())
    }

    async fn set_ready(
        &self,
        conn: ConnectionId,
        player: &Player,
        ready: bool,
    ) -> Result<(), LastcardError> {
        let room_id = player.room.ok_or(RoomError::NotInAnyRoom(player.id))?;
        let room = self.rooms.lock(room_id).await?;
        self.players.set_ready(player.id, ready)?;

        self.deliver(conn, Message::Ok);
        self.publish_lobby(&room);
        Ok(())
    }

    async fn start_game(&self, conn: ConnectionId, player: &Player) -> Result<(), LastcardError> {
        let room_id = player.room.ok_or(RoomError::NotInAnyRoom(player.id))?;
        let mut room = self.rooms.lock(room_id).await?;
        let seats = room.seating_for_start(player.id, self.rooms.config().min_players)?;

        // A finished round leaves its session behind until the next start.
        self.games.remove_session(room_id);
        let view = self.games.create_session(room_id, &seats)?;
        room.mark_started();
        tracing::info!(%room_id, players = seats.len(), "game started");

        self.deliver(conn, Message::Ok);
        self.publish_lobby(&room);
        self.publish_table(&room, &view, Message::GameStart);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Game
    // -----------------------------------------------------------------------

    async fn act(
        &self,
        conn: ConnectionId,
        player: &Player,
        action: GameAction,
    ) -> Result<(), LastcardError> {
        let room_id = player.room.ok_or(RoomError::NotInAnyRoom(player.id))?;
        let mut room = self.rooms.lock(room_id).await?;

        let view = match action {
            GameAction::Play { index, color } => {
                self.games.play_card(room_id, player.id, index, color).await?
            }
            GameAction::ChooseColor(color) => {
                self.games.choose_color(room_id, player.id, color).await?
            }
            GameAction::Draw => self.games.draw_card(room_id, player.id).await?,
            GameAction::DeclareLastCard => {
                self.games.declare_last_card(room_id, player.id).await?
            }
        };

        self.deliver(conn, Message::Ok);
        self.publish_table(&room, &view, Message::GameState);

        if let Some(outcome) = view.outcome {
            room.mark_finished();
            tracing::info!(%room_id, winner = %outcome.winner, "game finished");
            self.broadcast(
                &room.member_ids(),
                Message::GameOver(GameOver {
                    winner_id: outcome.winner,
                    winner_name: outcome.winner_name,
                    scores: outcome.scores,
                }),
            );
            self.publish_lobby(&room);
        }
        Ok(())
    }

    async fn chat(
        &self,
        player: &Player,
        text: String,
        method: Method,
    ) -> Result<(), LastcardError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ProtocolError::InvalidPayload {
                method: method.as_str(),
                reason: "chat text is empty".into(),
            }
            .into());
        }
        let room_id = player.room.ok_or(RoomError::NotInAnyRoom(player.id))?;
        let room = self.rooms.lock(room_id).await?;

        let line = ChatMessage::stamped(player.id, player.name.clone(), text, ChatKind::Text);
        let message = match method {
            Method::GameChat => Message::GameChat(line),
            _ => Message::LobbyChat(line),
        };
        self.broadcast(&room.member_ids(), message);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Delivery
    // -----------------------------------------------------------------------

    fn publish_lobby(&self, room: &Room) {
        let lobby = room.lobby(|id| self.players.get(id).is_ok_and(|p| p.ready));
        self.broadcast(&room.member_ids(), Message::LobbyUpdate(lobby));
    }

    /// Broadcasts the public snapshot, then hands each seat its own cards.
    fn publish_table(
        &self,
        room: &Room,
        view: &TableView,
        wrap: fn(GameSnapshot) -> Message,
    ) {
        self.broadcast(&room.member_ids(), wrap(view.snapshot.clone()));
        for (player_id, cards) in &view.hands {
            self.send_to_player(
                *player_id,
                Message::HandUpdate(HandUpdate {
                    cards: cards.clone(),
                }),
            );
        }
    }

    /// Sends to each member in turn. A member whose connection is gone
    /// is skipped.
    fn broadcast(&self, members: &[PlayerId], message: Message) {
        for &member in members {
            self.send_to_player(member, message.clone());
        }
    }

    fn send_to_player(&self, player: PlayerId, message: Message) {
        match self.players.connection_of(player) {
            Some(conn) => self.deliver(conn, message),
            None => tracing::debug!(player_id = %player, "no connection for player"),
        }
    }

    fn deliver(&self, conn: ConnectionId, message: Message) {
        let Some(outbox) = self.outboxes.get(&conn).map(|o| o.clone()) else {
            tracing::debug!(conn_id = %conn, "no outbox for connection");
            return;
        };

        let id = self.next_message_id.fetch_add(1, Ordering::Relaxed);
        let envelope = Envelope::new(id, message);
        let bytes = match self.codec.encode_envelope(&envelope) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!(conn_id = %conn, method = %envelope.method(), error = %err, "failed to encode message");
                return;
            }
        };

        if let Err(err) = outbox.send(String::from_utf8_lossy(&bytes).into_owned()) {
            tracing::warn!(conn_id = %conn, error = %err, "dropping message for stale connection");
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use lastcard_game::{DeckPiles, GameSession, PlayerHand};
    use lastcard_protocol::{Card, CardKind, GamePhase, RoomStatus};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;
    use tokio::sync::mpsc::UnboundedReceiver;

    use super::*;

    struct Client {
        conn: ConnectionId,
        rx: UnboundedReceiver<String>,
    }

    impl Client {
        fn attach(router: &Router, id: u64) -> Self {
            let conn = ConnectionId::new(id);
            let (outbox, rx) = Outbox::channel(conn);
            router.attach(outbox);
            Self { conn, rx }
        }

        async fn send(&self, router: &Router, method: &str, payload: serde_json::Value) {
            let line = json!({ "id": 1, "method": method, "payload": payload }).to_string();
            router.route(self.conn, line.as_bytes()).await;
        }

        fn drain(&mut self) -> Vec<Message> {
            let mut messages = Vec::new();
            while let Ok(line) = self.rx.try_recv() {
                let envelope = JsonCodec.decode_envelope(line.as_bytes()).unwrap();
                messages.push(envelope.message);
            }
            messages
        }
    }

    fn pid(id: u64) -> PlayerId {
        PlayerId(id)
    }

    fn new_router() -> Router {
        Router::default()
    }

    fn error_code(message: &Message) -> Option<&str> {
        match message {
            Message::Error(e) => Some(e.code.as_str()),
            _ => None,
        }
    }

    /// Two identified players, the first owning room 1, the second in it.
    async fn two_in_a_room(router: &Router) -> (Client, Client) {
        let mut a = Client::attach(router, 1);
        let mut b = Client::attach(router, 2);
        a.send(router, "CREATE_ROOM", json!({ "roomName": "table", "maxPlayers": 2 })).await;
        b.send(router, "JOIN_ROOM", json!({ "roomId": 1 })).await;
        a.drain();
        b.drain();
        (a, b)
    }

    /// Replaces the dealt game with a known table and marks the room started.
    async fn arrange_game(router: &Router, hands: Vec<Vec<Card>>) {
        let hands = hands
            .into_iter()
            .enumerate()
            .map(|(i, cards)| {
                let id = i as u64 + 1;
                PlayerHand::with_cards(pid(id), format!("Player{id}"), cards)
            })
            .collect();
        let draw = (0..20)
            .map(|i| Card::number(format!("DRAW_{i}"), CardColor::Yellow, 1))
            .collect();
        let top = Card::number("TOP", CardColor::Red, 5);
        let piles = DeckPiles::from_piles(draw, vec![top], StdRng::seed_from_u64(3)).unwrap();
        let session =
            GameSession::from_table(RoomId(1), hands, piles, GameConfig::default()).unwrap();

        router.games().remove_session(RoomId(1));
        router.games().insert(RoomId(1), session).unwrap();
        router.rooms().lock(RoomId(1)).await.unwrap().mark_started();
    }

    #[tokio::test]
    async fn test_first_message_mints_identity_and_welcomes() {
        let router = new_router();
        let mut client = Client::attach(&router, 1);

        client.send(&router, "GET_ROOMS", json!({})).await;

        let messages = client.drain();
        assert_eq!(
            messages[0],
            Message::Welcome(Welcome {
                player_id: pid(1),
                username: "Player1".into()
            })
        );
        assert_eq!(messages[1], Message::RoomsList(RoomsList { rooms: vec![] }));
        assert_eq!(router.players().len(), 1);
    }

    #[tokio::test]
    async fn test_ping_answers_pong_without_identity() {
        let router = new_router();
        let mut client = Client::attach(&router, 1);

        client.send(&router, "PING", json!({})).await;

        assert_eq!(client.drain(), vec![Message::Pong]);
        assert!(router.players().is_empty());
    }

    #[tokio::test]
    async fn test_garbage_and_unknown_methods_are_rejected() {
        let router = new_router();
        let mut client = Client::attach(&router, 1);

        router.route(client.conn, b"not json").await;
        client.send(&router, "FLY_AWAY", json!({})).await;
        client.send(&router, "GAME_STATE", json!({})).await;

        let codes: Vec<_> = client
            .drain()
            .iter()
            .filter_map(|m| error_code(m).map(String::from))
            .collect();
        assert_eq!(codes, vec!["PARSE_ERROR", "UNSUPPORTED_METHOD", "UNSUPPORTED_METHOD"]);
    }

    #[tokio::test]
    async fn test_bad_payload_is_invalid_payload() {
        let router = new_router();
        let mut client = Client::attach(&router, 1);

        client.send(&router, "JOIN_ROOM", json!({ "roomId": "seven" })).await;

        let messages = client.drain();
        assert_eq!(error_code(&messages[0]), Some("INVALID_PAYLOAD"));
    }

    #[tokio::test]
    async fn test_create_room_replies_and_sends_lobby() {
        let router = new_router();
        let mut client = Client::attach(&router, 1);

        client.send(&router, "CREATE_ROOM", json!({ "roomName": "table" })).await;

        let messages = client.drain();
        assert!(matches!(messages[0], Message::Welcome(_)));
        assert_eq!(
            messages[1],
            Message::RoomCreated(RoomCreated {
                room_id: RoomId(1),
                room_name: "table".into(),
                success: true
            })
        );
        let Message::LobbyUpdate(lobby) = &messages[2] else {
            panic!("expected lobby update, got {:?}", messages[2]);
        };
        assert_eq!(lobby.players.len(), 1);
        assert!(lobby.players[0].is_creator);
        assert_eq!(router.players().get(pid(1)).unwrap().room, Some(RoomId(1)));
    }

    #[tokio::test]
    async fn test_create_room_while_in_one_fails() {
        let router = new_router();
        let (mut a, _b) = two_in_a_room(&router).await;

        a.send(&router, "CREATE_ROOM", json!({ "roomName": "second" })).await;

        assert_eq!(error_code(&a.drain()[0]), Some("ALREADY_IN_ROOM"));
        assert_eq!(router.rooms().len(), 1);
    }

    #[tokio::test]
    async fn test_join_broadcasts_lobby_to_everyone() {
        let router = new_router();
        let mut a = Client::attach(&router, 1);
        let mut b = Client::attach(&router, 2);
        a.send(&router, "CREATE_ROOM", json!({ "roomName": "table" })).await;
        a.drain();

        b.send(&router, "JOIN_ROOM", json!({ "roomId": 1 })).await;

        let to_b = b.drain();
        assert!(to_b.contains(&Message::JoinRoomSuccess(JoinRoomSuccess {
            room_id: RoomId(1),
            success: true
        })));
        let to_a = a.drain();
        let Message::LobbyUpdate(lobby) = &to_a[0] else {
            panic!("expected lobby update, got {to_a:?}");
        };
        assert_eq!(lobby.players.len(), 2);
    }

    #[tokio::test]
    async fn test_join_with_wrong_password_fails() {
        let router = new_router();
        let mut a = Client::attach(&router, 1);
        let mut b = Client::attach(&router, 2);
        a.send(&router, "CREATE_ROOM", json!({ "roomName": "t", "password": "pw" })).await;

        b.send(&router, "JOIN_ROOM", json!({ "roomId": 1, "password": "nope" })).await;

        let messages = b.drain();
        assert_eq!(error_code(messages.last().unwrap()), Some("INVALID_PASSWORD"));
        assert_eq!(router.players().get(pid(2)).unwrap().room, None);
        a.drain();
    }

    #[tokio::test]
    async fn test_start_game_deals_seven_to_each() {
        let router = new_router();
        let (mut a, mut b) = two_in_a_room(&router).await;

        a.send(&router, "START_GAME", json!({})).await;

        for messages in [a.drain(), b.drain()] {
            let Some(Message::GameStart(snapshot)) =
                messages.iter().find(|m| matches!(m, Message::GameStart(_)))
            else {
                panic!("no GAME_START in {messages:?}");
            };
            assert_eq!(snapshot.current_player_id, pid(1));
            assert!(snapshot.players.values().all(|p| p.card_count == 7));
            let Some(Message::HandUpdate(hand)) =
                messages.iter().find(|m| matches!(m, Message::HandUpdate(_)))
            else {
                panic!("no HAND_UPDATE in {messages:?}");
            };
            assert_eq!(hand.cards.len(), 7);
        }
        let room = router.rooms().lock(RoomId(1)).await.unwrap();
        assert_eq!(room.status(), RoomStatus::InProgress);
    }

    #[tokio::test]
    async fn test_start_game_by_non_creator_fails() {
        let router = new_router();
        let (_a, mut b) = two_in_a_room(&router).await;

        b.send(&router, "START_GAME", json!({})).await;

        assert_eq!(error_code(&b.drain()[0]), Some("NOT_CREATOR"));
        assert!(router.games().view(RoomId(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_out_of_turn_play_fails_and_changes_nothing() {
        let router = new_router();
        let (mut a, mut b) = two_in_a_room(&router).await;
        a.send(&router, "START_GAME", json!({})).await;
        a.drain();
        b.drain();
        let before = router.games().view(RoomId(1)).await.unwrap();

        b.send(&router, "DRAW_CARD", json!({})).await;

        assert_eq!(error_code(&b.drain()[0]), Some("NOT_YOUR_TURN"));
        assert!(a.drain().is_empty());
        assert_eq!(router.games().view(RoomId(1)).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_illegal_play_is_reported() {
        let router = new_router();
        let (mut a, _b) = two_in_a_room(&router).await;
        arrange_game(
            &router,
            vec![
                vec![
                    Card::action("GS", CardColor::Green, CardKind::Skip),
                    Card::number("G2", CardColor::Green, 2),
                ],
                vec![Card::number("B1", CardColor::Blue, 1)],
            ],
        )
        .await;

        a.send(&router, "PLAY_CARD", json!({ "cardIndex": 0 })).await;

        assert_eq!(error_code(&a.drain()[0]), Some("ILLEGAL_PLAY"));
        let view = router.games().view(RoomId(1)).await.unwrap();
        assert_eq!(view.snapshot.players[&pid(1)].card_count, 2);
        assert_eq!(view.snapshot.current_player_id, pid(1));
    }

    #[tokio::test]
    async fn test_winning_play_sends_game_over_and_finishes_room() {
        let router = new_router();
        let (mut a, mut b) = two_in_a_room(&router).await;
        arrange_game(
            &router,
            vec![
                vec![Card::number("R1", CardColor::Red, 1)],
                vec![
                    Card::number("B9", CardColor::Blue, 9),
                    Card::action("GS", CardColor::Green, CardKind::Skip),
                ],
            ],
        )
        .await;

        a.send(&router, "PLAY_CARD", json!({ "cardIndex": 0 })).await;

        let to_a = a.drain();
        assert_eq!(to_a[0], Message::Ok);
        let Message::GameState(snapshot) = &to_a[1] else {
            panic!("expected game state, got {:?}", to_a[1]);
        };
        assert_eq!(snapshot.game_phase, GamePhase::Finished);

        let to_b = b.drain();
        let Some(Message::GameOver(over)) = to_b.iter().find(|m| matches!(m, Message::GameOver(_)))
        else {
            panic!("no GAME_OVER in {to_b:?}");
        };
        assert_eq!(over.winner_id, pid(1));
        assert_eq!(over.winner_name, "Player1");
        assert_eq!(over.scores[&pid(1)], 29);
        let Some(Message::LobbyUpdate(lobby)) = to_b.last() else {
            panic!("expected trailing lobby update in {to_b:?}");
        };
        assert_eq!(lobby.room_status, RoomStatus::Finished);
    }

    #[tokio::test]
    async fn test_creator_can_restart_after_finish() {
        let router = new_router();
        let (mut a, _b) = two_in_a_room(&router).await;
        arrange_game(
            &router,
            vec![
                vec![Card::number("R1", CardColor::Red, 1)],
                vec![Card::number("B9", CardColor::Blue, 9)],
            ],
        )
        .await;
        a.send(&router, "PLAY_CARD", json!({ "cardIndex": 0 })).await;
        a.drain();

        a.send(&router, "START_GAME", json!({})).await;

        assert_eq!(a.drain()[0], Message::Ok);
        let view = router.games().view(RoomId(1)).await.unwrap();
        assert_eq!(view.snapshot.game_phase, GamePhase::WaitingTurn);
        assert_eq!(view.snapshot.players[&pid(1)].card_count, 7);
    }

    #[tokio::test]
    async fn test_leaving_mid_game_abandons_it() {
        let router = new_router();
        let mut a = Client::attach(&router, 1);
        let mut b = Client::attach(&router, 2);
        let mut c = Client::attach(&router, 3);
        a.send(&router, "CREATE_ROOM", json!({ "roomName": "t" })).await;
        b.send(&router, "JOIN_ROOM", json!({ "roomId": 1 })).await;
        c.send(&router, "JOIN_ROOM", json!({ "roomId": 1 })).await;
        a.send(&router, "START_GAME", json!({})).await;
        a.drain();
        c.drain();

        b.send(&router, "LEAVE_ROOM", json!({})).await;

        assert_eq!(b.drain().last(), Some(&Message::Ok));
        assert!(router.games().view(RoomId(1)).await.is_err());
        let to_a = a.drain();
        let Message::GameChat(notice) = &to_a[0] else {
            panic!("expected notice, got {to_a:?}");
        };
        assert_eq!(notice.kind, ChatKind::System);
        let Message::LobbyUpdate(lobby) = &to_a[1] else {
            panic!("expected lobby update, got {to_a:?}");
        };
        assert_eq!(lobby.room_status, RoomStatus::Waiting);
        assert_eq!(lobby.players.len(), 2);
        c.drain();
    }

    #[tokio::test]
    async fn test_disconnect_of_last_member_destroys_room() {
        let router = new_router();
        let mut a = Client::attach(&router, 1);
        a.send(&router, "CREATE_ROOM", json!({ "roomName": "t" })).await;
        a.drain();

        router.disconnect(a.conn).await;

        assert!(router.rooms().is_empty());
        assert!(router.players().is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_updates_remaining_members() {
        let router = new_router();
        let (a, mut b) = two_in_a_room(&router).await;

        router.disconnect(a.conn).await;

        let Some(Message::LobbyUpdate(lobby)) = b.drain().pop() else {
            panic!("expected lobby update");
        };
        assert_eq!(lobby.players.len(), 1);
        assert_eq!(lobby.players[0].id, pid(2));
        assert!(lobby.players[0].is_creator);
    }

    #[tokio::test]
    async fn test_chat_is_stamped_by_server() {
        let router = new_router();
        let (mut a, mut b) = two_in_a_room(&router).await;

        a.send(
            &router,
            "LOBBY_CHAT",
            json!({ "text": "  hello  ", "senderId": 99, "senderName": "Mallory" }),
        )
        .await;

        for messages in [a.drain(), b.drain()] {
            let Message::LobbyChat(line) = &messages[0] else {
                panic!("expected chat, got {messages:?}");
            };
            assert_eq!(line.sender_id, pid(1));
            assert_eq!(line.sender_name, "Player1");
            assert_eq!(line.text, "hello");
            assert_eq!(line.kind, ChatKind::Text);
            assert!(line.timestamp > 0);
        }
    }

    #[tokio::test]
    async fn test_empty_chat_and_chat_outside_room_fail() {
        let router = new_router();
        let mut client = Client::attach(&router, 1);

        client.send(&router, "GAME_CHAT", json!({ "text": "   " })).await;
        client.send(&router, "GAME_CHAT", json!({ "text": "hi" })).await;

        let codes: Vec<_> = client
            .drain()
            .iter()
            .filter_map(|m| error_code(m).map(String::from))
            .collect();
        assert_eq!(codes, vec!["INVALID_PAYLOAD", "NOT_IN_ROOM"]);
    }

    #[tokio::test]
    async fn test_set_ready_rebroadcasts_lobby() {
        let router = new_router();
        let (mut a, mut b) = two_in_a_room(&router).await;

        b.send(&router, "SET_READY", json!({ "ready": true })).await;

        assert_eq!(b.drain()[0], Message::Ok);
        let Some(Message::LobbyUpdate(lobby)) = a.drain().pop() else {
            panic!("expected lobby update");
        };
        assert!(lobby.players.iter().any(|p| p.id == pid(2) && p.is_ready));
    }
}
