use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use board::{Color, Move};
use game::{GameEngine, Winner};
use minimax::{Difficulty, SearchBudget, SearchEngine};

use crate::{
    protocol::ServerMessage, ConnectionId, Error, Opponent, Result, Room, RoomId, RoomStatus,
    Transport,
};

/// The name given to the engine as an opponent
pub const ENGINE_OPPONENT: &str = "engine";

/// Settings for a [`SessionCoordinator`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// How long an ended room stays around before it's collected
    pub grace_period: Duration,
    /// The limits on each engine search
    pub search_budget: SearchBudget,
}
impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_secs(60),
            search_budget: SearchBudget::default(),
        }
    }
}

/// A request for the engine to pick a move in an engine room
///
/// The search is left to the caller so it can run away from the connection handlers. Hand the
/// result back with [`SessionCoordinator::complete_engine_move`].
#[derive(Clone, Debug)]
pub struct SearchTicket {
    pub room_id: RoomId,
    generation: u64,
    pub game: GameEngine,
    pub difficulty: Difficulty,
}
impl SearchTicket {
    /// Run the search this ticket asks for
    pub fn run(&self, engine: &mut SearchEngine) -> Option<Move> {
        engine.search(&self.game, self.difficulty)
    }
}

/// Keeps track of every room and passes messages between their players
///
/// Each room sits behind its own lock, so everything that happens in one room happens in order,
/// while different rooms don't wait on each other. The table of rooms is locked only to find, add
/// or remove a room, and never while waiting on a room's lock.
pub struct SessionCoordinator<T> {
    rooms: Mutex<HashMap<RoomId, Arc<Mutex<Room>>>>,
    transport: T,
    config: CoordinatorConfig,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T: Transport> SessionCoordinator<T> {
    pub fn new(transport: T, config: CoordinatorConfig) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            transport,
            config,
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// How many rooms exist, ended or not
    pub fn room_count(&self) -> usize {
        lock(&self.rooms).len()
    }

    pub fn room_status(&self, room_id: &RoomId) -> Option<RoomStatus> {
        let room = self.room(room_id).ok()?;
        let room = lock(&room);
        (!room.removed).then_some(room.status)
    }

    fn room(&self, room_id: &RoomId) -> Result<Arc<Mutex<Room>>> {
        lock(&self.rooms)
            .get(room_id)
            .cloned()
            .ok_or(Error::RoomNotFound)
    }

    /// Lock the room, unless it was removed while we waited
    fn lock_room(room: &Mutex<Room>) -> Result<MutexGuard<'_, Room>> {
        let guard = lock(room);
        if guard.removed {
            Err(Error::RoomNotFound)
        } else {
            Ok(guard)
        }
    }

    /// Take the room out of the table, if it's still the one stored under its id
    fn remove(&self, room: &Arc<Mutex<Room>>, guard: &mut Room) {
        guard.removed = true;
        let mut rooms = lock(&self.rooms);
        if rooms
            .get(&guard.id)
            .is_some_and(|stored| Arc::ptr_eq(stored, room))
        {
            rooms.remove(&guard.id);
        }
    }

    fn snapshot(&self) -> Vec<Arc<Mutex<Room>>> {
        lock(&self.rooms).values().cloned().collect()
    }

    /// Open a new room with the given connection in it, waiting for an opponent
    pub fn create_room(&self, connection: ConnectionId) -> RoomId {
        let room_id = RoomId::random();
        let room = Room::new(room_id.clone(), connection, Opponent::Human);
        lock(&self.rooms).insert(room_id.clone(), Arc::new(Mutex::new(room)));
        log::info!("Room {room_id} created by {connection}");
        self.transport.send(
            connection,
            ServerMessage::RoomCreated {
                room_id: room_id.clone(),
            },
        );
        room_id
    }

    /// Take the second seat in a room, playing black
    pub fn join_room(&self, room_id: &RoomId, connection: ConnectionId) -> Result<Color> {
        let room = self.room(room_id)?;
        let mut room = Self::lock_room(&room)?;
        if room.participants.contains(&connection) {
            return Err(Error::AlreadyJoined);
        }
        if matches!(room.status, RoomStatus::Ended { .. }) {
            return Err(Error::NotActive);
        }
        if room.participants.len() >= 2 || room.opponent != Opponent::Human {
            return Err(Error::RoomFull);
        }
        room.participants.push(connection);
        room.status = RoomStatus::Active;
        room.touch();
        log::info!("{connection} joined room {room_id}");
        for &participant in &room.participants {
            if let (Some(color), Some(opponent)) = (
                room.color_of(participant),
                room.other_participant(participant),
            ) {
                self.transport.send(
                    participant,
                    ServerMessage::GameStart {
                        room_id: room_id.clone(),
                        color,
                        opponent: opponent.to_string(),
                    },
                );
            }
        }
        Ok(Color::Black)
    }

    /// Open a room where the connection plays `color` against the engine
    ///
    /// If the engine has the first move, the ticket for it comes back too.
    pub fn create_engine_room(
        &self,
        connection: ConnectionId,
        difficulty: Difficulty,
        color: Color,
    ) -> (RoomId, Option<SearchTicket>) {
        let room_id = RoomId::random();
        let mut room = Room::new(
            room_id.clone(),
            connection,
            Opponent::Engine {
                difficulty,
                color: color.other(),
            },
        );
        let ticket = Self::issue_ticket(&mut room);
        log::info!("Room {room_id} created by {connection} to play {color} against the {difficulty} engine");
        self.transport.send(
            connection,
            ServerMessage::GameStart {
                room_id: room_id.clone(),
                color,
                opponent: ENGINE_OPPONENT.to_string(),
            },
        );
        lock(&self.rooms).insert(room_id.clone(), Arc::new(Mutex::new(room)));
        (room_id, ticket)
    }

    /// If it's the engine's move, mark a search as pending and describe it
    fn issue_ticket(room: &mut Room) -> Option<SearchTicket> {
        let Opponent::Engine { difficulty, .. } = room.opponent else {
            return None;
        };
        if room.status != RoomStatus::Active || !room.is_engine_turn() {
            return None;
        }
        room.touch();
        room.search_pending = true;
        Some(SearchTicket {
            room_id: room.id.clone(),
            generation: room.generation,
            game: room.engine.clone(),
            difficulty,
        })
    }

    /// Check a move one player made, and pass it on to the other
    ///
    /// In an engine room, a ticket for the engine's reply comes back.
    pub fn relay_move(
        &self,
        room_id: &RoomId,
        connection: ConnectionId,
        mv: &str,
        fen: &str,
    ) -> Result<Option<SearchTicket>> {
        let room = self.room(room_id)?;
        let mut room = Self::lock_room(&room)?;
        if room.status != RoomStatus::Active {
            return Err(Error::NotActive);
        }
        let color = room.color_of(connection).ok_or(Error::NotParticipant)?;
        if room.search_pending || room.engine.position().side_to_move != color {
            return Err(Error::NotYourTurn);
        }
        if let Err(e) = room.engine.load_external_move(fen, mv) {
            match &e {
                game::Error::CorruptState(_) => {
                    log::error!("Room {room_id} rejected {mv} from {connection}: {e}");
                }
                _ => log::warn!("Room {room_id} rejected {mv} from {connection}: {e}"),
            }
            return Err(e.into());
        }
        room.touch();
        log::debug!("Room {room_id}: {connection} played {mv}");
        if let Some(opponent) = room.other_participant(connection) {
            self.transport.send(
                opponent,
                ServerMessage::OpponentMove {
                    mv: mv.to_string(),
                    fen: fen.to_string(),
                },
            );
        }
        if let Some(winner) = room.engine.outcome() {
            self.finish(&mut room, winner);
            return Ok(None);
        }
        Ok(Self::issue_ticket(&mut room))
    }

    /// Hand back the engine's choice for a ticket
    ///
    /// Returns `Ok(false)` if the ticket went stale: the room is gone, over, or has changed since
    /// the ticket was issued. Otherwise the move is played and sent to the human.
    pub fn complete_engine_move(&self, ticket: SearchTicket, mv: Option<Move>) -> Result<bool> {
        let Ok(room) = self.room(&ticket.room_id) else {
            log::debug!("Dropping engine move for vanished room {}", ticket.room_id);
            return Ok(false);
        };
        let Ok(mut room) = Self::lock_room(&room) else {
            return Ok(false);
        };
        if room.status != RoomStatus::Active
            || !room.search_pending
            || room.generation != ticket.generation
        {
            log::debug!("Dropping stale engine move for room {}", ticket.room_id);
            return Ok(false);
        }
        room.search_pending = false;
        // The human never gets a reply if the engine can't move, so the game ends drawn
        let Some(mv) = mv else {
            log::error!("Engine found no move in room {}", ticket.room_id);
            self.finish(&mut room, Winner::Draw);
            return Ok(false);
        };
        let applied = room
            .engine
            .apply_move(mv)
            .map(|entry| (entry.san.clone(), entry.position.to_fen()));
        let (san, fen) = match applied {
            Ok(played) => played,
            Err(e) => {
                log::error!("Engine move {mv} rejected in room {}: {e}", ticket.room_id);
                self.finish(&mut room, Winner::Draw);
                return Err(e.into());
            }
        };
        room.touch();
        log::debug!("Room {}: engine played {san}", ticket.room_id);
        for &participant in &room.participants {
            self.transport.send(
                participant,
                ServerMessage::OpponentMove {
                    mv: san.clone(),
                    fen: fen.clone(),
                },
            );
        }
        if let Some(winner) = room.engine.outcome() {
            self.finish(&mut room, winner);
        }
        Ok(true)
    }

    /// A player declares the game over
    ///
    /// Reporting on a room which already ended does nothing.
    pub fn report_game_over(
        &self,
        room_id: &RoomId,
        connection: ConnectionId,
        winner: Winner,
    ) -> Result<()> {
        let room = self.room(room_id)?;
        let mut room = Self::lock_room(&room)?;
        if !room.participants.contains(&connection) {
            return Err(Error::NotParticipant);
        }
        if matches!(room.status, RoomStatus::Ended { .. }) {
            return Ok(());
        }
        self.finish(&mut room, winner);
        Ok(())
    }

    /// Tell everyone in the room who won, and start its grace period
    fn finish(&self, room: &mut Room, winner: Winner) {
        log::info!("Game in room {} ended, winner: {winner}", room.id);
        for &participant in &room.participants {
            self.transport
                .send(participant, ServerMessage::GameEnded { winner });
        }
        room.end(Instant::now());
    }

    /// Take a closed connection out of every room it was in
    ///
    /// Returns how many rooms it was in.
    pub fn handle_disconnect(&self, connection: ConnectionId) -> usize {
        let mut affected = 0;
        for room_arc in self.snapshot() {
            let Ok(mut room) = Self::lock_room(&room_arc) else {
                continue;
            };
            let Some(seat) = room.participants.iter().position(|&c| c == connection) else {
                continue;
            };
            affected += 1;
            room.participants.remove(seat);
            room.end(Instant::now());
            log::info!("{connection} left room {}", room.id);
            match room.participants.first() {
                Some(&remaining) => {
                    self.transport
                        .send(remaining, ServerMessage::OpponentDisconnected);
                }
                None => {
                    self.remove(&room_arc, &mut room);
                    log::info!("Room {} removed, nobody left", room.id);
                }
            }
        }
        affected
    }

    /// Remove every room whose grace period ran out by `now`
    ///
    /// Returns the number of rooms removed.
    pub fn collect_garbage(&self, now: Instant) -> usize {
        let mut removed = 0;
        for room_arc in self.snapshot() {
            let Ok(mut room) = Self::lock_room(&room_arc) else {
                continue;
            };
            if let RoomStatus::Ended { at } = room.status {
                if now.saturating_duration_since(at) >= self.config.grace_period {
                    self.remove(&room_arc, &mut room);
                    log::info!("Room {} removed after its grace period", room.id);
                    removed += 1;
                }
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Keeps every message sent, in order
    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<(ConnectionId, ServerMessage)>>,
    }
    impl Transport for RecordingTransport {
        fn send(&self, to: ConnectionId, message: ServerMessage) {
            lock(&self.sent).push((to, message));
        }
    }
    impl RecordingTransport {
        /// Drain the messages sent to the given connection
        fn take_for(&self, connection: ConnectionId) -> Vec<ServerMessage> {
            let mut sent = lock(&self.sent);
            let (mine, others): (Vec<_>, Vec<_>) = sent.drain(..).partition(|(to, _)| *to == connection);
            *sent = others;
            mine.into_iter().map(|(_, message)| message).collect()
        }

        fn clear(&self) {
            lock(&self.sent).clear();
        }
    }

    fn coordinator() -> SessionCoordinator<RecordingTransport> {
        SessionCoordinator::new(RecordingTransport::default(), CoordinatorConfig::default())
    }

    /// A room with two players who have been told the game started
    fn active_room(
        coordinator: &SessionCoordinator<RecordingTransport>,
    ) -> (RoomId, ConnectionId, ConnectionId) {
        let (white, black) = (ConnectionId::new(), ConnectionId::new());
        let room_id = coordinator.create_room(white);
        assert_eq!(coordinator.join_room(&room_id, black), Ok(Color::Black));
        coordinator.transport().clear();
        (room_id, white, black)
    }

    /// Relay a move, reporting whether the engine was asked to reply
    fn relay(
        coordinator: &SessionCoordinator<RecordingTransport>,
        room_id: &RoomId,
        connection: ConnectionId,
        mv: &str,
        fen: &str,
    ) -> Result<bool> {
        coordinator
            .relay_move(room_id, connection, mv, fen)
            .map(|ticket| ticket.is_some())
    }

    const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
    const AFTER_E5: &str = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2";

    #[test]
    fn test_create_and_join() {
        let coordinator = coordinator();
        let (white, black) = (ConnectionId::new(), ConnectionId::new());
        let room_id = coordinator.create_room(white);
        assert_eq!(
            coordinator.transport().take_for(white),
            [ServerMessage::RoomCreated {
                room_id: room_id.clone()
            }]
        );
        assert_eq!(
            coordinator.room_status(&room_id),
            Some(RoomStatus::WaitingForOpponent)
        );
        assert_eq!(
            coordinator.join_room(&room_id, white),
            Err(Error::AlreadyJoined)
        );

        assert_eq!(coordinator.join_room(&room_id, black), Ok(Color::Black));
        assert_eq!(coordinator.room_status(&room_id), Some(RoomStatus::Active));
        assert_eq!(
            coordinator.transport().take_for(white),
            [ServerMessage::GameStart {
                room_id: room_id.clone(),
                color: Color::White,
                opponent: black.to_string(),
            }]
        );
        assert_eq!(
            coordinator.transport().take_for(black),
            [ServerMessage::GameStart {
                room_id,
                color: Color::Black,
                opponent: white.to_string(),
            }]
        );
    }

    #[test]
    fn test_third_player_is_turned_away() {
        let coordinator = coordinator();
        let (room_id, _, _) = active_room(&coordinator);
        let third = ConnectionId::new();
        assert_eq!(coordinator.join_room(&room_id, third), Err(Error::RoomFull));
        assert_eq!(
            coordinator.join_room(&RoomId::from("nope"), third),
            Err(Error::RoomNotFound)
        );
        assert!(coordinator.transport().take_for(third).is_empty());
    }

    #[test]
    fn test_moves_relayed_in_order() {
        let coordinator = coordinator();
        let (room_id, white, black) = active_room(&coordinator);
        assert_eq!(
            relay(&coordinator, &room_id, white, "e4", AFTER_E4),
            Ok(false)
        );
        assert_eq!(
            relay(&coordinator, &room_id, black, "e5", AFTER_E5),
            Ok(false)
        );
        assert_eq!(
            coordinator.transport().take_for(black),
            [ServerMessage::OpponentMove {
                mv: "e4".to_string(),
                fen: AFTER_E4.to_string()
            }]
        );
        assert_eq!(
            coordinator.transport().take_for(white),
            [ServerMessage::OpponentMove {
                mv: "e5".to_string(),
                fen: AFTER_E5.to_string()
            }]
        );
    }

    #[test]
    fn test_bad_moves_go_nowhere() {
        let coordinator = coordinator();
        let (room_id, white, black) = active_room(&coordinator);
        let outsider = ConnectionId::new();
        assert_eq!(
            relay(&coordinator, &room_id, black, "e5", AFTER_E4),
            Err(Error::NotYourTurn)
        );
        assert_eq!(
            relay(&coordinator, &room_id, outsider, "e4", AFTER_E4),
            Err(Error::NotParticipant)
        );
        assert_eq!(
            relay(&coordinator, &room_id, white, "e5", AFTER_E4),
            Err(Error::Game(game::Error::IllegalMove))
        );
        let desync = relay(&coordinator, &room_id, white, "d4", AFTER_E4);
        assert!(matches!(
            desync,
            Err(Error::Game(game::Error::DesyncDetected { .. }))
        ));
        assert_eq!(desync.unwrap_err().code(), "DesyncDetected");
        assert_eq!(
            relay(&coordinator, &RoomId::from("nope"), white, "e4", AFTER_E4),
            Err(Error::RoomNotFound)
        );
        assert!(coordinator.transport().take_for(black).is_empty());

        // The rejected moves left the game untouched
        assert_eq!(
            relay(&coordinator, &room_id, white, "e2e4", AFTER_E4),
            Ok(false)
        );
    }

    #[test]
    fn test_cannot_move_before_opponent_arrives() {
        let coordinator = coordinator();
        let white = ConnectionId::new();
        let room_id = coordinator.create_room(white);
        assert_eq!(
            relay(&coordinator, &room_id, white, "e4", AFTER_E4),
            Err(Error::NotActive)
        );
    }

    #[test]
    fn test_checkmate_ends_the_room() {
        let coordinator = coordinator();
        let (room_id, white, black) = active_room(&coordinator);
        let moves = [
            (white, "f3", "rnbqkbnr/pppppppp/8/8/8/5P2/PPPPP1PP/RNBQKBNR b KQkq - 0 1"),
            (black, "e5", "rnbqkbnr/pppp1ppp/8/4p3/8/5P2/PPPPP1PP/RNBQKBNR w KQkq e6 0 2"),
            (white, "g4", "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq g3 0 2"),
            (black, "Qh4#", "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3"),
        ];
        for (player, mv, fen) in moves {
            assert_eq!(relay(&coordinator, &room_id, player, mv, fen), Ok(false));
        }
        assert!(matches!(
            coordinator.room_status(&room_id),
            Some(RoomStatus::Ended { .. })
        ));
        let ended = ServerMessage::GameEnded {
            winner: Winner::Black,
        };
        assert_eq!(coordinator.transport().take_for(white).last(), Some(&ended));
        assert_eq!(coordinator.transport().take_for(black).last(), Some(&ended));
        assert_eq!(
            relay(&coordinator, &room_id, white, "a3", AFTER_E4),
            Err(Error::NotActive)
        );
    }

    #[test]
    fn test_game_over_reported_once() {
        let coordinator = coordinator();
        let (room_id, white, black) = active_room(&coordinator);
        assert_eq!(
            coordinator.report_game_over(&room_id, ConnectionId::new(), Winner::White),
            Err(Error::NotParticipant)
        );
        assert_eq!(
            coordinator.report_game_over(&room_id, black, Winner::White),
            Ok(())
        );
        assert_eq!(
            coordinator.report_game_over(&room_id, white, Winner::Draw),
            Ok(())
        );
        for player in [white, black] {
            assert_eq!(
                coordinator.transport().take_for(player),
                [ServerMessage::GameEnded {
                    winner: Winner::White
                }]
            );
        }
        assert_eq!(
            coordinator.join_room(&room_id, ConnectionId::new()),
            Err(Error::NotActive)
        );
    }

    #[test]
    fn test_disconnect_notifies_once() {
        let coordinator = coordinator();
        let (room_id, white, black) = active_room(&coordinator);
        assert_eq!(coordinator.handle_disconnect(black), 1);
        assert_eq!(
            coordinator.transport().take_for(white),
            [ServerMessage::OpponentDisconnected]
        );
        assert!(matches!(
            coordinator.room_status(&room_id),
            Some(RoomStatus::Ended { .. })
        ));
        assert_eq!(coordinator.handle_disconnect(black), 0);
        assert!(coordinator.transport().take_for(white).is_empty());

        assert_eq!(coordinator.handle_disconnect(white), 1);
        assert_eq!(coordinator.room_status(&room_id), None);
        assert_eq!(coordinator.room_count(), 0);
    }

    #[test]
    fn test_empty_waiting_room_removed_at_once() {
        let coordinator = coordinator();
        let creator = ConnectionId::new();
        let room_id = coordinator.create_room(creator);
        assert_eq!(coordinator.handle_disconnect(creator), 1);
        assert_eq!(coordinator.room_count(), 0);
        assert_eq!(
            coordinator.join_room(&room_id, ConnectionId::new()),
            Err(Error::RoomNotFound)
        );
    }

    #[test]
    fn test_ended_rooms_collected_after_grace_period() {
        let coordinator = coordinator();
        let (room_id, white, _) = active_room(&coordinator);
        let (other_room, _, _) = active_room(&coordinator);
        coordinator
            .report_game_over(&room_id, white, Winner::Draw)
            .unwrap();
        let now = Instant::now();
        assert_eq!(coordinator.collect_garbage(now), 0);
        assert_eq!(coordinator.collect_garbage(now + Duration::from_secs(61)), 1);
        assert_eq!(coordinator.room_status(&room_id), None);
        assert_eq!(coordinator.room_status(&other_room), Some(RoomStatus::Active));
    }

    #[test]
    fn test_engine_room_plays_back() {
        let coordinator = coordinator();
        let human = ConnectionId::new();
        let (room_id, ticket) = coordinator.create_engine_room(human, Difficulty::Medium, Color::Black);
        assert_eq!(
            coordinator.transport().take_for(human),
            [ServerMessage::GameStart {
                room_id: room_id.clone(),
                color: Color::Black,
                opponent: ENGINE_OPPONENT.to_string(),
            }]
        );
        let ticket = ticket.unwrap();
        assert_eq!(
            relay(&coordinator, &room_id, human, "e5", AFTER_E4),
            Err(Error::NotYourTurn)
        );
        assert_eq!(
            coordinator.join_room(&room_id, ConnectionId::new()),
            Err(Error::RoomFull)
        );

        let mut engine = SearchEngine::with_seed(SearchBudget::default(), 7);
        let mv = ticket.run(&mut engine);
        assert!(mv.is_some());
        assert_eq!(coordinator.complete_engine_move(ticket.clone(), mv), Ok(true));
        let replies = coordinator.transport().take_for(human);
        assert!(matches!(replies.as_slice(), [ServerMessage::OpponentMove { .. }]));
        // A ticket only counts once
        assert_eq!(coordinator.complete_engine_move(ticket, mv), Ok(false));
    }

    #[test]
    fn test_engine_result_dropped_after_disconnect() {
        let coordinator = coordinator();
        let human = ConnectionId::new();
        let (_, ticket) = coordinator.create_engine_room(human, Difficulty::Easy, Color::Black);
        let ticket = ticket.unwrap();
        coordinator.handle_disconnect(human);
        let mut engine = SearchEngine::with_seed(SearchBudget::default(), 7);
        let mv = ticket.run(&mut engine);
        assert_eq!(coordinator.complete_engine_move(ticket, mv), Ok(false));
        assert_eq!(coordinator.room_count(), 0);
    }

    #[test]
    fn test_engine_without_move_ends_room() {
        let coordinator = coordinator();
        let human = ConnectionId::new();
        let (room_id, ticket) = coordinator.create_engine_room(human, Difficulty::Easy, Color::Black);
        coordinator.transport().clear();
        assert_eq!(coordinator.complete_engine_move(ticket.unwrap(), None), Ok(false));
        assert_eq!(coordinator.room_status(&room_id), Some(RoomStatus::Ended));
        assert_eq!(
            coordinator.transport().take_for(human),
            [ServerMessage::GameEnded {
                winner: Winner::Draw
            }]
        );
    }

    #[test]
    fn test_rejected_engine_move_ends_room() {
        let coordinator = coordinator();
        let (human, other) = (ConnectionId::new(), ConnectionId::new());
        let (room_id, ticket) = coordinator.create_engine_room(human, Difficulty::Easy, Color::Black);
        // A black reply from another room can't be played from the opening position
        let (other_room, _) = coordinator.create_engine_room(other, Difficulty::Easy, Color::White);
        let other_ticket = coordinator
            .relay_move(&other_room, other, "e2e4", AFTER_E4)
            .unwrap()
            .unwrap();
        let mut engine = SearchEngine::with_seed(SearchBudget::default(), 7);
        let black_reply = other_ticket.run(&mut engine);
        assert!(black_reply.is_some());
        coordinator.transport().clear();

        assert!(matches!(
            coordinator.complete_engine_move(ticket.unwrap(), black_reply),
            Err(Error::Game(_))
        ));
        assert_eq!(coordinator.room_status(&room_id), Some(RoomStatus::Ended));
        assert_eq!(
            coordinator.transport().take_for(human),
            [ServerMessage::GameEnded {
                winner: Winner::Draw
            }]
        );
        assert_eq!(coordinator.room_status(&other_room), Some(RoomStatus::Active));
    }

    #[test]
    fn test_human_move_gets_engine_ticket() {
        let coordinator = coordinator();
        let human = ConnectionId::new();
        let (room_id, ticket) = coordinator.create_engine_room(human, Difficulty::Easy, Color::White);
        assert!(ticket.is_none());
        let ticket = coordinator
            .relay_move(&room_id, human, "e2e4", AFTER_E4)
            .unwrap()
            .unwrap();
        assert_eq!(ticket.room_id, room_id);
        assert_eq!(ticket.game.to_fen(), AFTER_E4);
        assert_eq!(ticket.difficulty, Difficulty::Easy);
    }
}
