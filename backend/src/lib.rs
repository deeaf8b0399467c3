//! Serves [`session`] rooms to clients over WebSockets

use std::{
    collections::HashMap,
    convert::Infallible,
    future::Future,
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use futures_util::{SinkExt, StreamExt};
use minimax::SearchEngine;
use serde::Serialize;
use session::{
    ClientMessage, ConnectionId, CoordinatorConfig, SearchTicket, ServerMessage,
    SessionCoordinator, Transport,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use warp::{
    ws::{Message, WebSocket, Ws},
    Filter,
};

/// How often ended rooms are looked for and removed
const SWEEP_INTERVAL: Duration = Duration::from_secs(1);
/// How often room statistics are logged
const STATS_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("failed to start the server: {0}")]
    Bind(#[from] warp::Error),
}

/// Sends messages to the WebSocket connections that are currently open
///
/// Each connection gets a channel, drained into its socket by a task of its own, so sending
/// never waits on the network.
#[derive(Debug, Default)]
pub struct WsTransport {
    clients: Mutex<HashMap<ConnectionId, UnboundedSender<Message>>>,
}

impl WsTransport {
    fn clients(&self) -> MutexGuard<'_, HashMap<ConnectionId, UnboundedSender<Message>>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start delivering messages for a new connection
    pub fn register(&self, connection: ConnectionId) -> UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.clients().insert(connection, tx);
        rx
    }

    pub fn unregister(&self, connection: ConnectionId) {
        self.clients().remove(&connection);
    }

    /// The number of open connections
    pub fn connections(&self) -> usize {
        self.clients().len()
    }
}

impl Transport for WsTransport {
    fn send(&self, to: ConnectionId, message: ServerMessage) {
        let text = match message.encode() {
            Ok(text) => text,
            Err(e) => {
                log::error!("Couldn't encode {message:?}: {e}");
                return;
            }
        };
        if let Some(client) = self.clients().get(&to) {
            // The receiver is only gone while the connection is being torn down
            let _ = client.send(Message::text(text));
        }
    }
}

/// The response body of `/health`
#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    timestamp: String,
    rooms: usize,
    connections: usize,
}

/// Everything a connection handler needs, cheap to clone into each one
#[derive(Clone)]
pub struct Server {
    coordinator: Arc<SessionCoordinator<WsTransport>>,
}

impl Server {
    pub fn new(config: CoordinatorConfig) -> Self {
        Self {
            coordinator: Arc::new(SessionCoordinator::new(WsTransport::default(), config)),
        }
    }

    pub fn coordinator(&self) -> &SessionCoordinator<WsTransport> {
        &self.coordinator
    }

    fn transport(&self) -> &WsTransport {
        self.coordinator.transport()
    }

    /// `/ws` for the game protocol and `/health` for a status report
    pub fn routes(
        &self,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone + Send + Sync + 'static
    {
        let server = self.clone();
        let with_server = warp::any().map(move || server.clone());
        let ws = warp::path("ws")
            .and(warp::path::end())
            .and(warp::ws())
            .and(with_server.clone())
            .map(|ws: Ws, server: Server| {
                ws.on_upgrade(move |socket| server.handle_connection(socket))
            });
        let health = warp::path("health")
            .and(warp::path::end())
            .and(warp::get())
            .and(with_server)
            .and_then(|server: Server| async move {
                Ok::<_, Infallible>(warp::reply::json(&server.health()))
            });
        ws.or(health)
    }

    fn health(&self) -> Health {
        Health {
            status: "ok",
            timestamp: chrono::Utc::now().to_rfc3339(),
            rooms: self.coordinator.room_count(),
            connections: self.transport().connections(),
        }
    }

    /// Serve until `shutdown` completes
    pub async fn serve(
        self,
        addr: SocketAddr,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), Error> {
        let (addr, serving) =
            warp::serve(self.routes()).try_bind_with_graceful_shutdown(addr, shutdown)?;
        log::info!("Listening on {addr}");
        let sweeper = tokio::spawn(self.clone().sweep_rooms());
        let stats = tokio::spawn(self.clone().log_stats());
        serving.await;
        sweeper.abort();
        stats.abort();
        log::info!("Server closed");
        Ok(())
    }

    async fn sweep_rooms(self) {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = self.coordinator.collect_garbage(Instant::now());
            if removed > 0 {
                log::debug!("Swept {removed} ended rooms");
            }
        }
    }

    async fn log_stats(self) {
        let mut interval = tokio::time::interval(STATS_INTERVAL);
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            log::info!(
                "Stats: {} rooms, {} connections",
                self.coordinator.room_count(),
                self.transport().connections()
            );
        }
    }

    async fn handle_connection(self, socket: WebSocket) {
        let connection = ConnectionId::new();
        log::info!("{connection} connected");
        let (mut socket_tx, mut socket_rx) = socket.split();
        let mut outgoing = self.transport().register(connection);
        let forward = tokio::spawn(async move {
            while let Some(message) = outgoing.recv().await {
                if let Err(e) = socket_tx.send(message).await {
                    log::debug!("{connection} stopped receiving: {e}");
                    break;
                }
            }
            let _ = socket_tx.close().await;
        });

        while let Some(received) = socket_rx.next().await {
            let message = match received {
                Ok(message) => message,
                Err(e) => {
                    log::warn!("{connection} errored: {e}");
                    break;
                }
            };
            if message.is_close() {
                break;
            }
            self.handle_frame(connection, &message);
        }

        self.coordinator.handle_disconnect(connection);
        self.transport().unregister(connection);
        let _ = forward.await;
        log::info!("{connection} disconnected");
    }

    /// Act on one non-close frame. Only text frames carry messages.
    pub fn handle_frame(&self, connection: ConnectionId, message: &Message) {
        if let Ok(text) = message.to_str() {
            self.handle_text(connection, text);
        } else if message.is_binary() {
            log::warn!("{connection} sent a binary frame");
            self.transport().send(
                connection,
                ServerMessage::Error {
                    error: "InvalidMessage".to_string(),
                },
            );
        }
    }

    /// Decode one text frame and act on it
    pub fn handle_text(&self, connection: ConnectionId, text: &str) {
        match ClientMessage::decode(text) {
            Ok(message) => self.dispatch(connection, message),
            Err(e) => {
                log::warn!("{connection} sent a bad message: {e}");
                self.transport().send(
                    connection,
                    ServerMessage::Error {
                        error: "InvalidMessage".to_string(),
                    },
                );
            }
        }
    }

    pub fn dispatch(&self, connection: ConnectionId, message: ClientMessage) {
        let result = match message {
            ClientMessage::CreateRoom => {
                self.coordinator.create_room(connection);
                Ok(())
            }
            ClientMessage::JoinRoom { room_id } => self
                .coordinator
                .join_room(&room_id, connection)
                .map(|_| ()),
            ClientMessage::Move { room_id, mv, fen } => self
                .coordinator
                .relay_move(&room_id, connection, &mv, &fen)
                .map(|ticket| self.start_search(ticket)),
            ClientMessage::GameOver { room_id, winner } => {
                self.coordinator
                    .report_game_over(&room_id, connection, winner)
            }
            ClientMessage::PlayEngine { difficulty, color } => {
                let (_, ticket) =
                    self.coordinator
                        .create_engine_room(connection, difficulty, color);
                self.start_search(ticket);
                Ok(())
            }
            ClientMessage::Ping => {
                self.transport().send(connection, ServerMessage::Pong);
                Ok(())
            }
        };
        if let Err(e) = result {
            log::debug!("Request from {connection} failed: {e}");
            self.transport().send(
                connection,
                ServerMessage::Error {
                    error: e.code().to_string(),
                },
            );
        }
    }

    /// Run the engine's search off the async workers, then hand its move back
    fn start_search(&self, ticket: Option<SearchTicket>) {
        let Some(ticket) = ticket else {
            return;
        };
        let coordinator = Arc::clone(&self.coordinator);
        let budget = coordinator.config().search_budget;
        tokio::spawn(async move {
            let searched = tokio::task::spawn_blocking(move || {
                let mv = ticket.run(&mut SearchEngine::new(budget));
                (ticket, mv)
            })
            .await;
            match searched {
                Ok((ticket, mv)) => {
                    let room_id = ticket.room_id.clone();
                    if let Err(e) = coordinator.complete_engine_move(ticket, mv) {
                        log::error!("Engine move in room {room_id} failed: {e}");
                    }
                }
                Err(e) => log::error!("Engine search panicked: {e}"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use board::Color;
    use minimax::Difficulty;
    use serde_json::Value;
    use session::RoomId;

    fn server() -> Server {
        Server::new(CoordinatorConfig::default())
    }

    /// The next message sent to a connection, as JSON
    async fn next(rx: &mut UnboundedReceiver<Message>) -> Value {
        let message = tokio::time::timeout(Duration::from_secs(30), rx.recv())
            .await
            .expect("timed out waiting for a message")
            .expect("channel closed");
        serde_json::from_str(message.to_str().unwrap()).unwrap()
    }

    #[test]
    fn test_transport_drops_unknown_connections() {
        let transport = WsTransport::default();
        let known = ConnectionId::new();
        let mut rx = transport.register(known);
        transport.send(ConnectionId::new(), ServerMessage::Pong);
        transport.send(known, ServerMessage::Pong);
        assert_eq!(
            rx.try_recv().unwrap().to_str().unwrap(),
            r#"{"type":"pong"}"#
        );
        assert!(rx.try_recv().is_err());
        transport.unregister(known);
        assert_eq!(transport.connections(), 0);
    }

    #[tokio::test]
    async fn test_two_players_meet() {
        let server = server();
        let (white, black) = (ConnectionId::new(), ConnectionId::new());
        let mut white_rx = server.transport().register(white);
        let mut black_rx = server.transport().register(black);

        server.handle_text(white, r#"{"type":"create-room"}"#);
        let created = next(&mut white_rx).await;
        assert_eq!(created["type"], "room-created");
        let room_id = created["roomId"].as_str().unwrap().to_string();

        server.dispatch(
            black,
            ClientMessage::JoinRoom {
                room_id: RoomId::from(room_id.as_str()),
            },
        );
        assert_eq!(next(&mut white_rx).await["color"], "white");
        assert_eq!(next(&mut black_rx).await["color"], "black");

        server.handle_text(
            white,
            &format!(
                r#"{{"type":"move","roomId":"{room_id}","move":"e4","fen":"rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"}}"#
            ),
        );
        let relayed = next(&mut black_rx).await;
        assert_eq!(relayed["type"], "opponent-move");
        assert_eq!(relayed["move"], "e4");

        server.handle_text(white, &format!(r#"{{"type":"join-room","roomId":"{room_id}"}}"#));
        assert_eq!(next(&mut white_rx).await["error"], "AlreadyJoined");
    }

    #[tokio::test]
    async fn test_bad_messages_get_errors() {
        let server = server();
        let connection = ConnectionId::new();
        let mut rx = server.transport().register(connection);
        server.handle_text(connection, "{");
        assert_eq!(next(&mut rx).await["error"], "InvalidMessage");
        server.handle_text(connection, r#"{"type":"join-room","roomId":"missing"}"#);
        assert_eq!(next(&mut rx).await["error"], "RoomNotFound");
        server.handle_text(connection, r#"{"type":"ping"}"#);
        assert_eq!(next(&mut rx).await["type"], "pong");
    }

    #[tokio::test]
    async fn test_binary_frames_get_errors() {
        let server = server();
        let connection = ConnectionId::new();
        let mut rx = server.transport().register(connection);
        server.handle_frame(connection, &Message::binary(vec![1, 2, 3]));
        assert_eq!(next(&mut rx).await["error"], "InvalidMessage");
        server.handle_frame(connection, &Message::ping(Vec::new()));
        server.handle_frame(connection, &Message::text(r#"{"type":"ping"}"#));
        assert_eq!(next(&mut rx).await["type"], "pong");
    }

    #[tokio::test]
    async fn test_engine_moves_first_as_white() {
        let server = server();
        let human = ConnectionId::new();
        let mut rx = server.transport().register(human);
        server.dispatch(
            human,
            ClientMessage::PlayEngine {
                difficulty: Difficulty::Easy,
                color: Color::Black,
            },
        );
        let start = next(&mut rx).await;
        assert_eq!(start["type"], "game-start");
        assert_eq!(start["opponent"], "engine");
        let reply = next(&mut rx).await;
        assert_eq!(reply["type"], "opponent-move");
        assert!(reply["fen"].as_str().unwrap().contains(" b KQkq "));
    }

    #[tokio::test]
    async fn test_health() {
        let server = server();
        let response = warp::test::request()
            .path("/health")
            .reply(&server.routes())
            .await;
        assert_eq!(response.status(), 200);
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["rooms"], 0);
    }

    #[tokio::test]
    async fn test_websocket_round_trip() {
        let server = server();
        let mut client = warp::test::ws()
            .path("/ws")
            .handshake(server.routes())
            .await
            .expect("handshake");
        client.send_text(r#"{"type":"create-room"}"#).await;
        let reply = client.recv().await.expect("reply");
        let reply: Value = serde_json::from_str(reply.to_str().unwrap()).unwrap();
        assert_eq!(reply["type"], "room-created");
        assert_eq!(server.coordinator().room_count(), 1);
    }
}
