//! The messages exchanged with clients, as JSON objects tagged by `"type"`

use board::Color;
use game::Winner;
use minimax::Difficulty;
use serde::{Deserialize, Serialize};

use crate::RoomId;

/// A message which failed to decode as any [`ClientMessage`]
#[derive(Debug, thiserror::Error)]
#[error("malformed client message: {0}")]
pub struct ProtocolError(#[from] serde_json::Error);

/// Everything a client may send
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    CreateRoom,
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_id: RoomId },
    /// A move the sender made on their own board, with the position it produced
    #[serde(rename_all = "camelCase")]
    Move {
        room_id: RoomId,
        #[serde(rename = "move")]
        mv: String,
        fen: String,
    },
    #[serde(rename_all = "camelCase")]
    GameOver { room_id: RoomId, winner: Winner },
    /// Start a game against the engine, playing the given color
    PlayEngine { difficulty: Difficulty, color: Color },
    Ping,
}

impl ClientMessage {
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Everything the server may send
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    RoomCreated { room_id: RoomId },
    /// Both seats are filled; `opponent` identifies who sits across
    #[serde(rename_all = "camelCase")]
    GameStart {
        room_id: RoomId,
        color: Color,
        opponent: String,
    },
    OpponentMove {
        #[serde(rename = "move")]
        mv: String,
        fen: String,
    },
    GameEnded { winner: Winner },
    OpponentDisconnected,
    /// A request failed; `error` is a code like `RoomFull`
    Error { error: String },
    Pong,
}

impl ServerMessage {
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::{json, Value};

    #[test]
    fn test_decode_client_messages() {
        assert_eq!(
            ClientMessage::decode(r#"{"type":"create-room"}"#).unwrap(),
            ClientMessage::CreateRoom
        );
        assert_eq!(
            ClientMessage::decode(r#"{"type":"join-room","roomId":"abc"}"#).unwrap(),
            ClientMessage::JoinRoom {
                room_id: RoomId::from("abc")
            }
        );
        assert_eq!(
            ClientMessage::decode(
                r#"{"type":"move","roomId":"abc","move":"e4","fen":"some fen"}"#
            )
            .unwrap(),
            ClientMessage::Move {
                room_id: RoomId::from("abc"),
                mv: "e4".to_string(),
                fen: "some fen".to_string(),
            }
        );
        assert_eq!(
            ClientMessage::decode(r#"{"type":"game-over","roomId":"abc","winner":"draw"}"#)
                .unwrap(),
            ClientMessage::GameOver {
                room_id: RoomId::from("abc"),
                winner: Winner::Draw,
            }
        );
        assert_eq!(
            ClientMessage::decode(r#"{"type":"play-engine","difficulty":"hard","color":"black"}"#)
                .unwrap(),
            ClientMessage::PlayEngine {
                difficulty: Difficulty::Hard,
                color: Color::Black,
            }
        );
    }

    #[test]
    fn test_rejects_unknown_shapes() {
        for bad in [
            "",
            "not json",
            r#"{"roomId":"abc"}"#,
            r#"{"type":"chat","text":"hi"}"#,
            r#"{"type":"join-room"}"#,
            r#"{"type":"game-over","roomId":"abc","winner":"nobody"}"#,
            r#"{"type":"play-engine","difficulty":"impossible","color":"white"}"#,
        ] {
            assert!(ClientMessage::decode(bad).is_err(), "{bad:?} should not decode");
        }
    }

    #[test]
    fn test_encode_server_messages() {
        let start = ServerMessage::GameStart {
            room_id: RoomId::from("abc"),
            color: Color::White,
            opponent: "someone".to_string(),
        };
        assert_eq!(
            serde_json::from_str::<Value>(&start.encode().unwrap()).unwrap(),
            json!({"type": "game-start", "roomId": "abc", "color": "white", "opponent": "someone"}),
        );
        let relayed = ServerMessage::OpponentMove {
            mv: "e4".to_string(),
            fen: "fen".to_string(),
        };
        assert_eq!(
            serde_json::from_str::<Value>(&relayed.encode().unwrap()).unwrap(),
            json!({"type": "opponent-move", "move": "e4", "fen": "fen"}),
        );
        assert_eq!(
            ServerMessage::OpponentDisconnected.encode().unwrap(),
            r#"{"type":"opponent-disconnected"}"#
        );
        assert_eq!(
            ServerMessage::GameEnded {
                winner: Winner::White
            }
            .encode()
            .unwrap(),
            r#"{"type":"game-ended","winner":"white"}"#
        );
    }
}
