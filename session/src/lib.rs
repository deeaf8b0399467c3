//! Rooms where two players, or a player and the engine, play a game of chess
//!
//! The [`SessionCoordinator`] holds every room. It checks each move against its own copy of the
//! game before handing it on, and sends everything through a [`Transport`], so it knows nothing
//! about sockets.

mod coordinator;
mod error;
pub mod protocol;
mod room;
mod transport;

pub use coordinator::{CoordinatorConfig, SearchTicket, SessionCoordinator, ENGINE_OPPONENT};
pub use error::{Error, Result};
pub use protocol::{ClientMessage, ProtocolError, ServerMessage};
pub use room::{ConnectionId, Opponent, Room, RoomId, RoomStatus};
pub use transport::Transport;
