pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Why a request to the coordinator was turned down
///
/// None of these change any room.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("no room has that id")]
    RoomNotFound,
    #[error("room already has two players")]
    RoomFull,
    #[error("room isn't in a playable state")]
    NotActive,
    #[error("already a participant in that room")]
    AlreadyJoined,
    #[error("not a participant in that room")]
    NotParticipant,
    #[error("it isn't this player's turn")]
    NotYourTurn,
    #[error(transparent)]
    Game(#[from] game::Error),
}

impl Error {
    /// The code sent to the client in an `error` message
    ///
    /// ```
    /// use session::Error;
    /// assert_eq!(Error::RoomFull.code(), "RoomFull");
    /// assert_eq!(Error::from(game::Error::IllegalMove).code(), "IllegalMove");
    /// ```
    pub fn code(&self) -> &'static str {
        match self {
            Self::RoomNotFound => "RoomNotFound",
            Self::RoomFull => "RoomFull",
            Self::NotActive => "NotActive",
            Self::AlreadyJoined => "AlreadyJoined",
            Self::NotParticipant => "NotParticipant",
            Self::NotYourTurn => "NotYourTurn",
            Self::Game(game::Error::IllegalMove) => "IllegalMove",
            Self::Game(game::Error::DesyncDetected { .. }) => "DesyncDetected",
            Self::Game(game::Error::InvalidPosition(_)) => "InvalidPosition",
            Self::Game(game::Error::CorruptState(_)) => "CorruptState",
            Self::Game(_) => "GameError",
        }
    }
}
