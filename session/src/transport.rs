use crate::{protocol::ServerMessage, ConnectionId};

/// Delivers messages from the coordinator to connected clients
///
/// Sending never blocks and never fails from the coordinator's point of view: a message for a
/// connection which has gone away is dropped.
pub trait Transport: Send + Sync {
    fn send(&self, to: ConnectionId, message: ServerMessage);
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, to: ConnectionId, message: ServerMessage) {
        (**self).send(to, message)
    }
}
