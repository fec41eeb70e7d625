//! Session double that loops transmitted commands back into a world.

use remote_paste_core::{CellPos, Session};

/// Records every transmitted command and hands pending ones back on demand.
///
/// Commands sent during a step only reach a destination once they are taken
/// with [`LoopbackSession::take_pending`] and passed to [`crate::deliver`],
/// mirroring the round trip to a server.
#[derive(Clone, Debug)]
pub struct LoopbackSession {
    position: Option<CellPos>,
    remote: bool,
    connected: bool,
    pending: Vec<String>,
    sent: Vec<String>,
}

impl LoopbackSession {
    /// Creates a connected, remote session with the requester at `position`.
    #[must_use]
    pub fn new(position: CellPos) -> Self {
        Self {
            position: Some(position),
            remote: true,
            connected: true,
            pending: Vec::new(),
            sent: Vec::new(),
        }
    }

    /// Moves the requester.
    pub fn set_position(&mut self, position: Option<CellPos>) {
        self.position = position;
    }

    /// Switches between remote and direct mutation modes.
    pub fn set_remote(&mut self, remote: bool) {
        self.remote = remote;
    }

    /// Drops the world context, as happens on disconnect.
    pub fn disconnect(&mut self) {
        self.connected = false;
    }

    /// Every command transmitted so far, in order.
    #[must_use]
    pub fn sent(&self) -> &[String] {
        &self.sent
    }

    /// Commands transmitted since the last delivery.
    #[must_use]
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    /// Hands over commands transmitted since the last call.
    pub fn take_pending(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending)
    }
}

impl Session for LoopbackSession {
    fn has_world_context(&self) -> bool {
        self.connected
    }

    fn is_remote(&self) -> bool {
        self.remote
    }

    fn reference_position(&self) -> Option<CellPos> {
        self.position
    }

    fn send_command(&mut self, command: &str) {
        self.pending.push(command.to_owned());
        self.sent.push(command.to_owned());
    }
}
