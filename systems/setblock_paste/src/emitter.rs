//! Formatting and transmission of single-cell mutation commands.

use remote_paste_core::{CellPos, CellState, Session, SetblockCommand, SourceWorld};

/// Sends one setblock command per mismatched cell and counts them.
#[derive(Clone, Debug)]
pub struct CommandEmitter {
    command_name: String,
    sent_total: u64,
}

impl CommandEmitter {
    /// Creates an emitter using the configured command name.
    #[must_use]
    pub fn new(command_name: impl Into<String>) -> Self {
        Self {
            command_name: command_name.into(),
            sent_total: 0,
        }
    }

    /// Transmits a command writing `state` at `pos`, returning whether one was sent.
    ///
    /// Blocks without an external identifier cannot be named in a command and
    /// are skipped; the mismatch is found again on the next pass over the cell.
    pub fn emit<S, R>(
        &mut self,
        source: &S,
        session: &mut R,
        pos: CellPos,
        state: CellState,
    ) -> bool
    where
        S: SourceWorld + ?Sized,
        R: Session + ?Sized,
    {
        let Some(identifier) = source.block_identifier(state.block()) else {
            tracing::trace!(
                target: "remote_paste::emitter",
                block = state.block().get(),
                %pos,
                "cell.unresolvable"
            );
            return false;
        };

        let command =
            SetblockCommand::new(self.command_name.as_str(), pos, identifier, state.variant());
        session.send_command(&command.to_string());
        self.sent_total += 1;
        true
    }

    /// Commands transmitted over the emitter's lifetime.
    #[must_use]
    pub const fn sent_total(&self) -> u64 {
        self.sent_total
    }
}
