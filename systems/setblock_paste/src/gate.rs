//! Readiness check deciding whether a chunk may be diffed on this step.

use remote_paste_core::{ChunkCoord, DestinationWorld, SourceWorld};

/// Gate admitting chunks whose blueprint is generated and whose destination
/// neighbourhood is loaded.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChunkGate;

impl ChunkGate {
    /// Reports whether `chunk` can be diffed right now.
    ///
    /// Effective destination states may depend on adjacent cells, so the whole
    /// 3x3 neighbourhood must be loaded before any cell of the centre chunk is
    /// compared. Chunks that fail the check are simply retried later.
    #[must_use]
    pub fn ready<S, D>(source: &S, destination: &D, chunk: ChunkCoord) -> bool
    where
        S: SourceWorld + ?Sized,
        D: DestinationWorld + ?Sized,
    {
        source.is_chunk_generated(chunk)
            && chunk
                .neighborhood()
                .all(|neighbour| destination.is_chunk_loaded(neighbour))
    }
}
