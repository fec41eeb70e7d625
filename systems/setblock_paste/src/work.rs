//! Per-chunk bookkeeping of boxes that have not yet been observed to match.

use std::collections::BTreeMap;

use remote_paste_core::{BlockBox, ChunkCoord, SpatialBoxIndex};

/// Outstanding boxes keyed by chunk, in placement order within each chunk.
///
/// Boxes only ever leave the map. A chunk entry is dropped as soon as its
/// last box is removed, so the map is empty exactly when all work is done.
#[derive(Clone, Debug, Default)]
pub(crate) struct ChunkWorkMap {
    chunks: BTreeMap<ChunkCoord, Vec<BlockBox>>,
}

impl ChunkWorkMap {
    pub(crate) fn from_index<I>(index: &I) -> Self
    where
        I: SpatialBoxIndex + ?Sized,
    {
        let mut chunks = BTreeMap::new();
        for chunk in index.touched_chunks() {
            let boxes = index.boxes_within_chunk(chunk);
            if !boxes.is_empty() {
                let _ = chunks.insert(chunk, boxes.to_vec());
            }
        }
        Self { chunks }
    }

    /// Snapshot of the chunk keys, safe to hold while the map is mutated.
    pub(crate) fn chunk_keys(&self) -> Vec<ChunkCoord> {
        self.chunks.keys().copied().collect()
    }

    pub(crate) fn box_at(&self, chunk: ChunkCoord, index: usize) -> Option<BlockBox> {
        self.chunks.get(&chunk)?.get(index).copied()
    }

    /// Removes a box, returning `true` when it was the chunk's last one.
    pub(crate) fn remove_box(&mut self, chunk: ChunkCoord, index: usize) -> bool {
        let Some(boxes) = self.chunks.get_mut(&chunk) else {
            return false;
        };

        if index < boxes.len() {
            let _ = boxes.remove(index);
        }

        if boxes.is_empty() {
            let _ = self.chunks.remove(&chunk);
            true
        } else {
            false
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub(crate) fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub(crate) fn box_count(&self) -> usize {
        self.chunks.values().map(Vec::len).sum()
    }
}
