//! Partitioning of placement regions into per-chunk boxes.

use std::collections::BTreeMap;

use remote_paste_core::{BlockBox, ChunkCoord, SpatialBoxIndex};

/// Placement regions clipped to the chunk columns they intersect.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoxIndex {
    boxes: BTreeMap<ChunkCoord, Vec<BlockBox>>,
}

impl BoxIndex {
    /// Splits every region along chunk borders, preserving region order per chunk.
    #[must_use]
    pub fn from_regions(regions: impl IntoIterator<Item = BlockBox>) -> Self {
        let mut boxes: BTreeMap<ChunkCoord, Vec<BlockBox>> = BTreeMap::new();

        for region in regions {
            for chunk in region.chunks() {
                let column = chunk.column(region.min().y(), region.max().y());
                if let Some(clipped) = region.intersection(&column) {
                    boxes.entry(chunk).or_default().push(clipped);
                }
            }
        }

        Self { boxes }
    }

    /// Number of chunks holding at least one box.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.boxes.len()
    }

    /// Number of boxes across all chunks.
    #[must_use]
    pub fn box_count(&self) -> usize {
        self.boxes.values().map(Vec::len).sum()
    }

    /// Number of cells covered by the placement.
    #[must_use]
    pub fn total_volume(&self) -> u64 {
        self.boxes.values().flatten().map(BlockBox::volume).sum()
    }

    /// Reports whether the placement covers nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

impl SpatialBoxIndex for BoxIndex {
    fn touched_chunks(&self) -> Vec<ChunkCoord> {
        self.boxes.keys().copied().collect()
    }

    fn boxes_within_chunk(&self, chunk: ChunkCoord) -> &[BlockBox] {
        self.boxes.get(&chunk).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remote_paste_core::CellPos;

    #[test]
    fn region_inside_one_chunk_stays_whole() {
        let region = BlockBox::new(CellPos::new(1, 60, 1), CellPos::new(14, 70, 3));
        let index = BoxIndex::from_regions([region]);
        assert_eq!(index.touched_chunks(), vec![ChunkCoord::new(0, 0)]);
        assert_eq!(index.boxes_within_chunk(ChunkCoord::new(0, 0)), &[region]);
    }

    #[test]
    fn region_is_clipped_at_chunk_borders() {
        let region = BlockBox::new(CellPos::new(-2, 0, 14), CellPos::new(1, 1, 17));
        let index = BoxIndex::from_regions([region]);

        assert_eq!(index.chunk_count(), 4);
        assert_eq!(index.total_volume(), region.volume());
        assert_eq!(
            index.boxes_within_chunk(ChunkCoord::new(-1, 1)),
            &[BlockBox::new(CellPos::new(-2, 0, 16), CellPos::new(-1, 1, 17))]
        );
        assert_eq!(
            index.boxes_within_chunk(ChunkCoord::new(0, 0)),
            &[BlockBox::new(CellPos::new(0, 0, 14), CellPos::new(1, 1, 15))]
        );
    }

    #[test]
    fn overlapping_regions_keep_placement_order() {
        let first = BlockBox::new(CellPos::new(0, 0, 0), CellPos::new(3, 3, 3));
        let second = BlockBox::new(CellPos::new(2, 0, 2), CellPos::new(5, 1, 5));
        let index = BoxIndex::from_regions([first, second]);

        assert_eq!(index.box_count(), 2);
        assert_eq!(
            index.boxes_within_chunk(ChunkCoord::new(0, 0)),
            &[first, second]
        );
    }

    #[test]
    fn untouched_chunk_has_no_boxes() {
        let index = BoxIndex::default();
        assert!(index.is_empty());
        assert!(index.boxes_within_chunk(ChunkCoord::new(7, 7)).is_empty());
    }
}
