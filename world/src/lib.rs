#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! In-memory voxel world used as both blueprint source and simulated destination.

use std::collections::{BTreeSet, HashMap};

use remote_paste_core::{
    BlockBox, BlockId, CellPos, CellState, ChunkCoord, DestinationWorld, SetblockCommand,
    SourceWorld,
};
use thiserror::Error;

mod placement;
mod registry;
mod session;

pub use placement::BoxIndex;
pub use registry::BlockRegistry;
pub use session::LoopbackSession;

const NORTH: u8 = 1;
const EAST: u8 = 2;
const SOUTH: u8 = 4;
const WEST: u8 = 8;

/// Sparse voxel store with chunk generation and load tracking.
#[derive(Clone, Debug)]
pub struct VoxelWorld {
    registry: BlockRegistry,
    cells: HashMap<CellPos, CellState>,
    generated: BTreeSet<ChunkCoord>,
    loaded: BTreeSet<ChunkCoord>,
}

impl VoxelWorld {
    /// Creates an empty world whose palette is the provided registry.
    #[must_use]
    pub fn new(registry: BlockRegistry) -> Self {
        Self {
            registry,
            cells: HashMap::new(),
            generated: BTreeSet::new(),
            loaded: BTreeSet::new(),
        }
    }

    /// Palette shared by every cell of the world.
    #[must_use]
    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    /// Writes the stored state of a single cell.
    pub fn set_state(&mut self, pos: CellPos, state: CellState) {
        if state == CellState::AIR {
            let _ = self.cells.remove(&pos);
        } else {
            let _ = self.cells.insert(pos, state);
        }
    }

    /// Writes the same stored state into every cell of the box.
    pub fn fill(&mut self, region: BlockBox, state: CellState) {
        let (min, max) = (region.min(), region.max());
        for z in min.z()..=max.z() {
            for x in min.x()..=max.x() {
                for y in min.y()..=max.y() {
                    self.set_state(CellPos::new(x, y, z), state);
                }
            }
        }
    }

    /// Stored state of the cell, regardless of load status.
    #[must_use]
    pub fn stored(&self, pos: CellPos) -> CellState {
        self.cells.get(&pos).copied().unwrap_or(CellState::AIR)
    }

    /// Marks the chunk's data as fully generated.
    pub fn mark_generated(&mut self, chunk: ChunkCoord) {
        let _ = self.generated.insert(chunk);
    }

    /// Marks every chunk touched by the box as fully generated.
    pub fn mark_region_generated(&mut self, region: BlockBox) {
        for chunk in region.chunks() {
            self.mark_generated(chunk);
        }
    }

    /// Loads the chunk.
    pub fn load_chunk(&mut self, chunk: ChunkCoord) {
        let _ = self.loaded.insert(chunk);
    }

    /// Unloads the chunk. Stored cells are kept.
    pub fn unload_chunk(&mut self, chunk: ChunkCoord) {
        let _ = self.loaded.remove(&chunk);
    }

    /// Loads every chunk within `radius` chunks of `center` on both axes.
    pub fn load_area(&mut self, center: ChunkCoord, radius: i32) {
        for cx in center.x() - radius..=center.x() + radius {
            for cz in center.z() - radius..=center.z() + radius {
                self.load_chunk(ChunkCoord::new(cx, cz));
            }
        }
    }

    fn visible(&self, pos: CellPos) -> CellState {
        if self.loaded.contains(&pos.chunk()) {
            self.stored(pos)
        } else {
            CellState::AIR
        }
    }

    /// Rewrites every connecting block in the box with the variant its stored
    /// neighbours give it.
    pub fn connect_region(&mut self, region: BlockBox) {
        let (min, max) = (region.min(), region.max());
        for z in min.z()..=max.z() {
            for x in min.x()..=max.x() {
                for y in min.y()..=max.y() {
                    let pos = CellPos::new(x, y, z);
                    let block = self.stored(pos).block();
                    if self.registry.connects(block) {
                        let mask = self.connections(pos, block, Self::stored);
                        self.set_state(pos, CellState::new(block, mask));
                    }
                }
            }
        }
    }

    fn connections(
        &self,
        pos: CellPos,
        block: BlockId,
        read: fn(&Self, CellPos) -> CellState,
    ) -> u8 {
        let neighbours = [
            (CellPos::new(pos.x(), pos.y(), pos.z() - 1), NORTH),
            (CellPos::new(pos.x() + 1, pos.y(), pos.z()), EAST),
            (CellPos::new(pos.x(), pos.y(), pos.z() + 1), SOUTH),
            (CellPos::new(pos.x() - 1, pos.y(), pos.z()), WEST),
        ];

        neighbours
            .iter()
            .filter(|(neighbour, _)| read(self, *neighbour).block() == block)
            .fold(0, |mask, (_, side)| mask | side)
    }
}

impl SourceWorld for VoxelWorld {
    fn is_chunk_generated(&self, chunk: ChunkCoord) -> bool {
        self.generated.contains(&chunk)
    }

    fn stored_state(&self, pos: CellPos) -> CellState {
        self.stored(pos)
    }

    fn block_identifier(&self, block: BlockId) -> Option<&str> {
        self.registry.identifier(block)
    }
}

impl DestinationWorld for VoxelWorld {
    fn is_chunk_loaded(&self, chunk: ChunkCoord) -> bool {
        self.loaded.contains(&chunk)
    }

    fn effective_state(&self, pos: CellPos) -> CellState {
        let state = self.visible(pos);
        if self.registry.connects(state.block()) {
            let mask = self.connections(pos, state.block(), Self::visible);
            CellState::new(state.block(), mask)
        } else {
            state
        }
    }
}

/// Reasons a received command could not be applied.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ApplyError {
    /// The identifier is not part of the world's palette.
    #[error("unknown block identifier '{0}'")]
    UnknownBlock(String),
    /// The target cell lies in a chunk that is not loaded.
    #[error("chunk {x}, {z} is not loaded")]
    ChunkNotLoaded {
        /// Chunk index along the x axis.
        x: i32,
        /// Chunk index along the z axis.
        z: i32,
    },
}

/// Applies a received setblock command to the world.
pub fn apply(world: &mut VoxelWorld, command: &SetblockCommand) -> Result<(), ApplyError> {
    let block = world
        .registry
        .lookup(command.identifier())
        .ok_or_else(|| ApplyError::UnknownBlock(command.identifier().to_owned()))?;

    let chunk = command.pos().chunk();
    if !world.loaded.contains(&chunk) {
        return Err(ApplyError::ChunkNotLoaded {
            x: chunk.x(),
            z: chunk.z(),
        });
    }

    world.set_state(command.pos(), CellState::new(block, command.variant()));
    Ok(())
}

/// Applies received command lines in order, returning how many took effect.
///
/// Lines that do not parse or cannot be applied are logged and dropped, the
/// same way a server ignores a malformed command.
pub fn deliver(world: &mut VoxelWorld, commands: impl IntoIterator<Item = String>) -> usize {
    let mut applied = 0;
    for line in commands {
        let result = SetblockCommand::parse(&line)
            .map_err(|error| error.to_string())
            .and_then(|command| apply(world, &command).map_err(|error| error.to_string()));

        match result {
            Ok(()) => applied += 1,
            Err(reason) => tracing::warn!(
                target: "remote_paste::loopback",
                command = %line,
                %reason,
                "command.rejected"
            ),
        }
    }
    applied
}

/// Query functions that compare worlds without mutating them.
pub mod query {
    use remote_paste_core::{BlockBox, CellPos, ChunkCoord, DestinationWorld, SourceWorld};

    use super::VoxelWorld;

    /// Cells of the box whose destination effective state differs from the source.
    #[must_use]
    pub fn mismatched_cells(
        source: &impl SourceWorld,
        destination: &impl DestinationWorld,
        region: BlockBox,
    ) -> Vec<CellPos> {
        let (min, max) = (region.min(), region.max());
        let mut mismatched = Vec::new();
        for z in min.z()..=max.z() {
            for x in min.x()..=max.x() {
                for y in min.y()..=max.y() {
                    let pos = CellPos::new(x, y, z);
                    if source.stored_state(pos) != destination.effective_state(pos) {
                        mismatched.push(pos);
                    }
                }
            }
        }
        mismatched
    }

    /// Chunks currently loaded, in ascending order.
    #[must_use]
    pub fn loaded_chunks(world: &VoxelWorld) -> Vec<ChunkCoord> {
        world.loaded.iter().copied().collect()
    }

    /// Number of non-air cells stored in the world.
    #[must_use]
    pub fn stored_cell_count(world: &VoxelWorld) -> usize {
        world.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_fence() -> (VoxelWorld, BlockId) {
        let mut registry = BlockRegistry::new();
        let fence = registry.register_connecting("minecraft:oak_fence");
        (VoxelWorld::new(registry), fence)
    }

    #[test]
    fn unloaded_cells_read_as_air() {
        let (mut world, fence) = world_with_fence();
        let pos = CellPos::new(3, 64, 3);
        world.set_state(pos, CellState::new(fence, 0));

        assert_eq!(world.effective_state(pos), CellState::AIR);
        world.load_chunk(pos.chunk());
        assert_eq!(world.effective_state(pos).block(), fence);
    }

    #[test]
    fn connecting_blocks_derive_variant_from_neighbours() {
        let (mut world, fence) = world_with_fence();
        world.load_area(ChunkCoord::new(0, 0), 1);
        let centre = CellPos::new(0, 64, 5);
        world.set_state(centre, CellState::new(fence, 0));
        world.set_state(CellPos::new(1, 64, 5), CellState::new(fence, 0));
        world.set_state(CellPos::new(0, 64, 4), CellState::new(fence, 0));

        assert_eq!(world.stored(centre), CellState::new(fence, 0));
        assert_eq!(
            world.effective_state(centre),
            CellState::new(fence, NORTH | EAST)
        );
    }

    #[test]
    fn neighbours_in_unloaded_chunks_do_not_connect() {
        let (mut world, fence) = world_with_fence();
        world.load_chunk(ChunkCoord::new(0, 0));
        world.set_state(CellPos::new(0, 64, 5), CellState::new(fence, 0));
        world.set_state(CellPos::new(-1, 64, 5), CellState::new(fence, 0));

        assert_eq!(
            world.effective_state(CellPos::new(0, 64, 5)),
            CellState::new(fence, 0)
        );
        world.load_chunk(ChunkCoord::new(-1, 0));
        assert_eq!(
            world.effective_state(CellPos::new(0, 64, 5)),
            CellState::new(fence, WEST)
        );
    }

    #[test]
    fn connect_region_matches_what_a_loaded_destination_renders() {
        let (mut world, fence) = world_with_fence();
        let line = BlockBox::new(CellPos::new(-1, 64, 2), CellPos::new(1, 64, 2));
        world.fill(line, CellState::new(fence, 0));
        world.connect_region(line);

        assert_eq!(world.stored(CellPos::new(-1, 64, 2)), CellState::new(fence, EAST));
        assert_eq!(
            world.stored(CellPos::new(0, 64, 2)),
            CellState::new(fence, EAST | WEST)
        );
        world.load_area(ChunkCoord::new(0, 0), 1);
        assert_eq!(
            world.effective_state(CellPos::new(0, 64, 2)),
            world.stored(CellPos::new(0, 64, 2))
        );
    }

    #[test]
    fn apply_writes_resolved_state() {
        let mut registry = BlockRegistry::new();
        let stone = registry.register("minecraft:stone");
        let mut world = VoxelWorld::new(registry);
        world.load_chunk(ChunkCoord::new(0, 0));

        let command = SetblockCommand::new("setblock", CellPos::new(2, 10, 2), "minecraft:stone", 1);
        apply(&mut world, &command).expect("command applies");
        assert_eq!(world.stored(CellPos::new(2, 10, 2)), CellState::new(stone, 1));
    }

    #[test]
    fn apply_rejects_unknown_blocks_and_unloaded_targets() {
        let mut world = VoxelWorld::new(BlockRegistry::new());
        let unknown = SetblockCommand::new("setblock", CellPos::new(0, 0, 0), "minecraft:nope", 0);
        assert_eq!(
            apply(&mut world, &unknown),
            Err(ApplyError::UnknownBlock("minecraft:nope".to_owned()))
        );

        let unloaded = SetblockCommand::new("setblock", CellPos::new(-20, 0, 0), "minecraft:air", 0);
        assert_eq!(
            apply(&mut world, &unloaded),
            Err(ApplyError::ChunkNotLoaded { x: -2, z: 0 })
        );
    }

    #[test]
    fn writing_air_clears_the_cell() {
        let mut registry = BlockRegistry::new();
        let stone = registry.register("minecraft:stone");
        let mut world = VoxelWorld::new(registry);
        let region = BlockBox::new(CellPos::new(0, 0, 0), CellPos::new(1, 1, 1));
        world.fill(region, CellState::new(stone, 0));
        assert_eq!(query::stored_cell_count(&world), 8);

        world.set_state(CellPos::new(0, 0, 0), CellState::AIR);
        assert_eq!(query::stored_cell_count(&world), 7);
    }

    #[test]
    fn mismatches_compare_source_against_effective_state() {
        let mut registry = BlockRegistry::new();
        let stone = registry.register("minecraft:stone");
        let mut source = VoxelWorld::new(registry.clone());
        let mut destination = VoxelWorld::new(registry);
        destination.load_chunk(ChunkCoord::new(0, 0));

        let region = BlockBox::new(CellPos::new(0, 0, 0), CellPos::new(2, 0, 0));
        source.fill(region, CellState::new(stone, 0));
        destination.set_state(CellPos::new(1, 0, 0), CellState::new(stone, 0));

        assert_eq!(
            query::mismatched_cells(&source, &destination, region),
            vec![CellPos::new(0, 0, 0), CellPos::new(2, 0, 0)]
        );
    }
}
