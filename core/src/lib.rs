#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the remote paste engine.
//!
//! This crate defines the value types and collaborator interfaces that connect
//! the paste systems to the worlds they read and the session they write
//! through. The source world holds the already materialized blueprint, the
//! destination world is the partially loaded remote copy, and the session is
//! the narrow command channel that is the only way to mutate the destination.
//! Systems never reach for globals: every collaborator is handed to them
//! explicitly.

use std::fmt;

use serde::{Deserialize, Serialize};

mod command;
mod config;

pub use command::{CommandParseError, SetblockCommand};
pub use config::{ConfigError, PasteConfig};

/// Number of bits a cell coordinate is shifted by to obtain its chunk coordinate.
pub const CHUNK_SHIFT: u32 = 4;

/// Edge length of a chunk column measured in cells.
pub const CHUNK_SIZE: i32 = 1 << CHUNK_SHIFT;

/// Location of a single cell in the voxel world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellPos {
    x: i32,
    y: i32,
    z: i32,
}

impl CellPos {
    /// Creates a new cell position.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// East-west coordinate of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// North-south coordinate of the cell.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Chunk column that contains the cell.
    #[must_use]
    pub const fn chunk(&self) -> ChunkCoord {
        ChunkCoord::new(self.x >> CHUNK_SHIFT, self.z >> CHUNK_SHIFT)
    }
}

impl fmt::Display for CellPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}

/// Horizontal partition of the world, the unit of load and generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    x: i32,
    z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk index along the x axis.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Chunk index along the z axis.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Absolute x coordinate of the chunk's first cell.
    #[must_use]
    pub const fn origin_x(&self) -> i32 {
        self.x << CHUNK_SHIFT
    }

    /// Absolute z coordinate of the chunk's first cell.
    #[must_use]
    pub const fn origin_z(&self) -> i32 {
        self.z << CHUNK_SHIFT
    }

    /// Iterates the 3x3 block of chunks centred on this one, including itself.
    pub fn neighborhood(self) -> impl Iterator<Item = ChunkCoord> {
        (-1..=1).flat_map(move |dx| {
            (-1..=1).map(move |dz| ChunkCoord::new(self.x + dx, self.z + dz))
        })
    }

    /// Squared horizontal distance from the provided cell to the chunk origin.
    ///
    /// Exact for every chunk and cell coordinate.
    #[must_use]
    pub fn distance_squared_to(&self, reference: CellPos) -> u128 {
        let dx = (i64::from(self.x) << CHUNK_SHIFT).abs_diff(i64::from(reference.x()));
        let dz = (i64::from(self.z) << CHUNK_SHIFT).abs_diff(i64::from(reference.z()));
        u128::from(dx) * u128::from(dx) + u128::from(dz) * u128::from(dz)
    }

    /// Column of cells covered by the chunk between the provided heights.
    #[must_use]
    pub fn column(&self, min_y: i32, max_y: i32) -> BlockBox {
        BlockBox::new(
            CellPos::new(self.origin_x(), min_y, self.origin_z()),
            CellPos::new(
                self.origin_x() + CHUNK_SIZE - 1,
                max_y,
                self.origin_z() + CHUNK_SIZE - 1,
            ),
        )
    }
}

/// Axis-aligned region of cells, inclusive on both corners.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockBox {
    min: CellPos,
    max: CellPos,
}

impl BlockBox {
    /// Creates a box spanning the two corners, in any order.
    #[must_use]
    pub fn new(a: CellPos, b: CellPos) -> Self {
        Self {
            min: CellPos::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: CellPos::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Corner with the smallest coordinate on every axis.
    #[must_use]
    pub const fn min(&self) -> CellPos {
        self.min
    }

    /// Corner with the largest coordinate on every axis.
    #[must_use]
    pub const fn max(&self) -> CellPos {
        self.max
    }

    /// Number of cells enclosed by the box, saturating at `u64::MAX`.
    #[must_use]
    pub fn volume(&self) -> u64 {
        let span = |lo: i32, hi: i32| u64::from(lo.abs_diff(hi)) + 1;
        span(self.min.x, self.max.x)
            .saturating_mul(span(self.min.y, self.max.y))
            .saturating_mul(span(self.min.z, self.max.z))
    }

    /// Overlapping region of two boxes, if they share any cell.
    #[must_use]
    pub fn intersection(&self, other: &BlockBox) -> Option<BlockBox> {
        let min = CellPos::new(
            self.min.x.max(other.min.x),
            self.min.y.max(other.min.y),
            self.min.z.max(other.min.z),
        );
        let max = CellPos::new(
            self.max.x.min(other.max.x),
            self.max.y.min(other.max.y),
            self.max.z.min(other.max.z),
        );

        if min.x > max.x || min.y > max.y || min.z > max.z {
            return None;
        }

        Some(Self { min, max })
    }

    /// Chunk columns the box touches, ordered by x then z.
    pub fn chunks(&self) -> impl Iterator<Item = ChunkCoord> {
        let first = self.min.chunk();
        let last = self.max.chunk();
        (first.x..=last.x)
            .flat_map(move |cx| (first.z..=last.z).map(move |cz| ChunkCoord::new(cx, cz)))
    }
}

/// Numeric identity of a block type within a world's palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(u32);

impl BlockId {
    /// Identity reserved for empty space.
    pub const AIR: Self = Self(0);

    /// Creates a new block identity.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identity.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Material identity plus variant occupying one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellState {
    block: BlockId,
    variant: u8,
}

impl CellState {
    /// State of an empty cell.
    pub const AIR: Self = Self::new(BlockId::AIR, 0);

    /// Creates a new cell state.
    #[must_use]
    pub const fn new(block: BlockId, variant: u8) -> Self {
        Self { block, variant }
    }

    /// Block identity of the state.
    #[must_use]
    pub const fn block(&self) -> BlockId {
        self.block
    }

    /// Variant index transmitted alongside the block identifier.
    #[must_use]
    pub const fn variant(&self) -> u8 {
        self.variant
    }
}

impl Default for CellState {
    fn default() -> Self {
        Self::AIR
    }
}

/// Placement pre-partitioned into per-chunk boxes.
pub trait SpatialBoxIndex {
    /// Chunks intersected by at least one box of the placement.
    fn touched_chunks(&self) -> Vec<ChunkCoord>;

    /// Boxes of the placement clipped to the chunk, in placement order.
    fn boxes_within_chunk(&self, chunk: ChunkCoord) -> &[BlockBox];
}

/// Read access to the materialized blueprint.
pub trait SourceWorld {
    /// Reports whether the chunk's blueprint data is fully generated.
    fn is_chunk_generated(&self, chunk: ChunkCoord) -> bool;

    /// Stored state of the cell.
    fn stored_state(&self, pos: CellPos) -> CellState;

    /// Externally known identifier of the block, if it has one.
    fn block_identifier(&self, block: BlockId) -> Option<&str>;
}

/// Read access to the remote, partially loaded destination world.
pub trait DestinationWorld {
    /// Reports whether the chunk is currently loaded.
    fn is_chunk_loaded(&self, chunk: ChunkCoord) -> bool;

    /// State of the cell as it actually renders, including neighbour-derived variants.
    fn effective_state(&self, pos: CellPos) -> CellState;
}

/// The requester's session: its position and the command channel bound to it.
pub trait Session {
    /// Reports whether a destination world and a requester currently exist.
    fn has_world_context(&self) -> bool;

    /// Reports whether the destination can only be mutated through commands.
    fn is_remote(&self) -> bool;

    /// Current position of the requester, used to order progress output.
    fn reference_position(&self) -> Option<CellPos>;

    /// Transmits a single text command.
    fn send_command(&mut self, command: &str);
}

/// Surface that renders progress lines and terminal status messages.
pub trait InfoDisplay {
    /// Begins showing this task's lines.
    fn register(&mut self);

    /// Replaces the displayed lines.
    fn set_lines(&mut self, lines: &[String]);

    /// Stops showing this task's lines.
    fn unregister(&mut self);

    /// Presents the terminal outcome of a paste.
    fn show_outcome(&mut self, outcome: &PasteOutcome);
}

impl<T: SourceWorld + ?Sized> SourceWorld for &T {
    fn is_chunk_generated(&self, chunk: ChunkCoord) -> bool {
        (**self).is_chunk_generated(chunk)
    }

    fn stored_state(&self, pos: CellPos) -> CellState {
        (**self).stored_state(pos)
    }

    fn block_identifier(&self, block: BlockId) -> Option<&str> {
        (**self).block_identifier(block)
    }
}

impl<T: DestinationWorld + ?Sized> DestinationWorld for &T {
    fn is_chunk_loaded(&self, chunk: ChunkCoord) -> bool {
        (**self).is_chunk_loaded(chunk)
    }

    fn effective_state(&self, pos: CellPos) -> CellState {
        (**self).effective_state(pos)
    }
}

impl<T: DestinationWorld + ?Sized> DestinationWorld for &mut T {
    fn is_chunk_loaded(&self, chunk: ChunkCoord) -> bool {
        (**self).is_chunk_loaded(chunk)
    }

    fn effective_state(&self, pos: CellPos) -> CellState {
        (**self).effective_state(pos)
    }
}

impl<T: Session + ?Sized> Session for &mut T {
    fn has_world_context(&self) -> bool {
        (**self).has_world_context()
    }

    fn is_remote(&self) -> bool {
        (**self).is_remote()
    }

    fn reference_position(&self) -> Option<CellPos> {
        (**self).reference_position()
    }

    fn send_command(&mut self, command: &str) {
        (**self).send_command(command);
    }
}

impl<T: InfoDisplay + ?Sized> InfoDisplay for &mut T {
    fn register(&mut self) {
        (**self).register();
    }

    fn set_lines(&mut self, lines: &[String]) {
        (**self).set_lines(lines);
    }

    fn unregister(&mut self) {
        (**self).unregister();
    }

    fn show_outcome(&mut self, outcome: &PasteOutcome) {
        (**self).show_outcome(outcome);
    }
}

/// Terminal result reported when a paste task stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PasteOutcome {
    /// Every box was observed to match the blueprint.
    Completed {
        /// Commands transmitted over the task's lifetime.
        commands_sent: u64,
    },
    /// The task was removed before its work map emptied.
    Failed {
        /// Commands transmitted over the task's lifetime.
        commands_sent: u64,
        /// Chunks that still held unmatched boxes at removal.
        chunks_remaining: usize,
    },
}

impl PasteOutcome {
    /// Reports whether the outcome represents a successful paste.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

impl fmt::Display for PasteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed { commands_sent } => {
                write!(f, "Schematic pasted using {commands_sent} setblock commands")
            }
            Self::Failed { .. } => write!(f, "Schematic paste failed"),
        }
    }
}
