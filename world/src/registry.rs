//! Palette mapping numeric block identities to their external identifiers.

use std::collections::HashMap;

use remote_paste_core::BlockId;

const AIR_IDENTIFIER: &str = "minecraft:air";

#[derive(Clone, Debug)]
struct BlockEntry {
    identifier: Option<String>,
    connects: bool,
}

/// Registry of every block type known to a world.
///
/// Identity zero is always air. Blocks registered as connecting derive their
/// rendered variant from horizontally adjacent cells of the same block, which
/// is what makes a destination's effective state differ from its stored one.
#[derive(Clone, Debug)]
pub struct BlockRegistry {
    entries: Vec<BlockEntry>,
    by_identifier: HashMap<String, BlockId>,
}

impl BlockRegistry {
    /// Creates a registry containing only air.
    #[must_use]
    pub fn new() -> Self {
        let mut by_identifier = HashMap::new();
        let _ = by_identifier.insert(AIR_IDENTIFIER.to_owned(), BlockId::AIR);
        Self {
            entries: vec![BlockEntry {
                identifier: Some(AIR_IDENTIFIER.to_owned()),
                connects: false,
            }],
            by_identifier,
        }
    }

    /// Registers a plain block, returning the existing identity when already known.
    pub fn register(&mut self, identifier: &str) -> BlockId {
        self.insert(identifier, false)
    }

    /// Registers a block whose variant follows its horizontal neighbours.
    pub fn register_connecting(&mut self, identifier: &str) -> BlockId {
        self.insert(identifier, true)
    }

    /// Registers a block that has no external identifier.
    pub fn register_unnamed(&mut self) -> BlockId {
        self.push(BlockEntry {
            identifier: None,
            connects: false,
        })
    }

    /// External identifier of the block, if it has one.
    #[must_use]
    pub fn identifier(&self, block: BlockId) -> Option<&str> {
        self.entry(block)?.identifier.as_deref()
    }

    /// Identity registered under the identifier.
    #[must_use]
    pub fn lookup(&self, identifier: &str) -> Option<BlockId> {
        self.by_identifier.get(identifier).copied()
    }

    /// Reports whether the block derives its variant from neighbours.
    #[must_use]
    pub fn connects(&self, block: BlockId) -> bool {
        self.entry(block).map_or(false, |entry| entry.connects)
    }

    /// Number of registered blocks, air included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false, air is registered on construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, identifier: &str, connects: bool) -> BlockId {
        if let Some(existing) = self.lookup(identifier) {
            return existing;
        }

        let block = self.push(BlockEntry {
            identifier: Some(identifier.to_owned()),
            connects,
        });
        let _ = self.by_identifier.insert(identifier.to_owned(), block);
        block
    }

    fn push(&mut self, entry: BlockEntry) -> BlockId {
        let index = u32::try_from(self.entries.len()).unwrap_or(u32::MAX);
        self.entries.push(entry);
        BlockId::new(index)
    }

    fn entry(&self, block: BlockId) -> Option<&BlockEntry> {
        let index = usize::try_from(block.get()).ok()?;
        self.entries.get(index)
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_is_identity_zero() {
        let registry = BlockRegistry::new();
        assert_eq!(registry.lookup("minecraft:air"), Some(BlockId::AIR));
        assert_eq!(registry.identifier(BlockId::AIR), Some("minecraft:air"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn registering_twice_returns_same_identity() {
        let mut registry = BlockRegistry::new();
        let stone = registry.register("minecraft:stone");
        assert_eq!(registry.register("minecraft:stone"), stone);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn unnamed_blocks_have_no_identifier() {
        let mut registry = BlockRegistry::new();
        let mystery = registry.register_unnamed();
        assert_eq!(registry.identifier(mystery), None);
        assert_eq!(registry.identifier(BlockId::new(99)), None);
    }

    #[test]
    fn connecting_flag_is_tracked_per_block() {
        let mut registry = BlockRegistry::new();
        let fence = registry.register_connecting("minecraft:oak_fence");
        let stone = registry.register("minecraft:stone");
        assert!(registry.connects(fence));
        assert!(!registry.connects(stone));
    }
}
