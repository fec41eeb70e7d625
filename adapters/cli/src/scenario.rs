//! TOML description of a paste run against the in-memory world.

use std::collections::HashMap;

use remote_paste_core::{BlockBox, CellPos, CellState, ConfigError, PasteConfig};
use remote_paste_world::{BlockRegistry, BoxIndex, LoopbackSession, VoxelWorld};
use serde::Deserialize;
use thiserror::Error;

const AIR_IDENTIFIER: &str = "minecraft:air";

/// Largest square of chunks, in chunks from the centre, the destination loads.
const MAX_LOAD_RADIUS: i32 = 64;

/// Blueprint, destination and requester making up one paste run.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    #[serde(default)]
    paste: PasteConfig,
    #[serde(default = "default_tick_interval")]
    tick_interval: u32,
    requester: Requester,
    #[serde(default)]
    regions: Vec<Region>,
    #[serde(default)]
    prefill: Vec<Region>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Requester {
    position: [i32; 3],
    #[serde(default = "default_load_radius")]
    load_radius: i32,
}

/// Box filled with a single block, either pasted or already at the destination.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Region {
    min: [i32; 3],
    max: [i32; 3],
    block: String,
    #[serde(default)]
    variant: u8,
    #[serde(default)]
    connecting: bool,
}

impl Region {
    fn bounds(&self) -> BlockBox {
        BlockBox::new(cell(self.min), cell(self.max))
    }
}

const fn default_tick_interval() -> u32 {
    1
}

const fn default_load_radius() -> i32 {
    3
}

fn cell([x, y, z]: [i32; 3]) -> CellPos {
    CellPos::new(x, y, z)
}

/// Everything needed to start the paste task described by a scenario.
#[derive(Debug)]
pub(crate) struct Setup {
    pub(crate) config: PasteConfig,
    pub(crate) tick_interval: u32,
    pub(crate) index: BoxIndex,
    pub(crate) source: VoxelWorld,
    pub(crate) destination: VoxelWorld,
    pub(crate) session: LoopbackSession,
}

/// Reasons a scenario file is rejected.
#[derive(Debug, Error)]
pub(crate) enum ScenarioError {
    /// The file is not a valid scenario document.
    #[error("could not parse scenario: {0}")]
    Parse(#[from] toml::de::Error),
    /// The `[paste]` table holds invalid values.
    #[error("invalid paste configuration")]
    Config(#[from] ConfigError),
    /// A region names no block.
    #[error("region {index} has an empty block identifier")]
    EmptyBlock {
        /// Position of the region within its list.
        index: usize,
    },
    /// The same block is declared both connecting and plain.
    #[error("block '{0}' is declared both connecting and non-connecting")]
    ConflictingConnection(String),
    /// Chunks are loaded in a square around the requester.
    #[error("load radius must not be negative, got {0}")]
    NegativeLoadRadius(i32),
    /// The square of loaded chunks would be unreasonably large.
    #[error("load radius {radius} exceeds the maximum of {max}")]
    LoadRadiusTooLarge {
        /// Requested radius in chunks.
        radius: i32,
        /// Largest accepted radius in chunks.
        max: i32,
    },
}

impl Scenario {
    /// Parses and validates a scenario document.
    pub(crate) fn from_toml_str(contents: &str) -> Result<Self, ScenarioError> {
        let scenario: Self = toml::from_str(contents)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Number of regions the blueprint pastes.
    pub(crate) fn region_count(&self) -> usize {
        self.regions.len()
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        self.paste.validate()?;

        if self.requester.load_radius < 0 {
            return Err(ScenarioError::NegativeLoadRadius(self.requester.load_radius));
        }
        if self.requester.load_radius > MAX_LOAD_RADIUS {
            return Err(ScenarioError::LoadRadiusTooLarge {
                radius: self.requester.load_radius,
                max: MAX_LOAD_RADIUS,
            });
        }

        let mut connecting: HashMap<&str, bool> = HashMap::new();
        let _ = connecting.insert(AIR_IDENTIFIER, false);
        for (index, region) in self.regions.iter().chain(&self.prefill).enumerate() {
            if region.block.trim().is_empty() {
                return Err(ScenarioError::EmptyBlock { index });
            }
            let declared = *connecting
                .entry(region.block.as_str())
                .or_insert(region.connecting);
            if declared != region.connecting {
                return Err(ScenarioError::ConflictingConnection(region.block.clone()));
            }
        }

        Ok(())
    }

    /// Builds the worlds, placement index and session for the run.
    ///
    /// Blueprint regions are written in order, so later regions overwrite
    /// earlier ones, and every chunk they touch counts as generated. The
    /// destination starts with the prefill regions and loads the chunks
    /// around the requester.
    pub(crate) fn build(&self) -> Setup {
        let mut registry = BlockRegistry::new();
        for region in self.regions.iter().chain(&self.prefill) {
            let _ = if region.connecting {
                registry.register_connecting(&region.block)
            } else {
                registry.register(&region.block)
            };
        }

        let mut source = VoxelWorld::new(registry.clone());
        let mut destination = VoxelWorld::new(registry);

        for region in &self.regions {
            fill(&mut source, region);
            source.mark_region_generated(region.bounds());
        }
        for region in &self.regions {
            source.connect_region(region.bounds());
        }

        for region in &self.prefill {
            fill(&mut destination, region);
        }
        let position = cell(self.requester.position);
        destination.load_area(position.chunk(), self.requester.load_radius);

        tracing::info!(
            target: "remote_paste::cli",
            regions = self.regions.len(),
            prefill = self.prefill.len(),
            blocks = source.registry().len(),
            "scenario.built"
        );

        Setup {
            config: self.paste.clone(),
            tick_interval: self.tick_interval,
            index: BoxIndex::from_regions(self.regions.iter().map(Region::bounds)),
            source,
            destination,
            session: LoopbackSession::new(position),
        }
    }
}

fn fill(world: &mut VoxelWorld, region: &Region) {
    let state = world
        .registry()
        .lookup(&region.block)
        .map(|block| CellState::new(block, region.variant))
        .unwrap_or(CellState::AIR);
    world.fill(region.bounds(), state);
}
