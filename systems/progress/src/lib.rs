#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Proximity-ordered progress lines for chunks that still hold unmatched boxes.

use remote_paste_core::{CellPos, ChunkCoord};

/// Maintains the display lines describing outstanding paste work.
#[derive(Clone, Debug)]
pub struct ProgressReporter {
    max_lines: usize,
    lines: Vec<String>,
}

impl ProgressReporter {
    /// Creates a reporter showing at most `max_lines` chunk entries.
    #[must_use]
    pub fn new(max_lines: usize) -> Self {
        Self {
            max_lines,
            lines: Vec::new(),
        }
    }

    /// Rebuilds the lines from the remaining chunks.
    ///
    /// Chunks are ordered closest first relative to `reference`; chunks at the
    /// same distance keep the order they were supplied in. Without a reference
    /// position there is nobody to report to and the lines are cleared.
    pub fn rebuild(
        &mut self,
        remaining: impl IntoIterator<Item = ChunkCoord>,
        reference: Option<CellPos>,
    ) -> &[String] {
        self.lines.clear();

        let Some(reference) = reference else {
            return &self.lines;
        };

        let mut chunks: Vec<ChunkCoord> = remaining.into_iter().collect();
        chunks.sort_by_key(|chunk| chunk.distance_squared_to(reference));

        self.lines.push(header_line(chunks.len()));
        self.lines
            .extend(chunks.iter().take(self.max_lines).map(chunk_line));

        &self.lines
    }

    /// Lines produced by the most recent rebuild.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// Header stating how many chunks still hold unmatched boxes.
#[must_use]
pub fn header_line(remaining: usize) -> String {
    format!("Schematic paste: {remaining} chunks remaining")
}

/// Entry describing one chunk in chunk and cell units.
#[must_use]
pub fn chunk_line(chunk: &ChunkCoord) -> String {
    format!(
        "cx: {:5}, cz: {:5} (x: {}, z: {})",
        chunk.x(),
        chunk.z(),
        chunk.origin_x(),
        chunk.origin_z()
    )
}
