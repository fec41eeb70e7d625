#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Rate-limited task that applies a blueprint to a remote world one setblock
//! command at a time.
//!
//! The destination can only be mutated through a narrow text command channel,
//! and both the blueprint and the destination are only partially loaded at any
//! instant. Each step diffs ready chunks cell by cell against the blueprint and
//! transmits one command per mismatch, up to the configured per-step limit. A
//! box leaves the work map once a single pass over it found nothing left to
//! send; partially processed boxes are rescanned from their first cell on a
//! later step, which keeps the task idempotent and resumable.

use remote_paste_core::{
    DestinationWorld, InfoDisplay, PasteConfig, PasteOutcome, Session, SourceWorld,
    SpatialBoxIndex,
};
use remote_paste_system_progress::ProgressReporter;
use remote_paste_system_scheduler::Task;

mod emitter;
mod engine;
mod gate;
mod work;

pub use emitter::CommandEmitter;
pub use gate::ChunkGate;

use engine::{scan_box, ScanContext, StepBudget};
use work::ChunkWorkMap;

/// Lifecycle of a paste task as seen by its host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskState {
    /// Work remains and the task keeps running while eligible.
    Active,
    /// The work map emptied through normal processing.
    Finished,
    /// The task was stopped before its work map emptied.
    Cancelled,
}

/// Paste task driving setblock commands through a remote session.
#[derive(Debug)]
pub struct SetblockPasteTask<S, D, R, P> {
    source: S,
    destination: D,
    session: R,
    display: P,
    work: ChunkWorkMap,
    emitter: CommandEmitter,
    budget: StepBudget,
    progress: ProgressReporter,
    state: TaskState,
    stopped: bool,
}

impl<S, D, R, P> SetblockPasteTask<S, D, R, P>
where
    S: SourceWorld,
    D: DestinationWorld,
    R: Session,
    P: InfoDisplay,
{
    /// Creates a task covering every box of the placement index.
    ///
    /// The display is registered immediately and receives the initial
    /// progress lines.
    pub fn new<I>(
        index: &I,
        config: &PasteConfig,
        source: S,
        destination: D,
        session: R,
        display: P,
    ) -> Self
    where
        I: SpatialBoxIndex + ?Sized,
    {
        let work = ChunkWorkMap::from_index(index);
        tracing::info!(
            target: "remote_paste::task",
            chunks = work.chunk_count(),
            boxes = work.box_count(),
            command_limit = config.command_limit(),
            "paste.created"
        );

        let mut task = Self {
            source,
            destination,
            session,
            display,
            work,
            emitter: CommandEmitter::new(config.setblock_command()),
            budget: StepBudget::new(config.command_limit()),
            progress: ProgressReporter::new(config.max_progress_lines()),
            state: TaskState::Active,
            stopped: false,
        };
        task.display.register();
        task.refresh_progress();
        task
    }

    /// Reports whether the task should keep running.
    ///
    /// Requires outstanding work, a live world context and a session that can
    /// only mutate the destination through commands. Re-evaluated every tick.
    #[must_use]
    pub fn eligible(&self) -> bool {
        !self.work.is_empty() && self.session.has_world_context() && self.session.is_remote()
    }

    /// Reports whether the host should remove the task.
    #[must_use]
    pub fn should_be_removed(&self) -> bool {
        !self.eligible()
    }

    /// Runs one bounded step, returning `true` once every box matched.
    pub fn step(&mut self) -> bool {
        self.budget.reset();
        let mut completed_boxes = 0_usize;
        let mut completed_chunks = 0_usize;
        let mut skipped_chunks = 0_usize;

        'chunks: for chunk in self.work.chunk_keys() {
            if !ChunkGate::ready(&self.source, &self.destination, chunk) {
                skipped_chunks += 1;
                continue;
            }

            let mut index = 0;
            while let Some(block_box) = self.work.box_at(chunk, index) {
                let covered = scan_box(
                    block_box,
                    ScanContext {
                        source: &self.source,
                        destination: &self.destination,
                        session: &mut self.session,
                        emitter: &mut self.emitter,
                        budget: &mut self.budget,
                    },
                );

                if covered {
                    completed_boxes += 1;
                    if self.work.remove_box(chunk, index) {
                        completed_chunks += 1;
                        tracing::debug!(
                            target: "remote_paste::engine",
                            cx = chunk.x(),
                            cz = chunk.z(),
                            "chunk.completed"
                        );
                    }
                } else {
                    index += 1;
                }

                if self.budget.exhausted() {
                    break 'chunks;
                }
            }
        }

        tracing::debug!(
            target: "remote_paste::engine",
            sent = self.budget.spent(),
            completed_boxes,
            completed_chunks,
            skipped_chunks,
            remaining_chunks = self.work.chunk_count(),
            "step.finished"
        );

        if completed_boxes > 0 {
            self.refresh_progress();
        }

        if self.work.is_empty() {
            if self.state == TaskState::Active {
                tracing::info!(
                    target: "remote_paste::task",
                    commands_sent = self.emitter.sent_total(),
                    "paste.completed"
                );
            }
            self.state = TaskState::Finished;
            return true;
        }

        false
    }

    /// Reports the outcome and releases the display. Only the first call has an effect.
    pub fn on_stop(&mut self) -> Option<PasteOutcome> {
        if self.stopped {
            return None;
        }
        self.stopped = true;

        let commands_sent = self.emitter.sent_total();
        let outcome = if self.state == TaskState::Finished {
            PasteOutcome::Completed { commands_sent }
        } else {
            self.state = TaskState::Cancelled;
            PasteOutcome::Failed {
                commands_sent,
                chunks_remaining: self.work.chunk_count(),
            }
        };

        if outcome.is_success() {
            tracing::info!(target: "remote_paste::task", commands_sent, "paste.stopped");
        } else {
            tracing::warn!(
                target: "remote_paste::task",
                commands_sent,
                chunks_remaining = self.work.chunk_count(),
                "paste.failed"
            );
        }

        self.display.show_outcome(&outcome);
        self.display.unregister();
        Some(outcome)
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TaskState {
        self.state
    }

    /// Commands transmitted during the most recent step.
    #[must_use]
    pub fn commands_sent_this_step(&self) -> u32 {
        self.budget.spent()
    }

    /// Commands transmitted over the task's lifetime.
    #[must_use]
    pub const fn commands_sent_total(&self) -> u64 {
        self.emitter.sent_total()
    }

    /// Chunks still holding unmatched boxes.
    #[must_use]
    pub fn remaining_chunks(&self) -> usize {
        self.work.chunk_count()
    }

    /// Boxes not yet observed to match.
    #[must_use]
    pub fn remaining_boxes(&self) -> usize {
        self.work.box_count()
    }

    /// Progress lines most recently pushed to the display.
    #[must_use]
    pub fn progress_lines(&self) -> &[String] {
        self.progress.lines()
    }

    /// Mutable access to the blueprint, for hosts that stream it in.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Destination the task diffs against.
    #[must_use]
    pub fn destination(&self) -> &D {
        &self.destination
    }

    /// Mutable access to the destination, for hosts that load chunks or apply updates.
    pub fn destination_mut(&mut self) -> &mut D {
        &mut self.destination
    }

    /// Session commands are transmitted through.
    #[must_use]
    pub fn session(&self) -> &R {
        &self.session
    }

    /// Mutable access to the session.
    pub fn session_mut(&mut self) -> &mut R {
        &mut self.session
    }

    /// Display receiving progress lines.
    #[must_use]
    pub fn display(&self) -> &P {
        &self.display
    }

    fn refresh_progress(&mut self) {
        let lines = self
            .progress
            .rebuild(self.work.chunk_keys(), self.session.reference_position());
        self.display.set_lines(lines);
    }
}

impl<S, D, R, P> Task for SetblockPasteTask<S, D, R, P>
where
    S: SourceWorld,
    D: DestinationWorld,
    R: Session,
    P: InfoDisplay,
{
    fn can_execute(&self) -> bool {
        self.eligible()
    }

    fn should_remove(&self) -> bool {
        self.should_be_removed()
    }

    fn execute(&mut self) -> bool {
        self.step()
    }

    fn stop(&mut self) {
        let _ = self.on_stop();
    }
}
