//! Tick loop hosting a paste task against the in-memory server.

use std::{cell::RefCell, io::Write, rc::Rc};

use anyhow::{Context, Result};
use remote_paste_core::{
    CellPos, CellState, ChunkCoord, DestinationWorld, InfoDisplay, PasteOutcome, Session,
};
use remote_paste_system_scheduler::TaskScheduler;
use remote_paste_system_setblock_paste::SetblockPasteTask;
use remote_paste_world::{self as world, LoopbackSession, VoxelWorld};

use crate::scenario::Setup;

/// Destination view shared between the task and the simulated server.
#[derive(Clone, Debug)]
struct SharedWorld(Rc<RefCell<VoxelWorld>>);

impl DestinationWorld for SharedWorld {
    fn is_chunk_loaded(&self, chunk: ChunkCoord) -> bool {
        self.0.borrow().is_chunk_loaded(chunk)
    }

    fn effective_state(&self, pos: CellPos) -> CellState {
        self.0.borrow().effective_state(pos)
    }
}

/// Session handle shared between the task and the simulated server.
#[derive(Clone, Debug)]
struct SharedSession(Rc<RefCell<LoopbackSession>>);

impl Session for SharedSession {
    fn has_world_context(&self) -> bool {
        self.0.borrow().has_world_context()
    }

    fn is_remote(&self) -> bool {
        self.0.borrow().is_remote()
    }

    fn reference_position(&self) -> Option<CellPos> {
        self.0.borrow().reference_position()
    }

    fn send_command(&mut self, command: &str) {
        self.0.borrow_mut().send_command(command);
    }
}

/// Keeps the latest progress lines and the outcome for printing after the run.
#[derive(Debug, Default)]
struct ConsoleDisplay {
    registered: bool,
    lines: Vec<String>,
    outcome: Option<PasteOutcome>,
}

impl InfoDisplay for ConsoleDisplay {
    fn register(&mut self) {
        self.registered = true;
    }

    fn set_lines(&mut self, lines: &[String]) {
        if self.registered {
            self.lines = lines.to_vec();
        }
    }

    fn unregister(&mut self) {
        self.registered = false;
    }

    fn show_outcome(&mut self, outcome: &PasteOutcome) {
        self.outcome = Some(*outcome);
    }
}

/// Result of hosting a paste until it stopped or ran out of ticks.
#[derive(Debug)]
pub(crate) struct Report {
    pub(crate) ticks: u64,
    pub(crate) lines: Vec<String>,
    pub(crate) outcome: PasteOutcome,
}

/// Runs the paste tick by tick, writing every transmitted command to `out`.
///
/// Commands sent during a tick reach the destination before the next tick.
/// A task still scheduled after `max_ticks` is stopped, which fails the paste.
pub(crate) fn run(setup: Setup, max_ticks: u64, out: &mut impl Write) -> Result<Report> {
    let Setup {
        config,
        tick_interval,
        index,
        source,
        destination,
        session,
    } = setup;
    let destination = Rc::new(RefCell::new(destination));
    let session = Rc::new(RefCell::new(session));
    let mut display = ConsoleDisplay::default();
    let mut ticks = 0;

    {
        let task = SetblockPasteTask::new(
            &index,
            &config,
            source,
            SharedWorld(Rc::clone(&destination)),
            SharedSession(Rc::clone(&session)),
            &mut display,
        );
        let mut scheduler = TaskScheduler::new();
        let id = scheduler.add_task(Box::new(task), tick_interval);

        while scheduler.contains(id) && ticks < max_ticks {
            ticks += 1;
            let _ = scheduler.run_tasks();

            let pending = session.borrow_mut().take_pending();
            for command in &pending {
                writeln!(out, "{command}").context("failed to write command")?;
            }
            let sent = pending.len();
            let applied = world::deliver(&mut destination.borrow_mut(), pending);
            tracing::debug!(
                target: "remote_paste::cli",
                tick = ticks,
                sent,
                applied,
                "tick.delivered"
            );
        }

        if scheduler.contains(id) {
            tracing::warn!(target: "remote_paste::cli", max_ticks, "tick.limit_reached");
            let _ = scheduler.remove_task(id);
        }
    }

    let outcome = display
        .outcome
        .context("paste task stopped without reporting an outcome")?;
    Ok(Report {
        ticks,
        lines: display.lines,
        outcome,
    })
}
