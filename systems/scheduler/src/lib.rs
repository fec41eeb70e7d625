#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick-driven host that runs cooperative tasks and enforces their lifecycle.

/// Contract between a cooperative task and the scheduler driving it.
///
/// The scheduler polls [`Task::should_remove`] and [`Task::can_execute`] on
/// every tick, calls [`Task::execute`] when the task is due, and calls
/// [`Task::stop`] exactly once when the task leaves the scheduler.
pub trait Task {
    /// Reports whether the task may run on this tick.
    fn can_execute(&self) -> bool;

    /// Reports whether the task must be removed before running again.
    fn should_remove(&self) -> bool;

    /// Runs one bounded slice of work, returning `true` once the task finished.
    fn execute(&mut self) -> bool;

    /// Releases the task's resources and reports its outcome.
    fn stop(&mut self);
}

/// Handle identifying a task owned by a [`TaskScheduler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u32);

impl TaskId {
    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

struct ScheduledTask<'a> {
    id: TaskId,
    task: Box<dyn Task + 'a>,
    interval: u32,
    elapsed: u32,
}

impl ScheduledTask<'_> {
    fn due(&mut self) -> bool {
        self.elapsed += 1;
        if self.elapsed >= self.interval {
            self.elapsed = 0;
            true
        } else {
            false
        }
    }
}

/// Owns tasks and drives them once per tick.
#[derive(Default)]
pub struct TaskScheduler<'a> {
    tasks: Vec<ScheduledTask<'a>>,
    next_id: u32,
}

impl<'a> TaskScheduler<'a> {
    /// Creates a scheduler without tasks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 0,
        }
    }

    /// Adds a task that executes every `interval` ticks. Intervals of zero run every tick.
    pub fn add_task(&mut self, task: Box<dyn Task + 'a>, interval: u32) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.tasks.push(ScheduledTask {
            id,
            task,
            interval: interval.max(1),
            elapsed: 0,
        });
        id
    }

    /// Runs every due task once, returning the tasks removed on this tick.
    pub fn run_tasks(&mut self) -> Vec<TaskId> {
        let mut removed = Vec::new();
        let mut index = 0;

        while index < self.tasks.len() {
            let entry = &mut self.tasks[index];
            let finished = if entry.task.should_remove() {
                true
            } else if entry.task.can_execute() && entry.due() {
                entry.task.execute()
            } else {
                false
            };

            if finished {
                let mut entry = self.tasks.remove(index);
                entry.task.stop();
                tracing::debug!(
                    target: "remote_paste::scheduler",
                    task = entry.id.get(),
                    "task.removed"
                );
                removed.push(entry.id);
            } else {
                index += 1;
            }
        }

        removed
    }

    /// Stops and removes a task ahead of its own lifecycle, returning whether it existed.
    pub fn remove_task(&mut self, id: TaskId) -> bool {
        let Some(position) = self.tasks.iter().position(|entry| entry.id == id) else {
            return false;
        };

        let mut entry = self.tasks.remove(position);
        entry.task.stop();
        true
    }

    /// Stops and removes every task.
    pub fn clear(&mut self) {
        for mut entry in self.tasks.drain(..) {
            entry.task.stop();
        }
    }

    /// Reports whether the task is still scheduled.
    #[must_use]
    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|entry| entry.id == id)
    }

    /// Number of scheduled tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Reports whether no task is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
