use std::cell::{Cell, RefCell};

use remote_paste_system_scheduler::{Task, TaskScheduler};

struct ScriptedTask<'a> {
    name: &'static str,
    log: &'a RefCell<Vec<String>>,
    eligible: &'a Cell<bool>,
    steps_until_done: u32,
}

impl<'a> ScriptedTask<'a> {
    fn new(
        name: &'static str,
        log: &'a RefCell<Vec<String>>,
        eligible: &'a Cell<bool>,
        steps_until_done: u32,
    ) -> Self {
        Self {
            name,
            log,
            eligible,
            steps_until_done,
        }
    }
}

impl Task for ScriptedTask<'_> {
    fn can_execute(&self) -> bool {
        self.eligible.get()
    }

    fn should_remove(&self) -> bool {
        !self.can_execute()
    }

    fn execute(&mut self) -> bool {
        self.log.borrow_mut().push(format!("{}:execute", self.name));
        self.steps_until_done = self.steps_until_done.saturating_sub(1);
        self.steps_until_done == 0
    }

    fn stop(&mut self) {
        self.log.borrow_mut().push(format!("{}:stop", self.name));
    }
}

#[test]
fn finished_task_is_stopped_once_and_removed() {
    let log = RefCell::new(Vec::new());
    let eligible = Cell::new(true);
    let mut scheduler = TaskScheduler::new();
    let id = scheduler.add_task(Box::new(ScriptedTask::new("paste", &log, &eligible, 2)), 1);

    assert!(scheduler.run_tasks().is_empty(), "task still has work left");
    assert_eq!(scheduler.run_tasks(), vec![id]);
    assert!(scheduler.is_empty());
    assert!(scheduler.run_tasks().is_empty());

    assert_eq!(
        *log.borrow(),
        vec!["paste:execute", "paste:execute", "paste:stop"],
        "stop must follow the finishing execute exactly once",
    );
}

#[test]
fn ineligible_task_is_removed_without_executing() {
    let log = RefCell::new(Vec::new());
    let eligible = Cell::new(true);
    let mut scheduler = TaskScheduler::new();
    let id = scheduler.add_task(Box::new(ScriptedTask::new("paste", &log, &eligible, 10)), 1);

    assert!(scheduler.run_tasks().is_empty());
    eligible.set(false);
    assert_eq!(scheduler.run_tasks(), vec![id]);
    assert!(!scheduler.contains(id));

    assert_eq!(*log.borrow(), vec!["paste:execute", "paste:stop"]);
}

#[test]
fn interval_spaces_out_executions() {
    let log = RefCell::new(Vec::new());
    let eligible = Cell::new(true);
    let mut scheduler = TaskScheduler::new();
    let _ = scheduler.add_task(Box::new(ScriptedTask::new("slow", &log, &eligible, 100)), 3);

    for _ in 0..9 {
        let _ = scheduler.run_tasks();
    }

    assert_eq!(log.borrow().len(), 3, "a three tick interval runs three times in nine ticks");
}

#[test]
fn tasks_run_in_insertion_order() {
    let log = RefCell::new(Vec::new());
    let eligible = Cell::new(true);
    let mut scheduler = TaskScheduler::new();
    let _ = scheduler.add_task(Box::new(ScriptedTask::new("first", &log, &eligible, 5)), 1);
    let _ = scheduler.add_task(Box::new(ScriptedTask::new("second", &log, &eligible, 5)), 1);

    let _ = scheduler.run_tasks();

    assert_eq!(*log.borrow(), vec!["first:execute", "second:execute"]);
}

#[test]
fn external_removal_and_clear_stop_tasks() {
    let log = RefCell::new(Vec::new());
    let eligible = Cell::new(true);
    let mut scheduler = TaskScheduler::new();
    let first = scheduler.add_task(Box::new(ScriptedTask::new("first", &log, &eligible, 5)), 1);
    let _ = scheduler.add_task(Box::new(ScriptedTask::new("second", &log, &eligible, 5)), 1);

    assert!(scheduler.remove_task(first));
    assert!(!scheduler.remove_task(first), "removing twice is a no-op");
    assert_eq!(scheduler.len(), 1);

    scheduler.clear();
    assert!(scheduler.is_empty());
    assert_eq!(*log.borrow(), vec!["first:stop", "second:stop"]);
}
